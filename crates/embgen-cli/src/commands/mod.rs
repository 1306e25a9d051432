//! Command handlers.
//!
//! Each module translates parsed arguments into core service calls and
//! displays the results.

pub mod auto;
pub mod completions;
pub mod generate;
pub mod list;
pub mod new;
