//! Domains compiled into the binary.
//!
//! Templates and companion files are embedded with `include_str!` from the
//! crate's `templates/` directory, so the binary needs no data files at
//! runtime.

use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use embgen_core::domain::{Document, Domain, ValidationError};

pub mod commands;
pub mod registers;

pub use commands::CommandsDomain;
pub use registers::RegistersDomain;

/// Built-in domains in registration order.
pub fn all() -> Vec<Arc<dyn Domain>> {
    vec![Arc::new(CommandsDomain), Arc::new(RegistersDomain)]
}

/// A named value, shared by command arguments and register bitfields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub value: i64,
}

fn parse<T: DeserializeOwned>(document: &Document) -> Result<T, ValidationError> {
    if !document.is_object() {
        return Err(ValidationError::new("input document must be a mapping"));
    }
    serde_json::from_value(document.clone()).map_err(|e| ValidationError::new(e.to_string()))
}

fn into_data<T: Serialize>(value: &T) -> Result<Map<String, Value>, ValidationError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ValidationError::new("configuration did not serialize to a mapping")),
        Err(e) => Err(ValidationError::new(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_ordered() {
        let names: Vec<_> = all().iter().map(|d| d.name().to_string()).collect();
        assert_eq!(names, ["commands", "registers"]);
    }

    #[test]
    fn parse_rejects_non_mapping() {
        let err = parse::<EnumValue>(&serde_json::json!([1, 2])).unwrap_err();
        assert!(err.message.contains("mapping"));
    }
}
