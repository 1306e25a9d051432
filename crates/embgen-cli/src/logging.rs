//! Tracing subscriber initialisation.
//!
//! Only the binary installs a subscriber; `embgen-core` and
//! `embgen-adapters` only emit events.
//!
//! # Verbosity mapping
//!
//! | Flag(s)   | Filter level |
//! |-----------|--------------|
//! | (none)    | WARN         |
//! | `-v`      | INFO         |
//! | `-vv`     | DEBUG        |
//! | `-vvv`    | TRACE        |
//! | `--debug` | at least DEBUG |
//! | `--quiet` | ERROR        |
//!
//! `RUST_LOG` overrides all of the above if set.

use std::io::IsTerminal as _;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::GlobalArgs;

/// Install the global subscriber, writing to stderr.
///
/// Must be called once, before discovery logs anything.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(args)));

    let use_ansi = !args.no_color && std::io::stderr().is_terminal();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(use_ansi)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))?;

    Ok(())
}

/// Same level for every embgen crate.
fn directives(args: &GlobalArgs) -> String {
    let level = derive_level(args);
    format!("embgen={level},embgen_core={level},embgen_adapters={level}")
}

fn derive_level(args: &GlobalArgs) -> &'static str {
    if args.quiet {
        return "error";
    }
    match (args.verbose, args.debug) {
        (0, false) => "warn",
        (1, false) => "info",
        (0..=2, _) => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with(verbose: u8, quiet: bool, debug: bool) -> GlobalArgs {
        GlobalArgs {
            verbose,
            quiet,
            debug,
            no_color: true,
            ..GlobalArgs::default()
        }
    }

    #[test]
    fn level_default() {
        assert_eq!(derive_level(&args_with(0, false, false)), "warn");
    }

    #[test]
    fn level_follows_verbose_count() {
        assert_eq!(derive_level(&args_with(1, false, false)), "info");
        assert_eq!(derive_level(&args_with(2, false, false)), "debug");
        assert_eq!(derive_level(&args_with(3, false, false)), "trace");
        assert_eq!(derive_level(&args_with(10, false, false)), "trace");
    }

    #[test]
    fn debug_flag_raises_to_debug() {
        assert_eq!(derive_level(&args_with(0, false, true)), "debug");
        assert_eq!(derive_level(&args_with(1, false, true)), "debug");
        assert_eq!(derive_level(&args_with(3, false, true)), "trace");
    }

    // quiet takes precedence over verbose
    #[test]
    fn quiet_overrides_verbose() {
        assert_eq!(derive_level(&args_with(3, true, true)), "error");
    }

    #[test]
    fn directives_cover_every_crate() {
        let d = directives(&args_with(1, false, false));
        assert_eq!(d, "embgen=info,embgen_core=info,embgen_adapters=info");
    }
}
