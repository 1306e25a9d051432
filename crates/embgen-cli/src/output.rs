//! Output management and formatting.

use std::io;

use console::Term;
use owo_colors::OwoColorize;

use crate::cli::GlobalArgs;
use crate::config::AppConfig;

/// Writes user-facing lines to stdout, honouring `--quiet` and
/// `--no-color`.
pub struct OutputManager {
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        Self {
            quiet: args.quiet,
            no_color: args.no_color || config.no_color,
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Machine-readable output. Written even in quiet mode.
    pub fn data(&self, msg: &str) -> io::Result<()> {
        self.term.write_line(msg)
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.decorated("\u{2713}", msg, |s| s.green().bold().to_string(), |s| s.green().to_string())
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.decorated("\u{26a0}", msg, |s| s.yellow().bold().to_string(), |s| s.yellow().to_string())
    }

    /// Informational indicator: `ℹ <msg>`.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.decorated("\u{2139}", msg, |s| s.blue().bold().to_string(), |s| s.blue().to_string())
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    fn decorated(
        &self,
        icon: &str,
        msg: &str,
        paint_icon: impl Fn(&str) -> String,
        paint_msg: impl Fn(&str) -> String,
    ) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("{icon} {msg}")
        } else {
            format!("{} {}", paint_icon(icon), paint_msg(msg))
        };
        self.term.write_line(&line)
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_manager(quiet: bool, no_color: bool) -> OutputManager {
        let args = GlobalArgs {
            quiet,
            no_color,
            ..GlobalArgs::default()
        };
        OutputManager::new(&args, &AppConfig::default())
    }

    #[test]
    fn quiet_suppresses_print() {
        let out = make_manager(true, true);
        assert!(out.print("hello").is_ok());
        assert!(out.success("done").is_ok());
    }

    #[test]
    fn data_is_written_in_quiet_mode() {
        let out = make_manager(true, true);
        assert!(out.data("[]").is_ok());
    }

    #[test]
    fn no_color_from_flag_or_config() {
        assert!(!make_manager(false, false).no_color);
        assert!(make_manager(false, true).no_color);

        let config = AppConfig {
            no_color: true,
            ..AppConfig::default()
        };
        assert!(OutputManager::new(&GlobalArgs::default(), &config).no_color);
    }
}
