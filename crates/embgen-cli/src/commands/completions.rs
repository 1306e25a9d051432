//! Shell completion generation.
//!
//! Completions cover the subcommands discovered for this run, so a
//! `--domains-dir` given alongside `completions` is reflected in the script.

use std::io::Write;

use clap::Command;
use clap_complete::{generate, shells};

use crate::cli::{CompletionsArgs, Shell};
use crate::error::CliResult;

const BIN_NAME: &str = "embgen";

pub fn execute(args: &CompletionsArgs, mut cmd: Command) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    write_completions(args.shell, &mut cmd, &mut stdout);
    stdout.flush()?;
    Ok(())
}

fn write_completions(shell: Shell, cmd: &mut Command, buf: &mut dyn Write) {
    match shell {
        Shell::Bash => generate(shells::Bash, cmd, BIN_NAME, buf),
        Shell::Zsh => generate(shells::Zsh, cmd, BIN_NAME, buf),
        Shell::Fish => generate(shells::Fish, cmd, BIN_NAME, buf),
        Shell::PowerShell => generate(shells::PowerShell, cmd, BIN_NAME, buf),
        Shell::Elvish => generate(shells::Elvish, cmd, BIN_NAME, buf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Catalog, build_command};

    #[test]
    fn bash_script_mentions_fixed_subcommands() {
        let mut cmd = build_command(&Catalog::default());
        let mut buf = Vec::new();
        write_completions(Shell::Bash, &mut cmd, &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("embgen"));
        assert!(script.contains("completions"));
        assert!(script.contains("auto"));
    }
}
