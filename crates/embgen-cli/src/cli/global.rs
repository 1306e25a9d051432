//! Global arguments that apply to every subcommand.
//!
//! Declared here and flattened into [`super::Cli`] so that `-v`, `-q`, etc.
//! are available on any invocation without repetition.

use std::ffi::OsString;
use std::iter::Peekable;
use std::path::PathBuf;

use clap::Args;

/// Global arguments for all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Increase logging verbosity.
    ///
    /// Pass once for INFO (`-v`), twice for DEBUG (`-vv`), three times for
    /// TRACE (`-vvv`).  Conflicts with `--quiet`.
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase verbosity (-v, -vv, -vvv)",
        long_help = "Increase logging verbosity:
    (none)  - Warnings and errors
    -v      - Info level (progress messages)
    -vv     - Debug level (detailed diagnostics)
    -vvv    - Trace level (very verbose)"
    )]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Suppress non-error output"
    )]
    pub quiet: bool,

    /// Debug logging plus full error chains on failure.
    #[arg(
        short = 'd',
        long = "debug",
        global = true,
        help = "Enable debug logging"
    )]
    pub debug: bool,

    /// Disable ANSI colour codes.
    ///
    /// Automatically honoured when `NO_COLOR` is set in the environment
    /// (see <https://no-color.org>).
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new(),
        help = "Disable colored output"
    )]
    pub no_color: bool,

    /// Configuration file path.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "FILE",
        help = "Configuration file path"
    )]
    pub config: Option<PathBuf>,

    /// Extra directory of user domains.
    #[arg(
        long = "domains-dir",
        global = true,
        value_name = "PATH",
        help = "Additional directory containing user domains (also: EMBGEN_DOMAINS_DIR)"
    )]
    pub domains_dir: Option<PathBuf>,
}

/// Read the global flags out of the raw arguments.
///
/// Domain subcommands depend on discovery, and discovery depends on
/// `--domains-dir` and `--config`, so these are read before clap sees
/// anything. Logging flags are picked up too, so that discovery is logged
/// at the requested level. Unknown arguments are ignored; the last
/// occurrence of a valued flag wins, as with clap.
pub fn prescan<I, T>(args: I) -> GlobalArgs
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<String> = args
        .into_iter()
        .map(|a| a.into().to_string_lossy().into_owned())
        .collect();

    let mut found = GlobalArgs {
        no_color: std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()),
        ..GlobalArgs::default()
    };
    let mut iter = args.iter().skip(1).peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--" => break,
            "--verbose" => found.verbose = found.verbose.saturating_add(1),
            "--quiet" => found.quiet = true,
            "--debug" => found.debug = true,
            "--no-color" => found.no_color = true,
            "--domains-dir" => found.domains_dir = separate_value(&mut iter),
            "--config" => found.config = separate_value(&mut iter),
            other => {
                if let Some(v) = other.strip_prefix("--domains-dir=") {
                    found.domains_dir = Some(PathBuf::from(v));
                } else if let Some(v) = other.strip_prefix("--config=") {
                    found.config = Some(PathBuf::from(v));
                } else if let Some(cluster) = short_cluster(other) {
                    scan_cluster(cluster, &mut iter, &mut found);
                }
            }
        }
    }
    found
}

/// Body of a `-xyz` argument; long flags and a bare `-` are not clusters.
fn short_cluster(arg: &str) -> Option<&str> {
    arg.strip_prefix('-')
        .filter(|c| !c.is_empty() && !c.starts_with('-'))
}

/// Walk a short cluster the way clap does: boolean shorts stack, and the
/// first valued short (`-c`, `-o`) takes the rest of the cluster, with an
/// optional `=`, or else the next argument.
fn scan_cluster<'a, I>(cluster: &str, rest: &mut Peekable<I>, found: &mut GlobalArgs)
where
    I: Iterator<Item = &'a String>,
{
    for (i, c) in cluster.char_indices() {
        match c {
            'v' => found.verbose = found.verbose.saturating_add(1),
            'q' => found.quiet = true,
            'd' => found.debug = true,
            'c' => {
                let attached = &cluster[i + 1..];
                found.config = if attached.is_empty() {
                    separate_value(rest)
                } else {
                    Some(PathBuf::from(attached.strip_prefix('=').unwrap_or(attached)))
                };
                return;
            }
            // Output directory; not a global.
            'o' => return,
            c if c.is_ascii_alphabetic() => {}
            _ => return,
        }
    }
}

/// The next argument, unless it looks like another flag.
fn separate_value<'a, I>(rest: &mut Peekable<I>) -> Option<PathBuf>
where
    I: Iterator<Item = &'a String>,
{
    rest.next_if(|a| !a.starts_with('-')).map(PathBuf::from)
}
