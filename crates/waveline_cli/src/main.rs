//! Waveline CLI: command-line access to timing diagram documents.
//!
//! Provides `waveline new` to create a document, `waveline info` and
//! `waveline check` to inspect one, `waveline migrate` to rewrite older
//! layouts in the current format, and `waveline insert-cycles` /
//! `waveline delete-cycles` for batch cycle edits.

#![warn(missing_docs)]

mod check;
mod cycles;
mod info;
mod migrate;
mod new;
mod pipeline;

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Waveline timing diagram editor.
#[derive(Parser, Debug)]
#[command(name = "waveline", version, about = "Waveline timing diagram tools")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `waveline.toml` file or the directory containing it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new diagram document.
    New(NewArgs),
    /// Print a summary of a document.
    Info(FileArgs),
    /// Report inconsistencies in a document.
    Check(CheckArgs),
    /// Rewrite a document in the current layout.
    Migrate(MigrateArgs),
    /// Insert cycles into a document.
    InsertCycles(CycleArgs),
    /// Delete cycles from a document.
    DeleteCycles(CycleArgs),
}

/// Arguments for `waveline new`.
#[derive(Parser, Debug)]
pub struct NewArgs {
    /// Output document path.
    pub path: String,

    /// Number of cycles (defaults to the configured value).
    #[arg(long)]
    pub cycles: Option<u32>,

    /// Name of the initial clock signal.
    #[arg(long, default_value = "clk")]
    pub clock: String,

    /// Overwrite an existing file.
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments naming a single document.
#[derive(Parser, Debug)]
pub struct FileArgs {
    /// Document path.
    pub path: String,
}

/// Arguments for `waveline check`.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Document path.
    pub path: String,

    /// Print issues as a JSON array.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `waveline migrate`.
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Document to read.
    pub input: String,

    /// Where to write the result (defaults to rewriting `input`).
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for `waveline insert-cycles` and `waveline delete-cycles`.
#[derive(Parser, Debug)]
pub struct CycleArgs {
    /// Document path.
    pub path: String,

    /// First affected cycle.
    #[arg(long)]
    pub at: u32,

    /// Number of cycles, 1 to 50.
    #[arg(short = 'n', long, default_value = "1")]
    pub count: String,

    /// Restrict the edit to one signal.
    #[arg(short, long)]
    pub signal: Option<String>,

    /// Where to write the result (defaults to rewriting `path`).
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn init_logging(global: &GlobalArgs) {
    let level = if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::New(ref args) => new::run(args, &global),
        Command::Info(ref args) => info::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
        Command::Migrate(ref args) => migrate::run(args, &global),
        Command::InsertCycles(ref args) => cycles::run_insert(args, &global),
        Command::DeleteCycles(ref args) => cycles::run_delete(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_new_default() {
        let cli = Cli::parse_from(["waveline", "new", "d.json"]);
        match cli.command {
            Command::New(ref args) => {
                assert_eq!(args.path, "d.json");
                assert!(args.cycles.is_none());
                assert_eq!(args.clock, "clk");
                assert!(!args.force);
            }
            _ => panic!("expected New command"),
        }
    }

    #[test]
    fn parse_new_with_args() {
        let cli = Cli::parse_from([
            "waveline", "new", "d.json", "--cycles", "32", "--clock", "sysclk", "--force",
        ]);
        match cli.command {
            Command::New(ref args) => {
                assert_eq!(args.cycles, Some(32));
                assert_eq!(args.clock, "sysclk");
                assert!(args.force);
            }
            _ => panic!("expected New command"),
        }
    }

    #[test]
    fn parse_insert_cycles() {
        let cli = Cli::parse_from([
            "waveline",
            "insert-cycles",
            "d.json",
            "--at",
            "4",
            "-n",
            "3",
            "--signal",
            "data",
        ]);
        match cli.command {
            Command::InsertCycles(ref args) => {
                assert_eq!(args.at, 4);
                assert_eq!(args.count, "3");
                assert_eq!(args.signal.as_deref(), Some("data"));
                assert!(args.output.is_none());
            }
            _ => panic!("expected InsertCycles command"),
        }
    }

    #[test]
    fn parse_delete_cycles_default_count() {
        let cli = Cli::parse_from(["waveline", "delete-cycles", "d.json", "--at", "0"]);
        match cli.command {
            Command::DeleteCycles(ref args) => {
                assert_eq!(args.count, "1");
                assert!(args.signal.is_none());
            }
            _ => panic!("expected DeleteCycles command"),
        }
    }

    #[test]
    fn parse_migrate_with_output() {
        let cli = Cli::parse_from(["waveline", "migrate", "old.json", "-o", "new.json"]);
        match cli.command {
            Command::Migrate(ref args) => {
                assert_eq!(args.input, "old.json");
                assert_eq!(args.output.as_deref(), Some("new.json"));
            }
            _ => panic!("expected Migrate command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["waveline", "--quiet", "info", "d.json"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from(["waveline", "--config", "/p/waveline.toml", "check", "d.json"]);
        assert_eq!(cli.config.as_deref(), Some("/p/waveline.toml"));
    }

    #[test]
    fn missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["waveline"]).is_err());
    }
}
