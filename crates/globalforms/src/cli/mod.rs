//! Command-line interface for globalforms.
//!
//! This module provides the CLI structure, command definitions, and output
//! rendering for the `gforms` binary.

mod commands;
pub mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, FormsCommand, OutputFormat, RequestRef, RequestsCommand, ServeCommand,
    StatsCommand, SubmitCommand,
};

/// gforms - International student request forms
///
/// Runs the intake API that stores form submissions and their uploaded
/// files, and talks to a running instance to submit, review, and delete
/// requests.
#[derive(Debug, Parser)]
#[command(name = "gforms")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the API server
    Serve(ServeCommand),

    /// List the form kinds
    Forms(FormsCommand),

    /// Validate and submit a form
    Submit(SubmitCommand),

    /// List, view, and delete submitted requests
    #[command(subcommand)]
    Requests(RequestsCommand),

    /// Show storage statistics from the server
    Stats(StatsCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FormKind;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Stats(StatsCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "gforms");
    }

    #[test]
    fn test_verbosity_levels() {
        use crate::logging::Verbosity;
        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["gforms", "serve", "--host", "0.0.0.0", "-p", "9000"]).unwrap();
        let Command::Serve(serve) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(serve.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(serve.port, Some(9000));
    }

    #[test]
    fn test_parse_submit_with_attachments() {
        let cli = Cli::try_parse_from([
            "gforms",
            "submit",
            "opt-requests",
            "opt.json",
            "-a",
            "i94=./i94.pdf",
            "--attach",
            "photo2x2=./photo.jpg",
            "--dry-run",
        ])
        .unwrap();
        let Command::Submit(submit) = cli.command else {
            panic!("expected submit");
        };
        assert_eq!(submit.kind, FormKind::OptRequest);
        assert_eq!(submit.file, PathBuf::from("opt.json"));
        assert_eq!(submit.attachments.len(), 2);
        assert_eq!(submit.attachments[0].field, "i94");
        assert!(submit.dry_run);
    }

    #[test]
    fn test_parse_submit_unknown_kind() {
        assert!(Cli::try_parse_from(["gforms", "submit", "nope", "x.json"]).is_err());
    }

    #[test]
    fn test_parse_requests_list() {
        let cli = Cli::try_parse_from([
            "gforms", "requests", "list", "--kind", "exit-forms", "--limit", "5", "-f", "json",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Requests(RequestsCommand::List {
                kind: Some(FormKind::ExitForm),
                skip: 0,
                limit: Some(5),
                format: OutputFormat::Json,
            })
        ));
    }

    #[test]
    fn test_parse_requests_delete() {
        let cli = Cli::try_parse_from([
            "gforms",
            "requests",
            "delete",
            "exit-forms:1",
            "i20-requests:7",
        ])
        .unwrap();
        let Command::Requests(RequestsCommand::Delete { targets }) = cli.command else {
            panic!("expected delete");
        };
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1].kind, FormKind::I20Request);

        assert!(Cli::try_parse_from(["gforms", "requests", "delete"]).is_err());
    }

    #[test]
    fn test_parse_delete_all() {
        let cli = Cli::try_parse_from(["gforms", "requests", "delete-all", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Requests(RequestsCommand::DeleteAll {
                kind: None,
                yes: true
            })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["gforms", "-c", "/custom/config.toml", "stats"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose_and_quiet() {
        let cli = Cli::try_parse_from(["gforms", "-v", "forms"]).unwrap();
        assert_eq!(cli.verbose, 1);
        let cli = Cli::try_parse_from(["gforms", "-q", "forms"]).unwrap();
        assert!(cli.quiet);
    }
}
