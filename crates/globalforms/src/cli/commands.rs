//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Subcommand, ValueEnum};

use crate::client::FileUpload;
use crate::error::{Error, Result};
use crate::forms::FormKind;

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Forms command arguments.
#[derive(Debug, Args)]
pub struct FormsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Submit command arguments.
#[derive(Debug, Args)]
pub struct SubmitCommand {
    /// Form kind slug, e.g. `opt-requests`
    pub kind: FormKind,

    /// JSON document holding the form fields
    pub file: PathBuf,

    /// Attach a file as `field=path` (repeatable)
    #[arg(short = 'a', long = "attach", value_name = "FIELD=PATH")]
    pub attachments: Vec<FileUpload>,

    /// Validate locally and print the normalized payload without sending
    #[arg(long)]
    pub dry_run: bool,
}

/// Request list and maintenance commands.
#[derive(Debug, Subcommand)]
pub enum RequestsCommand {
    /// List submitted requests, newest first
    List {
        /// Only show one form kind
        #[arg(short, long)]
        kind: Option<FormKind>,

        /// Number of requests to skip
        #[arg(long, default_value = "0")]
        skip: usize,

        /// Maximum number of requests (server default when omitted)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one request in detail
    Show {
        /// Form kind slug
        kind: FormKind,

        /// Request id
        id: i64,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Delete the selected requests
    Delete {
        /// Requests to delete, as `kind:id`
        #[arg(required = true, value_name = "KIND:ID")]
        targets: Vec<RequestRef>,
    },

    /// Delete every request, or every request of one kind
    DeleteAll {
        /// Only delete one form kind
        #[arg(short, long)]
        kind: Option<FormKind>,

        /// Confirm the deletion
        #[arg(short, long)]
        yes: bool,
    },
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// A request selected on the command line as `kind:id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestRef {
    /// Form kind.
    pub kind: FormKind,
    /// Request id.
    pub id: i64,
}

impl FromStr for RequestRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, id) = s
            .rsplit_once(':')
            .ok_or_else(|| Error::malformed(format!("expected kind:id, got '{s}'")))?;
        let id = id
            .trim()
            .parse()
            .map_err(|_| Error::malformed(format!("invalid request id in '{s}'")))?;
        Ok(Self {
            kind: kind.trim().parse()?,
            id,
        })
    }
}

impl fmt::Display for RequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
