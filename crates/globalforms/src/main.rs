//! `gforms` - CLI for globalforms
//!
//! This binary runs the intake API and provides the command-line counterpart
//! of the portal's submit, list, detail, and delete views.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;

use globalforms::cli::{
    render, Cli, Command, ConfigCommand, OutputFormat, RequestsCommand, ServeCommand,
    SubmitCommand,
};
use globalforms::{forms, init_logging, server, Config, Error, PortalClient};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            if let Some(errors) = e.downcast_ref::<Error>().and_then(Error::field_errors) {
                eprintln!("Validation failed:");
                eprint!("{}", render::field_errors(errors));
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    // `config validate` reports load errors itself.
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        return Ok(handle_validate(file.clone().or_else(|| cli.config.clone())));
    }

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Serve(cmd) => handle_serve(config, cmd).await?,
        Command::Forms(cmd) => handle_forms(cmd.json)?,
        Command::Submit(cmd) => handle_submit(&config, cmd).await?,
        Command::Requests(cmd) => return handle_requests(&config, cmd).await,
        Command::Stats(cmd) => {
            let stats = PortalClient::from_config(&config)?.stats().await?;
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", render::stats_text(&stats));
            }
        }
        Command::Config(cmd) => handle_config(&config, cmd)?,
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    config.validate()?;
    server::serve(config).await?;
    Ok(())
}

fn handle_forms(json: bool) -> anyhow::Result<()> {
    let forms: Vec<_> = forms::FormKind::ALL.into_iter().map(forms::FormKind::info).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&forms)?);
    } else {
        print!("{}", render::forms_table(&forms));
    }
    Ok(())
}

async fn handle_submit(config: &Config, cmd: SubmitCommand) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&cmd.file)
        .with_context(|| format!("failed to read {}", cmd.file.display()))?;
    let form: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", cmd.file.display()))?;

    if cmd.dry_run {
        let prepared = PortalClient::prepare(cmd.kind, form, &cmd.attachments)?;
        println!("{}", serde_json::to_string_pretty(&prepared.form_data)?);
        eprintln!(
            "{} for {} ({}) is valid",
            prepared.program, prepared.student_name, prepared.student_id
        );
        return Ok(());
    }

    let client = PortalClient::from_config(config)?;
    let submission = client.submit(cmd.kind, form, &cmd.attachments).await?;
    println!(
        "Submitted {} as {} ({} attachment(s))",
        submission.program,
        submission.reference(),
        submission.attachments.len()
    );
    Ok(())
}

async fn handle_requests(config: &Config, cmd: RequestsCommand) -> anyhow::Result<ExitCode> {
    let client = PortalClient::from_config(config)?;

    match cmd {
        RequestsCommand::List {
            kind,
            skip,
            limit,
            format,
        } => {
            let submissions = client.list(kind, skip, limit).await?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&submissions)?);
                }
                OutputFormat::Table if submissions.is_empty() => println!("No requests found."),
                OutputFormat::Table => print!("{}", render::requests_table(&submissions)),
                OutputFormat::Plain => print!("{}", render::requests_plain(&submissions)),
            }
        }
        RequestsCommand::Show { kind, id, json } => {
            let submission = client.get(kind, id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&submission)?);
            } else {
                print!("{}", render::request_detail(&submission)?);
            }
        }
        RequestsCommand::Delete { targets } => {
            let targets: Vec<_> = targets.iter().map(|t| (t.kind, t.id)).collect();
            let summary = client.delete_many(&targets).await;
            println!("{}", summary.message());
            if !summary.is_complete() {
                for reference in &summary.failed {
                    eprintln!("  {reference}");
                }
                return Ok(ExitCode::FAILURE);
            }
        }
        RequestsCommand::DeleteAll { kind, yes } => {
            if !yes {
                let scope = kind.map_or("all".to_string(), |k| format!("all {}", k.program()));
                bail!("this deletes {scope} requests; pass --yes to confirm");
            }
            let report = client.delete_all(kind).await?;
            println!("{}", report.message);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_validate(file: Option<std::path::PathBuf>) -> ExitCode {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path)) {
        Ok(_) => {
            println!("Configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Configuration error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Listen address:     {}:{}", config.server.host, config.server.port);
                println!("  Allow any origin:   {}", config.server.allow_any_origin);
                println!("  Max upload bytes:   {}", config.server.max_upload_bytes);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Upload directory:   {}", config.upload_dir().display());
                println!();
                println!("[Listing]");
                println!("  Default limit:      {}", config.listing.default_limit);
                println!("  Max limit:          {}", config.listing.max_limit);
                println!();
                println!("[Client]");
                println!("  Base URL:           {}", config.client.base_url);
                println!("  Timeout (secs):     {}", config.client.timeout_secs);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { .. } => {}
    }
    Ok(())
}
