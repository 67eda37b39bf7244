mod commands;
mod config;
mod error;
mod models;
mod zendesk;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use commands::{OutputFormat, QueryOptions};
use config::Credentials;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use zendesk::{BulkOperation, ZendeskClient};

#[derive(Parser, Debug)]
#[command(name = "zendesk-cli")]
#[command(version, about = "Zendesk API CLI utility", long_about = None)]
struct Cli {
    /// Search query, passed to the Zendesk search API as-is
    #[arg(required_unless_present = "completions")]
    query: Option<String>,

    /// API user
    #[arg(short, long)]
    user: Option<String>,

    /// API base URL (e.g. https://example.zendesk.com/api/v2/)
    #[arg(short, long)]
    api_url: Option<String>,

    /// API configuration file (INI) with a [zendesk-cli] section
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mark matched tickets as spam
    #[arg(short, long, conflicts_with = "delete")]
    spam: bool,

    /// Delete matched tickets
    #[arg(short, long)]
    delete: bool,

    /// Print full ticket data
    #[arg(short, long)]
    full: bool,

    /// Generate shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Cli {
    fn operation(&self) -> Option<BulkOperation> {
        match (self.spam, self.delete) {
            (true, _) => Some(BulkOperation::MarkSpam),
            (_, true) => Some(BulkOperation::Delete),
            _ => None,
        }
    }

    fn output_format(&self) -> OutputFormat {
        if self.full {
            OutputFormat::Full
        } else {
            OutputFormat::Summary
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        generate(shell, &mut Cli::command(), "zendesk-cli", &mut io::stdout());
        return;
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let options = QueryOptions {
        query: cli.query.clone().unwrap_or_default(),
        operation: cli.operation(),
        format: cli.output_format(),
    };

    let credentials = Credentials::resolve(cli.config.as_deref(), cli.user, cli.api_url, || {
        rpassword::prompt_password("Password: ")
    })?;

    let client = ZendeskClient::new(credentials).context("Failed to set up HTTP client")?;
    tracing::debug!(api_url = %client.api_url(), "Client ready");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::query_tickets(&client, &options, &mut out).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_spam_and_delete_conflict() {
        let result = Cli::try_parse_from(["zendesk-cli", "-s", "-d", "status:new"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_operation_selection() {
        let cli = Cli::try_parse_from(["zendesk-cli", "-s", "q"]).unwrap();
        assert_eq!(cli.operation(), Some(BulkOperation::MarkSpam));

        let cli = Cli::try_parse_from(["zendesk-cli", "--delete", "q"]).unwrap();
        assert_eq!(cli.operation(), Some(BulkOperation::Delete));

        let cli = Cli::try_parse_from(["zendesk-cli", "q"]).unwrap();
        assert_eq!(cli.operation(), None);
        assert_eq!(cli.output_format(), OutputFormat::Summary);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "zendesk-cli",
            "-u",
            "agent@example.com",
            "-a",
            "https://example.zendesk.com/api/v2/",
            "-f",
            "type:ticket",
        ])
        .unwrap();
        assert_eq!(cli.user.as_deref(), Some("agent@example.com"));
        assert_eq!(
            cli.api_url.as_deref(),
            Some("https://example.zendesk.com/api/v2/")
        );
        assert_eq!(cli.query.as_deref(), Some("type:ticket"));
        assert_eq!(cli.output_format(), OutputFormat::Full);
    }

    #[test]
    fn test_query_required() {
        let err = Cli::try_parse_from(["zendesk-cli", "-s"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from(["zendesk-cli", "--completions", "bash"]).unwrap();
        assert!(cli.query.is_none());
        assert_eq!(cli.completions, Some(Shell::Bash));
    }

    #[tokio::test]
    async fn test_config_error_fails_before_any_request() {
        let cli = Cli::try_parse_from([
            "zendesk-cli",
            "-c",
            "/nonexistent/zendesk-cli/config.ini",
            "q",
        ])
        .unwrap();
        let err = run(cli).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Config error"));
    }
}
