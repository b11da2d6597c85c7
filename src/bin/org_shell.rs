//! Org Shell command line
//!
//! Drives the organizational context against the configured directory and
//! prints the result as JSON. Configuration comes from `ORG_SHELL_*`
//! variables (or `.env`); flags override them.
//!
//! # Usage
//!
//! ```bash
//! # Resolve the context and print the whole shell view
//! org_shell show --path /dashboard/students
//!
//! # Switch company (persisted when ORG_SHELL_STORE_PATH is set)
//! org_shell --store state.json select-company c2
//!
//! # Switch branch within the selected company
//! org_shell --store state.json select-branch b3
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use org_shell::telemetry::{init_tracing, DEFAULT_DIRECTIVE};
use org_shell::{AppShell, AuthStatus, ShellAction, ShellConfig, StaticAuth};

#[derive(Parser)]
#[command(name = "org_shell")]
#[command(version)]
#[command(about = "Inspect and drive the dashboard's company/branch context")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory base URL
    #[arg(long, global = true)]
    directory_url: Option<String>,

    /// Persist the selection in this JSON file
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Locale for labels (vi, en)
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Compact JSON instead of pretty-printed
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the context and print the shell view
    Show {
        /// Current route, drives highlighting and breadcrumbs
        #[arg(long)]
        path: Option<String>,
    },

    /// Select a company and print the resolved context
    SelectCompany {
        /// Company id
        id: String,
    },

    /// Select a branch of the current company and print the context
    SelectBranch {
        /// Branch code
        code: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(DEFAULT_DIRECTIVE);

    let cli = Cli::parse();

    let mut config = ShellConfig::from_env().context("Invalid ORG_SHELL_* configuration")?;
    if let Some(url) = cli.directory_url {
        config = config.directory_url(url);
    }
    if let Some(path) = cli.store {
        config = config.with_file_store(path);
    }
    if let Some(locale) = cli.locale {
        config = config.default_locale(locale);
    }

    let auth = Arc::new(StaticAuth::new(AuthStatus::authenticated()));
    let mut shell = AppShell::from_config(config, auth, false)?;
    shell.sync_session().await;

    let output = match cli.command {
        Commands::Show { path } => {
            if let Some(path) = path {
                shell.dispatch(ShellAction::Navigate(path)).await?;
            }
            serde_json::to_value(shell.view())?
        }
        Commands::SelectCompany { id } => {
            shell.dispatch(ShellAction::SelectCompany(id)).await?;
            serde_json::to_value(shell.controller().snapshot())?
        }
        Commands::SelectBranch { code } => {
            shell
                .dispatch(ShellAction::SelectBranch(code.clone()))
                .await
                .with_context(|| format!("Cannot select branch '{code}'"))?;
            serde_json::to_value(shell.controller().snapshot())?
        }
    };

    let rendered = if cli.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{rendered}");

    Ok(())
}
