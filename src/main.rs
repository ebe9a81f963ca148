//! sfapprove — pending approvals in your terminal.
//!
//! Quick start:
//!   sfapprove configure   # hand over username/password from the config page
//!   sfapprove             # browse, approve and reject work items
//!   sfapprove list        # print pending items and exit
//!
//! For more info: sfapprove --help

use clap::{Parser, Subcommand};
use colored::Colorize;
use sfapprove::api::Decision;
use sfapprove::cli;
use sfapprove::config::AppPaths;
use sfapprove::logging;
use std::path::PathBuf;

/// sfapprove — approve or reject pending work items.
#[derive(Parser)]
#[command(
    name = "sfapprove",
    version,
    about = "Approve or reject pending work items from the terminal",
    long_about = "Logs in with the OAuth2 password grant, lists the work items\n\
                  waiting for your approval and lets you approve or reject them.\n\n\
                  Quick start:\n  \
                  sfapprove configure   # store your credentials\n  \
                  sfapprove             # interactive approval list\n  \
                  sfapprove list        # print pending items"
)]
struct Cli {
    /// Directory holding config.yaml, settings.yaml and logs (default ~/.sfapprove)
    #[arg(long, global = true, env = "SFAPPROVE_HOME")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store username and password from the configuration page
    Configure {
        /// URL-encoded JSON returned by the config page ({"un":..,"pw":..})
        #[arg(long)]
        response: Option<String>,

        /// Set the username directly (needs --password)
        #[arg(long)]
        username: Option<String>,

        /// Set the password directly (needs --username)
        #[arg(long)]
        password: Option<String>,

        /// Don't try to open the config page in a browser
        #[arg(long)]
        no_open: bool,
    },

    /// Print the pending work items and exit
    List,

    /// Approve one work item by id
    Approve {
        /// Work item id
        id: String,
    },

    /// Reject one work item by id
    Reject {
        /// Work item id
        id: String,
    },

    /// Show the resolved configuration
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The interactive client draws over the whole terminal, so its logs go
    // to a file. Everything else logs to stderr.
    let mut _log_guard = None;
    let paths = match AppPaths::resolve(cli.home) {
        Ok(paths) => paths,
        Err(e) => fail(e),
    };
    if cli.command.is_none() {
        match logging::init_file(&paths.log_dir()) {
            Ok(guard) => _log_guard = Some(guard),
            Err(e) => fail(e),
        }
    } else {
        logging::init_stderr();
    }

    let result = match cli.command {
        None => cli::run_client(&paths).await,

        Some(Commands::Configure {
            response,
            username,
            password,
            no_open,
        }) => cli::configure::run_configure(
            &paths,
            cli::configure::ConfigureOptions {
                response,
                username,
                password,
                open_browser: !no_open,
            },
        )
        .map(|_| ()),

        Some(Commands::List) => run_headless(&paths, None).await,

        Some(Commands::Approve { id }) => {
            run_headless(&paths, Some((id, Decision::Approve))).await
        }

        Some(Commands::Reject { id }) => run_headless(&paths, Some((id, Decision::Reject))).await,

        Some(Commands::Config) => cli::run_show_config(&paths),
    };

    if let Err(e) = result {
        fail(e);
    }
}

/// `list` when `decide` is None, otherwise `approve`/`reject`.
async fn run_headless(paths: &AppPaths, decide: Option<(String, Decision)>) -> anyhow::Result<()> {
    let config = paths.load_config()?;
    let backend = cli::build_backend(&config)?;
    let credentials = cli::require_credentials(paths)?;
    match decide {
        None => cli::items::run_list(&backend, &credentials).await,
        Some((id, decision)) => cli::items::run_decide(&backend, &credentials, &id, decision).await,
    }
}

fn fail(e: anyhow::Error) -> ! {
    eprintln!();
    eprintln!("  {} {}", "✗".red().bold(), e);
    for cause in e.chain().skip(1) {
        eprintln!("  {} {}", "caused by:".dimmed(), cause);
    }
    eprintln!();
    std::process::exit(1);
}
