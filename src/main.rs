//! gitspaces CLI entry point.
//!
//! Parses command-line arguments and dispatches to the appropriate command handler.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use gitspaces::commands::{
    action_command, browse_command, config_display_command, config_set_command, list_command,
    show_command,
};
use gitspaces::config::{ensure_config_dir, log_path};
use gitspaces::output::print_error;
use gitspaces::ActionKind;
use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gitspaces")]
#[command(
    version,
    about = "List and manage cloud development environments (gitspaces)",
    after_help = "EXAMPLES:
    # Print the gitspace table
    gitspaces list

    # Stop a running gitspace, then show the refreshed table
    gitspaces stop my-gitspace-id

    # Interactive table with start/stop, delete, edit and open on keys
    gitspaces browse

    # First-time setup
    gitspaces config set account <account-id>
    gitspaces config set project <project-id>
    export GITSPACES_TOKEN=<api-token>"
)]
struct Cli {
    /// Log API calls and state changes (to stderr, or the log file for `browse`)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the gitspace table
    List {
        /// Print the raw records as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one gitspace and its console link
    Show {
        /// Gitspace identifier
        id: String,
    },

    /// Start a stopped gitspace
    Start {
        /// Gitspace identifier
        id: String,
    },

    /// Stop a running gitspace
    Stop {
        /// Gitspace identifier
        id: String,
    },

    /// Start the gitspace if it is not running, stop it otherwise
    Toggle {
        /// Gitspace identifier
        id: String,
    },

    /// Delete a gitspace
    Delete {
        /// Gitspace identifier
        id: String,
    },

    /// Print the console link to edit a gitspace
    Edit {
        /// Gitspace identifier
        id: String,
    },

    /// Open a gitspace in its configured IDE
    Open {
        /// Gitspace identifier
        id: String,
    },

    /// Interactive gitspace table
    #[command(after_help = "KEYS:
    ↑/↓     select a gitspace
    Enter   show details and console link
    s       start or stop the selected gitspace
    d       delete the selected gitspace
    e       show the edit link
    o       open in the configured IDE
    r       refresh now
    q       quit")]
    Browse,

    /// Show or change configuration (~/.config/gitspaces/config.toml)
    #[command(after_help = "KEYS:
    base_url             - API gateway root
    console_url          - Web console root for links
    account              - Account identifier
    org                  - Organization identifier
    project              - Project identifier
    token_env            - Environment variable holding the API token
    request_timeout_secs - Per-request timeout for start/stop and delete
    poll_interval_ms     - Terminal view tick")]
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },

    /// Output shell completion script to stdout
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose, matches!(cli.command, Commands::Browse));

    let result = match cli.command {
        Commands::List { json } => list_command(json),
        Commands::Show { id } => show_command(&id),
        Commands::Start { id } => action_command(ActionKind::Start, &id),
        Commands::Stop { id } => action_command(ActionKind::Stop, &id),
        Commands::Toggle { id } => action_command(ActionKind::StartStop, &id),
        Commands::Delete { id } => action_command(ActionKind::Delete, &id),
        Commands::Edit { id } => action_command(ActionKind::Edit, &id),
        Commands::Open { id } => action_command(ActionKind::Open, &id),
        Commands::Browse => browse_command(),
        Commands::Config { subcommand: None } => config_display_command(),
        Commands::Config {
            subcommand: Some(ConfigSubcommand::Set { key, value }),
        } => config_set_command(&key, &value),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "gitspaces", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Install the tracing subscriber.
///
/// The terminal view owns the screen, so `browse` logs to a file in the
/// config directory instead of stderr.
fn init_tracing(verbose: bool, to_file: bool) {
    let log_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gitspaces={}", log_level)));

    if to_file {
        let file = ensure_config_dir()
            .and_then(|_| log_path())
            .ok()
            .and_then(|path| {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .ok()
            });
        if let Some(file) = file {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
