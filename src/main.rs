use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli_exec;

#[derive(Parser)]
#[command(name = "mirrorview")]
#[command(about = "Offline-first mirror of a hosted web app", long_about = None)]
struct Cli {
    /// Data directory (defaults to $MIRRORVIEW_DATA_DIR, then ~/.mirrorview)
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Use line output instead of the full-screen terminal view
    #[arg(long)]
    plain: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the load sequence once in the foreground and report the outcome
    Sync {
        /// Emit JSON
        #[arg(long)]
        json: bool,

        /// Forget the stored signature and download everything again
        #[arg(long)]
        force: bool,
    },

    /// Show the local cache state
    Status {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change the configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the configuration
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Set the remote repository to mirror
    Set {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        repo: String,
        #[arg(long = "ref", default_value = "main")]
        git_ref: String,
        #[arg(long)]
        api_base: Option<String>,
        #[arg(long)]
        raw_base: Option<String>,
        #[arg(long)]
        probe_url: Option<String>,
        /// Directory holding the bundled default content
        #[arg(long)]
        bundled_dir: Option<PathBuf>,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = mirrorview::store::LocalStore::default_root(cli.data_dir.as_deref());

    match cli.command {
        None => cli_exec::launch_shell(&data_dir, cli.plain),
        Some(command) => cli_exec::handle_command(&data_dir, command),
    }
}
