mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{db::DbSubcommand, env::EnvSubcommand, web::WebSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "camops",
    about = "Checkpointed VPS provisioning for the camera-mapping deployment",
    version,
    propagate_version = true
)]
struct Cli {
    /// Deployment root (default: auto-detect from .camops/ or .git/)
    #[arg(long, global = true, env = "CAMOPS_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize camops in the current project
    Init,

    /// Run the provisioning sequence, resuming from the checkpoint
    Prepare,

    /// Show per-step done/pending status
    Status,

    /// Clear the checkpoint, or forget a single step so it re-runs
    Reset {
        /// Step id to forget (omit to clear everything)
        step: Option<String>,
    },

    /// Manage the database container
    Db {
        #[command(subcommand)]
        subcommand: DbSubcommand,
    },

    /// Manage the web container
    Web {
        #[command(subcommand)]
        subcommand: WebSubcommand,
    },

    /// Bootstrap and check the environment file
    Env {
        #[command(subcommand)]
        subcommand: EnvSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Prepare => cmd::prepare::run(&root, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Reset { step } => cmd::reset::run(&root, step.as_deref()),
        Commands::Db { subcommand } => cmd::db::run(&root, subcommand),
        Commands::Web { subcommand } => cmd::web::run(&root, subcommand),
        Commands::Env { subcommand } => cmd::env::run(&root, subcommand),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
