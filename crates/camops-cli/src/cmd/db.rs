use anyhow::Context;
use camops_core::{config::Config, engine};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum DbSubcommand {
    /// Start the database container
    Start,
    /// Stop and remove the database container
    Stop,
}

pub fn run(root: &Path, subcommand: DbSubcommand) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let eng = engine::require().context("no container engine available")?;

    match subcommand {
        DbSubcommand::Start => {
            engine::start_db(eng, root, &config).context("failed to start database")?;
            config
                .retry
                .policy()
                .poll("database readiness", || engine::db_ready(eng, &config))
                .context("database did not become ready")?;
            println!("Database '{}' is running.", config.containers.db_name);
        }
        DbSubcommand::Stop => {
            engine::stop_db(eng, &config).context("failed to stop database")?;
            println!("Database '{}' stopped.", config.containers.db_name);
        }
    }

    Ok(())
}
