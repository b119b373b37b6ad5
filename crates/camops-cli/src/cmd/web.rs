use anyhow::Context;
use camops_core::{config::Config, engine};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum WebSubcommand {
    /// Start the web container
    Start,
    /// Stop and remove the web container
    Stop,
}

pub fn run(root: &Path, subcommand: WebSubcommand) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let eng = engine::require().context("no container engine available")?;

    match subcommand {
        WebSubcommand::Start => {
            engine::start_web(eng, root, &config).context("failed to start web container")?;
            println!(
                "Web container '{}' is running on port {}.",
                config.containers.web_name, config.containers.web_port
            );
        }
        WebSubcommand::Stop => {
            engine::stop_web(eng, &config).context("failed to stop web container")?;
            println!("Web container '{}' stopped.", config.containers.web_name);
        }
    }

    Ok(())
}
