use anyhow::Context;
use camops_core::{config::Config, envfile};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum EnvSubcommand {
    /// Write a starter env file with a generated secret key (never overwrites)
    Init,
    /// Validate the env file: required keys present, no placeholders left
    Check,
}

pub fn run(root: &Path, subcommand: EnvSubcommand) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let env_path = root.join(&config.env_file);

    match subcommand {
        EnvSubcommand::Init => {
            if envfile::write_template(&env_path, &config.project.domain)
                .context("failed to write env template")?
            {
                println!("Wrote {}. Fill in the placeholders.", config.env_file);
            } else {
                println!("{} already exists; leaving it alone.", config.env_file);
            }
        }
        EnvSubcommand::Check => {
            let env = envfile::EnvFile::load(&env_path)
                .with_context(|| format!("failed to read {}", config.env_file))?;
            env.validate().context("environment file is incomplete")?;
            println!(
                "{} ok: all {} required keys set.",
                config.env_file,
                envfile::REQUIRED_KEYS.len()
            );
        }
    }

    Ok(())
}
