use anyhow::Context;
use camops_core::{config::Config, envfile, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cameras".to_string());

    println!("Initializing camops in: {}", root.display());

    io::ensure_dir(&paths::camops_dir(root))
        .with_context(|| format!("failed to create {}", paths::camops_dir(root).display()))?;

    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let cfg = Config::new(&project_name);
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    let env_path = paths::env_file_path(root);
    let cfg = Config::load(root).context("failed to load config.yaml")?;
    if envfile::write_template(&env_path, &cfg.project.domain)
        .context("failed to write env template")?
    {
        println!("  created: {}", paths::ENV_FILE);
    } else {
        println!("  exists:  {}", paths::ENV_FILE);
    }

    println!();
    println!("Next steps:");
    println!("  1. Edit {} (domain, server_address)", paths::CONFIG_FILE);
    println!("  2. Fill in {} (run 'camops env check' to verify)", paths::ENV_FILE);
    println!("  3. Run 'camops prepare'");

    Ok(())
}
