use anyhow::Context;
use camops_core::checkpoint::Checkpoint;
use std::path::Path;

pub fn run(root: &Path, step: Option<&str>) -> anyhow::Result<()> {
    let mut checkpoint = Checkpoint::load(root).context("failed to load checkpoint state")?;

    match step {
        Some(id) => {
            checkpoint
                .remove(id)
                .with_context(|| format!("failed to forget step '{id}'"))?;
            println!("Forgot step '{id}'. It will re-run on the next 'camops prepare'.");
        }
        None => {
            checkpoint.clear().context("failed to clear checkpoint")?;
            println!("Checkpoint cleared. The next 'camops prepare' starts from scratch.");
        }
    }

    Ok(())
}
