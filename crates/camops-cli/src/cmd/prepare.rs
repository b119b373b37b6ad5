use crate::output::print_json;
use anyhow::Context;
use camops_core::checkpoint::Checkpoint;
use camops_core::config::Config;
use camops_core::orchestrator::{self, Outcome, StepReport};
use camops_core::provision;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut registry =
        provision::production_registry(root, &config).context("failed to build step registry")?;
    let mut checkpoint = Checkpoint::load(root).context("failed to load checkpoint state")?;

    let mut observer: Box<dyn orchestrator::Observer> = if json {
        Box::new(orchestrator::Silent)
    } else {
        Box::new(Progress)
    };

    let result = orchestrator::run(&mut registry, &mut checkpoint, observer.as_mut())
        .context("provisioning run failed")?;

    if json {
        print_json(&result)?;
    } else if result.completed() {
        println!();
        println!(
            "Done: {} succeeded, {} already complete.",
            result.succeeded(),
            result.skipped()
        );
    }

    if let Some(failed) = &result.failed {
        if !json {
            println!();
            println!("Step '{}' ({}) failed:", failed.id, failed.description);
            println!("  {}", failed.reason);
            println!();
            println!("Completed steps are checkpointed. Fix the issue and re-run");
            println!("'camops prepare' to resume from '{}'.", failed.id);
        }
        anyhow::bail!("step '{}' failed: {}", failed.id, failed.reason);
    }

    Ok(())
}

/// Renders `[i/N] description ... status` as the run progresses.
struct Progress;

impl orchestrator::Observer for Progress {
    fn step_started(&mut self, index: usize, total: usize, _id: &str, description: &str) {
        print!("[{index}/{total}] {description} ... ");
        use std::io::Write as _;
        let _ = std::io::stdout().flush();
    }

    fn step_finished(&mut self, report: &StepReport) {
        match &report.outcome {
            Outcome::Skipped => println!("skipped (already done)"),
            Outcome::Succeeded => println!("ok"),
            Outcome::Failed { .. } => println!("FAILED"),
        }
    }
}
