use crate::output::print_json;
use anyhow::Context;
use camops_core::checkpoint::Checkpoint;
use camops_core::config::{Config, ConfigWarning, WarnLevel};
use camops_core::provision;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let registry =
        provision::production_registry(root, &config).context("failed to build step registry")?;
    let checkpoint = Checkpoint::load(root).context("failed to load checkpoint state")?;
    let notes = config.validate();

    // Checkpoint lines that no longer match any registry step. These come
    // from older releases or hand-edited state files; they are harmless but
    // worth surfacing.
    let stale: Vec<&str> = checkpoint
        .done_ids()
        .iter()
        .filter(|id| !registry.ids().any(|r| r == id.as_str()))
        .map(String::as_str)
        .collect();

    if json {
        #[derive(serde::Serialize)]
        struct StepStatus<'a> {
            id: &'a str,
            description: &'a str,
            done: bool,
        }

        #[derive(serde::Serialize)]
        struct StatusOutput<'a> {
            project: &'a str,
            steps: Vec<StepStatus<'a>>,
            stale: Vec<&'a str>,
            config_notes: &'a [ConfigWarning],
        }

        let steps: Vec<StepStatus> = registry
            .steps()
            .iter()
            .map(|s| StepStatus {
                id: &s.id,
                description: &s.description,
                done: checkpoint.contains(&s.id),
            })
            .collect();

        return print_json(&StatusOutput {
            project: &config.project.name,
            steps,
            stale,
            config_notes: &notes,
        });
    }

    println!("Project: {}", config.project.name);

    if !notes.is_empty() {
        println!();
        println!("Config notes:");
        for note in &notes {
            let tag = match note.level {
                WarnLevel::Error => "error",
                WarnLevel::Warning => "warning",
            };
            println!("  {tag}: {}", note.message);
        }
    }

    println!();
    render_steps(&registry, &checkpoint);

    if !stale.is_empty() {
        println!();
        println!("Stale checkpoint entries (no matching step):");
        for id in stale {
            println!("  {id}");
        }
    }

    let pending = registry
        .steps()
        .iter()
        .filter(|s| !checkpoint.contains(&s.id))
        .count();
    println!();
    if pending == 0 {
        println!("All steps complete.");
    } else {
        println!("{pending} step(s) pending. Run 'camops prepare' to continue.");
    }

    Ok(())
}

/// Step table: id and description columns padded to their widest entry,
/// done/pending status last so the eye can scan straight down it.
fn render_steps(registry: &camops_core::step::Registry, checkpoint: &Checkpoint) {
    let id_w = registry
        .ids()
        .map(str::len)
        .max()
        .unwrap_or(0)
        .max("STEP".len());
    let desc_w = registry
        .steps()
        .iter()
        .map(|s| s.description.len())
        .max()
        .unwrap_or(0)
        .max("DESCRIPTION".len());

    println!("{:id_w$}  {:desc_w$}  STATUS", "STEP", "DESCRIPTION");
    for step in registry.steps() {
        let status = if checkpoint.contains(&step.id) {
            "done"
        } else {
            "pending"
        };
        println!("{:id_w$}  {:desc_w$}  {status}", step.id, step.description);
    }
}
