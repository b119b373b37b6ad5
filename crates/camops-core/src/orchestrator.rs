use crate::checkpoint::Checkpoint;
use crate::error::Result;
use crate::step::Registry;
use serde::Serialize;
use std::time::Instant;

// ---------------------------------------------------------------------------
// Outcome / StepReport / RunResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The step's id was already in the checkpoint; its action was not invoked.
    Skipped,
    Succeeded,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// 1-indexed position within the registry, for `[i/N]` display only.
    pub index: usize,
    pub id: String,
    pub description: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedStep {
    pub id: String,
    pub description: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub total: usize,
    pub reports: Vec<StepReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<FailedStep>,
}

impl RunResult {
    pub fn completed(&self) -> bool {
        self.failed.is_none()
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped))
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Succeeded))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// Progress hooks for the enclosing CLI. The orchestrator drives these as
/// steps start and finish; implementations render `[i/N] description` lines.
pub trait Observer {
    fn step_started(&mut self, _index: usize, _total: usize, _id: &str, _description: &str) {}
    fn step_finished(&mut self, _report: &StepReport) {}
}

/// Observer that renders nothing.
pub struct Silent;

impl Observer for Silent {}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Execute the registry in order against the persisted checkpoint.
///
/// Steps whose id is already in the checkpoint are skipped without invoking
/// their action. A step that succeeds is marked done (durably) before the
/// next step starts. The first failure stops the run; the checkpoint is left
/// exactly as it was before the failing step started, so re-invoking `run`
/// with the same state resumes at that step.
///
/// No rollback is attempted on failure. If an action partially mutated an
/// external system before failing, safe resumption relies on the action
/// being idempotent; that is the action author's obligation.
pub fn run(
    registry: &mut Registry,
    checkpoint: &mut Checkpoint,
    observer: &mut dyn Observer,
) -> Result<RunResult> {
    let total = registry.len();
    let mut reports = Vec::with_capacity(total);
    let mut failed = None;

    for (i, step) in registry.steps_mut().iter_mut().enumerate() {
        let index = i + 1;
        observer.step_started(index, total, &step.id, &step.description);
        let started = Instant::now();

        let outcome = if checkpoint.contains(&step.id) {
            Outcome::Skipped
        } else {
            match (step.action)() {
                Ok(()) => {
                    // Durable before we move on: the marker must survive a
                    // crash between this step and the next.
                    checkpoint.mark_done(&step.id)?;
                    Outcome::Succeeded
                }
                Err(e) => Outcome::Failed {
                    reason: e.to_string(),
                },
            }
        };

        let report = StepReport {
            index,
            id: step.id.clone(),
            description: step.description.clone(),
            outcome: outcome.clone(),
            duration_ms: started.elapsed().as_millis() as u64,
        };
        observer.step_finished(&report);

        let halt = if let Outcome::Failed { reason } = &outcome {
            failed = Some(FailedStep {
                id: step.id.clone(),
                description: step.description.clone(),
                reason: reason.clone(),
            });
            true
        } else {
            false
        };

        reports.push(report);
        if halt {
            break;
        }
    }

    Ok(RunResult {
        total,
        reports,
        failed,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
