use crate::error::{OpsError, Result};
use crate::io;
use crate::paths;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Checkpoint
// ---------------------------------------------------------------------------

/// Persisted record of completed step-ids, one id per line, in completion
/// order. A line is appended (and fsynced) the moment a step succeeds and is
/// never removed during a run; removal only happens through the explicit
/// operator operations `clear` and `remove`.
#[derive(Debug)]
pub struct Checkpoint {
    path: PathBuf,
    done: Vec<String>,
}

impl Checkpoint {
    /// Load the checkpoint file under `root`. A missing file is an empty
    /// checkpoint, not an error: first runs start from nothing.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::checkpoint_path(root);
        let done = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            data.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect()
        } else {
            Vec::new()
        };
        Ok(Self { path, done })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.done.iter().any(|d| d == id)
    }

    /// Record `id` as completed. The line is on disk before this returns, so
    /// a crash immediately afterwards cannot un-complete the step. Marking an
    /// already-done id is a no-op.
    pub fn mark_done(&mut self, id: &str) -> Result<()> {
        paths::validate_step_id(id)?;
        if self.contains(id) {
            return Ok(());
        }
        io::append_line_durable(&self.path, id)?;
        self.done.push(id.to_string());
        Ok(())
    }

    /// Forget everything: delete the checkpoint file. Operator-only; the
    /// orchestrator never calls this mid-run.
    pub fn clear(&mut self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        self.done.clear();
        Ok(())
    }

    /// Remove a single step-id so that step re-executes on the next run.
    /// Rewrites the file without the line; errors if the id was not done.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        if !self.contains(id) {
            return Err(OpsError::StepNotFound(id.to_string()));
        }
        self.done.retain(|d| d != id);
        let mut data = self.done.join("\n");
        if !data.is_empty() {
            data.push('\n');
        }
        io::atomic_write(&self.path, data.as_bytes())
    }

    pub fn done_ids(&self) -> &[String] {
        &self.done
    }

    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
