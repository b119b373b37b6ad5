use crate::error::Result;
use crate::paths;

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// The work a step performs. Actions take no arguments and report success or
/// a failure reason. Actions must be idempotent: a step whose completion
/// marker was lost (process killed between the action finishing and the
/// checkpoint write) will be re-invoked on the next run.
pub type Action = Box<dyn FnMut() -> Result<()>>;

/// A single named unit of provisioning work.
pub struct Step {
    pub id: String,
    pub description: String,
    pub action: Action,
}

impl Step {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        action: impl FnMut() -> Result<()> + 'static,
    ) -> Result<Self> {
        let id = id.into();
        paths::validate_step_id(&id)?;
        Ok(Self {
            id,
            description: description.into(),
            action: Box::new(action),
        })
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The fixed, ordered catalog of provisioning steps. Order is significant:
/// later steps depend on the side effects of earlier ones. The sequence is
/// built once at startup and never changes during a run.
#[derive(Debug, Default)]
pub struct Registry {
    steps: Vec<Step>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub(crate) fn steps_mut(&mut self) -> &mut [Step] {
        &mut self.steps
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.id.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_rejects_invalid_id() {
        assert!(Step::new("Bad Id", "nope", || Ok(())).is_err());
    }

    #[test]
    fn registry_preserves_order() {
        let mut reg = Registry::new();
        reg.push(Step::new("packages", "Install packages", || Ok(())).unwrap());
        reg.push(Step::new("firewall", "Configure firewall", || Ok(())).unwrap());
        reg.push(Step::new("deploy", "Deploy containers", || Ok(())).unwrap());

        let ids: Vec<&str> = reg.ids().collect();
        assert_eq!(ids, ["packages", "firewall", "deploy"]);
    }
}
