use crate::error::{OpsError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CAMOPS_DIR: &str = ".camops";
pub const CONFIG_FILE: &str = ".camops/config.yaml";
pub const CHECKPOINT_FILE: &str = ".camops/prepare.state";
pub const ENV_FILE: &str = ".env";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn camops_dir(root: &Path) -> PathBuf {
    root.join(CAMOPS_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn checkpoint_path(root: &Path) -> PathBuf {
    root.join(CHECKPOINT_FILE)
}

pub fn env_file_path(root: &Path) -> PathBuf {
    root.join(ENV_FILE)
}

// ---------------------------------------------------------------------------
// Step-id validation
// ---------------------------------------------------------------------------

static STEP_ID_RE: OnceLock<Regex> = OnceLock::new();

fn step_id_re() -> &'static Regex {
    STEP_ID_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

/// Step ids are written verbatim as lines of the checkpoint file, so they
/// must never contain whitespace or newlines.
pub fn validate_step_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !step_id_re().is_match(id) {
        return Err(OpsError::InvalidStepId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_step_ids() {
        for id in ["packages", "ssh-hardening", "a", "step-2"] {
            validate_step_id(id).unwrap_or_else(|_| panic!("expected valid: {id}"));
        }
    }

    #[test]
    fn invalid_step_ids() {
        for id in ["", "-leading", "trailing-", "has space", "UPPER", "a_b"] {
            assert!(validate_step_id(id).is_err(), "expected invalid: {id}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/srv/app");
        assert_eq!(
            config_path(root),
            PathBuf::from("/srv/app/.camops/config.yaml")
        );
        assert_eq!(
            checkpoint_path(root),
            PathBuf::from("/srv/app/.camops/prepare.state")
        );
    }
}
