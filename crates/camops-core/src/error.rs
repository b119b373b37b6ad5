use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("not initialized: run 'camops init'")]
    NotInitialized,

    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{what}: gave up after {attempts} attempts: {last_error}")]
    RetryExhausted {
        what: String,
        attempts: u32,
        last_error: String,
    },

    #[error("command failed ({command}): {detail}")]
    CommandFailed { command: String, detail: String },

    #[error("no container engine found: install docker or podman")]
    EngineNotFound,

    #[error("unknown step: {0}")]
    StepNotFound(String),

    #[error("invalid step id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidStepId(String),

    #[error("env file not found: {0}")]
    EnvFileNotFound(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OpsError>;
