pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod envfile;
pub mod error;
pub mod io;
pub mod orchestrator;
pub mod paths;
pub mod probe;
pub mod provision;
pub mod retry;
pub mod step;

pub use error::{OpsError, Result};
