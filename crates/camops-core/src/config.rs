use crate::error::{OpsError, Result};
use crate::paths;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    /// Public domain the site is served from; the dns step checks it
    /// resolves to `server_address`.
    pub domain: String,
}

pub const PLACEHOLDER_DOMAIN: &str = "cameras.example.org";

// ---------------------------------------------------------------------------
// ContainerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(default = "default_db_name")]
    pub db_name: String,
    #[serde(default = "default_db_image")]
    pub db_image: String,
    #[serde(default = "default_web_name")]
    pub web_name: String,
    #[serde(default = "default_web_image")]
    pub web_image: String,
    #[serde(default = "default_web_port")]
    pub web_port: u16,
    #[serde(default = "default_db_volume")]
    pub db_volume: String,
}

fn default_db_name() -> String {
    "cameras-db".to_string()
}

fn default_db_image() -> String {
    "docker.io/postgis/postgis:15-3.4".to_string()
}

fn default_web_name() -> String {
    "cameras-web".to_string()
}

fn default_web_image() -> String {
    "localhost/cameras-web:latest".to_string()
}

fn default_web_port() -> u16 {
    8000
}

fn default_db_volume() -> String {
    "cameras-pgdata".to_string()
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            db_name: default_db_name(),
            db_image: default_db_image(),
            web_name: default_web_name(),
            web_image: default_web_image(),
            web_port: default_web_port(),
            db_volume: default_db_volume(),
        }
    }
}

// ---------------------------------------------------------------------------
// RetryConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_interval_secs() -> u64 {
    2
}

fn default_max_attempts() -> u32 {
    15
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(Duration::from_secs(self.interval_secs), self.max_attempts)
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    /// Public address of this server. Optional: when absent the dns step
    /// only checks the domain resolves at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_address: Option<String>,
    #[serde(default)]
    pub containers: ContainerConfig,
    #[serde(default = "default_env_file")]
    pub env_file: String,
    #[serde(default = "default_health_url")]
    pub health_url: String,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_version() -> u32 {
    1
}

fn default_env_file() -> String {
    paths::ENV_FILE.to_string()
}

fn default_health_url() -> String {
    "http://127.0.0.1:8000/healthz/".to_string()
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                domain: PLACEHOLDER_DOMAIN.to_string(),
            },
            server_address: None,
            containers: ContainerConfig::default(),
            env_file: default_env_file(),
            health_url: default_health_url(),
            retry: RetryConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(OpsError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.project.domain == PLACEHOLDER_DOMAIN {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "project.domain is still the placeholder '{PLACEHOLDER_DOMAIN}'"
                ),
            });
        }

        if self.retry.max_attempts == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "retry.max_attempts is 0; readiness checks get a single attempt"
                    .to_string(),
            });
        }

        if !self.health_url.starts_with("http://") && !self.health_url.starts_with("https://") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("health_url '{}' is not an http(s) URL", self.health_url),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::new("nola-cameras");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.project.name, "nola-cameras");
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.containers.db_name, "cameras-db");
    }

    #[test]
    fn minimal_yaml_fills_defaults() {
        let yaml = "version: 1\nproject:\n  name: cams\n  domain: cams.nola.gov\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.env_file, ".env");
        assert_eq!(cfg.retry.max_attempts, 15);
        assert!(cfg.server_address.is_none());
        assert_eq!(cfg.containers.web_port, 8000);
    }

    #[test]
    fn load_without_file_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(OpsError::NotInitialized)
        ));
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("cams");
        cfg.project.domain = "cams.nola.gov".to_string();
        cfg.server_address = Some("203.0.113.10".to_string());
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.project.domain, "cams.nola.gov");
        assert_eq!(loaded.server_address.as_deref(), Some("203.0.113.10"));
    }

    #[test]
    fn validate_flags_placeholder_domain() {
        let cfg = Config::new("cams");
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("placeholder")));
    }

    #[test]
    fn validate_warns_on_zero_max_attempts() {
        let mut cfg = Config::new("cams");
        cfg.project.domain = "cams.nola.gov".to_string();
        cfg.retry.max_attempts = 0;
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("max_attempts")));
    }

    #[test]
    fn validate_clean_config_has_no_warnings() {
        let mut cfg = Config::new("cams");
        cfg.project.domain = "cams.nola.gov".to_string();
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn retry_config_builds_policy() {
        let rc = RetryConfig {
            interval_secs: 3,
            max_attempts: 7,
        };
        let policy = rc.policy();
        assert_eq!(policy.interval, Duration::from_secs(3));
        assert_eq!(policy.max_attempts, 7);
    }
}
