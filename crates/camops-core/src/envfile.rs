use crate::error::{OpsError, Result};
use crate::io;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Required keys
// ---------------------------------------------------------------------------

/// Keys the Django production settings read at startup. Deployment cannot
/// proceed with any of these missing or still carrying a placeholder value.
pub const REQUIRED_KEYS: &[&str] = &[
    "DJANGO_SECRET_KEY",
    "DJANGO_SETTINGS_MODULE",
    "DJANGO_ALLOWED_HOSTS",
    "POSTGRES_DB",
    "POSTGRES_USER",
    "POSTGRES_PASSWORD",
];

const PLACEHOLDER_VALUES: &[&str] = &["changeme", "change-me", "CHANGEME", "your-value-here"];

// ---------------------------------------------------------------------------
// EnvFile
// ---------------------------------------------------------------------------

/// A parsed `KEY=VALUE` env file. Blank lines and `#` comments are ignored;
/// surrounding single or double quotes on values are stripped.
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    vars: BTreeMap<String, String>,
}

impl EnvFile {
    pub fn parse(data: &str) -> Self {
        let mut vars = BTreeMap::new();
        for line in data.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let mut value = value.trim();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }
            vars.insert(key.to_string(), value.to_string());
        }
        Self { vars }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(OpsError::EnvFileNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        Ok(Self::parse(&data))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Check every required key is present with a real value. Nothing
    /// external is mutated; a failure here is safe to retry after editing
    /// the file.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        for key in REQUIRED_KEYS {
            match self.get(key) {
                None => problems.push(format!("{key} is missing")),
                Some(v) if v.is_empty() => problems.push(format!("{key} is empty")),
                Some(v) if PLACEHOLDER_VALUES.contains(&v) => {
                    problems.push(format!("{key} is still the placeholder '{v}'"))
                }
                Some(_) => {}
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(OpsError::Validation(problems.join("; ")))
        }
    }
}

// ---------------------------------------------------------------------------
// Template generation
// ---------------------------------------------------------------------------

/// Write a starter env file with a freshly generated secret key. Existing
/// files are left alone. Returns true if a file was written.
pub fn write_template(path: &Path, domain: &str) -> Result<bool> {
    let template = render_template(domain, &generate_secret_key());
    io::write_if_missing(path, template.as_bytes())
}

fn render_template(domain: &str, secret_key: &str) -> String {
    format!(
        "# Generated by camops. Fill in the placeholders before deploying.\n\
         DJANGO_SECRET_KEY={secret_key}\n\
         DJANGO_SETTINGS_MODULE=config.settings.production\n\
         DJANGO_ALLOWED_HOSTS={domain}\n\
         POSTGRES_DB=cameras\n\
         POSTGRES_USER=cameras\n\
         POSTGRES_PASSWORD=changeme\n"
    )
}

fn generate_secret_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(50)
        .map(char::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
