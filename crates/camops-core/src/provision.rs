//! The fixed production provisioning sequence.
//!
//! This is the checkpointed `prepare` registry: take a fresh VPS to a
//! hardened host serving the camera-mapping app. Step order matters: the
//! firewall must exist before services bind, the env file must validate
//! before the dns step reads the domain out of it, deployment must precede
//! verification. Every action is written to be safe to re-run, because a
//! step interrupted before its checkpoint line was written will execute
//! again on resume.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::{Config, WarnLevel};
use crate::engine;
use crate::envfile::EnvFile;
use crate::error::{OpsError, Result};
use crate::io;
use crate::probe;
use crate::step::{Registry, Step};

// ---------------------------------------------------------------------------
// Registry construction
// ---------------------------------------------------------------------------

/// Build the production registry. The sequence is fixed for a given release
/// of the tool; actions capture what they need from the config up front so
/// the registry itself is a plain ordered capability table.
pub fn production_registry(root: &Path, config: &Config) -> Result<Registry> {
    let mut reg = Registry::new();

    reg.push(Step::new(
        "packages",
        "Install base packages (ufw, fail2ban)",
        install_packages,
    )?);

    reg.push(Step::new(
        "firewall",
        "Configure firewall (ssh, http, https)",
        configure_firewall,
    )?);

    reg.push(Step::new(
        "ssh-hardening",
        "Harden SSH (key-only login)",
        harden_ssh,
    )?);

    {
        let root = root.to_path_buf();
        let config = config.clone();
        reg.push(Step::new(
            "env",
            "Validate configuration and environment file",
            move || validate_environment(&root, &config),
        )?);
    }

    {
        let domain = config.project.domain.clone();
        let expected = config.server_address.clone();
        reg.push(Step::new(
            "dns",
            format!("Check DNS for {domain}"),
            move || check_dns(&domain, expected.as_deref()),
        )?);
    }

    {
        let root = root.to_path_buf();
        let config = config.clone();
        reg.push(Step::new(
            "deploy",
            "Start database and web containers",
            move || deploy_containers(&root, &config),
        )?);
    }

    {
        let config = config.clone();
        reg.push(Step::new(
            "migrate",
            "Run database migrations and collect static files",
            move || run_migrations(&config),
        )?);
    }

    {
        let config = config.clone();
        reg.push(Step::new(
            "verify",
            format!("Verify health at {}", config.health_url),
            move || verify_health(&config),
        )?);
    }

    Ok(reg)
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

fn install_packages() -> Result<()> {
    require_root()?;
    run_cmd("apt-get", &["update", "-q"])?;
    run_cmd("apt-get", &["install", "-y", "-q", "ufw", "fail2ban"])?;
    Ok(())
}

fn configure_firewall() -> Result<()> {
    require_root()?;
    require_tool("ufw")?;
    // `ufw allow` of an existing rule is a no-op, so re-running is safe.
    run_cmd("ufw", &["allow", "OpenSSH"])?;
    run_cmd("ufw", &["allow", "80/tcp"])?;
    run_cmd("ufw", &["allow", "443/tcp"])?;
    run_cmd("ufw", &["--force", "enable"])?;
    Ok(())
}

const SSHD_DROPIN: &str = "/etc/ssh/sshd_config.d/99-camops.conf";
const SSHD_DROPIN_CONTENT: &str = "\
PasswordAuthentication no\n\
PermitRootLogin prohibit-password\n\
MaxAuthTries 3\n\
X11Forwarding no\n";

fn harden_ssh() -> Result<()> {
    require_root()?;
    io::atomic_write(&PathBuf::from(SSHD_DROPIN), SSHD_DROPIN_CONTENT.as_bytes())?;
    // Validate before reload so a bad drop-in can't lock the operator out.
    run_cmd("sshd", &["-t"])?;
    run_cmd("systemctl", &["reload", "ssh"])?;
    Ok(())
}

fn validate_environment(root: &Path, config: &Config) -> Result<()> {
    let mut errors = Vec::new();
    for note in config.validate() {
        match note.level {
            WarnLevel::Error => errors.push(note.message),
            WarnLevel::Warning => tracing::warn!("config: {}", note.message),
        }
    }
    if !errors.is_empty() {
        return Err(OpsError::Validation(errors.join("; ")));
    }

    EnvFile::load(&root.join(&config.env_file))?.validate()
}

fn check_dns(domain: &str, expected: Option<&str>) -> Result<()> {
    let expected: Option<IpAddr> = match expected {
        Some(s) => Some(s.parse().map_err(|_| {
            OpsError::Validation(format!("server_address '{s}' is not an IP address"))
        })?),
        None => None,
    };
    probe::dns_resolves(domain, expected)
}

fn deploy_containers(root: &Path, config: &Config) -> Result<()> {
    let eng = engine::require()?;
    engine::start_db(eng, root, config)?;
    config
        .retry
        .policy()
        .poll("database readiness", || engine::db_ready(eng, config))?;
    engine::start_web(eng, root, config)?;
    Ok(())
}

fn run_migrations(config: &Config) -> Result<()> {
    let eng = engine::require()?;
    engine::manage(eng, config, &["migrate", "--noinput"])?;
    engine::manage(eng, config, &["collectstatic", "--noinput"])?;
    Ok(())
}

fn verify_health(config: &Config) -> Result<()> {
    probe::wait_for_http(&config.health_url, config.retry.policy())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn require_root() -> Result<()> {
    let out = Command::new("id").arg("-u").output()?;
    let uid = String::from_utf8_lossy(&out.stdout).trim().to_string();
    if uid != "0" {
        return Err(OpsError::Precondition(
            "must run as root (system packages, firewall, sshd)".into(),
        ));
    }
    Ok(())
}

fn require_tool(name: &str) -> Result<()> {
    which::which(name)
        .map(|_| ())
        .map_err(|_| OpsError::Precondition(format!("required tool '{name}' not found on PATH")))
}

fn run_cmd(program: &str, args: &[&str]) -> Result<()> {
    tracing::debug!(program, ?args, "provisioning command");
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .status()
        .map_err(|e| OpsError::CommandFailed {
            command: format!("{program} {}", args.join(" ")),
            detail: e.to_string(),
        })?;
    if !status.success() {
        return Err(OpsError::CommandFailed {
            command: format!("{program} {}", args.join(" ")),
            detail: format!("exit status {status}"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn registry_order_is_fixed() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::new("cams");
        let reg = production_registry(dir.path(), &cfg).unwrap();
        let ids: Vec<&str> = reg.ids().collect();
        assert_eq!(
            ids,
            [
                "packages",
                "firewall",
                "ssh-hardening",
                "env",
                "dns",
                "deploy",
                "migrate",
                "verify"
            ]
        );
    }

    #[test]
    fn every_step_has_a_description() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::new("cams");
        let reg = production_registry(dir.path(), &cfg).unwrap();
        for step in reg.steps() {
            assert!(!step.description.is_empty(), "{} lacks description", step.id);
        }
    }

    #[test]
    fn env_step_rejects_placeholder_config() {
        // Default config still carries the placeholder domain, so the env
        // step must fail before ever touching the env file.
        let dir = TempDir::new().unwrap();
        let cfg = Config::new("cams");
        let err = validate_environment(dir.path(), &cfg).unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn env_step_requires_env_file() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("cams");
        cfg.project.domain = "cams.nola.gov".to_string();
        let err = validate_environment(dir.path(), &cfg).unwrap_err();
        assert!(matches!(err, OpsError::EnvFileNotFound(_)));
    }

    #[test]
    fn env_step_tolerates_warning_level_config_notes() {
        // max_attempts of zero only warns; with a real domain and a complete
        // env file the step must still pass.
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("cams");
        cfg.project.domain = "cams.nola.gov".to_string();
        cfg.retry.max_attempts = 0;
        std::fs::write(
            dir.path().join(".env"),
            "DJANGO_SECRET_KEY=abc123\n\
             DJANGO_SETTINGS_MODULE=config.settings.production\n\
             DJANGO_ALLOWED_HOSTS=cams.nola.gov\n\
             POSTGRES_DB=cameras\n\
             POSTGRES_USER=cameras\n\
             POSTGRES_PASSWORD=s3cret\n",
        )
        .unwrap();

        validate_environment(dir.path(), &cfg).unwrap();
    }

    #[test]
    fn check_dns_rejects_bad_expected_address() {
        let err = check_dns("localhost", Some("not-an-ip")).unwrap_err();
        assert!(err.to_string().contains("not an IP address"));
    }
}
