use crate::error::{OpsError, Result};
use crate::retry::RetryPolicy;
use std::net::{IpAddr, ToSocketAddrs};
use std::time::Duration;

// ---------------------------------------------------------------------------
// HTTP health
// ---------------------------------------------------------------------------

/// One-shot health check: GET the URL, succeed on a 2xx response.
pub fn http_ok(url: &str) -> Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let resp = client.get(url).send()?;
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(OpsError::Validation(format!(
            "health check returned {status} for {url}"
        )))
    }
}

/// Poll the health URL until it answers 2xx or the policy is exhausted.
pub fn wait_for_http(url: &str, policy: RetryPolicy) -> Result<()> {
    policy.poll(&format!("health check {url}"), || http_ok(url))
}

// ---------------------------------------------------------------------------
// DNS
// ---------------------------------------------------------------------------

/// Resolve `domain` and, when an expected address is given, require it to be
/// among the answers. A records changing at the registrar propagate slowly,
/// so this is a pure check an operator can safely re-run.
pub fn dns_resolves(domain: &str, expected: Option<IpAddr>) -> Result<()> {
    let addrs: Vec<IpAddr> = format!("{domain}:443")
        .to_socket_addrs()
        .map_err(|e| OpsError::Validation(format!("could not resolve '{domain}': {e}")))?
        .map(|a| a.ip())
        .collect();

    if addrs.is_empty() {
        return Err(OpsError::Validation(format!(
            "'{domain}' resolved to no addresses"
        )));
    }

    match expected {
        None => Ok(()),
        Some(want) if addrs.contains(&want) => Ok(()),
        Some(want) => Err(OpsError::Validation(format!(
            "'{domain}' resolves to {addrs:?}, expected {want}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_ok_on_200() {
        let mut server = mockito::Server::new();
        let mock = server.mock("GET", "/healthz/").with_status(200).create();

        http_ok(&format!("{}/healthz/", server.url())).unwrap();
        mock.assert();
    }

    #[test]
    fn http_ok_rejects_500() {
        let mut server = mockito::Server::new();
        server.mock("GET", "/healthz/").with_status(500).create();

        let err = http_ok(&format!("{}/healthz/", server.url())).unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn wait_for_http_succeeds_on_healthy_endpoint() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/healthz/")
            .with_status(200)
            .expect(1)
            .create();

        let policy = RetryPolicy::new(Duration::from_millis(1), 5);
        wait_for_http(&format!("{}/healthz/", server.url()), policy).unwrap();
        mock.assert();
    }

    #[test]
    fn wait_for_http_exhausts() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/healthz/")
            .with_status(503)
            .expect(3)
            .create();

        let policy = RetryPolicy::new(Duration::from_millis(1), 3);
        let err = wait_for_http(&format!("{}/healthz/", server.url()), policy).unwrap_err();
        assert!(matches!(err, OpsError::RetryExhausted { attempts: 3, .. }));
    }

    #[test]
    fn dns_resolves_localhost() {
        dns_resolves("localhost", None).unwrap();
    }

    #[test]
    fn dns_expected_mismatch_errors() {
        let want: IpAddr = "203.0.113.99".parse().unwrap();
        let err = dns_resolves("localhost", Some(want)).unwrap_err();
        assert!(err.to_string().contains("expected 203.0.113.99"));
    }

    #[test]
    fn dns_unresolvable_errors() {
        let err = dns_resolves("definitely-not-a-real-host.invalid", None).unwrap_err();
        assert!(err.to_string().contains("could not resolve"));
    }
}
