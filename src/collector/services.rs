// Service state via `systemctl is-active`

use super::command::run_command;
use crate::models::ServiceStatus;
use std::collections::BTreeMap;
use std::time::Duration;

const SYSTEMCTL: &str = "systemctl";

/// Maps the first line of `systemctl is-active` output. Anything other than a recognised
/// state (including empty output) is `Unknown`.
pub fn parse_systemctl_state(stdout: &str) -> ServiceStatus {
    match stdout.lines().next().map(str::trim) {
        Some("active" | "reloading") => ServiceStatus::Active,
        Some("inactive" | "failed" | "activating" | "deactivating" | "maintenance") => {
            ServiceStatus::Inactive
        }
        _ => ServiceStatus::Unknown,
    }
}

async fn read_service(name: &str, timeout: Duration) -> ServiceStatus {
    // is-active exits non-zero for inactive units; the state is still on stdout
    match run_command(SYSTEMCTL, &["is-active", name], timeout).await {
        Ok(output) => parse_systemctl_state(&String::from_utf8_lossy(&output.stdout)),
        Err(e) => {
            tracing::warn!(error = %e, operation = "read_service", service = name, "service state unreadable");
            ServiceStatus::Unknown
        }
    }
}

/// Queries each service in turn.
pub async fn read_services(names: &[String], timeout: Duration) -> BTreeMap<String, ServiceStatus> {
    let mut out = BTreeMap::new();
    for name in names {
        out.insert(name.clone(), read_service(name, timeout).await);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_systemctl_states() {
        assert_eq!(parse_systemctl_state("active\n"), ServiceStatus::Active);
        assert_eq!(parse_systemctl_state("inactive\n"), ServiceStatus::Inactive);
        assert_eq!(parse_systemctl_state("failed\n"), ServiceStatus::Inactive);
        assert_eq!(parse_systemctl_state(""), ServiceStatus::Unknown);
        assert_eq!(parse_systemctl_state("Unit foo.service could not be found."), ServiceStatus::Unknown);
    }
}
