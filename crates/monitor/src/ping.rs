//! Single-host ICMP probing via the system ping utility.

use std::time::{Duration, Instant};

use gatekeep_core::net::is_valid_ipv4;
use tokio::process::Command;

/// Per-probe reply wait handed to the ping utility.
const REPLY_WAIT: Duration = Duration::from_secs(2);

/// Grace added on top of [`REPLY_WAIT`] before the child is killed.
const KILL_GRACE: Duration = Duration::from_secs(2);

/// Outcome of probing one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub online: bool,
    /// Round-trip latency; `None` when offline or unparseable.
    pub latency_ms: Option<i32>,
}

impl ProbeOutcome {
    pub const OFFLINE: Self = Self {
        online: false,
        latency_ms: None,
    };
}

/// Probe one host with a single ICMP echo request.
///
/// The address is validated as dotted-quad IPv4 before anything is
/// spawned; invalid input is reported offline without touching the
/// system. The subprocess is killed if it outlives the reply wait
/// plus a grace period, and any spawn or wait failure maps to
/// offline.
pub async fn ping_host(ip: &str) -> ProbeOutcome {
    if !is_valid_ipv4(ip) {
        tracing::warn!(ip, "Refusing to probe invalid IPv4 address");
        return ProbeOutcome::OFFLINE;
    }

    let mut command = Command::new("ping");
    #[cfg(target_os = "windows")]
    command.args(["-n", "1", "-w", "2000", ip]);
    #[cfg(not(target_os = "windows"))]
    command.args(["-c", "1", "-W", "2", ip]);
    command.kill_on_drop(true);

    let started = Instant::now();
    let output = match tokio::time::timeout(REPLY_WAIT + KILL_GRACE, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::error!(ip, error = %e, "Failed to spawn ping");
            return ProbeOutcome::OFFLINE;
        }
        Err(_) => {
            tracing::warn!(ip, "Ping timed out");
            return ProbeOutcome::OFFLINE;
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);

    #[cfg(target_os = "windows")]
    let got_reply = windows_reply_received(&stdout);
    #[cfg(not(target_os = "windows"))]
    let got_reply = unix_reply_received(&stdout);

    if !output.status.success() || !got_reply {
        return ProbeOutcome::OFFLINE;
    }

    let latency = parse_latency_ms(&stdout)
        .or_else(|| i32::try_from(started.elapsed().as_millis()).ok());
    ProbeOutcome {
        online: true,
        latency_ms: latency,
    }
}

/// Whether Unix ping output reports the echo reply as received.
#[cfg(any(test, not(target_os = "windows")))]
fn unix_reply_received(stdout: &str) -> bool {
    stdout.to_ascii_lowercase().contains("1 received")
}

/// Whether Windows ping output carries an actual echo reply.
///
/// Exit status alone is not enough there: `ping` exits 0 for a
/// "Destination host unreachable" reply from an intermediate router,
/// which prints no TTL.
#[cfg(any(test, target_os = "windows"))]
fn windows_reply_received(stdout: &str) -> bool {
    stdout.to_ascii_lowercase().contains("ttl=")
}

/// Extract the round-trip time from ping output.
///
/// Handles the two common shapes: `time=12.3 ms` (Unix) and
/// `time=12ms` / `time<1ms` (Windows).
fn parse_latency_ms(stdout: &str) -> Option<i32> {
    let idx = stdout.find("time=").map(|i| i + 5).or_else(|| {
        stdout.find("time<").map(|i| i + 5)
    })?;
    let rest = &stdout[idx..];
    let digits: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let value: f64 = digits.parse().ok()?;
    Some(value.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unix_ping_output() {
        let out = "64 bytes from 10.0.0.1: icmp_seq=1 ttl=64 time=3.42 ms\n";
        assert_eq!(parse_latency_ms(out), Some(3));
    }

    #[test]
    fn parses_windows_ping_output() {
        let out = "Reply from 10.0.0.1: bytes=32 time=17ms TTL=64\r\n";
        assert_eq!(parse_latency_ms(out), Some(17));
        let fast = "Reply from 10.0.0.1: bytes=32 time<1ms TTL=64\r\n";
        assert_eq!(parse_latency_ms(fast), Some(1));
    }

    #[test]
    fn unix_reply_marker_requires_a_received_packet() {
        let ok = "1 packets transmitted, 1 received, 0% packet loss, time 0ms\n";
        assert!(unix_reply_received(ok));

        let lost = "1 packets transmitted, 0 received, 100% packet loss, time 0ms\n";
        assert!(!unix_reply_received(lost));
        assert!(!unix_reply_received(""));
    }

    #[test]
    fn windows_reply_marker_requires_a_ttl() {
        let ok = "Reply from 10.0.0.1: bytes=32 time=17ms TTL=64\r\n";
        assert!(windows_reply_received(ok));

        // Exit code is 0 for this reply, but it is not an echo reply.
        let unreachable = "Reply from 10.0.0.254: Destination host unreachable.\r\n";
        assert!(!windows_reply_received(unreachable));
        assert!(!windows_reply_received("Request timed out.\r\n"));
    }

    #[test]
    fn missing_time_field_yields_none() {
        assert_eq!(parse_latency_ms("1 packets transmitted, 0 received"), None);
        assert_eq!(parse_latency_ms(""), None);
    }

    #[tokio::test]
    async fn invalid_address_is_offline_without_spawning() {
        assert_eq!(ping_host("not-an-ip").await, ProbeOutcome::OFFLINE);
        assert_eq!(ping_host("999.1.1.1").await, ProbeOutcome::OFFLINE);
        assert_eq!(ping_host("10.0.0.1; rm -rf /").await, ProbeOutcome::OFFLINE);
    }
}
