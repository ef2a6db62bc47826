//! Codec for the router telemetry wire format.
//!
//! Routers push snapshots as semicolon-separated records with
//! comma-separated fields (DNS uses `domain>ip`). Fields are plain
//! text with **no escaping**: a hostname or domain containing `,`,
//! `;` or `>` corrupts its record. The grammar is preserved as-is for
//! compatibility with deployed sender scripts; do not "fix" it here.
//!
//! Decoding is purely structural. Records with the wrong field count
//! are skipped, unparsable numeric fields default to `0`, and an
//! unparsable port becomes `None`. A batch never fails because of a
//! few bad rows.

use serde::Serialize;

/// One client traffic record: `IP,Hostname [MAC],bytesUp,bytesDown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRecord {
    pub ip_address: String,
    pub hostname: Option<String>,
    pub mac_address: Option<String>,
    pub bytes_up: i64,
    pub bytes_down: i64,
}

/// One WAN interface record: `Name,txDeltaBytes,rxDeltaBytes,up|down`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceRecord {
    pub interface_name: String,
    pub tx_bytes: i64,
    pub rx_bytes: i64,
    pub is_up: bool,
}

/// One connection-tracking record:
/// `srcIP,dstIP,dstPort,bytesOrig,bytesReply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionRecord {
    pub src_ip: String,
    pub dst_ip: String,
    pub dst_port: Option<i32>,
    pub bytes_orig: i64,
    pub bytes_reply: i64,
}

/// One DNS cache record: `domain>ip`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsRecord {
    pub domain: String,
    pub ip_address: Option<String>,
}

/// Parse a non-negative integer field, defaulting to `0`.
///
/// Only plain decimal digit runs are accepted; anything else
/// (including negative numbers and embedded whitespace) is treated as
/// malformed and becomes zero.
fn parse_bytes(field: &str) -> i64 {
    let trimmed = field.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        trimmed.parse().unwrap_or(0)
    } else {
        0
    }
}

/// Split raw input into trimmed, non-empty records.
fn records(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';').map(str::trim).filter(|s| !s.is_empty())
}

/// Split a `"Hostname [MAC]"` field into its parts.
///
/// The bracketed MAC suffix is optional. A bare hostname yields
/// `(Some(host), None)`; an empty field yields `(None, None)`.
fn split_host_and_mac(field: &str) -> (Option<String>, Option<String>) {
    let field = field.trim();
    if let Some(open) = field.rfind('[') {
        if field.ends_with(']') && open < field.len() - 1 {
            let mac = field[open + 1..field.len() - 1].trim();
            let host = field[..open].trim();
            return (
                (!host.is_empty()).then(|| host.to_string()),
                (!mac.is_empty()).then(|| mac.to_string()),
            );
        }
    }
    ((!field.is_empty()).then(|| field.to_string()), None)
}

/// Parse the client traffic payload.
///
/// Records with fewer than four fields or an empty IP are skipped.
pub fn parse_clients(raw: &str) -> Vec<ClientRecord> {
    let mut result = Vec::new();
    for entry in records(raw) {
        let parts: Vec<&str> = entry.split(',').collect();
        if parts.len() < 4 {
            continue;
        }

        let ip = parts[0].trim();
        if ip.is_empty() {
            continue;
        }

        let (hostname, mac_address) = split_host_and_mac(parts[1]);
        result.push(ClientRecord {
            ip_address: ip.to_string(),
            hostname,
            mac_address,
            bytes_up: parse_bytes(parts[2]),
            bytes_down: parse_bytes(parts[3]),
        });
    }
    result
}

/// Parse the WAN interface payload.
pub fn parse_interfaces(raw: &str) -> Vec<InterfaceRecord> {
    let mut result = Vec::new();
    for entry in records(raw) {
        let parts: Vec<&str> = entry.split(',').collect();
        if parts.len() < 4 {
            continue;
        }
        result.push(InterfaceRecord {
            interface_name: parts[0].trim().to_string(),
            tx_bytes: parse_bytes(parts[1]),
            rx_bytes: parse_bytes(parts[2]),
            is_up: parts[3].trim().eq_ignore_ascii_case("up"),
        });
    }
    result
}

/// Parse the connection-tracking payload.
pub fn parse_connections(raw: &str) -> Vec<ConnectionRecord> {
    let mut result = Vec::new();
    for entry in records(raw) {
        let parts: Vec<&str> = entry.split(',').collect();
        if parts.len() < 5 {
            continue;
        }
        result.push(ConnectionRecord {
            src_ip: parts[0].trim().to_string(),
            dst_ip: parts[1].trim().to_string(),
            dst_port: parts[2].trim().parse().ok(),
            bytes_orig: parse_bytes(parts[3]),
            bytes_reply: parse_bytes(parts[4]),
        });
    }
    result
}

/// Parse the DNS cache payload.
///
/// Records without a `>` separator or with an empty domain are
/// skipped; an empty IP side becomes `None`.
pub fn parse_dns(raw: &str) -> Vec<DnsRecord> {
    let mut result = Vec::new();
    for entry in records(raw) {
        let Some(idx) = entry.find('>') else {
            continue;
        };
        let domain = entry[..idx].trim();
        if domain.is_empty() {
            continue;
        }
        let ip = entry[idx + 1..].trim();
        result.push(DnsRecord {
            domain: domain.to_string(),
            ip_address: (!ip.is_empty()).then(|| ip.to_string()),
        });
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_record_with_mac() {
        let parsed = parse_clients("10.0.0.5,LAPTOP [AA:BB:CC:DD:EE:FF],100,200;");
        assert_eq!(
            parsed,
            vec![ClientRecord {
                ip_address: "10.0.0.5".into(),
                hostname: Some("LAPTOP".into()),
                mac_address: Some("AA:BB:CC:DD:EE:FF".into()),
                bytes_up: 100,
                bytes_down: 200,
            }]
        );
    }

    #[test]
    fn client_record_without_mac() {
        let parsed = parse_clients("192.168.1.10,printer,5,7;");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].hostname.as_deref(), Some("printer"));
        assert_eq!(parsed[0].mac_address, None);
    }

    #[test]
    fn client_record_empty_hostname() {
        let parsed = parse_clients("192.168.1.10,,5,7;");
        assert_eq!(parsed[0].hostname, None);
        assert_eq!(parsed[0].mac_address, None);
    }

    #[test]
    fn client_records_skip_malformed() {
        // Second record is missing fields, third has no IP.
        let parsed = parse_clients("10.0.0.1,a,1,2;10.0.0.2,b;,c,3,4;10.0.0.3,d,5,6;");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].ip_address, "10.0.0.1");
        assert_eq!(parsed[1].ip_address, "10.0.0.3");
    }

    #[test]
    fn client_bad_byte_counts_default_to_zero() {
        let parsed = parse_clients("10.0.0.1,host,abc,-5;");
        assert_eq!(parsed[0].bytes_up, 0);
        assert_eq!(parsed[0].bytes_down, 0);
    }

    #[test]
    fn interface_records_up_and_down() {
        let parsed = parse_interfaces("eth0,500,700,up;wlan0,10,20,down;");
        assert_eq!(parsed.len(), 2);
        assert!(parsed[0].is_up);
        assert_eq!(parsed[0].interface_name, "eth0");
        assert_eq!(parsed[0].tx_bytes, 500);
        assert_eq!(parsed[0].rx_bytes, 700);
        assert!(!parsed[1].is_up);
    }

    #[test]
    fn interface_state_is_case_insensitive() {
        let parsed = parse_interfaces("eth0,1,2,UP;");
        assert!(parsed[0].is_up);
    }

    #[test]
    fn connection_record_basic() {
        let parsed = parse_connections("10.0.0.5,142.250.1.1,443,1000,50000;");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].dst_port, Some(443));
        assert_eq!(parsed[0].bytes_orig, 1000);
        assert_eq!(parsed[0].bytes_reply, 50000);
    }

    #[test]
    fn connection_bad_port_is_none() {
        let parsed = parse_connections("10.0.0.5,1.1.1.1,https,1,2;");
        assert_eq!(parsed[0].dst_port, None);
    }

    #[test]
    fn connection_skips_short_records() {
        let parsed = parse_connections("10.0.0.5,1.1.1.1,443,1;");
        assert!(parsed.is_empty());
    }

    #[test]
    fn dns_records() {
        let parsed = parse_dns("example.com>93.184.216.34;cdn.example.net>;");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].domain, "example.com");
        assert_eq!(parsed[0].ip_address.as_deref(), Some("93.184.216.34"));
        assert_eq!(parsed[1].ip_address, None);
    }

    #[test]
    fn dns_skips_missing_separator_and_empty_domain() {
        let parsed = parse_dns("no-separator;>1.2.3.4;ok.example>5.6.7.8;");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].domain, "ok.example");
    }

    #[test]
    fn empty_payloads_parse_to_empty() {
        assert!(parse_clients("").is_empty());
        assert!(parse_interfaces("  ").is_empty());
        assert!(parse_connections(";;;").is_empty());
        assert!(parse_dns("").is_empty());
    }
}
