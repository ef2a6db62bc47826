//! Validation and sanitization for network-facing string fields.

/// Maximum length for free-text fields forwarded to the router.
const MAX_REMOTE_FIELD_LEN: usize = 100;

/// Check that `ip` is a well-formed dotted-quad IPv4 address.
///
/// Accepts exactly four decimal octets in the 0-255 range. Leading
/// zeros are tolerated (`010.0.0.1` parses as 10.0.0.1), matching the
/// probe targets already stored by deployed installations.
pub fn is_valid_ipv4(ip: &str) -> bool {
    let mut octets = 0;
    for part in ip.split('.') {
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        match part.parse::<u16>() {
            Ok(n) if n <= 255 => octets += 1,
            _ => return false,
        }
    }
    octets == 4 && ip.split('.').count() == 4
}

/// Sanitize a display name before sending it to the router control
/// plane.
///
/// Keeps letters (including accented letters), digits, spaces and
/// hyphens; everything else is stripped. The result is truncated to
/// 100 characters. The router API has no quoting mechanism for
/// attribute values, so anything else could terminate the word early.
pub fn sanitize_display_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
        .take(MAX_REMOTE_FIELD_LEN)
        .collect()
}

/// Truncate a router-supplied name tag to the stored column width.
pub fn truncate_router_name(name: &str) -> String {
    name.chars().take(MAX_REMOTE_FIELD_LEN).collect()
}
