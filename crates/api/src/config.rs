use std::time::Duration;

use gatekeep_routeros::RouterConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development
/// apart from the router credentials, which must be set explicitly.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How often the session expiry sweep runs (default: 30 min).
    pub session_expiry_interval_secs: u64,
    /// How often the access-point probe cycle runs (default: 5 min).
    pub ap_probe_interval_secs: u64,
    /// Router control API endpoint and credentials.
    pub router: RouterConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default     |
    /// |-------------------------------|-------------|
    /// | `HOST`                        | `0.0.0.0`   |
    /// | `PORT`                        | `3000`      |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`        |
    /// | `SESSION_EXPIRY_INTERVAL_SECS`| `1800`      |
    /// | `AP_PROBE_INTERVAL_SECS`      | `300`       |
    /// | `MIKROTIK_HOST`               | `192.168.88.1` |
    /// | `MIKROTIK_PORT`               | `8728`      |
    /// | `MIKROTIK_USER`               | `admin`     |
    /// | `MIKROTIK_PASSWORD`           | (empty)     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let session_expiry_interval_secs: u64 = std::env::var("SESSION_EXPIRY_INTERVAL_SECS")
            .unwrap_or_else(|_| "1800".into())
            .parse()
            .expect("SESSION_EXPIRY_INTERVAL_SECS must be a valid u64");

        let ap_probe_interval_secs: u64 = std::env::var("AP_PROBE_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("AP_PROBE_INTERVAL_SECS must be a valid u64");

        let router = RouterConfig {
            host: std::env::var("MIKROTIK_HOST").unwrap_or_else(|_| "192.168.88.1".into()),
            port: std::env::var("MIKROTIK_PORT")
                .unwrap_or_else(|_| "8728".into())
                .parse()
                .expect("MIKROTIK_PORT must be a valid u16"),
            username: std::env::var("MIKROTIK_USER").unwrap_or_else(|_| "admin".into()),
            password: std::env::var("MIKROTIK_PASSWORD").unwrap_or_default(),
            timeout: Duration::from_secs(10),
        };

        Self {
            host,
            port,
            request_timeout_secs,
            session_expiry_interval_secs,
            ap_probe_interval_secs,
            router,
        }
    }
}
