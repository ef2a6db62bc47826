//! Device authorization gateway.
//!
//! Owns the single shared control-plane connection and performs
//! idempotent authorize/deauthorize operations against it. Both
//! operations signal failure with `false` and never panic or
//! propagate errors across the boundary; any control-plane error
//! invalidates the connection so the next call reconnects from
//! scratch.

use std::sync::Arc;
use std::time::Duration;

use gatekeep_core::net::sanitize_display_name;
use tokio::sync::Mutex;

use crate::client::{ApiConnector, Connect, RouterOsClient, RouterOsError};

/// Comment tag marking bindings owned by the portal for one user.
fn binding_tag(user_key: &str) -> String {
    format!("captive-portal:{user_key}")
}

/// Router connection settings, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl RouterConfig {
    fn connector(&self) -> ApiConnector {
        let mut connector = ApiConnector::new(
            self.host.clone(),
            self.port,
            self.username.clone(),
            self.password.clone(),
        );
        connector.timeout = self.timeout;
        connector
    }
}

/// Grants and revokes network access on the router control plane.
pub struct DeviceGateway {
    connector: Box<dyn Connect>,
    /// The shared connection handle. `None` until first use and after
    /// any failure. The mutex is held across connection establishment
    /// so concurrent callers coalesce onto the single in-flight
    /// attempt instead of opening duplicates.
    conn: Mutex<Option<Arc<dyn RouterOsClient>>>,
}

impl DeviceGateway {
    /// Build a gateway that connects to a real router.
    pub fn new(config: &RouterConfig) -> Self {
        Self::with_connector(Box::new(config.connector()))
    }

    /// Build a gateway over an arbitrary connector (used by tests).
    pub fn with_connector(connector: Box<dyn Connect>) -> Self {
        Self {
            connector,
            conn: Mutex::new(None),
        }
    }

    /// Get the live connection, establishing it lazily.
    async fn acquire(&self) -> Result<Arc<dyn RouterOsClient>, RouterOsError> {
        let mut guard = self.conn.lock().await;
        if let Some(client) = guard.as_ref() {
            return Ok(Arc::clone(client));
        }
        let client = self.connector.connect().await?;
        *guard = Some(Arc::clone(&client));
        Ok(client)
    }

    /// Drop the connection so the next call reconnects fresh.
    async fn invalidate(&self) {
        *self.conn.lock().await = None;
    }

    /// Grant network access for a user.
    ///
    /// Ensures the hotspot user record keyed by `user_key` exists
    /// (lookup before insert, never duplicated), then — when an IP is
    /// known — replaces any prior portal binding for the user with a
    /// single fresh `bypassed` binding. The MAC address is only
    /// logged: client devices rotate MACs per network, so binding one
    /// would strand the user.
    ///
    /// Returns `false` on any control-plane error. Bindings created
    /// before the failing step may remain; callers must not assume a
    /// rollback.
    pub async fn authorize(
        &self,
        mac: Option<&str>,
        ip: Option<&str>,
        user_key: &str,
        display_name: &str,
    ) -> bool {
        match self.try_authorize(ip, user_key, display_name).await {
            Ok(()) => {
                tracing::info!(user_key, ?mac, ?ip, "Router authorization complete");
                true
            }
            Err(e) => {
                tracing::error!(user_key, error = %e, "Router authorization failed");
                self.invalidate().await;
                false
            }
        }
    }

    async fn try_authorize(
        &self,
        ip: Option<&str>,
        user_key: &str,
        display_name: &str,
    ) -> Result<(), RouterOsError> {
        let client = self.acquire().await?;

        let existing = client
            .command("/ip/hotspot/user/print", &[format!("?name={user_key}")])
            .await?;

        if existing.is_empty() {
            let words = [
                format!("=name={user_key}"),
                format!("=comment={}", sanitize_display_name(display_name)),
                "=server=all".to_string(),
            ];
            client.command("/ip/hotspot/user/add", &words).await?;
            tracing::info!(user_key, "Hotspot user created");
        }

        if let Some(ip) = ip {
            self.remove_bindings(client.as_ref(), user_key).await?;

            let words = [
                format!("=address={ip}"),
                "=type=bypassed".to_string(),
                format!("=comment={}", binding_tag(user_key)),
            ];
            client.command("/ip/hotspot/ip-binding/add", &words).await?;
            tracing::info!(user_key, ip, "IP binding created");
        }

        Ok(())
    }

    /// Revoke network access for a user.
    ///
    /// Removes every binding tagged for the user. With `full_delete`
    /// the hotspot user record itself is also removed — used only for
    /// permanent data-subject deletion.
    ///
    /// Returns `false` on failure.
    pub async fn deauthorize(&self, user_key: &str, full_delete: bool) -> bool {
        match self.try_deauthorize(user_key, full_delete).await {
            Ok(()) => {
                tracing::info!(user_key, full_delete, "Router authorization removed");
                true
            }
            Err(e) => {
                tracing::error!(user_key, error = %e, "Router deauthorization failed");
                self.invalidate().await;
                false
            }
        }
    }

    async fn try_deauthorize(&self, user_key: &str, full_delete: bool) -> Result<(), RouterOsError> {
        let client = self.acquire().await?;

        self.remove_bindings(client.as_ref(), user_key).await?;

        if full_delete {
            let users = client
                .command("/ip/hotspot/user/print", &[format!("?name={user_key}")])
                .await?;
            for user in users {
                if let Some(id) = user.get(".id") {
                    client
                        .command("/ip/hotspot/user/remove", &[format!("=.id={id}")])
                        .await?;
                }
            }
            tracing::info!(user_key, "Hotspot user record removed");
        }

        Ok(())
    }

    /// Remove every portal binding tagged for the user.
    async fn remove_bindings(
        &self,
        client: &dyn RouterOsClient,
        user_key: &str,
    ) -> Result<(), RouterOsError> {
        let bindings = client
            .command(
                "/ip/hotspot/ip-binding/print",
                &[format!("?comment={}", binding_tag(user_key))],
            )
            .await?;

        for binding in bindings {
            if let Some(id) = binding.get(".id") {
                client
                    .command("/ip/hotspot/ip-binding/remove", &[format!("=.id={id}")])
                    .await?;
            }
        }
        Ok(())
    }
}
