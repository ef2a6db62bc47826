//! RouterOS control-plane client and the device authorization gateway.
//!
//! [`proto`] implements the RouterOS API wire format (length-prefixed
//! words grouped into sentences), [`client`] drives a TCP connection
//! through login and command execution, and [`gateway`] exposes the
//! idempotent authorize/deauthorize operations the portal relies on.

pub mod client;
pub mod gateway;
pub mod proto;

pub use client::{ApiConnector, Connect, RouterOsClient, RouterOsError};
pub use gateway::{DeviceGateway, RouterConfig};
