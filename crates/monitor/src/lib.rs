//! Access-point health monitoring.
//!
//! [`ping`] probes a single host with the system ping utility,
//! [`monitor`] sweeps every active access point and records state
//! transitions, and [`alert`] delivers offline notifications to the
//! configured webhook.

pub mod alert;
pub mod monitor;
pub mod ping;

pub use alert::AlertSender;
pub use monitor::{probe_all, record_outcome, ProbeReport, Transition};
pub use ping::{ping_host, ProbeOutcome};
