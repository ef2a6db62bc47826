//! Domain logic shared by every gatekeep crate.
//!
//! Pure, I/O-free building blocks: the telemetry wire-format codec,
//! network-field validation and sanitization, the typed settings
//! provider seam, and the core error taxonomy.

pub mod error;
pub mod net;
pub mod settings;
pub mod types;
pub mod wire;
