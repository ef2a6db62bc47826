//! Entity models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct
//! matching the database row, plus create DTOs for inserts.

pub mod access_point;
pub mod session;
pub mod telemetry;
pub mod user;
