//! Long-running background jobs, each driven by a fixed interval and
//! stopped through a `CancellationToken`.

pub mod ap_probe;
pub mod session_expiry;
