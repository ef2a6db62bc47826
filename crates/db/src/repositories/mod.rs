//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query
//! methods that accept `&PgPool` as the first argument.

pub mod access_point_repo;
pub mod connection_repo;
pub mod dns_repo;
pub mod ping_history_repo;
pub mod session_repo;
pub mod setting_repo;
pub mod traffic_repo;
pub mod user_repo;
pub mod wan_stat_repo;

pub use access_point_repo::AccessPointRepo;
pub use connection_repo::ConnectionRepo;
pub use dns_repo::DnsRepo;
pub use ping_history_repo::PingHistoryRepo;
pub use session_repo::SessionRepo;
pub use setting_repo::SettingRepo;
pub use traffic_repo::TrafficRepo;
pub use user_repo::UserRepo;
pub use wan_stat_repo::WanStatRepo;
