pub mod access_points;
pub mod portal;
pub mod telemetry;
pub mod users;
