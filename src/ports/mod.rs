//! Port traits (hexagonal boundaries).

pub mod config_port;
pub mod export_port;
pub mod report_port;
pub mod table_port;
