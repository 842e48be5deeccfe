//! Core domain types and computation.

pub mod ohlcv;
pub mod series;
pub mod returns;
pub mod ranking;
pub mod summary;
pub mod correlation;
pub mod dashboard;
pub mod error;
