//! Dashboard rendering port trait.

use crate::domain::dashboard::DashboardSnapshot;
use crate::domain::error::StockdashError;

/// Port for writing a rendered dashboard.
pub trait ReportPort {
    fn write(&self, snapshot: &DashboardSnapshot, output_path: &str)
    -> Result<(), StockdashError>;
}
