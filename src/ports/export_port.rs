//! Export port for the file-producing collaborators.

use crate::domain::error::StockdashError;
use crate::domain::summary::{SecuritySummary, VolatilityRow};
use crate::ports::table_port::RawTable;

pub trait ExportPort {
    /// One table per security with the source columns, rows in ascending
    /// date order.
    fn write_security(&self, ticker: &str, table: &RawTable) -> Result<(), StockdashError>;

    fn write_summary(&self, rows: &[SecuritySummary]) -> Result<(), StockdashError>;

    fn write_volatility(&self, rows: &[VolatilityRow]) -> Result<(), StockdashError>;
}
