pub mod export_data;
pub mod export_data_long;

use crate::config::SourceConfig;
use crate::constants::{ADAPTIVE_CONNECTOR, ADAPTIVE_INSIGHTS_CONNECTOR};
use crate::types::AdaptiveStream;

pub use export_data::{field_name, ExportDataStream, MappingOrder};
pub use export_data_long::ExportDataLongStream;

/// Which connector a binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorVariant {
    /// Flat per-row export projected through a column mapping
    MappingOrder,
    /// Wide export melted into one record per period
    WideExport,
}

impl ConnectorVariant {
    pub fn connector_name(&self) -> &'static str {
        match self {
            ConnectorVariant::MappingOrder => ADAPTIVE_CONNECTOR,
            ConnectorVariant::WideExport => ADAPTIVE_INSIGHTS_CONNECTOR,
        }
    }

    pub fn build(&self, config: SourceConfig) -> Box<dyn AdaptiveStream> {
        match self {
            ConnectorVariant::MappingOrder => Box::new(ExportDataStream::new(config)),
            ConnectorVariant::WideExport => Box::new(ExportDataLongStream::new(config)),
        }
    }
}
