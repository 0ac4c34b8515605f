use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::config::SourceConfig;
use crate::constants::{DEFAULT_CHUNK_SIZE, EXPORT_DATA_LONG_STREAM_PREFIX, JSON_SCHEMA_DRAFT};
use crate::error::{Result, SourceError};
use crate::payload::ExportDataCall;
use crate::reshape::{handle_export_data, LongRecord};
use crate::response::ApiResponse;
use crate::types::{AdaptiveStream, RecordData};

/// Wide export (one column per period) reshaped into one record per entity and period.
pub struct ExportDataLongStream {
    config: SourceConfig,
    chunk_size: usize,
}

impl ExportDataLongStream {
    pub fn new(config: SourceConfig) -> Self {
        Self { config, chunk_size: DEFAULT_CHUNK_SIZE }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

pub fn record_data(record: LongRecord) -> Result<RecordData> {
    match serde_json::to_value(record)? {
        Value::Object(data) => Ok(data),
        other => Err(SourceError::Reshape(format!("record is not an object: {other}"))),
    }
}

impl AdaptiveStream for ExportDataLongStream {
    fn construct_payload(&self) -> Result<String> {
        ExportDataCall::date_range(&self.config).to_xml()
    }

    fn generate_table_name(&self) -> String {
        format!("{}_{}", EXPORT_DATA_LONG_STREAM_PREFIX, self.config.method_obj.version)
    }

    fn generate_table_schema(&self) -> Value {
        json!({
            "$schema": JSON_SCHEMA_DRAFT,
            "type": "object",
            "properties": {
                "id": {"type": "number"},
                "account_name": {"type": "string"},
                "account_code": {"type": "string"},
                "level_name": {"type": "string"},
                "gl_account": {"type": "string"},
                "location": {"type": "string"},
                "contract": {"type": "string"},
                "assignment": {"type": "string"},
                "date": {"type": "string"},
                "amount": {"type": "number"},
            },
        })
    }

    #[instrument(skip(self, response, emit), fields(stream = %self.generate_table_name()))]
    fn generate_table_rows(
        &self,
        response: &ApiResponse,
        emit: &mut dyn FnMut(RecordData) -> Result<()>,
    ) -> Result<usize> {
        let output = response.output()?;
        let produced = handle_export_data(
            output,
            self.config.spill_dir.as_deref(),
            self.chunk_size,
            |record| emit(record_data(record)?),
        )?;
        info!("Produced {} long records", produced);
        Ok(produced)
    }
}
