use crate::error::Result;
use crate::response::ApiResponse;

/// Field name to scalar value, as carried in a record's `data`.
pub type RecordData = serde_json::Map<String, serde_json::Value>;

/// Core trait that every Adaptive stream implements
pub trait AdaptiveStream: Send + Sync {
    /// The XML call document sent to the API
    fn construct_payload(&self) -> Result<String>;

    /// Stream name records are tagged with
    fn generate_table_name(&self) -> String;

    /// JSON schema of the record data
    fn generate_table_schema(&self) -> serde_json::Value;

    /// Turn a decoded response into record data, handing each one to `emit`
    /// in output order. Returns the number of records produced.
    fn generate_table_rows(
        &self,
        response: &ApiResponse,
        emit: &mut dyn FnMut(RecordData) -> Result<()>,
    ) -> Result<usize>;
}
