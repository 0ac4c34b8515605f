//! Host protocol messages and the line-delimited JSON emitter.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;

use crate::error::Result;
use crate::observability::metrics;
use crate::types::RecordData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    Record,
    Log,
    Spec,
    ConnectionStatus,
    Catalog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMessage {
    pub stream: String,
    pub data: RecordData,
    /// Epoch milliseconds
    pub emitted_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    pub level: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub name: String,
    pub json_schema: Value,
    pub supported_sync_modes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub streams: Vec<StreamDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorSpecification {
    pub connection_specification: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<RecordMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<LogMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<ConnectorSpecification>,
    #[serde(default, rename = "connectionStatus", skip_serializing_if = "Option::is_none")]
    pub connection_status: Option<ConnectionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<Catalog>,
}

impl Message {
    fn empty(kind: MessageType) -> Self {
        Self {
            kind,
            record: None,
            log: None,
            spec: None,
            connection_status: None,
            catalog: None,
        }
    }

    pub fn record(stream: impl Into<String>, data: RecordData) -> Self {
        Self {
            record: Some(RecordMessage {
                stream: stream.into(),
                data,
                emitted_at: chrono::Utc::now().timestamp_millis(),
            }),
            ..Self::empty(MessageType::Record)
        }
    }

    pub fn log(level: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            log: Some(LogMessage { level: level.into(), message: message.into() }),
            ..Self::empty(MessageType::Log)
        }
    }

    pub fn spec(connection_specification: Value) -> Self {
        Self {
            spec: Some(ConnectorSpecification { connection_specification }),
            ..Self::empty(MessageType::Spec)
        }
    }

    pub fn connection_status(status: Status, message: Option<String>) -> Self {
        Self {
            connection_status: Some(ConnectionStatus { status, message }),
            ..Self::empty(MessageType::ConnectionStatus)
        }
    }

    pub fn catalog(streams: Vec<StreamDescriptor>) -> Self {
        Self {
            catalog: Some(Catalog { streams }),
            ..Self::empty(MessageType::Catalog)
        }
    }
}

/// Writes messages as one JSON document per line.
pub struct RecordEmitter<W: Write> {
    out: W,
    records: usize,
}

impl<W: Write> RecordEmitter<W> {
    pub fn new(out: W) -> Self {
        Self { out, records: 0 }
    }

    pub fn emit(&mut self, message: &Message) -> Result<()> {
        serde_json::to_writer(&mut self.out, message)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    /// Wrap record data in a `RECORD` message tagged with `stream` and write it.
    pub fn emit_record(&mut self, stream: &str, data: RecordData) -> Result<()> {
        self.emit(&Message::record(stream, data))?;
        self.records += 1;
        metrics::records::emitted(stream);
        Ok(())
    }

    pub fn records_emitted(&self) -> usize {
        self.records
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
