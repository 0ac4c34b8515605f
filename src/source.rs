use serde_json::{json, Value};
use std::future::Future;
use std::io::Write;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use crate::config::SourceConfig;
use crate::error::{Result, SourceError};
use crate::message::{Message, RecordEmitter, Status, StreamDescriptor};
use crate::request::{shutdown_signal, RequestExecutor};
use crate::response::ApiResponse;
use crate::streams::ConnectorVariant;
use crate::types::{AdaptiveStream, RecordData};

/// One configured connector: a stream strategy plus the request layer.
pub struct Source {
    stream: Box<dyn AdaptiveStream>,
    executor: RequestExecutor,
}

impl Source {
    pub fn new(stream: Box<dyn AdaptiveStream>, executor: RequestExecutor) -> Self {
        Self { stream, executor }
    }

    pub fn from_config(variant: ConnectorVariant, config: SourceConfig) -> Result<Self> {
        let executor = RequestExecutor::from_config(&config)?;
        Ok(Self::new(variant.build(config), executor))
    }

    /// Specification of the configuration the connectors accept.
    pub fn spec() -> Message {
        Message::spec(connection_specification())
    }

    pub fn discover(&self) -> Message {
        Message::catalog(vec![StreamDescriptor {
            name: self.stream.generate_table_name(),
            json_schema: self.stream.generate_table_schema(),
            supported_sync_modes: vec!["full_refresh".to_string()],
        }])
    }

    /// Issue the configured request and report whether the API accepted it.
    pub async fn check(&self) -> Message {
        match self.fetch(shutdown_signal()).await {
            Ok(response) if response.is_successful() => {
                info!("Connection check succeeded");
                Message::connection_status(Status::Succeeded, None)
            }
            Ok(response) => {
                let message = response.error_messages().join("; ");
                warn!("Connection check rejected by API: {}", message);
                Message::connection_status(Status::Failed, Some(message))
            }
            Err(e) => {
                error!("Connection check failed: {}", e);
                Message::connection_status(Status::Failed, Some(e.to_string()))
            }
        }
    }

    /// Run one sync, writing a `RECORD` message per output row.
    pub async fn read<W: Write>(&self, emitter: &mut RecordEmitter<W>) -> Result<usize> {
        self.read_until(emitter, shutdown_signal()).await
    }

    pub async fn read_until<W, F>(&self, emitter: &mut RecordEmitter<W>, shutdown: F) -> Result<usize>
    where
        W: Write,
        F: Future<Output = ()>,
    {
        let stream_name = self.stream.generate_table_name();
        let span = tracing::info_span!("sync", run_id = %Uuid::new_v4(), stream = %stream_name);

        async {
            info!("Starting sync");
            let response = self.fetch(shutdown).await?.ensure_success()?;

            let produced = self
                .stream
                .generate_table_rows(&response, &mut |data: RecordData| {
                    emitter.emit_record(&stream_name, data)
                })?;
            emitter.flush()?;

            info!("Sync finished, {} records emitted", produced);
            Ok::<_, SourceError>(produced)
        }
        .instrument(span)
        .await
    }

    async fn fetch<F: Future<Output = ()>>(&self, shutdown: F) -> Result<ApiResponse> {
        let payload = self.stream.construct_payload()?;
        let body = self.executor.perform_request_until(&payload, shutdown).await?;
        ApiResponse::parse(&body)
    }
}

fn connection_specification() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Adaptive Insights Spec",
        "type": "object",
        "required": ["username", "password", "method_obj"],
        "properties": {
            "username": {"type": "string", "description": "Adaptive login"},
            "password": {"type": "string", "airbyte_secret": true},
            "api_url": {"type": "string", "default": crate::constants::DEFAULT_API_URL},
            "spill_dir": {"type": "string"},
            "method_obj": {
                "type": "object",
                "required": ["method", "version", "accounts", "date_selected"],
                "properties": {
                    "method": {"type": "string", "examples": ["exportData"]},
                    "version": {"type": "string"},
                    "accounts": {"type": "array", "items": {"type": "string"}},
                    "date_selected": {"type": "string", "examples": ["01/2022"]},
                    "date_end": {"type": "string"},
                    "dimensions": {"type": "array", "items": {"type": "string"}},
                },
            },
            "request": {
                "type": "object",
                "properties": {
                    "timeout_seconds": {"type": "integer", "default": crate::constants::DEFAULT_TIMEOUT_SECONDS},
                    "retry_delay_ms": {"type": "integer", "default": crate::constants::DEFAULT_RETRY_DELAY_MS},
                    "max_attempts": {"type": "integer", "default": crate::constants::DEFAULT_MAX_ATTEMPTS},
                },
            },
        },
    })
}
