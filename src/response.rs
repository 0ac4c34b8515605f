//! Decoding of the API's XML response envelope.
//!
//! The envelope looks like
//! `<response success="true"><output>…</output><messages><message>…</message></messages></response>`
//! and `<output>` carries CSV text, not XML.
//!
//! Leading and trailing whitespace around plain `<output>` text is trimmed by
//! the XML deserializer, so a header that starts with spaces loses them.

use csv::ReaderBuilder;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, SourceError};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "@success", default)]
    success: Option<String>,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    messages: Option<Messages>,
}

#[derive(Debug, Deserialize)]
struct Messages {
    #[serde(rename = "message", default)]
    message: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(rename = "$text", default)]
    text: String,
}

/// A decoded response envelope.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub success: bool,
    pub output: Option<String>,
    pub messages: Vec<String>,
}

impl ApiResponse {
    pub fn parse(body: &str) -> Result<Self> {
        ensure_response_root(body)?;
        let envelope: Envelope = quick_xml::de::from_str(body)
            .map_err(|e| SourceError::Decode(format!("malformed response envelope: {e}")))?;

        let messages = envelope
            .messages
            .map(|m| m.message.into_iter().map(|m| m.text).collect())
            .unwrap_or_default();
        let response = Self {
            success: envelope.success.as_deref() == Some("true"),
            output: envelope.output,
            messages,
        };
        debug!(
            "Decoded response success={} output_len={} messages={}",
            response.success,
            response.output.as_ref().map_or(0, |o| o.len()),
            response.messages.len()
        );
        Ok(response)
    }

    pub fn is_successful(&self) -> bool {
        self.success
    }

    pub fn error_messages(&self) -> &[String] {
        &self.messages
    }

    /// Turn an unsuccessful response into an `Api` error carrying the vendor messages.
    pub fn ensure_success(self) -> Result<Self> {
        if self.success {
            return Ok(self);
        }
        let message = if self.messages.is_empty() {
            "request was not successful".to_string()
        } else {
            self.messages.join("; ")
        };
        Err(SourceError::Api { message })
    }

    /// The embedded `response.output` text.
    pub fn output(&self) -> Result<&str> {
        self.output
            .as_deref()
            .ok_or_else(|| SourceError::Decode("response.output not found".into()))
    }

    pub fn csv_table(&self) -> Result<CsvTable> {
        CsvTable::parse(self.output()?)
    }
}

fn ensure_response_root(body: &str) -> Result<()> {
    let mut reader = Reader::from_str(body);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return if e.name().as_ref() == b"response" {
                    Ok(())
                } else {
                    Err(SourceError::Decode(format!(
                        "expected <response> root, found <{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    )))
                };
            }
            Ok(Event::Eof) => {
                return Err(SourceError::Decode("response body has no root element".into()))
            }
            Ok(_) => {}
            Err(e) => {
                return Err(SourceError::Decode(format!("malformed response envelope: {e}")))
            }
        }
    }
}

/// A header-led CSV blob split into its header and data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn parse(text: &str) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut records = rdr.records();
        let headers = match records.next() {
            Some(record) => record?.iter().map(str::to_string).collect(),
            None => return Ok(Self::default()),
        };
        let mut rows = Vec::new();
        for record in records {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }
}
