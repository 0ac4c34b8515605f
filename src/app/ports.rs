use async_trait::async_trait;
use std::fmt;

// Outbound side of the request layer: one POST of an XML payload.
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn post_xml(&self, url: &str, body: String) -> Result<HttpPostResult, TransportError>;
}

#[derive(Clone, Debug)]
pub struct HttpPostResult {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportErrorKind::Connect => "connection error",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Other => "transport error",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}
