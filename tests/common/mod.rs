#![allow(dead_code)]

use adaptive_source::app::ports::{HttpClientPort, HttpPostResult, TransportError, TransportErrorKind};
use adaptive_source::config::{MethodConfig, RequestConfig, SourceConfig};
use adaptive_source::request::RequestExecutor;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// HTTP port that replays a fixed script of outcomes and records what was sent.
#[derive(Clone, Default)]
pub struct ScriptedHttp {
    script: Arc<Mutex<VecDeque<Result<HttpPostResult, TransportError>>>>,
    sent: Arc<Mutex<Vec<String>>>,
}

impl ScriptedHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_fail(self, kind: TransportErrorKind) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(TransportError::new(kind, "scripted failure")));
        self
    }

    pub fn then_respond(self, body: &str) -> Self {
        self.script.lock().unwrap().push_back(Ok(HttpPostResult {
            status: 200,
            bytes: body.as_bytes().to_vec(),
            content_type: "application/xml".to_string(),
        }));
        self
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClientPort for ScriptedHttp {
    async fn post_xml(&self, _url: &str, body: String) -> Result<HttpPostResult, TransportError> {
        self.sent.lock().unwrap().push(body);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new(TransportErrorKind::Connect, "script exhausted")))
    }
}

pub fn executor(http: &ScriptedHttp, max_attempts: u32) -> RequestExecutor {
    RequestExecutor::new(
        Box::new(http.clone()),
        "http://adaptive.test/api/v32",
        Duration::from_millis(1),
        max_attempts,
    )
}

pub fn config(dimensions: &[&str]) -> SourceConfig {
    SourceConfig {
        username: "user@example.com".into(),
        password: "secret".into(),
        method_obj: MethodConfig {
            method: "exportData".into(),
            version: "Actuals".into(),
            accounts: vec!["Revenue".into()],
            date_selected: "01/2022".into(),
            dimensions: dimensions.iter().map(|d| d.to_string()).collect(),
            date_end: None,
        },
        api_url: "http://adaptive.test/api/v32".into(),
        request: RequestConfig::default(),
        spill_dir: None,
    }
}

pub fn envelope(output: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<response success=\"true\"><output><![CDATA[{output}]]></output></response>"
    )
}

pub const WIDE_HEADER: &str = "Account Name,Account Code,Level Name,GL Account Name,Location Name,Contract Name,Assignment Name,01/2022,02/2022";
