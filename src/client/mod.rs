//! Reqwest-based client for the server's `/execute` endpoint.

use std::time::Duration;

use anyhow::Result;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ConsoleError, UNKNOWN_ERROR};

pub const EXECUTE_PATH: &str = "/execute";

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    command: &'a str,
}

#[derive(Debug, Clone)]
pub struct ExecuteClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ExecuteClient {
    /// `timeout` of `None` leaves a pending request waiting indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder.build()?;
        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), EXECUTE_PATH);
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST one command and return the text to append to the log.
    pub async fn execute(&self, command: &str) -> Result<String, ConsoleError> {
        log::debug!("POST {} {:?}", self.endpoint, command);
        let resp = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(&ExecuteRequest { command })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        if status.is_success() {
            decode_reply(&body)
        } else {
            log::debug!("execute failed with status {}", status);
            Err(ConsoleError::server(decode_error(&body)))
        }
    }
}

/// Read the `response` field of a successful reply.
pub fn decode_reply(body: &[u8]) -> Result<String, ConsoleError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ConsoleError::malformed(e.to_string()))?;
    value
        .get("response")
        .map(render_value)
        .ok_or_else(|| ConsoleError::malformed("missing \"response\" field"))
}

/// Pick the `error` field out of a failed reply, or fall back to the generic message.
///
/// Any value other than `null`, `false`, `0` or `""` counts as a message.
pub fn decode_error(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").filter(|e| is_truthy(e)).map(render_value))
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// Arrays are comma-joined with nulls as empty slots.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => render_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
