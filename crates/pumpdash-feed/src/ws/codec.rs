/*
[INPUT]:  Outbound `ClientFrame`s and raw inbound text frames
[OUTPUT]: Serialized JSON text / classified `InboundFrame`s
[POS]:    WebSocket layer - wire contract, parsing and validation
[UPDATE]: When adding new frame types or changing the wire format
*/

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

const PARSE_FAIL_LOG_LIMIT: usize = 3;
const OTHER_LOG_LIMIT: usize = 3;
const RAW_LOG_MAX_BYTES: usize = 1024;

static PARSE_FAIL_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);
static OTHER_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Frames the client sends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    /// Liveness probe, answered with `pong`
    Ping,
    /// Feed-scoped control action
    Command { command: String },
}

impl ClientFrame {
    pub fn command(command: impl Into<String>) -> Self {
        ClientFrame::Command {
            command: command.into(),
        }
    }

    /// Ask the backend to re-send balances and curve state
    pub fn refresh() -> Self {
        Self::command("refresh")
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Frames the backend sends, with a feed-specific update payload
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame<P> {
    Pong,
    Update(P),
}

/// Why an inbound frame was rejected
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("frame is not a JSON object")]
    NotAnObject,

    #[error("frame has no string `type` field")]
    MissingType,

    #[error("unrecognized frame type `{0}`")]
    UnknownType(String),

    #[error("update payload rejected: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

/// Parse one inbound text frame.
pub fn decode_frame<P: DeserializeOwned>(text: &str) -> Result<InboundFrame<P>, FrameError> {
    let value: Value = serde_json::from_str(text).map_err(FrameError::Malformed)?;
    let Value::Object(mut object) = value else {
        return Err(FrameError::NotAnObject);
    };

    let frame_type = match object.get("type") {
        Some(Value::String(frame_type)) => frame_type.clone(),
        _ => return Err(FrameError::MissingType),
    };

    match frame_type.as_str() {
        "pong" => Ok(InboundFrame::Pong),
        "update" => {
            // A missing payload is an empty update, not an error.
            let payload = object
                .remove("payload")
                .unwrap_or_else(|| Value::Object(Default::default()));
            serde_json::from_value(payload)
                .map(InboundFrame::Update)
                .map_err(FrameError::InvalidPayload)
        }
        _ => Err(FrameError::UnknownType(frame_type)),
    }
}

/// Parse one inbound text frame, logging and absorbing every rejection.
pub fn classify_frame<P: DeserializeOwned>(feed: &str, text: &str) -> Option<InboundFrame<P>> {
    match decode_frame(text) {
        Ok(frame) => Some(frame),
        Err(FrameError::UnknownType(frame_type)) => {
            log_other_frame_once(feed, &frame_type, text);
            None
        }
        Err(err) => {
            log_parse_fail_once(feed, &err, text);
            None
        }
    }
}

fn log_other_frame_once(feed: &str, frame_type: &str, raw: &str) {
    let count = OTHER_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count < OTHER_LOG_LIMIT {
        info!(
            sample_index = count + 1,
            sample_limit = OTHER_LOG_LIMIT,
            feed,
            frame_type,
            bytes = raw.len(),
            "ws frame type unrecognized"
        );
    }
}

fn log_parse_fail_once(feed: &str, err: &FrameError, raw: &str) {
    let count = PARSE_FAIL_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count < PARSE_FAIL_LOG_LIMIT {
        info!(
            sample_index = count + 1,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            feed,
            error = %err,
            bytes = raw.len(),
            "ws frame parse failed"
        );
        let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
        debug!(
            sample_index = count + 1,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            feed,
            error = %err,
            message = %preview,
            "ws frame parse failed"
        );
    } else {
        debug!(feed, error = %err, "ws frame dropped");
    }
}

fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut cut = max_len;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut out = String::with_capacity(cut + 3);
    out.push_str(&value[..cut]);
    out.push_str("...");
    out
}
