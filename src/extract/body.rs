//! Minimal block body shape and the channel for bodies that fail it.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a fenced block was dropped instead of emitted.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum MalformedReason {
    #[error("body is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("body is not a JSON object")]
    NotAnObject,
    #[error("body has no \"id\" key")]
    MissingId,
    #[error("\"id\" must be a non-empty string")]
    InvalidId,
    #[error("body has no \"payload\" key")]
    MissingPayload,
    #[error("\"payload\" must be a JSON object")]
    InvalidPayload,
    #[error("stream ended before the closing fence")]
    Unterminated,
}

/// A dropped block: the reason plus the trimmed body text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MalformedBlock {
    pub reason: MalformedReason,
    pub body: String,
}

/// Receives blocks the extractor dropped. The body text never reaches the
/// display stream; a sink is the only place it surfaces.
pub trait MalformedBlockSink {
    fn malformed(&mut self, block: MalformedBlock);
}

/// Default sink: log and move on.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl MalformedBlockSink for LogSink {
    fn malformed(&mut self, block: MalformedBlock) {
        tracing::warn!(
            reason = %block.reason,
            body_len = block.body.len(),
            "dropping malformed ui block"
        );
    }
}

/// Collecting sink, for callers that want the drops as data.
impl MalformedBlockSink for Vec<MalformedBlock> {
    fn malformed(&mut self, block: MalformedBlock) {
        self.push(block);
    }
}

pub(crate) fn parse_block_body(
    text: &str,
) -> Result<(String, Map<String, Value>), MalformedReason> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| MalformedReason::InvalidJson(err.to_string()))?;
    let Value::Object(mut object) = value else {
        return Err(MalformedReason::NotAnObject);
    };

    let id = match object.remove("id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id,
        Some(_) => return Err(MalformedReason::InvalidId),
        None => return Err(MalformedReason::MissingId),
    };
    let payload = match object.remove("payload") {
        Some(Value::Object(payload)) => payload,
        Some(_) => return Err(MalformedReason::InvalidPayload),
        None => return Err(MalformedReason::MissingPayload),
    };
    Ok((id, payload))
}
