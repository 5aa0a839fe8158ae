//! Messages received over the kernel channel.
//!
//! The channel multiplexes status signals, output chunks, and the execute
//! acknowledgment with no ordering guarantee across message types. Parsing
//! is a two-step affair: pull the `msg_type` tag out of the raw value, then
//! parse the content for the types we act on. Unknown types map to
//! [`KernelMessage::Other`] rather than an error.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Kernel lifecycle state carried by status messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionState {
    Busy,
    Idle,
    Starting,
    Restarting,
    #[serde(other)]
    Unknown,
}

/// Which output stream a chunk belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamName {
    Stdout,
    Stderr,
}

impl StreamName {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamName::Stdout => "stdout",
            StreamName::Stderr => "stderr",
        }
    }
}

/// One message received from the kernel channel.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelMessage {
    /// Kernel lifecycle signal.
    Status { state: ExecutionState },
    /// A chunk of stdout/stderr output.
    Stream { name: StreamName, text: String },
    /// A runtime error; the traceback lines are opaque text.
    Error { traceback: Vec<String> },
    /// Rich output keyed by mime type.
    DisplayData { data: Map<String, Value> },
    /// The kernel acknowledged processing the request. Carries no output.
    ExecuteReply,
    /// Any message type this client does not act on.
    Other,
}

#[derive(Debug, Deserialize)]
struct StatusContent {
    execution_state: ExecutionState,
}

#[derive(Debug, Deserialize)]
struct StreamContent {
    name: StreamName,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorContent {
    #[serde(default)]
    traceback: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DisplayDataContent {
    #[serde(default)]
    data: Map<String, Value>,
}

impl KernelMessage {
    /// Parse one frame received from the channel.
    ///
    /// Fails only on malformed JSON or on a recognized type whose content
    /// does not match its schema; a missing or unrecognized `msg_type` is
    /// tolerated as [`KernelMessage::Other`].
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;

        let Some(msg_type) = value.get("msg_type").and_then(Value::as_str) else {
            return Ok(KernelMessage::Other);
        };
        let content = value.get("content").cloned().unwrap_or(Value::Null);

        match msg_type {
            "status" => {
                let content: StatusContent = serde_json::from_value(content)?;
                Ok(KernelMessage::Status {
                    state: content.execution_state,
                })
            }
            "stream" => {
                let content: StreamContent = serde_json::from_value(content)?;
                Ok(KernelMessage::Stream {
                    name: content.name,
                    text: content.text,
                })
            }
            "error" => {
                let content: ErrorContent = serde_json::from_value(content)?;
                Ok(KernelMessage::Error {
                    traceback: content.traceback,
                })
            }
            "display_data" => {
                let content: DisplayDataContent = serde_json::from_value(content)?;
                Ok(KernelMessage::DisplayData {
                    data: content.data,
                })
            }
            "execute_reply" => Ok(KernelMessage::ExecuteReply),
            _ => Ok(KernelMessage::Other),
        }
    }
}
