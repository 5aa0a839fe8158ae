//! REST payload types for the kernel server API.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::protocol::ExecuteFlags;

/// Response of the kernelspec discovery endpoint. Only the spec names are
/// consumed; the per-spec details are opaque here.
#[derive(Debug, Deserialize)]
pub(crate) struct KernelSpecsResponse {
    pub kernelspecs: HashMap<String, Value>,
}

/// Response of kernel creation.
#[derive(Debug, Deserialize)]
pub(crate) struct KernelInfo {
    pub id: String,
}

/// Result of a kernel-creation request.
///
/// An unsupported kernel type is an answer, not a fault: the server's
/// supported set is enumerated so the caller (or end user) can pick one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelCreation {
    /// Kernel started; the id must be passed to every subsequent call and
    /// eventually to `delete_kernel`; nothing tracks it for the caller.
    Created { id: String },
    /// The requested type is not in the server's supported set. No
    /// creation was attempted.
    Unsupported {
        requested: String,
        supported: Vec<String>,
    },
}

impl KernelCreation {
    /// The new kernel id, when one was created.
    pub fn id(&self) -> Option<&str> {
        match self {
            KernelCreation::Created { id } => Some(id),
            KernelCreation::Unsupported { .. } => None,
        }
    }
}

impl fmt::Display for KernelCreation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelCreation::Created { id } => write!(f, "kernel {id} started"),
            KernelCreation::Unsupported {
                requested,
                supported,
            } => write!(
                f,
                "{requested} is not supported (supported kernels: {supported:?})"
            ),
        }
    }
}

/// Per-call knobs for `execute`.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Bound on each blocking receive on the kernel channel. A window that
    /// elapses ends the call with whatever output was accumulated.
    pub timeout: Duration,
    /// Append the executed code and outputs to the kernel's notebook.
    pub record: bool,
    /// Session id to correlate under; generated when absent.
    pub session: Option<String>,
    /// Execution flags forwarded in the request envelope.
    pub flags: ExecuteFlags,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            record: false,
            session: None,
            flags: ExecuteFlags::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message_enumerates_kernels() {
        let creation = KernelCreation::Unsupported {
            requested: "not-a-real-kernel".to_string(),
            supported: vec!["python3".to_string(), "tslab".to_string()],
        };
        let message = creation.to_string();
        assert!(message.contains("not-a-real-kernel is not supported"));
        assert!(message.contains("python3"));
        assert!(message.contains("tslab"));
        assert_eq!(creation.id(), None);
    }

    #[test]
    fn test_default_options() {
        let options = ExecuteOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(20));
        assert!(!options.record);
        assert!(options.session.is_none());
    }
}
