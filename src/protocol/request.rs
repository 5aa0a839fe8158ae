//! The execute-request envelope.

use serde::Serialize;
use uuid::Uuid;

/// Message header identifying one request.
///
/// The server echoes `session` and `msg_id` back in reply headers, which is
/// what lets concurrent executions on one kernel stay distinguishable.
#[derive(Debug, Clone, Serialize)]
pub struct MessageHeader {
    pub msg_type: String,
    pub msg_id: String,
    pub session: String,
    pub username: String,
}

/// Execution flags carried in the request content.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteFlags {
    pub store_history: bool,
    pub stop_on_error: bool,
    pub allow_stdin: bool,
}

impl Default for ExecuteFlags {
    fn default() -> Self {
        Self {
            store_history: true,
            stop_on_error: true,
            allow_stdin: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ExecuteContent {
    code: String,
    silent: bool,
    #[serde(flatten)]
    flags: ExecuteFlags,
    user_expressions: serde_json::Map<String, serde_json::Value>,
}

/// A fully built execute request. Immutable once built; one per execution.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteRequest {
    header: MessageHeader,
    // The wire format mirrors the header into parent_header.
    parent_header: MessageHeader,
    metadata: serde_json::Map<String, serde_json::Value>,
    content: ExecuteContent,
}

impl ExecuteRequest {
    /// Build a request with default flags.
    ///
    /// A fresh message id is generated on every call; the session id is
    /// generated only when not supplied, so several executions can share a
    /// session while their message ids never collide.
    pub fn new(code: impl Into<String>, session: Option<String>) -> Self {
        Self::with_flags(code, session, ExecuteFlags::default())
    }

    /// Build a request with explicit flags.
    pub fn with_flags(
        code: impl Into<String>,
        session: Option<String>,
        flags: ExecuteFlags,
    ) -> Self {
        let header = MessageHeader {
            msg_type: "execute_request".to_string(),
            msg_id: new_id(),
            session: session.unwrap_or_else(new_id),
            username: String::new(),
        };

        Self {
            parent_header: header.clone(),
            header,
            metadata: serde_json::Map::new(),
            content: ExecuteContent {
                code: code.into(),
                silent: false,
                flags,
                user_expressions: serde_json::Map::new(),
            },
        }
    }

    pub fn session(&self) -> &str {
        &self.header.session
    }

    pub fn msg_id(&self) -> &str {
        &self.header.msg_id
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = ExecuteRequest::new("1 + 1", None);
        let b = ExecuteRequest::new("1 + 1", None);
        assert_ne!(a.msg_id(), b.msg_id());
        assert_ne!(a.session(), b.session());
    }

    #[test]
    fn test_supplied_session_is_kept() {
        let req = ExecuteRequest::new("x", Some("my-session".to_string()));
        assert_eq!(req.session(), "my-session");
    }

    #[test]
    fn test_wire_format() {
        let req = ExecuteRequest::new("print('hi')", Some("s1".to_string()));
        let value = serde_json::to_value(&req).unwrap();

        assert_eq!(value["header"]["msg_type"], "execute_request");
        assert_eq!(value["header"]["username"], "");
        assert_eq!(value["parent_header"], value["header"]);

        let content = &value["content"];
        assert_eq!(content["code"], "print('hi')");
        assert_eq!(content["silent"], false);
        assert_eq!(content["store_history"], true);
        assert_eq!(content["stop_on_error"], true);
        assert_eq!(content["allow_stdin"], true);
        assert!(content["user_expressions"].as_object().unwrap().is_empty());
    }
}
