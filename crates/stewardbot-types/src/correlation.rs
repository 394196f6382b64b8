//! Correlation types for per-line request tracking
//!
//! Every inbound line gets a `RequestId` so that the log events emitted while
//! parsing, authorizing and executing it can be tied back together.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single inbound line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new random RequestId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through one line's dispatch for correlation
#[derive(Debug, Clone)]
pub struct LineContext {
    pub request_id: RequestId,
    /// Identity of the sender, as resolved by the transport
    pub sender: String,
}

impl LineContext {
    /// Create a new context with a fresh RequestId
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            sender: sender.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_generation() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::new();
        assert_eq!(format!("{}", id), id.as_str());
    }

    #[test]
    fn test_line_context_keeps_sender() {
        let ctx = LineContext::new("steward.example");
        assert_eq!(ctx.sender, "steward.example");
        assert!(!ctx.request_id.as_str().is_empty());
    }

    #[test]
    fn test_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
