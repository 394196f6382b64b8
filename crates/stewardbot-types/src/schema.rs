//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent across the dispatcher's log output.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Dispatch identifiers
pub const FIELD_SENDER: &str = "sender";
pub const FIELD_COMMAND: &str = "command";
pub const FIELD_COMMIT_ID: &str = "commit_id";
pub const FIELD_TIER: &str = "tier";

// Collection sizes
pub const FIELD_QUEUE_LEN: &str = "queue_len";
pub const FIELD_FOUND_LEN: &str = "found_len";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
