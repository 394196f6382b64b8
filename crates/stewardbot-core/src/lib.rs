//! Stewardbot core: authorization-gated command dispatch with a commit queue.
//!
//! Lines come in with a sender identity and origin, are parsed into
//! commands, checked against the access table and command registry, and
//! then executed, queued for approval, or rejected. Queued commands are
//! committed or cancelled later through the `commit` and `cancel` built-ins.

pub mod access;
pub mod command;
pub mod dispatcher;
pub mod errors;
pub mod executor;
pub mod logging_facility;
pub mod parser;
pub mod queue;
pub mod registry;
pub mod response;

// Re-exported for the logging macros.
pub use stewardbot_types;

pub use access::{AccessTable, Tier};
pub use command::{Command, ErrorFlag, Sender};
pub use dispatcher::{Dispatched, Dispatcher, Outcome};
pub use errors::{ErrorKind, ErrorRecord, Result, StewardError};
pub use executor::{ExecContext, ExecError, Executor, ExecutorSet};
pub use parser::{Parser, ParserConfig};
pub use queue::{IdSpec, Queue, QueuedEntry};
pub use registry::{CommandRegistry, CommandSpec};
pub use response::{Delivery, Response};
