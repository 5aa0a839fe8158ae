//! Kernel wire protocol.
//!
//! The request half is a single `execute_request` envelope sent once per
//! execution; the reply half is the multiplexed stream of kernel messages
//! consumed by the aggregation loop.

mod messages;
mod request;

pub use messages::{ExecutionState, KernelMessage, StreamName};
pub use request::{ExecuteFlags, ExecuteRequest, MessageHeader};
