//! Kernel message channel.
//!
//! One channel is scoped to one execution: it is opened, carries one
//! execute request out and the reply stream back, and is closed
//! unconditionally by the execution driver. The trait seam exists so the
//! driver can be exercised against a fake channel in tests.

mod ws;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::protocol::{ExecuteRequest, KernelMessage};

pub use ws::WsChannel;

/// Result type for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Errors raised by a kernel channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The endpoint was unreachable or rejected the handshake.
    #[error("failed to connect to {url}: {message}")]
    Connect { url: String, message: String },

    /// No frame arrived within the per-receive window. Not a fault at the
    /// execution level; the aggregation loop turns it into a partial result.
    #[error("no message received within {0:?}")]
    RecvTimeout(Duration),

    /// The peer closed the connection or it dropped.
    #[error("channel closed by peer")]
    Closed,

    /// A frame arrived that does not parse as a kernel message.
    #[error("malformed frame: {0}")]
    Protocol(String),

    /// Transport-level send/receive failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// A bidirectional message channel to one kernel.
#[async_trait]
pub trait KernelChannel: Send {
    /// Send the execute request envelope.
    async fn send(&mut self, request: &ExecuteRequest) -> ChannelResult<()>;

    /// Receive the next kernel message, waiting at most the channel's
    /// per-receive timeout.
    async fn recv(&mut self) -> ChannelResult<KernelMessage>;

    /// Release the channel. Best-effort; must be called exactly once.
    async fn close(&mut self);
}
