//! Execution driver.
//!
//! Owns the receive loop for one execution: send the request, pull
//! messages from the channel, feed the aggregator, and map channel
//! failures to terminal outcomes. The channel is closed here exactly once
//! on every path, which is the resource invariant the whole client hangs
//! on: an unreleased channel holds a server-side slot.

mod aggregator;

use tracing::{debug, warn};

use crate::channel::{ChannelError, KernelChannel};
use crate::protocol::ExecuteRequest;

pub use aggregator::{Aggregator, ExecutionOutput, Step};

/// How one execution ended.
#[derive(Debug)]
pub enum Outcome {
    /// The aggregator reached a terminal success condition.
    Done,
    /// A receive timed out; whatever was accumulated stands as the result.
    TimedOut,
    /// The transport failed mid-stream.
    Aborted(ChannelError),
}

/// Drive one execution over `channel` to a terminal outcome.
///
/// Consumes the channel and closes it exactly once regardless of how the
/// aggregation ends.
pub(crate) async fn run<C: KernelChannel>(
    mut channel: C,
    request: &ExecuteRequest,
) -> (Outcome, ExecutionOutput) {
    let result = match channel.send(request).await {
        Ok(()) => collect(&mut channel).await,
        Err(e) => {
            warn!(error = %e, "failed to send execute request");
            (Outcome::Aborted(e), ExecutionOutput::default())
        }
    };
    channel.close().await;
    result
}

async fn collect<C: KernelChannel + ?Sized>(channel: &mut C) -> (Outcome, ExecutionOutput) {
    let mut aggregator = Aggregator::new();
    loop {
        match channel.recv().await {
            Ok(message) => {
                if aggregator.apply(message) == Step::Done {
                    return (Outcome::Done, aggregator.into_output());
                }
            }
            Err(ChannelError::RecvTimeout(window)) => {
                // Partial (possibly empty) output is a valid result.
                debug!(?window, "receive window elapsed, returning accumulated output");
                return (Outcome::TimedOut, aggregator.into_output());
            }
            Err(e) => {
                warn!(error = %e, "kernel channel failed mid-stream");
                return (Outcome::Aborted(e), aggregator.into_output());
            }
        }
    }
}
