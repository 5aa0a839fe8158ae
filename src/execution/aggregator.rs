//! Output aggregation state machine.
//!
//! Folds the kernel's multiplexed reply stream into one ordered result.
//! The machine is pure: it holds no I/O and no clock, and is advanced one
//! message at a time by the receive loop in [`super`]. Message types carry
//! no ordering guarantee relative to each other, so every rule below must
//! hold under any arrival order.

use tracing::trace;

use crate::notebook::CellOutput;
use crate::protocol::{ExecutionState, KernelMessage};

/// What the driver should do after applying a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// The execute acknowledgment has not arrived yet.
    AwaitingReply,
    /// Acknowledged; waiting for the idle status or a trailing output flush.
    Draining,
}

/// Everything accumulated over one execution.
#[derive(Debug, Default)]
pub struct ExecutionOutput {
    /// Concatenation of all text fragments in arrival order, verbatim.
    pub text: String,
    /// Structured records, used when the execution is recorded.
    pub outputs: Vec<CellOutput>,
}

/// Aggregation state for one in-flight execution. Never shared.
#[derive(Debug)]
pub struct Aggregator {
    phase: Phase,
    output: ExecutionOutput,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            phase: Phase::AwaitingReply,
            output: ExecutionOutput::default(),
        }
    }

    /// Apply one received message.
    ///
    /// Text accumulation is byte-exact: fragments are appended in arrival
    /// order with no trimming and no encoding normalization.
    pub fn apply(&mut self, message: KernelMessage) -> Step {
        match message {
            KernelMessage::Error { traceback } => {
                // Traceback lines are opaque text; recorded as stdout
                // stream chunks, matching how they land in the text.
                for line in traceback {
                    self.output.outputs.push(CellOutput::stream("stdout", line.as_str()));
                    self.output.text.push_str(&line);
                }
                Step::Continue
            }
            KernelMessage::Stream { name, text } => {
                self.output
                    .outputs
                    .push(CellOutput::stream(name.as_str(), text.as_str()));
                self.output.text.push_str(&text);
                if self.phase == Phase::Draining {
                    // Trailing flush: once the kernel has acknowledged
                    // completion, the next stream chunk is the final
                    // buffered output. Waiting further would stall on
                    // kernels that send nothing else.
                    trace!("trailing stream flush after reply");
                    Step::Done
                } else {
                    Step::Continue
                }
            }
            KernelMessage::DisplayData { data } => {
                self.output.outputs.push(CellOutput::display(&data));
                Step::Continue
            }
            KernelMessage::ExecuteReply => {
                trace!("execute reply seen");
                self.phase = Phase::Draining;
                Step::Continue
            }
            KernelMessage::Status { state } => match state {
                ExecutionState::Idle if self.phase == Phase::Draining => Step::Done,
                // The kernel died and restarted mid-execution; return what
                // was accumulated rather than hang on it. The caller cannot
                // tell this apart from success.
                ExecutionState::Restarting => Step::Done,
                _ => Step::Continue,
            },
            KernelMessage::Other => Step::Continue,
        }
    }

    pub fn text(&self) -> &str {
        &self.output.text
    }

    pub fn into_output(self) -> ExecutionOutput {
        self.output
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::StreamName;

    fn stream(text: &str) -> KernelMessage {
        KernelMessage::Stream {
            name: StreamName::Stdout,
            text: text.to_string(),
        }
    }

    fn status(state: ExecutionState) -> KernelMessage {
        KernelMessage::Status { state }
    }

    fn drive(messages: Vec<KernelMessage>) -> (Vec<Step>, ExecutionOutput) {
        let mut aggregator = Aggregator::new();
        let steps = messages.into_iter().map(|m| aggregator.apply(m)).collect();
        (steps, aggregator.into_output())
    }

    #[test]
    fn test_normal_completion() {
        let (steps, output) = drive(vec![
            status(ExecutionState::Busy),
            stream("hello world\n"),
            KernelMessage::ExecuteReply,
            status(ExecutionState::Idle),
        ]);
        assert_eq!(steps.last(), Some(&Step::Done));
        assert_eq!(output.text, "hello world\n");
    }

    #[test]
    fn test_no_output_yields_empty_string() {
        let (steps, output) = drive(vec![
            status(ExecutionState::Busy),
            KernelMessage::ExecuteReply,
            status(ExecutionState::Idle),
        ]);
        assert_eq!(steps.last(), Some(&Step::Done));
        assert_eq!(output.text, "");
    }

    #[test]
    fn test_trailing_stream_after_reply_terminates() {
        let mut aggregator = Aggregator::new();
        assert_eq!(aggregator.apply(status(ExecutionState::Busy)), Step::Continue);
        assert_eq!(aggregator.apply(KernelMessage::ExecuteReply), Step::Continue);
        assert_eq!(aggregator.apply(stream("flushed\r\n")), Step::Done);
        assert_eq!(aggregator.into_output().text, "flushed\r\n");
    }

    #[test]
    fn test_stream_before_reply_continues() {
        let mut aggregator = Aggregator::new();
        assert_eq!(aggregator.apply(stream("a")), Step::Continue);
        assert_eq!(aggregator.apply(stream("b")), Step::Continue);
        assert_eq!(aggregator.text(), "ab");
    }

    #[test]
    fn test_idle_before_reply_does_not_terminate() {
        let mut aggregator = Aggregator::new();
        assert_eq!(aggregator.apply(status(ExecutionState::Idle)), Step::Continue);
        assert_eq!(aggregator.apply(KernelMessage::ExecuteReply), Step::Continue);
        assert_eq!(aggregator.apply(status(ExecutionState::Idle)), Step::Done);
    }

    #[test]
    fn test_restarting_terminates_without_reply() {
        let (steps, output) = drive(vec![
            stream("partial"),
            status(ExecutionState::Restarting),
        ]);
        assert_eq!(steps.last(), Some(&Step::Done));
        assert_eq!(output.text, "partial");
    }

    #[test]
    fn test_traceback_lines_accumulate_verbatim() {
        let (_, output) = drive(vec![
            KernelMessage::Error {
                traceback: vec![
                    "\u{1b}[0;31mNameError\u{1b}[0m".to_string(),
                    "name 'error' is not defined".to_string(),
                ],
            },
            KernelMessage::ExecuteReply,
            status(ExecutionState::Idle),
        ]);
        assert!(output.text.contains("name 'error' is not defined"));
        assert!(output.text.starts_with("\u{1b}[0;31m"));
        assert_eq!(output.outputs.len(), 2);
    }

    #[test]
    fn test_ansi_bytes_preserved() {
        let (_, output) = drive(vec![
            stream("\u{1b}[33m3\u{1b}[39m\n"),
            KernelMessage::ExecuteReply,
            status(ExecutionState::Idle),
        ]);
        assert_eq!(output.text, "\u{1b}[33m3\u{1b}[39m\n");
    }

    #[test]
    fn test_display_data_does_not_touch_text() {
        let mut bundle = serde_json::Map::new();
        bundle.insert("text/plain".to_string(), serde_json::json!("<Figure>"));

        let (_, output) = drive(vec![
            KernelMessage::DisplayData { data: bundle },
            KernelMessage::ExecuteReply,
            status(ExecutionState::Idle),
        ]);
        assert_eq!(output.text, "");
        assert_eq!(output.outputs.len(), 1);
    }

    #[test]
    fn test_arrival_order_permutations_accumulate_identically() {
        // Reply/status ordering varies; the accumulated text must not.
        let orders: Vec<Vec<KernelMessage>> = vec![
            vec![
                stream("a"),
                stream("b"),
                KernelMessage::ExecuteReply,
                status(ExecutionState::Idle),
            ],
            vec![
                stream("a"),
                KernelMessage::ExecuteReply,
                stream("b"),
            ],
            vec![
                status(ExecutionState::Busy),
                stream("a"),
                stream("b"),
                status(ExecutionState::Idle),
                KernelMessage::ExecuteReply,
                status(ExecutionState::Idle),
            ],
        ];
        for order in orders {
            let (_, output) = drive(order);
            assert_eq!(output.text, "ab");
        }
    }

    #[test]
    fn test_unknown_messages_are_ignored() {
        let (steps, output) = drive(vec![
            KernelMessage::Other,
            KernelMessage::ExecuteReply,
            KernelMessage::Other,
            status(ExecutionState::Idle),
        ]);
        assert_eq!(steps.last(), Some(&Step::Done));
        assert_eq!(output.text, "");
    }
}
