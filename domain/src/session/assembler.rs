//! Assembles streamed frames into the assistant's reply.

use super::frame::{FrameParseError, ProtocolFrame};
use serde::Serialize;
use tracing::{trace, warn};

/// Result of feeding one line to the [`MessageAssembler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line was a frame. `token` is its content (possibly empty) when
    /// `message.content` was present; `terminal` mirrors `done`.
    Frame {
        token: Option<String>,
        terminal: bool,
    },
    /// The line was not a valid frame and was skipped.
    Skipped(FrameParseError),
}

/// Counters and server-reported statistics for one completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompletionStats {
    pub frames: usize,
    pub skipped_frames: usize,
    pub tokens: usize,
    pub terminal_seen: bool,
    pub done_reason: Option<String>,
    pub prompt_eval_count: Option<u64>,
    pub eval_count: Option<u64>,
}

/// Final output of a session: the accumulated text plus statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub text: String,
    pub stats: CompletionStats,
}

impl Completion {
    /// True when no content at all was produced.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Accumulates content tokens in arrival order.
///
/// The text only ever grows: each token is appended exactly once, and nothing
/// is rewritten. Malformed lines are logged and skipped.
#[derive(Debug, Default)]
pub struct MessageAssembler {
    text: String,
    stats: CompletionStats,
}

impl MessageAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one line and apply it.
    pub fn push_line(&mut self, line: &str) -> LineOutcome {
        match ProtocolFrame::parse(line) {
            Ok(frame) => self.apply(frame),
            Err(e) => {
                warn!("Skipping frame: {}", e);
                self.stats.skipped_frames += 1;
                LineOutcome::Skipped(e)
            }
        }
    }

    /// Apply an already parsed frame.
    pub fn apply(&mut self, frame: ProtocolFrame) -> LineOutcome {
        self.stats.frames += 1;

        if let Some(error) = &frame.error {
            warn!("Model server reported an in-stream error: {}", error);
        }

        let token = frame
            .message
            .and_then(|m| m.content)
            .inspect(|content| {
                self.text.push_str(content);
                self.stats.tokens += 1;
            });

        if frame.done {
            trace!(
                "Terminal frame (reason: {:?}, {} bytes accumulated)",
                frame.done_reason,
                self.text.len()
            );
            self.stats.terminal_seen = true;
            self.stats.done_reason = frame.done_reason.or(self.stats.done_reason.take());
            self.stats.prompt_eval_count = frame.prompt_eval_count.or(self.stats.prompt_eval_count);
            self.stats.eval_count = frame.eval_count.or(self.stats.eval_count);
        }

        LineOutcome::Frame {
            token,
            terminal: frame.done,
        }
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether a terminal frame has been observed.
    pub fn is_terminal(&self) -> bool {
        self.stats.terminal_seen
    }

    pub fn stats(&self) -> &CompletionStats {
        &self.stats
    }

    pub fn into_completion(self) -> Completion {
        Completion {
            text: self.text,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens_of(lines: &[&str]) -> (Vec<String>, MessageAssembler) {
        let mut assembler = MessageAssembler::new();
        let mut tokens = Vec::new();
        for line in lines {
            if let LineOutcome::Frame {
                token: Some(t), ..
            } = assembler.push_line(line)
            {
                tokens.push(t);
            }
        }
        (tokens, assembler)
    }

    #[test]
    fn accumulates_tokens_in_order() {
        let (tokens, assembler) = tokens_of(&[
            r#"{"message":{"content":"Risk "}}"#,
            r#"{"message":{"content":"is moderate."}}"#,
            r#"{"done":true}"#,
        ]);
        assert_eq!(tokens, vec!["Risk ", "is moderate."]);
        assert_eq!(assembler.text(), "Risk is moderate.");
        assert!(assembler.is_terminal());
    }

    #[test]
    fn malformed_line_is_skipped_not_fatal() {
        let (tokens, assembler) = tokens_of(&[
            r#"{"message":{"content":"a"}}"#,
            r#"{"message":{"content":"b"#,
            r#"{"message":{"content":"c"}}"#,
        ]);
        assert_eq!(tokens, vec!["a", "c"]);
        assert_eq!(assembler.text(), "ac");
        assert_eq!(assembler.stats().skipped_frames, 1);
        assert_eq!(assembler.stats().frames, 2);
    }

    #[test]
    fn empty_content_is_still_a_token() {
        let mut assembler = MessageAssembler::new();
        let outcome = assembler.push_line(r#"{"message":{"content":""},"done":true}"#);
        assert_eq!(
            outcome,
            LineOutcome::Frame {
                token: Some(String::new()),
                terminal: true
            }
        );
        assert_eq!(assembler.text(), "");
    }

    #[test]
    fn frame_without_message_yields_no_token() {
        let mut assembler = MessageAssembler::new();
        let outcome = assembler.push_line(r#"{"model":"gemma3:12b"}"#);
        assert_eq!(
            outcome,
            LineOutcome::Frame {
                token: None,
                terminal: false
            }
        );
    }

    #[test]
    fn tokens_after_terminal_are_kept() {
        let (tokens, assembler) = tokens_of(&[
            r#"{"message":{"content":"x"}}"#,
            r#"{"done":true}"#,
            r#"{"message":{"content":"y"}}"#,
        ]);
        assert_eq!(tokens, vec!["x", "y"]);
        assert_eq!(assembler.text(), "xy");
    }

    #[test]
    fn terminal_stats_are_captured() {
        let (_, assembler) = tokens_of(&[
            r#"{"message":{"content":"Hi"},"done":false}"#,
            r#"{"message":{"content":""},"done":true,"done_reason":"stop","eval_count":10,"prompt_eval_count":20}"#,
        ]);
        let completion = assembler.into_completion();
        assert_eq!(completion.text, "Hi");
        assert_eq!(completion.stats.done_reason.as_deref(), Some("stop"));
        assert_eq!(completion.stats.eval_count, Some(10));
        assert_eq!(completion.stats.prompt_eval_count, Some(20));
        assert_eq!(completion.stats.tokens, 2);
        assert!(!completion.is_empty());
    }
}
