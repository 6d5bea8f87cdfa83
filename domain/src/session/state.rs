//! Stream session state machine.
//!
//! ```text
//! Idle ──► Connecting ──► Streaming ──► Completed
//!              │              │
//!              ├──────────────┴──► Failed
//!              └──────────────┴──► Cancelled
//! ```
//!
//! [`StreamSession`] owns the per-exchange state: the decoder carry-over, the
//! assembled text, and the current [`SessionState`]. It is synchronous; the
//! async controller in the application layer drives it one chunk at a time.

use super::assembler::{Completion, LineOutcome, MessageAssembler};
use super::decoder::LineDecoder;
use crate::core::error::DomainError;
use tracing::{debug, trace};

/// Lifecycle state of one streaming exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No request issued yet.
    Idle,
    /// Request sent, waiting for the response stream.
    Connecting,
    /// Reading and assembling chunks.
    Streaming,
    /// The stream ended; the accumulated text is final.
    Completed,
    /// Transport or read failure.
    Failed,
    /// Stopped on caller request.
    Cancelled,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Streaming => "streaming",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
            SessionState::Cancelled => "cancelled",
        }
    }

    /// Whether this is a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Cancelled
        )
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Connecting)
                | (Connecting, Streaming)
                | (Connecting, Failed)
                | (Connecting, Cancelled)
                | (Streaming, Completed)
                | (Streaming, Failed)
                | (Streaming, Cancelled)
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened while ingesting one chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkOutcome {
    /// Complete lines decoded from the chunk.
    pub lines: usize,
    /// Tokens forwarded to the callback.
    pub tokens: usize,
    /// A terminal frame was seen in this chunk.
    pub terminal: bool,
}

/// State of one request/response exchange.
///
/// Never shared between exchanges: concurrent sessions each own their own
/// decoder and text.
#[derive(Debug)]
pub struct StreamSession {
    state: SessionState,
    decoder: LineDecoder,
    assembler: MessageAssembler,
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            decoder: LineDecoder::new(),
            assembler: MessageAssembler::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        self.assembler.text()
    }

    /// Whether a terminal frame has been observed; no more chunks should be read.
    pub fn terminal_seen(&self) -> bool {
        self.assembler.is_terminal()
    }

    fn transition(&mut self, next: SessionState) -> Result<(), DomainError> {
        if !self.state.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.state.as_str(),
                to: next.as_str(),
            });
        }
        debug!("Stream session: {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// `Idle -> Connecting`
    pub fn begin_connect(&mut self) -> Result<(), DomainError> {
        self.transition(SessionState::Connecting)
    }

    /// `Connecting -> Streaming`
    pub fn connected(&mut self) -> Result<(), DomainError> {
        self.transition(SessionState::Streaming)
    }

    /// Decode one chunk and apply every complete line, in order.
    ///
    /// `on_token` runs once per content token before the next line is
    /// processed. All lines of the chunk are drained even when a terminal
    /// frame appears in the middle of it.
    pub fn ingest(
        &mut self,
        chunk: &[u8],
        on_token: &mut impl FnMut(&str),
    ) -> Result<ChunkOutcome, DomainError> {
        if self.state != SessionState::Streaming {
            return Err(DomainError::InvalidTransition {
                from: self.state.as_str(),
                to: SessionState::Streaming.as_str(),
            });
        }

        let lines = self.decoder.feed(chunk);
        trace!(
            "Chunk of {} bytes -> {} lines ({} bytes carried)",
            chunk.len(),
            lines.len(),
            self.decoder.pending_bytes()
        );

        let mut outcome = ChunkOutcome {
            lines: lines.len(),
            ..ChunkOutcome::default()
        };
        for line in &lines {
            self.apply_line(line, on_token, &mut outcome);
        }
        Ok(outcome)
    }

    fn apply_line(
        &mut self,
        line: &str,
        on_token: &mut impl FnMut(&str),
        outcome: &mut ChunkOutcome,
    ) {
        if let LineOutcome::Frame { token, terminal } = self.assembler.push_line(line) {
            if let Some(token) = token {
                on_token(&token);
                outcome.tokens += 1;
            }
            outcome.terminal |= terminal;
        }
    }

    /// End of stream: flush the decoder carry-over and move to `Completed`.
    ///
    /// A missing terminal frame is not an error.
    pub fn complete(
        mut self,
        on_token: &mut impl FnMut(&str),
    ) -> Result<Completion, DomainError> {
        if let Some(line) = self.decoder.finish() {
            if self.state == SessionState::Streaming {
                let mut outcome = ChunkOutcome::default();
                self.apply_line(&line, on_token, &mut outcome);
            }
        }
        self.transition(SessionState::Completed)?;
        if !self.assembler.is_terminal() {
            debug!("Stream ended without a terminal frame");
        }
        Ok(self.assembler.into_completion())
    }

    /// Move to `Failed`.
    pub fn fail(&mut self) -> Result<(), DomainError> {
        self.transition(SessionState::Failed)
    }

    /// Move to `Cancelled`.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.transition(SessionState::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streaming() -> StreamSession {
        let mut session = StreamSession::new();
        session.begin_connect().unwrap();
        session.connected().unwrap();
        session
    }

    #[test]
    fn transition_table() {
        use SessionState::*;
        assert!(Idle.can_transition_to(Connecting));
        assert!(Connecting.can_transition_to(Failed));
        assert!(Streaming.can_transition_to(Completed));
        assert!(Streaming.can_transition_to(Cancelled));
        assert!(!Idle.can_transition_to(Streaming));
        assert!(!Completed.can_transition_to(Streaming));
        assert!(!Failed.can_transition_to(Completed));
        assert!(!Cancelled.can_transition_to(Failed));
    }

    #[test]
    fn terminal_states() {
        assert!(SessionState::Completed.is_terminal());
        assert!(SessionState::Failed.is_terminal());
        assert!(SessionState::Cancelled.is_terminal());
        assert!(!SessionState::Streaming.is_terminal());
    }

    #[test]
    fn full_happy_path() {
        let mut session = streaming();
        let mut seen = Vec::new();
        let mut on_token = |t: &str| seen.push(t.to_string());

        let outcome = session
            .ingest(
                b"{\"message\":{\"content\":\"Risk \"}}\n{\"message\":{\"content\":\"is mod",
                &mut on_token,
            )
            .unwrap();
        assert_eq!(outcome.lines, 1);
        assert_eq!(outcome.tokens, 1);
        assert!(!outcome.terminal);

        let outcome = session
            .ingest(b"erate.\"}}\n{\"done\":true}\n", &mut on_token)
            .unwrap();
        assert!(outcome.terminal);
        assert!(session.terminal_seen());

        let completion = session.complete(&mut on_token).unwrap();
        assert_eq!(completion.text, "Risk is moderate.");
        assert_eq!(seen, vec!["Risk ", "is moderate."]);
    }

    #[test]
    fn lines_after_terminal_in_same_chunk_are_drained() {
        let mut session = streaming();
        let mut seen = Vec::new();
        let outcome = session
            .ingest(
                b"{\"message\":{\"content\":\"a\"}}\n{\"done\":true}\n{\"message\":{\"content\":\"b\"}}\n",
                &mut |t: &str| seen.push(t.to_string()),
            )
            .unwrap();
        assert!(outcome.terminal);
        assert_eq!(outcome.lines, 3);
        assert_eq!(seen, vec!["a", "b"]);
        assert_eq!(session.text(), "ab");
    }

    #[test]
    fn complete_flushes_unterminated_tail() {
        let mut session = streaming();
        let mut seen = Vec::new();
        let mut on_token = |t: &str| seen.push(t.to_string());
        session
            .ingest(b"{\"message\":{\"content\":\"tail\"}}", &mut on_token)
            .unwrap();
        let completion = session.complete(&mut on_token).unwrap();
        assert_eq!(completion.text, "tail");
        assert!(!completion.stats.terminal_seen);
        assert_eq!(seen, vec!["tail"]);
    }

    #[test]
    fn ingest_requires_streaming_state() {
        let mut session = StreamSession::new();
        let err = session.ingest(b"x\n", &mut |_: &str| {}).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { from: "idle", .. }));
    }

    #[test]
    fn failed_session_cannot_complete() {
        let mut session = StreamSession::new();
        session.begin_connect().unwrap();
        session.fail().unwrap();
        assert_eq!(session.state(), SessionState::Failed);
        assert!(session.complete(&mut |_: &str| {}).is_err());
    }

    #[test]
    fn cancel_from_streaming() {
        let mut session = streaming();
        session.cancel().unwrap();
        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.cancel().is_err());
    }
}
