//! Streaming events for chat sessions.
//!
//! [`StreamEvent`] is what a spawned stream session delivers over its channel,
//! enabling real-time display of model output as it's generated.

/// An event in a streaming chat response.
///
/// Zero or more `Delta`s are followed by exactly one terminal event
/// (`Completed`, `Error` or `Cancelled`). `E` is the failure type carried by
/// `Error`; the application layer sends its own typed error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent<E = String> {
    /// A content token from the model.
    Delta(String),
    /// The complete response text (signals stream end).
    Completed(String),
    /// The session failed (signals stream end).
    Error(E),
    /// The session was cancelled by the caller (signals stream end).
    Cancelled,
}

impl<E> StreamEvent<E> {
    /// Returns the text content if this is a Delta or Completed event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) | StreamEvent::Completed(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Delta(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_text_returns_content() {
        let event: StreamEvent = StreamEvent::Delta("Risk ".to_string());
        assert_eq!(event.text(), Some("Risk "));
        assert!(!event.is_terminal());
    }

    #[test]
    fn completed_text_returns_content_and_is_terminal() {
        let event: StreamEvent = StreamEvent::Completed("Risk is moderate.".to_string());
        assert_eq!(event.text(), Some("Risk is moderate."));
        assert!(event.is_terminal());
    }

    #[test]
    fn error_and_cancelled_are_terminal_without_text() {
        let error = StreamEvent::Error("connection refused".to_string());
        assert_eq!(error.text(), None);
        assert!(error.is_terminal());
        let cancelled: StreamEvent = StreamEvent::Cancelled;
        assert!(cancelled.is_terminal());
        assert_eq!(cancelled.text(), None);
    }
}
