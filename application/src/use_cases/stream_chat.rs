//! Stream Chat use case.
//!
//! Drives one streaming exchange with the model server: opens the transport,
//! feeds every chunk through the [`StreamSession`], and forwards content
//! tokens to the caller as they arrive.
//!
//! ```text
//! open_chat ──► chunk ──► LineDecoder ──► MessageAssembler ──► on_token
//!                 ▲                                               │
//!                 └────────────── next chunk ◄────────────────────┘
//! ```
//!
//! The only suspension point is the wait for the next chunk (or for the
//! connection). Cancellation and the optional timeout race that wait.

use crate::config::AiSettings;
use crate::ports::chat_transport::{ChatRequest, ChatTransport, TransportError};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use futures::StreamExt;
use riskwatch_domain::{
    Completion, ConversationHistory, DomainError, Model, PromptTemplate, StreamEvent,
    StreamSession,
};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Errors that end a stream session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamChatError {
    #[error("Configuration error: {0}")]
    Configuration(DomainError),

    #[error("Transport error: {0}")]
    Transport(TransportError),

    #[error("Stream read failed: {0}")]
    StreamRead(TransportError),

    #[error("Cancelled")]
    Cancelled,

    #[error("Timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Session error: {0}")]
    Session(DomainError),

    #[error("Stream aborted: {0}")]
    Aborted(String),
}

impl StreamChatError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamChatError::Cancelled)
    }

    /// Whether the model server could not be reached at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, StreamChatError::Transport(_))
    }
}

/// Event delivered by [`StreamChatUseCase::spawn_stream`].
pub type ChatStreamEvent = StreamEvent<StreamChatError>;

/// Input for the [`StreamChatUseCase`].
#[derive(Debug, Clone)]
pub struct StreamChatInput {
    pub server_url: String,
    pub model: Model,
    /// Sent verbatim, oldest turn first.
    pub history: ConversationHistory,
    /// Limit for the connection and for each chunk read.
    pub timeout: Option<Duration>,
}

impl StreamChatInput {
    pub fn new(server_url: impl Into<String>, model: Model, history: ConversationHistory) -> Self {
        Self {
            server_url: server_url.into(),
            model,
            history,
            timeout: None,
        }
    }

    /// Build an input from the AI settings.
    ///
    /// Fails fast when AI is disabled or the server URL is empty.
    pub fn from_settings(
        settings: &AiSettings,
        history: ConversationHistory,
    ) -> Result<Self, StreamChatError> {
        settings.validate().map_err(StreamChatError::Configuration)?;
        Ok(Self {
            server_url: settings.base_url().to_string(),
            model: settings.model.clone(),
            history,
            timeout: settings.timeout,
        })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

fn is_cancelled(cancellation: Option<&CancellationToken>) -> bool {
    cancellation.is_some_and(|t| t.is_cancelled())
}

/// Move a streaming session to `Cancelled` and return the matching error.
fn cancel_session(session: &mut StreamSession) -> StreamChatError {
    info!("Chat cancelled after {} chars", session.text().len());
    match session.cancel() {
        Ok(()) => StreamChatError::Cancelled,
        Err(e) => StreamChatError::Session(e),
    }
}

/// Outcome of racing one suspension point.
enum Raced<T> {
    Ready(T),
    Cancelled,
    TimedOut(Duration),
}

async fn race<F: Future>(
    fut: F,
    timeout: Option<Duration>,
    cancellation: Option<&CancellationToken>,
) -> Raced<F::Output> {
    let limited = async {
        match timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(output) => Raced::Ready(output),
                Err(_) => Raced::TimedOut(limit),
            },
            None => Raced::Ready(fut.await),
        }
    };

    match cancellation {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Raced::Cancelled,
                raced = limited => raced,
            }
        }
        None => limited.await,
    }
}

/// Use case for one streaming chat exchange.
///
/// Stateless between calls: every invocation owns a fresh [`StreamSession`],
/// so concurrent calls share nothing but the transport.
pub struct StreamChatUseCase {
    transport: Arc<dyn ChatTransport>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl Clone for StreamChatUseCase {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            conversation_logger: self.conversation_logger.clone(),
        }
    }
}

impl StreamChatUseCase {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn transport(&self) -> &Arc<dyn ChatTransport> {
        &self.transport
    }

    /// Stream a reply, calling `on_token` once per content token.
    ///
    /// Returns the accumulated text. `on_token` is never called after this
    /// future resolves, nor after `cancellation` fires.
    pub async fn execute<F>(
        &self,
        input: StreamChatInput,
        on_token: F,
        cancellation: Option<&CancellationToken>,
    ) -> Result<String, StreamChatError>
    where
        F: FnMut(&str),
    {
        self.execute_with_stats(input, on_token, cancellation)
            .await
            .map(|completion| completion.text)
    }

    /// Like [`execute`](Self::execute), also returning the completion statistics.
    pub async fn execute_with_stats<F>(
        &self,
        input: StreamChatInput,
        mut on_token: F,
        cancellation: Option<&CancellationToken>,
    ) -> Result<Completion, StreamChatError>
    where
        F: FnMut(&str),
    {
        let server_url = input.server_url.trim().trim_end_matches('/');
        if server_url.is_empty() {
            return Err(StreamChatError::Configuration(DomainError::EmptyServerUrl));
        }

        let request = ChatRequest {
            server_url: server_url.to_string(),
            model: input.model,
            messages: input.history,
        };
        debug!(
            "Streaming chat: model {}, {} turns, server {}",
            request.model,
            request.messages.len(),
            request.server_url
        );
        self.conversation_logger.log(ConversationEvent::new(
            "chat_request",
            json!({
                "model": request.model.as_str(),
                "server_url": request.server_url,
                "messages": request.messages,
            }),
        ));

        let result = self
            .run_session(&request, &mut on_token, input.timeout, cancellation)
            .await;

        match &result {
            Ok(completion) => {
                self.conversation_logger.log(ConversationEvent::new(
                    "chat_completed",
                    json!({
                        "model": request.model.as_str(),
                        "text": completion.text,
                        "stats": completion.stats,
                    }),
                ));
            }
            Err(e) => {
                self.conversation_logger.log(ConversationEvent::new(
                    "chat_failed",
                    json!({
                        "model": request.model.as_str(),
                        "error": e.to_string(),
                    }),
                ));
            }
        }
        result
    }

    async fn run_session<F>(
        &self,
        request: &ChatRequest,
        on_token: &mut F,
        timeout: Option<Duration>,
        cancellation: Option<&CancellationToken>,
    ) -> Result<Completion, StreamChatError>
    where
        F: FnMut(&str),
    {
        let mut session = StreamSession::new();
        session.begin_connect().map_err(StreamChatError::Session)?;

        let opened = race(self.transport.open_chat(request), timeout, cancellation).await;
        let mut stream = match opened {
            Raced::Ready(Ok(stream)) => stream,
            Raced::Ready(Err(e)) => {
                warn!("Could not open chat stream: {}", e);
                session.fail().map_err(StreamChatError::Session)?;
                return Err(StreamChatError::Transport(e));
            }
            Raced::Cancelled => {
                info!("Chat cancelled before the stream opened");
                session.cancel().map_err(StreamChatError::Session)?;
                return Err(StreamChatError::Cancelled);
            }
            Raced::TimedOut(limit) => {
                warn!("Connecting to {} timed out", request.server_url);
                session.fail().map_err(StreamChatError::Session)?;
                return Err(StreamChatError::TimedOut(limit));
            }
        };
        session.connected().map_err(StreamChatError::Session)?;
        info!("Chat stream open ({})", request.model);

        // Tokens already decoded when cancellation fires are not forwarded.
        let mut forward = |token: &str| {
            if !is_cancelled(cancellation) {
                on_token(token);
            }
        };

        loop {
            let next = race(stream.next(), timeout, cancellation).await;
            match next {
                Raced::Ready(Some(Ok(chunk))) => {
                    let outcome = session
                        .ingest(&chunk, &mut forward)
                        .map_err(StreamChatError::Session)?;
                    trace!(
                        "Chunk: {} lines, {} tokens, {} chars total",
                        outcome.lines,
                        outcome.tokens,
                        session.text().len()
                    );
                    if is_cancelled(cancellation) {
                        drop(stream);
                        return Err(cancel_session(&mut session));
                    }
                    if outcome.terminal {
                        break;
                    }
                }
                Raced::Ready(Some(Err(e))) => {
                    warn!("Chat stream read failed: {}", e);
                    session.fail().map_err(StreamChatError::Session)?;
                    return Err(StreamChatError::StreamRead(e));
                }
                Raced::Ready(None) => break,
                Raced::Cancelled => {
                    drop(stream);
                    return Err(cancel_session(&mut session));
                }
                Raced::TimedOut(limit) => {
                    drop(stream);
                    warn!("No chunk from {} within {:?}", request.server_url, limit);
                    session.fail().map_err(StreamChatError::Session)?;
                    return Err(StreamChatError::TimedOut(limit));
                }
            }
        }
        drop(stream);
        if is_cancelled(cancellation) {
            return Err(cancel_session(&mut session));
        }

        let completion = session
            .complete(&mut forward)
            .map_err(StreamChatError::Session)?;
        info!(
            "Chat completed: {} chars, {} tokens",
            completion.text.len(),
            completion.stats.tokens
        );
        Ok(completion)
    }

    /// One-shot generation: a system turn plus one user turn, tokens ignored.
    ///
    /// Uses [`PromptTemplate::default_system`] when `system` is `None`.
    pub async fn generate(
        &self,
        settings: &AiSettings,
        prompt: &str,
        system: Option<&str>,
        cancellation: Option<&CancellationToken>,
    ) -> Result<String, StreamChatError> {
        let history = ConversationHistory::system_and_user(
            system.unwrap_or(PromptTemplate::default_system()),
            prompt,
        );
        let input = StreamChatInput::from_settings(settings, history)?;
        self.execute(input, |_| {}, cancellation).await
    }

    /// Run a session on its own task and deliver its events over a channel.
    ///
    /// Dropping the returned handle cancels the session.
    pub fn spawn_stream(&self, input: StreamChatInput) -> StreamHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancellation = CancellationToken::new();
        let token = cancellation.clone();
        let use_case = self.clone();

        tokio::spawn(async move {
            let result = use_case
                .execute(
                    input,
                    |t| {
                        let _ = tx.send(StreamEvent::Delta(t.to_string()));
                    },
                    Some(&token),
                )
                .await;
            let terminal = match result {
                Ok(text) => StreamEvent::Completed(text),
                Err(StreamChatError::Cancelled) => StreamEvent::Cancelled,
                Err(e) => StreamEvent::Error(e),
            };
            // The receiver may already be gone
            let _ = tx.send(terminal);
        });

        StreamHandle::new(rx, cancellation)
    }
}

/// Handle for receiving events from a spawned stream session.
///
/// Wraps an `mpsc::UnboundedReceiver<ChatStreamEvent>`; dropping it cancels the
/// session.
pub struct StreamHandle {
    receiver: mpsc::UnboundedReceiver<ChatStreamEvent>,
    cancellation: CancellationToken,
}

impl StreamHandle {
    pub fn new(
        receiver: mpsc::UnboundedReceiver<ChatStreamEvent>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            receiver,
            cancellation,
        }
    }

    /// Next event, or `None` once the session task is gone.
    pub async fn recv(&mut self) -> Option<ChatStreamEvent> {
        self.receiver.recv().await
    }

    /// Request cancellation without dropping the handle.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Consume the stream and return the final text.
    pub async fn collect_text(mut self) -> Result<String, StreamChatError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed(text) => return Ok(text),
                StreamEvent::Error(e) => return Err(e),
                StreamEvent::Cancelled => return Err(StreamChatError::Cancelled),
            }
        }
        Err(StreamChatError::Aborted(format!(
            "session ended without a result after {} chars",
            full_text.len()
        )))
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}
