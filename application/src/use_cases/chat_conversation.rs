//! Chat Conversation use case.
//!
//! Holds the running transcript of the analyst chat and drives one streamed
//! reply per user message. The model server is stateless, so every request
//! carries the system prompt plus the whole transcript.
//!
//! The transcript starts with the assistant greeting. Fallback notices shown
//! after a failed reply are kept for display but never sent to the model.

use super::shared::CHAT_FALLBACK;
use super::stream_chat::{StreamChatError, StreamChatInput, StreamChatUseCase};
use crate::config::AiSettings;
use riskwatch_domain::{ConversationHistory, Message, PromptTemplate};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One displayed entry of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    /// A turn that is part of the conversation history.
    Turn(Message),
    /// A display-only notice (e.g. the connection error fallback).
    Notice(String),
}

/// Outcome of sending one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTurnOutcome {
    /// The assistant replied with this text.
    Replied(String),
    /// The reply failed; [`CHAT_FALLBACK`] was added to the transcript.
    Failed(StreamChatError),
    /// The reply was cancelled; `partial` is kept as the assistant turn when non-empty.
    Cancelled { partial: String },
    /// AI features are off; nothing was sent or recorded.
    Disabled,
    /// Blank input; nothing was sent or recorded.
    Ignored,
}

/// State of the analyst chat.
#[derive(Debug, Clone)]
pub struct ChatConversation {
    context: Option<Value>,
    entries: Vec<TranscriptEntry>,
}

impl ChatConversation {
    /// New conversation, optionally grounded on dashboard data.
    pub fn new(context: Option<Value>) -> Self {
        Self {
            context,
            entries: vec![greeting()],
        }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn context(&self) -> Option<&Value> {
        self.context.as_ref()
    }

    /// Replace the dashboard data used by later requests.
    pub fn set_context(&mut self, context: Option<Value>) {
        self.context = context;
    }

    /// Forget everything but the greeting.
    pub fn clear(&mut self) {
        self.entries = vec![greeting()];
    }

    /// The history that would be sent for the next request, without the new user turn.
    pub fn history(&self) -> ConversationHistory {
        let system = Message::system(PromptTemplate::chat_system(self.context.as_ref()));
        std::iter::once(system)
            .chain(self.entries.iter().filter_map(|entry| match entry {
                TranscriptEntry::Turn(message) => Some(message.clone()),
                TranscriptEntry::Notice(_) => None,
            }))
            .collect()
    }

    /// Send a user message and stream the reply into the transcript.
    ///
    /// `on_update` receives each token and the reply so far.
    pub async fn send<F>(
        &mut self,
        chat: &StreamChatUseCase,
        settings: &AiSettings,
        input: &str,
        mut on_update: F,
        cancellation: Option<&CancellationToken>,
    ) -> ChatTurnOutcome
    where
        F: FnMut(&str, &str),
    {
        let input = input.trim();
        if input.is_empty() {
            return ChatTurnOutcome::Ignored;
        }
        if !settings.enabled {
            debug!("AI disabled, chat message not sent");
            return ChatTurnOutcome::Disabled;
        }

        let user = Message::user(input);
        let history = self.history().with(user.clone());
        self.entries.push(TranscriptEntry::Turn(user));
        self.entries
            .push(TranscriptEntry::Turn(Message::assistant(String::new())));
        let in_progress = self.entries.len() - 1;
        info!("Chat: sending {} turns", history.len());

        let result = match StreamChatInput::from_settings(settings, history) {
            Ok(request) => {
                let entries = &mut self.entries;
                chat.execute(
                    request,
                    |token| {
                        if let Some(TranscriptEntry::Turn(reply)) = entries.get_mut(in_progress) {
                            reply.content.push_str(token);
                            on_update(token, &reply.content);
                        }
                    },
                    cancellation,
                )
                .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(text) => {
                self.entries[in_progress] = TranscriptEntry::Turn(Message::assistant(text.clone()));
                ChatTurnOutcome::Replied(text)
            }
            Err(StreamChatError::Cancelled) => {
                let partial = match self.entries.remove(in_progress) {
                    TranscriptEntry::Turn(reply) => reply.content,
                    TranscriptEntry::Notice(_) => String::new(),
                };
                if !partial.is_empty() {
                    self.entries
                        .push(TranscriptEntry::Turn(Message::assistant(partial.clone())));
                }
                ChatTurnOutcome::Cancelled { partial }
            }
            Err(e) => {
                warn!("Chat reply failed: {}", e);
                self.entries.remove(in_progress);
                self.entries
                    .push(TranscriptEntry::Notice(CHAT_FALLBACK.to_string()));
                ChatTurnOutcome::Failed(e)
            }
        }
    }
}

fn greeting() -> TranscriptEntry {
    TranscriptEntry::Turn(Message::assistant(PromptTemplate::chat_greeting()))
}
