//! Protocol Risk Report use case.
//!
//! Streams a Markdown risk report for one protocol. The report is built up
//! token by token so it can be displayed while it is being written.

use super::shared::{AnalystOutcome, REPORT_FALLBACK};
use super::stream_chat::{StreamChatInput, StreamChatUseCase};
use crate::config::AiSettings;
use riskwatch_domain::{ConversationHistory, Message, PromptTemplate, ProtocolDetails};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Use case for generating a protocol risk report.
#[derive(Clone)]
pub struct RiskReportUseCase {
    stream: StreamChatUseCase,
}

impl RiskReportUseCase {
    pub fn new(stream: StreamChatUseCase) -> Self {
        Self { stream }
    }

    /// Generate the report.
    ///
    /// `on_update` receives each token and the report so far. On failure the
    /// partial report is discarded and the fallback text is returned.
    pub async fn execute<F>(
        &self,
        settings: &AiSettings,
        details: &ProtocolDetails,
        mut on_update: F,
        cancellation: Option<&CancellationToken>,
    ) -> AnalystOutcome
    where
        F: FnMut(&str, &str),
    {
        if !settings.enabled {
            debug!("AI disabled, skipping risk report");
            return AnalystOutcome::Disabled;
        }

        let metrics = details.metrics();
        info!("Generating risk report for {}", metrics.name);
        let history = ConversationHistory::new()
            .with(Message::user(PromptTemplate::risk_report(&metrics)));

        let input = match StreamChatInput::from_settings(settings, history) {
            Ok(input) => input,
            Err(e) => return AnalystOutcome::fallback(REPORT_FALLBACK, e),
        };

        let mut report = String::new();
        let result = self
            .stream
            .execute(
                input,
                |token| {
                    report.push_str(token);
                    on_update(token, &report);
                },
                cancellation,
            )
            .await;

        match result {
            Ok(text) => AnalystOutcome::Generated(text),
            Err(e) => {
                warn!("Risk report for {} failed: {}", metrics.name, e);
                AnalystOutcome::fallback(REPORT_FALLBACK, e)
            }
        }
    }
}
