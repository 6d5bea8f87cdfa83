//! Market Commentary use case.
//!
//! One-shot generation of a single-sentence comment on the market snapshot.
//! Tokens are not displayed; only the final text matters.

use super::shared::{AnalystOutcome, COMMENTARY_EMPTY, COMMENTARY_FALLBACK};
use super::stream_chat::StreamChatUseCase;
use crate::config::AiSettings;
use riskwatch_domain::{MarketSnapshot, PromptTemplate};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Use case for generating the market commentary.
#[derive(Clone)]
pub struct MarketCommentaryUseCase {
    stream: StreamChatUseCase,
}

impl MarketCommentaryUseCase {
    pub fn new(stream: StreamChatUseCase) -> Self {
        Self { stream }
    }

    pub async fn execute(
        &self,
        settings: &AiSettings,
        snapshot: &MarketSnapshot,
        cancellation: Option<&CancellationToken>,
    ) -> AnalystOutcome {
        if !settings.enabled {
            debug!("AI disabled, skipping market commentary");
            return AnalystOutcome::Disabled;
        }

        let prompt = PromptTemplate::market_commentary(snapshot);
        let system = PromptTemplate::commentary_system(&settings.model);
        let result = self
            .stream
            .generate(
                settings,
                &prompt,
                Some(&system),
                cancellation,
            )
            .await;

        match result {
            Ok(text) if text.trim().is_empty() => {
                AnalystOutcome::Generated(COMMENTARY_EMPTY.to_string())
            }
            Ok(text) => AnalystOutcome::Generated(text.trim().to_string()),
            Err(e) => {
                warn!("Market commentary failed: {}", e);
                AnalystOutcome::fallback(COMMENTARY_FALLBACK, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::stream_chat::tests::ScriptedTransport;
    use riskwatch_domain::{Message, ProtocolSummary};
    use std::sync::Arc;

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot {
            protocols: vec![
                ProtocolSummary {
                    name: "Lido".to_string(),
                    tvl: 30.2e9,
                },
                ProtocolSummary {
                    name: "Aave".to_string(),
                    tvl: 12.0e9,
                },
            ],
        }
    }

    fn use_case(transport: Arc<ScriptedTransport>) -> MarketCommentaryUseCase {
        MarketCommentaryUseCase::new(StreamChatUseCase::new(transport))
    }

    #[tokio::test]
    async fn test_generated_commentary() {
        let transport = Arc::new(ScriptedTransport::new(&[
            "{\"message\":{\"content\":\" Liquid staking dominates.\"}}\n{\"done\":true}\n",
        ]));
        let outcome = use_case(transport.clone())
            .execute(&AiSettings::default(), &snapshot(), None)
            .await;
        assert_eq!(
            outcome,
            AnalystOutcome::Generated("Liquid staking dominates.".to_string())
        );

        let request = transport.last_request.lock().unwrap().clone().unwrap();
        let turns = request.messages.turns();
        assert_eq!(
            turns[0],
            Message::system("You are a DeFi analyst. Be concise. Model: gemma3:12b")
        );
        assert!(turns[1].content.contains("Lido ($30.2B TVL), Aave ($12.0B TVL)"));
    }

    #[tokio::test]
    async fn test_empty_commentary_is_replaced() {
        let transport = Arc::new(ScriptedTransport::new(&["{\"message\":{\"content\":\"  \"},\"done\":true}\n"]));
        let outcome = use_case(transport)
            .execute(&AiSettings::default(), &snapshot(), None)
            .await;
        assert_eq!(outcome.text(), Some("Market stable. No major anomalies detected."));
    }

    #[tokio::test]
    async fn test_offline_falls_back() {
        let outcome = use_case(Arc::new(ScriptedTransport::refusing()))
            .execute(&AiSettings::default(), &snapshot(), None)
            .await;
        assert_eq!(outcome.text(), Some("AI Analysis unavailable (Local LLM offline)"));
        assert!(matches!(outcome, AnalystOutcome::Fallback { .. }));
    }

    #[tokio::test]
    async fn test_disabled_skips_request() {
        let transport = Arc::new(ScriptedTransport::new(&["{\"done\":true}\n"]));
        let outcome = use_case(transport.clone())
            .execute(&AiSettings::default().with_enabled(false), &snapshot(), None)
            .await;
        assert_eq!(outcome, AnalystOutcome::Disabled);
        assert_eq!(transport.open_count(), 0);
    }
}
