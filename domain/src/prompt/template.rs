//! Prompt templates for the analyst features

use crate::core::model::Model;
use crate::dashboard::snapshot::{MarketSnapshot, ProtocolMetrics};
use serde_json::Value;

/// Number of protocols mentioned in the market commentary prompt.
const COMMENTARY_TOP_PROTOCOLS: usize = 5;

/// Templates for generating prompts for each analyst feature
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt used by one-shot generation when the caller gives none
    pub fn default_system() -> &'static str {
        "You are a helpful DeFi assistant."
    }

    /// First assistant turn shown in a fresh chat
    pub fn chat_greeting() -> &'static str {
        "Hello! I am your DeFi Risk Analyst. I have access to the dashboard data. Ask me anything about the market or specific protocols."
    }

    /// System prompt for the chat, with the dashboard data appended when available
    pub fn chat_system(context: Option<&Value>) -> String {
        let mut prompt = String::from(
            "You are an expert DeFi Analyst. Answer based on the provided data context if relevant.",
        );
        if let Some(context) = context {
            let rendered =
                serde_json::to_string_pretty(context).unwrap_or_else(|_| context.to_string());
            prompt.push_str("\n\nCURRENT DASHBOARD DATA:\n");
            prompt.push_str(&rendered);
        }
        prompt
    }

    /// System prompt for the market commentary, naming the model that answers
    pub fn commentary_system(model: &Model) -> String {
        format!("You are a DeFi analyst. Be concise. Model: {}", model)
    }

    /// User prompt for the one-sentence market commentary
    pub fn market_commentary(snapshot: &MarketSnapshot) -> String {
        let top = snapshot
            .top(COMMENTARY_TOP_PROTOCOLS)
            .iter()
            .map(|p| format!("{} (${:.1}B TVL)", p.name, p.tvl / 1e9))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Analyze this DeFi market snapshot in 1 short sentence (max 15 words). Mention key trends. Top protocols: {}.",
            top
        )
    }

    /// User prompt for a protocol risk report
    pub fn risk_report(metrics: &ProtocolMetrics) -> String {
        let change = metrics
            .change_7d
            .map(|c| c.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        format!(
            r#"Analyze risk for {}.
Context:
- TVL: ${:.2} Billion
- 7d Change: {}%
- Audit Status: {} (Count or Yes/No)

Please list 3 key risks and 1 strength. Use Markdown formatting."#,
            metrics.name,
            metrics.tvl / 1e9,
            change,
            metrics.audits
        )
    }
}
