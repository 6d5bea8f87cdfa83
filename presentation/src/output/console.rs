//! Console output formatter for analyst results

use colored::Colorize;
use riskwatch_application::{AiSettings, AnalystOutcome, ModelInfo};
use serde_json::json;

/// Formats analyst results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a one-shot analyst outcome under a title
    pub fn format_outcome(title: &str, outcome: &AnalystOutcome) -> String {
        let mut output = String::new();
        output.push_str(&Self::header(title));
        output.push('\n');

        match outcome {
            AnalystOutcome::Generated(text) => {
                output.push_str(text);
                output.push('\n');
            }
            AnalystOutcome::Fallback { text, error } => {
                output.push_str(&format!("{}\n", text.yellow()));
                output.push_str(&format!("{} {}\n", "Reason:".dimmed(), error));
            }
            AnalystOutcome::Disabled => {
                output.push_str(&format!("{}\n", "AI features are disabled.".dimmed()));
            }
        }
        output
    }

    /// Format a one-shot analyst outcome as JSON
    pub fn format_outcome_json(outcome: &AnalystOutcome) -> String {
        let value = match outcome {
            AnalystOutcome::Generated(text) => json!({"status": "generated", "text": text}),
            AnalystOutcome::Fallback { text, error } => {
                json!({"status": "fallback", "text": text, "error": error.to_string()})
            }
            AnalystOutcome::Disabled => json!({"status": "disabled", "text": null}),
        };
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the model listing
    pub fn format_models(models: &[ModelInfo]) -> String {
        if models.is_empty() {
            return format!(
                "{}\n",
                "No models detected. Ensure Ollama is running.".yellow()
            );
        }

        let mut output = format!("{}\n", "Installed models:".cyan().bold());
        for model in models {
            let size = model
                .size
                .map(|bytes| format!(" ({:.1} GB)", bytes as f64 / 1e9))
                .unwrap_or_default();
            output.push_str(&format!("  - {}{}\n", model.name, size.dimmed()));
        }
        output
    }

    /// Format the model listing as JSON
    pub fn format_models_json(models: &[ModelInfo]) -> String {
        let list: Vec<_> = models
            .iter()
            .map(|m| json!({"name": m.name, "size": m.size, "modified_at": m.modified_at}))
            .collect();
        serde_json::to_string_pretty(&json!({ "models": list }))
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the connectivity probe result
    pub fn format_connection(server_url: &str, reachable: bool) -> String {
        if reachable {
            format!("{} Ollama reachable at {}", "v".green(), server_url)
        } else {
            format!("{} Ollama not reachable at {}", "x".red(), server_url)
        }
    }

    /// Format the resolved AI settings
    pub fn format_settings(settings: &AiSettings) -> String {
        let timeout = settings
            .timeout
            .map(|t| format!("{}s", t.as_secs()))
            .unwrap_or_else(|| "none".to_string());
        format!(
            "{}\n  server_url: {}\n  model:      {}\n  enabled:    {}\n  timeout:    {}\n",
            "Resolved AI settings:".cyan().bold(),
            settings.server_url,
            settings.model,
            settings.enabled,
            timeout
        )
    }

    /// A display-only notice in the chat transcript
    pub fn notice(text: &str) -> String {
        format!("{}", text.yellow())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
