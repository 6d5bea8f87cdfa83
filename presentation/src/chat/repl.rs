//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::ConsoleFormatter;
use crate::ProgressReporter;
use colored::Colorize;
use riskwatch_application::{
    AiSettings, ChatConversation, ChatTurnOutcome, StreamChatUseCase, TranscriptEntry,
};
use riskwatch_domain::Role;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// What a slash command asks the loop to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandAction {
    Help,
    ListModels,
    Clear,
    Quit,
}

fn parse_command(cmd: &str) -> Option<CommandAction> {
    match cmd {
        "/quit" | "/exit" | "/q" => Some(CommandAction::Quit),
        "/help" | "/h" | "/?" => Some(CommandAction::Help),
        "/models" => Some(CommandAction::ListModels),
        "/clear" => Some(CommandAction::Clear),
        _ => None,
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    chat: StreamChatUseCase,
    settings: AiSettings,
    conversation: ChatConversation,
    show_progress: bool,
    history_file: Option<PathBuf>,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(chat: StreamChatUseCase, settings: AiSettings) -> Self {
        Self {
            chat,
            settings,
            conversation: ChatConversation::new(None),
            show_progress: true,
            history_file: dirs::data_dir().map(|p| p.join("riskwatch").join("history.txt")),
        }
    }

    /// Ground the conversation on dashboard data
    pub fn with_context(mut self, context: Option<Value>) -> Self {
        self.conversation.set_context(context);
        self
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Override the readline history file
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.history_file = path;
        }
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(ref path) = self.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let readline = rl.readline(">>> ");

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        match parse_command(line) {
                            Some(CommandAction::Quit) => {
                                println!("Bye!");
                                break;
                            }
                            Some(CommandAction::Help) => self.print_help(),
                            Some(CommandAction::ListModels) => self.list_models().await,
                            Some(CommandAction::Clear) => {
                                self.conversation.clear();
                                println!("Conversation cleared.");
                                self.print_transcript();
                            }
                            None => {
                                println!("Unknown command: {}", line);
                                println!("Type /help for available commands");
                            }
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);
                    self.process_message(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_file {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│         riskwatch - DeFi Analyst Chat       │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Model: {} @ {}", self.settings.model, self.settings.server_url);
        if self.conversation.context().is_some() {
            println!("Dashboard data: loaded");
        }
        if !self.settings.enabled {
            println!("{}", "AI features are disabled; messages will not be sent.".yellow());
        }
        self.print_help();
        self.print_transcript();
    }

    fn print_help(&self) {
        println!();
        println!("Commands:");
        println!("  /help, /h, /?    - Show this help");
        println!("  /models          - List models installed on the server");
        println!("  /clear           - Start a new conversation");
        println!("  /quit, /exit, /q - Exit chat");
        println!("  Ctrl-C while a reply streams stops it");
        println!();
    }

    fn print_transcript(&self) {
        for entry in self.conversation.entries() {
            match entry {
                TranscriptEntry::Turn(message) if message.role == Role::User => {
                    println!("{} {}", ">>>".dimmed(), message.content);
                }
                TranscriptEntry::Turn(message) => println!("{}\n", message.content),
                TranscriptEntry::Notice(text) => println!("{}\n", ConsoleFormatter::notice(text)),
            }
        }
    }

    async fn list_models(&self) {
        let models = self
            .chat
            .transport()
            .list_models(self.settings.base_url())
            .await
            .unwrap_or_else(|e| {
                debug!("Model listing failed: {}", e);
                Vec::new()
            });
        println!();
        print!("{}", ConsoleFormatter::format_models(&models));
        println!();
    }

    async fn process_message(&mut self, message: &str) {
        println!();

        let cancellation = CancellationToken::new();
        let watcher = {
            let token = cancellation.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            })
        };

        let mut progress = if self.show_progress {
            ProgressReporter::start("Thinking...")
        } else {
            ProgressReporter::hidden()
        };
        let mut stdout = std::io::stdout();

        let outcome = self
            .conversation
            .send(
                &self.chat,
                &self.settings,
                message,
                |token, _| {
                    progress.clear();
                    let _ = write!(stdout, "{}", token);
                    let _ = stdout.flush();
                },
                Some(&cancellation),
            )
            .await;
        watcher.abort();
        progress.clear();

        match outcome {
            ChatTurnOutcome::Replied(_) => println!(),
            ChatTurnOutcome::Cancelled { .. } => println!("\n{}", "[stopped]".dimmed()),
            ChatTurnOutcome::Failed(e) => {
                debug!("Chat turn failed: {}", e);
                println!("{}", ConsoleFormatter::notice(riskwatch_application::CHAT_FALLBACK));
            }
            ChatTurnOutcome::Disabled => {
                println!("{}", "AI features are disabled.".yellow());
            }
            ChatTurnOutcome::Ignored => {}
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/q"), Some(CommandAction::Quit));
        assert_eq!(parse_command("/exit"), Some(CommandAction::Quit));
        assert_eq!(parse_command("/?"), Some(CommandAction::Help));
        assert_eq!(parse_command("/models"), Some(CommandAction::ListModels));
        assert_eq!(parse_command("/clear"), Some(CommandAction::Clear));
        assert_eq!(parse_command("/nope"), None);
    }
}
