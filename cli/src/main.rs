//! CLI entrypoint for riskwatch
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use riskwatch_application::{
    AiSettings, AnalystOutcome, ChatTransport, ConversationLogger, MarketCommentaryUseCase, NoConversationLogger,
    RiskReportUseCase, StreamChatInput, StreamChatUseCase,
};
use riskwatch_domain::{ConversationHistory, MarketSnapshot, Model, PromptTemplate, ProtocolDetails};
use riskwatch_infrastructure::{ConfigLoader, FileConfig, JsonlConversationLogger, OllamaTransport};
use riskwatch_presentation::{
    ChatRepl, Cli, Command, ConsoleFormatter, OutputFormat, ProgressReporter,
};
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting riskwatch");

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?
    };
    let settings = resolve_settings(&cli, &config)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        println!();
        print!("{}", ConsoleFormatter::format_settings(&settings));
        return Ok(());
    }

    // === Dependency Injection ===
    let transport = match settings.timeout {
        Some(timeout) => OllamaTransport::with_connect_timeout(timeout)?,
        None => OllamaTransport::new(),
    };
    let transport = Arc::new(transport);
    let stream = StreamChatUseCase::new(transport.clone())
        .with_conversation_logger(transcript_logger(&config));

    let show_progress = !cli.quiet && config.repl.show_progress;

    match cli.command {
        Command::Chat { context } => {
            let context = context
                .as_deref()
                .map(read_json::<serde_json::Value>)
                .transpose()?;
            let mut repl = ChatRepl::new(stream, settings)
                .with_context(context)
                .with_progress(show_progress)
                .with_history_file(config.repl.history_file.as_deref().map(PathBuf::from));
            repl.run().await?;
        }
        Command::Ask { prompt, system } => {
            run_ask(&stream, &settings, &prompt, system.as_deref(), show_progress).await?;
        }
        Command::Commentary { snapshot, output } => {
            let snapshot: MarketSnapshot = read_json(&snapshot)?;
            let mut progress = spinner(show_progress && output == OutputFormat::Text);
            let outcome = MarketCommentaryUseCase::new(stream)
                .execute(&settings, &snapshot, None)
                .await;
            progress.clear();
            print_outcome("Market Commentary", &outcome, output);
        }
        Command::Report { snapshot, output } => {
            let details: ProtocolDetails = read_json(&snapshot)?;
            run_report(stream, &settings, &details, output, show_progress).await;
        }
        Command::Models { output } => {
            let models = transport
                .list_models(settings.base_url())
                .await
                .unwrap_or_else(|e| {
                    warn!("Could not list models: {}", e);
                    Vec::new()
                });
            match output {
                OutputFormat::Text => print!("{}", ConsoleFormatter::format_models(&models)),
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_models_json(&models)),
            }
        }
        Command::Ping => {
            let reachable = transport.check_connection(settings.base_url()).await;
            println!(
                "{}",
                ConsoleFormatter::format_connection(settings.base_url(), reachable)
            );
            if !reachable {
                bail!("Ollama is not reachable");
            }
        }
    }

    Ok(())
}

/// Merge the `[ai]` config section with command-line overrides.
fn resolve_settings(cli: &Cli, config: &FileConfig) -> Result<AiSettings> {
    let mut settings = config.ai_settings()?;

    if let Some(url) = &cli.server_url {
        settings = settings.with_server_url(url.trim());
    }
    if let Some(model) = &cli.model {
        settings = settings.with_model(model.parse::<Model>()?);
    }
    if cli.disable_ai {
        settings = settings.with_enabled(false);
    }
    match cli.timeout {
        Some(0) => bail!("--timeout must be greater than 0"),
        Some(secs) => settings = settings.with_timeout(Some(Duration::from_secs(secs))),
        None => {}
    }
    Ok(settings)
}

fn transcript_logger(config: &FileConfig) -> Arc<dyn ConversationLogger> {
    config
        .logging
        .transcript
        .as_deref()
        .and_then(JsonlConversationLogger::new)
        .map(|logger| {
            info!("Writing transcript to {}", logger.path().display());
            Arc::new(logger) as Arc<dyn ConversationLogger>
        })
        .unwrap_or_else(|| Arc::new(NoConversationLogger))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn spinner(show: bool) -> ProgressReporter {
    if show {
        ProgressReporter::start("Asking the analyst...")
    } else {
        ProgressReporter::hidden()
    }
}

/// Cancel `token` on Ctrl-C until the returned task is aborted.
fn cancel_on_ctrl_c(token: &CancellationToken) -> tokio::task::JoinHandle<()> {
    let token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    })
}

fn print_outcome(title: &str, outcome: &AnalystOutcome, output: OutputFormat) {
    match output {
        OutputFormat::Text => print!("{}", ConsoleFormatter::format_outcome(title, outcome)),
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_outcome_json(outcome)),
    }
}

async fn run_ask(
    stream: &StreamChatUseCase,
    settings: &AiSettings,
    prompt: &str,
    system: Option<&str>,
    show_progress: bool,
) -> Result<()> {
    let history = ConversationHistory::system_and_user(
        system.unwrap_or(PromptTemplate::default_system()),
        prompt,
    );
    let input = StreamChatInput::from_settings(settings, history)?;

    let cancellation = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(&cancellation);
    let mut progress = spinner(show_progress);
    let mut stdout = std::io::stdout();

    let result = stream
        .execute(
            input,
            |token| {
                progress.clear();
                let _ = write!(stdout, "{}", token);
                let _ = stdout.flush();
            },
            Some(&cancellation),
        )
        .await;
    watcher.abort();
    progress.clear();
    println!();

    result?;
    Ok(())
}

async fn run_report(
    stream: StreamChatUseCase,
    settings: &AiSettings,
    details: &ProtocolDetails,
    output: OutputFormat,
    show_progress: bool,
) {
    let live = output == OutputFormat::Text;
    let cancellation = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(&cancellation);
    let mut progress = spinner(show_progress && live);
    let mut stdout = std::io::stdout();

    let outcome = RiskReportUseCase::new(stream)
        .execute(
            settings,
            details,
            |token, _| {
                if live {
                    progress.clear();
                    let _ = write!(stdout, "{}", token);
                    let _ = stdout.flush();
                }
            },
            Some(&cancellation),
        )
        .await;
    watcher.abort();
    progress.clear();

    match (output, &outcome) {
        (OutputFormat::Text, AnalystOutcome::Generated(_)) => println!(),
        (OutputFormat::Text, AnalystOutcome::Fallback { text, .. }) => {
            println!("\n{}", ConsoleFormatter::notice(text));
        }
        _ => print_outcome("Risk Report", &outcome, output),
    }
}
