//! `chatwidget` command line: terminal host for the chat widget and search
//! overlay, plus a stub backend to point them at.

mod stub;
mod terminal;

use clap::{Parser, Subcommand};
use tracing::Level;
use widget::{
    ChatWidget, DocType, HttpTransport, Language, SearchConfig, SearchFilters, SearchOutcome, SearchOverlay,
    TransportError, WidgetConfig,
};
use wire::SortBy;

use crate::terminal::TerminalSurface;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("search failed")]
    SearchFailed,
    #[error("backend unhealthy: status {0}")]
    Unhealthy(String),
}

#[derive(Parser, Debug)]
#[command(name = "chatwidget", about = "Chat widget and document search from the terminal")]
struct Cli {
    /// Emit per-request debug diagnostics.
    #[arg(long, global = true, env = "WIDGET_DEBUG")]
    debug: bool,

    /// Override the configured endpoint.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// `en` or `es`.
    #[arg(long, global = true, value_parser = parse_language)]
    language: Option<Language>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat. `:toggle`, `:open`, `:close`, `:N` asks suggestion N, `:quit` exits.
    Chat,
    /// Run one search and print the results.
    Search {
        query: String,
        #[arg(long, value_parser = parse_doc_type)]
        doc_type: Option<DocType>,
        #[arg(long, value_parser = parse_sort_by, default_value = "relevance")]
        sort_by: SortBy,
    },
    /// Check the chat backend's health endpoint.
    Health,
    /// Serve the stub backend.
    Serve {
        #[arg(long, env = "PORT", default_value_t = 8000)]
        port: u16,
    },
}

fn parse_language(raw: &str) -> Result<Language, String> {
    Language::parse(raw).ok_or_else(|| format!("unsupported language `{raw}`"))
}

fn parse_doc_type(raw: &str) -> Result<DocType, String> {
    DocType::parse(raw).ok_or_else(|| format!("unknown document type `{raw}`; expected pdf, docx, html or txt"))
}

fn parse_sort_by(raw: &str) -> Result<SortBy, String> {
    SortBy::parse(raw).ok_or_else(|| format!("unknown sort `{raw}`; expected relevance, date or title"))
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    match cli.command {
        Command::Chat => {
            let config = chat_config(cli.api_url.as_deref(), cli.language, cli.debug);
            let transport = HttpTransport::new(config.api_url.clone(), config.request_timeout())?;
            let widget = ChatWidget::new(config, transport, TerminalSurface::new(std::io::stdout()));
            terminal::run_chat(&widget, tokio::io::BufReader::new(tokio::io::stdin())).await?;
        }
        Command::Search { ref query, doc_type, sort_by } => {
            let mut config = SearchConfig::from_env();
            if let Some(url) = &cli.api_url {
                config.api_url.clone_from(url);
            }
            if let Some(language) = cli.language {
                config.language = language;
            }
            config.debug |= cli.debug;
            let transport = HttpTransport::new(config.api_url.clone(), config.request_timeout())?;
            let overlay = SearchOverlay::new(config, transport, TerminalSurface::new(std::io::stdout()));
            if overlay.search(query, SearchFilters { doc_type, sort_by }).await == SearchOutcome::Failed {
                return Err(CliError::SearchFailed);
            }
        }
        Command::Health => {
            let config = chat_config(cli.api_url.as_deref(), cli.language, cli.debug);
            let transport = HttpTransport::new(config.api_url.clone(), config.request_timeout())?;
            let health = transport.health().await?;
            println!("{} {}", health.status, health.service.as_deref().unwrap_or_default());
            if health.status != "ok" {
                return Err(CliError::Unhealthy(health.status));
            }
        }
        Command::Serve { port } => {
            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
            tracing::info!(%port, "stub backend listening");
            axum::serve(listener, stub::router()).await?;
        }
    }
    Ok(())
}

fn chat_config(api_url: Option<&str>, language: Option<Language>, debug: bool) -> WidgetConfig {
    let mut config = WidgetConfig::from_env();
    if let Some(url) = api_url {
        url.clone_into(&mut config.api_url);
    }
    if let Some(language) = language {
        config.language = language;
    }
    config.debug |= debug;
    config
}
