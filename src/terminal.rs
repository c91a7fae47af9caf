//! Terminal host for the chat widget and search overlay.
//!
//! SYSTEM CONTEXT
//! ==============
//! Stands in for the browser shim: lines read from stdin become widget
//! events and the surface traits print to any `Write`. Highlighted search
//! terms are shown in bold with ANSI escapes.
//!
//! The chat loop keeps at most one submit future in flight and polls it
//! ahead of the next input line, so a line typed while a reply is pending
//! hits the widget's pending guard instead of queueing.

use std::future::Future;
use std::io::Write;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use widget::render::{MessageView, ResultView, Span, TypingIndicatorView};
use widget::state::Ignored;
use widget::{ChatSurface, ChatTransport, ChatWidget, Notice, SearchSurface, SubmitOutcome, WidgetEvent};
use wire::Role;

#[cfg(test)]
#[path = "terminal_test.rs"]
mod terminal_test;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// One line of terminal input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminalCommand {
    Quit,
    Toggle,
    Open,
    Close,
    /// `:N` asks suggestion N, counted from 1.
    Suggestion(usize),
    /// Anything that is not a command is sent as a chat message.
    Say(String),
    Unknown(String),
}

impl TerminalCommand {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let Some(command) = line.trim().strip_prefix(':') else {
            return Self::Say(line.to_owned());
        };
        match command {
            "quit" | "q" => Self::Quit,
            "toggle" => Self::Toggle,
            "open" => Self::Open,
            "close" => Self::Close,
            other => match other.parse::<usize>() {
                Ok(n) if n > 0 => Self::Suggestion(n - 1),
                _ => Self::Unknown(other.to_owned()),
            },
        }
    }
}

/// Prints widget output as plain text.
pub struct TerminalSurface<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    fn emit(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{text}").and_then(|()| out.flush()) {
            tracing::warn!(error = %e, "terminal write failed");
        }
    }
}

impl<W: Write + Send> ChatSurface for TerminalSurface<W> {
    fn set_expanded(&self, expanded: bool) {
        self.emit(if expanded { "[chat opened]" } else { "[chat closed]" });
    }

    fn focus_input(&self) {}

    fn clear_input(&self) {}

    fn set_input_enabled(&self, _enabled: bool) {}

    fn append_message(&self, view: &MessageView) {
        self.emit(&format_message(view));
    }

    fn show_typing(&self, _view: &TypingIndicatorView) {
        self.emit("bot is typing...");
    }

    fn hide_typing(&self) {}

    fn show_suggestions(&self, suggestions: &[String]) {
        for (i, suggestion) in suggestions.iter().enumerate() {
            self.emit(&format!("  :{} {suggestion}", i + 1));
        }
    }
}

impl<W: Write + Send> SearchSurface for TerminalSurface<W> {
    fn set_visible(&self, _visible: bool) {}

    fn focus_input(&self) {}

    fn show_loading(&self, text: &str) {
        self.emit(text);
    }

    fn show_notice(&self, notice: Notice, text: &str) {
        match notice {
            Notice::Error => self.emit(&format!("error: {text}")),
            Notice::Prompt | Notice::NoResults => self.emit(text),
        }
    }

    fn show_results(&self, results: &[ResultView]) {
        for view in results {
            self.emit(&format_result(view));
        }
    }
}

/// `you> ...` / `bot> ...`, continuation lines indented to match.
#[must_use]
pub fn format_message(view: &MessageView) -> String {
    let prefix = match view.role {
        Role::User => "you> ",
        Role::Assistant => "bot> ",
    };
    let indent = " ".repeat(prefix.len());
    view.lines
        .iter()
        .enumerate()
        .map(|(i, line)| if i == 0 { format!("{prefix}{line}") } else { format!("{indent}{line}") })
        .collect::<Vec<_>>()
        .join("\n")
}

#[must_use]
pub fn format_result(view: &ResultView) -> String {
    let mut meta = view.score_label.clone();
    if let Some(page) = &view.page_label {
        meta.push_str(" · ");
        meta.push_str(page);
    }
    format!(
        "{icon} {title} ({source})\n    {excerpt}\n    {meta}",
        icon = view.icon,
        title = bold_spans(&view.title),
        source = view.source_label,
        excerpt = bold_spans(&view.excerpt),
    )
}

fn bold_spans(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|span| if span.highlighted { format!("{BOLD}{}{RESET}", span.text) } else { span.text.clone() })
        .collect()
}

// =============================================================================
// CHAT LOOP
// =============================================================================

type Submit = Pin<Box<dyn Future<Output = SubmitOutcome> + Send>>;

/// Drive `widget` from `input` until `:quit` or end of input. A submit still
/// in flight when the loop ends is awaited before returning.
///
/// # Errors
///
/// Returns an I/O error if reading `input` fails.
pub async fn run_chat<R, T, S>(widget: &ChatWidget<T, S>, input: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    T: ChatTransport + 'static,
    S: ChatSurface + 'static,
{
    widget.mount();
    let mut lines = input.lines();
    let mut in_flight: Option<Submit> = None;

    loop {
        tokio::select! {
            biased;

            outcome = async {
                match in_flight.as_mut() {
                    Some(submit) => submit.await,
                    None => std::future::pending().await,
                }
            }, if in_flight.is_some() => {
                in_flight = None;
                tracing::debug!(?outcome, "submit finished");
            }

            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match TerminalCommand::parse(&line) {
                    TerminalCommand::Quit => break,
                    TerminalCommand::Toggle => {
                        widget.toggle();
                    }
                    TerminalCommand::Open => widget.open(),
                    TerminalCommand::Close => widget.close(),
                    TerminalCommand::Suggestion(index) => {
                        in_flight = dispatch(widget, in_flight, WidgetEvent::SuggestionClicked(index)).await;
                    }
                    TerminalCommand::Say(text) => {
                        in_flight = dispatch(widget, in_flight, WidgetEvent::InputChanged(text)).await;
                    }
                    TerminalCommand::Unknown(command) => {
                        tracing::warn!(%command, "unknown command; try :toggle, :open, :close, :quit or :N");
                    }
                }
            }
        }
    }

    if let Some(submit) = in_flight {
        submit.await;
    }
    Ok(())
}

/// Start a submit for `event`, or run it inline against the pending guard
/// when one is already in flight.
async fn dispatch<T, S>(widget: &ChatWidget<T, S>, in_flight: Option<Submit>, event: WidgetEvent) -> Option<Submit>
where
    T: ChatTransport + 'static,
    S: ChatSurface + 'static,
{
    let event = match event {
        WidgetEvent::InputChanged(text) => {
            widget.set_input(text);
            WidgetEvent::SendClicked
        }
        other => other,
    };

    if in_flight.is_some() {
        if let Some(SubmitOutcome::Ignored(Ignored::Pending)) = widget.handle_event(event).await {
            tracing::info!("still waiting for the previous reply");
        }
        return in_flight;
    }

    let widget = widget.clone();
    Some(Box::pin(async move { widget.handle_event(event).await.unwrap_or(SubmitOutcome::Ignored(Ignored::Empty)) }))
}
