use super::*;
use crate::render::MessageView;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use wire::{ChatRequest, ChatResponse, Role};

// =========================================================================
// Mocks
// =========================================================================

fn reply(text: &str) -> ChatResponse {
    ChatResponse {
        response: text.to_owned(),
        conversation_id: None,
        intent: None,
        confidence: None,
        suggested_questions: Vec::new(),
    }
}

/// Returns scripted results in order, then fails.
#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<Vec<Result<ChatResponse, TransportError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Result<ChatResponse, TransportError>>) -> Self {
        Self { replies: Mutex::new(replies), requests: Mutex::new(Vec::new()) }
    }
}

#[async_trait::async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            Err(TransportError::Request("no scripted reply".into()))
        } else {
            replies.remove(0)
        }
    }
}

/// Blocks each request until the test releases it.
#[derive(Default)]
struct Gate {
    calls: AtomicUsize,
    started: Notify,
    release: Notify,
}

struct GatedTransport(Arc<Gate>);

#[async_trait::async_trait]
impl ChatTransport for GatedTransport {
    async fn send_chat(&self, _request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        self.0.started.notify_one();
        self.0.release.notified().await;
        Ok(reply("released"))
    }
}

/// Never resolves.
struct HangingTransport;

#[async_trait::async_trait]
impl ChatTransport for HangingTransport {
    async fn send_chat(&self, _request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        std::future::pending().await
    }
}

struct PanickingTransport;

#[async_trait::async_trait]
impl ChatTransport for PanickingTransport {
    async fn send_chat(&self, _request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        panic!("transport exploded");
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Expanded(bool),
    Focus,
    ClearInput,
    InputEnabled(bool),
    Message(MessageView),
    ShowTyping,
    HideTyping,
    Suggestions(Vec<String>),
}

#[derive(Default)]
struct RecordingSurface {
    calls: Mutex<Vec<Call>>,
}

impl RecordingSurface {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn messages(&self) -> Vec<MessageView> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Message(view) => Some(view),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ChatSurface for RecordingSurface {
    fn set_expanded(&self, expanded: bool) {
        self.record(Call::Expanded(expanded));
    }
    fn focus_input(&self) {
        self.record(Call::Focus);
    }
    fn clear_input(&self) {
        self.record(Call::ClearInput);
    }
    fn set_input_enabled(&self, enabled: bool) {
        self.record(Call::InputEnabled(enabled));
    }
    fn append_message(&self, view: &MessageView) {
        self.record(Call::Message(view.clone()));
    }
    fn show_typing(&self, _view: &TypingIndicatorView) {
        self.record(Call::ShowTyping);
    }
    fn hide_typing(&self) {
        self.record(Call::HideTyping);
    }
    fn show_suggestions(&self, suggestions: &[String]) {
        self.record(Call::Suggestions(suggestions.to_vec()));
    }
}

fn widget<T: ChatTransport>(transport: T) -> ChatWidget<T, RecordingSurface> {
    ChatWidget::with_conversation(
        WidgetConfig::default(),
        Conversation::with_token("conv-test"),
        transport,
        RecordingSurface::default(),
    )
}

fn fallback() -> &'static str {
    WidgetConfig::default().language.strings().fallback_reply
}

// =========================================================================
// submit: success and failure
// =========================================================================

#[tokio::test]
async fn successful_reply_appends_one_assistant_message() {
    let w = widget(ScriptedTransport::new(vec![Ok(reply("hi"))]));
    assert_eq!(w.submit("hello").await, SubmitOutcome::Replied);

    let messages = w.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!((messages[0].role, messages[0].content.as_str()), (Role::User, "hello"));
    assert_eq!((messages[1].role, messages[1].content.as_str()), (Role::Assistant, "hi"));
    assert_eq!(w.phase(), Phase::Idle);
}

#[tokio::test]
async fn request_carries_question_and_token() {
    let transport = ScriptedTransport::new(vec![Ok(reply("ok"))]);
    let w = widget(transport);
    w.submit("  ¿horario?  ").await;
    let requests = w.transport.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].question, "¿horario?");
    assert_eq!(requests[0].conversation_id, "conv-test");
}

#[tokio::test]
async fn network_failure_appends_fallback_and_returns_to_idle() {
    let w = widget(ScriptedTransport::new(vec![Err(TransportError::Request("connection refused".into()))]));
    assert_eq!(w.submit("hello").await, SubmitOutcome::FellBack);

    let messages = w.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, fallback());
    assert_eq!(w.phase(), Phase::Idle);
}

#[tokio::test]
async fn status_and_parse_errors_use_same_fallback() {
    let w = widget(ScriptedTransport::new(vec![
        Err(TransportError::Status { status: 502, body: "bad gateway".into() }),
        Err(TransportError::Parse(wire::WireError::EmptyField("response"))),
    ]));
    w.submit("one").await;
    w.submit("two").await;
    let messages = w.messages();
    assert_eq!(messages[1].content, fallback());
    assert_eq!(messages[3].content, fallback());
    assert!(w.surface().messages().iter().all(|m| !m.text().contains("bad gateway")));
}

#[tokio::test]
async fn blank_submit_is_ignored_without_request() {
    let w = widget(ScriptedTransport::default());
    assert_eq!(w.submit("   ").await, SubmitOutcome::Ignored(Ignored::Empty));
    assert!(w.messages().is_empty());
    assert!(w.transport.requests.lock().unwrap().is_empty());
    assert!(w.surface().calls().is_empty());
}

#[tokio::test]
async fn server_token_is_adopted_for_next_request() {
    let mut first = reply("one");
    first.conversation_id = Some("srv-1".to_owned());
    let w = widget(ScriptedTransport::new(vec![Ok(first), Ok(reply("two"))]));
    w.submit("a").await;
    assert_eq!(w.conversation_token(), "srv-1");
    w.submit("b").await;
    let requests = w.transport.requests.lock().unwrap().clone();
    assert_eq!(requests[1].conversation_id, "srv-1");
}

#[tokio::test]
async fn surface_sees_typing_and_disabled_input_around_request() {
    let w = widget(ScriptedTransport::new(vec![Ok(reply("hi"))]));
    w.submit("hello").await;
    let calls = w.surface().calls();
    let user_view = render_message(&w.messages()[0]);
    let assistant_view = render_message(&w.messages()[1]);
    assert_eq!(
        calls,
        vec![
            Call::Message(user_view),
            Call::ClearInput,
            Call::InputEnabled(false),
            Call::ShowTyping,
            Call::HideTyping,
            Call::Message(assistant_view),
            Call::InputEnabled(true),
            Call::Focus,
        ]
    );
}

#[tokio::test]
async fn server_markup_reaches_surface_escaped() {
    let w = widget(ScriptedTransport::new(vec![Ok(reply("<script>x()</script>\nline two"))]));
    w.submit("hello").await;
    let views = w.surface().messages();
    let html = views[1].html();
    assert!(html.contains("&lt;script&gt;x()&lt;/script&gt;<br>line two"));
    assert!(!html.contains("<script>"));
}

// =========================================================================
// pending slot
// =========================================================================

#[tokio::test]
async fn user_message_is_appended_before_network_completes() {
    let gate = Arc::new(Gate::default());
    let w = widget(GatedTransport(Arc::clone(&gate)));

    let probe = async {
        gate.started.notified().await;
        let messages = w.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(w.phase(), Phase::AwaitingResponse);
        assert!(w.surface().calls().contains(&Call::InputEnabled(false)));
        gate.release.notify_one();
    };

    let (outcome, ()) = tokio::join!(w.submit("hello"), probe);
    assert_eq!(outcome, SubmitOutcome::Replied);
    assert_eq!(w.messages().len(), 2);
}

#[tokio::test]
async fn submit_while_awaiting_is_rejected_not_queued() {
    let gate = Arc::new(Gate::default());
    let w = widget(GatedTransport(Arc::clone(&gate)));
    let other = w.clone();

    let probe = async {
        gate.started.notified().await;
        assert_eq!(other.submit("second").await, SubmitOutcome::Ignored(Ignored::Pending));
        assert_eq!(other.messages().len(), 1);
        gate.release.notify_one();
    };

    let (outcome, ()) = tokio::join!(w.submit("first"), probe);
    assert_eq!(outcome, SubmitOutcome::Replied);
    assert_eq!(gate.calls.load(Ordering::SeqCst), 1);

    let contents: Vec<String> = w.messages().into_iter().map(|m| m.content).collect();
    assert_eq!(contents, vec!["first".to_owned(), "released".to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn hung_request_times_out_to_fallback() {
    let mut config = WidgetConfig::default();
    config.request_timeout_secs = 5;
    let w = ChatWidget::new(config, HangingTransport, RecordingSurface::default());

    assert_eq!(w.submit("hello").await, SubmitOutcome::FellBack);
    assert_eq!(w.phase(), Phase::Idle);
    assert_eq!(w.messages()[1].content, fallback());
}

#[tokio::test(start_paused = true)]
async fn dropped_submit_releases_pending_slot() {
    let w = widget(HangingTransport);
    let cancelled = tokio::time::timeout(Duration::from_secs(1), w.submit("hello")).await;
    assert!(cancelled.is_err());

    assert_eq!(w.phase(), Phase::Idle);
    let messages = w.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, fallback());
    let calls = w.surface().calls();
    assert!(calls.contains(&Call::HideTyping));
    assert_eq!(calls.last(), Some(&Call::Focus));
}

#[tokio::test]
async fn panicking_transport_still_releases_slot() {
    let w = widget(PanickingTransport);
    let task = w.clone();
    let err = tokio::spawn(async move { task.submit("hello").await })
        .await
        .expect_err("task should panic");
    assert!(err.is_panic());
    assert_eq!(w.phase(), Phase::Idle);
    assert_eq!(w.messages().len(), 2);
}

#[tokio::test]
async fn text_rejected_while_pending_is_not_sent_later() {
    let gate = Arc::new(Gate::default());
    let w = widget(GatedTransport(Arc::clone(&gate)));

    let probe = async {
        gate.started.notified().await;
        assert_eq!(w.send_message("rejected").await, SubmitOutcome::Ignored(Ignored::Pending));
        assert_eq!(w.handle_event(WidgetEvent::InputChanged("typed".into())).await, None);
        assert_eq!(w.input(), "");
        gate.release.notify_one();
    };
    let (outcome, ()) = tokio::join!(w.submit("first"), probe);
    assert_eq!(outcome, SubmitOutcome::Replied);

    assert_eq!(w.input(), "");
    assert_eq!(w.handle_event(WidgetEvent::SendClicked).await, Some(SubmitOutcome::Ignored(Ignored::Empty)));
    assert_eq!(gate.calls.load(Ordering::SeqCst), 1);
    let contents: Vec<String> = w.messages().into_iter().map(|m| m.content).collect();
    assert_eq!(contents, vec!["first".to_owned(), "released".to_owned()]);
}

// =========================================================================
// visibility, mount, events
// =========================================================================

#[test]
fn toggle_expands_and_focuses() {
    let w = widget(ScriptedTransport::default());
    assert_eq!(w.toggle(), Visibility::Expanded);
    assert_eq!(w.toggle(), Visibility::Collapsed);
    assert_eq!(w.surface().calls(), vec![Call::Expanded(true), Call::Focus, Call::Expanded(false)]);
    assert!(w.messages().is_empty());
}

#[test]
fn open_and_close_are_idempotent() {
    let w = widget(ScriptedTransport::default());
    w.open();
    w.open();
    w.close();
    w.close();
    assert_eq!(w.surface().calls(), vec![Call::Expanded(true), Call::Focus, Call::Expanded(false)]);
}

#[test]
fn mount_shows_greeting_without_logging_it() {
    let mut config = WidgetConfig::default();
    config.subtitle = "¡Hola!".to_owned();
    config.suggested_questions = vec!["Hours?".to_owned()];
    let w = ChatWidget::new(config, ScriptedTransport::default(), RecordingSurface::default());
    w.mount();

    let views = w.surface().messages();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].text(), "¡Hola!");
    assert!(w.messages().is_empty());
    assert!(w.surface().calls().contains(&Call::Suggestions(vec!["Hours?".to_owned()])));
    assert_eq!(w.visibility(), Visibility::Collapsed);
}

#[test]
fn mount_auto_opens_when_configured() {
    let mut config = WidgetConfig::default();
    config.auto_open = true;
    let w = ChatWidget::new(config, ScriptedTransport::default(), RecordingSurface::default());
    w.mount();
    assert_eq!(w.visibility(), Visibility::Expanded);
}

#[tokio::test]
async fn enter_submits_but_shift_enter_does_not() {
    let w = widget(ScriptedTransport::new(vec![Ok(reply("hi"))]));
    w.handle_event(WidgetEvent::InputChanged("hello".into())).await;

    let shifted = w.handle_event(WidgetEvent::KeyPressed { key: Key::Enter, shift: true }).await;
    assert_eq!(shifted, None);
    assert_eq!(w.input(), "hello");

    let sent = w.handle_event(WidgetEvent::KeyPressed { key: Key::Enter, shift: false }).await;
    assert_eq!(sent, Some(SubmitOutcome::Replied));
    assert_eq!(w.input(), "");
}

#[tokio::test]
async fn send_click_with_empty_input_is_ignored() {
    let w = widget(ScriptedTransport::default());
    let outcome = w.handle_event(WidgetEvent::SendClicked).await;
    assert_eq!(outcome, Some(SubmitOutcome::Ignored(Ignored::Empty)));
}

#[tokio::test]
async fn escape_and_close_click_collapse() {
    let w = widget(ScriptedTransport::default());
    w.open();
    w.handle_event(WidgetEvent::KeyPressed { key: Key::Escape, shift: false }).await;
    assert_eq!(w.visibility(), Visibility::Collapsed);
    w.handle_event(WidgetEvent::ToggleClicked).await;
    w.handle_event(WidgetEvent::CloseClicked).await;
    assert_eq!(w.visibility(), Visibility::Collapsed);
}

#[tokio::test]
async fn suggestion_click_submits_and_reply_suggestions_replace() {
    let mut first = reply("Open 9-5");
    first.suggested_questions = vec!["Weekends?".to_owned()];
    let mut config = WidgetConfig::default();
    config.suggested_questions = vec!["Hours?".to_owned()];
    let w = ChatWidget::new(config, ScriptedTransport::new(vec![Ok(first), Ok(reply("Closed"))]), RecordingSurface::default());

    assert_eq!(w.handle_event(WidgetEvent::SuggestionClicked(3)).await, None);
    assert_eq!(w.handle_event(WidgetEvent::SuggestionClicked(0)).await, Some(SubmitOutcome::Replied));
    assert_eq!(w.messages()[0].content, "Hours?");
    assert!(w.surface().calls().contains(&Call::Suggestions(vec!["Weekends?".to_owned()])));

    w.handle_event(WidgetEvent::SuggestionClicked(0)).await;
    assert_eq!(w.messages()[2].content, "Weekends?");
}

#[tokio::test]
async fn send_message_goes_through_pending_guard() {
    let w = widget(ScriptedTransport::new(vec![Ok(reply("hi"))]));
    assert_eq!(w.send_message("from api").await, SubmitOutcome::Replied);
    assert_eq!(w.messages()[0].content, "from api");
}

#[tokio::test]
async fn history_is_replayed_when_enabled() {
    let mut config = WidgetConfig::default();
    config.send_history = true;
    let w = ChatWidget::new(config, ScriptedTransport::new(vec![Ok(reply("a1")), Ok(reply("a2"))]), RecordingSurface::default());
    w.submit("q1").await;
    w.submit("q2").await;
    let requests = w.transport.requests.lock().unwrap().clone();
    assert_eq!(requests[0].history.as_deref().map(<[_]>::len), Some(0));
    let history = requests[1].history.clone().expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content, "a1");
}

type Hook = Box<dyn Fn() + Send + Sync>;

/// Surface whose drawing calls run a host callback synchronously.
#[derive(Default)]
struct CallbackSurface {
    hook: Mutex<Option<Hook>>,
}

impl CallbackSurface {
    fn fire(&self) {
        if let Some(hook) = self.hook.lock().unwrap().as_ref() {
            hook();
        }
    }
}

impl ChatSurface for CallbackSurface {
    fn set_expanded(&self, _expanded: bool) {
        self.fire();
    }
    fn focus_input(&self) {
        self.fire();
    }
    fn clear_input(&self) {}
    fn set_input_enabled(&self, _enabled: bool) {}
    fn append_message(&self, _view: &MessageView) {
        self.fire();
    }
    fn show_typing(&self, _view: &TypingIndicatorView) {}
    fn hide_typing(&self) {}
    fn show_suggestions(&self, _suggestions: &[String]) {
        self.fire();
    }
}

#[test]
fn mount_lets_surface_read_widget_state() {
    let mut config = WidgetConfig::default();
    config.auto_open = true;
    config.suggested_questions = vec!["Hours?".to_owned()];
    let w = ChatWidget::new(config, ScriptedTransport::default(), CallbackSurface::default());

    let reads = Arc::new(AtomicUsize::new(0));
    let (host, counter) = (w.clone(), Arc::clone(&reads));
    *w.surface().hook.lock().unwrap() = Some(Box::new(move || {
        let _ = (host.input(), host.visibility());
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    w.mount();
    // set_expanded, greeting, suggestions, then open: set_expanded + focus.
    assert_eq!(reads.load(Ordering::SeqCst), 5);
    assert_eq!(w.visibility(), Visibility::Expanded);
}
