//! End-to-end dispatch scenarios against a recording channel.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use switchyard_core::{
    ChannelError, InMemoryKeyValueStore, InlineButton, InlineKeyboard, StoreError, Update, User,
};
use switchyard_framework::{
    AllowList, AuthorizationGate, DispatchError, DispatchOutcome, Dispatcher, DropReason,
    HandlerGroup, InputFile, RegistryBuilder, RegistryError, Reply, RequestContext, RouteRegistry,
};

use common::{RecordingChannel, Sent, TrackedStream, is_closed};

// ============================================================================
// Phone keypad
// ============================================================================

const PHONE_PREFIX: &str = "Phone:";
const PHONE_LIMIT: i64 = 999_999_9999;

fn format_phone(value: i64) -> String {
    if value <= 0 {
        return "+_ (___) ___-____".to_string();
    }
    let digits = format!("{value:_<11}");
    format!(
        "+{} ({}) {}-{}",
        &digits[0..1],
        &digits[1..4],
        &digits[4..7],
        &digits[7..11]
    )
}

fn phone_keyboard(show_digits: bool) -> InlineKeyboard {
    let mut buttons: Vec<InlineButton> = Vec::new();
    if show_digits {
        buttons.extend((0..=9).map(|d| InlineButton::new(d.to_string(), format!("/phone/{d}"))));
    }
    buttons.push(InlineButton::new("<", "/phone/delete"));
    InlineKeyboard::new(buttons.chunks(3).map(<[InlineButton]>::to_vec).collect())
}

async fn show_phone(ctx: Arc<RequestContext>) -> Result<Reply, String> {
    let state = ctx.state().map_err(|e| e.to_string())?;
    let value: i64 = state.get(&state.user_key(PHONE_PREFIX)).await.map_err(|e| e.to_string())?;
    Reply::inline(format_phone(value), phone_keyboard(value < PHONE_LIMIT)).map_err(|e| e.to_string())
}

async fn add_digit(ctx: Arc<RequestContext>, digit: i32) -> Result<Reply, StoreError> {
    if !(0..=9).contains(&digit) {
        return Ok(Reply::text("Please enter a valid digit (0-9)."));
    }
    let state = ctx.state()?;
    let key = state.user_key(PHONE_PREFIX);
    let value: i64 = state.get(&key).await?;
    if value > PHONE_LIMIT {
        return Ok(Reply::empty());
    }
    let value = value * 10 + i64::from(digit);
    state.set(&key, value).await?;
    let message_id = ctx.source_message_id().unwrap_or_default();
    Ok(Reply::text_edit_with_keyboard(
        format_phone(value),
        message_id,
        phone_keyboard(value < PHONE_LIMIT),
    ))
}

async fn delete_digit(ctx: Arc<RequestContext>) -> Result<Reply, StoreError> {
    let state = ctx.state()?;
    let key = state.user_key(PHONE_PREFIX);
    let value: i64 = state.get(&key).await?;
    if value == 0 {
        return Ok(Reply::empty());
    }
    state.set(&key, value / 10).await?;
    Ok(Reply::text(format_phone(value / 10)))
}

fn phone_registry() -> RouteRegistry {
    RegistryBuilder::new()
        .group(
            HandlerGroup::new("phone")
                .text_command("/phone", show_phone)
                .inline("/phone/{digit}", add_digit)
                .inline("/phone/delete", delete_digit),
        )
        .build()
        .unwrap()
}

fn with_store(registry: RouteRegistry, channel: Arc<RecordingChannel>) -> Dispatcher {
    Dispatcher::new(Arc::new(registry), channel).with_store(Arc::new(InMemoryKeyValueStore::new()))
}

#[test]
fn test_format_phone() {
    assert_eq!(format_phone(0), "+_ (___) ___-____");
    assert_eq!(format_phone(7), "+7 (___) ___-____");
    assert_eq!(format_phone(79_991_234_567), "+7 (999) 123-4567");
}

#[tokio::test]
async fn test_phone_stops_after_eleven_digits() {
    let channel = RecordingChannel::new();
    let dispatcher = with_store(phone_registry(), channel.clone());
    let user = User::with_id(5);

    for (i, digit) in "79991234567".chars().enumerate() {
        let update = Update::callback(i as i64, user.clone(), 5, 100, &format!("/phone/{digit}"));
        let outcome = dispatcher.dispatch(&update).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Succeeded);
    }
    assert_eq!(channel.texts().last().map(String::as_str), Some("+7 (999) 123-4567"));

    let Some(Sent::EditText { keyboard: Some(keyboard), .. }) = channel.sent().last().cloned() else {
        panic!("expected a keyboard edit");
    };
    assert_eq!(keyboard.button_count(), 1);

    let edits_before = channel.sent().len();
    let update = Update::callback(99, user.clone(), 5, 100, "/phone/8");
    assert_eq!(dispatcher.dispatch(&update).await.unwrap(), DispatchOutcome::Succeeded);
    assert_eq!(channel.sent().len(), edits_before);

    let update = Update::text(100, user, 5, 101, "/phone");
    dispatcher.dispatch(&update).await.unwrap();
    assert_eq!(channel.texts().last().map(String::as_str), Some("+7 (999) 123-4567"));
}

#[tokio::test]
async fn test_phone_literal_segment_beats_placeholder() {
    let channel = RecordingChannel::new();
    let dispatcher = with_store(phone_registry(), channel.clone());
    let user = User::with_id(6);

    for data in ["/phone/4", "/phone/2", "/phone/delete"] {
        dispatcher
            .dispatch(&Update::callback(1, user.clone(), 6, 1, data))
            .await
            .unwrap();
    }
    assert_eq!(channel.texts().last().map(String::as_str), Some("+4 (___) ___-____"));
}

#[tokio::test]
async fn test_non_numeric_segment_is_no_match() {
    let channel = RecordingChannel::new();
    let dispatcher = with_store(phone_registry(), channel.clone());

    let update = Update::callback(1, User::with_id(1), 1, 1, "/phone/x");
    let outcome = dispatcher.dispatch(&update).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Dropped(DropReason::NoMatch));
    assert!(channel.sent().is_empty());
}

// ============================================================================
// Commands
// ============================================================================

async fn counter(_ctx: Arc<RequestContext>) -> Reply {
    Reply::text("Counter: 0")
}

async fn mail(
    ctx: Arc<RequestContext>,
    name: String,
    address: String,
    subject: String,
    body: String,
) -> Result<Reply, ChannelError> {
    ctx.channel()
        .send_text(
            999,
            &format!("{name} <{address}>: {subject}"),
            Default::default(),
        )
        .await?;
    Ok(Reply::text(body))
}

#[tokio::test]
async fn test_extra_argument_does_not_match_zero_arity_command() {
    let registry = RegistryBuilder::new()
        .group(HandlerGroup::new("counter").text_command("/counter", counter))
        .build()
        .unwrap();
    let channel = RecordingChannel::new();
    let dispatcher = Dispatcher::new(Arc::new(registry), channel.clone());

    let update = Update::text(1, User::with_id(1), 1, 1, "/counter extra");
    let outcome = dispatcher.dispatch(&update).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Dropped(DropReason::NoMatch));

    let update = Update::text(2, User::with_id(1), 1, 1, "/counter");
    assert_eq!(dispatcher.dispatch(&update).await.unwrap(), DispatchOutcome::Succeeded);
}

#[tokio::test]
async fn test_quoted_arguments_and_second_party_notification() {
    let registry = RegistryBuilder::new()
        .group(HandlerGroup::new("mail").text_command("/mail", mail))
        .build()
        .unwrap();
    let channel = RecordingChannel::new();
    let dispatcher = Dispatcher::new(Arc::new(registry), channel.clone());

    let update = Update::text(
        1,
        User::with_id(1),
        1,
        1,
        r#"/mail Vadik user@example.com Test "Hello there""#,
    );
    dispatcher.dispatch(&update).await.unwrap();
    assert_eq!(
        channel.texts(),
        vec!["Vadik <user@example.com>: Test", "Hello there"]
    );
}

#[tokio::test]
async fn test_ambiguous_command_invokes_nothing() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    async fn start_number(_ctx: Arc<RequestContext>, _n: i64) -> Reply {
        CALLS.fetch_add(1, Ordering::SeqCst);
        Reply::empty()
    }
    async fn start_text(_ctx: Arc<RequestContext>, _s: String) -> Reply {
        CALLS.fetch_add(1, Ordering::SeqCst);
        Reply::empty()
    }

    let registry = RegistryBuilder::new()
        .group(
            HandlerGroup::new("start")
                .text_command("/start", start_number)
                .text_command("/start", start_text),
        )
        .build()
        .unwrap();
    let dispatcher = Dispatcher::new(Arc::new(registry), RecordingChannel::new());

    let update = Update::text(1, User::with_id(1), 1, 1, "/start 5");
    let err = dispatcher.dispatch(&update).await.unwrap_err();
    let DispatchError::AmbiguousRoute { candidates, .. } = err else {
        panic!("expected an ambiguous route");
    };
    assert_eq!(
        candidates,
        vec!["start::start_number(long)", "start::start_text(string)"]
    );
    assert_eq!(CALLS.load(Ordering::SeqCst), 0);
}

#[test]
fn test_identical_commands_rejected_at_build() {
    let err = RegistryBuilder::new()
        .group(HandlerGroup::new("a").text_command("/start", counter))
        .group(HandlerGroup::new("b").text_command("/start", counter))
        .build()
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateRoute { .. }));
}

#[tokio::test]
async fn test_overlapping_queries_are_ambiguous() {
    async fn hello(_ctx: Arc<RequestContext>, text: String) -> Reply {
        Reply::text(format!("hello handler: {text}"))
    }
    async fn anything(_ctx: Arc<RequestContext>) -> Reply {
        Reply::text("catch-all")
    }

    let registry = RegistryBuilder::new()
        .group(
            HandlerGroup::new("query")
                .text_query(".+hello.+", hello)
                .any_text(anything),
        )
        .build()
        .unwrap();
    let channel = RecordingChannel::new();
    let dispatcher = Dispatcher::new(Arc::new(registry), channel.clone());

    let update = Update::text(1, User::with_id(1), 1, 1, "well hello there");
    let err = dispatcher.dispatch(&update).await.unwrap_err();
    assert!(matches!(err, DispatchError::AmbiguousRoute { .. }));
    assert!(channel.sent().is_empty());

    let update = Update::text(2, User::with_id(1), 1, 1, "something else");
    dispatcher.dispatch(&update).await.unwrap();
    assert_eq!(channel.texts(), vec!["catch-all"]);
}

// ============================================================================
// Authorization
// ============================================================================

#[tokio::test]
async fn test_denied_user_gets_policy_reply_and_handler_never_runs() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);
    async fn secret(_ctx: Arc<RequestContext>) -> Reply {
        CALLS.fetch_add(1, Ordering::SeqCst);
        Reply::text("secret")
    }

    let registry = RegistryBuilder::new()
        .group(HandlerGroup::new("admin").authorize().text_command("/secret", secret))
        .build()
        .unwrap();
    let channel = RecordingChannel::new();
    let dispatcher = Dispatcher::new(Arc::new(registry), channel.clone())
        .with_gate(AuthorizationGate::with_policy(AllowList::new([1234567890])));

    let update = Update::text(1, User::with_id(42), 42, 1, "/secret");
    let outcome = dispatcher.dispatch(&update).await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Unauthorized);
    assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    assert_eq!(
        channel.texts(),
        vec!["You are not authorized to use this bot."]
    );

    let update = Update::text(2, User::with_id(1234567890), 1, 1, "/secret");
    assert_eq!(dispatcher.dispatch(&update).await.unwrap(), DispatchOutcome::Succeeded);
    assert_eq!(CALLS.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Rendering
// ============================================================================

#[tokio::test]
async fn test_empty_reply_makes_no_calls() {
    let channel = RecordingChannel::new();
    Reply::empty().render(channel.as_ref(), 1).await.unwrap();
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn test_multi_renders_in_order() {
    let channel = RecordingChannel::new();
    let reply = Reply::multi(vec![Reply::text("a"), Reply::delete(5)]).unwrap();
    reply.render(channel.as_ref(), 1).await.unwrap();

    let sent = channel.sent();
    assert_eq!(sent.len(), 2);
    assert!(matches!(&sent[0], Sent::Text { text, .. } if text == "a"));
    assert_eq!(sent[1], Sent::Delete { message_id: 5 });
}

#[tokio::test]
async fn test_multi_stops_at_first_failure() {
    let channel = RecordingChannel::new();
    channel.fail_text(ChannelError::Other("rate limited".into()));
    let reply = Reply::multi(vec![Reply::text("a"), Reply::delete(5)]).unwrap();

    assert!(reply.render(channel.as_ref(), 1).await.is_err());
    assert!(channel.sent().is_empty());
}

#[tokio::test]
async fn test_delete_failure_does_not_fault_request() {
    let channel = RecordingChannel::new();
    channel.fail_delete(ChannelError::MessageNotFound {
        chat_id: 1,
        message_id: 5,
    });
    let reply = Reply::multi(vec![Reply::delete(5), Reply::text("after")]).unwrap();
    reply.render(channel.as_ref(), 1).await.unwrap();
    assert_eq!(channel.texts(), vec!["after"]);
}

#[tokio::test]
async fn test_owned_stream_released_when_upload_fails() {
    let channel = RecordingChannel::new();
    channel.fail_upload(ChannelError::Other("upload rejected".into()));

    let (stream, closed) = TrackedStream::new(b"report");
    let reply = Reply::file(InputFile::owned(stream), "report.txt");
    assert!(!is_closed(&closed));

    assert!(reply.render(channel.as_ref(), 1).await.is_err());
    assert!(is_closed(&closed));
}

#[tokio::test]
async fn test_owned_stream_released_after_success() {
    let channel = RecordingChannel::new();
    let (stream, closed) = TrackedStream::new(b"png");
    let reply = Reply::image(InputFile::owned(stream), "cat.png", "a cat");

    reply.render(channel.as_ref(), 1).await.unwrap();
    assert!(is_closed(&closed));
    assert_eq!(
        channel.sent(),
        vec![Sent::Photo {
            filename: "cat.png".into(),
            caption: "a cat".into()
        }]
    );
}

#[tokio::test]
async fn test_shared_stream_outlives_render() {
    let channel = RecordingChannel::new();
    let (stream, closed) = TrackedStream::new(b"shared");
    let boxed: Box<switchyard_core::ByteStream> = Box::new(stream);
    let shared = Arc::new(tokio::sync::Mutex::new(boxed));

    Reply::file(InputFile::shared(Arc::clone(&shared)), "shared.bin")
        .render(channel.as_ref(), 1)
        .await
        .unwrap();
    assert!(!is_closed(&closed));

    drop(shared);
    assert!(is_closed(&closed));
}

#[tokio::test]
async fn test_path_file_is_uploaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"hello").unwrap();

    let channel = RecordingChannel::new();
    Reply::file_from_path(&path)
        .render(channel.as_ref(), 1)
        .await
        .unwrap();
    assert_eq!(
        channel.sent(),
        vec![Sent::Document {
            filename: "notes.txt".into()
        }]
    );
}

#[tokio::test]
async fn test_missing_path_is_a_render_error() {
    let dir = tempfile::tempdir().unwrap();
    let channel = RecordingChannel::new();
    let err = Reply::file_from_path(dir.path().join("missing.txt"))
        .render(channel.as_ref(), 1)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("I/O error"));
}
