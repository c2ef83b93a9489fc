mod common;

use rust_feed_chat::common::{FeedCommand, FeedEvent, NoticeLevel};
use rust_feed_chat::config::AppConfig;
use rust_feed_chat::network::FeedClient;
use rust_feed_chat::ui::{AppState, Screen};
use rust_feed_chat::{Account, ErrorKind};
use tokio::sync::mpsc;

use crate::common::*;

fn worker(h: &Harness) -> FeedClient {
    // Channels are unused when driving handle_command directly.
    let (event_tx, _event_rx) = mpsc::channel(8);
    let (_cmd_tx, cmd_rx) = mpsc::channel(8);
    FeedClient::new(event_tx, cmd_rx, h.backend.clone(), &AppConfig::default())
}

fn sign_up(email: &str, password: &str) -> FeedCommand {
    FeedCommand::SignUp {
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn sign_in(email: &str, password: &str) -> FeedCommand {
    FeedCommand::SignIn {
        email: email.to_string(),
        password: password.to_string(),
    }
}

/// Apply worker events to the UI state, running any follow-up commands they trigger.
async fn drive(client: &mut FeedClient, state: &mut AppState, command: FeedCommand) {
    let mut pending = vec![command];
    while let Some(command) = pending.pop() {
        for event in client.handle_command(command).await {
            pending.extend(state.apply_event(event));
        }
    }
}

#[tokio::test]
async fn sign_up_then_sign_in_lands_on_home() {
    let h = harness();
    let mut client = worker(&h);
    let mut state = AppState::new();

    state.navigate(Screen::SignUp);
    drive(&mut client, &mut state, sign_up("a@x.com", "pw1")).await;

    assert_eq!(state.screen, Screen::SignIn);
    assert_eq!(state.notice().map(|n| n.body.as_str()), Some("User registered!"));
    assert_eq!(h.local.row_count(USERS).unwrap(), 1);
    state.dismiss_notice();

    drive(&mut client, &mut state, sign_in("a@x.com", "pw1")).await;

    assert_eq!(state.screen, Screen::Home);
    assert_eq!(state.notice().map(|n| n.level), Some(NoticeLevel::Success));
    assert_eq!(
        state.current_user.as_ref().map(|u| u.email.as_str()),
        Some("a@x.com")
    );
}

#[tokio::test]
async fn wrong_password_surfaces_auth_message() {
    let h = harness();
    let mut client = worker(&h);
    client.handle_command(sign_up("a@x.com", "pw1")).await;

    let events = client.handle_command(sign_in("a@x.com", "nope")).await;

    match events.as_slice() {
        [FeedEvent::Notice(notice)] => {
            assert_eq!(notice.level, NoticeLevel::Error);
            assert_eq!(notice.body, "Invalid login credentials");
        }
        other => panic!("unexpected events {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_sign_up_is_an_authentication_error() {
    let h = harness();
    let account = Account::new(h.backend.clone(), USERS);
    account.sign_up("a@x.com", "pw1").await.unwrap();

    let err = account.sign_up("a@x.com", "pw2").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(err.to_string(), "User already registered");
    assert_eq!(h.local.row_count(USERS).unwrap(), 1);
}

#[tokio::test]
async fn invalid_email_never_reaches_the_backend() {
    let h = harness();
    let account = Account::new(h.backend.clone(), USERS);

    let err = account.sign_up("not-an-email", "pw1").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(h.store.insert_attempts(), 0);
}

#[tokio::test]
async fn send_from_home_refreshes_the_feed() {
    let h = harness();
    let mut client = worker(&h);
    let mut state = AppState::new();
    drive(&mut client, &mut state, sign_up("a@x.com", "pw1")).await;
    drive(&mut client, &mut state, sign_in("a@x.com", "pw1")).await;

    state.input_text = "hello".to_string();
    let command = state.submit_message().expect("send enabled");
    drive(&mut client, &mut state, command).await;

    assert!(!state.sending);
    assert!(state.input_text.is_empty());
    assert_eq!(state.messages.len(), 1);
    assert_eq!(state.messages[0].content, "hello");
    assert_eq!(state.history().count(), 1);
}

#[tokio::test]
async fn send_after_sign_out_keeps_the_draft() {
    let h = harness();
    let mut client = worker(&h);
    let mut state = AppState::new();
    drive(&mut client, &mut state, sign_up("a@x.com", "pw1")).await;
    drive(&mut client, &mut state, sign_in("a@x.com", "pw1")).await;
    drive(&mut client, &mut state, FeedCommand::SignOut).await;
    while state.notice().is_some() {
        state.dismiss_notice();
    }

    state.input_text = "draft".to_string();
    let command = state.submit_message().expect("send enabled");
    drive(&mut client, &mut state, command).await;

    assert_eq!(state.screen, Screen::SignIn);
    assert_eq!(state.input_text, "draft");
    assert!(!state.sending);
    assert_eq!(
        state.notice().map(|n| n.body.as_str()),
        Some("You need to be signed in to send messages.")
    );
    assert_eq!(h.local.row_count(MESSAGES).unwrap(), 0);
}

#[tokio::test]
async fn blank_send_only_releases_the_button() {
    let h = harness();
    let mut client = worker(&h);
    client.handle_command(sign_up("a@x.com", "pw1")).await;
    client.handle_command(sign_in("a@x.com", "pw1")).await;
    let writes = h.store.insert_attempts();

    let events = client
        .handle_command(FeedCommand::SendMessage("   ".to_string()))
        .await;

    assert_eq!(events, vec![FeedEvent::MessageIgnored]);
    assert_eq!(h.store.insert_attempts(), writes);
}

#[tokio::test]
async fn worker_answers_over_channels_in_order() {
    let h = harness();
    let (event_tx, mut event_rx) = mpsc::channel(16);
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let handle = tokio::spawn(
        FeedClient::new(event_tx, cmd_rx, h.backend.clone(), &AppConfig::default()).run(),
    );

    cmd_tx.send(sign_up("a@x.com", "pw1")).await.unwrap();
    cmd_tx.send(sign_in("a@x.com", "pw1")).await.unwrap();
    cmd_tx.send(FeedCommand::Refresh).await.unwrap();
    drop(cmd_tx);

    let mut events = Vec::new();
    while let Some(event) = event_rx.recv().await {
        events.push(event);
    }
    handle.await.unwrap();

    assert!(matches!(events[1], FeedEvent::SignedUp(_)));
    assert!(matches!(events[3], FeedEvent::SignedIn(_)));
    assert_eq!(events.last(), Some(&FeedEvent::MessagesLoaded(Vec::new())));
}
