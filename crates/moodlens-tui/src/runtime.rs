use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::sync::mpsc;

use moodlens_core::auth::{self, AuthClient, Session};
use moodlens_core::error::CoreError;
use moodlens_core::feed::{FeedEvent, FeedSubscriber};
use moodlens_core::firestore::FirestoreClient;
use moodlens_core::models::UserProfile;

use crate::input::{handle_key, Action};
use crate::ui::{self, App, Tui, View};

type AuthOutcome = Result<(Session, UserProfile), String>;

pub(crate) async fn run_app(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut event_stream = EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));

    let (auth_tx, mut auth_rx) = mpsc::unbounded_channel::<AuthOutcome>();

    // The feed channel is replaced on sign-out, so an event queued by a
    // previous session's subscriber can never reach the next one. The sender
    // also keeps the receiver pending while logged out.
    let (mut feed_tx, mut feed_rx) = mpsc::unbounded_channel::<FeedEvent>();
    let mut feed: Option<FeedSubscriber> = None;

    while app.running {
        terminal.draw(|f| ui::render(f, app))?;

        tokio::select! {
            maybe_event = event_stream.next() => {
                if let Some(Ok(Event::Key(key))) = maybe_event {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        app.quit();
                        continue;
                    }
                    match handle_key(app, key) {
                        Some(Action::SubmitLogin) => submit_login(app, auth_tx.clone()),
                        Some(Action::Resubscribe) => {
                            if let Some(subscriber) = feed.as_mut() {
                                subscriber.subscribe(app.subscription_range());
                            }
                        }
                        Some(Action::Logout) => {
                            // Dropping the subscriber releases its poll task.
                            feed = None;
                            let (new_tx, new_rx) = mpsc::unbounded_channel();
                            feed_tx = new_tx;
                            feed_rx = new_rx;
                            app.sign_out();
                        }
                        None => {}
                    }
                }
            }

            Some(outcome) = auth_rx.recv() => {
                match outcome {
                    Ok((session, profile)) => {
                        let store = FirestoreClient::new(&app.config).with_token(&session.id_token);
                        let mut subscriber = FeedSubscriber::new(
                            Arc::new(store),
                            app.config.poll_interval(),
                            feed_tx.clone(),
                        );
                        app.complete_login(session, profile);
                        subscriber.subscribe(app.subscription_range());
                        feed = Some(subscriber);
                    }
                    Err(message) => {
                        tracing::warn!("sign-in failed: {message}");
                        app.login.fail(message);
                    }
                }
            }

            Some(event) = feed_rx.recv() => {
                // Only events from the live subscription's current generation
                // may touch state; late arrivals from a superseded range are
                // dropped here.
                let accepted = feed.as_ref().is_some_and(|s| s.accepts(&event));
                if accepted {
                    match event {
                        FeedEvent::Snapshot { records, .. } => app.apply_snapshot(records),
                        FeedEvent::Unavailable { message, .. } => app.set_unavailable(message),
                    }
                } else {
                    tracing::debug!(generation = event.generation(), "dropped stale feed event");
                }
            }

            _ = tick_interval.tick() => {
                // Redraw tick; keeps relative timestamps fresh.
            }
        }
    }

    Ok(())
}

/// Run sign-in and the profile bootstrap off the UI loop; the outcome comes
/// back through the auth channel.
fn submit_login(app: &mut App, auth_tx: mpsc::UnboundedSender<AuthOutcome>) {
    if app.view != View::Login || app.login.busy {
        return;
    }
    let email = app.login.email.trim().to_string();
    let password = app.login.password.clone();
    if email.is_empty() || password.is_empty() {
        app.login.error = Some("Enter email and password".to_string());
        return;
    }
    app.login.busy = true;
    app.login.error = None;

    let config = app.config.clone();
    tokio::spawn(async move {
        let outcome = async {
            let auth_client = AuthClient::new(&config);
            let session = auth_client.sign_in(&email, &password).await?;
            let store = FirestoreClient::new(&config).with_token(&session.id_token);
            let profile = auth::ensure_profile(&store, &session).await?;
            Ok::<_, CoreError>((session, profile))
        }
        .await;
        let _ = auth_tx.send(outcome.map_err(|e| e.brief()));
    });
}
