//! Inbound chat events and menu flow.
//!
//! Thin routing layer between the transport's inbound events and the
//! coordinator. Link handling is spawned as its own task so one user's
//! download never blocks another user's menu navigation or the sweeper.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::coordinator::Coordinator;
use crate::error::JobError;
use crate::messages;
use crate::session::UserId;
use crate::transport::{best_effort, Transport};

/// Inline-keyboard actions the menu offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    BeginDownload,
    Back,
    Help,
    About,
    Again,
}

/// One inbound event from the chat transport.
#[derive(Debug, Clone)]
pub enum Event {
    /// The user opened the chat (e.g. /start).
    Start,
    Button(ButtonAction),
    Text(String),
}

/// Route one event. Menu actions are answered inline; a text submission is
/// dispatched as an independent job task, whose handle is returned so the
/// caller (or a test) can await the terminal outcome.
pub async fn handle_event<T>(
    coordinator: &Arc<Coordinator>,
    transport: &Arc<T>,
    user: UserId,
    event: Event,
) -> Option<JoinHandle<Result<(), JobError>>>
where
    T: Transport + 'static,
{
    match event {
        Event::Start | Event::Button(ButtonAction::Back) => {
            send(transport, user, messages::WELCOME).await;
            None
        }
        Event::Button(ButtonAction::Help) => {
            send(transport, user, messages::HOW_TO).await;
            None
        }
        Event::Button(ButtonAction::About) => {
            send(transport, user, messages::ABOUT).await;
            None
        }
        Event::Button(ButtonAction::BeginDownload) | Event::Button(ButtonAction::Again) => {
            coordinator.sessions().begin_intent(user);
            send(transport, user, messages::SEND_LINK).await;
            None
        }
        Event::Text(text) => {
            let coordinator = Arc::clone(coordinator);
            let transport = Arc::clone(transport);
            Some(tokio::spawn(async move {
                coordinator.handle_link(user, &text, transport.as_ref()).await
            }))
        }
    }
}

async fn send<T: Transport>(transport: &Arc<T>, user: UserId, text: &str) {
    best_effort(
        "send menu message",
        transport.send_text(user, text).await.map(|_| ()),
    );
}
