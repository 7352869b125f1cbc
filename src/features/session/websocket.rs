use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    features::{
        favorites::repository::toggle_like,
        listings::{
            models::Listing,
            repository::{delete_listing, set_active},
        },
        session::{
            messages::{ClientMessage, ServerMessage},
            view::SessionView,
        },
        users::{models::User, repository::ensure_profile},
    },
    services::store::Subscription,
    utilities::{
        app_state::AppState,
        errors::AppError,
        jwt::{Principal, Session},
    },
};

enum SessionEvent {
    User(Option<User>),
    OwnerListings(Vec<Listing>),
    PremiumChanged,
    Client(ClientMessage),
    Malformed(String),
    Closed,
}

pub async fn session_handler(
    ws: WebSocketUpgrade,
    session: Session,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, session.0, state))
}

async fn send(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), AppError> {
    let json = serde_json::to_string(message)?;
    sender
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))
}

async fn subscribe(
    state: &AppState,
    principal: &Principal,
    events: &mpsc::UnboundedSender<SessionEvent>,
) -> Result<Vec<Subscription>, AppError> {
    ensure_profile(state.store.as_ref(), Some(principal)).await?;

    let user_events = events.clone();
    let user = state
        .store
        .subscribe_user(
            &principal.uid,
            Arc::new(move |user| {
                let _ = user_events.send(SessionEvent::User(user));
            }),
        )
        .await?;

    let listing_events = events.clone();
    let listings = state
        .store
        .subscribe_owner_listings(
            &principal.uid,
            Arc::new(move |listings| {
                let _ = listing_events.send(SessionEvent::OwnerListings(listings));
            }),
        )
        .await?;

    Ok(vec![user, listings])
}

async fn perform(
    state: &AppState,
    principal: &Principal,
    action: &ClientMessage,
) -> Result<(), AppError> {
    let store = state.store.as_ref();
    match *action {
        ClientMessage::ToggleLike { listing_id } => {
            toggle_like(store, Some(principal), listing_id).await?;
        }
        ClientMessage::SetActive { listing_id, active } => {
            set_active(store, Some(principal), listing_id, active).await?;
        }
        ClientMessage::DeleteListing { listing_id } => {
            delete_listing(store, state.images.as_ref(), Some(principal), listing_id).await?;
        }
    }
    Ok(())
}

async fn handle_socket(socket: WebSocket, principal: Option<Principal>, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let _subscriptions = match &principal {
        Some(principal) => match subscribe(&state, principal, &events_tx).await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                warn!("Session subscriptions failed for {}: {}", principal.uid, e);
                let _ = send(
                    &mut sender,
                    &ServerMessage::Error {
                        message: e.to_string(),
                    },
                )
                .await;
                return;
            }
        },
        None => Vec::new(),
    };

    let mut premium = state.premium.changes();
    let premium_events = events_tx.clone();
    let premium_task = tokio::spawn(async move {
        while premium.changed().await.is_ok() {
            if premium_events.send(SessionEvent::PremiumChanged).is_err() {
                break;
            }
        }
    });

    let client_events = events_tx.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            let event = match msg {
                Message::Text(text) => match serde_json::from_str(text.as_str()) {
                    Ok(action) => SessionEvent::Client(action),
                    Err(e) => SessionEvent::Malformed(e.to_string()),
                },
                Message::Close(_) => break,
                _ => continue,
            };
            if client_events.send(event).is_err() {
                return;
            }
        }
        let _ = client_events.send(SessionEvent::Closed);
    });
    drop(events_tx);

    let mut view = SessionView::default();
    let mut sent = send(
        &mut sender,
        &ServerMessage::Premium {
            listings: state.premium.current(),
        },
    )
    .await;

    while sent.is_ok() {
        let Some(event) = events_rx.recv().await else {
            break;
        };
        sent = match event {
            SessionEvent::User(user) => send(&mut sender, &view.on_user(user)).await,
            SessionEvent::OwnerListings(listings) => {
                send(&mut sender, &view.on_owner_listings(listings)).await
            }
            SessionEvent::PremiumChanged => {
                let listings = state.premium.current();
                send(&mut sender, &ServerMessage::Premium { listings }).await
            }
            SessionEvent::Malformed(reason) => {
                debug!("Ignoring malformed session frame: {}", reason);
                send(
                    &mut sender,
                    &ServerMessage::Error {
                        message: format!("Unrecognized message, {reason}"),
                    },
                )
                .await
            }
            SessionEvent::Client(action) => {
                handle_action(&mut sender, &state, principal.as_ref(), &mut view, action).await
            }
            SessionEvent::Closed => break,
        };
    }

    premium_task.abort();
    recv_task.abort();
}

/// Pushes the provisional view, then performs the write. A failed write is
/// reported as an `error` frame and the overlay stays until the store's
/// next push.
async fn handle_action(
    sender: &mut SplitSink<WebSocket, Message>,
    state: &AppState,
    principal: Option<&Principal>,
    view: &mut SessionView,
    action: ClientMessage,
) -> Result<(), AppError> {
    let Some(principal) = principal else {
        return send(
            sender,
            &ServerMessage::SignInRequired {
                action: action.action().to_string(),
            },
        )
        .await;
    };

    if let Some(preview) = view.apply(&action) {
        send(sender, &preview).await?;
    }

    if let Err(e) = perform(state, principal, &action).await {
        warn!("{} failed for {}: {}", action.action(), principal.uid, e);
        send(
            sender,
            &ServerMessage::Error {
                message: e.to_string(),
            },
        )
        .await?;
    }
    Ok(())
}
