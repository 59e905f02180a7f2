//! SSE streaming endpoint.
//!
//! GET /api/conversations/:id/stream?token=JWT&session=UUID
//!
//! Auth strategy: JWT passed as `?token=` query param with a header fallback.
//! EventSource can't send custom headers, so the client appends the token to
//! the URL. `session` identifies the connecting tab; events originated by the
//! same session are filtered out (the originator already applied them
//! optimistically), and presence tracks the session so multiple tabs of one
//! user collapse into a single online state.
//!
//! Presence lifecycle rides the connection: joining happens before the stream
//! starts, leaving happens when the stream is dropped, whichever way the
//! client disconnects.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;

use crate::common::{ConversationId, ProfileId, SessionId};
use crate::domains::conversations::models::Conversation;
use crate::kernel::{RoomEvent, ServerDeps};
use crate::server::app::AxumAppState;
use crate::server::middleware::bearer_token;

#[derive(Deserialize)]
pub struct StreamQuery {
    /// JWT token for authentication
    token: Option<String>,
    /// Client-chosen session id; generated server-side when absent.
    session: Option<uuid::Uuid>,
}

/// SSE stream handler for one conversation room.
///
/// Participants are registered in presence for the lifetime of the
/// connection; admins may observe without appearing in the room.
pub async fn stream_handler(
    Extension(state): Extension<AxumAppState>,
    Path(conversation_id): Path<ConversationId>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let token = query
        .token
        .or_else(|| bearer_token(&headers))
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let claims = state
        .jwt_service
        .verify_token(&token)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let profile_id = ProfileId::from_uuid(claims.profile_id);

    let conversation = Conversation::find_by_id(conversation_id, &state.db_pool)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    let is_participant = conversation.contains(profile_id);
    if !is_participant && !claims.is_admin {
        return Err(StatusCode::FORBIDDEN);
    }

    let session_id = query
        .session
        .map(SessionId::from_uuid)
        .unwrap_or_else(SessionId::new);
    let deps = state.deps.clone();

    // Subscribe before joining presence so this connection cannot miss the
    // events its own join triggers for others.
    let rx = deps.room_hub.subscribe(conversation_id).await;

    let guard = if is_participant {
        let came_online = deps.presence.join(conversation_id, profile_id, session_id).await;
        if came_online {
            deps.room_hub
                .publish(
                    conversation_id,
                    Some(session_id),
                    RoomEvent::UserOnline { profile_id },
                )
                .await;
        }
        Some(PresenceGuard {
            deps: deps.clone(),
            conversation_id,
            profile_id,
            session_id,
        })
    } else {
        None
    };

    let in_room = deps.presence.profiles_in_room(conversation_id).await;

    let connected =
        stream::once(async { Ok::<_, Infallible>(Event::default().event("connected").data("ok")) });
    let snapshot = stream::iter(
        event_to_sse(&RoomEvent::UsersInRoom {
            profile_ids: in_room,
        })
        .map(Ok),
    );

    let events = BroadcastStream::new(rx).filter_map(move |result| {
        // Guard lives as long as the stream; dropping it leaves the room.
        let _keep_alive = &guard;
        let item = match result {
            Ok(envelope) => {
                if envelope.origin == Some(session_id) {
                    None
                } else {
                    event_to_sse(&envelope.event).map(Ok)
                }
            }
            Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(n)) => {
                Event::default()
                    .event("lagged")
                    .json_data(serde_json::json!({ "missed": n }))
                    .ok()
                    .map(Ok)
            }
        };
        futures::future::ready(item)
    });

    Ok(Sse::new(connected.chain(snapshot).chain(events)).keep_alive(KeepAlive::default()))
}

fn event_to_sse(event: &RoomEvent) -> Option<Event> {
    Event::default().event(event.name()).json_data(event).ok()
}

/// Leaves the room when the SSE stream is dropped. Announces offline only
/// when the last of the profile's sessions disconnects.
struct PresenceGuard {
    deps: Arc<ServerDeps>,
    conversation_id: ConversationId,
    profile_id: ProfileId,
    session_id: SessionId,
}

impl Drop for PresenceGuard {
    fn drop(&mut self) {
        let deps = self.deps.clone();
        let conversation_id = self.conversation_id;
        let profile_id = self.profile_id;
        let session_id = self.session_id;
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                let went_offline = deps
                    .presence
                    .leave(conversation_id, profile_id, session_id)
                    .await;
                if went_offline {
                    deps.room_hub
                        .publish(
                            conversation_id,
                            Some(session_id),
                            RoomEvent::UserOffline { profile_id },
                        )
                        .await;
                }
            });
        }
    }
}
