//! In-process pub/sub hub for conversation rooms.
//!
//! One broadcast channel per conversation. Producers (domain actions) publish
//! typed room events; consumers (SSE endpoints) subscribe and forward them to
//! connected clients. Publishing is best-effort and never blocks persistence:
//! a publish with no subscribers is a no-op, and send errors are ignored.
//!
//! Each published envelope carries the originating session (when there is
//! one) so subscribers can drop the echo of their own actions.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use serde::Serialize;

use crate::common::{ConversationId, ProfileId, SessionId};
use crate::domains::conversations::models::Message;
use crate::domains::offers::models::Offer;

/// Event fanned out to every session in a conversation room.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    Message { message: Message },
    Offer { offer: Offer },
    ConversationFrozen { conversation_id: ConversationId },
    ConversationUnfrozen { conversation_id: ConversationId },
    UserOnline { profile_id: ProfileId },
    UserOffline { profile_id: ProfileId },
    UsersInRoom { profile_ids: Vec<ProfileId> },
}

impl RoomEvent {
    /// Wire-level event name (matches the serde tag).
    pub fn name(&self) -> &'static str {
        match self {
            RoomEvent::Message { .. } => "message",
            RoomEvent::Offer { .. } => "offer",
            RoomEvent::ConversationFrozen { .. } => "conversation_frozen",
            RoomEvent::ConversationUnfrozen { .. } => "conversation_unfrozen",
            RoomEvent::UserOnline { .. } => "user_online",
            RoomEvent::UserOffline { .. } => "user_offline",
            RoomEvent::UsersInRoom { .. } => "users_in_room",
        }
    }
}

/// A room event plus the session that caused it (if any). Subscribers filter
/// out envelopes originated by their own session - the originator already
/// holds an optimistic local copy.
#[derive(Debug, Clone)]
pub struct RoomEnvelope {
    pub origin: Option<SessionId>,
    pub event: RoomEvent,
}

/// Per-conversation broadcast hub.
///
/// Thread-safe, cloneable. Keyed by conversation id.
#[derive(Clone)]
pub struct RoomHub {
    rooms: Arc<RwLock<HashMap<ConversationId, broadcast::Sender<RoomEnvelope>>>>,
    capacity: usize,
}

impl RoomHub {
    /// Create a new RoomHub with default capacity (256 events per room).
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new RoomHub with the given channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Publish an event to a conversation room. No-op if nobody is listening.
    ///
    /// A send with no receivers also retires the room's channel, so rooms
    /// whose last subscriber disconnected are reclaimed on the next publish.
    pub async fn publish(
        &self,
        conversation_id: ConversationId,
        origin: Option<SessionId>,
        event: RoomEvent,
    ) {
        let stale = {
            let rooms = self.rooms.read().await;
            match rooms.get(&conversation_id) {
                Some(tx) => tx.send(RoomEnvelope { origin, event }).is_err(),
                None => false,
            }
        };

        if stale {
            let mut rooms = self.rooms.write().await;
            if let Some(tx) = rooms.get(&conversation_id) {
                // Re-check under the write lock; a subscriber may have raced in.
                if tx.receiver_count() == 0 {
                    rooms.remove(&conversation_id);
                }
            }
        }
    }

    /// Subscribe to a conversation room. Creates the channel if absent.
    pub async fn subscribe(
        &self,
        conversation_id: ConversationId,
    ) -> broadcast::Receiver<RoomEnvelope> {
        let mut rooms = self.rooms.write().await;
        let tx = rooms
            .entry(conversation_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        tx.subscribe()
    }

    /// Remove rooms with zero subscribers. Publishing already retires rooms
    /// it touches; the periodic sweep catches rooms that go quiet entirely.
    pub async fn cleanup(&self) {
        let mut rooms = self.rooms.write().await;
        rooms.retain(|_, tx| tx.receiver_count() > 0);
    }
}

impl Default for RoomHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_subscribe_roundtrip() {
        let hub = RoomHub::new();
        let conversation_id = ConversationId::new();
        let mut rx = hub.subscribe(conversation_id).await;

        let profile_id = ProfileId::new();
        hub.publish(conversation_id, None, RoomEvent::UserOnline { profile_id })
            .await;

        let envelope = rx.recv().await.unwrap();
        assert!(envelope.origin.is_none());
        match envelope.event {
            RoomEvent::UserOnline { profile_id: got } => assert_eq!(got, profile_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_noop() {
        let hub = RoomHub::new();
        // Should not panic
        hub.publish(
            ConversationId::new(),
            None,
            RoomEvent::ConversationFrozen {
                conversation_id: ConversationId::new(),
            },
        )
        .await;
    }

    #[tokio::test]
    async fn envelope_carries_origin_session() {
        let hub = RoomHub::new();
        let conversation_id = ConversationId::new();
        let mut rx = hub.subscribe(conversation_id).await;

        let session = SessionId::new();
        hub.publish(
            conversation_id,
            Some(session),
            RoomEvent::UserOffline {
                profile_id: ProfileId::new(),
            },
        )
        .await;

        assert_eq!(rx.recv().await.unwrap().origin, Some(session));
    }

    #[tokio::test]
    async fn rooms_are_isolated() {
        let hub = RoomHub::new();
        let room_a = ConversationId::new();
        let room_b = ConversationId::new();
        let mut rx_a = hub.subscribe(room_a).await;
        let _rx_b = hub.subscribe(room_b).await;

        hub.publish(
            room_b,
            None,
            RoomEvent::UserOnline {
                profile_id: ProfileId::new(),
            },
        )
        .await;

        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_retires_rooms_with_no_subscribers() {
        let hub = RoomHub::new();
        let conversation_id = ConversationId::new();
        let rx = hub.subscribe(conversation_id).await;
        drop(rx);

        hub.publish(
            conversation_id,
            None,
            RoomEvent::UserOnline {
                profile_id: ProfileId::new(),
            },
        )
        .await;

        assert_eq!(hub.rooms.read().await.len(), 0);
    }

    #[tokio::test]
    async fn cleanup_removes_empty_rooms() {
        let hub = RoomHub::new();
        let rx = hub.subscribe(ConversationId::new()).await;

        assert_eq!(hub.rooms.read().await.len(), 1);

        drop(rx);
        hub.cleanup().await;

        assert_eq!(hub.rooms.read().await.len(), 0);
    }

    #[test]
    fn event_names_match_serde_tags() {
        let event = RoomEvent::UsersInRoom {
            profile_ids: vec![],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.name());
    }
}
