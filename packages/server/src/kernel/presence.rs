//! Presence tracking: who is actively viewing which conversation.
//!
//! Modeled as a set keyed by session, not a per-user scalar: one person can
//! have several tabs open on the same conversation, and only the transition
//! of the whole set matters for online/offline announcements. `join` and
//! `leave` report whether the profile's aggregate state changed so the caller
//! knows when to announce.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::common::{ConversationId, ProfileId, SessionId};

type RoomMap = HashMap<ConversationId, HashMap<ProfileId, HashSet<SessionId>>>;

/// Tracks live sessions per conversation per profile.
///
/// Thread-safe, cloneable.
#[derive(Clone, Default)]
pub struct PresenceRegistry {
    rooms: Arc<RwLock<RoomMap>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session in a room.
    ///
    /// Returns `true` if this was the profile's first session in the room,
    /// i.e. the profile just came online there.
    pub async fn join(
        &self,
        conversation_id: ConversationId,
        profile_id: ProfileId,
        session_id: SessionId,
    ) -> bool {
        let mut rooms = self.rooms.write().await;
        let sessions = rooms
            .entry(conversation_id)
            .or_default()
            .entry(profile_id)
            .or_default();

        let came_online = sessions.is_empty();
        sessions.insert(session_id);
        came_online
    }

    /// Deregister a session from a room.
    ///
    /// Returns `true` only when no other session for that profile remains in
    /// the room - the profile just went offline there.
    pub async fn leave(
        &self,
        conversation_id: ConversationId,
        profile_id: ProfileId,
        session_id: SessionId,
    ) -> bool {
        let mut rooms = self.rooms.write().await;

        let Some(profiles) = rooms.get_mut(&conversation_id) else {
            return false;
        };
        let Some(sessions) = profiles.get_mut(&profile_id) else {
            return false;
        };

        sessions.remove(&session_id);
        let went_offline = sessions.is_empty();

        if went_offline {
            profiles.remove(&profile_id);
        }
        if profiles.is_empty() {
            rooms.remove(&conversation_id);
        }

        went_offline
    }

    /// Profiles currently present in a room.
    pub async fn profiles_in_room(&self, conversation_id: ConversationId) -> Vec<ProfileId> {
        let rooms = self.rooms.read().await;
        rooms
            .get(&conversation_id)
            .map(|profiles| profiles.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Whether the given profile has at least one live session in the room.
    pub async fn is_in_room(
        &self,
        conversation_id: ConversationId,
        profile_id: ProfileId,
    ) -> bool {
        let rooms = self.rooms.read().await;
        rooms
            .get(&conversation_id)
            .and_then(|profiles| profiles.get(&profile_id))
            .map(|sessions| !sessions.is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_join_announces_online() {
        let presence = PresenceRegistry::new();
        let room = ConversationId::new();
        let profile = ProfileId::new();

        assert!(presence.join(room, profile, SessionId::new()).await);
        assert!(presence.is_in_room(room, profile).await);
    }

    #[tokio::test]
    async fn second_session_does_not_reannounce() {
        let presence = PresenceRegistry::new();
        let room = ConversationId::new();
        let profile = ProfileId::new();

        assert!(presence.join(room, profile, SessionId::new()).await);
        assert!(!presence.join(room, profile, SessionId::new()).await);
    }

    #[tokio::test]
    async fn offline_only_after_last_session_leaves() {
        let presence = PresenceRegistry::new();
        let room = ConversationId::new();
        let profile = ProfileId::new();
        let tab1 = SessionId::new();
        let tab2 = SessionId::new();

        presence.join(room, profile, tab1).await;
        presence.join(room, profile, tab2).await;

        assert!(!presence.leave(room, profile, tab1).await);
        assert!(presence.is_in_room(room, profile).await);

        assert!(presence.leave(room, profile, tab2).await);
        assert!(!presence.is_in_room(room, profile).await);
    }

    #[tokio::test]
    async fn leave_of_unknown_session_is_harmless() {
        let presence = PresenceRegistry::new();
        let room = ConversationId::new();
        let profile = ProfileId::new();

        assert!(!presence.leave(room, profile, SessionId::new()).await);
    }

    #[tokio::test]
    async fn room_snapshot_lists_present_profiles() {
        let presence = PresenceRegistry::new();
        let room = ConversationId::new();
        let alice = ProfileId::new();
        let bob = ProfileId::new();

        presence.join(room, alice, SessionId::new()).await;
        presence.join(room, bob, SessionId::new()).await;

        let mut in_room = presence.profiles_in_room(room).await;
        in_room.sort();
        let mut expected = vec![alice, bob];
        expected.sort();
        assert_eq!(in_room, expected);
    }

    #[tokio::test]
    async fn rooms_are_independent() {
        let presence = PresenceRegistry::new();
        let room_a = ConversationId::new();
        let room_b = ConversationId::new();
        let profile = ProfileId::new();

        presence.join(room_a, profile, SessionId::new()).await;

        assert!(presence.is_in_room(room_a, profile).await);
        assert!(!presence.is_in_room(room_b, profile).await);
    }
}
