//! Admin override actions.
//!
//! These are a distinct privileged capability, not a flag on the participant
//! path: the route layer enforces the admin role before anything here runs,
//! and nothing here consults the moderation pipeline or the freeze flag.

use tracing::info;

use crate::common::{ConversationId, CoreError, CoreResult, ProfileId};
use crate::domains::conversations::models::{Conversation, Message, MessageKind};
use crate::domains::moderation::ADMIN_MESSAGE_PREFIX;
use crate::kernel::{RoomEvent, ServerDeps};

/// Post an administrator message into any conversation, frozen or not.
///
/// The message is trusted input: no moderation, tagged `is_admin` and
/// prefixed for display. The receiver column is a convenience field; admin
/// notices address the whole room.
pub async fn admin_post_message(
    deps: &ServerDeps,
    conversation_id: ConversationId,
    admin_id: ProfileId,
    content: &str,
) -> CoreResult<Message> {
    let conversation = Conversation::find_by_id(conversation_id, &deps.db_pool)
        .await?
        .ok_or(CoreError::NotFound("conversation"))?;

    let message = Message::create(
        conversation.id,
        admin_id,
        conversation.first_participant_id,
        format!("{} {}", ADMIN_MESSAGE_PREFIX, content),
        MessageKind::Text,
        true,
        false,
        &deps.db_pool,
    )
    .await?;

    Conversation::touch_last_message(conversation.id, &message.content, message.id, &deps.db_pool)
        .await?;

    deps.room_hub
        .publish(
            conversation.id,
            None,
            RoomEvent::Message {
                message: message.clone(),
            },
        )
        .await;

    info!(conversation_id = %conversation.id, %admin_id, "admin override message posted");
    Ok(message)
}

/// Toggle the freeze flag in either direction. Administrator-only; the only
/// path that ever unfreezes a conversation.
pub async fn set_conversation_frozen(
    deps: &ServerDeps,
    conversation_id: ConversationId,
    frozen: bool,
) -> CoreResult<Conversation> {
    if Conversation::find_by_id(conversation_id, &deps.db_pool)
        .await?
        .is_none()
    {
        return Err(CoreError::NotFound("conversation"));
    }

    let conversation = Conversation::set_frozen(conversation_id, frozen, &deps.db_pool).await?;

    let event = if frozen {
        RoomEvent::ConversationFrozen { conversation_id }
    } else {
        RoomEvent::ConversationUnfrozen { conversation_id }
    };
    deps.room_hub.publish(conversation_id, None, event).await;

    info!(%conversation_id, frozen, "conversation freeze state changed by admin");
    Ok(conversation)
}
