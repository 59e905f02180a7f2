//! Post message action - the participant message path.

use tracing::{debug, info};

use crate::common::{CoreError, CoreResult, ProfileId, SessionId};
use crate::domains::conversations::models::{Conversation, Message, MessageKind};
use crate::domains::profiles::Profile;
use crate::kernel::{send_detached, RoomEvent, ServerDeps};

/// Post a message from one participant to another.
///
/// This action:
/// 1. Rejects suspended senders and frozen conversations
/// 2. Looks up (or lazily creates) the conversation for the pair
/// 3. Runs the moderation pipeline exactly once on the raw text
/// 4. Persists the screened message and refreshes conversation metadata
/// 5. Applies the freeze directive, broadcasts, and notifies an absent peer
///
/// Broadcast and email are best-effort; persistence never waits on them.
pub async fn post_message(
    deps: &ServerDeps,
    sender_id: ProfileId,
    receiver_id: ProfileId,
    raw_content: &str,
    origin: Option<SessionId>,
) -> CoreResult<Message> {
    if sender_id == receiver_id {
        return Err(CoreError::InvalidState(
            "sender and receiver must differ".to_string(),
        ));
    }

    let sender = Profile::find_by_id(sender_id, &deps.db_pool)
        .await?
        .ok_or(CoreError::NotFound("profile"))?;
    if sender.suspended {
        return Err(CoreError::PolicyViolation(
            "account is suspended".to_string(),
        ));
    }
    let receiver = Profile::find_by_id(receiver_id, &deps.db_pool)
        .await?
        .ok_or(CoreError::NotFound("profile"))?;

    let conversation =
        Conversation::find_or_create_for_pair(sender_id, receiver_id, &deps.db_pool).await?;
    if conversation.is_frozen {
        return Err(CoreError::PolicyViolation(
            "conversation is frozen pending review".to_string(),
        ));
    }

    // Exactly one moderation pass, before persistence.
    let screened = deps.moderation.screen(raw_content);

    let message = Message::create(
        conversation.id,
        sender_id,
        receiver_id,
        screened.content,
        MessageKind::Text,
        false,
        screened.blurred,
        &deps.db_pool,
    )
    .await?;

    Conversation::touch_last_message(conversation.id, &message.content, message.id, &deps.db_pool)
        .await?;

    if screened.freeze {
        info!(conversation_id = %conversation.id, %sender_id, "contact info detected, freezing conversation");
        Conversation::set_frozen(conversation.id, true, &deps.db_pool).await?;
        deps.room_hub
            .publish(
                conversation.id,
                None,
                RoomEvent::ConversationFrozen {
                    conversation_id: conversation.id,
                },
            )
            .await;
    }

    deps.room_hub
        .publish(
            conversation.id,
            origin,
            RoomEvent::Message {
                message: message.clone(),
            },
        )
        .await;

    // Peers outside the room get an email instead of the live event.
    if !deps.presence.is_in_room(conversation.id, receiver_id).await {
        send_detached(
            deps.mailer.clone(),
            receiver.email,
            format!("New message from {}", sender.display_name),
            format!("{}: {}", sender.display_name, message.content),
        );
    }

    debug!(message_id = %message.id, conversation_id = %conversation.id, "message posted");
    Ok(message)
}
