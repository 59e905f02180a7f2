//! Create offer action.

use tracing::info;

use crate::common::{ConversationId, CoreError, CoreResult, ProfileId, SessionId};
use crate::domains::conversations::models::{Conversation, Message, MessageKind};
use crate::domains::offers::models::{Milestone, Offer};
use crate::domains::profiles::Profile;
use crate::kernel::{send_detached, RoomEvent, ServerDeps};

/// Propose a custom offer inside an existing conversation.
///
/// Validations: price floor and ceiling, the receiver must be the sender's
/// counterpart in the conversation, conversation must not be frozen, and when
/// milestones are present their prices must sum to the offer price.
///
/// On success a system message summarizing the offer is appended to the same
/// conversation and the room is notified.
#[allow(clippy::too_many_arguments)]
pub async fn create_offer(
    deps: &ServerDeps,
    conversation_id: ConversationId,
    sender_id: ProfileId,
    receiver_id: ProfileId,
    price: i64,
    delivery_days: i32,
    description: String,
    milestones: Vec<Milestone>,
    origin: Option<SessionId>,
) -> CoreResult<Offer> {
    if price < deps.economics.min_offer_price {
        return Err(CoreError::InvalidState(format!(
            "offer price must be at least {}",
            deps.economics.min_offer_price
        )));
    }
    if price > deps.economics.max_offer_price {
        return Err(CoreError::InvalidState(format!(
            "offer price must be at most {}",
            deps.economics.max_offer_price
        )));
    }
    if delivery_days <= 0 {
        return Err(CoreError::InvalidState(
            "delivery duration must be at least one day".to_string(),
        ));
    }
    if !milestones.is_empty() {
        // Checked sum; a wrapping total must not slip past the equality check.
        let total = milestones
            .iter()
            .try_fold(0i64, |sum, m| sum.checked_add(m.price))
            .ok_or_else(|| {
                CoreError::InvalidState("milestone prices are out of range".to_string())
            })?;
        if total != price {
            return Err(CoreError::InvalidState(
                "milestone prices must sum to the offer price".to_string(),
            ));
        }
    }

    let conversation = Conversation::find_by_id(conversation_id, &deps.db_pool)
        .await?
        .ok_or(CoreError::NotFound("conversation"))?;
    // Also rejects self-offers: the counterpart is never the sender.
    if conversation.other_participant(sender_id) != Some(receiver_id) {
        return Err(CoreError::NotAuthorized(
            "offer receiver must be the sender's counterpart in the conversation".to_string(),
        ));
    }
    if conversation.is_frozen {
        return Err(CoreError::PolicyViolation(
            "conversation is frozen pending review".to_string(),
        ));
    }

    let offer = Offer::create(
        conversation_id,
        sender_id,
        receiver_id,
        price,
        delivery_days,
        description,
        milestones,
        &deps.db_pool,
    )
    .await?;

    let summary = format!(
        "New offer: {} ({} credits, delivery in {} days)",
        offer.description, offer.price, offer.delivery_days
    );
    let message = Message::create(
        conversation_id,
        sender_id,
        receiver_id,
        summary,
        MessageKind::System,
        false,
        false,
        &deps.db_pool,
    )
    .await?;
    Conversation::touch_last_message(conversation_id, &message.content, message.id, &deps.db_pool)
        .await?;

    deps.room_hub
        .publish(
            conversation_id,
            origin,
            RoomEvent::Offer {
                offer: offer.clone(),
            },
        )
        .await;
    deps.room_hub
        .publish(conversation_id, origin, RoomEvent::Message { message })
        .await;

    if !deps.presence.is_in_room(conversation_id, receiver_id).await {
        if let Some(receiver) = Profile::find_by_id(receiver_id, &deps.db_pool).await? {
            send_detached(
                deps.mailer.clone(),
                receiver.email,
                "You received a new offer".to_string(),
                format!(
                    "{} credits, delivery in {} days: {}",
                    offer.price, offer.delivery_days, offer.description
                ),
            );
        }
    }

    info!(offer_id = %offer.id, %conversation_id, price, "offer created");
    Ok(offer)
}
