//! Reject offer action.

use tracing::info;

use crate::common::{CoreError, CoreResult, OfferId, ProfileId, SessionId};
use crate::domains::conversations::models::{Conversation, Message, MessageKind};
use crate::domains::offers::models::Offer;
use crate::kernel::{RoomEvent, ServerDeps};

/// Decline a pending offer as its designated receiver.
///
/// No money moves here. The conditional update carries the same
/// exactly-one-winner contract as acceptance, so a reject racing an accept
/// loses cleanly with `InvalidState`.
pub async fn reject_offer(
    deps: &ServerDeps,
    offer_id: OfferId,
    rejecter_id: ProfileId,
    origin: Option<SessionId>,
) -> CoreResult<Offer> {
    let rejected = match Offer::try_reject(offer_id, rejecter_id, &deps.db_pool).await? {
        Some(offer) => offer,
        None => {
            // Diagnose which precondition failed for a precise error.
            let offer = Offer::find_by_id(offer_id, &deps.db_pool)
                .await?
                .ok_or(CoreError::NotFound("offer"))?;
            if offer.receiver_id != rejecter_id {
                return Err(CoreError::NotAuthorized(
                    "only the offer's receiver may decline it".to_string(),
                ));
            }
            return Err(CoreError::InvalidState(
                "offer is no longer pending".to_string(),
            ));
        }
    };

    let message = Message::create(
        rejected.conversation_id,
        rejecter_id,
        rejected.sender_id,
        "Offer declined".to_string(),
        MessageKind::System,
        false,
        false,
        &deps.db_pool,
    )
    .await?;
    Conversation::touch_last_message(
        rejected.conversation_id,
        &message.content,
        message.id,
        &deps.db_pool,
    )
    .await?;

    deps.room_hub
        .publish(
            rejected.conversation_id,
            origin,
            RoomEvent::Offer {
                offer: rejected.clone(),
            },
        )
        .await;
    deps.room_hub
        .publish(rejected.conversation_id, origin, RoomEvent::Message { message })
        .await;

    info!(offer_id = %rejected.id, "offer rejected");
    Ok(rejected)
}
