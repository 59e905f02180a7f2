//! Accept offer action - the escrow commit point.
//!
//! Money-movement contract: the wallet debit, the order creation, the offer
//! status flip and the confirmation message form one logical unit. The debit
//! happens first as a guarded atomic delta; the three database effects run in
//! a single transaction afterwards, and any failure there compensates the
//! debit with a credit before the error is returned. Partial application is
//! never surfaced.

use chrono::Utc;
use tracing::{error, info};

use crate::common::{CoreError, CoreResult, OfferId, ProfileId, SessionId};
use crate::domains::conversations::models::{Conversation, Message, MessageKind};
use crate::domains::offers::models::{Offer, Order};
use crate::domains::profiles::Profile;
use crate::kernel::{send_detached, RoomEvent, ServerDeps};

/// Accept a pending offer as its designated receiver.
///
/// Concurrency: the conditional status update inside the transaction is the
/// single serialization point. Two concurrent accepts produce exactly one
/// order; the loser sees `InvalidState` and the loser's debit is refunded.
pub async fn accept_offer(
    deps: &ServerDeps,
    offer_id: OfferId,
    accepter_id: ProfileId,
    origin: Option<SessionId>,
) -> CoreResult<(Offer, Order)> {
    let offer = Offer::find_by_id(offer_id, &deps.db_pool)
        .await?
        .ok_or(CoreError::NotFound("offer"))?;

    if offer.receiver_id != accepter_id {
        return Err(CoreError::NotAuthorized(
            "only the offer's receiver may accept it".to_string(),
        ));
    }
    if !offer.is_pending() {
        return Err(CoreError::InvalidState(
            "offer is no longer pending".to_string(),
        ));
    }

    // Escrow debit. Guarded in SQL; insufficient funds is a reported error,
    // not a retry condition.
    deps.wallet.debit(accepter_id, offer.price).await?;

    let (accepted, order, message) = match apply_acceptance(deps, &offer, accepter_id).await {
        Ok(applied) => applied,
        Err(err) => {
            // Compensate the debit; the operation must be all-or-nothing.
            if let Err(credit_err) = deps.wallet.credit(accepter_id, offer.price).await {
                error!(
                    %offer_id, %accepter_id, amount = offer.price, %credit_err,
                    "failed to compensate wallet debit after acceptance failure"
                );
            }
            return Err(err);
        }
    };

    deps.room_hub
        .publish(
            accepted.conversation_id,
            origin,
            RoomEvent::Offer {
                offer: accepted.clone(),
            },
        )
        .await;
    deps.room_hub
        .publish(
            accepted.conversation_id,
            origin,
            RoomEvent::Message {
                message: message.clone(),
            },
        )
        .await;

    // Seller gets an email when they are not watching the conversation.
    if !deps
        .presence
        .is_in_room(accepted.conversation_id, accepted.sender_id)
        .await
    {
        if let Some(seller) = Profile::find_by_id(accepted.sender_id, &deps.db_pool).await? {
            send_detached(
                deps.mailer.clone(),
                seller.email,
                "Your offer was accepted".to_string(),
                format!(
                    "Your offer for {} credits was accepted. Delivery is due by {}.",
                    order.amount,
                    order.delivery_date.date_naive()
                ),
            );
        }
    }

    info!(
        offer_id = %accepted.id, order_id = %order.id,
        amount = order.amount, fee = order.platform_fee,
        "offer accepted, order created"
    );
    Ok((accepted, order))
}

/// The transactional tail of acceptance: status flip, order, system message.
async fn apply_acceptance(
    deps: &ServerDeps,
    offer: &Offer,
    accepter_id: ProfileId,
) -> CoreResult<(Offer, Order, Message)> {
    let mut tx = deps.db_pool.begin().await?;

    let accepted = Offer::try_accept(offer.id, accepter_id, &mut *tx)
        .await?
        .ok_or_else(|| CoreError::InvalidState("offer is no longer pending".to_string()))?;

    let delivery_date = Utc::now() + chrono::Duration::days(i64::from(accepted.delivery_days));
    let order = Order::create(
        accepter_id,
        accepted.sender_id,
        accepted.price,
        deps.economics.platform_fee(accepted.price),
        delivery_date,
        Some(accepted.id),
        &mut *tx,
    )
    .await?;

    let message = Message::create(
        accepted.conversation_id,
        accepter_id,
        accepted.sender_id,
        format!(
            "Offer accepted. Order created for {} credits, delivery due {}",
            order.amount,
            order.delivery_date.date_naive()
        ),
        MessageKind::System,
        false,
        false,
        &mut *tx,
    )
    .await?;

    Conversation::touch_last_message(
        accepted.conversation_id,
        &message.content,
        message.id,
        &mut *tx,
    )
    .await?;

    tx.commit().await?;
    Ok((accepted, order, message))
}
