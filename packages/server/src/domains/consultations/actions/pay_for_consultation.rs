//! Consultation payment action.

use tracing::{error, info};

use crate::common::{ConversationId, CoreError, CoreResult, ProfileId, SessionId};
use crate::domains::consultations::models::ConsultationPayment;
use crate::domains::conversations::models::{Conversation, Message, MessageKind};
use crate::domains::profiles::Profile;
use crate::kernel::{RoomEvent, ServerDeps};

/// Pay the flat consultation fee, producing one unused credit.
///
/// Same money-movement contract as offer acceptance: guarded wallet debit
/// first, then the credit row and system message in one transaction, with a
/// compensating credit-back if anything after the debit fails. A concurrent
/// duplicate payment loses on the unused-pair index and is refunded.
pub async fn pay_for_consultation(
    deps: &ServerDeps,
    conversation_id: ConversationId,
    payer_id: ProfileId,
    origin: Option<SessionId>,
) -> CoreResult<ConsultationPayment> {
    let payer = Profile::find_by_id(payer_id, &deps.db_pool)
        .await?
        .ok_or(CoreError::NotFound("profile"))?;
    if payer.suspended {
        return Err(CoreError::PolicyViolation(
            "account is suspended".to_string(),
        ));
    }
    if !payer.is_client() {
        return Err(CoreError::NotAuthorized(
            "only clients may book consultations".to_string(),
        ));
    }

    let conversation = Conversation::find_by_id(conversation_id, &deps.db_pool)
        .await?
        .ok_or(CoreError::NotFound("conversation"))?;
    if !conversation.contains(payer_id) {
        return Err(CoreError::NotAuthorized(
            "not a participant in this conversation".to_string(),
        ));
    }
    if conversation.is_frozen {
        return Err(CoreError::PolicyViolation(
            "conversation is frozen pending review".to_string(),
        ));
    }

    // Fast path; the index enforces this under concurrency.
    if ConsultationPayment::find_unused(payer_id, conversation_id, &deps.db_pool)
        .await?
        .is_some()
    {
        return Err(CoreError::InvalidState(
            "an unused consultation credit already exists".to_string(),
        ));
    }

    let fee = deps.economics.consultation_fee;
    deps.wallet.debit(payer_id, fee).await?;

    let (payment, message) =
        match record_payment(deps, &conversation, payer_id, fee).await {
            Ok(recorded) => recorded,
            Err(err) => {
                if let Err(credit_err) = deps.wallet.credit(payer_id, fee).await {
                    error!(
                        %payer_id, %conversation_id, amount = fee, %credit_err,
                        "failed to compensate wallet debit after consultation payment failure"
                    );
                }
                return Err(err);
            }
        };

    deps.room_hub
        .publish(conversation_id, origin, RoomEvent::Message { message })
        .await;

    info!(payment_id = %payment.id, %conversation_id, amount = fee, "consultation paid");
    Ok(payment)
}

async fn record_payment(
    deps: &ServerDeps,
    conversation: &Conversation,
    payer_id: ProfileId,
    fee: i64,
) -> CoreResult<(ConsultationPayment, Message)> {
    let receiver_id = conversation
        .other_participant(payer_id)
        .ok_or_else(|| CoreError::NotAuthorized("not a participant".to_string()))?;

    let mut tx = deps.db_pool.begin().await?;

    let payment = ConsultationPayment::create(payer_id, conversation.id, fee, &mut *tx)
        .await
        .map_err(|err| match err.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => CoreError::InvalidState(
                "an unused consultation credit already exists".to_string(),
            ),
            _ => CoreError::Database(err),
        })?;

    let message = Message::create(
        conversation.id,
        payer_id,
        receiver_id,
        format!("Consultation paid ({fee} credits). Ready to schedule a video call."),
        MessageKind::System,
        false,
        false,
        &mut *tx,
    )
    .await?;
    Conversation::touch_last_message(conversation.id, &message.content, message.id, &mut *tx)
        .await?;

    tx.commit().await?;
    Ok((payment, message))
}
