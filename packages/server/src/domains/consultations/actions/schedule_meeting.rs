//! Meeting scheduling action: consume a credit, mint a meeting link.

use chrono::{NaiveDate, NaiveTime};
use tracing::info;
use uuid::Uuid;

use crate::common::{ConversationId, CoreError, CoreResult, ProfileId, SessionId};
use crate::domains::consultations::models::ConsultationPayment;
use crate::domains::conversations::models::{Conversation, Message, MessageKind};
use crate::domains::profiles::Profile;
use crate::kernel::{send_detached, RoomEvent, ServerDeps};

/// Schedule the pre-paid video call for a conversation.
///
/// Either participant may schedule; what gates the call is the conversation
/// holding an unused credit, which this consumes atomically. Without one the
/// caller gets `InvalidState` and must pay first.
pub async fn schedule_meeting(
    deps: &ServerDeps,
    conversation_id: ConversationId,
    scheduler_id: ProfileId,
    date: NaiveDate,
    time: NaiveTime,
    origin: Option<SessionId>,
) -> CoreResult<Message> {
    let conversation = Conversation::find_by_id(conversation_id, &deps.db_pool)
        .await?
        .ok_or(CoreError::NotFound("conversation"))?;
    let other_id = conversation
        .other_participant(scheduler_id)
        .ok_or_else(|| {
            CoreError::NotAuthorized("not a participant in this conversation".to_string())
        })?;
    if conversation.is_frozen {
        return Err(CoreError::PolicyViolation(
            "conversation is frozen pending review".to_string(),
        ));
    }

    let mut tx = deps.db_pool.begin().await?;

    let payment = ConsultationPayment::try_consume(conversation_id, &mut *tx)
        .await?
        .ok_or_else(|| {
            CoreError::InvalidState("no unused consultation credit for this conversation".to_string())
        })?;

    let meeting_url = format!(
        "{}/{}",
        deps.meeting_base_url.trim_end_matches('/'),
        Uuid::new_v4().simple()
    );
    let message = Message::create(
        conversation_id,
        scheduler_id,
        other_id,
        format!("Video consultation scheduled for {date} at {time}: {meeting_url}"),
        MessageKind::Meeting,
        false,
        false,
        &mut *tx,
    )
    .await?;
    Conversation::touch_last_message(conversation_id, &message.content, message.id, &mut *tx)
        .await?;

    tx.commit().await?;

    deps.room_hub
        .publish(
            conversation_id,
            origin,
            RoomEvent::Message {
                message: message.clone(),
            },
        )
        .await;

    if !deps.presence.is_in_room(conversation_id, other_id).await {
        if let Some(other) = Profile::find_by_id(other_id, &deps.db_pool).await? {
            send_detached(
                deps.mailer.clone(),
                other.email,
                "Your consultation is scheduled".to_string(),
                format!("{date} at {time}. Join the video call here: {meeting_url}"),
            );
        }
    }

    info!(
        payment_id = %payment.id, %conversation_id,
        "consultation credit consumed, meeting link issued"
    );
    Ok(message)
}
