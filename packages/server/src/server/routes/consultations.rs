//! Consultation booking endpoints.

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::{Deserialize, Serialize};

use chrono::{NaiveDate, NaiveTime};

use crate::common::{ConversationId, CoreError, CoreResult, ProfileId, SessionId};
use crate::domains::consultations::actions::{pay_for_consultation, schedule_meeting};
use crate::domains::consultations::models::ConsultationPayment;
use crate::domains::conversations::models::{Conversation, Message};
use crate::server::app::AxumAppState;
use crate::server::middleware::{require_user, AuthUser};

#[derive(Deserialize, Default)]
pub struct ConsultationActionRequest {
    pub session: Option<SessionId>,
}

/// POST /api/conversations/:id/consultation/pay - buy one consultation credit.
pub async fn pay_handler(
    Extension(state): Extension<AxumAppState>,
    user: Option<Extension<AuthUser>>,
    Path(conversation_id): Path<ConversationId>,
    body: Option<Json<ConsultationActionRequest>>,
) -> CoreResult<Json<ConsultationPayment>> {
    let user = require_user(user.as_deref())?;
    let session = body.and_then(|Json(b)| b.session);

    let payment =
        pay_for_consultation(&state.deps, conversation_id, user.profile_id, session).await?;
    Ok(Json(payment))
}

#[derive(Deserialize)]
pub struct ScheduleMeetingRequest {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub session: Option<SessionId>,
}

/// POST /api/conversations/:id/meeting - consume the credit and post the
/// meeting link into the conversation.
pub async fn schedule_handler(
    Extension(state): Extension<AxumAppState>,
    user: Option<Extension<AuthUser>>,
    Path(conversation_id): Path<ConversationId>,
    Json(body): Json<ScheduleMeetingRequest>,
) -> CoreResult<Json<Message>> {
    let user = require_user(user.as_deref())?;

    let message = schedule_meeting(
        &state.deps,
        conversation_id,
        user.profile_id,
        body.date,
        body.time,
        body.session,
    )
    .await?;
    Ok(Json(message))
}

#[derive(Serialize)]
pub struct ConsultationStatus {
    pub has_unused_credit: bool,
    pub payer_id: Option<ProfileId>,
}

/// GET /api/conversations/:id/consultation - whether the conversation holds
/// an unused credit and who paid for it.
pub async fn status_handler(
    Extension(state): Extension<AxumAppState>,
    user: Option<Extension<AuthUser>>,
    Path(conversation_id): Path<ConversationId>,
) -> CoreResult<Json<ConsultationStatus>> {
    let user = require_user(user.as_deref())?;

    let conversation = Conversation::find_by_id(conversation_id, &state.db_pool)
        .await?
        .ok_or(CoreError::NotFound("conversation"))?;
    if !conversation.contains(user.profile_id) {
        return Err(CoreError::NotAuthorized(
            "not a participant in this conversation".to_string(),
        ));
    }

    let credit =
        ConsultationPayment::find_unused_for_conversation(conversation_id, &state.db_pool).await?;
    Ok(Json(ConsultationStatus {
        has_unused_credit: credit.is_some(),
        payer_id: credit.map(|c| c.payer_id),
    }))
}
