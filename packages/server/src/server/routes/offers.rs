//! Offer endpoints.

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::{ConversationId, CoreError, CoreResult, OfferId, ProfileId, SessionId};
use crate::domains::conversations::models::Conversation;
use crate::domains::offers::actions::{accept_offer, create_offer, reject_offer};
use crate::domains::offers::models::{Milestone, Offer, Order};
use crate::server::app::AxumAppState;
use crate::server::middleware::{require_user, AuthUser};

#[derive(Deserialize)]
pub struct CreateOfferRequest {
    pub conversation_id: ConversationId,
    pub receiver_id: ProfileId,
    pub price: i64,
    pub delivery_days: i32,
    pub description: String,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    pub session: Option<SessionId>,
}

/// POST /api/offers - propose a custom offer.
pub async fn create_offer_handler(
    Extension(state): Extension<AxumAppState>,
    user: Option<Extension<AuthUser>>,
    Json(body): Json<CreateOfferRequest>,
) -> CoreResult<Json<Offer>> {
    let user = require_user(user.as_deref())?;

    let offer = create_offer(
        &state.deps,
        body.conversation_id,
        user.profile_id,
        body.receiver_id,
        body.price,
        body.delivery_days,
        body.description,
        body.milestones,
        body.session,
    )
    .await?;
    Ok(Json(offer))
}

#[derive(Deserialize, Default)]
pub struct OfferActionRequest {
    pub session: Option<SessionId>,
}

#[derive(Serialize)]
pub struct AcceptOfferResponse {
    pub offer: Offer,
    pub order: Order,
}

/// POST /api/offers/:id/accept - accept an offer, debiting the wallet and
/// opening the escrowed order.
pub async fn accept_offer_handler(
    Extension(state): Extension<AxumAppState>,
    user: Option<Extension<AuthUser>>,
    Path(offer_id): Path<OfferId>,
    body: Option<Json<OfferActionRequest>>,
) -> CoreResult<Json<AcceptOfferResponse>> {
    let user = require_user(user.as_deref())?;
    let session = body.and_then(|Json(b)| b.session);

    let (offer, order) = accept_offer(&state.deps, offer_id, user.profile_id, session).await?;
    Ok(Json(AcceptOfferResponse { offer, order }))
}

/// POST /api/offers/:id/reject - decline an offer.
pub async fn reject_offer_handler(
    Extension(state): Extension<AxumAppState>,
    user: Option<Extension<AuthUser>>,
    Path(offer_id): Path<OfferId>,
    body: Option<Json<OfferActionRequest>>,
) -> CoreResult<Json<Offer>> {
    let user = require_user(user.as_deref())?;
    let session = body.and_then(|Json(b)| b.session);

    let offer = reject_offer(&state.deps, offer_id, user.profile_id, session).await?;
    Ok(Json(offer))
}

/// GET /api/conversations/:id/offers - offers in a conversation, newest first.
pub async fn list_offers(
    Extension(state): Extension<AxumAppState>,
    user: Option<Extension<AuthUser>>,
    Path(conversation_id): Path<ConversationId>,
) -> CoreResult<Json<Vec<Offer>>> {
    let user = require_user(user.as_deref())?;

    let conversation = Conversation::find_by_id(conversation_id, &state.db_pool)
        .await?
        .ok_or(CoreError::NotFound("conversation"))?;
    if !conversation.contains(user.profile_id) && !user.is_admin {
        return Err(CoreError::NotAuthorized(
            "not a participant in this conversation".to_string(),
        ));
    }

    let offers = Offer::find_by_conversation(conversation_id, &state.db_pool).await?;
    Ok(Json(offers))
}
