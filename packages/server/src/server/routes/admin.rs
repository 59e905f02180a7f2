//! Admin override endpoints. Every handler here requires the admin claim.

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Deserialize;

use crate::common::{ConversationId, CoreResult};
use crate::domains::conversations::actions::{admin_post_message, set_conversation_frozen};
use crate::domains::conversations::models::{Conversation, Message};
use crate::server::app::AxumAppState;
use crate::server::middleware::{require_admin, AuthUser};

#[derive(Deserialize)]
pub struct AdminListQuery {
    pub limit: Option<i64>,
}

/// GET /api/admin/conversations - recent conversations across the platform.
pub async fn list_conversations(
    Extension(state): Extension<AxumAppState>,
    user: Option<Extension<AuthUser>>,
    Query(query): Query<AdminListQuery>,
) -> CoreResult<Json<Vec<Conversation>>> {
    require_admin(user.as_deref())?;

    let conversations =
        Conversation::list_recent(query.limit.unwrap_or(100), &state.db_pool).await?;
    Ok(Json(conversations))
}

#[derive(Deserialize)]
pub struct AdminMessageRequest {
    pub content: String,
}

/// POST /api/admin/conversations/:id/messages - post an administrator notice,
/// bypassing moderation and the freeze flag.
pub async fn post_message(
    Extension(state): Extension<AxumAppState>,
    user: Option<Extension<AuthUser>>,
    Path(conversation_id): Path<ConversationId>,
    Json(body): Json<AdminMessageRequest>,
) -> CoreResult<Json<Message>> {
    let admin = require_admin(user.as_deref())?;

    let message =
        admin_post_message(&state.deps, conversation_id, admin.profile_id, &body.content).await?;
    Ok(Json(message))
}

/// POST /api/admin/conversations/:id/freeze
pub async fn freeze(
    Extension(state): Extension<AxumAppState>,
    user: Option<Extension<AuthUser>>,
    Path(conversation_id): Path<ConversationId>,
) -> CoreResult<Json<Conversation>> {
    require_admin(user.as_deref())?;

    let conversation = set_conversation_frozen(&state.deps, conversation_id, true).await?;
    Ok(Json(conversation))
}

/// POST /api/admin/conversations/:id/unfreeze - the only path that lifts a
/// freeze.
pub async fn unfreeze(
    Extension(state): Extension<AxumAppState>,
    user: Option<Extension<AuthUser>>,
    Path(conversation_id): Path<ConversationId>,
) -> CoreResult<Json<Conversation>> {
    require_admin(user.as_deref())?;

    let conversation = set_conversation_frozen(&state.deps, conversation_id, false).await?;
    Ok(Json(conversation))
}
