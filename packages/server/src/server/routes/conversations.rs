//! Conversation and message endpoints.

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::{ConversationId, CoreError, CoreResult, ProfileId, SessionId};
use crate::domains::conversations::actions::post_message;
use crate::domains::conversations::models::{Conversation, Message};
use crate::server::app::AxumAppState;
use crate::server::middleware::{require_user, AuthUser};

#[derive(Serialize)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub unread_count: i64,
}

/// GET /api/conversations - the caller's conversations, most recent first,
/// each with its unread count.
pub async fn list_conversations(
    Extension(state): Extension<AxumAppState>,
    user: Option<Extension<AuthUser>>,
) -> CoreResult<Json<Vec<ConversationSummary>>> {
    let user = require_user(user.as_deref())?;

    let conversations =
        Conversation::list_for_profile(user.profile_id, &state.db_pool).await?;

    let mut summaries = Vec::with_capacity(conversations.len());
    for conversation in conversations {
        let unread_count =
            Message::unread_count(conversation.id, user.profile_id, &state.db_pool).await?;
        summaries.push(ConversationSummary {
            conversation,
            unread_count,
        });
    }
    Ok(Json(summaries))
}

#[derive(Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<i64>,
}

/// GET /api/conversations/:id/messages - chronological history.
///
/// Participants get their inbound messages marked read as a side effect;
/// admin reads are passive and leave read state alone.
pub async fn get_messages(
    Extension(state): Extension<AxumAppState>,
    user: Option<Extension<AuthUser>>,
    Path(conversation_id): Path<ConversationId>,
    Query(query): Query<MessagesQuery>,
) -> CoreResult<Json<Vec<Message>>> {
    let user = require_user(user.as_deref())?;

    let conversation = Conversation::find_by_id(conversation_id, &state.db_pool)
        .await?
        .ok_or(CoreError::NotFound("conversation"))?;
    let is_participant = conversation.contains(user.profile_id);
    if !is_participant && !user.is_admin {
        return Err(CoreError::NotAuthorized(
            "not a participant in this conversation".to_string(),
        ));
    }

    if is_participant {
        Message::mark_read(conversation_id, user.profile_id, &state.db_pool).await?;
    }

    let messages =
        Message::find_by_conversation(conversation_id, query.limit, &state.db_pool).await?;
    Ok(Json(messages))
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub receiver_id: ProfileId,
    pub content: String,
    /// Stream session of the sender, used to suppress the SSE echo.
    pub session: Option<SessionId>,
}

/// POST /api/messages - send a message, creating the conversation on first
/// contact. The response carries the post-moderation content.
pub async fn send_message(
    Extension(state): Extension<AxumAppState>,
    user: Option<Extension<AuthUser>>,
    Json(body): Json<SendMessageRequest>,
) -> CoreResult<Json<Message>> {
    let user = require_user(user.as_deref())?;

    let message = post_message(
        &state.deps,
        user.profile_id,
        body.receiver_id,
        &body.content,
        body.session,
    )
    .await?;
    Ok(Json(message))
}
