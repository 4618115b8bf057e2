use axum::extract::State;
use axum::Json;
use mineruca_core::chat::{restaurant_context, trim_history, ChatMessage, ChatRequest};
use serde::Serialize;

use crate::error::AppResult;
use crate::handlers::restaurant::find_owned;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: ChatMessage,
}

/// POST /api/v1/chat
///
/// One conversational turn. The client keeps the history and sends it back
/// each time; only the most recent turns are forwarded to the model. When
/// `restaurant_id` names one of the caller's favorites, its details are
/// given to the model as context.
pub async fn chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ChatRequest>,
) -> AppResult<Json<DataResponse<ChatReply>>> {
    input.validate()?;

    let context = match input.restaurant_id {
        Some(id) => Some(restaurant_context(
            &find_owned(&state.pool, id, auth.user_id).await?,
        )),
        None => None,
    };
    let history = trim_history(&input.history, state.config.chat_history_limit);

    let reply = state
        .gemini
        .chat(&history, input.message.trim(), context.as_deref())
        .await?;

    Ok(Json(DataResponse {
        data: ChatReply {
            reply: ChatMessage::model(reply),
        },
    }))
}
