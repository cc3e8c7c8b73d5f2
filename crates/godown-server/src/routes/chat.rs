use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;
use godown_core::chat::ChatReply;

#[derive(serde::Deserialize)]
pub struct ChatBody {
    pub message: String,
    pub user_id: String,
}

/// POST /api/chat — run one message through the decision pipeline.
pub async fn chat(
    State(app): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatReply>, AppError> {
    if body.user_id.trim().is_empty() {
        return Err(AppError::bad_request("user_id must not be empty"));
    }
    let reply = app.pipeline.handle(&body.message, &body.user_id).await;
    Ok(Json(reply))
}
