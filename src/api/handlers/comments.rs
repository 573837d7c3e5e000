use axum::{extract::State, Extension};
use uuid::Uuid;

use crate::{
    api::{
        extract::{Json, Path},
        handlers::{announcements::CommentRequest, MessageResponse},
        middleware::auth::CurrentUser,
        state::AppState,
    },
    domain::CommentWithAuthor,
    error::Result,
};

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<CommentRequest>,
) -> Result<Json<CommentWithAuthor>> {
    let comment = state.service_context.comment_service
        .update(&current.user, id, &request.content)
        .await?;
    Ok(Json(comment))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    state.service_context.comment_service
        .delete(&current.user, id)
        .await?;
    Ok(Json(MessageResponse::new("Comment deleted successfully")))
}
