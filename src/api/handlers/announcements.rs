use axum::{
    extract::State,
    http::StatusCode,
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{
        extract::{Json, Path, Query},
        handlers::{ListParams, MessageResponse},
        middleware::auth::CurrentUser,
        multipart::FormData,
        state::AppState,
    },
    domain::{AnnouncementView, CommentWithAuthor, CreateAnnouncement, Reaction, UpdateAnnouncement},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct ReactRequest {
    pub reaction_type: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

pub async fn list_for_course(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<AnnouncementView>>> {
    let announcements = state.service_context.announcement_service
        .list_for_course(&current.user, course_id, params.into())
        .await?;
    Ok(Json(announcements))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    mut form: FormData,
) -> Result<(StatusCode, Json<AnnouncementView>)> {
    let request = CreateAnnouncement {
        course_id: form.required_id("course_id")?,
        title: form.required_text("title")?,
        content: form.required_text("content")?,
    };
    let image = form.take_file("image");

    let view = state.service_context.announcement_service
        .create(&current.user, request, image)
        .await?;

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnnouncementView>> {
    let view = state.service_context.announcement_service
        .get(&current.user, id)
        .await?;
    Ok(Json(view))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    mut form: FormData,
) -> Result<Json<AnnouncementView>> {
    let request = UpdateAnnouncement {
        title: form.text("title"),
        content: form.text("content"),
    };
    let image = form.take_file("image");

    let view = state.service_context.announcement_service
        .update(&current.user, id, request, image)
        .await?;
    Ok(Json(view))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    state.service_context.announcement_service
        .delete(&current.user, id)
        .await?;
    Ok(Json(MessageResponse::new("Announcement deleted successfully")))
}

pub async fn react(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReactRequest>,
) -> Result<Json<Reaction>> {
    let reaction = state.service_context.reaction_service
        .react(&current.user, id, &request.reaction_type)
        .await?;
    Ok(Json(reaction))
}

pub async fn remove_reaction(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    state.service_context.reaction_service
        .remove(&current.user, id)
        .await?;
    Ok(Json(MessageResponse::new("Reaction removed successfully")))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<CommentWithAuthor>>> {
    let comments = state.service_context.comment_service
        .list(&current.user, id, params.into())
        .await?;
    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentWithAuthor>)> {
    let comment = state.service_context.comment_service
        .create(&current.user, id, &request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
