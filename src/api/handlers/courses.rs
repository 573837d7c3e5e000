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
        state::AppState,
    },
    domain::{Course, Enrollment, EnrollmentWithCourse},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub course_id: Uuid,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Course>>> {
    let courses = state.service_context.course_service.list(params.into()).await?;
    Ok(Json(courses))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(_current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Course>> {
    let course = state.service_context.course_service.get(id).await?;
    Ok(Json(course))
}

pub async fn my_enrollments(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<EnrollmentWithCourse>>> {
    let enrollments = state.service_context.course_service
        .enrollments(&current.user)
        .await?;
    Ok(Json(enrollments))
}

pub async fn enroll(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<Enrollment>)> {
    let enrollment = state.service_context.course_service
        .enroll(&current.user, request.course_id)
        .await?;

    Ok((StatusCode::CREATED, Json(enrollment)))
}

pub async fn unenroll(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    state.service_context.course_service
        .unenroll(&current.user, course_id)
        .await?;

    Ok(Json(MessageResponse::new("Successfully unenrolled from course")))
}
