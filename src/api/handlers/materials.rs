use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::{
    api::{
        extract::{Json, Path, Query},
        handlers::{ListParams, MessageResponse},
        middleware::auth::CurrentUser,
        multipart::FormData,
        state::AppState,
    },
    domain::{CreateMaterial, Material},
    error::{AppError, Result},
};

pub async fn list_for_course(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Material>>> {
    let materials = state.service_context.material_service
        .list_for_course(&current.user, course_id, params.into())
        .await?;
    Ok(Json(materials))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    mut form: FormData,
) -> Result<(StatusCode, Json<Material>)> {
    let request = CreateMaterial {
        course_id: form.required_id("course_id")?,
        title: form.required_text("title")?,
        description: form.text("description"),
    };
    let file = form
        .take_file("file")
        .ok_or_else(|| AppError::Validation("Missing field: file".to_string()))?;

    let material = state.service_context.material_service
        .create(&current.user, request, file)
        .await?;

    Ok((StatusCode::CREATED, Json(material)))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Material>> {
    let material = state.service_context.material_service
        .get(&current.user, id)
        .await?;
    Ok(Json(material))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    state.service_context.material_service
        .delete(&current.user, id)
        .await?;
    Ok(Json(MessageResponse::new("Learning material deleted successfully")))
}

pub async fn download(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let (material, path) = state.service_context.material_service
        .download(&current.user, id)
        .await?;

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| AppError::NotFound("File not found on server".to_string()))?;

    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&material.file_name).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", header_safe_name(&material.file_name)),
            ),
        ],
        body,
    )
        .into_response())
}

fn content_type_for(file_name: &str) -> &'static str {
    match file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "pdf" => "application/pdf",
        Some(ext) if ext == "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

// Quotes and control characters would break out of the header value.
fn header_safe_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| if c == '"' || c == '\\' || !c.is_ascii() || c.is_ascii_control() { '_' } else { c })
        .collect()
}
