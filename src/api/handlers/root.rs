use axum::{http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Courseboard API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Courses, announcements and learning materials for professors and students",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "auth": "/api/auth",
            "courses": "/api/courses",
            "announcements": "/api/announcements",
            "comments": "/api/comments",
            "materials": "/api/materials"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
