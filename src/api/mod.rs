pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod multipart;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    Router,
    routing::{get, post, put},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

/// Headroom for the non-file parts of a multipart upload.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    settings: Arc<Settings>,
) -> Router {
    let body_limit = settings.uploads.max_file_size + FORM_OVERHEAD_BYTES;
    let app_state = AppState::new(service_context);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // API routes
        .nest("/api", api_routes(app_state.clone()))

        // Add state to the router
        .with_state(app_state)

        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(state.clone()))
        .nest("/courses", course_routes(state.clone()))
        .nest("/announcements", announcement_routes(state.clone()))
        .nest("/comments", comment_routes(state.clone()))
        .nest("/materials", material_routes(state))
}

fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        // Protected routes
        .merge(Router::new()
            .route("/me", get(handlers::auth::me))
            .route_layer(axum::middleware::from_fn_with_state(
                state,
                middleware::auth::require_auth,
            ))
        )
}

fn course_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public catalogue
        .route("/", get(handlers::courses::list))
        // Protected routes
        .merge(Router::new()
            .route("/my-enrollments", get(handlers::courses::my_enrollments))
            .route("/enroll", post(handlers::courses::enroll))
            .route("/unenroll/:course_id", axum::routing::delete(handlers::courses::unenroll))
            .route("/:id", get(handlers::courses::get))
            .route_layer(axum::middleware::from_fn_with_state(
                state,
                middleware::auth::require_auth,
            ))
        )
}

fn announcement_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::announcements::create))
        .route("/course/:course_id", get(handlers::announcements::list_for_course))
        .route(
            "/:id",
            get(handlers::announcements::get)
                .put(handlers::announcements::update)
                .delete(handlers::announcements::delete),
        )
        .route(
            "/:id/react",
            post(handlers::announcements::react).delete(handlers::announcements::remove_reaction),
        )
        .route(
            "/:id/comments",
            get(handlers::announcements::list_comments).post(handlers::announcements::create_comment),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn comment_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/:id",
            put(handlers::comments::update).delete(handlers::comments::delete),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn material_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::materials::create))
        .route("/course/:course_id", get(handlers::materials::list_for_course))
        .route(
            "/:id",
            get(handlers::materials::get).delete(handlers::materials::delete),
        )
        .route("/:id/download", get(handlers::materials::download))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}
