use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    api::state::AppState,
    domain::User,
    error::AppError,
};

#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
}

/// Resolve the bearer token to an active user and expose it to handlers as
/// `Extension<CurrentUser>`.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let user = state.service_context.user_service
        .authenticate(bearer.token())
        .await?;

    // Insert current user into request extensions
    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}
