use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::handlers::helpers::build_current_user;
use crate::models::AppState;

/// Lets the request through only when its session resolves to a stored user.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if build_current_user(&state, &jar).is_some() {
        next.run(request).await
    } else {
        Redirect::to("/login").into_response()
    }
}
