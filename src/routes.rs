use axum::{
    http::header::CONTENT_TYPE,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::models::AppState;

/// Stylesheet compiled into the binary; `--stylesheet` replaces it at runtime.
pub const DEFAULT_STYLESHEET: &str = include_str!("../static/styles.css");

pub fn build_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/dashboard", get(handlers::dashboard::dashboard_get))
        .route("/users", get(handlers::users::users_list))
        .route("/users/create", get(handlers::users::user_create_get))
        .route("/users/create/:method", post(handlers::users::user_create_method))
        .route("/users/:id/edit", get(handlers::users::user_edit_get))
        .route("/users/:id/edit/:method", post(handlers::users::user_edit_method))
        .route("/switch-back", post(handlers::auth::switch_back_post))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            handlers::middleware::auth_middleware,
        ));

    let stylesheet = state
        .custom_css
        .clone()
        .unwrap_or_else(|| DEFAULT_STYLESHEET.to_string());

    Router::new()
        .route("/", get(handlers::auth::root_get))
        .route("/login", get(handlers::auth::login_get).post(handlers::auth::login_post))
        .route("/logout", post(handlers::auth::logout_post))
        .route(
            "/static/styles.css",
            get(move || {
                let css = stylesheet.clone();
                async move { ([(CONTENT_TYPE, "text/css")], css) }
            }),
        )
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
