use axum::{
    extract::State,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::models::AppState;
use crate::screens::{PlatformScreen, Screen};
use crate::templates::DashboardTemplate;

use super::helpers::{build_template_globals, ensure_permission, render_template, TemplateGlobals};

pub async fn dashboard_get(State(state): State<AppState>, jar: CookieJar) -> Response {
    let screen = PlatformScreen;
    if let Some(r) = ensure_permission(&state, &jar, screen.permission()) {
        return r;
    }
    let query = screen.query(&state).await;
    let TemplateGlobals {
        current_user,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(&state, &jar);
    render_template(DashboardTemplate {
        current_user,
        base_url,
        flash_messages,
        has_flash_messages,
        name: screen.name(),
        description: screen.description(),
        command_bar: screen.command_bar(),
        layout: screen.layout(),
        status: query.status,
        form_action: state.platform_index.clone(),
    })
}
