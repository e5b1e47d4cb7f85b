use axum::http::{header::REFERER, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::error::PanelError;
use crate::models::{AppState, CurrentUser, Permission, SessionRecord};
use crate::services::has_access;

pub const SESSION_COOKIE: &str = "session_id";

pub fn session_id_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

pub fn current_session(state: &AppState, jar: &CookieJar) -> Option<SessionRecord> {
    let sid = session_id_from_jar(jar)?;
    state.sessions.lock().unwrap().get(&sid).cloned()
}

/// Signed-in user behind the request. A session whose user was deleted counts
/// as signed out.
pub fn build_current_user(state: &AppState, jar: &CookieJar) -> Option<CurrentUser> {
    let session = current_session(state, jar)?;
    let dir = state.directory.lock().unwrap();
    let rec = dir.user(session.user_id)?;
    Some(CurrentUser {
        id: rec.id,
        name: rec.name.clone(),
        email: rec.email.clone(),
        impersonating: session.impersonator.is_some(),
    })
}

pub fn take_flash_messages(state: &AppState, jar: &CookieJar) -> Vec<String> {
    let Some(sid) = session_id_from_jar(jar) else {
        return vec![];
    };
    state.flash_store.lock().unwrap().remove(&sid).unwrap_or_default()
}

#[derive(Default)]
pub struct TemplateGlobals {
    pub current_user: Option<CurrentUser>,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
}

pub fn build_template_globals(state: &AppState, jar: &CookieJar) -> TemplateGlobals {
    let current_user = build_current_user(state, jar);
    let flash_messages = take_flash_messages(state, jar);
    let has_flash_messages = !flash_messages.is_empty();
    TemplateGlobals {
        current_user,
        base_url: state.public_base_url.clone(),
        flash_messages,
        has_flash_messages,
    }
}

pub fn render_template<T: askama::Template>(t: T) -> Response {
    render_with_status(StatusCode::OK, t)
}

pub fn render_with_status<T: askama::Template>(status: StatusCode, t: T) -> Response {
    match t.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => PanelError::from(e).into_response(),
    }
}

/// `None` when the request may proceed; otherwise the response to send instead.
pub fn ensure_permission(state: &AppState, jar: &CookieJar, permission: Option<Permission>) -> Option<Response> {
    let Some(session) = current_session(state, jar) else {
        return Some(Redirect::to("/login").into_response());
    };
    let Some(permission) = permission else {
        return None;
    };
    let allowed = has_access(&state.directory.lock().unwrap(), session.user_id, permission);
    if allowed {
        return None;
    }
    tracing::warn!(user_id = session.user_id, permission = permission.slug(), "Access denied");
    Some(
        (
            StatusCode::FORBIDDEN,
            Html("<!DOCTYPE html><html><body><h1>403</h1><p>Access denied</p></body></html>"),
        )
            .into_response(),
    )
}

/// Path of the `Referer` header, with any scheme and host dropped so the
/// redirect cannot leave the panel.
pub fn referer_path(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(REFERER)?.to_str().ok()?.trim();
    let path = match raw.find("://") {
        Some(idx) => {
            let rest = &raw[idx + 3..];
            &rest[rest.find('/')?..]
        }
        None => raw,
    };
    if !path.starts_with('/') || path.starts_with("//") {
        return None;
    }
    Some(path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(referer: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(REFERER, HeaderValue::from_str(referer).unwrap());
        h
    }

    #[test]
    fn referer_keeps_only_the_path() {
        assert_eq!(
            referer_path(&headers("http://panel.test/users/3/edit?tab=1")).as_deref(),
            Some("/users/3/edit?tab=1")
        );
        assert_eq!(referer_path(&headers("/users")).as_deref(), Some("/users"));
        assert_eq!(referer_path(&headers("https://evil.test")), None);
        assert_eq!(referer_path(&headers("//evil.test/x")), None);
        assert_eq!(referer_path(&HeaderMap::new()), None);
    }
}
