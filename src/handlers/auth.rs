use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use crate::config::USERS_ROUTE;
use crate::models::{AppState, SessionRecord};
use crate::services::{random_session_id, verify_password};
use crate::templates::LoginTemplate;

use super::helpers::{
    build_current_user, build_template_globals, render_template, session_id_from_jar, TemplateGlobals,
    SESSION_COOKIE,
};

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn login_page(state: &AppState, jar: &CookieJar, email: String, error: Option<String>) -> Response {
    let TemplateGlobals {
        current_user,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(state, jar);
    render_template(LoginTemplate {
        current_user,
        base_url,
        flash_messages,
        has_flash_messages,
        email,
        error,
    })
}

pub async fn login_get(State(state): State<AppState>, jar: CookieJar) -> Response {
    if build_current_user(&state, &jar).is_some() {
        return Redirect::to("/").into_response();
    }
    login_page(&state, &jar, String::new(), None)
}

pub async fn login_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim().to_string();
    let user_id = state
        .directory
        .lock()
        .unwrap()
        .user_by_email(&email)
        .filter(|u| verify_password(&u.password, &form.password))
        .map(|u| u.id);

    let Some(user_id) = user_id else {
        tracing::warn!(%email, "Failed login attempt");
        return login_page(&state, &jar, email, Some("Invalid credentials".into()));
    };

    let sid = random_session_id();
    state
        .sessions
        .lock()
        .unwrap()
        .insert(sid.clone(), SessionRecord::new(user_id));
    tracing::info!(user_id, "User signed in");

    let mut cookie = Cookie::new(SESSION_COOKIE, sid);
    cookie.set_path("/");
    cookie.set_http_only(true);
    (jar.add(cookie), Redirect::to(&state.platform_index)).into_response()
}

pub async fn logout_post(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(sid) = session_id_from_jar(&jar) {
        state.sessions.lock().unwrap().remove(&sid);
        state.flash_store.lock().unwrap().remove(&sid);
    }
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    (jar.remove(cookie), Redirect::to("/login")).into_response()
}

pub async fn root_get(State(state): State<AppState>, jar: CookieJar) -> Response {
    if build_current_user(&state, &jar).is_some() {
        return Redirect::to(&state.platform_index).into_response();
    }
    Redirect::to("/login").into_response()
}

/// Ends a "Login as user" switch and restores the operator's own identity.
pub async fn switch_back_post(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(sid) = session_id_from_jar(&jar) else {
        return Redirect::to("/login").into_response();
    };
    let restored = {
        let mut sessions = state.sessions.lock().unwrap();
        sessions.get_mut(&sid).and_then(|session| {
            let original = session.impersonator.take()?;
            session.user_id = original;
            Some(original)
        })
    };
    match restored {
        Some(user_id) => {
            tracing::info!(user_id, "Switched back to original identity");
            Redirect::to(USERS_ROUTE).into_response()
        }
        None => Redirect::to(&state.platform_index).into_response(),
    }
}
