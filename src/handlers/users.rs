use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::config::USERS_ROUTE;
use crate::error::PanelError;
use crate::models::{AppState, Permission, UserId, UserRow};
use crate::screens::{
    FieldErrors, Presence, Screen, ScreenError, ScreenMethod, UserEditQuery, UserEditRequest, UserEditScreen,
};
use crate::services::persist_directory;
use crate::templates::{UserEditTemplate, UsersPageTemplate};
use crate::utils::parse_urlencoded_body;

use super::helpers::{
    build_template_globals, ensure_permission, referer_path, render_template, render_with_status,
    session_id_from_jar, TemplateGlobals,
};

pub async fn users_list(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(r) = ensure_permission(&state, &jar, Some(Permission::SystemsUsers)) {
        return r;
    }
    let rows: Vec<UserRow> = {
        let dir = state.directory.lock().unwrap();
        dir.users
            .values()
            .map(|u| UserRow {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
                roles: dir
                    .roles_of(u)
                    .iter()
                    .map(|r| r.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect()
    };
    let TemplateGlobals {
        current_user,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(&state, &jar);
    render_template(UsersPageTemplate {
        current_user,
        base_url,
        flash_messages,
        has_flash_messages,
        rows,
    })
}

pub async fn user_create_get(State(state): State<AppState>, jar: CookieJar) -> Result<Response, PanelError> {
    show_screen(&state, &jar, None)
}

pub async fn user_edit_get(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<UserId>,
) -> Result<Response, PanelError> {
    show_screen(&state, &jar, Some(id))
}

pub async fn user_create_method(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Path(method): Path<String>,
    body: Bytes,
) -> Result<Response, PanelError> {
    dispatch(&state, &jar, &headers, None, &method, &body).await
}

pub async fn user_edit_method(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Path((id, method)): Path<(UserId, String)>,
    body: Bytes,
) -> Result<Response, PanelError> {
    dispatch(&state, &jar, &headers, Some(id), &method, &body).await
}

fn form_action(presence: Presence) -> String {
    match presence {
        Presence::New => format!("{}/create", USERS_ROUTE),
        Presence::Existing(id) => format!("{}/{}/edit", USERS_ROUTE, id),
    }
}

fn existing_id(presence: Presence) -> Option<UserId> {
    match presence {
        Presence::New => None,
        Presence::Existing(id) => Some(id),
    }
}

fn render_screen(
    state: &AppState,
    jar: &CookieJar,
    screen: &UserEditScreen,
    query: UserEditQuery,
    errors: FieldErrors,
    status: StatusCode,
) -> Response {
    let TemplateGlobals {
        current_user,
        base_url,
        flash_messages,
        has_flash_messages,
    } = build_template_globals(state, jar);
    render_with_status(
        status,
        UserEditTemplate {
            current_user,
            base_url,
            flash_messages,
            has_flash_messages,
            name: screen.name(),
            description: screen.description(),
            command_bar: screen.command_bar(),
            layout: screen.layout(),
            query,
            errors,
            form_action: form_action(screen.presence()),
        },
    )
}

fn show_screen(state: &AppState, jar: &CookieJar, user: Option<UserId>) -> Result<Response, PanelError> {
    let mut screen = UserEditScreen::new();
    if let Some(r) = ensure_permission(state, jar, screen.permission()) {
        return Ok(r);
    }
    let query = screen.query(&state.directory.lock().unwrap(), user)?;
    Ok(render_screen(state, jar, &screen, query, FieldErrors::new(), StatusCode::OK))
}

/// Re-renders a rejected submission with its field errors as 422.
fn reject(
    state: &AppState,
    jar: &CookieJar,
    screen: &mut UserEditScreen,
    submitted: Option<&UserEditRequest>,
    errors: FieldErrors,
) -> Result<Response, PanelError> {
    let query = {
        let dir = state.directory.lock().unwrap();
        let query = screen.query(&dir, existing_id(screen.presence()))?;
        match submitted {
            Some(request) => query.with_submission(&dir, request),
            None => query,
        }
    };
    tracing::info!(fields = ?errors.keys().collect::<Vec<_>>(), "Rejected user form");
    Ok(render_screen(state, jar, screen, query, errors, StatusCode::UNPROCESSABLE_ENTITY))
}

async fn dispatch(
    state: &AppState,
    jar: &CookieJar,
    headers: &HeaderMap,
    user: Option<UserId>,
    method: &str,
    body: &Bytes,
) -> Result<Response, PanelError> {
    let mut screen = UserEditScreen::new();
    if let Some(r) = ensure_permission(state, jar, screen.permission()) {
        return Ok(r);
    }
    let method = ScreenMethod::from_str(method).ok_or_else(|| PanelError::UnknownMethod(method.to_string()))?;
    screen.query(&state.directory.lock().unwrap(), user)?;
    if !screen.offers(method) {
        return Err(PanelError::UnknownMethod(method.as_str().to_string()));
    }

    let request = UserEditRequest::from_form(&parse_urlencoded_body(body));
    let sid = session_id_from_jar(jar).unwrap_or_default();

    match method {
        ScreenMethod::Save => {
            let saved = screen.save(&mut state.directory.lock().unwrap(), &request);
            match saved {
                Ok(id) => {
                    persist_directory(state).await?;
                    tracing::info!(user_id = id, "User saved");
                    state.push_flash(&sid, "User was saved.");
                    Ok(Redirect::to(USERS_ROUTE).into_response())
                }
                Err(ScreenError::Invalid(errors)) => reject(state, jar, &mut screen, Some(&request), errors),
                Err(ScreenError::Panel(e)) => Err(e),
            }
        }
        ScreenMethod::Remove => {
            let removed = screen.remove(&mut state.directory.lock().unwrap())?;
            persist_directory(state).await?;
            tracing::info!(user_id = removed.id, email = %removed.email, "User removed");
            state.push_flash(&sid, "User was removed");
            state.forget_user(removed.id);
            Ok(Redirect::to(USERS_ROUTE).into_response())
        }
        ScreenMethod::LoginAs => {
            let switched = {
                let dir = state.directory.lock().unwrap();
                let mut sessions = state.sessions.lock().unwrap();
                match sessions.get_mut(&sid) {
                    Some(session) => Some(screen.login_as(&dir, session)?),
                    None => None,
                }
            };
            match switched {
                Some(user_id) => {
                    tracing::info!(user_id, "Session switched to user");
                    Ok(Redirect::to(&state.platform_index).into_response())
                }
                None => Ok(Redirect::to("/login").into_response()),
            }
        }
        ScreenMethod::ChangePassword => {
            let changed = screen.change_password(&mut state.directory.lock().unwrap(), &request);
            match changed {
                Ok(()) => {
                    persist_directory(state).await?;
                    tracing::info!(user_id = ?existing_id(screen.presence()), "Password changed");
                    state.push_flash(&sid, "User was saved.");
                    let back = referer_path(headers).unwrap_or_else(|| form_action(screen.presence()));
                    Ok(Redirect::to(&back).into_response())
                }
                Err(ScreenError::Invalid(errors)) => reject(state, jar, &mut screen, None, errors),
                Err(ScreenError::Panel(e)) => Err(e),
            }
        }
    }
}
