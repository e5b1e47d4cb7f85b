use std::env;
use std::path::{Path, PathBuf};

// Default configuration constants
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_FILE: &str = "panel.json";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "";
pub const DEFAULT_PLATFORM_INDEX: &str = "/dashboard";
pub const DEFAULT_ADMIN_NAME: &str = "Administrator";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@admin.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "password";
pub const DEFAULT_ADMIN_ROLE: &str = "admin";
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

/// How long a fetched update status stays valid before the dashboard asks again.
pub const UPDATE_STATUS_TTL_HOURS: i64 = 24;

/// GitHub `owner/name` whose releases the update checker compares against.
pub const DEFAULT_UPDATE_REPO: &str = "orchidsoftware/platform";

/// Named route the user edit screen returns to after save/remove.
pub const USERS_ROUTE: &str = "/users";

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

pub fn get_data_file() -> PathBuf {
    env::var("DATA_FILE")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string())
        .into()
}

pub fn get_public_base_url() -> String {
    sanitize_base_url(&env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| DEFAULT_PUBLIC_BASE_URL.to_string()))
}

/// Route `loginAs` lands on. Always rooted at `/`.
pub fn get_platform_index() -> String {
    let raw = env::var("PLATFORM_INDEX").unwrap_or_default();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_PLATFORM_INDEX.to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

pub fn get_update_check_enabled() -> bool {
    let raw = env::var("UPDATE_CHECK").ok();
    crate::utils::parse_flag(raw.as_ref(), true)
}

/// `(owner, name)` from `UPDATE_REPO`, falling back to [`DEFAULT_UPDATE_REPO`]
/// when unset or not of the form `owner/name`.
pub fn get_update_repo() -> (String, String) {
    let raw = env::var("UPDATE_REPO").unwrap_or_default();
    parse_update_repo(raw.trim())
        .or_else(|| parse_update_repo(DEFAULT_UPDATE_REPO))
        .unwrap_or_default()
}

pub fn parse_update_repo(raw: &str) -> Option<(String, String)> {
    let (owner, name) = raw.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner.to_string(), name.to_string()))
}

/// Trims whitespace and trailing slashes. Empty keeps links relative to the host.
pub fn sanitize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
