use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::{parse_update_repo, DEFAULT_PLATFORM_INDEX, DEFAULT_PUBLIC_BASE_URL, DEFAULT_UPDATE_REPO};
use crate::models::directory::Directory;
use crate::models::session::SessionRecord;
use crate::models::user_record::UserId;
use crate::update::UpdateStatus;

#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<Mutex<Directory>>,
    /// File the directory is persisted to after every mutation.
    pub data_path: PathBuf,
    /// Held from snapshot to rename so writes land in lock order.
    pub persist_lock: Arc<tokio::sync::Mutex<()>>,
    pub sessions: Arc<Mutex<HashMap<String, SessionRecord>>>,
    /// Toast messages keyed by session id, drained on the next render.
    pub flash_store: Arc<Mutex<HashMap<String, Vec<String>>>>,
    pub update_status: Arc<Mutex<Option<UpdateStatus>>>,
    pub update_check_enabled: bool,
    /// `(owner, name)` of the GitHub repository releases are checked against.
    pub update_repo: (String, String),
    pub platform_index: String,
    pub public_base_url: String,
    /// Served at `/static/styles.css` in place of the embedded stylesheet.
    pub custom_css: Option<String>,
}

impl AppState {
    pub fn new(directory: Directory, data_path: PathBuf) -> Self {
        AppState {
            directory: Arc::new(Mutex::new(directory)),
            data_path,
            persist_lock: Arc::new(tokio::sync::Mutex::new(())),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            flash_store: Arc::new(Mutex::new(HashMap::new())),
            update_status: Arc::new(Mutex::new(None)),
            update_check_enabled: true,
            update_repo: parse_update_repo(DEFAULT_UPDATE_REPO).unwrap_or_default(),
            platform_index: DEFAULT_PLATFORM_INDEX.to_string(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            custom_css: None,
        }
    }

    /// Queues a toast for the session behind `sid`.
    pub fn push_flash(&self, sid: &str, message: impl Into<String>) {
        self.flash_store
            .lock()
            .unwrap()
            .entry(sid.to_string())
            .or_default()
            .push(message.into());
    }

    /// Drops every session signed in as, or impersonated by, `user_id`, and
    /// toasts queued for sessions that no longer exist.
    pub fn forget_user(&self, user_id: UserId) -> usize {
        let live: HashSet<String> = {
            let mut sessions = self.sessions.lock().unwrap();
            let before = sessions.len();
            sessions.retain(|_, s| s.user_id != user_id && s.impersonator != Some(user_id));
            tracing::debug!(user_id, dropped = before - sessions.len(), "Pruned sessions");
            sessions.keys().cloned().collect()
        };
        let mut flashes = self.flash_store.lock().unwrap();
        let before = flashes.len();
        flashes.retain(|sid, _| live.contains(sid));
        before - flashes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forget_user_drops_their_sessions_and_toasts() {
        let state = AppState::new(Directory::default(), "unused.json".into());
        {
            let mut sessions = state.sessions.lock().unwrap();
            sessions.insert("own".into(), SessionRecord::new(2));
            sessions.insert("other".into(), SessionRecord::new(1));
            sessions.insert(
                "borrowed".into(),
                SessionRecord {
                    user_id: 1,
                    impersonator: Some(2),
                },
            );
        }
        state.push_flash("own", "stale");
        state.push_flash("other", "kept");

        assert_eq!(state.forget_user(2), 1);
        let sessions = state.sessions.lock().unwrap();
        assert_eq!(sessions.keys().collect::<Vec<_>>(), vec!["other"]);
        let flashes = state.flash_store.lock().unwrap();
        assert_eq!(flashes.get("other"), Some(&vec!["kept".to_string()]));
        assert!(!flashes.contains_key("own"));
    }
}
