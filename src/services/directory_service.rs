use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_NAME, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_ROLE};
use crate::error::PanelError;
use crate::models::{AppState, Directory, Permission, RoleRecord, UserRecord};

use super::user_service::generate_password_hash;

/// Directory written on first start: an `admin` role granting every
/// registered permission and one administrator holding that role.
pub fn seed_directory() -> Directory {
    let mut dir = Directory::default();
    let grants: BTreeMap<String, bool> = Permission::all()
        .iter()
        .map(|p| (p.slug().to_string(), true))
        .collect();
    let role_id = dir.next_role_id();
    dir.insert_role(RoleRecord {
        id: role_id,
        slug: DEFAULT_ADMIN_ROLE.to_string(),
        name: "Administrator".to_string(),
        permissions: grants,
    });
    let user_id = dir.next_user_id();
    dir.insert_user(UserRecord {
        id: user_id,
        name: DEFAULT_ADMIN_NAME.to_string(),
        email: DEFAULT_ADMIN_EMAIL.to_string(),
        password: generate_password_hash(DEFAULT_ADMIN_PASSWORD),
        roles: vec![role_id],
        permissions: BTreeMap::new(),
    });
    dir
}

/// Reads the data file, seeding it when it does not exist yet.
pub async fn load_directory(path: &Path) -> Result<Directory, PanelError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            let dir: Directory = serde_json::from_str(&text)?;
            tracing::info!(
                path = %path.display(),
                users = dir.users.len(),
                roles = dir.roles.len(),
                "Loaded directory"
            );
            Ok(dir)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let dir = seed_directory();
            write_directory(path, &dir).await?;
            tracing::warn!(
                path = %path.display(),
                email = DEFAULT_ADMIN_EMAIL,
                "Data file missing; seeded default administrator"
            );
            Ok(dir)
        }
        Err(e) => Err(e.into()),
    }
}

/// Writes to a sibling `.tmp` file and renames it over `path`, so readers
/// never see a partially written file.
async fn write_directory(path: &Path, dir: &Directory) -> Result<(), PanelError> {
    let text = serde_json::to_string_pretty(dir)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, text).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Writes the current in-memory directory to the state's data file.
///
/// Concurrent callers are serialized on `persist_lock`, and each snapshot is
/// taken under it, so the last write always carries the newest directory.
pub async fn persist_directory(state: &AppState) -> Result<(), PanelError> {
    let _guard = state.persist_lock.lock().await;
    // the directory mutex is released before the write
    let snapshot = state.directory.lock().unwrap().clone();
    write_directory(&state.data_path, &snapshot).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::verify_password;

    #[test]
    fn seed_grants_every_permission_through_the_admin_role() {
        let dir = seed_directory();
        let admin = dir.user_by_email(DEFAULT_ADMIN_EMAIL).unwrap();
        assert!(verify_password(&admin.password, DEFAULT_ADMIN_PASSWORD));
        let roles = dir.roles_of(admin);
        assert_eq!(roles.len(), 1);
        for p in Permission::all() {
            assert_eq!(roles[0].permissions.get(p.slug()), Some(&true));
        }
    }

    #[tokio::test]
    async fn load_seeds_a_missing_file_and_reads_it_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("panel.json");

        let first = load_directory(&path).await.unwrap();
        assert!(path.exists());
        let second = load_directory(&path).await.unwrap();
        assert_eq!(first.users.len(), second.users.len());
        assert_eq!(
            first.user_by_email(DEFAULT_ADMIN_EMAIL).unwrap().password,
            second.user_by_email(DEFAULT_ADMIN_EMAIL).unwrap().password
        );
    }

    #[tokio::test]
    async fn load_rejects_corrupt_files() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("panel.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_directory(&path).await, Err(PanelError::Json(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_persists_leave_the_newest_valid_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("panel.json");
        let state = AppState::new(seed_directory(), path.clone());

        let mut tasks = Vec::new();
        for i in 0..16u64 {
            let state = state.clone();
            tasks.push(tokio::spawn(async move {
                {
                    let mut dir = state.directory.lock().unwrap();
                    if i % 2 == 0 {
                        let id = dir.next_user_id();
                        dir.insert_user(UserRecord {
                            id,
                            name: "x".repeat(200),
                            email: format!("user{}@example.com", i),
                            password: String::new(),
                            roles: vec![],
                            permissions: BTreeMap::new(),
                        });
                    } else {
                        let last = dir.users.keys().last().copied();
                        if let Some(id) = last.filter(|id| *id > 1) {
                            dir.remove_user(id);
                        }
                    }
                }
                persist_directory(&state).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let on_disk = load_directory(&path).await.unwrap();
        let in_memory = state.directory.lock().unwrap().clone();
        let mut disk_ids: Vec<_> = on_disk.users.keys().copied().collect();
        let mut memory_ids: Vec<_> = in_memory.users.keys().copied().collect();
        disk_ids.sort();
        memory_ids.sort();
        assert_eq!(disk_ids, memory_ids);
        assert!(!tmp.path().join("panel.json.tmp").exists());
    }
}
