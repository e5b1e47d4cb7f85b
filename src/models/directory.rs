use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::role_record::{RoleId, RoleRecord};
use super::user_record::{UserId, UserRecord};

/// Every user and role known to the panel. Serialized as-is to the data file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub users: BTreeMap<UserId, UserRecord>,
    #[serde(default)]
    pub roles: BTreeMap<RoleId, RoleRecord>,
}

impl Directory {
    pub fn user(&self, id: UserId) -> Option<&UserRecord> {
        self.users.get(&id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut UserRecord> {
        self.users.get_mut(&id)
    }

    /// Emails are compared case-insensitively.
    pub fn user_by_email(&self, email: &str) -> Option<&UserRecord> {
        let needle = email.trim();
        self.users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(needle))
    }

    pub fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.user_by_email(email)
            .map(|u| Some(u.id) != except)
            .unwrap_or(false)
    }

    pub fn next_user_id(&self) -> UserId {
        self.users.keys().next_back().map(|id| id + 1).unwrap_or(1)
    }

    pub fn insert_user(&mut self, user: UserRecord) {
        self.users.insert(user.id, user);
    }

    pub fn remove_user(&mut self, id: UserId) -> Option<UserRecord> {
        self.users.remove(&id)
    }

    pub fn role(&self, id: RoleId) -> Option<&RoleRecord> {
        self.roles.get(&id)
    }

    pub fn role_by_slug(&self, slug: &str) -> Option<&RoleRecord> {
        self.roles.values().find(|r| r.slug == slug)
    }

    pub fn next_role_id(&self) -> RoleId {
        self.roles.keys().next_back().map(|id| id + 1).unwrap_or(1)
    }

    pub fn insert_role(&mut self, role: RoleRecord) {
        self.roles.insert(role.id, role);
    }

    /// Roles attached to `user`, in role id order. Dangling ids are skipped.
    pub fn roles_of(&self, user: &UserRecord) -> Vec<RoleRecord> {
        let mut roles: Vec<RoleRecord> = user
            .roles
            .iter()
            .filter_map(|id| self.roles.get(id).cloned())
            .collect();
        roles.sort_by_key(|r| r.id);
        roles
    }

    /// Replaces the role associations of `id` with `role_ids`.
    ///
    /// Unknown role ids are dropped and duplicates collapsed. Returns `false`
    /// when the user does not exist.
    pub fn replace_roles(&mut self, id: UserId, role_ids: &[RoleId]) -> bool {
        let mut known: Vec<RoleId> = role_ids
            .iter()
            .copied()
            .filter(|rid| self.roles.contains_key(rid))
            .collect();
        known.sort_unstable();
        known.dedup();
        match self.users.get_mut(&id) {
            Some(user) => {
                user.roles = known;
                true
            }
            None => false,
        }
    }
}
