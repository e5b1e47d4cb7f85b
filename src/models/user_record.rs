use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::role_record::RoleId;

pub type UserId = u64;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// pbkdf2 hash, see `services::generate_password_hash`.
    pub password: String,
    #[serde(default)]
    pub roles: Vec<RoleId>,
    #[serde(default)]
    pub permissions: BTreeMap<String, bool>,
}
