use serde::{Deserialize, Serialize};

use super::user_record::UserId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub roles: String,
}
