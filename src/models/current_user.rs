use serde::{Deserialize, Serialize};

use super::user_record::UserId;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub impersonating: bool,
}
