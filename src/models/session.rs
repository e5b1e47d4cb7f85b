use super::user_record::UserId;

/// Server-side state behind a `session_id` cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRecord {
    /// Identity the session currently acts as.
    pub user_id: UserId,
    /// Operator who switched into `user_id` through "Login as user".
    pub impersonator: Option<UserId>,
}

impl SessionRecord {
    pub fn new(user_id: UserId) -> Self {
        SessionRecord {
            user_id,
            impersonator: None,
        }
    }
}
