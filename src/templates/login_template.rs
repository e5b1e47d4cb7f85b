use askama::Template;
use crate::models::CurrentUser;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub current_user: Option<CurrentUser>,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
    /// Echoed back into the email field after a failed attempt.
    pub email: String,
    pub error: Option<String>,
}

crate::impl_base_template!(LoginTemplate);
