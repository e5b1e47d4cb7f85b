use askama::Template;
use crate::models::CurrentUser;
use crate::screens::{Action, FieldErrors, Layout, UserEditQuery};

#[derive(Template)]
#[template(path = "user_edit.html")]
pub struct UserEditTemplate {
    pub current_user: Option<CurrentUser>,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
    pub name: &'static str,
    pub description: &'static str,
    pub command_bar: Vec<Action>,
    pub layout: Vec<Layout>,
    pub query: UserEditQuery,
    pub errors: FieldErrors,
    /// `/users/create` or `/users/<id>/edit`; methods post below it.
    pub form_action: String,
}

impl UserEditTemplate {
    pub fn error_for(&self, field: &str) -> &str {
        self.errors.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Method the modal registered under `key` posts to, taken from its toggle.
    pub fn modal_method(&self, key: &str) -> &'static str {
        fn find(actions: &[Action], key: &str) -> Option<&'static str> {
            actions.iter().find_map(|a| {
                if a.modal() == Some(key) {
                    Some(a.method_name())
                } else {
                    find(a.children(), key)
                }
            })
        }
        find(&self.command_bar, key).unwrap_or("")
    }
}

crate::impl_base_template!(UserEditTemplate);
