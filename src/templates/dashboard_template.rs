use askama::Template;
use crate::models::CurrentUser;
use crate::screens::{Action, Layout, ViewPartial};
use crate::update::UpdateStatus;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub current_user: Option<CurrentUser>,
    pub base_url: String,
    pub flash_messages: Vec<String>,
    pub has_flash_messages: bool,
    pub name: &'static str,
    pub description: &'static str,
    pub command_bar: Vec<Action>,
    pub layout: Vec<Layout>,
    pub status: Option<UpdateStatus>,
    /// Screen methods post to `<form_action>/<method>`.
    pub form_action: String,
}

impl DashboardTemplate {
    pub fn shows_update_status(&self) -> bool {
        self.layout.iter().any(|l| l.is_view(ViewPartial::UpdateStatus))
    }
}

crate::impl_base_template!(DashboardTemplate);
