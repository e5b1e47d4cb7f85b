// Base template trait shared by every page
pub mod base_template;
pub use base_template::BaseTemplate;

pub mod dashboard_template;
pub mod login_template;
pub mod user_edit_template;
pub mod users_page_template;

pub use dashboard_template::DashboardTemplate;
pub use login_template::LoginTemplate;
pub use user_edit_template::UserEditTemplate;
pub use users_page_template::UsersPageTemplate;
