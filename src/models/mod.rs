pub mod app_state;
pub mod current_user;
pub mod directory;
pub mod permission;
pub mod role_record;
pub mod session;
pub mod user_record;
pub mod user_row;

pub use app_state::AppState;
pub use current_user::CurrentUser;
pub use directory::Directory;
pub use permission::Permission;
pub use role_record::{RoleId, RoleRecord};
pub use session::SessionRecord;
pub use user_record::{UserId, UserRecord};
pub use user_row::UserRow;
