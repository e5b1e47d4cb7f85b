//! Screens: a screen declares its query data, command bar and layout; the
//! handlers in `crate::handlers` render it and dispatch its methods.

pub mod action;
pub mod field;
pub mod layout;
pub mod method;
pub mod platform_screen;
pub mod user_edit_screen;

pub use action::{Action, Button, DropDown, ModalToggle};
pub use field::{Field, FieldKind, SelectOption};
pub use layout::{Layout, Modal, ViewPartial};
pub use method::ScreenMethod;
pub use platform_screen::{PlatformQuery, PlatformScreen};
pub use user_edit_screen::{
    FieldErrors, Presence, ScreenError, UserEditQuery, UserEditRequest, UserEditScreen, UserInput, UserView,
};

use crate::models::Permission;

pub trait Screen {
    /// Header name.
    fn name(&self) -> &'static str;

    /// Header description.
    fn description(&self) -> &'static str;

    /// Permission required to open the screen or call its methods.
    fn permission(&self) -> Option<Permission> {
        None
    }

    fn command_bar(&self) -> Vec<Action>;

    fn layout(&self) -> Vec<Layout>;

    /// Whether `method` is reachable from the command bar, dropdowns included.
    fn offers(&self, method: ScreenMethod) -> bool {
        fn walk(actions: &[Action], method: ScreenMethod) -> bool {
            actions
                .iter()
                .any(|a| a.method() == Some(method) || walk(a.children(), method))
        }
        walk(&self.command_bar(), method)
    }
}
