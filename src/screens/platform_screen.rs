use crate::models::{AppState, Permission};
use crate::update::{self, UpdateStatus};

use super::{Action, Layout, Screen, ViewPartial};

/// Dashboard landing page.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformScreen;

#[derive(Debug, Clone)]
pub struct PlatformQuery {
    /// `None` when checks are disabled or the checker failed.
    pub status: Option<UpdateStatus>,
}

impl PlatformScreen {
    pub async fn query(&self, state: &AppState) -> PlatformQuery {
        PlatformQuery {
            status: update::current_status(state).await,
        }
    }
}

impl Screen for PlatformScreen {
    fn name(&self) -> &'static str {
        "Dashboard"
    }

    fn description(&self) -> &'static str {
        "Welcome"
    }

    fn permission(&self) -> Option<Permission> {
        Some(Permission::Index)
    }

    fn command_bar(&self) -> Vec<Action> {
        Vec::new()
    }

    fn layout(&self) -> Vec<Layout> {
        vec![Layout::View(ViewPartial::UpdateStatus)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_has_no_actions_and_one_view() {
        let screen = PlatformScreen;
        assert!(screen.command_bar().is_empty());
        let layout = screen.layout();
        assert_eq!(layout.len(), 1);
        assert!(layout[0].is_view(ViewPartial::UpdateStatus));
    }
}
