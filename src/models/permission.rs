use serde::{Deserialize, Serialize};

/// Permission registered with the panel.
///
/// Users and roles store grants keyed by [`Permission::slug`], so the
/// slug strings are part of the data file format and must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    // ── Main ───────────────────────────────────────────────────────────
    /// Reach the dashboard.
    Index,

    // ── System ─────────────────────────────────────────────────────────
    /// Manage roles.
    SystemsRoles,
    /// Browse, edit and remove users.
    SystemsUsers,
}

impl Permission {
    /// Key stored in the user and role permission maps.
    pub fn slug(&self) -> &'static str {
        match self {
            Permission::Index => "platform.index",
            Permission::SystemsRoles => "platform.systems.roles",
            Permission::SystemsUsers => "platform.systems.users",
        }
    }

    /// Human-readable name shown next to the checkbox.
    pub fn label(&self) -> &'static str {
        match self {
            Permission::Index => "Main",
            Permission::SystemsRoles => "Roles",
            Permission::SystemsUsers => "Users",
        }
    }

    /// Group heading the permission is listed under.
    pub fn group(&self) -> &'static str {
        match self {
            Permission::Index => "Main",
            Permission::SystemsRoles | Permission::SystemsUsers => "System",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.slug() == slug)
    }

    /// All registered permissions in a stable display order.
    pub fn all() -> &'static [Permission] {
        &[
            Permission::Index,
            Permission::SystemsRoles,
            Permission::SystemsUsers,
        ]
    }
}
