use super::field::Field;

/// Static partial a `Layout::View` stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPartial {
    /// `partials/update.html`: whether a newer release exists.
    UpdateStatus,
}

/// Dialog opened by a `ModalToggle` with the matching key.
#[derive(Debug, Clone, PartialEq)]
pub struct Modal {
    pub key: &'static str,
    pub title: &'static str,
    pub rows: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    Rows(Vec<Field>),
    /// Checkbox grid over the `permission` groups of the query data.
    RolePermissions,
    Modal(Modal),
    View(ViewPartial),
}

impl Layout {
    pub fn kind(&self) -> &'static str {
        match self {
            Layout::Rows(_) => "rows",
            Layout::RolePermissions => "role-permissions",
            Layout::Modal(_) => "modal",
            Layout::View(_) => "view",
        }
    }

    pub fn fields(&self) -> &[Field] {
        match self {
            Layout::Rows(fields) => fields,
            Layout::Modal(modal) => &modal.rows,
            _ => &[],
        }
    }

    pub fn modal_key(&self) -> &'static str {
        match self {
            Layout::Modal(modal) => modal.key,
            _ => "",
        }
    }

    pub fn modal_title(&self) -> &'static str {
        match self {
            Layout::Modal(modal) => modal.title,
            _ => "",
        }
    }

    pub fn is_view(&self, partial: ViewPartial) -> bool {
        matches!(self, Layout::View(p) if *p == partial)
    }
}
