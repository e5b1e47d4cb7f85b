use super::method::ScreenMethod;

/// Entry of a screen's command bar.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Button(Button),
    ModalToggle(ModalToggle),
    DropDown(DropDown),
}

/// Submits the screen form to `method`.
#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub label: &'static str,
    pub icon: &'static str,
    pub method: ScreenMethod,
    /// Prompt the browser shows before submitting.
    pub confirm: Option<&'static str>,
}

/// Opens the modal registered under `modal`; the modal form posts to `method`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalToggle {
    pub label: &'static str,
    pub icon: &'static str,
    pub method: ScreenMethod,
    pub modal: &'static str,
    pub title: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropDown {
    pub label: &'static str,
    pub icon: &'static str,
    pub list: Vec<Action>,
}

impl Button {
    pub fn new(label: &'static str, icon: &'static str, method: ScreenMethod) -> Self {
        Button {
            label,
            icon,
            method,
            confirm: None,
        }
    }

    pub fn confirm(mut self, prompt: &'static str) -> Self {
        self.confirm = Some(prompt);
        self
    }
}

// Accessors below keep the templates free of enum matching.
impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Button(_) => "button",
            Action::ModalToggle(_) => "modal-toggle",
            Action::DropDown(_) => "dropdown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Button(b) => b.label,
            Action::ModalToggle(m) => m.label,
            Action::DropDown(d) => d.label,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Action::Button(b) => b.icon,
            Action::ModalToggle(m) => m.icon,
            Action::DropDown(d) => d.icon,
        }
    }

    pub fn method(&self) -> Option<ScreenMethod> {
        match self {
            Action::Button(b) => Some(b.method),
            Action::ModalToggle(m) => Some(m.method),
            Action::DropDown(_) => None,
        }
    }

    /// Wire name of [`Action::method`], empty for dropdowns.
    pub fn method_name(&self) -> &'static str {
        self.method().map(|m| m.as_str()).unwrap_or("")
    }

    pub fn confirm(&self) -> Option<&'static str> {
        match self {
            Action::Button(b) => b.confirm,
            _ => None,
        }
    }

    pub fn confirm_text(&self) -> &'static str {
        self.confirm().unwrap_or("")
    }

    pub fn modal(&self) -> Option<&'static str> {
        match self {
            Action::ModalToggle(m) => Some(m.modal),
            _ => None,
        }
    }

    pub fn modal_name(&self) -> &'static str {
        self.modal().unwrap_or("")
    }

    pub fn children(&self) -> &[Action] {
        match self {
            Action::DropDown(d) => &d.list,
            _ => &[],
        }
    }
}
