#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Form field declared by a screen layout.
///
/// `name` is a dotted path into the query data (`user.name`); a trailing dot
/// marks a list (`user.roles.`).
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub title: Option<&'static str>,
    pub placeholder: Option<&'static str>,
    pub help: Option<&'static str>,
    pub max: Option<usize>,
    pub required: bool,
    pub multiple: bool,
    pub options: Vec<SelectOption>,
}

impl Field {
    fn make(name: &'static str, kind: FieldKind) -> Self {
        Field {
            name,
            kind,
            title: None,
            placeholder: None,
            help: None,
            max: None,
            required: false,
            multiple: false,
            options: Vec::new(),
        }
    }

    pub fn input(name: &'static str) -> Self {
        Self::make(name, FieldKind::Text)
    }

    pub fn password(name: &'static str) -> Self {
        Self::make(name, FieldKind::Password)
    }

    pub fn select(name: &'static str) -> Self {
        Self::make(name, FieldKind::Select)
    }

    pub fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn title(mut self, title: &'static str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    /// `type` attribute / template branch for this field.
    pub fn input_type(&self) -> &'static str {
        match self.kind {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Password => "password",
            FieldKind::Select => "select",
        }
    }

    /// Form control name: `user.name` → `user[name]`, `user.roles.` → `user[roles][]`.
    pub fn html_name(&self) -> String {
        let mut segments = self.name.split('.');
        let mut out = segments.next().unwrap_or_default().to_string();
        for seg in segments {
            out.push('[');
            out.push_str(seg);
            out.push(']');
        }
        out
    }

    /// Element id derived from the name, safe for `for=`/`id=` attributes.
    pub fn html_id(&self) -> String {
        let id: String = self
            .name
            .trim_end_matches('.')
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        format!("field-{}", id)
    }

    pub fn title_text(&self) -> &'static str {
        self.title.unwrap_or("")
    }

    pub fn placeholder_text(&self) -> &'static str {
        self.placeholder.unwrap_or("")
    }

    pub fn help_text(&self) -> &'static str {
        self.help.unwrap_or("")
    }

    pub fn max_text(&self) -> String {
        self.max.map(|m| m.to_string()).unwrap_or_default()
    }
}
