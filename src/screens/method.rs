/// Named handler a command bar button or modal posts to.
///
/// The wire names are the last path segment of `POST /users/:id/edit/:method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenMethod {
    Save,
    Remove,
    LoginAs,
    ChangePassword,
}

impl ScreenMethod {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "save" => Some(Self::Save),
            "remove" => Some(Self::Remove),
            "loginAs" => Some(Self::LoginAs),
            "changePassword" => Some(Self::ChangePassword),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Remove => "remove",
            Self::LoginAs => "loginAs",
            Self::ChangePassword => "changePassword",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for m in [
            ScreenMethod::Save,
            ScreenMethod::Remove,
            ScreenMethod::LoginAs,
            ScreenMethod::ChangePassword,
        ] {
            assert_eq!(ScreenMethod::from_str(m.as_str()), Some(m));
        }
        assert_eq!(ScreenMethod::from_str("login-as"), None);
        assert_eq!(ScreenMethod::from_str(""), None);
    }
}
