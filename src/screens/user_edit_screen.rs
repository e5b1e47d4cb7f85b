//! Create/edit form for a single user account.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use validator::Validate;

use crate::error::PanelError;
use crate::models::{Directory, Permission, RoleId, RoleRecord, SessionRecord, UserId, UserRecord};
use crate::services::{decode_permission_map, generate_password_hash, status_permissions, PermissionGroupStatus};
use crate::utils::parse_flag;

use super::{Action, Button, DropDown, Field, FieldKind, Layout, Modal, ModalToggle, Screen, ScreenMethod, SelectOption};

/// Messages keyed by the dotted field name they belong to.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Whether the screen edits a stored user or creates a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    New,
    Existing(UserId),
}

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("submitted form is invalid")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Panel(#[from] PanelError),
}

#[derive(Debug, Clone, Default, Validate)]
pub struct UserInput {
    #[validate(length(max = 255, message = "The name may not be greater than 255 characters."))]
    pub name: String,
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,
    pub password: Option<String>,
}

/// Submitted screen form, parsed from `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, Default)]
pub struct UserEditRequest {
    pub user: UserInput,
    pub roles: Vec<RoleId>,
    /// `(base64 permission key, granted)` exactly as submitted.
    pub permissions: Vec<(String, bool)>,
    /// Field of the change-password modal.
    pub password: Option<String>,
}

fn last<'a>(form: &'a HashMap<String, Vec<String>>, key: &str) -> Option<&'a String> {
    form.get(key).and_then(|v| v.last())
}

impl UserEditRequest {
    pub fn from_form(form: &HashMap<String, Vec<String>>) -> Self {
        let text = |key: &str| last(form, key).map(|s| s.trim().to_string()).unwrap_or_default();
        let secret = |key: &str| last(form, key).filter(|s| !s.is_empty()).cloned();

        let roles = form
            .get("user[roles][]")
            .map(|vals| vals.iter().filter_map(|v| v.trim().parse::<RoleId>().ok()).collect())
            .unwrap_or_default();

        // hidden "0" inputs precede the checkboxes, so the last value wins
        let mut permissions: Vec<(String, bool)> = form
            .iter()
            .filter_map(|(k, vals)| {
                let key = k.strip_prefix("permissions[")?.strip_suffix(']')?;
                Some((key.to_string(), parse_flag(vals.last(), false)))
            })
            .collect();
        permissions.sort();

        UserEditRequest {
            user: UserInput {
                name: text("user[name]"),
                email: text("user[email]"),
                password: secret("user[password]"),
            },
            roles,
            permissions,
            password: secret("password"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub roles: Vec<RoleRecord>,
}

/// Data the edit screen renders: the user and its permission status.
#[derive(Debug, Clone)]
pub struct UserEditQuery {
    pub user: UserView,
    pub permission: Vec<PermissionGroupStatus>,
}

impl UserEditQuery {
    /// Current value for a dotted field name.
    pub fn value_of(&self, field: &str) -> String {
        match field {
            "user.name" => self.user.name.clone(),
            "user.email" => self.user.email.clone(),
            _ => String::new(),
        }
    }

    pub fn is_selected(&self, field: &str, value: &str) -> bool {
        field == "user.roles." && self.user.roles.iter().any(|r| r.id.to_string() == value)
    }

    /// Refills the form from a rejected submission so the operator keeps their input.
    pub fn with_submission(mut self, dir: &Directory, request: &UserEditRequest) -> Self {
        self.user.name = request.user.name.clone();
        self.user.email = request.user.email.clone();
        self.user.roles = request
            .roles
            .iter()
            .filter_map(|id| dir.role(*id).cloned())
            .collect();
        let submitted = decode_permission_map(request.permissions.iter().map(|(k, v)| (k.as_str(), *v)));
        self.permission = status_permissions(&submitted);
        self
    }
}

pub struct UserEditScreen {
    presence: Presence,
    role_options: Vec<SelectOption>,
}

impl Default for UserEditScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl UserEditScreen {
    pub fn new() -> Self {
        UserEditScreen {
            presence: Presence::New,
            role_options: Vec::new(),
        }
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    /// Loads `user` (or a blank user when `None`) with its roles and permission status.
    pub fn query(&mut self, dir: &Directory, user: Option<UserId>) -> Result<UserEditQuery, PanelError> {
        let record = match user {
            Some(id) => Some(dir.user(id).ok_or(PanelError::UserNotFound(id))?),
            None => None,
        };
        self.presence = match record {
            Some(u) => Presence::Existing(u.id),
            None => Presence::New,
        };
        self.role_options = dir
            .roles
            .values()
            .map(|r| SelectOption {
                value: r.id.to_string(),
                label: r.name.clone(),
            })
            .collect();

        let query = match record {
            Some(u) => UserEditQuery {
                user: UserView {
                    id: Some(u.id),
                    name: u.name.clone(),
                    email: u.email.clone(),
                    roles: dir.roles_of(u),
                },
                permission: status_permissions(&u.permissions),
            },
            None => UserEditQuery {
                user: UserView {
                    id: None,
                    name: String::new(),
                    email: String::new(),
                    roles: Vec::new(),
                },
                permission: status_permissions(&BTreeMap::new()),
            },
        };
        Ok(query)
    }

    fn existing_id(&self, method: ScreenMethod) -> Result<UserId, PanelError> {
        match self.presence {
            Presence::Existing(id) => Ok(id),
            Presence::New => Err(PanelError::UnknownMethod(method.as_str().to_string())),
        }
    }

    pub fn validate(&self, dir: &Directory, request: &UserEditRequest) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let input = &request.user;
        if input.name.is_empty() {
            errors.insert("user.name", "The name field is required.".to_string());
        }
        if input.email.is_empty() {
            errors.insert("user.email", "The email field is required.".to_string());
        }
        if self.presence == Presence::New && input.password.is_none() {
            errors.insert("user.password", "The password field is required.".to_string());
        }
        if let Err(validation) = input.validate() {
            for (field, errs) in validation.field_errors().iter() {
                let key = match field.to_string().as_str() {
                    "name" => "user.name",
                    "email" => "user.email",
                    _ => continue,
                };
                if let Some(msg) = errs.iter().find_map(|e| e.message.as_ref()) {
                    errors.entry(key).or_insert_with(|| msg.to_string());
                }
            }
        }
        let except = match self.presence {
            Presence::Existing(id) => Some(id),
            Presence::New => None,
        };
        if !errors.contains_key("user.email") && dir.email_taken(&input.email, except) {
            errors.insert("user.email", "The email has already been taken.".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Applies the submitted fields, replaces the role list and writes the
    /// decoded permissions over whatever the user held before.
    pub fn save(&self, dir: &mut Directory, request: &UserEditRequest) -> Result<UserId, ScreenError> {
        self.validate(dir, request).map_err(ScreenError::Invalid)?;
        let input = &request.user;
        let permissions = decode_permission_map(request.permissions.iter().map(|(k, v)| (k.as_str(), *v)));

        let id = match self.presence {
            Presence::New => {
                let id = dir.next_user_id();
                dir.insert_user(UserRecord {
                    id,
                    name: input.name.clone(),
                    email: input.email.clone(),
                    password: generate_password_hash(input.password.as_deref().unwrap_or_default()),
                    roles: Vec::new(),
                    permissions: BTreeMap::new(),
                });
                id
            }
            Presence::Existing(id) => {
                let user = dir.user_mut(id).ok_or(PanelError::UserNotFound(id))?;
                user.name = input.name.clone();
                user.email = input.email.clone();
                if let Some(password) = &input.password {
                    user.password = generate_password_hash(password);
                }
                id
            }
        };

        dir.replace_roles(id, &request.roles);
        if let Some(user) = dir.user_mut(id) {
            user.permissions = permissions;
        }
        Ok(id)
    }

    pub fn remove(&self, dir: &mut Directory) -> Result<UserRecord, PanelError> {
        let id = self.existing_id(ScreenMethod::Remove)?;
        dir.remove_user(id).ok_or(PanelError::UserNotFound(id))
    }

    /// Points `session` at the edited user, remembering who switched.
    pub fn login_as(&self, dir: &Directory, session: &mut SessionRecord) -> Result<UserId, PanelError> {
        let id = self.existing_id(ScreenMethod::LoginAs)?;
        if dir.user(id).is_none() {
            return Err(PanelError::UserNotFound(id));
        }
        match session.impersonator {
            // switching onto the original identity ends the impersonation
            Some(original) if original == id => session.impersonator = None,
            Some(_) => {}
            None if session.user_id != id => session.impersonator = Some(session.user_id),
            None => {}
        }
        session.user_id = id;
        Ok(id)
    }

    pub fn change_password(&self, dir: &mut Directory, request: &UserEditRequest) -> Result<(), ScreenError> {
        let id = self.existing_id(ScreenMethod::ChangePassword)?;
        let Some(password) = request.password.as_deref() else {
            let mut errors = FieldErrors::new();
            errors.insert("password", "The password field is required.".to_string());
            return Err(ScreenError::Invalid(errors));
        };
        let user = dir.user_mut(id).ok_or(PanelError::UserNotFound(id))?;
        user.password = generate_password_hash(password);
        Ok(())
    }
}

impl Screen for UserEditScreen {
    fn name(&self) -> &'static str {
        "User"
    }

    fn description(&self) -> &'static str {
        "Details such as name, email and password"
    }

    fn permission(&self) -> Option<Permission> {
        Some(Permission::SystemsUsers)
    }

    fn command_bar(&self) -> Vec<Action> {
        let save = Action::Button(Button::new("Save", "icon-check", ScreenMethod::Save));
        match self.presence {
            Presence::New => vec![save],
            Presence::Existing(_) => vec![
                Action::DropDown(DropDown {
                    label: "Settings",
                    icon: "icon-open",
                    list: vec![
                        Action::Button(Button::new("Login as user", "icon-login", ScreenMethod::LoginAs)),
                        Action::ModalToggle(ModalToggle {
                            label: "Change Password",
                            icon: "icon-lock-open",
                            method: ScreenMethod::ChangePassword,
                            modal: "password",
                            title: "Change Password",
                        }),
                    ],
                }),
                save,
                Action::Button(
                    Button::new("Remove", "icon-trash", ScreenMethod::Remove)
                        .confirm("Are you sure you want to delete the user?"),
                ),
            ],
        }
    }

    fn layout(&self) -> Vec<Layout> {
        let mut rows = vec![
            Field::input("user.name")
                .kind(FieldKind::Text)
                .max(255)
                .required()
                .title("Name")
                .placeholder("Name"),
            Field::input("user.email")
                .kind(FieldKind::Email)
                .required()
                .title("Email")
                .placeholder("Email"),
        ];
        if self.presence == Presence::New {
            rows.push(
                Field::password("user.password")
                    .placeholder("Enter your password")
                    .required()
                    .title("Password"),
            );
        }
        rows.push(
            Field::select("user.roles.")
                .options(self.role_options.clone())
                .multiple()
                .title("Name role")
                .help("Specify which groups this account should belong to"),
        );

        vec![
            Layout::Rows(rows),
            Layout::RolePermissions,
            Layout::Modal(Modal {
                key: "password",
                title: "Change Password",
                rows: vec![Field::password("password")
                    .placeholder("Enter your password")
                    .required()
                    .title("Password")],
            }),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{encode_permission_key, verify_password};

    fn directory() -> Directory {
        let mut dir = Directory::default();
        dir.insert_role(RoleRecord {
            id: 1,
            slug: "admin".into(),
            name: "Administrator".into(),
            permissions: BTreeMap::new(),
        });
        dir.insert_role(RoleRecord {
            id: 2,
            slug: "editor".into(),
            name: "Editor".into(),
            permissions: BTreeMap::new(),
        });
        dir.insert_user(UserRecord {
            id: 1,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: generate_password_hash("old-secret"),
            roles: vec![1],
            permissions: BTreeMap::from([("platform.systems.roles".to_string(), true)]),
        });
        dir
    }

    fn existing(dir: &Directory) -> UserEditScreen {
        let mut screen = UserEditScreen::new();
        screen.query(dir, Some(1)).unwrap();
        screen
    }

    fn request(name: &str, email: &str) -> UserEditRequest {
        UserEditRequest {
            user: UserInput {
                name: name.into(),
                email: email.into(),
                password: None,
            },
            ..Default::default()
        }
    }

    #[test]
    fn new_user_command_bar_only_saves() {
        let mut screen = UserEditScreen::new();
        screen.query(&directory(), None).unwrap();
        assert_eq!(screen.presence(), Presence::New);
        let bar = screen.command_bar();
        assert_eq!(bar.len(), 1);
        assert_eq!(bar[0].label(), "Save");
        assert_eq!(bar[0].method(), Some(ScreenMethod::Save));
    }

    #[test]
    fn existing_user_command_bar_has_settings_save_remove() {
        let screen = existing(&directory());
        let bar = screen.command_bar();
        let labels: Vec<&str> = bar.iter().map(|a| a.label()).collect();
        assert_eq!(labels, vec!["Settings", "Save", "Remove"]);

        let settings: Vec<Option<ScreenMethod>> = bar[0].children().iter().map(|a| a.method()).collect();
        assert_eq!(
            settings,
            vec![Some(ScreenMethod::LoginAs), Some(ScreenMethod::ChangePassword)]
        );
        assert_eq!(bar[0].children()[1].modal(), Some("password"));
        assert_eq!(bar[2].confirm(), Some("Are you sure you want to delete the user?"));
    }

    #[test]
    fn password_field_only_for_new_users() {
        let has_password = |screen: &UserEditScreen| {
            screen.layout()[0]
                .fields()
                .iter()
                .any(|f| f.name == "user.password" && f.required)
        };
        let mut fresh = UserEditScreen::new();
        fresh.query(&directory(), None).unwrap();
        assert!(has_password(&fresh));
        assert!(!has_password(&existing(&directory())));
    }

    #[test]
    fn layout_order_and_role_options() {
        let screen = existing(&directory());
        let layout = screen.layout();
        let kinds: Vec<&str> = layout.iter().map(|l| l.kind()).collect();
        assert_eq!(kinds, vec!["rows", "role-permissions", "modal"]);

        let names: Vec<&str> = layout[0].fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["user.name", "user.email", "user.roles."]);
        let roles = &layout[0].fields()[2];
        assert!(roles.multiple);
        assert_eq!(roles.options.len(), 2);
        assert_eq!(layout[2].modal_key(), "password");
        assert!(layout[2].fields()[0].required);
    }

    #[test]
    fn query_loads_roles_and_status_permissions() {
        let dir = directory();
        let mut screen = UserEditScreen::new();
        let query = screen.query(&dir, Some(1)).unwrap();
        assert_eq!(
            query.user,
            UserView {
                id: Some(1),
                name: "Ada".into(),
                email: "ada@example.com".into(),
                roles: vec![dir.role(1).unwrap().clone()],
            }
        );
        assert!(query.is_selected("user.roles.", "1"));
        assert!(!query.is_selected("user.roles.", "2"));
        assert_eq!(query.value_of("user.email"), "ada@example.com");
        let active: Vec<&str> = query
            .permission
            .iter()
            .flat_map(|g| g.permissions.iter())
            .filter(|p| p.active)
            .map(|p| p.slug)
            .collect();
        assert_eq!(active, vec!["platform.systems.roles"]);
    }

    #[test]
    fn query_of_missing_user_fails() {
        let mut screen = UserEditScreen::new();
        assert!(matches!(
            screen.query(&directory(), Some(99)),
            Err(PanelError::UserNotFound(99))
        ));
    }

    #[test]
    fn save_replaces_permissions_with_decoded_map() {
        let mut dir = directory();
        let screen = existing(&dir);
        let mut req = request("Ada L.", "ada@example.com");
        req.permissions = vec![(encode_permission_key("edit"), true)];
        req.roles = vec![2];

        let id = screen.save(&mut dir, &req).unwrap();
        let user = dir.user(id).unwrap();
        assert_eq!(user.name, "Ada L.");
        assert_eq!(user.roles, vec![2]);
        assert_eq!(user.permissions, BTreeMap::from([("edit".to_string(), true)]));
        assert!(verify_password(&user.password, "old-secret"));
    }

    #[test]
    fn save_creates_new_user_with_hashed_password() {
        let mut dir = directory();
        let mut screen = UserEditScreen::new();
        screen.query(&dir, None).unwrap();
        let mut req = request("Grace", "grace@example.com");
        req.user.password = Some("hopper".into());
        req.roles = vec![1, 2];

        let id = screen.save(&mut dir, &req).unwrap();
        assert_eq!(id, 2);
        let user = dir.user(id).unwrap();
        assert!(verify_password(&user.password, "hopper"));
        assert_eq!(user.roles, vec![1, 2]);
    }

    #[test]
    fn save_rejects_invalid_input() {
        let mut dir = directory();
        let mut screen = UserEditScreen::new();
        screen.query(&dir, None).unwrap();

        let long_name = "x".repeat(256);
        let req = request(&long_name, "not-an-email");
        let Err(ScreenError::Invalid(errors)) = screen.save(&mut dir, &req) else {
            panic!("expected validation errors");
        };
        assert!(errors.contains_key("user.name"));
        assert!(errors.contains_key("user.email"));
        assert!(errors.contains_key("user.password"));
        assert_eq!(dir.users.len(), 1);
    }

    #[test]
    fn save_rejects_duplicate_email() {
        let mut dir = directory();
        let mut screen = UserEditScreen::new();
        screen.query(&dir, None).unwrap();
        let mut req = request("Other", "ADA@example.com");
        req.user.password = Some("pw".into());
        let Err(ScreenError::Invalid(errors)) = screen.save(&mut dir, &req) else {
            panic!("expected validation errors");
        };
        assert_eq!(errors["user.email"], "The email has already been taken.");
    }

    #[test]
    fn remove_deletes_the_user() {
        let mut dir = directory();
        let screen = existing(&dir);
        let removed = screen.remove(&mut dir).unwrap();
        assert_eq!(removed.id, 1);
        assert!(dir.user(1).is_none());
        assert!(matches!(screen.remove(&mut dir), Err(PanelError::UserNotFound(1))));
    }

    #[test]
    fn login_as_switches_and_remembers_operator() {
        let mut dir = directory();
        dir.insert_user(UserRecord {
            id: 2,
            name: "Op".into(),
            email: "op@example.com".into(),
            password: String::new(),
            roles: vec![],
            permissions: BTreeMap::new(),
        });
        let screen = existing(&dir);
        let mut session = SessionRecord::new(2);
        assert_eq!(screen.login_as(&dir, &mut session).unwrap(), 1);
        assert_eq!(session.user_id, 1);
        assert_eq!(session.impersonator, Some(2));
    }

    #[test]
    fn change_password_rehashes() {
        let mut dir = directory();
        let screen = existing(&dir);
        let req = UserEditRequest {
            password: Some("secret".into()),
            ..Default::default()
        };
        screen.change_password(&mut dir, &req).unwrap();
        let user = dir.user(1).unwrap();
        assert!(verify_password(&user.password, "secret"));
        assert!(!verify_password(&user.password, "old-secret"));

        let empty = UserEditRequest::default();
        assert!(matches!(
            screen.change_password(&mut dir, &empty),
            Err(ScreenError::Invalid(_))
        ));
    }

    #[test]
    fn form_parsing_reads_bracketed_names() {
        let key = encode_permission_key("platform.index");
        let form: HashMap<String, Vec<String>> = HashMap::from([
            ("user[name]".to_string(), vec![" Ada ".to_string()]),
            ("user[email]".to_string(), vec!["ada@example.com".to_string()]),
            ("user[roles][]".to_string(), vec!["1".to_string(), "x".to_string(), "2".to_string()]),
            (format!("permissions[{}]", key), vec!["0".to_string(), "1".to_string()]),
            ("password".to_string(), vec![String::new()]),
        ]);
        let req = UserEditRequest::from_form(&form);
        assert_eq!(req.user.name, "Ada");
        assert_eq!(req.user.password, None);
        assert_eq!(req.roles, vec![1, 2]);
        assert_eq!(req.permissions, vec![(key, true)]);
        assert_eq!(req.password, None);
    }
}
