use std::collections::BTreeMap;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;

use crate::models::{Directory, Permission, UserId};

/// One checkbox of the role-permission layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermissionStatus {
    pub slug: &'static str,
    /// Form key: the slug, base64 encoded so dots survive the form round trip.
    pub key: String,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermissionGroupStatus {
    pub name: &'static str,
    pub permissions: Vec<PermissionStatus>,
}

pub fn encode_permission_key(slug: &str) -> String {
    STANDARD.encode(slug)
}

pub fn decode_permission_key(key: &str) -> Option<String> {
    let key = key.trim();
    let bytes = STANDARD
        .decode(key)
        .or_else(|_| STANDARD_NO_PAD.decode(key))
        .ok()?;
    String::from_utf8(bytes).ok()
}

/// Flattens submitted `(base64 key, grant)` pairs into `slug -> grant`.
///
/// Keys that do not decode are skipped. A later pair for the same slug wins.
pub fn decode_permission_map<'a, I>(submitted: I) -> BTreeMap<String, bool>
where
    I: IntoIterator<Item = (&'a str, bool)>,
{
    let mut out = BTreeMap::new();
    for (key, granted) in submitted {
        match decode_permission_key(key) {
            Some(slug) => {
                out.insert(slug, granted);
            }
            None => tracing::warn!(key, "Ignoring permission key that is not valid base64"),
        }
    }
    out
}

/// Every registered permission, grouped, flagged with whether `granted` holds it.
pub fn status_permissions(granted: &BTreeMap<String, bool>) -> Vec<PermissionGroupStatus> {
    let mut groups: Vec<PermissionGroupStatus> = Vec::new();
    for p in Permission::all() {
        let status = PermissionStatus {
            slug: p.slug(),
            key: encode_permission_key(p.slug()),
            label: p.label(),
            active: granted.get(p.slug()).copied().unwrap_or(false),
        };
        match groups.iter_mut().find(|g| g.name == p.group()) {
            Some(group) => group.permissions.push(status),
            None => groups.push(PermissionGroupStatus {
                name: p.group(),
                permissions: vec![status],
            }),
        }
    }
    groups
}

/// Granted when the user's own map or any of their roles grants it.
///
/// A `false` entry only means "not granted here"; it never revokes a grant
/// coming from a role.
pub fn has_access(dir: &Directory, user_id: UserId, permission: Permission) -> bool {
    let Some(user) = dir.user(user_id) else {
        return false;
    };
    let slug = permission.slug();
    user.permissions.get(slug) == Some(&true)
        || dir
            .roles_of(user)
            .iter()
            .any(|r| r.permissions.get(slug) == Some(&true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoleRecord, UserRecord};

    #[test]
    fn decodes_base64_keys_into_slugs() {
        let key = encode_permission_key("edit");
        assert_eq!(key, "ZWRpdA==");
        let map = decode_permission_map([(key.as_str(), true)]);
        assert_eq!(map, BTreeMap::from([("edit".to_string(), true)]));
    }

    #[test]
    fn accepts_unpadded_keys() {
        assert_eq!(decode_permission_key("ZWRpdA"), Some("edit".to_string()));
    }

    #[test]
    fn skips_malformed_keys() {
        let good = encode_permission_key("platform.index");
        let map = decode_permission_map([("%%%", true), (good.as_str(), false), ("/w==", true)]);
        assert_eq!(map, BTreeMap::from([("platform.index".to_string(), false)]));
    }

    #[test]
    fn later_pairs_win() {
        let key = encode_permission_key("platform.index");
        let map = decode_permission_map([(key.as_str(), false), (key.as_str(), true)]);
        assert_eq!(map.get("platform.index"), Some(&true));
    }

    #[test]
    fn status_lists_every_permission_grouped() {
        let granted = BTreeMap::from([
            ("platform.systems.users".to_string(), true),
            ("platform.index".to_string(), false),
        ]);
        let groups = status_permissions(&granted);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Main");
        assert!(!groups[0].permissions[0].active);
        let system: Vec<(&str, bool)> = groups[1]
            .permissions
            .iter()
            .map(|p| (p.slug, p.active))
            .collect();
        assert_eq!(
            system,
            vec![("platform.systems.roles", false), ("platform.systems.users", true)]
        );
        assert_eq!(
            decode_permission_key(&groups[1].permissions[1].key).as_deref(),
            Some("platform.systems.users")
        );
    }

    #[test]
    fn user_or_role_grant_is_enough() {
        let mut dir = Directory::default();
        dir.insert_role(RoleRecord {
            id: 1,
            slug: "admin".into(),
            name: "Admin".into(),
            permissions: BTreeMap::from([("platform.systems.users".to_string(), true)]),
        });
        dir.insert_user(UserRecord {
            id: 1,
            name: "a".into(),
            email: "a@example.com".into(),
            password: String::new(),
            roles: vec![1],
            permissions: BTreeMap::from([("platform.index".to_string(), true)]),
        });
        assert!(has_access(&dir, 1, Permission::SystemsUsers));
        assert!(has_access(&dir, 1, Permission::Index));
        assert!(!has_access(&dir, 1, Permission::SystemsRoles));

        assert!(!has_access(&dir, 2, Permission::Index));
    }

    #[test]
    fn unchecked_user_entry_keeps_role_grant() {
        let mut dir = Directory::default();
        dir.insert_role(RoleRecord {
            id: 1,
            slug: "admin".into(),
            name: "Admin".into(),
            permissions: BTreeMap::from([("platform.systems.users".to_string(), true)]),
        });
        dir.insert_user(UserRecord {
            id: 1,
            name: "a".into(),
            email: "a@example.com".into(),
            password: String::new(),
            roles: vec![1],
            permissions: BTreeMap::from([
                ("platform.systems.users".to_string(), false),
                ("platform.index".to_string(), false),
            ]),
        });
        assert!(has_access(&dir, 1, Permission::SystemsUsers));
        assert!(!has_access(&dir, 1, Permission::Index));
    }
}
