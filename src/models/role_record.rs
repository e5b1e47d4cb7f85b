use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type RoleId = u64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub permissions: BTreeMap<String, bool>,
}
