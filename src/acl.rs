// src/acl.rs
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

const PUBLIC_KEY: &str = "*";

/// Represents a Parse Access Control List (ACL).
///
/// Permissions are keyed by `"*"` for the public, by user object id, or by `"role:<name>"`
/// for roles. Anything not granted is denied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseACL {
    permissions: BTreeMap<String, Permission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
struct Permission {
    #[serde(skip_serializing_if = "Option::is_none")]
    read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    write: Option<bool>,
}

impl Permission {
    fn is_empty(&self) -> bool {
        self.read.is_none() && self.write.is_none()
    }
}

fn role_key(role_name: &str) -> String {
    format!("role:{}", role_name)
}

impl ParseACL {
    /// Creates a new, empty `ParseACL`. With no entries only the master key can access the object.
    pub fn new() -> Self {
        Self::default()
    }

    /// ACL readable by everyone and writable by nobody but the master key.
    pub fn public_read_only() -> Self {
        let mut acl = Self::new();
        acl.set_public_read_access(true);
        acl
    }

    /// ACL granting the given user both read and write access.
    pub fn private_to(user_id: &str) -> Self {
        let mut acl = Self::new();
        acl.set_user_read_access(user_id, true);
        acl.set_user_write_access(user_id, true);
        acl
    }

    fn entry(&mut self, key: String) -> &mut Permission {
        self.permissions.entry(key).or_default()
    }

    fn read_of(&self, key: &str) -> bool {
        self.permissions
            .get(key)
            .and_then(|p| p.read)
            .unwrap_or(false)
    }

    fn write_of(&self, key: &str) -> bool {
        self.permissions
            .get(key)
            .and_then(|p| p.write)
            .unwrap_or(false)
    }

    pub fn set_public_read_access(&mut self, allowed: bool) {
        self.entry(PUBLIC_KEY.to_string()).read = Some(allowed);
    }

    pub fn set_public_write_access(&mut self, allowed: bool) {
        self.entry(PUBLIC_KEY.to_string()).write = Some(allowed);
    }

    pub fn set_user_read_access(&mut self, user_id: &str, allowed: bool) {
        self.entry(user_id.to_string()).read = Some(allowed);
    }

    pub fn set_user_write_access(&mut self, user_id: &str, allowed: bool) {
        self.entry(user_id.to_string()).write = Some(allowed);
    }

    /// `role_name` is the bare role name; the `role:` prefix is added here.
    pub fn set_role_read_access(&mut self, role_name: &str, allowed: bool) {
        self.entry(role_key(role_name)).read = Some(allowed);
    }

    pub fn set_role_write_access(&mut self, role_name: &str, allowed: bool) {
        self.entry(role_key(role_name)).write = Some(allowed);
    }

    pub fn get_public_read_access(&self) -> bool {
        self.read_of(PUBLIC_KEY)
    }

    pub fn get_public_write_access(&self) -> bool {
        self.write_of(PUBLIC_KEY)
    }

    pub fn get_user_read_access(&self, user_id: &str) -> bool {
        self.read_of(user_id)
    }

    pub fn get_user_write_access(&self, user_id: &str) -> bool {
        self.write_of(user_id)
    }

    pub fn get_role_read_access(&self, role_name: &str) -> bool {
        self.read_of(&role_key(role_name))
    }

    pub fn get_role_write_access(&self, role_name: &str) -> bool {
        self.write_of(&role_key(role_name))
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.values().all(Permission::is_empty)
    }
}

impl Serialize for ParseACL {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.permissions.iter().filter(|(_, p)| !p.is_empty()))
    }
}

impl<'de> Deserialize<'de> for ParseACL {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let permissions = BTreeMap::<String, Permission>::deserialize(deserializer)?;
        Ok(ParseACL { permissions })
    }
}
