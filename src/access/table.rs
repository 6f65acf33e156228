//!
//! Role → permission table.
//!
//! A flat lookup table: each role owns an ordered list of [`Permission`]
//! entries, one per resource. Lookups are fail-closed; a role or resource
//! with no entry grants nothing.

use std::collections::BTreeMap;

use crate::types::Role;

/// The actions a role may perform on one resource.
///
/// Deserialization goes through [`Permission::new`], so tables loaded from
/// JSON get the same de-duplication as ones built in code.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "RawPermission")]
pub struct Permission {
    resource: String,
    /// Allowed actions in declaration order, without duplicates.
    actions: Vec<String>,
}

#[derive(serde::Deserialize)]
struct RawPermission {
    resource: String,
    actions: Vec<String>,
}

impl From<RawPermission> for Permission {
    fn from(raw: RawPermission) -> Self {
        Permission::new(raw.resource, raw.actions)
    }
}

impl Permission {
    /// Builds a permission, collapsing repeated actions onto their first occurrence.
    pub fn new<R, I, A>(resource: R, actions: I) -> Self
    where
        R: Into<String>,
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let mut deduped: Vec<String> = Vec::new();
        for action in actions {
            let action = action.into();
            if !deduped.contains(&action) {
                deduped.push(action);
            }
        }
        Permission { resource: resource.into(), actions: deduped }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    #[inline]
    pub fn allows(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }
}

/// Mapping from role to its ordered permission entries.
///
/// Serialized as `{"ADMIN": [{"resource": "...", "actions": [...]}], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct PermissionTable {
    roles: BTreeMap<Role, Vec<Permission>>,
}

impl PermissionTable {
    /// An empty table. Every lookup against it is denied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `permission` to `role`'s entries.
    pub fn with(mut self, role: Role, permission: Permission) -> Self {
        self.roles.entry(role).or_default().push(permission);
        self
    }

    /// Loads a table from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Roles with at least one entry, in `Role` order.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.roles
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(role, _)| *role)
    }

    /// All entries declared for `role`; empty for roles absent from the table.
    pub fn permissions(&self, role: Role) -> &[Permission] {
        self.roles.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First entry for `resource`. Later duplicates are shadowed.
    fn entry(&self, role: Role, resource: &str) -> Option<&Permission> {
        self.permissions(role).iter().find(|p| p.resource == resource)
    }

    /// True iff `role` has an entry for `resource` whose actions contain `action`.
    pub fn has_permission(&self, role: Role, resource: &str, action: &str) -> bool {
        let allowed = self
            .entry(role, resource)
            .map(|p| p.allows(action))
            .unwrap_or(false);
        tracing::trace!(%role, resource, action, allowed, "permission lookup");
        allowed
    }

    /// The allowed actions for `role` on `resource`, or empty.
    pub fn get_allowed_actions(&self, role: Role, resource: &str) -> Vec<&str> {
        self.entry(role, resource)
            .map(|p| p.actions.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// The candidates `role` may perform on `resource`, in input order.
    pub fn filter_allowed_actions<I, S>(&self, role: Role, resource: &str, candidates: I) -> Vec<S>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match self.entry(role, resource) {
            Some(p) => candidates.into_iter().filter(|c| p.allows(c.as_ref())).collect(),
            None => Vec::new(),
        }
    }

    /// [`has_permission`](Self::has_permission) keyed by the server-issued role name.
    /// Unknown names have no permissions.
    pub fn has_permission_named(&self, role: &str, resource: &str, action: &str) -> bool {
        match role.parse::<Role>() {
            Ok(role) => self.has_permission(role, resource, action),
            Err(_) => {
                tracing::debug!(role, "unknown role, denying");
                false
            }
        }
    }

    pub fn get_allowed_actions_named(&self, role: &str, resource: &str) -> Vec<&str> {
        role.parse::<Role>()
            .map(|role| self.get_allowed_actions(role, resource))
            .unwrap_or_default()
    }

    pub fn filter_allowed_actions_named<I, S>(&self, role: &str, resource: &str, candidates: I) -> Vec<S>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match role.parse::<Role>() {
            Ok(role) => self.filter_allowed_actions(role, resource, candidates),
            Err(_) => Vec::new(),
        }
    }
}
