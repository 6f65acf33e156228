//!
//! Rights vocabulary and the standard permission table.
//!
//! Defines the resource and action names the dashboards ask about, the
//! process-wide standard [`PermissionTable`], and free lookup functions over it
//! keyed by the server-issued role name.
//!
//! This is UI gating only. The backend enforces authorization on its own.

use once_cell::sync::Lazy;

use crate::access::{Permission, PermissionTable};
use crate::types::Role;

/// Action names.
pub mod actions {
    pub const CREATE: &str = "create";
    pub const READ: &str = "read";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const APPROVE: &str = "approve";
    pub const REJECT: &str = "reject";
    pub const CANCEL: &str = "cancel";
    pub const EXPORT: &str = "export";

    /// The four CRUD actions, in canonical order.
    pub const CRUD: [&str; 4] = [CREATE, READ, UPDATE, DELETE];
}

/// Resource names.
pub mod resources {
    pub const EMPLOYEE: &str = "employee";
    pub const DEPARTMENT: &str = "department";
    pub const LEAVE_REQUEST: &str = "leave_request";
    pub const ATTENDANCE: &str = "attendance";
    pub const SALARY: &str = "salary";
    pub const REPORT: &str = "report";
}

static STANDARD: Lazy<PermissionTable> = Lazy::new(build_standard_table);

fn build_standard_table() -> PermissionTable {
    use actions::*;
    use resources::*;

    PermissionTable::new()
        .with(Role::Admin, Permission::new(EMPLOYEE, CRUD))
        .with(Role::Admin, Permission::new(DEPARTMENT, CRUD))
        .with(
            Role::Admin,
            Permission::new(LEAVE_REQUEST, [CREATE, READ, UPDATE, DELETE, APPROVE, REJECT]),
        )
        .with(Role::Admin, Permission::new(ATTENDANCE, CRUD))
        .with(Role::Admin, Permission::new(SALARY, CRUD))
        .with(Role::Admin, Permission::new(REPORT, [READ, EXPORT]))
        .with(Role::Manager, Permission::new(EMPLOYEE, [READ]))
        .with(Role::Manager, Permission::new(DEPARTMENT, [READ]))
        .with(Role::Manager, Permission::new(LEAVE_REQUEST, [READ, APPROVE, REJECT]))
        .with(Role::Manager, Permission::new(ATTENDANCE, [READ]))
        .with(Role::Manager, Permission::new(REPORT, [READ]))
        .with(Role::Staff, Permission::new(LEAVE_REQUEST, [CREATE, READ, CANCEL]))
        .with(Role::Staff, Permission::new(ATTENDANCE, [CREATE, READ]))
        .with(Role::Staff, Permission::new(EMPLOYEE, [READ]))
}

/// The process-wide table, built on first use and read-only afterwards.
///
/// Only `ADMIN`, `MANAGER` and `STAFF` carry entries; every other role is denied.
pub fn standard_table() -> &'static PermissionTable {
    &STANDARD
}

/// May `role` perform `action` on `resource`? Unknown roles and resources are denied.
#[inline]
pub fn has_permission(role: &str, resource: &str, action: &str) -> bool {
    standard_table().has_permission_named(role, resource, action)
}

/// The actions `role` may perform on `resource`, in declaration order.
#[inline]
pub fn get_allowed_actions(role: &str, resource: &str) -> Vec<&'static str> {
    standard_table().get_allowed_actions_named(role, resource)
}

/// The subset of `candidates` that `role` may perform on `resource`, in input order.
#[inline]
pub fn filter_allowed_actions<I, S>(role: &str, resource: &str, candidates: I) -> Vec<S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    standard_table().filter_allowed_actions_named(role, resource, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_department_crud() {
        for action in actions::CRUD {
            assert!(has_permission("ADMIN", resources::DEPARTMENT, action));
        }
        assert!(!has_permission("ADMIN", resources::DEPARTMENT, actions::APPROVE));
    }

    #[test]
    fn test_manager_leave_request() {
        assert_eq!(
            get_allowed_actions("MANAGER", resources::LEAVE_REQUEST),
            vec![actions::READ, actions::APPROVE, actions::REJECT]
        );
        assert!(!has_permission("MANAGER", resources::LEAVE_REQUEST, actions::CREATE));
    }

    #[test]
    fn test_roles_outside_standard_table_are_denied() {
        for role in [Role::HrManager, Role::Employee, Role::Guest] {
            assert!(standard_table().permissions(role).is_empty());
            assert!(!has_permission(role.as_str(), resources::LEAVE_REQUEST, actions::READ));
        }
    }

    #[test]
    fn test_staff_can_cancel_own_requests() {
        assert!(has_permission("staff", resources::LEAVE_REQUEST, actions::CANCEL));
        assert!(!has_permission("staff", resources::LEAVE_REQUEST, actions::APPROVE));
    }

    #[test]
    fn test_filter_over_standard_table() {
        let shown = filter_allowed_actions(
            "MANAGER",
            resources::LEAVE_REQUEST,
            vec![actions::CREATE, actions::APPROVE, actions::DELETE, actions::REJECT],
        );
        assert_eq!(shown, vec![actions::APPROVE, actions::REJECT]);
    }
}
