use proptest::prelude::*;
use leave_core::{
    access::{Permission, PermissionTable},
    rights::{self, actions, resources},
    types::Role,
};

const RESOURCES: [&str; 7] = [
    resources::EMPLOYEE,
    resources::DEPARTMENT,
    resources::LEAVE_REQUEST,
    resources::ATTENDANCE,
    resources::SALARY,
    resources::REPORT,
    "payroll",
];

/// Every (role, resource, action) the standard table declares.
fn declared_triples() -> Vec<(Role, String, String)> {
    let table = rights::standard_table();
    let mut out = Vec::new();
    for role in table.roles() {
        for p in table.permissions(role) {
            for a in p.actions() {
                out.push((role, p.resource().to_string(), a.clone()));
            }
        }
    }
    out
}

fn action_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec![
            actions::CREATE,
            actions::READ,
            actions::UPDATE,
            actions::DELETE,
            actions::APPROVE,
            actions::REJECT,
            actions::CANCEL,
            actions::EXPORT,
        ])
        .prop_map(str::to_string),
        "[a-z]{1,10}",
    ]
}

proptest! {
    /// Role names that do not parse never grant anything.
    #[test]
    fn prop_unknown_role_names_have_no_permissions(
        role in "[A-Za-z_]{1,12}",
        resource in "[a-z_]{1,16}",
        action in action_strategy(),
    ) {
        prop_assume!(role.parse::<Role>().is_err());
        prop_assert!(!rights::has_permission(&role, &resource, &action));
        prop_assert!(rights::get_allowed_actions(&role, &resource).is_empty());
        prop_assert!(rights::filter_allowed_actions(&role, &resource, vec![action.clone()]).is_empty());
    }

    /// Known roles without table entries behave like unknown roles.
    #[test]
    fn prop_roles_absent_from_table_have_no_permissions(
        role in prop::sample::select(vec![Role::HrManager, Role::Employee, Role::Guest]),
        resource in prop::sample::select(RESOURCES.to_vec()),
        action in action_strategy(),
    ) {
        prop_assert!(!rights::standard_table().has_permission(role, resource, &action));
        prop_assert!(!rights::has_permission(role.as_str(), resource, &action));
    }

    /// Every declared triple is granted.
    #[test]
    fn prop_declared_entries_are_granted(idx in any::<prop::sample::Index>()) {
        let triples = declared_triples();
        let (role, resource, action) = idx.get(&triples);
        prop_assert!(rights::has_permission(role.as_str(), resource, action));
    }

    /// Granted exactly when the action is in the declared set.
    #[test]
    fn prop_grant_matches_declared_set(
        role in prop::sample::select(Role::ALL.to_vec()),
        resource in prop::sample::select(RESOURCES.to_vec()),
        action in action_strategy(),
    ) {
        let allowed = rights::get_allowed_actions(role.as_str(), resource);
        prop_assert_eq!(
            rights::has_permission(role.as_str(), resource, &action),
            allowed.contains(&action.as_str())
        );
    }

    /// Filtering the allowed set by itself returns it unchanged.
    #[test]
    fn prop_filter_of_allowed_is_identity(
        role in prop::sample::select(Role::ALL.to_vec()),
        resource in prop::sample::select(RESOURCES.to_vec()),
    ) {
        let allowed = rights::get_allowed_actions(role.as_str(), resource);
        let filtered = rights::filter_allowed_actions(role.as_str(), resource, allowed.clone());
        prop_assert_eq!(filtered, allowed);
    }

    /// Filtering keeps exactly the permitted candidates, in input order.
    #[test]
    fn prop_filter_is_ordered_subsequence(
        role in prop::sample::select(Role::ALL.to_vec()),
        resource in prop::sample::select(RESOURCES.to_vec()),
        candidates in prop::collection::vec(action_strategy(), 0..12),
    ) {
        let expected: Vec<String> = candidates
            .iter()
            .filter(|c| rights::has_permission(role.as_str(), resource, c))
            .cloned()
            .collect();
        let got = rights::filter_allowed_actions(role.as_str(), resource, candidates.clone());
        prop_assert_eq!(got, expected);
    }

    /// Any table denies every role it has no entries for.
    #[test]
    fn prop_arbitrary_table_fails_closed(
        entries in prop::collection::vec(
            (
                prop::sample::select(vec![Role::Admin, Role::Manager]),
                "[a-z]{1,6}",
                prop::collection::vec("[a-z]{1,6}", 0..5),
            ),
            0..8,
        ),
        query_resource in "[a-z]{1,6}",
        query_action in "[a-z]{1,6}",
    ) {
        let mut table = PermissionTable::new();
        for (role, resource, acts) in entries {
            table = table.with(role, Permission::new(resource, acts));
        }
        for role in [Role::HrManager, Role::Employee, Role::Guest, Role::Staff] {
            prop_assert!(!table.has_permission(role, &query_resource, &query_action));
        }
    }
}
