use std::sync::Arc;

use leave_core::api::ApiOutcome;
use leave_core::error::ApiError;
use leave_core::events::{decode_frame, EventDispatcher, ServerEvent, Toast, ToastLevel};
use leave_core::rights::{self, actions, resources};
use leave_core::testing::RecordingNotifier;
use leave_core::{PermissionTable, Role};
use parking_lot::Mutex;
use serde_json::{json, Value};

// --- Permission model ---

#[test]
fn admin_department_crud_but_not_approve() {
    for action in ["create", "read", "update", "delete"] {
        assert!(rights::has_permission("Admin", "department", action), "{action}");
    }
    assert!(!rights::has_permission("Admin", "department", "approve"));
}

#[test]
fn manager_leave_request_actions() {
    let allowed = rights::get_allowed_actions("Manager", "leave_request");
    let mut sorted = allowed.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec!["approve", "read", "reject"]);
    assert!(!rights::has_permission("Manager", "leave_request", "create"));
}

#[test]
fn unknown_role_and_resource_fail_closed() {
    assert!(!rights::has_permission("Auditor", resources::REPORT, actions::READ));
    assert!(!rights::has_permission("Manager", "payroll", actions::READ));
    assert!(rights::get_allowed_actions("Manager", "payroll").is_empty());
}

#[test]
fn crate_root_reexports_match_rights_module() {
    assert_eq!(
        leave_core::has_permission("STAFF", resources::ATTENDANCE, actions::CREATE),
        rights::has_permission("STAFF", resources::ATTENDANCE, actions::CREATE)
    );
}

#[test]
fn custom_table_from_json_covers_dashboard_roles() {
    let table = PermissionTable::from_json(
        r#"{
            "HR_MANAGER": [{"resource": "employee", "actions": ["create", "read", "update"]}],
            "EMPLOYEE": [{"resource": "leave_request", "actions": ["create", "read", "cancel"]}]
        }"#,
    )
    .unwrap();
    assert!(table.has_permission(Role::HrManager, "employee", "update"));
    assert!(!table.has_permission(Role::HrManager, "employee", "delete"));
    assert!(table.has_permission_named("employee", "leave_request", "cancel"));
    assert!(!table.has_permission(Role::Guest, "leave_request", "read"));
    assert!(!table.has_permission(Role::Admin, "employee", "read"));
}

// --- Notification fan-out ---

#[test]
fn approved_event_yields_one_toast_and_raw_payload() {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut dispatcher = EventDispatcher::new(notifier.clone());
    let calls: Arc<Mutex<Vec<Value>>> = Arc::default();
    let sink = calls.clone();
    dispatcher.set_handler(Some(Arc::new(move |_: ServerEvent, p: &Value| sink.lock().push(p.clone()))));
    dispatcher.subscribe_all();

    let frame = decode_frame(r#"{"event":"leave_request_approved","payload":{"message":"Leave approved"}}"#).unwrap();
    assert!(dispatcher.dispatch_frame(&frame));

    assert_eq!(notifier.toasts(), vec![Toast::new(ToastLevel::Success, "Leave approved")]);
    assert_eq!(*calls.lock(), vec![json!({"message": "Leave approved"})]);
}

#[test]
fn all_recognised_event_names_decode() {
    for name in [
        "leave_request_created",
        "leave_request_approved",
        "leave_request_rejected",
        "leave_request_cancelled",
        "notification",
    ] {
        let frame = decode_frame(&format!(r#"{{"event":"{}"}}"#, name)).unwrap();
        assert!(frame.server_event().is_some(), "{name}");
    }
}

// --- API boundary ---

#[test]
fn api_outcome_normalizes_response_shapes() {
    let enveloped: ApiOutcome<Vec<u32>> = ApiOutcome::from_response(200, r#"{"success":true,"data":[1,2]}"#);
    let bare: ApiOutcome<Vec<u32>> = ApiOutcome::from_response(200, "[1,2]");
    assert_eq!(enveloped, bare);

    let failed: ApiOutcome<Vec<u32>> = ApiOutcome::from_response(400, r#"{"message":"Invalid dates"}"#);
    assert_eq!(failed.into_result(), Err(ApiError::Remote("Invalid dates".into())));
}
