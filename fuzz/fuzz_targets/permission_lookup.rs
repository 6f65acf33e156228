#![no_main]

// Harness: permission_lookup
// Lookups never panic, and filtering never grants more than has_permission.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use leave_core::rights;

#[derive(Arbitrary, Debug)]
struct Query {
    role: String,
    resource: String,
    candidates: Vec<String>,
}

fuzz_target!(|q: Query| {
    let allowed = rights::filter_allowed_actions(&q.role, &q.resource, q.candidates.clone());
    for action in &allowed {
        assert!(rights::has_permission(&q.role, &q.resource, action));
    }
    assert!(allowed.len() <= q.candidates.len());
});
