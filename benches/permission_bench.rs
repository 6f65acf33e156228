use criterion::{criterion_group, criterion_main, Criterion};
use leave_core::rights::{self, actions, resources};
use leave_core::types::Role;

fn permission_benchmarks(c: &mut Criterion) {
    let table = rights::standard_table();

    c.bench_function("has_permission_typed", |b| {
        b.iter(|| table.has_permission(Role::Manager, resources::LEAVE_REQUEST, actions::APPROVE))
    });

    c.bench_function("has_permission_named", |b| {
        b.iter(|| rights::has_permission("HR_MANAGER", resources::LEAVE_REQUEST, actions::APPROVE))
    });

    let candidates = [
        actions::CREATE,
        actions::READ,
        actions::UPDATE,
        actions::DELETE,
        actions::APPROVE,
        actions::REJECT,
    ];
    c.bench_function("filter_allowed_actions", |b| {
        b.iter(|| rights::filter_allowed_actions("ADMIN", resources::LEAVE_REQUEST, candidates))
    });
}

criterion_group!(benches, permission_benchmarks);
criterion_main!(benches);
