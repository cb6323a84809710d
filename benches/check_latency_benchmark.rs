//! Privilege check latency when the answer is already cached.
//!
//! # Benchmarks
//!
//! - `system_check_cached`: direct system grant on a cached user
//! - `path_check_via_role`: path grant inherited from a cached role
//! - `path_batch_cached`: 64-path batch with a few denied positions
//!
//! # Running
//!
//! ```bash
//! cargo bench --bench check_latency_benchmark
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use authority_core::{
    AuthorityChecker, AuthorityConfig, CheckTarget, LocalAuthority, PathPattern, PrivilegeType,
};
use criterion::{Criterion, criterion_group, criterion_main};

fn setup() -> AuthorityChecker {
    let config = AuthorityConfig::default();
    let authority = LocalAuthority::in_memory(&config).unwrap();
    authority.create_user("bench_user", "password").unwrap();
    authority.create_role("bench_role").unwrap();
    authority.grant_role_to_user("bench_role", "bench_user").unwrap();
    authority
        .grant_user_privilege("bench_user", PrivilegeType::UseUdf, &CheckTarget::System, false)
        .unwrap();
    for idx in 0..16 {
        let target = CheckTarget::path(&format!("root.sg{idx}.**")).unwrap();
        authority
            .grant_role_privilege("bench_role", PrivilegeType::ReadData, &target, false)
            .unwrap();
    }

    let checker = AuthorityChecker::new(&config, Arc::new(authority)).unwrap();
    // Warm the cache.
    assert!(
        checker
            .check_system_privilege("bench_user", PrivilegeType::UseUdf)
            .is_success()
    );
    checker
}

fn bench_system_check(c: &mut Criterion) {
    let checker = setup();
    c.bench_function("system_check_cached", |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let status = checker.check_system_privilege("bench_user", PrivilegeType::UseUdf);
                std::hint::black_box(status);
            }
            start.elapsed()
        });
    });
}

fn bench_role_path_check(c: &mut Criterion) {
    let checker = setup();
    let path = PathPattern::parse("root.sg15.d1.s1").unwrap();
    c.bench_function("path_check_via_role", |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let status =
                    checker.check_path_privilege("bench_user", &path, PrivilegeType::ReadData);
                std::hint::black_box(status);
            }
            start.elapsed()
        });
    });
}

fn bench_path_batch(c: &mut Criterion) {
    let checker = setup();
    let paths: Vec<PathPattern> = (0..64)
        .map(|idx| PathPattern::parse(&format!("root.sg{}.d{idx}.s1", idx % 20)).unwrap())
        .collect();
    c.bench_function("path_batch_cached", |b| {
        b.iter_custom(|iters| {
            let mut total = Duration::ZERO;
            for _ in 0..iters {
                let start = Instant::now();
                let result = checker.check_paths("bench_user", &paths, PrivilegeType::ReadData);
                total += start.elapsed();
                std::hint::black_box(result);
            }
            total
        });
    });
}

criterion_group!(
    benches,
    bench_system_check,
    bench_role_path_check,
    bench_path_batch
);
criterion_main!(benches);
