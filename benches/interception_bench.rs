// benches/interception_bench.rs
//! Per-attempt cost of the interception decision

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sentra_offline::interception::{
    decide, matches, on_connect_attempt, BlockConfiguration, ConnectMode,
};
use sentra_offline::{block, GuardedConnector};

fn large_config() -> BlockConfiguration {
    BlockConfiguration::new(
        (0..1000).map(|i| format!("host-{}.example.com", i)),
        1..1000u16,
    )
}

fn bench_matcher(c: &mut Criterion) {
    let config = large_config();

    c.bench_function("matches_hit_host", |b| {
        b.iter(|| matches(black_box("host-500.example.com"), black_box(80), &config))
    });

    c.bench_function("matches_miss", |b| {
        b.iter(|| matches(black_box("api.example.org"), black_box(8443), &config))
    });
}

fn bench_decision(c: &mut Criterion) {
    let config = large_config();

    c.bench_function("decide_explicit_policy", |b| {
        b.iter(|| {
            decide(
                black_box("api.example.org"),
                black_box(8443),
                ConnectMode::Raising,
                Some(&config),
            )
        })
    });

    c.bench_function("on_connect_attempt_no_session", |b| {
        b.iter(|| on_connect_attempt(black_box("127.0.0.1"), black_box(8000), ConnectMode::Raising))
    });

    let _session = block(large_config());
    c.bench_function("on_connect_attempt_in_session", |b| {
        b.iter(|| on_connect_attempt(black_box("127.0.0.1"), black_box(8000), ConnectMode::Raising))
    });
}

fn bench_blocked_connect(c: &mut Criterion) {
    let connector = GuardedConnector::with_policy(BlockConfiguration::hosts(["127.0.0.1"]));

    c.bench_function("guarded_connect_blocked", |b| {
        b.iter(|| connector.connect(black_box("127.0.0.1"), black_box(8000)).is_err())
    });
}

criterion_group!(benches, bench_matcher, bench_decision, bench_blocked_connect);
criterion_main!(benches);
