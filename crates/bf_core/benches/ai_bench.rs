//! One full AI decision from the kickoff layout and from open play.
//!
//! Run with: `cargo bench -p bf_core`

use std::hint::black_box;

use bf_core::models::{vec2, Controller, DiskId, TeamSide};
use bf_core::{make_policy, EngineConfig, MatchSession, PhysicsEvent, PolicyKind, WorldProbe};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

struct Settled;

impl WorldProbe for Settled {
    fn is_stable(&self) -> bool {
        true
    }
}

fn open_play() -> MatchSession {
    let mut session =
        MatchSession::new(EngineConfig::deterministic(), Controller::Ai(PolicyKind::Decourt), Controller::Human)
            .expect("default config is valid");
    session.start_half(true);
    session.begin_turn();
    session.select_disk(DiskId::new(TeamSide::Home, 9)).expect("kickoff taker");
    session.report(PhysicsEvent::BallHitDisk { team: TeamSide::Home });
    session.resolve_turn(&Settled, false).expect("world is settled");
    session.begin_turn();
    session.board_mut().ball.position = vec2(6.0, -18.0);
    session
}

fn benchmark_decisions(c: &mut Criterion) {
    let session = open_play();
    let mut group = c.benchmark_group("Decision");

    for kind in [PolicyKind::Dummy, PolicyKind::Fuzzy, PolicyKind::Decourt] {
        group.bench_with_input(BenchmarkId::new("open_play", kind), &kind, |b, &kind| {
            b.iter(|| {
                let mut policy = make_policy(kind, session.config());
                black_box(session.decide(policy.as_mut()))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_decisions);
criterion_main!(benches);
