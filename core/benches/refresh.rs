use criterion::{Criterion, criterion_group, criterion_main};
use geocache_core::*;
use std::hint::black_box;

fn bench_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("refresh");

    for neighborhood_size in [4u16, 8, 16] {
        let config = GameConfig::new(1e-4, neighborhood_size, 0.1, 10, GameConfig::CLASSROOM);

        group.bench_function(format!("standing_r{neighborhood_size}"), |b| {
            let mut board = Board::from_config(&config);
            let mut lifecycle = CacheLifecycle::new();
            b.iter(|| lifecycle.refresh(&mut board, &config, black_box(config.start)))
        });

        group.bench_function(format!("walking_r{neighborhood_size}"), |b| {
            let mut session = GameSession::new(config);
            let mut step = 0u32;
            b.iter(|| {
                let event = if step % 8 < 4 {
                    GameEvent::NORTH
                } else {
                    GameEvent::SOUTH
                };
                step = step.wrapping_add(1);
                session.handle(black_box(event), &mut NullSurface)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_refresh);
criterion_main!(benches);
