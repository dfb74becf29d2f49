use criterion::{black_box, criterion_group, criterion_main, Criterion};
use minofall::core::catalog::base_offsets;
use minofall::core::{rotated, Grid, Session};
use minofall::io::{MemoryRender, TimerQueue};
use minofall::types::{GameConfig, GameKey, Rgb, ShapeKind};

fn bench_rotation(c: &mut Criterion) {
    let offsets = base_offsets(ShapeKind::T);

    c.bench_function("rotate_t_cw", |b| {
        b.iter(|| rotated(black_box(&offsets), ShapeKind::T, true))
    });
}

fn bench_drop_distance(c: &mut Criterion) {
    let mut grid = Grid::new(10, 20);
    let mut render = MemoryRender::new();
    // Uneven floor.
    for (row, col) in [(15, 2), (17, 4), (18, 7), (19, 0)] {
        grid.place(row, col, Rgb::default(), &mut render);
    }
    let offsets = base_offsets(ShapeKind::I);

    c.bench_function("drop_distance", |b| {
        b.iter(|| grid.drop_distance(black_box(&offsets), (0, 3)))
    });
}

fn bench_line_clear(c: &mut Criterion) {
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut grid = Grid::new(10, 20);
            let mut render = MemoryRender::new();
            // Fill bottom 4 rows
            for row in 16..20 {
                for col in 0..10 {
                    grid.place(row, col, Rgb::default(), &mut render);
                }
            }
            grid.clear_completed_rows(&mut render)
        })
    });
}

fn bench_hard_drop_cycle(c: &mut Criterion) {
    c.bench_function("hard_drop_cycle", |b| {
        b.iter(|| {
            let mut session = Session::new(GameConfig::default(), black_box(12345)).unwrap();
            let mut render = MemoryRender::new();
            let mut timers = TimerQueue::new();
            session.start(&mut render, &mut timers);
            for _ in 0..5 {
                session.handle_key_down(GameKey::HardDrop, &mut render, &mut timers);
            }
            session.grid().occupied_count()
        })
    });
}

criterion_group!(
    benches,
    bench_rotation,
    bench_drop_distance,
    bench_line_clear,
    bench_hard_drop_cycle
);
criterion_main!(benches);
