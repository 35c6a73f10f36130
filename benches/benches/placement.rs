// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Rect, Size};
use understory_placement::{
    FlexiblePositioner, Placement, arrow_position, candidate_strategies, detect_placement,
};

const VIEWPORT: Rect = Rect::new(0.0, 0.0, 1280.0, 800.0);
const PANEL: Size = Size::new(240.0, 120.0);

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Trigger-sized rects scattered over the viewport, many near its edges.
fn gen_targets(count: usize) -> Vec<Rect> {
    let mut rng = Rng::new(0xFACE_FEED_CAFE_BABE);
    (0..count)
        .map(|_| {
            let x0 = rng.next_f64() * (VIEWPORT.width() - 80.0);
            let y0 = rng.next_f64() * (VIEWPORT.height() - 24.0);
            Rect::from_origin_size((x0, y0), (80.0, 24.0))
        })
        .collect()
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategies");
    group.throughput(Throughput::Elements(Placement::ALL.len() as u64));
    for smart in [false, true] {
        group.bench_function(format!("candidates_smart_{smart}"), |b| {
            b.iter(|| {
                for placement in Placement::ALL {
                    black_box(candidate_strategies(black_box(placement), 8.0, smart));
                }
            })
        });
    }
    group.finish();
}

fn bench_position(c: &mut Criterion) {
    let mut group = c.benchmark_group("position");
    let positioner = FlexiblePositioner::default();
    for &n in &[64usize, 1024] {
        let targets = gen_targets(n);
        group.throughput(Throughput::Elements(n as u64));
        for placement in [Placement::BOTTOM, Placement::RIGHT_END] {
            let strategies = candidate_strategies(placement, 8.0, true);
            group.bench_function(format!("{placement}_n{n}"), |b| {
                b.iter(|| {
                    let mut flipped = 0_usize;
                    for target in &targets {
                        if let Some(p) = positioner.position(&strategies, *target, PANEL, VIEWPORT) {
                            flipped += usize::from(p.strategy != 0);
                        }
                    }
                    black_box(flipped);
                })
            });
        }
    }
    group.finish();
}

fn bench_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("refresh");
    let positioner = FlexiblePositioner::default();
    let strategies = candidate_strategies(Placement::BOTTOM_START, 8.0, true);
    let targets = gen_targets(1024);
    group.throughput(Throughput::Elements(targets.len() as u64));
    group.bench_function("detect_and_arrow_n1024", |b| {
        b.iter_batched(
            || {
                targets
                    .iter()
                    .filter_map(|t| {
                        positioner
                            .position(&strategies, *t, PANEL, VIEWPORT)
                            .map(|p| (*t, p.rect))
                    })
                    .collect::<Vec<_>>()
            },
            |pairs| {
                for (target, panel) in pairs {
                    let actual = detect_placement(target, panel, Placement::BOTTOM_START);
                    black_box(arrow_position(actual, target, panel));
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_strategies, bench_position, bench_refresh);
criterion_main!(benches);
