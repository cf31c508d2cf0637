// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::{Affine3A, Vec3};
use glance_router::config::GazeConfig;
use glance_router::raycast::{CastParams, RayCaster};
use glance_router::router::{Frame, GazeRouter};
use glance_router::types::{HeadPose, NoActivation, Ray};
use glance_scene::{
    Canvas, Collider, ColliderShape, EntityId, Graphic, Interactable, LocalEntity, Scene,
};
use kurbo::{Point, Rect, Size};

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
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        (v as f32) / ((1u64 << 24) as f32)
    }
}

/// `colliders` boxes scattered in front of the origin plus a grid of
/// `buttons` × `buttons` overlay buttons.
fn gen_scene(colliders: usize, buttons: usize) -> Scene {
    let mut scene = Scene::new();
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..colliders {
        let pos = Vec3::new(
            (rng.next_f32() - 0.5) * 20.0,
            (rng.next_f32() - 0.5) * 20.0,
            1.0 + rng.next_f32() * 80.0,
        );
        scene.insert(
            None,
            LocalEntity {
                collider: Some(Collider {
                    shape: ColliderShape::Cuboid {
                        half_extents: Vec3::splat(0.5),
                    },
                    transform: Affine3A::from_translation(pos),
                    layer: 0,
                }),
                interactable: Some(Interactable::default()),
                ..Default::default()
            },
        );
    }
    let canvas = scene.insert(
        None,
        LocalEntity {
            canvas: Some(Canvas::default()),
            ..Default::default()
        },
    );
    for y in 0..buttons {
        for x in 0..buttons {
            let (x0, y0) = (x as f64 * 20.0, y as f64 * 20.0);
            scene.insert(
                Some(canvas),
                LocalEntity {
                    graphic: Some(Graphic {
                        bounds: Rect::new(x0, y0, x0 + 18.0, y0 + 18.0),
                        ..Default::default()
                    }),
                    interactable: Some(Interactable::default()),
                    ..Default::default()
                },
            );
        }
    }
    scene.commit();
    scene
}

fn bench_cast(c: &mut Criterion) {
    let mut group = c.benchmark_group("cast");
    for &n in &[100usize, 1_000, 10_000] {
        let scene = gen_scene(n, 0);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        // Off-screen so only colliders are ranked.
        let params = CastParams {
            screen_point: Point::new(-1.0, -1.0),
            max_distance: 100.0,
            layer_mask: u32::MAX,
        };
        let mut caster: RayCaster<EntityId> = RayCaster::new();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("colliders_n{n}"), |b| {
            b.iter(|| {
                let hits = caster.cast(&scene, black_box(&ray), &params).len();
                black_box(hits);
            });
        });
    }
    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for &n in &[16usize, 64] {
        let scene = gen_scene(1_000, n);
        let mut router: GazeRouter<EntityId> =
            GazeRouter::new(GazeConfig::default(), NoActivation).expect("default config is valid");
        let _ = router.activate();
        let viewport = Size::new(n as f64 * 20.0, n as f64 * 20.0);
        let head = HeadPose {
            position: Vec3::ZERO,
            forward: Vec3::Z,
        };
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("ui_grid_n{n}"), |b| {
            b.iter(|| {
                let report = router.tick(&Frame::new(head, viewport, &scene, 1.0 / 90.0));
                black_box(report.progress);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cast, bench_tick);
criterion_main!(benches);
