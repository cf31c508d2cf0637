// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene menu.
//!
//! A world-space lamp and an overlay menu with two buttons. The head sweeps
//! from the lamp to the menu and dwells on a button; clicks are collected by
//! the activation collaborator.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p glance_demos --example scene_menu`

use std::path::Path;

use glam::{Affine3A, Vec3};
use glance_router::config::GazeConfig;
use glance_router::router::{Frame, GazeRouter, ReticleEvent};
use glance_router::types::HeadPose;
use glance_scene::{
    Canvas, Collider, ColliderShape, EntityFlags, EntityId, Graphic, Interactable, LocalEntity,
    RenderMode, Scene,
};
use kurbo::{Rect, Size};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = GazeConfig::load_or_default(Path::new("demos/gaze.toml"));
    tracing::info!(?config, "loaded gaze config");

    let mut scene = Scene::new();
    let lamp = scene.insert(
        None,
        LocalEntity {
            collider: Some(Collider {
                shape: ColliderShape::Cuboid {
                    half_extents: Vec3::new(0.3, 0.6, 0.3),
                },
                transform: Affine3A::from_translation(Vec3::new(2.0, 0.0, 4.0)),
                layer: 0,
            }),
            interactable: Some(Interactable::default()),
            ..Default::default()
        },
    );
    let menu = scene.insert(
        None,
        LocalEntity {
            canvas: Some(Canvas {
                render_mode: RenderMode::ScreenSpaceOverlay,
                sort_order: 10,
                ..Default::default()
            }),
            flags: EntityFlags::RAYCAST_TARGET,
            ..Default::default()
        },
    );
    let resume = scene.insert(
        Some(menu),
        LocalEntity {
            graphic: Some(Graphic {
                bounds: Rect::new(540.0, 300.0, 740.0, 380.0),
                ..Default::default()
            }),
            interactable: Some(Interactable::default()),
            ..Default::default()
        },
    );
    let quit = scene.insert(
        Some(menu),
        LocalEntity {
            graphic: Some(Graphic {
                bounds: Rect::new(540.0, 400.0, 740.0, 480.0),
                ..Default::default()
            }),
            interactable: Some(Interactable { enabled: false }),
            ..Default::default()
        },
    );
    scene.commit();
    println!("lamp={lamp:?} resume={resume:?} quit={quit:?}");

    let Ok(mut router) = GazeRouter::<EntityId, Vec<EntityId>>::new(config, Vec::new()) else {
        eprintln!("invalid gaze config");
        return;
    };
    let _ = router.activate();
    let viewport = Size::new(1280.0, 720.0);
    let dt = 0.1;

    // Look at the lamp until it activates.
    let at_lamp = HeadPose {
        position: Vec3::ZERO,
        forward: Vec3::new(2.0, 0.0, 4.0),
    };
    for _ in 0..20 {
        let report = router.tick(&Frame::new(at_lamp, viewport, &scene, dt));
        print_report(router.clock(), &report.reticle, report.progress);
    }

    // Open the menu; the overlay now takes the gaze point at the screen center.
    scene.set_flags(menu, EntityFlags::default());
    scene.commit();
    for _ in 0..20 {
        let report = router.tick(&Frame::new(at_lamp, viewport, &scene, dt));
        print_report(router.clock(), &report.reticle, report.progress);
    }

    let report = router.deactivate();
    println!("deactivated: {:?}", report.reticle);
    println!("activated: {:?}", router.activator());
}

fn print_report<K: core::fmt::Debug>(clock: f64, reticle: &[ReticleEvent<K>], progress: f32) {
    for event in reticle {
        if !matches!(event, ReticleEvent::Stay { .. }) {
            println!("t={clock:.1} {event:?}");
        }
    }
    if progress > 0.0 {
        println!("t={clock:.1} dwell {:.0}%", progress * 100.0);
    }
}
