// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glance Router: gaze-driven pointer input for head-mounted displays.
//!
//! ## Overview
//!
//! This crate turns a head pose into pointer events. Looking at a control
//! hovers it; keeping the gaze on it for the dwell threshold commits a click.
//! An external button may drive the same pointer instead of, or in addition
//! to, dwell.
//!
//! ## Pipeline
//!
//! Once per tick, [`GazeRouter::tick`](crate::router::GazeRouter::tick):
//!
//! 1) Casts the head ray with [`RayCaster`](crate::raycast::RayCaster). Screen-space
//!    UI and 3D colliders are merged into one list ranked by
//!    [`DepthKey`](crate::types::DepthKey): UI always beats colliders, UI is ranked by
//!    canvas sort order then draw depth, colliders by distance.
//! 2) Resolves the winner to its nearest interactable ancestor.
//! 3) Feeds the target to [`PointerStateMachine`](crate::pointer::PointerStateMachine),
//!    which emits enter/exit and drag events.
//! 4) Feeds the interactive target to [`DwellTimer`](crate::dwell::DwellTimer). On
//!    completion a press and release is committed, unless the debounce window
//!    after the previous release is still open.
//! 5) Invokes the [`Activate`](crate::types::Activate) collaborator for each click.
//!
//! ## Scenes
//!
//! The router reads the world through the [`Surfaces`](crate::raycast::Surfaces) and
//! [`Capabilities`](crate::types::Capabilities) traits. The `scene_adapter` feature
//! (on by default) implements both for `glance_scene::Scene`.
//!
//! ## Minimal usage
//!
//! ```
//! use glance_router::config::GazeConfig;
//! use glance_router::router::{Frame, GazeRouter};
//! use glance_router::types::HeadPose;
//! use glance_scene::{Collider, ColliderShape, EntityId, Interactable, LocalEntity, Scene};
//! use glam::{Affine3A, Vec3};
//! use kurbo::Size;
//!
//! let mut scene = Scene::new();
//! let button = scene.insert(
//!     None,
//!     LocalEntity {
//!         collider: Some(Collider {
//!             shape: ColliderShape::Sphere { radius: 0.5 },
//!             transform: Affine3A::from_translation(Vec3::new(0.0, 0.0, 3.0)),
//!             layer: 0,
//!         }),
//!         interactable: Some(Interactable::default()),
//!         ..Default::default()
//!     },
//! );
//! scene.commit();
//!
//! let mut router: GazeRouter<EntityId, Vec<EntityId>> =
//!     GazeRouter::new(GazeConfig::default(), Vec::new()).unwrap();
//! let _ = router.activate();
//! let head = HeadPose { position: Vec3::ZERO, forward: Vec3::Z };
//! for _ in 0..4 {
//!     let _ = router.tick(&Frame::new(head, Size::new(1280.0, 720.0), &scene, 0.5));
//! }
//! assert_eq!(router.activator(), &vec![button]);
//! ```

pub mod adapters;
pub mod config;
pub mod dwell;
pub mod error;
pub mod pointer;
pub mod raycast;
pub mod router;
pub mod types;
