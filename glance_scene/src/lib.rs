// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glance Scene: an arena of UI graphics and 3D colliders for gaze picking.
//!
//! ## Overview
//!
//! The scene owns the interactive surfaces of a frame and answers the two
//! geometric questions a gaze pointer asks:
//!
//! - Which screen-space UI graphics lie under a screen point, topmost first
//!   ([`Scene::graphics_at`]).
//! - Which colliders does a world-space ray pass through, nearest first
//!   ([`Scene::raycast`]).
//!
//! Entities live in a generational arena with parent indices. Ownership
//! questions (nearest canvas, nearest interactable ancestor) walk those
//! parent links instead of looking components up dynamically.
//!
//! ## Not a renderer or layout engine
//!
//! Graphic bounds are expected to be laid out upstream; the scene composes
//! 2D transforms from the owning [`Canvas`] down and caches the resulting
//! screen rectangles at [`Scene::commit`]. Collider transforms are given in
//! world space. Interactable graphics on world-space canvases without a
//! collider get a thin box collider over their bounds at commit.
//!
//! ## API overview
//!
//! - [`Scene`]: container managing entities and derived data.
//! - [`LocalEntity`]: per-entity components ([`Canvas`], [`Graphic`], [`Collider`], [`Interactable`]).
//! - [`EntityFlags`]: activity, raycast participation, drag handling.
//! - [`EntityId`]: generational handle of an entity.
//!
//! ### Minimal usage
//!
//! ```
//! use glance_scene::{Canvas, Graphic, LocalEntity, Scene};
//! use kurbo::{Point, Rect};
//!
//! let mut scene = Scene::new();
//! let canvas = scene.insert(None, LocalEntity { canvas: Some(Canvas::default()), ..Default::default() });
//! let button = scene.insert(
//!     Some(canvas),
//!     LocalEntity {
//!         graphic: Some(Graphic { bounds: Rect::new(0.0, 0.0, 40.0, 20.0), ..Default::default() }),
//!         ..Default::default()
//!     },
//! );
//! scene.commit();
//!
//! let hits = scene.graphics_at(Point::new(10.0, 10.0));
//! assert_eq!(hits[0].entity, button);
//! ```

mod geometry;
mod scene;
mod types;

pub use scene::Scene;
pub use types::{
    Canvas, Collider, ColliderHit, ColliderShape, EntityFlags, EntityId, Graphic, GraphicHit,
    Interactable, LocalEntity, RenderMode,
};
