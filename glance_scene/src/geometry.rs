// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry helpers: rect transforms and ray/volume intersection.

use glam::{Affine3A, Vec3};
use kurbo::{Affine, Point, Rect};

use crate::types::{Canvas, Collider, ColliderShape};

/// Below this magnitude a local ray component is treated as parallel to a slab.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Half thickness, in canvas units, of colliders derived for world-space controls.
const CONTROL_HALF_DEPTH: f32 = 0.5;

/// Transform an axis-aligned `Rect` by an `Affine` and return a conservative
/// axis-aligned bounding box.
pub(crate) fn transform_rect_bbox(affine: Affine, rect: Rect) -> Rect {
    let p0 = affine * Point::new(rect.x0, rect.y0);
    let p1 = affine * Point::new(rect.x1, rect.y0);
    let p2 = affine * Point::new(rect.x0, rect.y1);
    let p3 = affine * Point::new(rect.x1, rect.y1);
    let min_x = p0.x.min(p1.x).min(p2.x).min(p3.x);
    let min_y = p0.y.min(p1.y).min(p2.y).min(p3.y);
    let max_x = p0.x.max(p1.x).max(p2.x).max(p3.x);
    let max_y = p0.y.max(p1.y).max(p2.y).max(p3.y);
    Rect::new(min_x, min_y, max_x, max_y)
}

/// Thin box collider covering `rect` (canvas pixels) on a world-space `canvas`.
pub(crate) fn canvas_rect_collider(canvas: &Canvas, rect: Rect) -> Collider {
    let center = rect.center();
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Canvas layout coordinates fit in f32."
    )]
    let (center, half) = (
        Vec3::new(center.x as f32, center.y as f32, 0.0),
        Vec3::new(
            (rect.width() * 0.5) as f32,
            (rect.height() * 0.5) as f32,
            CONTROL_HALF_DEPTH,
        ),
    );
    Collider {
        shape: ColliderShape::Cuboid { half_extents: half },
        transform: canvas.world_transform * Affine3A::from_translation(center),
        layer: canvas.layer,
    }
}

/// Distance along a unit `direction` from `origin` to the entry point of `collider`.
///
/// Returns `None` when the ray misses, when the entry lies beyond `max_distance`,
/// or when `origin` is inside the volume (rays starting inside a collider do not
/// report it). Degenerate transforms never produce a hit.
pub(crate) fn ray_collider(
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    collider: &Collider,
) -> Option<f32> {
    // Work in local space without renormalizing so `t` stays a world distance.
    let inverse = collider.transform.inverse();
    let local_origin = inverse.transform_point3(origin);
    let local_dir = inverse.transform_vector3(direction);
    let t = match collider.shape {
        ColliderShape::Cuboid { half_extents } => ray_box(local_origin, local_dir, half_extents)?,
        ColliderShape::Sphere { radius } => ray_sphere(local_origin, local_dir, radius)?,
    };
    (t.is_finite() && t <= max_distance).then_some(t)
}

fn ray_box(origin: Vec3, dir: Vec3, half: Vec3) -> Option<f32> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let (o, d, h) = (origin[axis], dir[axis], half[axis]);
        if d.abs() < PARALLEL_EPSILON {
            if o < -h || o > h {
                return None;
            }
            continue;
        }
        let t1 = (-h - o) / d;
        let t2 = (h - o) / d;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
    }
    (t_max >= t_min && t_min >= 0.0).then_some(t_min)
}

fn ray_sphere(origin: Vec3, dir: Vec3, radius: f32) -> Option<f32> {
    let a = dir.length_squared();
    if a < PARALLEL_EPSILON {
        return None;
    }
    let b = 2.0 * origin.dot(dir);
    let c = origin.length_squared() - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 || c < 0.0 {
        return None;
    }
    let t = (-b - discriminant.sqrt()) / (2.0 * a);
    (t >= 0.0).then_some(t)
}
