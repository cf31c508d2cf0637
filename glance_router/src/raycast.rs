// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ray caster: merges screen-space UI hits and 3D collider hits into one ordered list.
//!
//! ## Overview
//!
//! Each cast asks a [`Surfaces`] provider for two independent answers:
//! the UI graphics under the screen projection of the gaze, and the colliders
//! along the gaze ray. Both are folded into [`HitCandidate`]s and ranked by
//! [`DepthKey`].
//!
//! ## Target Selection
//!
//! - A screen-space UI candidate wins outright; it is never distance-compared
//!   against 3D hits.
//! - Among UI candidates, higher canvas sort order wins, then higher draw depth.
//! - Otherwise the nearest collider wins.
//! - Equal ranks keep provider order, so providers report topmost first.
//!
//! The winner is then resolved to its nearest [interactable](crate::types::Capabilities)
//! ancestor with [`resolve_target`].

use glam::Vec3;
use kurbo::Point;

use crate::types::{Capabilities, DepthKey, Domain, HitCandidate, Ray, find_ancestor};

/// A UI graphic under the screen point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GraphicSample<K> {
    /// Graphic entity.
    pub node: K,
    /// Whether the owning canvas renders in screen or camera space.
    pub screen_space: bool,
    /// Owning canvas sort order.
    pub sort_order: i32,
    /// Draw depth within the canvas.
    pub depth: i32,
    /// Distance reported for the hit (0 for overlays, plane distance for camera canvases).
    pub distance: f32,
}

/// A collider along the ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColliderSample<K> {
    /// Collider entity.
    pub node: K,
    /// Distance from the ray origin.
    pub distance: f32,
    /// World-space intersection point.
    pub point: Vec3,
}

/// The interactive surfaces of the current frame.
///
/// Implemented by the scene; the caster never creates or destroys surfaces.
pub trait Surfaces<K> {
    /// Append graphics under `screen_point`, topmost first.
    fn graphics_at(&self, screen_point: Point, out: &mut Vec<GraphicSample<K>>);

    /// Append colliders along `ray` up to `max_distance` whose layer is in `layer_mask`.
    fn colliders_along(
        &self,
        ray: &Ray,
        max_distance: f32,
        layer_mask: u32,
        out: &mut Vec<ColliderSample<K>>,
    );
}

/// Per-cast parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CastParams {
    /// Screen pixel the gaze projects to.
    pub screen_point: Point,
    /// Colliders farther than this are ignored.
    pub max_distance: f32,
    /// Physics layers considered.
    pub layer_mask: u32,
}

/// The winning hit after ownership resolution.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GazeTarget<K> {
    /// Effective target: the nearest interactable ancestor of the hit, or the hit itself.
    pub node: K,
    /// The raw winning hit.
    pub hit: HitCandidate<K>,
    /// `Some(enabled)` when `node` is interactable, `None` when no ancestor is.
    pub interactable: Option<bool>,
    /// Nearest drag-capable ancestor of the hit.
    pub drag_handler: Option<K>,
}

impl<K> GazeTarget<K> {
    /// Whether this target may be triggered.
    pub fn is_interactive(&self) -> bool {
        self.interactable == Some(true)
    }
}

/// Resolve a raw hit to the entity that should receive pointer events.
pub fn resolve_target<K: Copy, C: Capabilities<K>>(
    hit: &HitCandidate<K>,
    caps: &C,
) -> GazeTarget<K> {
    let owner = find_ancestor(hit.node, caps, |n| caps.interactable(n).is_some());
    GazeTarget {
        node: owner.unwrap_or(hit.node),
        hit: *hit,
        interactable: owner.and_then(|o| caps.interactable(&o)),
        drag_handler: find_ancestor(hit.node, caps, |n| caps.is_draggable(n)),
    }
}

/// Multi-domain ray caster.
///
/// Holds reusable scratch buffers and the ordered candidates of the last cast;
/// nothing else carries over between casts.
#[derive(Clone, Debug)]
pub struct RayCaster<K> {
    graphics: Vec<GraphicSample<K>>,
    colliders: Vec<ColliderSample<K>>,
    candidates: Vec<HitCandidate<K>>,
}

impl<K> Default for RayCaster<K> {
    fn default() -> Self {
        Self {
            graphics: Vec::new(),
            colliders: Vec::new(),
            candidates: Vec::new(),
        }
    }
}

impl<K: Copy> RayCaster<K> {
    /// Create a caster with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cast `ray` into `surfaces` and return all candidates, best first.
    pub fn cast<S: Surfaces<K>>(
        &mut self,
        surfaces: &S,
        ray: &Ray,
        params: &CastParams,
    ) -> &[HitCandidate<K>] {
        self.graphics.clear();
        self.colliders.clear();
        self.candidates.clear();

        surfaces.graphics_at(params.screen_point, &mut self.graphics);
        surfaces.colliders_along(ray, params.max_distance, params.layer_mask, &mut self.colliders);

        self.candidates.extend(
            self.graphics
                .iter()
                .filter(|g| g.screen_space)
                .map(|g| HitCandidate {
                    node: g.node,
                    depth_key: DepthKey::Layer {
                        sort_order: g.sort_order,
                        depth: g.depth,
                    },
                    distance: g.distance,
                    domain: Domain::Graphic,
                    point: ray.at(g.distance),
                }),
        );
        self.candidates.extend(
            self.colliders
                .iter()
                .filter(|c| c.distance.is_finite() && c.distance <= params.max_distance)
                .map(|c| HitCandidate {
                    node: c.node,
                    depth_key: DepthKey::Distance(c.distance),
                    distance: c.distance,
                    domain: Domain::Physical,
                    point: c.point,
                }),
        );
        // Stable: equal ranks keep provider order.
        self.candidates.sort_by(|a, b| b.depth_key.cmp(&a.depth_key));
        &self.candidates
    }

    /// Candidates of the last cast, best first.
    pub fn candidates(&self) -> &[HitCandidate<K>] {
        &self.candidates
    }

    /// The winning candidate of the last cast.
    pub fn best(&self) -> Option<&HitCandidate<K>> {
        self.candidates.first()
    }

    /// Candidate at slot `i` of the last cast; `None` past the end.
    pub fn candidate(&self, i: usize) -> Option<&HitCandidate<K>> {
        self.candidates.get(i)
    }

    /// Drop the results of the last cast.
    pub fn clear(&mut self) {
        self.graphics.clear();
        self.colliders.clear();
        self.candidates.clear();
    }
}
