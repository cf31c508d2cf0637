// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routing traits for [`glance_scene::Scene`].
//!
//! ## Feature
//!
//! Enable with `scene_adapter` (on by default).
//!
//! ## Notes
//!
//! The scene already reports graphics topmost first and colliders nearest
//! first, so the caster's stable ranking keeps its tie order. Queries observe
//! the scene as of its last [`commit`](glance_scene::Scene::commit).

use glance_scene::{EntityId, Scene};
use kurbo::Point;

use crate::raycast::{ColliderSample, GraphicSample, Surfaces};
use crate::types::{Capabilities, ParentLookup, Ray};

impl Surfaces<EntityId> for Scene {
    fn graphics_at(&self, screen_point: Point, out: &mut Vec<GraphicSample<EntityId>>) {
        out.extend(
            Self::graphics_at(self, screen_point)
                .into_iter()
                .map(|hit| GraphicSample {
                    node: hit.entity,
                    screen_space: hit.render_mode.is_screen_space(),
                    sort_order: hit.sort_order,
                    depth: hit.depth,
                    distance: hit.render_mode.hit_distance(),
                }),
        );
    }

    fn colliders_along(
        &self,
        ray: &Ray,
        max_distance: f32,
        layer_mask: u32,
        out: &mut Vec<ColliderSample<EntityId>>,
    ) {
        out.extend(
            self.raycast(ray.origin(), ray.direction(), max_distance, layer_mask)
                .into_iter()
                .map(|hit| ColliderSample {
                    node: hit.entity,
                    distance: hit.distance,
                    point: hit.point,
                }),
        );
    }
}

impl ParentLookup<EntityId> for Scene {
    fn parent_of(&self, node: &EntityId) -> Option<EntityId> {
        Self::parent_of(self, *node)
    }
}

impl Capabilities<EntityId> for Scene {
    fn interactable(&self, node: &EntityId) -> Option<bool> {
        Self::interactable(self, *node).map(|i| i.enabled)
    }

    fn is_draggable(&self, node: &EntityId) -> bool {
        Self::is_draggable(self, *node)
    }
}
