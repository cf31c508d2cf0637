// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core scene implementation: structure, updates, queries.

use glam::{Affine3A, Vec3};
use kurbo::{Affine, Point, Rect};

use crate::geometry::{canvas_rect_collider, ray_collider, transform_rect_bbox};
use crate::types::{
    Canvas, Collider, ColliderHit, EntityFlags, EntityId, GraphicHit, Interactable, LocalEntity,
    RenderMode,
};

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Arena of entities owning the interactive surfaces of a frame.
pub struct Scene {
    entities: Vec<Option<Entity>>, // slots
    generations: Vec<u32>,         // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    epoch: u64,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.entities.len();
        let alive = self.entities.iter().filter(|e| e.is_some()).count();
        f.debug_struct("Scene")
            .field("entities_total", &total)
            .field("entities_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Default)]
struct WorldEntity {
    active: bool,
    // Nearest canvas-bearing ancestor (or self).
    canvas: Option<EntityId>,
    screen_bounds: Option<Rect>,
    // Derived for interactable world-space graphics without a collider.
    ui_collider: Option<Collider>,
}

#[derive(Clone, Debug)]
struct Entity {
    generation: u32,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    local: LocalEntity,
    world: WorldEntity,
}

impl Entity {
    fn new(generation: u32, local: LocalEntity) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
            world: WorldEntity::default(),
        }
    }
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            epoch: 0,
        }
    }

    /// Number of completed [`Scene::commit`] calls.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Insert a new entity as a child of `parent` (or as a root if `None`).
    pub fn insert(&mut self, parent: Option<EntityId>, local: LocalEntity) -> EntityId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.entities[idx] = Some(Entity::new(generation, local));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "EntityId stores 32-bit slot indices."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.entities.push(Some(Entity::new(generation, local)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "EntityId stores 32-bit slot indices."
            )]
            ((self.entities.len() - 1) as u32, generation)
        };
        let id = EntityId::new(idx, generation);
        if let Some(p) = parent
            && self.is_alive(p)
        {
            self.link_parent(id, p);
        }
        id
    }

    /// Remove an entity and its subtree.
    pub fn remove(&mut self, id: EntityId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.entity(id).parent {
            self.unlink_parent(id, parent);
        }
        let children = self.entity(id).children.clone();
        for child in children {
            self.remove(child);
        }
        self.entities[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Reparent `id` under `new_parent`.
    ///
    /// Ignored when `new_parent` is `id` itself or one of its descendants.
    pub fn reparent(&mut self, id: EntityId, new_parent: Option<EntityId>) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(p) = new_parent
            && (!self.is_alive(p) || self.is_ancestor_or_self(id, p))
        {
            return;
        }
        if let Some(parent) = self.entity(id).parent {
            self.unlink_parent(id, parent);
        }
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
    }

    /// Update entity flags.
    pub fn set_flags(&mut self, id: EntityId, flags: EntityFlags) {
        if let Some(e) = self.entity_opt_mut(id) {
            e.local.flags = flags;
        }
    }

    /// Update the interactable component.
    pub fn set_interactable(&mut self, id: EntityId, interactable: Option<Interactable>) {
        if let Some(e) = self.entity_opt_mut(id) {
            e.local.interactable = interactable;
        }
    }

    /// Update a graphic's local transform. No-op for entities without a graphic.
    pub fn set_graphic_transform(&mut self, id: EntityId, tf: Affine) {
        if let Some(g) = self
            .entity_opt_mut(id)
            .and_then(|e| e.local.graphic.as_mut())
        {
            g.local_transform = tf;
        }
    }

    /// Update a collider's world transform. No-op for entities without a collider.
    pub fn set_collider_transform(&mut self, id: EntityId, tf: Affine3A) {
        if let Some(c) = self
            .entity_opt_mut(id)
            .and_then(|e| e.local.collider.as_mut())
        {
            c.transform = tf;
        }
    }

    /// Local data of a live entity.
    pub fn local(&self, id: EntityId) -> Option<&LocalEntity> {
        self.entity_opt(id).map(|e| &e.local)
    }

    /// Parent of a live entity, or `None` for roots and stale ids.
    pub fn parent_of(&self, id: EntityId) -> Option<EntityId> {
        self.entity_opt(id).and_then(|e| e.parent)
    }

    /// Interactable component of a live entity.
    pub fn interactable(&self, id: EntityId) -> Option<Interactable> {
        self.entity_opt(id).and_then(|e| e.local.interactable)
    }

    /// Whether a live entity handles drag gestures.
    pub fn is_draggable(&self, id: EntityId) -> bool {
        self.entity_opt(id)
            .is_some_and(|e| e.local.flags.contains(EntityFlags::DRAGGABLE))
    }

    /// Whether the entity and all of its ancestors were active at the last commit.
    pub fn is_active_in_hierarchy(&self, id: EntityId) -> bool {
        self.entity_opt(id).is_some_and(|e| e.world.active)
    }

    /// Screen-space bounds of a graphic at the last commit.
    pub fn screen_bounds(&self, id: EntityId) -> Option<Rect> {
        self.entity_opt(id).and_then(|e| e.world.screen_bounds)
    }

    /// Returns true if `id` refers to a live entity.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities
            .get(id.idx())
            .and_then(|e| e.as_ref())
            .is_some_and(|e| e.generation == id.1)
    }

    /// Recompute derived data: activity in hierarchy, canvas ownership and
    /// graphic screen bounds.
    ///
    /// Queries observe the state of the last commit.
    pub fn commit(&mut self) {
        let roots: Vec<EntityId> = self
            .entities
            .iter()
            .enumerate()
            .filter_map(|(i, e)| match e {
                Some(e) if e.parent.is_none() =>
                {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "EntityId stores 32-bit slot indices."
                    )]
                    Some(EntityId::new(i as u32, e.generation))
                }
                _ => None,
            })
            .collect();
        for root in roots {
            self.update_world_recursive(root, true, None, Affine::IDENTITY);
        }
        self.epoch += 1;
    }

    /// Graphics under a screen point, topmost first.
    ///
    /// Only graphics owned by screen-space canvases are considered; world-space
    /// UI is reachable through colliders. Ranking is canvas sort order, then
    /// graphic depth; equal ranks prefer the newer [`EntityId`].
    pub fn graphics_at(&self, pt: Point) -> Vec<GraphicHit> {
        let mut out: Vec<GraphicHit> = self
            .live()
            .filter_map(|(id, e)| {
                let graphic = e.local.graphic.as_ref()?;
                if !e.world.active || !e.local.flags.contains(EntityFlags::RAYCAST_TARGET) {
                    return None;
                }
                let canvas = self.entity_opt(e.world.canvas?)?.local.canvas?;
                if !canvas.render_mode.is_screen_space() || !e.world.screen_bounds?.contains(pt) {
                    return None;
                }
                Some(GraphicHit {
                    entity: id,
                    render_mode: canvas.render_mode,
                    sort_order: canvas.sort_order,
                    depth: graphic.depth,
                })
            })
            .collect();
        out.sort_by(|a, b| {
            (b.sort_order, b.depth)
                .cmp(&(a.sort_order, a.depth))
                .then_with(|| {
                    if a.entity.is_newer_than(b.entity) {
                        core::cmp::Ordering::Less
                    } else {
                        core::cmp::Ordering::Greater
                    }
                })
        });
        out
    }

    /// All colliders intersected by a ray, nearest first.
    ///
    /// `direction` is normalized here; a zero direction yields no hits.
    /// Colliders whose layer bit is not in `layer_mask` are skipped. Colliders
    /// derived for world-space controls at [`commit`](Self::commit) are included.
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layer_mask: u32,
    ) -> Vec<ColliderHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return Vec::new();
        }
        let mut out: Vec<ColliderHit> = self
            .live()
            .filter_map(|(id, e)| {
                let collider = e.local.collider.as_ref().or(e.world.ui_collider.as_ref())?;
                if !e.world.active
                    || !e.local.flags.contains(EntityFlags::RAYCAST_TARGET)
                    || collider.layer_bit() & layer_mask == 0
                {
                    return None;
                }
                let distance = ray_collider(origin, direction, max_distance, collider)?;
                Some(ColliderHit {
                    entity: id,
                    distance,
                    point: origin + direction * distance,
                })
            })
            .collect();
        out.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        out
    }

    // --- internals ---

    fn live(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.entities.iter().enumerate().filter_map(|(i, e)| {
            let e = e.as_ref()?;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "EntityId stores 32-bit slot indices."
            )]
            Some((EntityId::new(i as u32, e.generation), e))
        })
    }

    fn entity(&self, id: EntityId) -> &Entity {
        self.entities[id.idx()].as_ref().expect("dangling EntityId")
    }

    fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        self.entities[id.idx()].as_mut().expect("dangling EntityId")
    }

    fn entity_opt(&self, id: EntityId) -> Option<&Entity> {
        let e = self.entities.get(id.idx())?.as_ref()?;
        (e.generation == id.1).then_some(e)
    }

    fn entity_opt_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let e = self.entities.get_mut(id.idx())?.as_mut()?;
        if e.generation != id.1 {
            return None;
        }
        Some(e)
    }

    fn is_ancestor_or_self(&self, ancestor: EntityId, mut id: EntityId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.parent_of(id) {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    fn link_parent(&mut self, id: EntityId, parent: EntityId) {
        self.entity_mut(parent).children.push(id);
        self.entity_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: EntityId, parent: EntityId) {
        self.entity_mut(parent).children.retain(|c| *c != id);
        self.entity_mut(id).parent = None;
    }

    fn update_world_recursive(
        &mut self,
        id: EntityId,
        parent_active: bool,
        parent_canvas: Option<(EntityId, Canvas)>,
        parent_tf: Affine,
    ) {
        let (active, canvas, tf, children) = {
            let e = self.entity_mut(id);
            let active = parent_active && e.local.flags.contains(EntityFlags::ACTIVE);
            // A canvas restarts the screen-space transform chain.
            let (canvas, base_tf) = match e.local.canvas {
                Some(c) => (Some((id, c)), Affine::IDENTITY),
                None => (parent_canvas, parent_tf),
            };
            let (tf, bounds) = match &e.local.graphic {
                Some(g) => {
                    let tf = base_tf * g.local_transform;
                    (tf, Some(transform_rect_bbox(tf, g.bounds)))
                }
                None => (base_tf, None),
            };
            let ui_collider = match (canvas, bounds) {
                (Some((_, c)), Some(rect))
                    if c.render_mode == RenderMode::WorldSpace
                        && e.local.interactable.is_some()
                        && e.local.collider.is_none() =>
                {
                    Some(canvas_rect_collider(&c, rect))
                }
                _ => None,
            };
            e.world = WorldEntity {
                active,
                canvas: canvas.map(|(cid, _)| cid),
                screen_bounds: bounds,
                ui_collider,
            };
            (active, canvas, tf, e.children.clone())
        };
        for child in children {
            self.update_world_recursive(child, active, canvas, tf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColliderShape, Graphic};
    use kurbo::Vec2;

    fn canvas(scene: &mut Scene, render_mode: RenderMode, sort_order: i32) -> EntityId {
        scene.insert(
            None,
            LocalEntity {
                canvas: Some(Canvas {
                    render_mode,
                    sort_order,
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
    }

    fn graphic(scene: &mut Scene, parent: EntityId, bounds: Rect, depth: i32) -> EntityId {
        scene.insert(
            Some(parent),
            LocalEntity {
                graphic: Some(Graphic {
                    bounds,
                    depth,
                    ..Default::default()
                }),
                ..Default::default()
            },
        )
    }

    fn cube_at(scene: &mut Scene, z: f32, layer: u8) -> EntityId {
        scene.insert(
            None,
            LocalEntity {
                collider: Some(Collider {
                    shape: ColliderShape::Cuboid {
                        half_extents: Vec3::splat(0.5),
                    },
                    transform: Affine3A::from_translation(Vec3::new(0.0, 0.0, z)),
                    layer,
                }),
                ..Default::default()
            },
        )
    }

    #[test]
    fn graphics_ordered_by_sort_order_then_depth() {
        let mut scene = Scene::new();
        let low = canvas(&mut scene, RenderMode::ScreenSpaceOverlay, 0);
        let high = canvas(&mut scene, RenderMode::ScreenSpaceOverlay, 5);
        let full = Rect::new(0.0, 0.0, 100.0, 100.0);
        let a = graphic(&mut scene, low, full, 10);
        let b = graphic(&mut scene, high, full, 0);
        let c = graphic(&mut scene, high, full, 1);
        scene.commit();

        let hits: Vec<EntityId> = scene
            .graphics_at(Point::new(50.0, 50.0))
            .iter()
            .map(|h| h.entity)
            .collect();
        assert_eq!(hits, vec![c, b, a]);
    }

    #[test]
    fn equal_rank_prefers_newer_entity() {
        let mut scene = Scene::new();
        let root = canvas(&mut scene, RenderMode::ScreenSpaceOverlay, 0);
        let full = Rect::new(0.0, 0.0, 100.0, 100.0);
        let older = graphic(&mut scene, root, full, 0);
        let newer = graphic(&mut scene, root, full, 0);
        scene.commit();
        let hits = scene.graphics_at(Point::new(1.0, 1.0));
        assert_eq!(hits[0].entity, newer);
        assert_eq!(hits[1].entity, older);
    }

    #[test]
    fn world_space_canvas_is_not_screen_tested() {
        let mut scene = Scene::new();
        let root = canvas(&mut scene, RenderMode::WorldSpace, 100);
        let _ = graphic(&mut scene, root, Rect::new(0.0, 0.0, 100.0, 100.0), 0);
        scene.commit();
        assert!(scene.graphics_at(Point::new(50.0, 50.0)).is_empty());
    }

    #[test]
    fn world_space_control_gets_derived_collider() {
        let mut scene = Scene::new();
        let root = scene.insert(
            None,
            LocalEntity {
                canvas: Some(Canvas {
                    render_mode: RenderMode::WorldSpace,
                    world_transform: Affine3A::from_translation(Vec3::new(0.0, 0.0, 5.0)),
                    layer: 2,
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
        let _label = graphic(&mut scene, root, Rect::new(0.0, 0.0, 10.0, 10.0), 0);
        let button = graphic(&mut scene, root, Rect::new(20.0, 0.0, 40.0, 10.0), 1);
        scene.set_interactable(button, Some(Interactable::default()));
        scene.commit();

        let hits = scene.raycast(Vec3::new(30.0, 5.0, 0.0), Vec3::Z, 100.0, 1 << 2);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, button);
        assert!((hits[0].distance - 4.5).abs() < 1e-4);
        // Plain graphics stay unreachable.
        assert!(scene.raycast(Vec3::new(5.0, 5.0, 0.0), Vec3::Z, 100.0, !0).is_empty());
        // Masked out by the canvas layer.
        assert!(scene.raycast(Vec3::new(30.0, 5.0, 0.0), Vec3::Z, 100.0, 1).is_empty());

        // Disabling the button's own raycast target hides it again.
        scene.set_flags(button, EntityFlags::ACTIVE);
        scene.commit();
        assert!(scene.raycast(Vec3::new(30.0, 5.0, 0.0), Vec3::Z, 100.0, !0).is_empty());
    }

    #[test]
    fn overlay_control_gets_no_collider() {
        let mut scene = Scene::new();
        let root = canvas(&mut scene, RenderMode::ScreenSpaceOverlay, 0);
        let button = graphic(&mut scene, root, Rect::new(-10.0, -10.0, 10.0, 10.0), 0);
        scene.set_interactable(button, Some(Interactable::default()));
        scene.commit();
        assert!(scene.raycast(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 100.0, !0).is_empty());
    }

    #[test]
    fn inactive_ancestor_hides_subtree() {
        let mut scene = Scene::new();
        let root = canvas(&mut scene, RenderMode::ScreenSpaceOverlay, 0);
        let panel = graphic(&mut scene, root, Rect::new(0.0, 0.0, 100.0, 100.0), 0);
        let button = graphic(&mut scene, panel, Rect::new(10.0, 10.0, 20.0, 20.0), 1);
        scene.set_flags(panel, EntityFlags::RAYCAST_TARGET);
        scene.commit();
        assert!(!scene.is_active_in_hierarchy(button));
        assert!(scene.graphics_at(Point::new(15.0, 15.0)).is_empty());
    }

    #[test]
    fn graphic_transforms_compose_from_canvas() {
        let mut scene = Scene::new();
        let root = canvas(&mut scene, RenderMode::ScreenSpaceOverlay, 0);
        let panel = graphic(&mut scene, root, Rect::new(0.0, 0.0, 50.0, 50.0), 0);
        let button = graphic(&mut scene, panel, Rect::new(0.0, 0.0, 10.0, 10.0), 1);
        scene.set_graphic_transform(panel, Affine::translate(Vec2::new(100.0, 0.0)));
        scene.set_graphic_transform(button, Affine::translate(Vec2::new(5.0, 5.0)));
        scene.commit();
        assert_eq!(
            scene.screen_bounds(button),
            Some(Rect::new(105.0, 5.0, 115.0, 15.0))
        );
        let top = scene.graphics_at(Point::new(110.0, 10.0));
        assert_eq!(top[0].entity, button);
    }

    #[test]
    fn camera_canvas_reports_plane_distance() {
        let mut scene = Scene::new();
        let root = canvas(
            &mut scene,
            RenderMode::ScreenSpaceCamera {
                plane_distance: 3.0,
            },
            0,
        );
        let _ = graphic(&mut scene, root, Rect::new(0.0, 0.0, 10.0, 10.0), 0);
        scene.commit();
        let hit = scene.graphics_at(Point::new(5.0, 5.0))[0];
        assert_eq!(hit.render_mode.hit_distance(), 3.0);
    }

    #[test]
    fn raycast_sorts_nearest_first() {
        let mut scene = Scene::new();
        let far = cube_at(&mut scene, 5.0, 0);
        let near = cube_at(&mut scene, 1.2, 0);
        let mid = cube_at(&mut scene, 3.3, 0);
        scene.commit();
        let hits: Vec<EntityId> = scene
            .raycast(Vec3::ZERO, Vec3::Z, 100.0, u32::MAX)
            .iter()
            .map(|h| h.entity)
            .collect();
        assert_eq!(hits, vec![near, mid, far]);
    }

    #[test]
    fn raycast_respects_layer_mask_and_normalizes_direction() {
        let mut scene = Scene::new();
        let _ui = cube_at(&mut scene, 2.0, 5);
        let wall = cube_at(&mut scene, 4.0, 0);
        scene.commit();
        let hits = scene.raycast(Vec3::ZERO, Vec3::Z * 10.0, 100.0, 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, wall);
        assert!((hits[0].distance - 3.5).abs() < 1e-5);
        assert!((hits[0].point.z - 3.5).abs() < 1e-5);
    }

    #[test]
    fn zero_direction_yields_no_hits() {
        let mut scene = Scene::new();
        let _ = cube_at(&mut scene, 2.0, 0);
        scene.commit();
        assert!(scene.raycast(Vec3::ZERO, Vec3::ZERO, 100.0, u32::MAX).is_empty());
    }

    #[test]
    fn remove_frees_subtree_and_stales_ids() {
        let mut scene = Scene::new();
        let root = canvas(&mut scene, RenderMode::ScreenSpaceOverlay, 0);
        let child = graphic(&mut scene, root, Rect::new(0.0, 0.0, 10.0, 10.0), 0);
        scene.remove(root);
        assert!(!scene.is_alive(root));
        assert!(!scene.is_alive(child));
        let reused = scene.insert(None, LocalEntity::default());
        assert!(reused != root && reused != child);
        assert_eq!(scene.parent_of(child), None);
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut scene = Scene::new();
        let a = scene.insert(None, LocalEntity::default());
        let b = scene.insert(Some(a), LocalEntity::default());
        scene.reparent(a, Some(b));
        assert_eq!(scene.parent_of(a), None);
        assert_eq!(scene.parent_of(b), Some(a));
    }

    #[test]
    fn reparent_moves_graphic_between_canvases() {
        let mut scene = Scene::new();
        let overlay = canvas(&mut scene, RenderMode::ScreenSpaceOverlay, 0);
        let world = canvas(&mut scene, RenderMode::WorldSpace, 0);
        let g = graphic(&mut scene, overlay, Rect::new(0.0, 0.0, 10.0, 10.0), 0);
        scene.commit();
        assert_eq!(scene.graphics_at(Point::new(5.0, 5.0)).len(), 1);
        scene.reparent(g, Some(world));
        scene.commit();
        assert!(scene.graphics_at(Point::new(5.0, 5.0)).is_empty());
    }
}
