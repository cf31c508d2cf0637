// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: entity identifiers, flags, and surface components.

use glam::{Affine3A, Vec3};
use kurbo::{Affine, Rect};

/// Identifier for an entity in the scene.
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `EntityId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `EntityId`.
///
/// Use [`Scene::is_alive`](crate::Scene::is_alive) to check whether an id still refers to a live entity.
/// Stale ids never alias a different live entity because the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EntityId(pub(crate) u32, pub(crate) u32);

impl EntityId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Whether `self` was allocated after `other`.
    ///
    /// Higher generation is newer; on equal generations the higher slot is newer.
    pub fn is_newer_than(self, other: Self) -> bool {
        (self.1 > other.1) || (self.1 == other.1 && self.0 > other.0)
    }
}

bitflags::bitflags! {
    /// Entity flags controlling participation in queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EntityFlags: u8 {
        /// Entity is active. Queries only see entities whose whole ancestry is active.
        const ACTIVE         = 0b0000_0001;
        /// Entity receives hits from graphic and collider queries.
        const RAYCAST_TARGET = 0b0000_0010;
        /// Entity handles drag gestures.
        const DRAGGABLE      = 0b0000_0100;
    }
}

impl Default for EntityFlags {
    fn default() -> Self {
        Self::ACTIVE | Self::RAYCAST_TARGET
    }
}

/// How a canvas places its graphics.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RenderMode {
    /// Drawn on top of everything in screen pixels.
    ScreenSpaceOverlay,
    /// Drawn in screen pixels on a plane in front of the camera.
    ScreenSpaceCamera {
        /// Distance from the camera to the canvas plane.
        plane_distance: f32,
    },
    /// Placed in the world; reachable through colliders only.
    ///
    /// Interactable graphics without their own collider get a thin box
    /// collider over their bounds at [`Scene::commit`](crate::Scene::commit).
    WorldSpace,
}

impl RenderMode {
    /// Whether graphics under this mode are hit-tested in screen projection.
    pub fn is_screen_space(self) -> bool {
        !matches!(self, Self::WorldSpace)
    }

    /// Distance reported for a screen-space hit under this mode.
    pub fn hit_distance(self) -> f32 {
        match self {
            Self::ScreenSpaceCamera { plane_distance } => plane_distance,
            Self::ScreenSpaceOverlay | Self::WorldSpace => 0.0,
        }
    }
}

/// A UI layer root.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Canvas {
    /// Placement mode of the canvas.
    pub render_mode: RenderMode,
    /// Layer order between canvases. Higher is drawn on top.
    pub sort_order: i32,
    /// Canvas pixels to world space for [`RenderMode::WorldSpace`] canvases.
    ///
    /// Canvas `x` runs along local `+X`, `y` along local `+Y`, and the canvas
    /// faces local `-Z`.
    pub world_transform: Affine3A,
    /// Physics layer of the colliders derived for world-space controls.
    pub layer: u8,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::ScreenSpaceOverlay,
            sort_order: 0,
            world_transform: Affine3A::IDENTITY,
            layer: 0,
        }
    }
}

/// A laid-out UI element.
#[derive(Clone, Debug, PartialEq)]
pub struct Graphic {
    /// Layout bounds in canvas pixels, before transforms.
    pub bounds: Rect,
    /// Transform relative to the nearest graphic ancestor (or the canvas).
    pub local_transform: Affine,
    /// Draw order within the owning canvas. Higher is drawn on top.
    pub depth: i32,
}

impl Default for Graphic {
    fn default() -> Self {
        Self {
            bounds: Rect::ZERO,
            local_transform: Affine::IDENTITY,
            depth: 0,
        }
    }
}

/// Collision volume in local space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ColliderShape {
    /// Box centered on the local origin.
    Cuboid {
        /// Half size along each local axis.
        half_extents: Vec3,
    },
    /// Sphere centered on the local origin.
    Sphere {
        /// Sphere radius.
        radius: f32,
    },
}

/// A 3D volume that rays can hit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Collider {
    /// Local shape.
    pub shape: ColliderShape,
    /// Local to world transform.
    pub transform: Affine3A,
    /// Physics layer in `0..32`, matched against query layer masks.
    pub layer: u8,
}

impl Collider {
    /// Bit for this collider's layer in a 32-bit mask.
    pub fn layer_bit(&self) -> u32 {
        1_u32.checked_shl(u32::from(self.layer)).unwrap_or(0)
    }
}

/// Activation capability marker.
///
/// Entities carrying this component can be committed by gaze; `enabled`
/// mirrors the interactable flag of a UI control.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Interactable {
    /// Whether the control currently accepts activation.
    pub enabled: bool,
}

impl Default for Interactable {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Local data for an entity.
#[derive(Clone, Debug, Default)]
pub struct LocalEntity {
    /// Query participation flags.
    pub flags: EntityFlags,
    /// Present when this entity roots a UI layer.
    pub canvas: Option<Canvas>,
    /// Present when this entity is a UI element.
    pub graphic: Option<Graphic>,
    /// Present when this entity has a 3D volume.
    pub collider: Option<Collider>,
    /// Present when this entity can be activated.
    pub interactable: Option<Interactable>,
}

/// A graphic under a screen point, as returned by
/// [`Scene::graphics_at`](crate::Scene::graphics_at).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GraphicHit {
    /// The graphic entity.
    pub entity: EntityId,
    /// Owning canvas render mode.
    pub render_mode: RenderMode,
    /// Owning canvas sort order.
    pub sort_order: i32,
    /// Graphic draw depth.
    pub depth: i32,
}

/// A collider along a ray, as returned by [`Scene::raycast`](crate::Scene::raycast).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColliderHit {
    /// The collider entity.
    pub entity: EntityId,
    /// Distance from the ray origin.
    pub distance: f32,
    /// World-space intersection point.
    pub point: Vec3,
}
