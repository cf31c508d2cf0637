// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for gaze routing: rays, depth keys, hit candidates, and collaborator lookups.
//!
//! ## Overview
//!
//! These types describe what flows between the [`raycast`](crate::raycast),
//! [`pointer`](crate::pointer), [`dwell`](crate::dwell) and [`router`](crate::router)
//! modules, and the capability traits a scene implements to take part.

use glam::Vec3;
use kurbo::Vec2;

/// Stand-in for a zero x component when converting a direction to spherical angles.
const DEGENERATE_AXIS: f32 = f32::MIN_POSITIVE;

/// Slack in seconds for comparisons between times summed from frame deltas.
///
/// Sums such as 180 frames of `1.0 / 90.0` land a few ulps off the exact value;
/// time boundaries are compared with this much tolerance.
pub const TIME_EPSILON: f64 = 1e-9;

/// Head (or camera) transform supplied by the scene each tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HeadPose {
    /// World-space eye position.
    pub position: Vec3,
    /// World-space forward direction; need not be normalized.
    pub forward: Vec3,
}

/// A gaze ray with a unit direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    /// Build a ray, normalizing `direction`.
    ///
    /// A zero-length or non-finite direction falls back to `+Z` rather than
    /// producing NaNs downstream.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.try_normalize().unwrap_or(Vec3::Z),
        }
    }

    /// Ray origin.
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit direction.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Convert a direction to `(polar, elevation)` angles in radians.
///
/// `+Y` is up. A zero x component is replaced by a tiny positive value so the
/// polar angle stays finite.
pub fn spherical(direction: Vec3) -> Vec2 {
    let mut d = direction.try_normalize().unwrap_or(Vec3::Z);
    if d.x == 0.0 {
        d.x = DEGENERATE_AXIS;
    }
    let mut polar = (d.z / d.x).atan();
    if d.x < 0.0 {
        polar += core::f32::consts::PI;
    }
    let elevation = d.y.clamp(-1.0, 1.0).asin();
    Vec2::new(f64::from(polar), f64::from(elevation))
}

/// Which hit-testing domain produced a candidate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Domain {
    /// Screen-space UI graphic.
    Graphic,
    /// 3D collider.
    Physical,
}

/// Primary ordering across heterogeneous hits.
///
/// Carried by [`HitCandidate`] and used by
/// [`RayCaster::cast`](crate::raycast::RayCaster::cast) to rank candidates.
/// Greater is nearer to the user.
///
/// Precondition: `Distance` should be finite (no NaN) for meaningful ordering.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DepthKey {
    /// Screen-space UI rank; higher canvas sort order first, then higher draw depth.
    Layer {
        /// Owning canvas sort order.
        sort_order: i32,
        /// Draw depth within the canvas.
        depth: i32,
    },
    /// 3D ray distance; lower is nearer to the user.
    Distance(f32),
}

impl Eq for DepthKey {}

impl Ord for DepthKey {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        use core::cmp::Ordering::*;
        match (*self, *other) {
            (
                Self::Layer {
                    sort_order: sa,
                    depth: da,
                },
                Self::Layer {
                    sort_order: sb,
                    depth: db,
                },
            ) => (sa, da).cmp(&(sb, db)),
            (Self::Distance(a), Self::Distance(b)) => b.partial_cmp(&a).unwrap_or(Equal),
            // Screen-space UI is never distance-compared against 3D hits.
            (Self::Layer { .. }, Self::Distance(_)) => Greater,
            (Self::Distance(_), Self::Layer { .. }) => Less,
        }
    }
}

impl PartialOrd for DepthKey {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(Ord::cmp(self, other))
    }
}

/// One raw hit produced by a cast.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitCandidate<K> {
    /// Entity that was hit.
    pub node: K,
    /// Ranking key.
    pub depth_key: DepthKey,
    /// Distance from the ray origin.
    pub distance: f32,
    /// Producing domain.
    pub domain: Domain,
    /// World-space intersection point.
    pub point: Vec3,
}

/// Look up the parent of a node.
///
/// Used to find the nearest interactable or draggable ancestor of a hit.
pub trait ParentLookup<K> {
    /// Returns the parent of `node`, or `None` if `node` is a root.
    fn parent_of(&self, node: &K) -> Option<K>;
}

/// A no‑op parent provider for flat scenes.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoParent;

impl<K> ParentLookup<K> for NoParent {
    #[inline]
    fn parent_of(&self, _node: &K) -> Option<K> {
        None
    }
}

/// Per-entity capabilities the router consults after a hit.
pub trait Capabilities<K>: ParentLookup<K> {
    /// `Some(enabled)` when `node` is an interactable, `None` otherwise.
    fn interactable(&self, node: &K) -> Option<bool>;

    /// Whether `node` handles drag gestures.
    fn is_draggable(&self, _node: &K) -> bool {
        false
    }
}

/// Activation collaborator: receives every committed target.
pub trait Activate<K> {
    /// Run the target's activation. Must return promptly.
    fn activate(&mut self, target: K);
}

impl<K> Activate<K> for Vec<K> {
    fn activate(&mut self, target: K) {
        self.push(target);
    }
}

/// Activation collaborator that ignores every target.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoActivation;

impl<K> Activate<K> for NoActivation {
    fn activate(&mut self, _target: K) {}
}

/// Walk from `node` up the parent chain and return the first node matching `pred`.
///
/// `node` itself is tested first. The caller ensures acyclic ancestry.
pub fn find_ancestor<K: Copy>(
    node: K,
    parents: &impl ParentLookup<K>,
    mut pred: impl FnMut(&K) -> bool,
) -> Option<K> {
    let mut cur = node;
    loop {
        if pred(&cur) {
            return Some(cur);
        }
        cur = parents.parent_of(&cur)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cmp::Ordering;

    #[test]
    fn depthkey_layer_ordering() {
        let key = |sort_order, depth| DepthKey::Layer { sort_order, depth };
        assert!(key(1, 0) > key(0, 100));
        assert!(key(0, 5) > key(0, 4));
        assert_eq!(key(2, 2).cmp(&key(2, 2)), Ordering::Equal);
    }

    #[test]
    fn depthkey_distance_ordering() {
        // Smaller distance is considered nearer and thus greater in ordering.
        assert!(DepthKey::Distance(0.1) > DepthKey::Distance(0.2));
        assert!(DepthKey::Distance(1.0) < DepthKey::Distance(0.5));
        assert_eq!(
            DepthKey::Distance(0.25).cmp(&DepthKey::Distance(0.25)),
            Ordering::Equal
        );
    }

    #[test]
    fn depthkey_layer_beats_any_distance() {
        let ui = DepthKey::Layer {
            sort_order: -100,
            depth: 0,
        };
        assert!(ui > DepthKey::Distance(0.0));
        assert!(ui > DepthKey::Distance(0.1));
        assert_eq!(DepthKey::Distance(1.0).cmp(&ui), Ordering::Less);
    }

    #[test]
    fn depthkey_partialord_matches_ord() {
        let a = DepthKey::Distance(0.5);
        let b = DepthKey::Distance(0.25);
        assert_eq!(a.partial_cmp(&b), Some(a.cmp(&b)));
    }

    #[test]
    fn ray_normalizes_and_falls_back_on_degenerate_direction() {
        let r = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(r.direction(), Vec3::Z);
        let zero = Ray::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(zero.direction(), Vec3::Z);
        let nan = Ray::new(Vec3::ONE, Vec3::new(f32::NAN, 0.0, 1.0));
        assert!(nan.direction().is_finite());
        assert_eq!(zero.at(2.0), Vec3::new(1.0, 1.0, 3.0));
    }

    #[test]
    fn spherical_is_finite_on_degenerate_axis() {
        let s = spherical(Vec3::Z);
        assert!(s.x.is_finite() && s.y.is_finite());
        assert!((s.x - core::f64::consts::FRAC_PI_2).abs() < 1e-6);
        assert!(s.y.abs() < 1e-6);

        let up = spherical(Vec3::Y);
        assert!(up.x.is_finite());
        assert!((up.y - core::f64::consts::FRAC_PI_2).abs() < 1e-6);

        let zero = spherical(Vec3::ZERO);
        assert!(zero.x.is_finite() && zero.y.is_finite());
    }

    #[test]
    fn spherical_polar_wraps_for_negative_x() {
        let left = spherical(Vec3::NEG_X);
        assert!((left.x - core::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn find_ancestor_walks_parents() {
        struct Parents;
        impl ParentLookup<u32> for Parents {
            fn parent_of(&self, node: &u32) -> Option<u32> {
                match node {
                    3 => Some(2),
                    2 => Some(1),
                    _ => None,
                }
            }
        }
        assert_eq!(find_ancestor(3, &Parents, |n| *n == 1), Some(1));
        assert_eq!(find_ancestor(3, &Parents, |n| *n == 3), Some(3));
        assert_eq!(find_ancestor(3, &Parents, |n| *n == 9), None);
        assert_eq!(find_ancestor(3, &NoParent, |n| *n == 1), None);
    }
}
