// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gaze router: runs the caster, the dwell timer and the pointer once per tick.
//!
//! ## Tick order
//!
//! 1. Validate the [`Frame`]; an unusable frame degrades the tick to a no-op.
//! 2. Build the head ray and the spherical angle change since the last tick.
//! 3. Cast, resolve the winner to its interactable owner.
//! 4. Update pointer hover and drag.
//! 5. Apply external trigger edges, if enabled.
//! 6. Update the dwell timer against the interactive target; on completion,
//!    commit a press and release at the current clock.
//! 7. Invoke the [`Activate`] collaborator for every click.
//!
//! Everything a tick produced is returned as one [`TickReport`].
//!
//! ## Dropped commits
//!
//! A dwell completion inside the debounce window is dropped, not queued. The
//! dwell timer still counts it as spent, so the target must be left and
//! re-entered to commit again.

use core::f64::consts::{PI, TAU};
use core::fmt;

use glam::Vec3;
use kurbo::{Size, Vec2};
use tracing::{debug, info, trace, warn};

use crate::config::GazeConfig;
use crate::dwell::DwellTimer;
use crate::error::{ConfigError, FrameError};
use crate::pointer::{HoverTarget, PointerEvent, PointerStateMachine, TriggerOutcome};
use crate::raycast::{CastParams, GazeTarget, RayCaster, Surfaces, resolve_target};
use crate::types::{Activate, Capabilities, HeadPose, NoActivation, Ray, spherical};

/// Presentation events for a reticle or cursor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ReticleEvent<K> {
    /// Router activated.
    Enabled,
    /// Router deactivated.
    Disabled,
    /// Gaze landed on a new target.
    Start {
        /// Effective target.
        target: K,
        /// World-space hit point.
        point: Vec3,
        /// Whether the target can be triggered.
        interactive: bool,
    },
    /// Gaze remains on the target.
    Stay {
        /// Effective target.
        target: K,
        /// World-space hit point.
        point: Vec3,
        /// Whether the target can be triggered.
        interactive: bool,
    },
    /// Gaze left the target.
    Exit(K),
    /// A press was accepted.
    TriggerStart,
    /// A press was released.
    TriggerEnd,
}

/// Per-tick input.
pub struct Frame<'a, W> {
    /// Head pose; `None` when tracking is lost.
    pub head: Option<HeadPose>,
    /// Viewport in pixels.
    pub viewport: Option<Size>,
    /// Surface provider.
    pub world: Option<&'a W>,
    /// External button state, read in external trigger modes.
    pub trigger_held: bool,
    /// Seconds since the previous tick.
    pub dt: f64,
}

impl<'a, W> Frame<'a, W> {
    /// A complete frame with the button released.
    pub fn new(head: HeadPose, viewport: Size, world: &'a W, dt: f64) -> Self {
        Self {
            head: Some(head),
            viewport: Some(viewport),
            world: Some(world),
            trigger_held: false,
            dt,
        }
    }

    /// Set the external button state.
    #[must_use]
    pub fn with_trigger(mut self, held: bool) -> Self {
        self.trigger_held = held;
        self
    }

    fn validate(&self) -> Result<(HeadPose, Size, &'a W), FrameError> {
        let head = self.head.ok_or(FrameError::MissingHeadPose)?;
        let viewport = self
            .viewport
            .filter(|s| s.is_finite() && s.width > 0.0 && s.height > 0.0)
            .ok_or(FrameError::MissingViewport)?;
        let world = self.world.ok_or(FrameError::MissingSurfaces)?;
        Ok((head, viewport, world))
    }
}

impl<W> fmt::Debug for Frame<'_, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("head", &self.head)
            .field("viewport", &self.viewport)
            .field("has_world", &self.world.is_some())
            .field("trigger_held", &self.trigger_held)
            .field("dt", &self.dt)
            .finish_non_exhaustive()
    }
}

/// Everything one tick produced.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport<K> {
    /// Pointer events in delivery order.
    pub pointer: Vec<PointerEvent<K>>,
    /// Reticle events in delivery order.
    pub reticle: Vec<ReticleEvent<K>>,
    /// Winning target after resolution.
    pub target: Option<GazeTarget<K>>,
    /// Dwell progress in `[0, 1]`.
    pub progress: f32,
    /// Whether a dwell episode is running.
    pub tracking: bool,
    /// Whether a dwell completion committed a click.
    pub committed: bool,
    /// Set when the frame was unusable and the tick did nothing.
    pub degraded: Option<FrameError>,
}

impl<K> Default for TickReport<K> {
    fn default() -> Self {
        Self {
            pointer: Vec::new(),
            reticle: Vec::new(),
            target: None,
            progress: 0.0,
            tracking: false,
            committed: false,
            degraded: None,
        }
    }
}

impl<K: Copy + Eq> TickReport<K> {
    /// Targets clicked this tick.
    pub fn clicks(&self) -> impl Iterator<Item = K> + '_ {
        self.pointer.iter().filter_map(|e| match e {
            PointerEvent::Click(k) => Some(*k),
            _ => None,
        })
    }
}

/// The gaze input module.
///
/// Created inactive; call [`GazeRouter::activate`] before ticking.
pub struct GazeRouter<K, A = NoActivation> {
    config: GazeConfig,
    caster: RayCaster<K>,
    dwell: DwellTimer<K>,
    pointer: PointerStateMachine<K>,
    activator: A,
    active: bool,
    clock: f64,
    last_angles: Option<Vec2>,
    reticle_target: Option<K>,
    external_held: bool,
    last_error: Option<FrameError>,
    // Frame errors already warned about since the last good frame.
    warned: Vec<FrameError>,
}

impl<K: fmt::Debug, A> fmt::Debug for GazeRouter<K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GazeRouter")
            .field("config", &self.config)
            .field("dwell", &self.dwell)
            .field("pointer", &self.pointer)
            .field("active", &self.active)
            .field("clock", &self.clock)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq + fmt::Debug, A: Activate<K>> GazeRouter<K, A> {
    /// Create an inactive router.
    pub fn new(config: GazeConfig, activator: A) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            caster: RayCaster::new(),
            dwell: DwellTimer::new(config.dwell_threshold),
            pointer: PointerStateMachine::new(config.debounce, config.drag_threshold),
            config,
            activator,
            active: false,
            clock: 0.0,
            last_angles: None,
            reticle_target: None,
            external_held: false,
            last_error: None,
            warned: Vec::new(),
        })
    }

    /// Replace the configuration. The running dwell episode keeps its time.
    pub fn set_config(&mut self, config: GazeConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.dwell.set_threshold(config.dwell_threshold);
        self.pointer.set_limits(config.debounce, config.drag_threshold);
        self.config = config;
        Ok(())
    }

    /// Current configuration.
    pub fn config(&self) -> &GazeConfig {
        &self.config
    }

    /// Whether ticks are processed.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Router clock in seconds, advanced by each processed tick.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Pointer state machine.
    pub fn pointer(&self) -> &PointerStateMachine<K> {
        &self.pointer
    }

    /// Dwell timer.
    pub fn dwell(&self) -> &DwellTimer<K> {
        &self.dwell
    }

    /// Ray caster with the candidates of the last cast.
    pub fn caster(&self) -> &RayCaster<K> {
        &self.caster
    }

    /// Activation collaborator.
    pub fn activator(&self) -> &A {
        &self.activator
    }

    /// Activation collaborator, mutably.
    pub fn activator_mut(&mut self) -> &mut A {
        &mut self.activator
    }

    /// Error of the last degraded tick, cleared by the next good one.
    pub fn last_error(&self) -> Option<FrameError> {
        self.last_error
    }

    /// Enable or disable the router.
    pub fn set_active(&mut self, active: bool) -> TickReport<K> {
        if active {
            self.activate()
        } else {
            self.deactivate()
        }
    }

    /// Enable the router. Does nothing if already active.
    pub fn activate(&mut self) -> TickReport<K> {
        let mut report = TickReport::default();
        if !self.active {
            info!("gaze router activated");
            self.active = true;
            report.reticle.push(ReticleEvent::Enabled);
        }
        report
    }

    /// Disable the router.
    ///
    /// A pending press or drag is released without a click, the hovered target
    /// exits, and all state is cleared.
    pub fn deactivate(&mut self) -> TickReport<K> {
        let mut report = TickReport::default();
        if !self.active {
            return report;
        }
        info!("gaze router deactivated");
        let held = self.pointer.state().held;
        self.pointer.deactivate(&mut report.pointer);
        if held {
            report.reticle.push(ReticleEvent::TriggerEnd);
        }
        if let Some(old) = self.reticle_target.take() {
            report.reticle.push(ReticleEvent::Exit(old));
        }
        report.reticle.push(ReticleEvent::Disabled);
        self.caster.clear();
        self.dwell.reset();
        self.last_angles = None;
        self.external_held = false;
        self.last_error = None;
        self.warned.clear();
        self.active = false;
        report
    }

    /// Process one frame.
    pub fn tick<W>(&mut self, frame: &Frame<'_, W>) -> TickReport<K>
    where
        W: Surfaces<K> + Capabilities<K>,
    {
        let mut report = TickReport::default();
        if !self.active {
            return report;
        }
        let (head, viewport, world) = match frame.validate() {
            Ok(parts) => parts,
            Err(err) => {
                if !self.warned.contains(&err) {
                    warn!(%err, "gaze tick skipped");
                    self.warned.push(err);
                }
                self.last_error = Some(err);
                report.degraded = Some(err);
                report.progress = self.dwell.progress();
                report.tracking = self.dwell.is_tracking();
                return report;
            }
        };
        if let Some(err) = self.last_error.take() {
            info!(%err, "gaze input recovered");
        }
        self.warned.clear();

        let dt = if frame.dt.is_finite() {
            frame.dt.max(0.0)
        } else {
            0.0
        };
        self.clock += dt;

        let ray = Ray::new(head.position, head.forward);
        let angles = spherical(ray.direction());
        let delta = self
            .last_angles
            .map_or(Vec2::ZERO, |prev| wrap_delta(angles - prev));
        self.last_angles = Some(angles);

        let params = CastParams {
            screen_point: self.config.screen_point(viewport),
            max_distance: self.config.max_distance,
            layer_mask: self.config.layer_mask,
        };
        let best = self.caster.cast(world, &ray, &params).first().copied();
        trace!(candidates = ?self.caster.candidates(), "gaze cast");
        let target = best.map(|hit| resolve_target(&hit, world));
        report.target = target;

        let hover = target.map(|t| HoverTarget {
            node: t.node,
            interactive: t.is_interactive(),
            drag_handler: t.drag_handler,
        });
        self.pointer.process(hover, delta, &mut report.pointer);
        self.update_reticle(target, &mut report.reticle);

        if self.config.trigger_mode.uses_external() {
            self.apply_external(frame.trigger_held, &mut report);
        }

        if self.config.trigger_mode.uses_dwell() {
            let dwell_target = target.filter(GazeTarget::is_interactive).map(|t| t.node);
            report.progress = self.dwell.update(dwell_target, dt);
            report.tracking = self.dwell.is_tracking();
            if self.dwell.has_completed() {
                report.committed = self.commit(&mut report);
            }
        }

        for target in report.clicks() {
            debug!(?target, "activate");
            self.activator.activate(target);
        }
        report
    }

    fn update_reticle(&mut self, target: Option<GazeTarget<K>>, out: &mut Vec<ReticleEvent<K>>) {
        let node = target.map(|t| t.node);
        if self.reticle_target != node
            && let Some(old) = self.reticle_target
        {
            out.push(ReticleEvent::Exit(old));
        }
        if let Some(t) = target {
            let (target, point, interactive) = (t.node, t.hit.point, t.is_interactive());
            if self.reticle_target == node {
                out.push(ReticleEvent::Stay {
                    target,
                    point,
                    interactive,
                });
            } else {
                out.push(ReticleEvent::Start {
                    target,
                    point,
                    interactive,
                });
            }
        }
        self.reticle_target = node;
    }

    fn apply_external(&mut self, held: bool, report: &mut TickReport<K>) {
        if held && !self.external_held {
            match self.pointer.trigger_down(self.clock, &mut report.pointer) {
                TriggerOutcome::Pressed => report.reticle.push(ReticleEvent::TriggerStart),
                outcome => debug!(?outcome, "external press ignored"),
            }
        } else if !held
            && self.external_held
            && let TriggerOutcome::Released { .. } =
                self.pointer.trigger_up(self.clock, &mut report.pointer)
        {
            report.reticle.push(ReticleEvent::TriggerEnd);
        }
        self.external_held = held;
    }

    fn commit(&mut self, report: &mut TickReport<K>) -> bool {
        match self.pointer.trigger_down(self.clock, &mut report.pointer) {
            TriggerOutcome::Pressed => {
                report.reticle.push(ReticleEvent::TriggerStart);
                let up = self.pointer.trigger_up(self.clock, &mut report.pointer);
                report.reticle.push(ReticleEvent::TriggerEnd);
                matches!(up, TriggerOutcome::Released { clicked: true })
            }
            outcome => {
                debug!(?outcome, clock = self.clock, "dwell completion dropped");
                false
            }
        }
    }
}

/// Keep the polar change in `[-π, π]` across the wrap of the polar angle.
fn wrap_delta(mut delta: Vec2) -> Vec2 {
    if delta.x > PI {
        delta.x -= TAU;
    } else if delta.x < -PI {
        delta.x += TAU;
    }
    delta
}
