// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer state machine for the single virtual gaze pointer.
//!
//! ## Phases
//!
//! `Idle → Hovering(T) → Pressed(T) → Dragging(T) → Idle`.
//! Hover bookkeeping runs every tick through [`PointerStateMachine::process`];
//! trigger edges arrive through [`PointerStateMachine::trigger_down`] and
//! [`PointerStateMachine::trigger_up`], from a dwell completion or an external button.
//!
//! ## Output
//!
//! Every call appends [`PointerEvent`]s in the order handlers must observe them.
//! Target changes emit `Exit(old)` before `Enter(new)`. A release emits `Up`, then
//! either `Click` (still eligible) or `Drop` and `EndDrag` (dragging).
//!
//! ## Debounce
//!
//! For `debounce` seconds after any release, new presses are rejected with
//! [`TriggerOutcome::Debounced`].
//!
//! ```
//! use glance_router::pointer::{HoverTarget, PointerEvent, PointerStateMachine, TriggerOutcome};
//! use kurbo::Vec2;
//!
//! let mut pointer: PointerStateMachine<u32> = PointerStateMachine::new(0.1, 0.02);
//! let mut events = Vec::new();
//! pointer.process(Some(HoverTarget::interactive(4)), Vec2::ZERO, &mut events);
//! assert_eq!(pointer.trigger_down(1.0, &mut events), TriggerOutcome::Pressed);
//! assert_eq!(pointer.trigger_up(1.0, &mut events), TriggerOutcome::Released { clicked: true });
//! assert_eq!(
//!     events,
//!     vec![PointerEvent::Enter(4), PointerEvent::Down(4), PointerEvent::Up(4), PointerEvent::Click(4)]
//! );
//! ```

use kurbo::Vec2;

use crate::types::TIME_EPSILON;

/// A pointer event, delivered to the target's handlers in emission order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PointerEvent<K> {
    /// Pointer started hovering the target.
    Enter(K),
    /// Pointer stopped hovering the target.
    Exit(K),
    /// Trigger pressed on the target.
    Down(K),
    /// Trigger released for the pressed target.
    Up(K),
    /// Press and release completed on the target; this is the activation.
    Click(K),
    /// Drag started on the drag handler.
    BeginDrag(K),
    /// Drag moved.
    Drag {
        /// Drag handler.
        target: K,
        /// Gaze angle change this tick, `(polar, elevation)` in radians.
        delta: Vec2,
    },
    /// Drag ended on the drag handler.
    EndDrag(K),
    /// Dragged content released over a target.
    Drop {
        /// Entity under the pointer at release.
        target: K,
        /// Drag handler that was dragging.
        dragged: K,
    },
}

/// What the pointer hovers this tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HoverTarget<K> {
    /// Effective target.
    pub node: K,
    /// Whether the target may be pressed.
    pub interactive: bool,
    /// Drag-capable ancestor, if any.
    pub drag_handler: Option<K>,
}

impl<K> HoverTarget<K> {
    /// An interactive target without a drag handler.
    pub fn interactive(node: K) -> Self {
        Self {
            node,
            interactive: true,
            drag_handler: None,
        }
    }

    /// A target that is reported but cannot be pressed.
    pub fn passive(node: K) -> Self {
        Self {
            node,
            interactive: false,
            drag_handler: None,
        }
    }
}

/// Result of a trigger edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Press recorded.
    Pressed,
    /// Press resolved.
    Released {
        /// Whether a click was emitted.
        clicked: bool,
    },
    /// Press rejected inside the debounce window.
    Debounced,
    /// Press rejected: nothing hovered.
    NoTarget,
    /// Press rejected: hovered target is not interactive.
    NotInteractive,
    /// Press rejected: trigger already held.
    AlreadyHeld,
    /// Release ignored: trigger not held.
    NotHeld,
}

/// Derived phase of the pointer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PointerPhase<K> {
    /// Nothing hovered or pressed.
    Idle,
    /// Hovering a target, trigger up.
    Hovering(K),
    /// Trigger held on a target, not dragging.
    Pressed {
        /// Pressed target.
        target: K,
        /// Drag handler that may start dragging.
        drag: Option<K>,
    },
    /// Trigger held and dragging.
    Dragging {
        /// Drag handler.
        target: K,
    },
}

/// Raw pointer state. Mutated only by [`PointerStateMachine`].
#[derive(Clone, Debug, PartialEq)]
pub struct PointerState<K> {
    /// Currently hovered target.
    pub hovered: Option<K>,
    /// Whether the hovered target may be pressed.
    pub hovered_interactive: bool,
    /// Drag handler under the pointer.
    pub hovered_drag: Option<K>,
    /// Target that received `Down`.
    pub pressed: Option<K>,
    /// Drag handler recorded at press time.
    pub drag: Option<K>,
    /// Whether a drag is in progress.
    pub dragging: bool,
    /// Whether a release still produces a click.
    pub eligible_for_click: bool,
    /// Whether the trigger is held.
    pub held: bool,
    /// Time of the last press.
    pub press_time: Option<f64>,
    /// Time of the last release; starts the debounce window.
    pub last_release: Option<f64>,
    /// Gaze angle change of the last tick.
    pub delta: Vec2,
    /// Accumulated gaze travel since the press, in radians.
    pub press_travel: f64,
}

impl<K> Default for PointerState<K> {
    fn default() -> Self {
        Self {
            hovered: None,
            hovered_interactive: false,
            hovered_drag: None,
            pressed: None,
            drag: None,
            dragging: false,
            eligible_for_click: false,
            held: false,
            press_time: None,
            last_release: None,
            delta: Vec2::ZERO,
            press_travel: 0.0,
        }
    }
}

/// Owner of the single pointer's [`PointerState`].
#[derive(Clone, Debug)]
pub struct PointerStateMachine<K> {
    state: PointerState<K>,
    debounce: f64,
    drag_threshold: f64,
}

impl<K: Copy + Eq> PointerStateMachine<K> {
    /// Create an idle pointer.
    ///
    /// `debounce` is in seconds; `drag_threshold` is gaze travel in radians.
    pub fn new(debounce: f64, drag_threshold: f64) -> Self {
        Self {
            state: PointerState::default(),
            debounce,
            drag_threshold,
        }
    }

    /// Change timing parameters.
    pub fn set_limits(&mut self, debounce: f64, drag_threshold: f64) {
        self.debounce = debounce;
        self.drag_threshold = drag_threshold;
    }

    /// Current raw state.
    pub fn state(&self) -> &PointerState<K> {
        &self.state
    }

    /// Currently hovered target.
    pub fn hovered(&self) -> Option<K> {
        self.state.hovered
    }

    /// Derived phase.
    pub fn phase(&self) -> PointerPhase<K> {
        let s = &self.state;
        match (s.held, s.dragging, s.drag, s.pressed, s.hovered) {
            (true, true, Some(target), _, _) => PointerPhase::Dragging { target },
            (true, false, drag, Some(target), _) => PointerPhase::Pressed { target, drag },
            (_, _, _, _, Some(target)) => PointerPhase::Hovering(target),
            _ => PointerPhase::Idle,
        }
    }

    /// Whether a press at `now` falls inside the debounce window.
    ///
    /// A press one window after the release is accepted, within [`TIME_EPSILON`].
    pub fn is_debounced(&self, now: f64) -> bool {
        self.state
            .last_release
            .is_some_and(|t| now - t < self.debounce - TIME_EPSILON)
    }

    /// Update hover bookkeeping and drag from this tick's target and gaze delta.
    pub fn process(
        &mut self,
        target: Option<HoverTarget<K>>,
        delta: Vec2,
        events: &mut Vec<PointerEvent<K>>,
    ) {
        self.state.delta = delta;
        let node = target.map(|t| t.node);
        if node != self.state.hovered {
            if let Some(old) = self.state.hovered {
                events.push(PointerEvent::Exit(old));
            }
            if let Some(new) = node {
                events.push(PointerEvent::Enter(new));
            }
            self.state.hovered = node;
        }
        self.state.hovered_interactive = target.is_some_and(|t| t.interactive);
        self.state.hovered_drag = target.and_then(|t| t.drag_handler);

        if self.state.held {
            self.handle_drag(events);
        }
    }

    /// Trigger pressed at `now`.
    pub fn trigger_down(&mut self, now: f64, events: &mut Vec<PointerEvent<K>>) -> TriggerOutcome {
        if self.state.held {
            return TriggerOutcome::AlreadyHeld;
        }
        if self.is_debounced(now) {
            return TriggerOutcome::Debounced;
        }
        let Some(target) = self.state.hovered else {
            return TriggerOutcome::NoTarget;
        };
        if !self.state.hovered_interactive {
            return TriggerOutcome::NotInteractive;
        }
        events.push(PointerEvent::Down(target));
        let s = &mut self.state;
        s.pressed = Some(target);
        s.drag = s.hovered_drag;
        s.eligible_for_click = true;
        s.dragging = false;
        s.held = true;
        s.press_time = Some(now);
        s.press_travel = 0.0;
        s.delta = Vec2::ZERO;
        TriggerOutcome::Pressed
    }

    /// Trigger released at `now`.
    pub fn trigger_up(&mut self, now: f64, events: &mut Vec<PointerEvent<K>>) -> TriggerOutcome {
        if !self.state.held {
            return TriggerOutcome::NotHeld;
        }
        let clicked = self.release(events, true);
        self.state.last_release = Some(now);
        TriggerOutcome::Released { clicked }
    }

    /// Resolve any pending press or drag without clicking, then exit the hovered
    /// target and clear all state.
    pub fn deactivate(&mut self, events: &mut Vec<PointerEvent<K>>) {
        self.release(events, false);
        if let Some(old) = self.state.hovered {
            events.push(PointerEvent::Exit(old));
        }
        self.state = PointerState::default();
    }

    fn handle_drag(&mut self, events: &mut Vec<PointerEvent<K>>) {
        let s = &mut self.state;
        let moving = s.delta != Vec2::ZERO;
        s.press_travel += s.delta.hypot();
        let Some(drag) = s.drag else {
            return;
        };
        if moving && !s.dragging && s.press_travel > self.drag_threshold {
            events.push(PointerEvent::BeginDrag(drag));
            s.dragging = true;
        }
        if s.dragging && moving {
            // A drag on another handler cancels the pending press.
            if s.pressed != Some(drag) {
                if let Some(pressed) = s.pressed.take() {
                    events.push(PointerEvent::Up(pressed));
                }
                s.eligible_for_click = false;
            }
            events.push(PointerEvent::Drag {
                target: drag,
                delta: s.delta,
            });
        }
    }

    fn release(&mut self, events: &mut Vec<PointerEvent<K>>, allow_click: bool) -> bool {
        let s = &mut self.state;
        let mut clicked = false;
        if s.eligible_for_click || s.dragging {
            if let Some(pressed) = s.pressed {
                events.push(PointerEvent::Up(pressed));
            }
            if s.dragging {
                if let Some(dragged) = s.drag {
                    if allow_click && let Some(target) = s.hovered {
                        events.push(PointerEvent::Drop { target, dragged });
                    }
                    events.push(PointerEvent::EndDrag(dragged));
                }
            } else if allow_click && let Some(pressed) = s.pressed {
                events.push(PointerEvent::Click(pressed));
                clicked = true;
            }
        }
        s.pressed = None;
        s.drag = None;
        s.dragging = false;
        s.eligible_for_click = false;
        s.held = false;
        s.press_time = None;
        s.press_travel = 0.0;
        clicked
    }
}
