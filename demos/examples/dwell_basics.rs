// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dwell basics.
//!
//! Drive a dwell timer and the pointer state machine by hand: hover a target,
//! let the dwell complete, commit a click, then try again inside the debounce window.
//!
//! Run:
//! - `cargo run -p glance_demos --example dwell_basics`

use glance_router::dwell::DwellTimer;
use glance_router::pointer::{HoverTarget, PointerStateMachine, TriggerOutcome};
use kurbo::Vec2;

fn main() {
    let mut dwell: DwellTimer<&str> = DwellTimer::new(1.0);
    let mut pointer: PointerStateMachine<&str> = PointerStateMachine::new(0.5, 0.02);
    let mut events = Vec::new();

    // Gaze at "play" for 1.25 s in 0.25 s steps, glance away, come back.
    let script = [
        Some("play"),
        Some("play"),
        Some("play"),
        Some("play"),
        Some("play"),
        None,
        Some("play"),
        Some("play"),
        Some("play"),
        Some("play"),
    ];
    let mut now = 0.0;
    for target in script {
        now += 0.25;
        pointer.process(target.map(HoverTarget::interactive), Vec2::ZERO, &mut events);
        let progress = dwell.update(target, 0.25);
        println!("t={now:.2} target={target:?} progress={progress:.2}");
        if dwell.has_completed() {
            match pointer.trigger_down(now, &mut events) {
                TriggerOutcome::Pressed => {
                    let _ = pointer.trigger_up(now, &mut events);
                }
                outcome => println!("  commit dropped: {outcome:?}"),
            }
        }
        for event in events.drain(..) {
            println!("  {event:?}");
        }
    }
    assert!(!pointer.is_debounced(now));
}
