//! Overlay visibility state machine.
//!
//! The overlay is visible while at least one reason holds:
//!
//! - armed by a shake gesture during a file drag
//! - armed by a modifier hold during a file drag
//! - pinned because the item collection is non-empty
//! - shown manually
//!
//! Showing is immediate. Hiding is deferred by `hide_delay` from the moment
//! the last reason cleared, and is abandoned if a reason returns or the
//! presentation layer reports a drop in progress before it fires. Placement
//! is computed only when the overlay is shown or explicitly repositioned.

use std::time::Instant;

use tracing::{debug, trace};

use crate::{
    config::{OverlayCfg, PlacementCfg},
    geom::{Point, Rect},
    input::InputSnapshot,
    locator::Desktop,
    place::{Placement, place},
    timers::TimerSet,
};

/// Receives visibility transitions and frames. Implementations must
/// tolerate repeated calls.
pub trait Presenter {
    /// Position the overlay at `frame` and make it visible.
    fn show(&mut self, frame: Rect);
    /// Hide the overlay.
    fn hide(&mut self);
    /// Move an already visible overlay.
    fn set_frame(&mut self, frame: Rect);
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn show(&mut self, frame: Rect) {
        (**self).show(frame);
    }

    fn hide(&mut self) {
        (**self).hide();
    }

    fn set_frame(&mut self, frame: Rect) {
        (**self).set_frame(frame);
    }
}

/// Flags owned by the [`OverlayController`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayVisibilityState {
    /// The presenter was last told to show.
    pub visible: bool,
    /// Items are present.
    pub pinned: bool,
    /// Shown by a shake during the current file drag.
    pub armed_by_gesture: bool,
    /// Shown by a modifier hold during the current file drag.
    pub armed_by_hold: bool,
    /// Shown by a manual toggle.
    pub manually_visible: bool,
    /// A drop is in progress; hides are held off.
    pub drop_hold: bool,
    /// Drag flag from the most recent input snapshot.
    pub dragging: bool,
    /// Most recent pointer location, if any input has been seen.
    pub last_known_location: Option<Point>,
    /// Frame last handed to the presenter.
    pub frame: Option<Rect>,
}

impl OverlayVisibilityState {
    /// True if any visibility reason holds.
    pub fn has_reason(&self) -> bool {
        self.armed_by_gesture || self.armed_by_hold || self.pinned || self.manually_visible
    }
}

/// Timer purposes owned by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayTimer {
    /// Deferred hide.
    Hide,
}

/// Owns overlay visibility and drives placement.
pub struct OverlayController<D, R> {
    overlay: OverlayCfg,
    placement: PlacementCfg,
    desktop: D,
    presenter: R,
    state: OverlayVisibilityState,
    timers: TimerSet<OverlayTimer>,
}

impl<D: Desktop, R: Presenter> OverlayController<D, R> {
    /// A hidden controller.
    pub fn new(overlay: OverlayCfg, placement: PlacementCfg, desktop: D, presenter: R) -> Self {
        Self {
            overlay,
            placement,
            desktop,
            presenter,
            state: OverlayVisibilityState::default(),
            timers: TimerSet::new(),
        }
    }

    /// Current visibility flags.
    pub fn state(&self) -> &OverlayVisibilityState {
        &self.state
    }

    /// Desktop used for placement queries.
    pub fn desktop(&self) -> &D {
        &self.desktop
    }

    /// The presenter receiving show and hide calls.
    pub fn presenter(&self) -> &R {
        &self.presenter
    }

    /// Mutable access to the presenter.
    pub fn presenter_mut(&mut self) -> &mut R {
        &mut self.presenter
    }

    /// Deadline of the pending hide, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// True while a deferred hide is armed.
    pub fn is_hide_pending(&self) -> bool {
        self.timers.is_armed(OverlayTimer::Hide)
    }

    /// Apply the latest input snapshot. Never repositions.
    pub fn update_input(&mut self, snapshot: &InputSnapshot, now: Instant) {
        self.state.last_known_location = Some(snapshot.location);
        self.state.dragging = snapshot.is_dragging;

        let file_drag = snapshot.is_dragging && snapshot.is_file_drag;
        if self.state.armed_by_gesture && !file_drag {
            self.state.armed_by_gesture = false;
            debug!("overlay_gesture_disarmed");
            self.check_hide(now);
        }
        if self.state.armed_by_hold && !(file_drag && snapshot.shift_down) {
            self.state.armed_by_hold = false;
            debug!("overlay_hold_disarmed");
            self.check_hide(now);
        }
    }

    /// The drag ended; gesture and hold reasons clear.
    pub fn end_drag(&mut self, now: Instant) {
        self.state.dragging = false;
        if self.state.armed_by_gesture || self.state.armed_by_hold {
            debug!("overlay_drag_disarmed");
        }
        self.state.armed_by_gesture = false;
        self.state.armed_by_hold = false;
        self.check_hide(now);
    }

    /// A shake was recognized at `at`. Ignored outside a drag.
    pub fn trigger_shake(&mut self, at: Point, now: Instant) {
        if !self.state.dragging {
            trace!("overlay_shake_ignored");
            return;
        }
        self.state.armed_by_gesture = true;
        debug!("overlay_gesture_armed");
        self.arm_show(at, now);
    }

    /// A modifier hold completed at `at`. Ignored outside a drag.
    pub fn trigger_modifier_hold(&mut self, at: Point, now: Instant) {
        if !self.state.dragging {
            trace!("overlay_hold_ignored");
            return;
        }
        self.state.armed_by_hold = true;
        debug!("overlay_hold_armed");
        self.arm_show(at, now);
    }

    /// Flip manual visibility. Turning on always repositions at `at`.
    pub fn toggle_manual(&mut self, at: Point, now: Instant) {
        self.state.last_known_location = Some(at);
        if self.state.visible && self.state.manually_visible {
            self.state.manually_visible = false;
            debug!("overlay_manual_off");
            self.check_hide(now);
            return;
        }
        self.state.manually_visible = true;
        debug!("overlay_manual_on");
        self.timers.cancel(OverlayTimer::Hide);
        self.show_at(at);
    }

    /// The held-item count changed.
    pub fn items_changed(&mut self, count: usize, now: Instant) {
        let pin = count > 0;
        if pin && self.state.drop_hold {
            self.state.drop_hold = false;
            debug!("overlay_drop_hold_released");
        }
        if pin != self.state.pinned {
            self.state.pinned = pin;
            debug!(pinned = pin, count, "overlay_pin_changed");
            if pin && !self.state.visible {
                let at = self
                    .state
                    .last_known_location
                    .unwrap_or_else(|| self.desktop.cursor_location());
                self.timers.cancel(OverlayTimer::Hide);
                self.show_at(at);
            }
        }
        self.check_hide(now);
    }

    /// Set or clear the external drop-in-progress flag.
    pub fn set_drop_hold(&mut self, hold: bool, now: Instant) {
        if self.state.drop_hold == hold {
            return;
        }
        self.state.drop_hold = hold;
        debug!(hold, "overlay_drop_hold");
        self.check_hide(now);
    }

    /// Fire the hide timer if due.
    pub fn on_timer(&mut self, now: Instant) {
        for timer in self.timers.take_due(now) {
            match timer {
                OverlayTimer::Hide => {
                    if self.state.has_reason() || self.state.drop_hold {
                        trace!("overlay_hide_abandoned");
                    } else {
                        self.hide();
                    }
                }
            }
        }
    }

    /// Drop the pending hide without touching visibility.
    pub fn clear_timers(&mut self) {
        self.timers.clear();
    }

    fn arm_show(&mut self, at: Point, now: Instant) {
        self.timers.cancel(OverlayTimer::Hide);
        if !self.state.visible {
            self.show_at(at);
        }
        self.check_hide(now);
    }

    /// Keep the hide timer consistent with the current reasons.
    fn check_hide(&mut self, now: Instant) {
        if self.state.has_reason() || self.state.drop_hold {
            if self.timers.cancel(OverlayTimer::Hide) {
                trace!("overlay_hide_cancelled");
            }
            return;
        }
        if self.state.visible && !self.timers.is_armed(OverlayTimer::Hide) {
            debug!(
                delay_ms = self.overlay.hide_delay_ms,
                "overlay_hide_scheduled"
            );
            self.timers
                .arm(OverlayTimer::Hide, now, self.overlay.hide_delay());
        }
    }

    fn placement_for(&self, at: Point) -> Placement {
        let displays = self.desktop.displays();
        let anchor = self.desktop.current_anchor();
        place(
            &self.placement,
            at,
            self.overlay.size(),
            anchor.as_ref(),
            &displays,
        )
    }

    fn show_at(&mut self, at: Point) {
        let Placement { frame, tier } = self.placement_for(at);
        self.state.frame = Some(frame);
        if self.state.visible {
            debug!(?tier, ?frame, "overlay_reposition");
            self.presenter.set_frame(frame);
        } else {
            debug!(?tier, ?frame, "overlay_show");
            self.state.visible = true;
            self.presenter.show(frame);
        }
    }

    fn hide(&mut self) {
        if !self.state.visible {
            return;
        }
        debug!("overlay_hide");
        self.state.visible = false;
        self.presenter.hide();
    }
}
