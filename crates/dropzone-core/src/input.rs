//! Input state machine: raw pointer/modifier events to high-level intents.
//!
//! The machine tracks two orthogonal pieces of state, the drag session
//! (`Idle -> Dragging(file) -> Idle`) and the trigger modifier (Shift up or
//! down). From raw events it derives:
//!
//! - an [`InputSnapshot`] after every modifier or drag event
//! - shake gestures while a file drag is in progress
//! - modifier holds (Shift held for `hold_delay` during a file drag)
//! - modifier double-taps while idle with no mouse button down
//! - drag end, either from an explicit release, a drag event with no button
//!   down, or the button poll that runs while dragging
//!
//! Timers live in a [`TimerSet`]; the driver calls [`InputMonitor::on_timer`]
//! once the earliest deadline from [`InputMonitor::next_deadline`] passes.

use std::time::Instant;

use bitflags::bitflags;
use tracing::{debug, info, trace};

use crate::{
    config::{InputCfg, ShakeCfg},
    geom::Point,
    shake::ShakeDetector,
    timers::TimerSet,
};

bitflags! {
    /// Device-independent modifier set carried by raw events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const OPTION = 1 << 2;
        const COMMAND = 1 << 3;
        const CAPS_LOCK = 1 << 4;
        const FUNCTION = 1 << 5;
    }
}

impl Modifiers {
    /// The modifier whose hold and double-tap drive the overlay.
    pub const TRIGGER: Self = Self::SHIFT;

    /// Construct a modifier set from macOS CGEventFlags bits.
    pub fn from_cg_flags(flags: u64) -> Self {
        let mut m = Self::empty();
        if flags & (1 << 16) != 0 {
            m |= Self::CAPS_LOCK;
        }
        if flags & (1 << 17) != 0 {
            m |= Self::SHIFT;
        }
        if flags & (1 << 18) != 0 {
            m |= Self::CONTROL;
        }
        if flags & (1 << 19) != 0 {
            m |= Self::OPTION;
        }
        if flags & (1 << 20) != 0 {
            m |= Self::COMMAND;
        }
        if flags & (1 << 23) != 0 {
            m |= Self::FUNCTION;
        }
        m
    }
}

/// Bit for the primary (left) button in [`InputProbe::pressed_buttons`].
pub const LEFT_BUTTON: u32 = 1;

/// Kind of raw input event delivered by the platform tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    /// The set of held modifiers changed.
    ModifiersChanged,
    /// Pointer moved with the primary button held.
    DragMoved,
    /// Primary button released.
    ButtonReleased,
}

/// One raw event: kind, timestamp, modifiers and pointer location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawEvent {
    /// What happened.
    pub kind: RawKind,
    /// Arrival time on the engine clock.
    pub at: Instant,
    /// Modifier flags at the event.
    pub modifiers: Modifiers,
    /// Pointer location in global coordinates.
    pub location: Point,
}

impl RawEvent {
    /// Construct an event.
    pub fn new(kind: RawKind, at: Instant, modifiers: Modifiers, location: Point) -> Self {
        Self {
            kind,
            at,
            modifiers,
            location,
        }
    }
}

/// Live queries answered by the platform.
pub trait InputProbe {
    /// Bitmask of currently pressed mouse buttons (bit 0 = left).
    fn pressed_buttons(&self) -> u32;
    /// True when the active drag payload includes file references.
    fn drag_has_files(&self) -> bool;
}

/// Immutable view of the input state after one raw event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSnapshot {
    /// Pointer location at the event.
    pub location: Point,
    /// Trigger modifier is held.
    pub shift_down: bool,
    /// A left-button drag is in progress.
    pub is_dragging: bool,
    /// Always false unless `is_dragging`.
    pub is_file_drag: bool,
    /// Shift went down with this event.
    pub shift_just_pressed: bool,
}

impl InputSnapshot {
    /// Construct a snapshot; a file drag implies dragging.
    pub fn new(
        location: Point,
        shift_down: bool,
        is_dragging: bool,
        is_file_drag: bool,
        shift_just_pressed: bool,
    ) -> Self {
        Self {
            location,
            shift_down,
            is_dragging,
            is_file_drag: is_dragging && is_file_drag,
            shift_just_pressed,
        }
    }
}

/// Receiver for everything the state machine derives.
pub trait InputObserver {
    /// State after a drag event.
    fn on_input_update(&mut self, snapshot: InputSnapshot);
    /// A shake was recognized during a file drag.
    fn on_shake(&mut self, at: Point);
    /// The modifier stayed down through the hold delay of a file drag.
    fn on_modifier_hold(&mut self, at: Point);
    /// The bare modifier was tapped twice outside a drag.
    fn on_modifier_double_tap(&mut self, at: Point);
    /// The drag session ended, by release or by poll.
    fn on_drag_end(&mut self);
}

/// Mutable drag/modifier state, written only by [`InputMonitor`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragSessionState {
    /// Trigger modifier is held.
    pub shift_down: bool,
    /// A drag session is active.
    pub dragging: bool,
    /// The active drag carries files.
    pub file_drag: bool,
    /// Timestamp of a pending first tap for double-tap recognition.
    pub last_tap: Option<Instant>,
    /// The hold condition (dragging, file drag, Shift down) is currently met
    /// and the hold timer has been armed for it.
    pub hold_armed: bool,
    /// Pointer location at the most recent event.
    pub location: Point,
}

impl DragSessionState {
    fn hold_condition(&self) -> bool {
        self.dragging && self.file_drag && self.shift_down
    }

    /// Reset drag-scoped fields. Modifier state tracks the keyboard and is kept.
    fn end_drag(&mut self) {
        self.dragging = false;
        self.file_drag = false;
        self.hold_armed = false;
    }
}

/// Timer purposes owned by the input state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputTimer {
    /// Fires once Shift has been held for the hold delay.
    Hold,
    /// Polls the mouse button while dragging.
    DragPoll,
}

/// The input state machine.
pub struct InputMonitor<P, O> {
    cfg: InputCfg,
    probe: P,
    observer: O,
    shake: ShakeDetector,
    state: DragSessionState,
    timers: TimerSet<InputTimer>,
    /// Location captured when the hold timer was armed.
    hold_location: Option<Point>,
    running: bool,
}

impl<P: InputProbe, O: InputObserver> InputMonitor<P, O> {
    /// A stopped monitor; call [`InputMonitor::start`] before feeding events.
    pub fn new(input: InputCfg, shake: ShakeCfg, probe: P, observer: O) -> Self {
        Self {
            cfg: input,
            probe,
            observer,
            shake: ShakeDetector::new(shake),
            state: DragSessionState::default(),
            timers: TimerSet::new(),
            hold_location: None,
            running: false,
        }
    }

    /// Begin accepting events. Idempotent.
    pub fn start(&mut self) {
        if !self.running {
            info!("input_monitor_started");
            self.running = true;
        }
    }

    /// Stop accepting events and cancel every timer. Idempotent; no observer
    /// callback fires after this returns.
    pub fn stop(&mut self) {
        if self.running {
            info!("input_monitor_stopped");
        }
        self.running = false;
        self.timers.clear();
        self.hold_location = None;
        self.state.end_drag();
        self.state.last_tap = None;
        self.shake.reset();
    }

    /// True between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current drag and modifier state.
    pub fn state(&self) -> &DragSessionState {
        &self.state
    }

    /// The observer receiving snapshots and intents.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the observer.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// The live input probe.
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Mutable access to the probe.
    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    /// Earliest armed timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// True if `timer` is outstanding.
    pub fn is_timer_armed(&self, timer: InputTimer) -> bool {
        self.timers.is_armed(timer)
    }

    /// Feed one raw event.
    pub fn handle(&mut self, ev: RawEvent) {
        if !self.running {
            trace!(kind = ?ev.kind, "input_event_ignored_stopped");
            return;
        }
        trace!(kind = ?ev.kind, mods = ?ev.modifiers, x = ev.location.x, y = ev.location.y, "input_event");
        self.state.location = ev.location;
        match ev.kind {
            RawKind::ModifiersChanged => self.on_modifiers_changed(&ev),
            RawKind::DragMoved => self.on_drag_moved(&ev),
            RawKind::ButtonReleased => self.end_drag("button_released"),
        }
    }

    /// Run every timer due at `now`.
    pub fn on_timer(&mut self, now: Instant) {
        if !self.running {
            return;
        }
        for timer in self.timers.take_due(now) {
            match timer {
                InputTimer::Hold => self.on_hold_timer(),
                InputTimer::DragPoll => self.on_drag_poll(now),
            }
        }
    }

    fn on_modifiers_changed(&mut self, ev: &RawEvent) {
        if self.state.dragging && self.probe.pressed_buttons() == 0 {
            self.end_drag("flags_without_button");
        }
        let shift_pressed = self.update_shift(ev.modifiers);

        if self.state.dragging {
            if self.cfg.reevaluate_file_drag {
                self.state.file_drag = self.probe.drag_has_files();
            }
            if self.state.file_drag {
                self.ingest_shake(ev);
            }
        } else {
            self.state.file_drag = false;
        }

        self.update_hold(ev);
        self.update_double_tap(ev, shift_pressed);
        self.emit_snapshot(shift_pressed);
    }

    fn on_drag_moved(&mut self, ev: &RawEvent) {
        if self.probe.pressed_buttons() == 0 {
            self.end_drag("drag_without_button");
            return;
        }
        let starting = !self.state.dragging;
        self.state.dragging = true;
        if starting {
            debug!("drag_started");
            self.state.last_tap = None;
        }
        if !self.timers.is_armed(InputTimer::DragPoll) {
            self.timers
                .arm(InputTimer::DragPoll, ev.at, self.cfg.drag_poll());
        }
        let shift_pressed = self.update_shift(ev.modifiers);
        if starting || self.cfg.reevaluate_file_drag {
            self.state.file_drag = self.probe.drag_has_files();
        }
        if self.state.file_drag {
            self.ingest_shake(ev);
        }
        self.update_hold(ev);
        self.emit_snapshot(shift_pressed);
    }

    /// Record the new Shift state; returns the rising edge.
    fn update_shift(&mut self, mods: Modifiers) -> bool {
        let down = mods.contains(Modifiers::TRIGGER);
        let pressed = down && !self.state.shift_down;
        self.state.shift_down = down;
        pressed
    }

    fn ingest_shake(&mut self, ev: &RawEvent) {
        if self.shake.ingest(ev.location, ev.at) {
            debug!(x = ev.location.x, y = ev.location.y, "shake");
            self.observer.on_shake(ev.location);
        }
    }

    /// Arm the hold timer on the rising edge of the hold condition, cancel it
    /// as soon as the condition drops.
    fn update_hold(&mut self, ev: &RawEvent) {
        if self.state.hold_condition() {
            if !self.state.hold_armed {
                self.state.hold_armed = true;
                self.hold_location = Some(ev.location);
                self.timers
                    .arm(InputTimer::Hold, ev.at, self.cfg.hold_delay());
                trace!("hold_timer_armed");
            }
        } else if self.state.hold_armed {
            self.state.hold_armed = false;
            self.hold_location = None;
            self.timers.cancel(InputTimer::Hold);
            trace!("hold_timer_cancelled");
        }
    }

    fn on_hold_timer(&mut self) {
        // Conditions may have flipped and flipped back between arm and fire.
        if !self.state.hold_condition() {
            trace!("hold_timer_stale");
            return;
        }
        let at = self.hold_location.take().unwrap_or(self.state.location);
        debug!(x = at.x, y = at.y, "modifier_hold");
        self.observer.on_modifier_hold(at);
    }

    fn on_drag_poll(&mut self, now: Instant) {
        if !self.state.dragging {
            return;
        }
        if self.probe.pressed_buttons() & LEFT_BUTTON == 0 {
            self.end_drag("poll_button_up");
        } else {
            self.timers
                .arm(InputTimer::DragPoll, now, self.cfg.drag_poll());
        }
    }

    fn update_double_tap(&mut self, ev: &RawEvent, shift_pressed: bool) {
        if !shift_pressed || self.state.dragging || self.probe.pressed_buttons() != 0 {
            return;
        }
        if ev.modifiers != Modifiers::TRIGGER {
            // Chorded presses must not chain into a double-tap.
            self.state.last_tap = None;
            return;
        }
        match self.state.last_tap {
            Some(last) if ev.at.saturating_duration_since(last) <= self.cfg.double_tap() => {
                self.state.last_tap = None;
                debug!(x = ev.location.x, y = ev.location.y, "modifier_double_tap");
                self.observer.on_modifier_double_tap(ev.location);
            }
            _ => self.state.last_tap = Some(ev.at),
        }
    }

    fn end_drag(&mut self, cause: &'static str) {
        if !self.state.dragging {
            return;
        }
        debug!(cause, "drag_ended");
        self.state.end_drag();
        self.shake.reset();
        self.hold_location = None;
        self.timers.cancel(InputTimer::Hold);
        self.timers.cancel(InputTimer::DragPoll);
        self.observer.on_drag_end();
    }

    fn emit_snapshot(&mut self, shift_just_pressed: bool) {
        let s = &self.state;
        let snapshot = InputSnapshot::new(
            s.location,
            s.shift_down,
            s.dragging,
            s.file_drag,
            shift_just_pressed,
        );
        self.observer.on_input_update(snapshot);
    }
}
