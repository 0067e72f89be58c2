//! Fakes shared by unit and integration tests.
//!
//! Every fake is cheaply cloneable and shares its state between clones, so a
//! test can hand one copy to the engine and keep another to script or
//! inspect it.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
};

use parking_lot::Mutex;

use crate::{
    engine::{EngineHandle, InputSource},
    error::{Error, Result},
    geom::{Point, Rect},
    input::{InputObserver, InputProbe, InputSnapshot},
    locator::{Anchor, Desktop, Display},
    overlay::Presenter,
};

/// Scriptable mouse button and drag payload state.
#[derive(Debug, Clone, Default)]
pub struct FakeProbe {
    buttons: Arc<AtomicU32>,
    files: Arc<AtomicBool>,
}

impl FakeProbe {
    /// Set the pressed-button mask.
    pub fn set_buttons(&self, mask: u32) {
        self.buttons.store(mask, Ordering::SeqCst);
    }

    /// Set whether the drag carries files.
    pub fn set_files(&self, files: bool) {
        self.files.store(files, Ordering::SeqCst);
    }
}

impl InputProbe for FakeProbe {
    fn pressed_buttons(&self) -> u32 {
        self.buttons.load(Ordering::SeqCst)
    }

    fn drag_has_files(&self) -> bool {
        self.files.load(Ordering::SeqCst)
    }
}

/// One callback received by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// `on_input_update`.
    Update(InputSnapshot),
    /// `on_shake`.
    Shake(Point),
    /// `on_modifier_hold`.
    Hold(Point),
    /// `on_modifier_double_tap`.
    DoubleTap(Point),
    /// `on_drag_end`.
    DragEnd,
}

/// Records every input observer callback in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    /// Callbacks in arrival order.
    pub signals: Vec<Signal>,
}

impl RecordingObserver {
    /// Every snapshot received.
    pub fn snapshots(&self) -> Vec<InputSnapshot> {
        self.signals
            .iter()
            .filter_map(|s| match s {
                Signal::Update(snap) => Some(*snap),
                _ => None,
            })
            .collect()
    }

    /// Locations of every shake.
    pub fn shakes(&self) -> Vec<Point> {
        self.signals
            .iter()
            .filter_map(|s| match s {
                Signal::Shake(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Locations of every hold.
    pub fn holds(&self) -> Vec<Point> {
        self.signals
            .iter()
            .filter_map(|s| match s {
                Signal::Hold(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Number of double-taps.
    pub fn double_taps(&self) -> usize {
        self.signals
            .iter()
            .filter(|s| matches!(s, Signal::DoubleTap(_)))
            .count()
    }

    /// Number of drag ends.
    pub fn drag_ends(&self) -> usize {
        self.signals
            .iter()
            .filter(|s| matches!(s, Signal::DragEnd))
            .count()
    }
}

impl InputObserver for RecordingObserver {
    fn on_input_update(&mut self, snapshot: InputSnapshot) {
        self.signals.push(Signal::Update(snapshot));
    }

    fn on_shake(&mut self, at: Point) {
        self.signals.push(Signal::Shake(at));
    }

    fn on_modifier_hold(&mut self, at: Point) {
        self.signals.push(Signal::Hold(at));
    }

    fn on_modifier_double_tap(&mut self, at: Point) {
        self.signals.push(Signal::DoubleTap(at));
    }

    fn on_drag_end(&mut self) {
        self.signals.push(Signal::DragEnd);
    }
}

/// Shared state behind [`FakeDesktop`].
#[derive(Debug, Default)]
struct DesktopState {
    displays: Vec<Display>,
    cursor: Point,
    anchor: Option<Anchor>,
}

/// Displays, cursor and anchor under test control.
#[derive(Debug, Clone, Default)]
pub struct FakeDesktop {
    state: Arc<Mutex<DesktopState>>,
    cursor_queries: Arc<AtomicUsize>,
    anchor_queries: Arc<AtomicUsize>,
}

impl FakeDesktop {
    /// Desktop with `displays`, the first being the default.
    pub fn new(displays: Vec<Display>) -> Self {
        let desktop = Self::default();
        desktop.state.lock().displays = displays;
        desktop
    }

    /// One display whose usable area is its whole frame.
    pub fn single(frame: Rect) -> Self {
        Self::new(vec![Display::full(frame)])
    }

    /// Live cursor location.
    pub fn set_cursor(&self, p: Point) {
        self.state.lock().cursor = p;
    }

    /// Anchor returned by `current_anchor`.
    pub fn set_anchor(&self, anchor: Option<Anchor>) {
        self.state.lock().anchor = anchor;
    }

    /// Number of live cursor lookups so far.
    pub fn cursor_queries(&self) -> usize {
        self.cursor_queries.load(Ordering::SeqCst)
    }

    /// Number of anchor lookups so far.
    pub fn anchor_queries(&self) -> usize {
        self.anchor_queries.load(Ordering::SeqCst)
    }
}

impl Desktop for FakeDesktop {
    fn displays(&self) -> Vec<Display> {
        self.state.lock().displays.clone()
    }

    fn cursor_location(&self) -> Point {
        self.cursor_queries.fetch_add(1, Ordering::SeqCst);
        self.state.lock().cursor
    }

    fn current_anchor(&self) -> Option<Anchor> {
        self.anchor_queries.fetch_add(1, Ordering::SeqCst);
        self.state.lock().anchor
    }
}

/// One presenter call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PresenterCall {
    /// `show` with its frame.
    Show(Rect),
    /// `hide`.
    Hide,
    /// `set_frame` with its frame.
    SetFrame(Rect),
}

/// Records presenter calls.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    calls: Arc<Mutex<Vec<PresenterCall>>>,
}

impl RecordingPresenter {
    /// Calls in order.
    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().clone()
    }

    /// Visibility implied by the last show or hide.
    pub fn is_visible(&self) -> bool {
        self.calls
            .lock()
            .iter()
            .rev()
            .find_map(|c| match c {
                PresenterCall::Show(_) => Some(true),
                PresenterCall::Hide => Some(false),
                PresenterCall::SetFrame(_) => None,
            })
            .unwrap_or(false)
    }
}

impl Presenter for RecordingPresenter {
    fn show(&mut self, frame: Rect) {
        self.calls.lock().push(PresenterCall::Show(frame));
    }

    fn hide(&mut self) {
        self.calls.lock().push(PresenterCall::Hide);
    }

    fn set_frame(&mut self, frame: Rect) {
        self.calls.lock().push(PresenterCall::SetFrame(frame));
    }
}

/// Shared state behind [`ScriptedSource`].
#[derive(Debug, Default)]
struct SourceState {
    handle: Option<EngineHandle>,
    starts: usize,
    stops: usize,
    fail_start: bool,
}

/// Input source that captures the engine handle instead of installing taps.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    state: Arc<Mutex<SourceState>>,
}

impl ScriptedSource {
    /// A source whose `start` reports a tap installation failure.
    pub fn failing() -> Self {
        let source = Self::default();
        source.state.lock().fail_start = true;
        source
    }

    /// Handle captured by the last successful `start`.
    pub fn handle(&self) -> Option<EngineHandle> {
        self.state.lock().handle.clone()
    }

    /// Drop the captured handle, as a source whose taps went away would.
    pub fn release(&self) {
        self.state.lock().handle = None;
    }

    /// Number of successful `start` calls.
    pub fn starts(&self) -> usize {
        self.state.lock().starts
    }

    /// Number of `stop` calls.
    pub fn stops(&self) -> usize {
        self.state.lock().stops
    }
}

impl InputSource for ScriptedSource {
    fn start(&mut self, handle: EngineHandle) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_start {
            return Err(Error::TapStart);
        }
        state.starts += 1;
        state.handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        state.stops += 1;
        state.handle = None;
    }
}
