//! Async engine driver.
//!
//! One task owns the input state machine and the overlay controller. Raw
//! events, item counts and control requests arrive over an unbounded channel
//! from any thread through an [`EngineHandle`]. Timers of both machines are
//! served by sleeping until the earliest deadline, so every callback runs on
//! the engine task.
//!
//! Input snapshots travel through a [`LatestValueCoalescer`]: the first
//! snapshot of a burst enqueues a flush message behind the events already
//! waiting, so the controller sees only the newest snapshot per burst.
//! Intents are queued and delivered after the pending snapshot has been
//! flushed, so the controller never acts on stale drag state.

use std::{mem, sync::Arc, time::Instant as StdInstant};

use tokio::{
    sync::{mpsc, oneshot},
    time::{self, Instant},
};
use tracing::{debug, info, trace};

use crate::{
    coalesce::LatestValueCoalescer,
    config::DropzoneCfg,
    error::{Error, Result},
    geom::Point,
    input::{InputMonitor, InputObserver, InputProbe, InputSnapshot, RawEvent},
    locator::Desktop,
    overlay::{OverlayController, Presenter},
};

/// Supplier of raw input events, typically a set of OS event taps.
pub trait InputSource {
    /// Install taps and begin forwarding events to `handle`.
    fn start(&mut self, handle: EngineHandle) -> Result<()>;
    /// Remove taps. No event is forwarded after this returns.
    fn stop(&mut self);
}

/// High-level intent derived by the input state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Shake recognized at the given location.
    Shake(Point),
    /// Modifier held through a file drag.
    ModifierHold(Point),
    /// Modifier tapped twice outside a drag.
    ModifierDoubleTap(Point),
    /// The drag session ended.
    DragEnd,
}

/// Messages accepted by the engine task.
#[derive(Debug)]
enum Msg {
    /// One event from the input source.
    Raw(RawEvent),
    /// Deliver the coalesced input snapshot.
    FlushInput,
    /// New held-item count.
    ItemsChanged(usize),
    /// Flip manual visibility at the live cursor.
    ToggleManual,
    /// Set or clear the drop hold.
    SetDropHold(bool),
    /// Shut down, then acknowledge.
    Stop(oneshot::Sender<()>),
}

/// Cloneable, thread-safe handle for feeding the engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Msg>,
}

impl EngineHandle {
    fn send(&self, msg: Msg) -> Result<()> {
        self.tx.send(msg).map_err(|_| Error::EngineStopped)
    }

    /// Forward one raw input event.
    pub fn raw(&self, ev: RawEvent) -> Result<()> {
        self.send(Msg::Raw(ev))
    }

    /// Report the current held-item count.
    pub fn items_changed(&self, count: usize) -> Result<()> {
        self.send(Msg::ItemsChanged(count))
    }

    /// Toggle manual visibility at the live cursor location.
    pub fn toggle_manual(&self) -> Result<()> {
        self.send(Msg::ToggleManual)
    }

    /// Set or clear the drop-in-progress flag.
    pub fn set_drop_hold(&self, hold: bool) -> Result<()> {
        self.send(Msg::SetDropHold(hold))
    }

    /// Stop the engine and wait until it has shut down. Returns at once if
    /// the engine already exited.
    pub async fn stop(&self) {
        let (ack, done) = oneshot::channel();
        if self.send(Msg::Stop(ack)).is_ok() {
            done.await.ok();
        }
    }

    /// True once the engine task has exited.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Input observer that routes snapshots into the coalescer and queues
/// intents for the engine loop.
struct Relay {
    coalescer: Arc<LatestValueCoalescer<InputSnapshot>>,
    intents: Vec<Intent>,
}

impl InputObserver for Relay {
    fn on_input_update(&mut self, snapshot: InputSnapshot) {
        self.coalescer.submit(snapshot);
    }

    fn on_shake(&mut self, at: Point) {
        self.intents.push(Intent::Shake(at));
    }

    fn on_modifier_hold(&mut self, at: Point) {
        self.intents.push(Intent::ModifierHold(at));
    }

    fn on_modifier_double_tap(&mut self, at: Point) {
        self.intents.push(Intent::ModifierDoubleTap(at));
    }

    fn on_drag_end(&mut self) {
        self.intents.push(Intent::DragEnd);
    }
}

/// Current time on the engine clock, as the machines expect it.
fn now() -> StdInstant {
    Instant::now().into_std()
}

/// The engine: state machines plus the task loop that drives them.
///
/// The engine keeps one sender until [`Engine::run`] hands it to the input
/// source. From then on the loop holds no sender of its own, so it also
/// exits once every [`EngineHandle`] has been dropped.
pub struct Engine<S, P, D, R> {
    driver: Driver<S, P, D, R>,
    handle: EngineHandle,
}

/// Everything the running loop owns.
struct Driver<S, P, D, R> {
    source: S,
    input: InputMonitor<P, Relay>,
    overlay: OverlayController<D, R>,
    coalescer: Arc<LatestValueCoalescer<InputSnapshot>>,
    rx: mpsc::UnboundedReceiver<Msg>,
}

impl<S, P, D, R> Engine<S, P, D, R>
where
    S: InputSource,
    P: InputProbe,
    D: Desktop,
    R: Presenter,
{
    /// Assemble an engine; nothing runs until [`Engine::run`].
    pub fn new(cfg: DropzoneCfg, source: S, probe: P, desktop: D, presenter: R) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let flush_tx = tx.downgrade();
        let coalescer = Arc::new(LatestValueCoalescer::new(move || {
            // No live sender means the engine is shutting down.
            if let Some(tx) = flush_tx.upgrade() {
                tx.send(Msg::FlushInput).ok();
            }
        }));
        let relay = Relay {
            coalescer: coalescer.clone(),
            intents: Vec::new(),
        };
        let DropzoneCfg {
            input,
            shake,
            overlay,
            placement,
        } = cfg;
        Self {
            driver: Driver {
                source,
                input: InputMonitor::new(input, shake, probe, relay),
                overlay: OverlayController::new(overlay, placement, desktop, presenter),
                coalescer,
                rx,
            },
            handle: EngineHandle { tx },
        }
    }

    /// A new handle for feeding this engine.
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Run until [`EngineHandle::stop`] is called or every handle is gone.
    ///
    /// Fails only if the input source cannot start; nothing has been shown
    /// in that case.
    pub async fn run(self) -> Result<()> {
        let Self { mut driver, handle } = self;
        driver.source.start(handle)?;
        driver.input.start();
        info!("engine_started");
        driver.run().await;
        Ok(())
    }
}

impl<S, P, D, R> Driver<S, P, D, R>
where
    S: InputSource,
    P: InputProbe,
    D: Desktop,
    R: Presenter,
{
    async fn run(&mut self) {
        loop {
            let deadline = self.next_deadline();
            let sleep = time::sleep_until(
                deadline
                    .map(Instant::from_std)
                    .unwrap_or_else(|| Instant::now() + time::Duration::from_secs(3600)),
            );
            tokio::select! {
                biased;
                _ = sleep, if deadline.is_some() => {
                    self.on_timers(now());
                }
                msg = self.rx.recv() => {
                    match msg {
                        Some(msg) => {
                            if !self.on_msg(msg, now()) {
                                return;
                            }
                        }
                        None => {
                            debug!("engine_handles_dropped");
                            self.shutdown();
                            return;
                        }
                    }
                }
            }
        }
    }

    fn next_deadline(&self) -> Option<StdInstant> {
        match (self.input.next_deadline(), self.overlay.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Handle one message; false once the engine has shut down.
    fn on_msg(&mut self, msg: Msg, now: StdInstant) -> bool {
        match msg {
            Msg::Raw(ev) => {
                self.input.handle(ev);
                self.deliver_intents(now);
            }
            Msg::FlushInput => self.flush_input(now),
            Msg::ItemsChanged(count) => self.overlay.items_changed(count, now),
            Msg::ToggleManual => {
                let at = self.overlay.desktop().cursor_location();
                self.overlay.toggle_manual(at, now);
            }
            Msg::SetDropHold(hold) => self.overlay.set_drop_hold(hold, now),
            Msg::Stop(ack) => {
                self.shutdown();
                ack.send(()).ok();
                return false;
            }
        }
        true
    }

    fn on_timers(&mut self, now: StdInstant) {
        trace!("engine_timers_due");
        self.input.on_timer(now);
        self.deliver_intents(now);
        self.overlay.on_timer(now);
    }

    fn flush_input(&mut self, now: StdInstant) {
        let overlay = &mut self.overlay;
        let n = self.coalescer.flush(|snap| overlay.update_input(&snap, now));
        if n > 0 {
            trace!(n, "input_flushed");
        }
    }

    fn deliver_intents(&mut self, now: StdInstant) {
        let intents = mem::take(&mut self.input.observer_mut().intents);
        if intents.is_empty() {
            return;
        }
        self.flush_input(now);
        for intent in intents {
            debug!(?intent, "intent");
            match intent {
                Intent::Shake(at) => self.overlay.trigger_shake(at, now),
                Intent::ModifierHold(at) => self.overlay.trigger_modifier_hold(at, now),
                Intent::ModifierDoubleTap(at) => self.overlay.toggle_manual(at, now),
                Intent::DragEnd => self.overlay.end_drag(now),
            }
        }
    }

    fn shutdown(&mut self) {
        self.input.stop();
        self.overlay.clear_timers();
        self.source.stop();
        let discarded = self.coalescer.flush(|_| {});
        self.input.observer_mut().intents.clear();
        info!(discarded, "engine_stopped");
    }
}
