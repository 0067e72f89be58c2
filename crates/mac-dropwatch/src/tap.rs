//! Listen-only CGEventTap for modifier changes, left drags and left-ups.
//!
//! The tap runs on a dedicated CFRunLoop thread and forwards each event to
//! the engine as a [`RawEvent`]; it never modifies or swallows input. The
//! OS may disable a tap that is slow to respond; the callback re-enables it.

use std::{
    ffi::c_void,
    ptr,
    sync::{
        Arc,
        atomic::{AtomicPtr, Ordering},
    },
    thread::{self, JoinHandle},
    time::Instant,
};

use core_foundation::{
    base::TCFType,
    mach_port::CFMachPortRef,
    runloop::{CFRunLoop, kCFRunLoopCommonModes},
};
use core_graphics::event::{self as cge, CallbackResult};
use crossbeam_channel::{Sender, bounded};
use dropzone_core::{EngineHandle, InputSource, Modifiers, RawEvent, RawKind};
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::{
    error::{Error, Result},
    screen,
};

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
}

/// Shared control handle to stop the run loop from other threads.
struct SysControl {
    rl: Mutex<Option<CFRunLoop>>,
}

impl SysControl {
    fn new() -> Self {
        Self {
            rl: Mutex::new(None),
        }
    }

    fn set_rl(&self, rl: CFRunLoop) {
        *self.rl.lock() = Some(rl);
    }

    fn stop(&self) {
        if let Some(rl) = self.rl.lock().take() {
            rl.stop();
        }
    }
}

// SAFETY: CFRunLoopStop may be called from any thread.
unsafe impl Send for SysControl {}
// SAFETY: access to the run loop reference is serialized by the mutex.
unsafe impl Sync for SysControl {}

fn raw_kind(etype: cge::CGEventType) -> Option<RawKind> {
    match etype {
        cge::CGEventType::FlagsChanged => Some(RawKind::ModifiersChanged),
        cge::CGEventType::LeftMouseDragged => Some(RawKind::DragMoved),
        cge::CGEventType::LeftMouseUp => Some(RawKind::ButtonReleased),
        _ => None,
    }
}

fn run_event_loop(
    handle: EngineHandle,
    ready: Sender<Result<()>>,
    ctrl: Arc<SysControl>,
) -> Result<()> {
    // Capture for re-enabling the tap from inside the closure.
    let tap_port_ptr: Arc<AtomicPtr<c_void>> = Arc::new(AtomicPtr::new(ptr::null_mut()));

    debug!("creating_event_tap");
    let tap_port_ptr_cb = tap_port_ptr.clone();
    let tap = match cge::CGEventTap::new(
        cge::CGEventTapLocation::Session,
        cge::CGEventTapPlacement::TailAppendEventTap,
        cge::CGEventTapOptions::ListenOnly,
        vec![
            cge::CGEventType::FlagsChanged,
            cge::CGEventType::LeftMouseDragged,
            cge::CGEventType::LeftMouseUp,
        ],
        move |_proxy, etype, event| {
            if let Some(kind) = raw_kind(etype) {
                let loc = event.location();
                let ev = RawEvent::new(
                    kind,
                    Instant::now(),
                    Modifiers::from_cg_flags(event.get_flags().bits()),
                    screen::to_global_point(loc.x, loc.y),
                );
                trace!(?kind, "tap_event");
                if handle.raw(ev).is_err() {
                    trace!("engine_gone_dropping_event");
                }
                return CallbackResult::Keep;
            }
            if matches!(
                etype,
                cge::CGEventType::TapDisabledByTimeout | cge::CGEventType::TapDisabledByUserInput
            ) {
                let p = tap_port_ptr_cb.load(Ordering::SeqCst) as CFMachPortRef;
                if !p.is_null() {
                    warn!("tap_disabled_by_os_reenabling");
                    unsafe { CGEventTapEnable(p, true) };
                }
            }
            CallbackResult::Keep
        },
    ) {
        Ok(t) => t,
        Err(_) => {
            warn!("event_tap_create_failed");
            ready.send(Err(Error::EventTapStart)).ok();
            return Err(Error::EventTapStart);
        }
    };

    tap_port_ptr.store(
        tap.mach_port().as_concrete_TypeRef() as *mut c_void,
        Ordering::SeqCst,
    );

    let source = match tap.mach_port().create_runloop_source(0) {
        Ok(s) => s,
        Err(_) => {
            warn!("run_loop_source_create_failed");
            ready.send(Err(Error::EventTapStart)).ok();
            return Err(Error::EventTapStart);
        }
    };

    let rl = CFRunLoop::get_current();
    ctrl.set_rl(rl.clone());
    let mode = unsafe { kCFRunLoopCommonModes };
    rl.add_source(&source, mode);
    tap.enable();

    ready.send(Ok(())).ok();
    debug!("event_tap_started_run_loop");

    CFRunLoop::run_current();

    debug!("event_tap_exited");
    Ok(())
}

/// [`InputSource`] backed by a CGEventTap thread.
pub struct MacInput {
    ctrl: Arc<SysControl>,
    thread: Option<JoinHandle<()>>,
}

impl Default for MacInput {
    fn default() -> Self {
        Self::new()
    }
}

impl MacInput {
    /// A source with no tap installed.
    pub fn new() -> Self {
        Self {
            ctrl: Arc::new(SysControl::new()),
            thread: None,
        }
    }

    fn spawn(&mut self, handle: EngineHandle) -> Result<()> {
        if self.thread.is_some() {
            return Err(Error::AlreadyRunning);
        }
        if !permissions::input_monitoring_ok() {
            warn!("input_monitoring_permission_missing");
            return Err(Error::PermissionDenied("Input Monitoring"));
        }
        let (ready_tx, ready_rx) = bounded(1);
        let ctrl = self.ctrl.clone();
        let thread = thread::Builder::new()
            .name("dropzone-tap".into())
            .spawn(move || {
                if let Err(err) = run_event_loop(handle, ready_tx, ctrl) {
                    warn!(%err, "event_tap_loop_failed");
                }
            })?;
        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.thread = Some(thread);
                info!("event_tap_installed");
                Ok(())
            }
            Ok(Err(err)) => {
                thread.join().ok();
                Err(err)
            }
            Err(_) => Err(Error::TapThreadGone),
        }
    }
}

impl InputSource for MacInput {
    fn start(&mut self, handle: EngineHandle) -> dropzone_core::Result<()> {
        Ok(self.spawn(handle)?)
    }

    fn stop(&mut self) {
        self.ctrl.stop();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("event_tap_thread_panicked");
            }
            info!("event_tap_removed");
        }
    }
}

impl Drop for MacInput {
    fn drop(&mut self) {
        self.stop();
    }
}
