//! dropzone-core: gesture recognition and overlay placement for a drag
//! drop-zone overlay.
//!
//! The crate turns a stream of raw pointer and modifier events into
//! show/hide/frame decisions for a floating overlay:
//!
//! - [`InputMonitor`] classifies raw events into snapshots and intents
//!   (shake, modifier hold, modifier double-tap, drag end)
//! - [`ShakeDetector`] recognizes horizontal shakes over a sliding window
//! - [`LatestValueCoalescer`] collapses bursts of snapshots
//! - [`OverlayController`] owns visibility and asks [`place`] for frames
//! - [`WindowLocator`] resolves the frontmost window through two tiers
//! - [`Engine`] wires all of the above onto one tokio task
//!
//! Nothing here talks to the OS. Platform adapters implement
//! [`InputSource`], [`InputProbe`], [`Desktop`] and [`Presenter`].

pub mod coalesce;
pub mod config;
pub mod engine;
mod error;
pub mod geom;
pub mod input;
pub mod locator;
pub mod overlay;
pub mod place;
pub mod shake;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;
pub mod timers;

pub use coalesce::LatestValueCoalescer;
pub use config::{DropzoneCfg, InputCfg, OverlayCfg, PlacementCfg, ShakeCfg};
pub use engine::{Engine, EngineHandle, InputSource, Intent};
pub use error::{Error, Result};
pub use geom::{Point, Rect, Size};
pub use input::{
    DragSessionState, InputMonitor, InputObserver, InputProbe, InputSnapshot, LEFT_BUTTON,
    Modifiers, RawEvent, RawKind,
};
pub use locator::{Anchor, Desktop, Display, LocateError, WindowLocator, WindowTier};
pub use overlay::{OverlayController, OverlayVisibilityState, Presenter};
pub use place::{Placement, PlacementCandidate, PlacementTier, Side, place};
pub use shake::{PointerSample, ShakeDetector};
pub use timers::TimerSet;
