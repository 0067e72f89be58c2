use std::time::Duration;

use dropzone_core::{
    DropzoneCfg, Engine, EngineHandle, Error, LEFT_BUTTON, Modifiers, Point, RawEvent, RawKind,
    Rect,
    test_support::{FakeDesktop, FakeProbe, PresenterCall, RecordingPresenter, ScriptedSource},
};
use tokio::time::{self, Instant};

type TestEngine = Engine<ScriptedSource, FakeProbe, FakeDesktop, RecordingPresenter>;

struct Rig {
    source: ScriptedSource,
    probe: FakeProbe,
    desktop: FakeDesktop,
    presenter: RecordingPresenter,
}

impl Rig {
    fn new() -> Self {
        let desktop = FakeDesktop::single(Rect::new(0.0, 0.0, 1600.0, 1000.0));
        desktop.set_cursor(Point::new(800.0, 500.0));
        Self {
            source: ScriptedSource::default(),
            probe: FakeProbe::default(),
            desktop,
            presenter: RecordingPresenter::default(),
        }
    }

    fn engine(&self) -> TestEngine {
        Engine::new(
            DropzoneCfg::default(),
            self.source.clone(),
            self.probe.clone(),
            self.desktop.clone(),
            self.presenter.clone(),
        )
    }

    fn hides(&self) -> usize {
        self.presenter
            .calls()
            .iter()
            .filter(|c| matches!(c, PresenterCall::Hide))
            .count()
    }
}

fn raw(kind: RawKind, mods: Modifiers, x: f64, y: f64) -> RawEvent {
    RawEvent::new(kind, Instant::now().into_std(), mods, Point::new(x, y))
}

async fn pause(ms: u64) {
    time::sleep(Duration::from_millis(ms)).await;
}

async fn double_tap(handle: &EngineHandle) {
    handle
        .raw(raw(RawKind::ModifiersChanged, Modifiers::SHIFT, 300.0, 300.0))
        .expect("send");
    pause(50).await;
    handle
        .raw(raw(RawKind::ModifiersChanged, Modifiers::empty(), 300.0, 300.0))
        .expect("send");
    pause(150).await;
    handle
        .raw(raw(RawKind::ModifiersChanged, Modifiers::SHIFT, 300.0, 300.0))
        .expect("send");
    pause(10).await;
    handle
        .raw(raw(RawKind::ModifiersChanged, Modifiers::empty(), 300.0, 300.0))
        .expect("send");
}

#[tokio::test(start_paused = true)]
async fn test_shake_shows_and_release_hides_after_delay() {
    let rig = Rig::new();
    let engine = rig.engine();
    let handle = engine.handle();

    let script = async {
        rig.probe.set_buttons(LEFT_BUTTON);
        rig.probe.set_files(true);
        for x in [500.0, 550.0, 500.0, 550.0, 500.0, 550.0] {
            handle
                .raw(raw(RawKind::DragMoved, Modifiers::empty(), x, 500.0))
                .expect("send");
            pause(30).await;
        }
        assert!(rig.presenter.is_visible(), "shake shows the overlay");

        rig.probe.set_buttons(0);
        handle
            .raw(raw(RawKind::ButtonReleased, Modifiers::empty(), 550.0, 500.0))
            .expect("send");
        pause(100).await;
        assert!(rig.presenter.is_visible(), "hide is deferred");
        pause(200).await;
        assert!(!rig.presenter.is_visible());
        handle.stop().await;
    };

    let (res, ()) = tokio::join!(engine.run(), script);
    res.expect("engine run");
    assert_eq!(rig.source.starts(), 1);
    assert_eq!(rig.source.stops(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hold_then_missed_release_ends_drag_by_poll() {
    let rig = Rig::new();
    let engine = rig.engine();
    let handle = engine.handle();

    let script = async {
        rig.probe.set_buttons(LEFT_BUTTON);
        rig.probe.set_files(true);
        handle
            .raw(raw(RawKind::DragMoved, Modifiers::SHIFT, 400.0, 400.0))
            .expect("send");
        pause(100).await;
        assert!(!rig.presenter.is_visible(), "hold delay not yet elapsed");
        pause(200).await;
        assert!(rig.presenter.is_visible(), "hold shows the overlay");

        // The button goes up but no release event is ever delivered.
        rig.probe.set_buttons(0);
        pause(600).await;
        assert!(!rig.presenter.is_visible());
        assert_eq!(rig.hides(), 1);
        handle.stop().await;
    };

    let (res, ()) = tokio::join!(engine.run(), script);
    res.expect("engine run");
}

#[tokio::test(start_paused = true)]
async fn test_double_tap_toggles_manual_overlay() {
    let rig = Rig::new();
    let engine = rig.engine();
    let handle = engine.handle();

    let script = async {
        double_tap(&handle).await;
        pause(10).await;
        assert!(rig.presenter.is_visible());
        // Stays up: manual visibility does not time out.
        pause(2000).await;
        assert!(rig.presenter.is_visible());

        double_tap(&handle).await;
        pause(400).await;
        assert!(!rig.presenter.is_visible());
        handle.stop().await;
    };

    let (res, ()) = tokio::join!(engine.run(), script);
    res.expect("engine run");
}

#[tokio::test(start_paused = true)]
async fn test_items_pin_overlay_until_cleared() {
    let rig = Rig::new();
    let engine = rig.engine();
    let handle = engine.handle();

    let script = async {
        handle.items_changed(3).expect("send");
        pause(10).await;
        assert!(rig.presenter.is_visible());
        // No input was seen yet, so the live cursor anchors the frame.
        assert!(rig.desktop.cursor_queries() >= 1);
        pause(1000).await;
        assert!(rig.presenter.is_visible());

        handle.items_changed(0).expect("send");
        pause(300).await;
        assert!(!rig.presenter.is_visible());
        handle.stop().await;
    };

    let (res, ()) = tokio::join!(engine.run(), script);
    res.expect("engine run");
}

#[tokio::test(start_paused = true)]
async fn test_drop_hold_defers_hide() {
    let rig = Rig::new();
    let engine = rig.engine();
    let handle = engine.handle();

    let script = async {
        handle.toggle_manual().expect("send");
        pause(10).await;
        handle.set_drop_hold(true).expect("send");
        handle.toggle_manual().expect("send");
        pause(1000).await;
        assert!(rig.presenter.is_visible(), "drop in progress");

        handle.set_drop_hold(false).expect("send");
        pause(300).await;
        assert!(!rig.presenter.is_visible());
        handle.stop().await;
    };

    let (res, ()) = tokio::join!(engine.run(), script);
    res.expect("engine run");
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_pending_hide() {
    let rig = Rig::new();
    let engine = rig.engine();
    let handle = engine.handle();

    let script = async {
        handle.toggle_manual().expect("send");
        pause(10).await;
        handle.toggle_manual().expect("send");
        pause(10).await;
        handle.stop().await;
        pause(1000).await;
    };

    let (res, ()) = tokio::join!(engine.run(), script);
    res.expect("engine run");
    assert_eq!(rig.hides(), 0, "no callback after stop");
    assert!(handle.is_closed());
    assert!(matches!(
        handle.items_changed(1),
        Err(Error::EngineStopped)
    ));
    // Stopping twice is harmless.
    handle.stop().await;
    assert_eq!(rig.source.stops(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_source_failure_aborts_run() {
    let rig = Rig {
        source: ScriptedSource::failing(),
        ..Rig::new()
    };
    let engine = rig.engine();
    let err = engine.run().await.expect_err("tap failure");
    assert!(matches!(err, Error::TapStart));
    assert!(rig.presenter.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_engine_exits_when_all_handles_drop() {
    let rig = Rig::new();
    let engine = rig.engine();

    let script = async {
        pause(10).await;
        assert!(rig.source.handle().is_some());
        // The source was holding the last sender.
        rig.source.release();
    };

    let (res, ()) = tokio::join!(engine.run(), script);
    res.expect("engine run");
    assert_eq!(rig.source.stops(), 1);
    assert!(rig.presenter.calls().is_empty());
}
