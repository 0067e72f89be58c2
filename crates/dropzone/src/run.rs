//! Implementation for the `run` subcommand.

use dropzone_core::DropzoneCfg;

use crate::error::{Error, Result};

/// Wire the macOS adapters into the engine and run until Ctrl-C.
#[cfg(target_os = "macos")]
pub fn run(cfg: DropzoneCfg) -> Result<()> {
    use dropzone_core::Engine;
    use mac_dropwatch::{MacDesktop, MacInput, MacProbe, MainThreadMarker};
    use tokio::runtime::Builder;
    use tracing::info;

    use crate::presenter::LogPresenter;

    let mtm = MainThreadMarker::new().ok_or(Error::NotMainThread)?;
    let status = permissions::check_permissions();
    if !status.can_watch_input() {
        return Err(Error::MissingPermissions(status.missing().join(", ")));
    }
    if !status.accessibility_ok {
        info!("accessibility_missing_using_window_list_only");
    }

    let engine = Engine::new(
        cfg,
        MacInput::new(),
        MacProbe::new(),
        MacDesktop::new(mtm),
        LogPresenter::default(),
    );

    // Screen queries need the main thread, so the engine runs on it.
    let rt = Builder::new_current_thread().enable_all().build()?;
    rt.block_on(drive(engine))
}

/// Run `engine` until it exits or Ctrl-C arrives, then stop it cleanly.
#[cfg(target_os = "macos")]
async fn drive<S, P, D, R>(engine: dropzone_core::Engine<S, P, D, R>) -> Result<()>
where
    S: dropzone_core::InputSource,
    P: dropzone_core::InputProbe,
    D: dropzone_core::Desktop,
    R: dropzone_core::Presenter,
{
    use tokio::signal;
    use tracing::info;

    let handle = engine.handle();
    let run = engine.run();
    tokio::pin!(run);
    tokio::select! {
        res = &mut run => return Ok(res?),
        sig = signal::ctrl_c() => {
            sig?;
            info!("interrupt_received");
        }
    }
    let (res, ()) = tokio::join!(run, handle.stop());
    Ok(res?)
}

/// Input watching needs the macOS adapters.
#[cfg(not(target_os = "macos"))]
pub fn run(_cfg: DropzoneCfg) -> Result<()> {
    Err(Error::Unsupported("run"))
}
