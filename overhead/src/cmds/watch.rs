//! `watch`: the monitor in its own thread, the shell on stdin.
//!

use std::io;
use std::sync::{mpsc, Arc};
use std::thread;

use eyre::{eyre, Result};
use tracing::{info, trace, warn};

use crate::{
    run_shell, ConsoleNotifier, Context, ControlSurface, Feed, MonitorConfig, MonitorLoop,
};

/// Run until Ctrl-C, `quit` or an unrecoverable credential failure.
///
#[tracing::instrument(skip(ctx))]
pub fn watch(ctx: Context) -> Result<()> {
    trace!("watch");

    let control = Arc::new(ControlSurface::new(
        MonitorConfig {
            paused: false,
            radius_km: ctx.radius,
        },
        ctx.capacity,
    ));

    let (tx, rx) = mpsc::channel::<()>();

    // Ctrl-C and SIGTERM
    //
    let sig = tx.clone();
    ctrlc::set_handler(move || {
        info!("Interrupted");
        let _ = sig.send(());
    })?;

    let feed = Feed::new(
        Box::new(ctx.site.clone()),
        Box::new(ctx.site),
        ctx.credential,
    );
    let mut monitor = MonitorLoop::new(
        ctx.center,
        feed,
        ctx.enricher,
        Box::new(ConsoleNotifier::new()),
        Arc::clone(&control),
    )
    .period(ctx.interval);

    let worker = thread::Builder::new()
        .name("monitor".to_string())
        .spawn(move || monitor.run(rx))?;

    // The shell is never joined, it may be blocked on stdin when we leave.
    //
    let shell = Arc::clone(&control);
    thread::Builder::new()
        .name("shell".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            match run_shell(&shell, stdin.lock(), &mut stdout) {
                Ok(true) => {
                    let _ = tx.send(());
                }
                Ok(false) => info!("No more input, use Ctrl-C to stop"),
                Err(e) => warn!("shell: {e}"),
            }
        })?;

    worker
        .join()
        .map_err(|_| eyre!("monitor thread panicked"))??;

    info!(
        "{} requests, {} aircraft in range at the end",
        control.requests(),
        control.current_aircraft()
    );
    Ok(())
}
