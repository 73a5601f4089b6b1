//! Ctrl+C handling for the synchronous simulation loop.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::{error, warn};

/// Raise `interrupt` on the first Ctrl+C.
///
/// The listener runs on a single-threaded runtime in a detached helper
/// thread; the simulation only polls the flag between steps.
pub fn install_ctrl_c(interrupt: Arc<AtomicBool>) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            runtime.block_on(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!(error = %e, "failed to listen for Ctrl+C");
                    return;
                }
                warn!("interrupt received, stopping after the current step");
                interrupt.store(true, Ordering::SeqCst);
            });
        })?;
    Ok(())
}
