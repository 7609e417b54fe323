use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cancels `cancellation` on Ctrl-C. This is how a running pomodoro gets squished.
pub async fn detect_shutdown(cancellation: CancellationToken) {
    select! {
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Received interrupt"),
                Err(e) => warn!("Can't listen for interrupts {e:?}"),
            }
            cancellation.cancel();
        },
        _ = cancellation.cancelled() => (),
    };
}
