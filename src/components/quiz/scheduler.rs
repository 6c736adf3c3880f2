use tokio::sync::mpsc;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Countdown resolution
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Start the countdown task. One `()` arrives per elapsed period, the first one a full
/// period after the call.
///
/// The task stops when `token` is cancelled or the receiver is dropped.
pub fn start_countdown(token: CancellationToken, period: Duration) -> mpsc::Receiver<()> {
    let (tick_tx, tick_rx) = mpsc::channel(8);

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        // Ticks missed while the runtime was busy still count as elapsed time
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        debug!("Countdown started");

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Countdown cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    if tick_tx.send(()).await.is_err() {
                        debug!("Countdown receiver dropped");
                        break;
                    }
                }
            }
        }
    });

    tick_rx
}
