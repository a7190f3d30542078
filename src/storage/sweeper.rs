//! Background expiry sweep.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::Ledis;

/// Periodically drop expired keys so memory is reclaimed even if nobody reads them.
pub fn spawn_sweeper(ledis: Ledis, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = ledis.sweep().await;
            if !removed.is_empty() {
                log::debug!("[gc] cleaned {:?}", removed);
            }
        }
    })
}
