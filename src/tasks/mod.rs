//! Background tasks keeping the live feed in sync.
//!
//! The change stream is treated purely as an invalidation signal: receiving
//! anything schedules a full re-read after a short debounce window, and a
//! periodic fallback re-sync covers lost or lagged notifications. Call
//! `spawn_all` once during startup.

use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::time::sleep;

use crate::config::LiveConfig;
use crate::services::{ChangeNotifier, LiveService};

/// Spawn the live-feed refresh tasks. Detaches via `tokio::spawn`; does not
/// block.
pub fn spawn_all(live_service: LiveService, notifier: ChangeNotifier, live: &LiveConfig) {
    let debounce = Duration::from_millis(live.debounce_ms);
    let resync = Duration::from_secs(live.resync_secs.max(1));

    // Debounced change listener: coalesce bursts (a multi-draw publishes one
    // signal per step) into a single refresh.
    {
        let svc = live_service.clone();
        let mut rx = notifier.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        sleep(debounce).await;
                        while rx.try_recv().is_ok() {}
                        if let Err(e) = svc.refresh().await {
                            log::error!("live refresh after change signal failed: {e:?}");
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    // Fallback full re-sync on a fixed interval.
    {
        let svc = live_service;
        tokio::spawn(async move {
            loop {
                if let Err(e) = svc.refresh().await {
                    log::error!("periodic live re-sync failed: {e:?}");
                }
                sleep(resync).await;
            }
        });
    }
}
