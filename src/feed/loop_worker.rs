use std::sync::Arc;

use tokio::{
    sync::mpsc,
    time::{self, Duration, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    stats::{self, CategorySnapshot, StatsFilter},
    store::EventStore,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Deliver one snapshot immediately, then one per `period`, until the token is
/// cancelled or the receiving side goes away.
pub async fn feed_loop(
    subscription_id: Uuid,
    store: Arc<dyn EventStore>,
    filter: StatsFilter,
    period: Duration,
    sender: mpsc::Sender<CategorySnapshot>,
    cancel_token: CancellationToken,
) {
    // First tick of a tokio interval completes immediately.
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = cancel_token.cancelled() => {
                log_info!("feed {subscription_id} cancelled");
                break;
            }
            _ = sender.closed() => {
                log_info!("feed {subscription_id} receiver dropped");
                break;
            }
            _ = ticker.tick() => {
                let snapshot = match stats::snapshot(store.as_ref(), filter).await {
                    Ok(snapshot) => snapshot,
                    Err(err) => {
                        log_warn!("feed {subscription_id} skipping tick: {err}");
                        continue;
                    }
                };

                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    sent = sender.send(snapshot) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }
}
