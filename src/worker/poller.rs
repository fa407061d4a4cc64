use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::datasource::LedgerClient;
use crate::domain::BlockHeight;

/// Polls the ledger on a fixed period and publishes the latest height.
///
/// A failed poll is logged and the last published height stays in place.
#[derive(Debug)]
pub struct BlockHeightPoller {
    ledger: Arc<dyn LedgerClient>,
    period: Duration,
    tx: watch::Sender<Option<BlockHeight>>,
}

impl BlockHeightPoller {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        period: Duration,
    ) -> (Self, watch::Receiver<Option<BlockHeight>>) {
        let (tx, rx) = watch::channel(None);
        (Self { ledger, period, tx }, rx)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.poll_once().await;
            if self.tx.is_closed() {
                debug!("No height subscribers left, stopping poller");
                break;
            }
        }
    }

    async fn poll_once(&self) {
        match self.ledger.latest_height().await {
            Ok(height) => {
                debug!(%height, "polled block height");
                self.tx.send_replace(Some(height));
            }
            Err(e) => warn!("Failed to poll block height: {}", e),
        }
    }
}
