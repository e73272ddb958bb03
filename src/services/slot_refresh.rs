use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::domains::snapshot::{ConnectionStatus, SharedSnapshot};
use crate::error::Result;
use crate::interfaces::chain::ChainQuery;
use crate::interfaces::scheduler::ScheduledJob;

/// Fetches the current slot and records it, along with the connection status,
/// in the shared snapshot.
pub async fn refresh_slot(chain: &dyn ChainQuery, snapshot: &SharedSnapshot) -> Result<u64> {
    snapshot.write().await.connection_status = ConnectionStatus::Checking;

    match chain.get_current_slot().await {
        Ok(slot) => {
            let mut state = snapshot.write().await;
            state.current_slot = Some(slot);
            state.connection_status = ConnectionStatus::Connected;
            Ok(slot)
        }
        Err(err) => {
            warn!("Error getting current slot: {err}");
            snapshot.write().await.connection_status = ConnectionStatus::Error;
            Err(err)
        }
    }
}

pub struct SlotRefreshJob {
    chain: Arc<dyn ChainQuery>,
    snapshot: SharedSnapshot,
    interval: Duration,
}

impl SlotRefreshJob {
    pub fn new(chain: Arc<dyn ChainQuery>, snapshot: SharedSnapshot, interval: Duration) -> Self {
        Self {
            chain,
            snapshot,
            interval,
        }
    }
}

#[async_trait]
impl ScheduledJob for SlotRefreshJob {
    fn name(&self) -> &str {
        "slot_refresh"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    // The session reads the slot once at startup.
    fn run_on_start(&self) -> bool {
        false
    }

    async fn run(&self) -> Result<()> {
        refresh_slot(self.chain.as_ref(), &self.snapshot).await.map(|_| ())
    }
}
