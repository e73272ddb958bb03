use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Periodic background work. A failed run is logged and retried on the next tick.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    fn name(&self) -> &str;
    fn interval(&self) -> Duration;
    /// Whether the first run happens as soon as the scheduler starts rather
    /// than one interval later.
    fn run_on_start(&self) -> bool {
        true
    }
    async fn run(&self) -> Result<()>;
}
