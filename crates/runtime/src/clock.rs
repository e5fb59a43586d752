use std::time::Duration;

use tracing::debug;

/// Wait at least `duration_ms` milliseconds.
pub async fn delay(duration_ms: u64) {
    delay_for(Duration::from_millis(duration_ms)).await;
}

pub async fn delay_for(duration: Duration) {
    debug!(?duration, "sleeping");
    tokio::time::sleep(duration).await;
}
