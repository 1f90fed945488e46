use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use newsboard_api::SessionStore;

/// Background task that prunes expired sessions on an interval.
pub async fn run_cleanup_loop(sessions: Arc<dyn SessionStore>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        match cleanup_expired(&sessions).await {
            Ok(count) => {
                if count > 0 {
                    info!("Cleanup: pruned {} expired sessions", count);
                }
            }
            Err(e) => warn!("Cleanup error: {}", e),
        }
    }
}

/// One cleanup pass. Returns how many sessions were removed.
pub async fn cleanup_expired(sessions: &Arc<dyn SessionStore>) -> anyhow::Result<usize> {
    let store = sessions.clone();
    tokio::task::spawn_blocking(move || store.purge_expired())
        .await
        .map_err(|e| anyhow::anyhow!("cleanup task failed: {}", e))?
}
