use std::{sync::Arc, time::Duration};

use {
    tokio::{task::JoinHandle, time::MissedTickBehavior},
    tracing::{debug, info, warn},
};

use crate::state::GatewayState;

/// Spawn a loop that flushes every buffered session once per `period`.
///
/// The first sweep runs one full period after startup. A sweep that overlaps a
/// client-triggered flush of the same session may produce a duplicate export.
pub fn spawn_sweeper(state: Arc<GatewayState>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await;
        loop {
            interval.tick().await;
            run_sweep(&state).await;
        }
    })
}

async fn run_sweep(state: &GatewayState) {
    match state.merger.sweep().await {
        Ok(report) if report.exported.is_empty() && report.failed.is_empty() => {
            debug!("sweep: nothing buffered");
        },
        Ok(report) => info!(
            exported = report.exported.len(),
            failed = report.failed.len(),
            "sweep complete"
        ),
        Err(e) => warn!(error = %e, "sweep: failed to list buffered sessions"),
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        chatlog_blob::{BlobStore, MemoryStore},
        chatlog_sessions::{BufferRequest, StorageLayout},
    };

    #[tokio::test(start_paused = true)]
    async fn sweeps_after_each_period() {
        let store = Arc::new(MemoryStore::new());
        let state = GatewayState::new(store.clone(), StorageLayout::default());
        state
            .writer
            .append(BufferRequest::new("user", "hi").with_session("s"))
            .await
            .unwrap();

        let handle = spawn_sweeper(Arc::clone(&state), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(store.list("chat-exports/buffer/").await.unwrap().len(), 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(store.list("chat-exports/buffer/").await.unwrap().is_empty());
        assert_eq!(store.list("chat-exports/exports/s/").await.unwrap().len(), 1);

        handle.abort();
    }
}
