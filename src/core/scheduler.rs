use crate::domain::ports::ImageSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Regenerates the image in the background so the first visitor does not pay
/// for the refresh.
pub struct PeriodicRefresher {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl PeriodicRefresher {
    pub fn start(source: Arc<dyn ImageSource>, period: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!("⏱️ Periodic regeneration every {:?}", period);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        match source.current_image().await {
                            Ok(image) => tracing::debug!("Periodic render ok: {}", image.public_path),
                            Err(e) => tracing::warn!("Periodic render failed: {}", e),
                        }
                    }
                }
            }
            tracing::debug!("Periodic regeneration stopped");
        });

        Self {
            shutdown_tx: Some(shutdown_tx),
            handle,
        }
    }

    /// Stops after the in-flight generation, if any, has finished.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.handle).await;
    }
}
