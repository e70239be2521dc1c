//! Tokio-backed [`Pacer`].

use std::time::Duration;

use async_trait::async_trait;
use research_mate_core::surface::Pacer;

/// Sleeps on the tokio timer. A zero delay still yields to the scheduler.
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        if duration.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(duration).await;
        }
    }
}
