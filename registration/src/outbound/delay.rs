//! Tokio-backed submission delay.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::SubmissionDelay;

/// Sleeps on the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSubmissionDelay;

#[async_trait]
impl SubmissionDelay for TokioSubmissionDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
