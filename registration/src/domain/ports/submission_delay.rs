//! Port for the pause between persisting a submission and finalising it.

use std::time::Duration;

use async_trait::async_trait;

/// Waits out the "submitting" indication before the form is cleared.
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use registration::domain::ports::SubmissionDelay;
/// use std::time::Duration;
///
/// struct NoDelay;
///
/// #[async_trait]
/// impl SubmissionDelay for NoDelay {
///     async fn wait(&self, _duration: Duration) {}
/// }
/// ```
#[async_trait]
pub trait SubmissionDelay: Send + Sync {
    /// Suspend execution for `duration`.
    async fn wait(&self, duration: Duration);
}
