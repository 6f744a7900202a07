//! Run-scoped cancellation and deadline

use crate::Result;
use core::num::NonZeroUsize;
use core::time::Duration;
use ohno::app_err;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

// Stand-in deadline for timeouts too large to add to the current instant.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// State shared by every component for the duration of one invocation.
///
/// Cloning is cheap and every clone observes the same cancellation signal.
#[derive(Debug, Clone)]
pub struct RunContext {
    cancel: CancellationToken,
    deadline: Instant,
    cardinality_concurrency: Option<NonZeroUsize>,
}

impl RunContext {
    /// Create a context whose deadline is `timeout` from now.
    ///
    /// A `cardinality_concurrency` of zero leaves cardinality fan-out unbounded.
    #[must_use]
    pub fn new(timeout: Duration, cardinality_concurrency: usize) -> Self {
        let now = Instant::now();
        Self {
            cancel: CancellationToken::new(),
            deadline: now.checked_add(timeout.min(FAR_FUTURE)).unwrap_or(now),
            cardinality_concurrency: NonZeroUsize::new(cardinality_concurrency),
        }
    }

    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    #[must_use]
    pub const fn cardinality_concurrency(&self) -> Option<NonZeroUsize> {
        self.cardinality_concurrency
    }

    /// Signal cancellation to every holder of this context.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the run was cancelled or its deadline has passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Drive `fut` to completion unless the run is cancelled or times out first.
    ///
    /// # Errors
    ///
    /// Returns the error of `fut`, or an error naming `what` on cancellation or deadline expiry.
    pub async fn guard<T>(&self, what: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(app_err!("{what} was cancelled")),
            outcome = tokio::time::timeout_at(self.deadline, fut) => match outcome {
                Ok(result) => result,
                Err(elapsed) => Err(app_err!("{what} did not complete before the run deadline: {elapsed}")),
            },
        }
    }
}
