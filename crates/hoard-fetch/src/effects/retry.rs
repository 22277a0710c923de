use hoard_source::Source;
use tokio_util::sync::CancellationToken;

use crate::core::retry_delay;
use crate::data::{FileTask, Reporter, RetryPolicy, TransferState};
use crate::error::{FetchError, Result};

use super::transfer::transfer;

/// Run [`transfer`] until it succeeds, fails for good, or the budget runs
/// out. Returns the number of attempts used.
///
/// All attempts share one staging file, so a retry resumes where the last
/// attempt stopped. Cancellation ends the loop at once, whether it fires
/// mid-transfer or during the pause between attempts, and does not count
/// as an attempt.
pub async fn fetch_with_retry<S: Source>(
    source: &S,
    task: &FileTask,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    progress: &Reporter,
) -> Result<u32> {
    let attempts = policy.attempts.max(1);
    let mut state = TransferState::new(&task.destination);

    loop {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        state.attempt += 1;

        let err = match transfer(source, task, &mut state, cancel, progress).await {
            Ok(()) => return Ok(state.attempt),
            Err(err) if err.is_cancelled() || !err.is_retryable() => return Err(err),
            Err(err) => err,
        };
        if state.attempt >= attempts {
            return Err(FetchError::AttemptsExhausted {
                attempts,
                last: Box::new(err),
            });
        }

        let delay = retry_delay(state.attempt - 1, policy.delay, policy.backoff);
        tracing::warn!(
            locator = %task.locator,
            attempt = state.attempt,
            attempts,
            ?delay,
            error = %err,
            "attempt failed, retrying"
        );
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
