use std::time::Duration;

use crate::data::Backoff;

/// Delay before retry number `retry` (0-based: 0 is the pause before the
/// second attempt).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use hoard_fetch::{Backoff, retry_delay};
///
/// let base = Duration::from_millis(100);
/// assert_eq!(retry_delay(2, base, Backoff::Fixed), base);
/// assert_eq!(retry_delay(0, base, Backoff::Exponential), Duration::from_millis(100));
/// assert_eq!(retry_delay(2, base, Backoff::Exponential), Duration::from_millis(400));
/// ```
pub fn retry_delay(retry: u32, base: Duration, backoff: Backoff) -> Duration {
    match backoff {
        Backoff::Fixed => base,
        Backoff::Exponential => base.saturating_mul(2_u32.saturating_pow(retry)),
    }
}
