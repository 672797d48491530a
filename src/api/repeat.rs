//! Fixed-delay polling with a time budget.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{PreingestError, Result};

/// Call `attempt` until it yields a value or `budget` runs out.
///
/// The delay between attempts is fixed rather than backing off, so elapsed
/// time shown to the user keeps moving smoothly. Errors from a single
/// attempt are logged and count as "no result yet"; whoever raised them is
/// expected to have reported them already.
pub async fn repeat_until_result<T, F, Fut>(
    mut attempt: F,
    budget: Duration,
    delay: Duration,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let start = Instant::now();
    let deadline = start + budget;
    let mut attempts: u32 = 0;

    while Instant::now() < deadline {
        if attempts > 0 {
            sleep(delay).await;
        }
        attempts += 1;
        match attempt().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) => debug!(attempts, error = %e, "poll attempt failed"),
        }
    }

    Err(PreingestError::Timeout {
        attempts,
        minutes: (start.elapsed().as_secs() / 60) as i64,
    })
}
