//! Retry logic for index reads against the store
//!
//! A multiplexed connection can drop mid-command while the connection manager
//! reconnects in the background. Index reads are idempotent, so transient
//! connectivity errors are retried a few times before the request gives up.

use std::future::Future;
use std::time::Duration;

use crate::error::is_connectivity_error;
use crate::Error;

/// Maximum number of retry attempts for store reads
pub const MAX_RETRIES: u32 = 3;

/// Check if a store error is transient and should be retried
///
/// This includes:
/// - I/O errors on the socket
/// - Connections dropped by the server or a proxy
/// - Response timeouts
/// - Refused connections while the manager is reconnecting
pub fn is_transient_error(err: &Error) -> bool {
    match err {
        Error::Redis(e) => is_connectivity_error(e),
        _ => false,
    }
}

/// Calculate exponential backoff delay for retry attempt
///
/// Base delay: 50ms, doubling each attempt
/// Delays: 50ms, 100ms, 200ms
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(50 * 2u64.pow(attempt.saturating_sub(1)))
}

/// Execute a read with exponential backoff retry for transient errors
pub async fn read_with_retry<F, Fut, T>(operation: F) -> crate::Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = crate::Result<T>>,
{
    let mut attempts = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if is_transient_error(&e) && attempts < MAX_RETRIES => {
                attempts += 1;
                let delay = backoff_delay(attempts);
                tracing::debug!(
                    error = %e,
                    attempt = attempts,
                    max_retries = MAX_RETRIES,
                    delay_ms = delay.as_millis(),
                    "Store transient error, retrying read"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn dropped() -> Error {
        Error::Redis(redis::RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset",
        )))
    }

    #[test]
    fn test_backoff_delay() {
        assert_eq!(backoff_delay(1), Duration::from_millis(50));
        assert_eq!(backoff_delay(2), Duration::from_millis(100));
        assert_eq!(backoff_delay(3), Duration::from_millis(200));
    }

    #[test]
    fn test_transient_classification() {
        assert!(is_transient_error(&dropped()));
        assert!(!is_transient_error(&Error::Other("WRONGTYPE".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = read_with_retry(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(dropped())
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: crate::Result<()> = read_with_retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(dropped()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_RETRIES + 1);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let calls = AtomicU32::new(0);
        let result: crate::Result<()> = read_with_retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::Other("WRONGTYPE".into())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
