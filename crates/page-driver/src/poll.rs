//! The shared poll-with-timeout primitive.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

/// Run `predicate` every `interval` until it returns true or `deadline`
/// elapses. Returns false on deadline, never errors. The predicate is
/// always checked at least once, even with a zero deadline.
pub async fn poll_until<F, Fut>(interval: Duration, deadline: Duration, mut predicate: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let started = Instant::now();
    loop {
        if predicate().await {
            return true;
        }
        if started.elapsed() + interval >= deadline {
            return false;
        }
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_once_predicate_turns_true() {
        let calls = AtomicU32::new(0);
        let ok = poll_until(Duration::from_millis(5), Duration::from_millis(500), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { n >= 2 }
        })
        .await;
        assert!(ok);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_returns_false_on_deadline() {
        let started = Instant::now();
        let ok = poll_until(Duration::from_millis(5), Duration::from_millis(30), || async {
            false
        })
        .await;
        assert!(!ok);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_zero_deadline_still_checks_once() {
        let calls = AtomicU32::new(0);
        let ok = poll_until(Duration::from_millis(5), Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { true }
        })
        .await;
        assert!(ok);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
