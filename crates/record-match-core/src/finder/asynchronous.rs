//! Async variant of the retry loop.
//!
//! Each `advance` future is awaited to completion before the next predicate
//! future is created, so evaluations never overlap.

use std::convert::Infallible;
use std::fmt::Display;
use std::future::Future;

use super::{FindOutcome, RetryingFinder};

impl RetryingFinder {
    /// Async form of [`find`](RetryingFinder::find).
    pub async fn find_async<P, PF, A, AF>(&self, mut predicate: P, mut advance: A) -> bool
    where
        P: FnMut() -> PF,
        PF: Future<Output = bool>,
        A: FnMut() -> AF,
        AF: Future<Output = ()>,
    {
        self.try_find_async(
            || {
                let evaluation = predicate();
                async move { Ok::<_, Infallible>(evaluation.await) }
            },
            || {
                let step = advance();
                async move {
                    step.await;
                    Ok(())
                }
            },
        )
        .await
        .is_found()
    }

    /// Async form of [`try_find`](RetryingFinder::try_find).
    pub async fn try_find_async<P, PF, A, AF, E>(
        &self,
        mut predicate: P,
        mut advance: A,
    ) -> FindOutcome
    where
        P: FnMut() -> PF,
        PF: Future<Output = Result<bool, E>>,
        A: FnMut() -> AF,
        AF: Future<Output = Result<(), E>>,
        E: Display,
    {
        let max_attempts = self.config.max_attempts;
        let mut last_error: Option<String> = None;

        for attempt in 1..=max_attempts {
            match predicate().await {
                Ok(true) => {
                    tracing::debug!(attempt, "predicate satisfied");
                    return FindOutcome::Found { attempts: attempt };
                }
                Ok(false) => {
                    tracing::debug!(attempt, max_attempts, "predicate not yet satisfied");
                }
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "predicate failed to read source");
                    last_error = Some(e.to_string());
                }
            }

            if attempt == max_attempts {
                break;
            }

            if let Err(e) = advance().await {
                tracing::debug!(attempt, error = %e, "advance failed");
                last_error = Some(e.to_string());
            }
            self.wait().await;
        }

        tracing::warn!(attempts = max_attempts, "search exhausted");
        FindOutcome::Exhausted {
            attempts: max_attempts,
            last_error,
        }
    }

    async fn wait(&self) {
        if !self.config.per_attempt_wait.is_zero() {
            tokio::time::sleep(self.config.per_attempt_wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::super::FinderConfig;
    use super::*;

    fn finder(max_attempts: u32) -> RetryingFinder {
        RetryingFinder::new(FinderConfig::new(max_attempts, Duration::ZERO)).unwrap()
    }

    #[tokio::test]
    async fn test_async_found_on_third_attempt() {
        let evaluations = Cell::new(0u32);
        let advances = Cell::new(0u32);

        let found = finder(5)
            .find_async(
                || {
                    evaluations.set(evaluations.get() + 1);
                    let ready = evaluations.get() == 3;
                    async move { ready }
                },
                || {
                    advances.set(advances.get() + 1);
                    async {}
                },
            )
            .await;

        assert!(found);
        assert_eq!(advances.get(), 2);
    }

    #[tokio::test]
    async fn test_async_exhausted_keeps_last_error() {
        let advances = Cell::new(0u32);

        let outcome = finder(3)
            .try_find_async(
                || async { Err::<bool, _>("listing not loaded") },
                || {
                    advances.set(advances.get() + 1);
                    async { Ok(()) }
                },
            )
            .await;

        assert_eq!(advances.get(), 2);
        assert_eq!(outcome.attempts(), 3);
        assert_eq!(outcome.last_error(), Some("listing not loaded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_waits_between_attempts() {
        let config = FinderConfig::new(3, Duration::from_millis(100));
        let finder = RetryingFinder::new(config).unwrap();
        let start = tokio::time::Instant::now();

        let found = finder.find_async(|| async { false }, || async {}).await;

        assert!(!found);
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_async_advance_completes_before_next_evaluation() {
        let refreshed = &Cell::new(false);
        let evaluations = Cell::new(0u32);

        let found = finder(4)
            .find_async(
                || {
                    evaluations.set(evaluations.get() + 1);
                    if evaluations.get() > 1 {
                        assert!(refreshed.get(), "evaluated before advance finished");
                    }
                    refreshed.set(false);
                    let ready = evaluations.get() == 4;
                    async move { ready }
                },
                move || async move {
                    tokio::task::yield_now().await;
                    refreshed.set(true);
                },
            )
            .await;

        assert!(found);
        assert_eq!(evaluations.get(), 4);
    }
}
