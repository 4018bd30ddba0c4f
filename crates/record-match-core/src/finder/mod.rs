//! Bounded retry over an eventually consistent source.
//!
//! The finder evaluates a predicate, and while it is false and attempts
//! remain, runs an `advance` step (next page, wait for a refresh) before
//! evaluating again:
//!
//! ```text
//! Searching ──predicate true──▶ Found
//!     │  ▲
//!     │  └── advance, wait ──┐
//!     └──predicate false/err─┘ (attempts left)
//!     └──bound reached──────────▶ Exhausted
//! ```

mod asynchronous;

use std::convert::Infallible;
use std::fmt::Display;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Finder configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FinderError {
    #[error("max_attempts must be at least 1")]
    InvalidMaxAttempts,
}

pub type FinderResult<T> = Result<T, FinderError>;

/// Attempt bound and wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinderConfig {
    pub max_attempts: u32,
    /// Wait after each `advance`, before the next evaluation
    pub per_attempt_wait: Duration,
}

impl FinderConfig {
    pub fn new(max_attempts: u32, per_attempt_wait: Duration) -> Self {
        Self {
            max_attempts,
            per_attempt_wait,
        }
    }
}

/// Terminal state of a search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FindOutcome {
    /// Predicate held on attempt `attempts`.
    Found { attempts: u32 },
    /// Bound reached; `last_error` is the most recent source error, if any.
    Exhausted {
        attempts: u32,
        last_error: Option<String>,
    },
}

impl FindOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, FindOutcome::Found { .. })
    }

    /// Number of predicate evaluations performed.
    pub fn attempts(&self) -> u32 {
        match self {
            FindOutcome::Found { attempts } => *attempts,
            FindOutcome::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        match self {
            FindOutcome::Found { .. } => None,
            FindOutcome::Exhausted { last_error, .. } => last_error.as_deref(),
        }
    }
}

/// Retry loop with a validated, finite attempt bound.
#[derive(Debug, Clone, Copy)]
pub struct RetryingFinder {
    config: FinderConfig,
}

impl RetryingFinder {
    /// Create a finder. Fails if `max_attempts` is zero.
    pub fn new(config: FinderConfig) -> FinderResult<Self> {
        if config.max_attempts == 0 {
            return Err(FinderError::InvalidMaxAttempts);
        }
        Ok(Self { config })
    }

    /// Evaluate `predicate` until it holds or the bound is reached.
    pub fn find<P, A>(&self, mut predicate: P, mut advance: A) -> bool
    where
        P: FnMut() -> bool,
        A: FnMut(),
    {
        self.try_find(
            || Ok::<_, Infallible>(predicate()),
            || {
                advance();
                Ok(())
            },
        )
        .is_found()
    }

    /// Like [`find`](Self::find), but predicate and advance may fail.
    ///
    /// An error from either counts as an unsuccessful attempt and is kept as
    /// the outcome's `last_error`; it is never propagated.
    pub fn try_find<P, A, E>(&self, mut predicate: P, mut advance: A) -> FindOutcome
    where
        P: FnMut() -> Result<bool, E>,
        A: FnMut() -> Result<(), E>,
        E: Display,
    {
        let max_attempts = self.config.max_attempts;
        let mut last_error: Option<String> = None;

        for attempt in 1..=max_attempts {
            match predicate() {
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

            if let Err(e) = advance() {
                tracing::debug!(attempt, error = %e, "advance failed");
                last_error = Some(e.to_string());
            }
            if !self.config.per_attempt_wait.is_zero() {
                std::thread::sleep(self.config.per_attempt_wait);
            }
        }

        tracing::warn!(attempts = max_attempts, "search exhausted");
        FindOutcome::Exhausted {
            attempts: max_attempts,
            last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finder(max_attempts: u32) -> RetryingFinder {
        RetryingFinder::new(FinderConfig::new(max_attempts, Duration::ZERO)).unwrap()
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = RetryingFinder::new(FinderConfig::new(0, Duration::ZERO)).unwrap_err();
        assert_eq!(err, FinderError::InvalidMaxAttempts);
    }

    #[test]
    fn test_found_first_attempt_without_advance() {
        let mut advances = 0;
        let found = finder(5).find(|| true, || advances += 1);

        assert!(found);
        assert_eq!(advances, 0);
    }

    #[test]
    fn test_advances_k_minus_one_times() {
        for k in 1..=5u32 {
            let mut evaluations = 0u32;
            let mut advances = 0u32;
            let outcome = finder(5).try_find(
                || {
                    evaluations += 1;
                    Ok::<_, Infallible>(evaluations == k)
                },
                || {
                    advances += 1;
                    Ok(())
                },
            );

            assert_eq!(outcome, FindOutcome::Found { attempts: k });
            assert_eq!(advances, k - 1);
        }
    }

    #[test]
    fn test_exhausted_advances_max_minus_one_times() {
        let mut advances = 0;
        let found = finder(4).find(|| false, || advances += 1);

        assert!(!found);
        assert_eq!(advances, 3);
    }

    #[test]
    fn test_single_attempt_never_advances() {
        let mut advances = 0;
        assert!(!finder(1).find(|| false, || advances += 1));
        assert_eq!(advances, 0);
    }

    #[test]
    fn test_errors_are_retried_and_kept() {
        let mut evaluations = 0;
        let outcome = finder(3).try_find(
            || {
                evaluations += 1;
                Err::<bool, _>(format!("read failed #{}", evaluations))
            },
            || Ok(()),
        );

        assert_eq!(evaluations, 3);
        assert_eq!(
            outcome,
            FindOutcome::Exhausted {
                attempts: 3,
                last_error: Some("read failed #3".into()),
            }
        );
    }

    #[test]
    fn test_error_then_success() {
        let mut evaluations = 0;
        let outcome = finder(3).try_find(
            || {
                evaluations += 1;
                if evaluations == 1 {
                    Err("not loaded")
                } else {
                    Ok(true)
                }
            },
            || Ok(()),
        );

        assert_eq!(outcome, FindOutcome::Found { attempts: 2 });
        assert_eq!(outcome.last_error(), None);
    }

    #[test]
    fn test_advance_error_recorded() {
        let outcome = finder(2).try_find(|| Ok(false), || Err("refresh timed out"));

        assert!(!outcome.is_found());
        assert_eq!(outcome.attempts(), 2);
        assert_eq!(outcome.last_error(), Some("refresh timed out"));
    }

    #[test]
    fn test_outcome_serializes_with_state_tag() {
        let json = serde_json::to_value(FindOutcome::Found { attempts: 2 }).unwrap();
        assert_eq!(json["state"], "found");
        assert_eq!(json["attempts"], 2);
    }
}
