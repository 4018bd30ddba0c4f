//! Retry configuration.
//!
//! Resolved once at start-up (from JSON or the environment) and passed into
//! the verifier; library code never reads the environment mid-verification.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::finder::{FinderConfig, RetryingFinder};
use crate::verify::PatientVerifier;
use crate::{MatchError, MatchResult};

pub const ENV_MAX_ATTEMPTS: &str = "RECORD_MATCH_MAX_ATTEMPTS";
pub const ENV_ATTEMPT_WAIT_MS: &str = "RECORD_MATCH_ATTEMPT_WAIT_MS";

const DEFAULT_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_ATTEMPT_WAIT_MS: u64 = 250;

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_attempt_wait_ms() -> u64 {
    DEFAULT_ATTEMPT_WAIT_MS
}

/// Verification settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_attempt_wait_ms")]
    pub attempt_wait_ms: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_wait_ms: DEFAULT_ATTEMPT_WAIT_MS,
        }
    }
}

impl MatchConfig {
    /// Parse from JSON; omitted keys take their defaults.
    pub fn from_json(json: &str) -> MatchResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read overrides from `RECORD_MATCH_*` environment variables.
    pub fn from_env() -> MatchResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, test map).
    pub fn from_lookup<F>(lookup: F) -> MatchResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_MAX_ATTEMPTS) {
            config.max_attempts = parse_var(ENV_MAX_ATTEMPTS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_ATTEMPT_WAIT_MS) {
            config.attempt_wait_ms = parse_var(ENV_ATTEMPT_WAIT_MS, &raw)?;
        }
        Ok(config)
    }

    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::new(self.max_attempts, Duration::from_millis(self.attempt_wait_ms))
    }

    /// Validated finder for this configuration.
    pub fn finder(&self) -> MatchResult<RetryingFinder> {
        Ok(RetryingFinder::new(self.finder_config())?)
    }

    pub fn verifier(&self) -> MatchResult<PatientVerifier> {
        Ok(PatientVerifier::new(self.finder()?))
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> MatchResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| {
            MatchError::InvalidInput(format!("{} is not a valid number: {:?}", key, raw))
        })
}
