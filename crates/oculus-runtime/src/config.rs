#![forbid(unsafe_code)]

//! Registry configuration.
//!
//! The only tunable today is how the registry treats unwatch requests for a
//! target it has never seen. The default matches the lenient behavior of
//! observation layers that lazily create state on lookup: nothing to remove,
//! nothing to report.
//!
//! # Environment
//!
//! | Variable | Values | Effect |
//! |----------|--------|--------|
//! | `OCULUS_STRICT_TARGETS` | `1`, `true`, `yes`, `on` | [`UnknownTargetPolicy::Error`] |

/// Environment variable consulted by [`RegistryConfig::from_env`].
pub const STRICT_TARGETS_ENV: &str = "OCULUS_STRICT_TARGETS";

/// What to do when an unwatch names a target with no registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownTargetPolicy {
    /// Treat as a no-op and return an empty result.
    #[default]
    Ignore,
    /// Return [`WatchError::UnknownTarget`](crate::error::WatchError::UnknownTarget).
    Error,
}

/// Configuration for a [`Registry`](crate::reactive::Registry).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Policy for unwatch calls on untracked targets.
    pub unknown_target: UnknownTargetPolicy,
}

impl RegistryConfig {
    /// Create the default (lenient) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration that rejects unwatch calls on untracked targets.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            unknown_target: UnknownTargetPolicy::Error,
        }
    }

    /// Set the unknown-target policy.
    #[must_use]
    pub fn with_unknown_target(mut self, policy: UnknownTargetPolicy) -> Self {
        self.unknown_target = policy;
        self
    }

    /// Default configuration with overrides read from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(STRICT_TARGETS_ENV).ok().as_deref())
    }

    fn from_env_value(strict: Option<&str>) -> Self {
        let mut config = Self::default();
        if strict.is_some_and(env_flag) {
            config.unknown_target = UnknownTargetPolicy::Error;
        }
        config
    }
}

#[inline]
fn env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
