//! Sandbox configuration.

use std::time::{Duration, TryFromFloatSecsError};

pub const DEFAULT_MAX_CALL_DEPTH: usize = 400;

/// Worker stack size. Deep script recursion is bounded by `max_call_depth`, and
/// this leaves room for it with the tree-walking evaluator.
pub const DEFAULT_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Limits applied to every sandbox invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxConfig {
    /// Wall-clock deadline. `None` waits for the script however long it takes.
    pub timeout: Option<Duration>,
    /// Deepest nesting of script function calls.
    pub max_call_depth: usize,
    /// Stack size of the worker thread, in bytes.
    pub stack_size: usize,
}

impl SandboxConfig {
    pub fn new() -> Self {
        SandboxConfig {
            timeout: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fails when `secs` is negative, not finite, or too large for a `Duration`.
    pub fn with_timeout_secs(self, secs: f64) -> Result<Self, TryFromFloatSecsError> {
        Ok(self.with_timeout(Duration::try_from_secs_f64(secs)?))
    }

    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = bytes;
        self
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded() {
        let config = SandboxConfig::default();
        assert_eq!(config.timeout, None);
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    }

    #[test]
    fn test_builder_setters() {
        let config = SandboxConfig::new()
            .with_timeout_secs(1.5)
            .unwrap()
            .with_max_call_depth(10)
            .with_stack_size(8 * 1024 * 1024);
        assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.max_call_depth, 10);
        assert_eq!(config.stack_size, 8 * 1024 * 1024);
        assert_eq!(config.without_timeout().timeout, None);
    }

    #[test]
    fn test_unrepresentable_timeout_is_rejected() {
        assert!(SandboxConfig::new().with_timeout_secs(1e30).is_err());
        assert!(SandboxConfig::new().with_timeout_secs(-1.0).is_err());
        assert!(SandboxConfig::new().with_timeout_secs(f64::NAN).is_err());
        assert!(SandboxConfig::new().with_timeout_secs(f64::INFINITY).is_err());
    }
}
