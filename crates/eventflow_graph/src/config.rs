// SPDX-License-Identifier: MIT OR Apache-2.0
//! Controller runtime settings.

use serde::{Deserialize, Serialize};

/// Default seconds advanced per tick (60 Hz)
pub const DEFAULT_FIXED_STEP: f32 = 1.0 / 60.0;

/// What a tick does when a clip hook fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HookFailurePolicy {
    /// Log the failure, record it in the tick report and keep going
    #[default]
    Isolate,
    /// Stop the tick at the failing hook and return an error
    Abort,
}

/// Runtime settings of a controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Seconds added to the controller clock by [`tick`](crate::Controller::tick)
    pub fixed_step: f32,
    /// Handling of failing clip hooks
    pub hook_failure_policy: HookFailurePolicy,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            fixed_step: DEFAULT_FIXED_STEP,
            hook_failure_policy: HookFailurePolicy::Isolate,
        }
    }
}

impl ControllerConfig {
    /// Set the fixed step
    pub fn with_fixed_step(mut self, seconds: f32) -> Self {
        self.fixed_step = seconds;
        self
    }

    /// Set the hook failure policy
    pub fn with_policy(mut self, policy: HookFailurePolicy) -> Self {
        self.hook_failure_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: ControllerConfig = ron::from_str("(hook_failure_policy: Abort)").unwrap();
        assert_eq!(config.fixed_step, DEFAULT_FIXED_STEP);
        assert_eq!(config.hook_failure_policy, HookFailurePolicy::Abort);
    }
}
