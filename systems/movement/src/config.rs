//! Tunables shared by every movement controller in a run.

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_ANIMATION_STEP: f32 = 1.0;
const DEFAULT_REROUTE_AFTER: u32 = 20;
const DEFAULT_SIDESTEP_AFTER: u32 = 40;

/// Movement tunables loaded from scenario files or constructed in code.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MovementConfig {
    /// Distance in tiles the visual position covers per tick.
    pub animation_step: f32,
    /// Consecutive blocked ticks after which the path is recomputed once.
    pub reroute_after: u32,
    /// Consecutive blocked ticks from which the agent tries to step aside.
    pub sidestep_after: u32,
}

impl MovementConfig {
    /// Checks that the tunables describe a movement model that can progress.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.animation_step.is_finite() || self.animation_step <= 0.0 {
            return Err(ConfigError::AnimationStep {
                step: self.animation_step,
            });
        }
        if self.reroute_after == 0 {
            return Err(ConfigError::ZeroRerouteThreshold);
        }
        if self.sidestep_after <= self.reroute_after {
            return Err(ConfigError::SidestepBeforeReroute {
                reroute_after: self.reroute_after,
                sidestep_after: self.sidestep_after,
            });
        }
        Ok(())
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            animation_step: DEFAULT_ANIMATION_STEP,
            reroute_after: DEFAULT_REROUTE_AFTER,
            sidestep_after: DEFAULT_SIDESTEP_AFTER,
        }
    }
}

/// Reasons a [`MovementConfig`] is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The visual position would never converge.
    #[error("animation step must be a positive number of tiles, got {step}")]
    AnimationStep {
        /// Rejected step.
        step: f32,
    },
    /// Rerouting on the very first blocked tick leaves no room to wait.
    #[error("reroute threshold must be at least one blocked tick")]
    ZeroRerouteThreshold,
    /// Sidestepping has to start strictly after the reroute.
    #[error("sidestep threshold {sidestep_after} must exceed reroute threshold {reroute_after}")]
    SidestepBeforeReroute {
        /// Configured reroute threshold.
        reroute_after: u32,
        /// Configured sidestep threshold.
        sidestep_after: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MovementConfig::default();
        assert_eq!(config.animation_step, 1.0);
        assert_eq!(config.reroute_after, 20);
        assert_eq!(config.sidestep_after, 40);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_degenerate_steps() {
        for step in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            let config = MovementConfig {
                animation_step: step,
                ..MovementConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::AnimationStep { .. })
            ));
        }
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let config = MovementConfig {
            reroute_after: 10,
            sidestep_after: 10,
            ..MovementConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SidestepBeforeReroute {
                reroute_after: 10,
                sidestep_after: 10,
            })
        );

        let zero = MovementConfig {
            reroute_after: 0,
            ..MovementConfig::default()
        };
        assert_eq!(zero.validate(), Err(ConfigError::ZeroRerouteThreshold));
    }
}
