//! Machine Configuration
//!
//! Everything a machine needs is fixed at configuration time: the regular
//! reel palettes, the bonus reel palette, the spin timing, the evaluation
//! gating policy and the RNG seed. Configurations are plain serde values,
//! so they load from JSON or embed directly in code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::reel::ReelError;
use crate::DEFAULT_SPIN_TICKS;

/// When the match check runs relative to reel completions.
///
/// The reference behavior re-evaluated on every individual completion,
/// which can declare a match from symbols left over from the previous spin.
/// Both behaviors are first-class here so the choice is explicit per
/// machine rather than an accident of wiring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalPolicy {
    /// Evaluate once per generation, after every reel has landed.
    #[default]
    AfterAllReels,
    /// Evaluate on each completion with whatever symbols are currently set,
    /// stale values and redundant firings included.
    EveryCompletion,
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Machine configured without any regular reels.
    #[error("machine must have at least one regular reel")]
    NoReels,

    /// A regular reel has no symbols.
    #[error("regular reel {index} has an empty symbol palette")]
    EmptyPalette {
        /// Index of the offending reel.
        index: usize,
    },

    /// The bonus reel has no symbols.
    #[error("bonus reel has an empty symbol palette")]
    EmptyBonusPalette,

    /// Spin duration of zero ticks.
    #[error("spin duration must be at least one tick")]
    ZeroSpinDuration,

    /// Reel construction failure.
    #[error(transparent)]
    Reel(#[from] ReelError),
}

/// Full machine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Machine label; feeds seed derivation when `rng_seed` is absent.
    pub label: String,

    /// Symbol palette per regular reel, by name.
    pub reels: Vec<Vec<String>>,

    /// Symbol palette of the bonus reel.
    pub bonus_reel: Vec<String>,

    /// Ticks a spin lasts before the first reel stops. Presentation
    /// pacing only; outcomes never depend on it.
    pub spin_duration_ticks: u32,

    /// Extra ticks between consecutive reel stops (reels stop left to
    /// right, bonus last). Zero stops everything on the same tick.
    pub stop_stagger_ticks: u32,

    /// Match evaluation gating policy.
    pub evaluation: EvalPolicy,

    /// Explicit RNG seed; derived from `label` when absent.
    pub rng_seed: Option<u64>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        let palette = vec![
            "Cherry".to_string(),
            "Lemon".to_string(),
            "Bell".to_string(),
        ];
        Self {
            label: "demo-machine".to_string(),
            reels: vec![palette.clone(); 3],
            bonus_reel: palette,
            spin_duration_ticks: DEFAULT_SPIN_TICKS,
            stop_stagger_ticks: 0,
            evaluation: EvalPolicy::default(),
            rng_seed: None,
        }
    }
}

impl MachineConfig {
    /// Check the configuration invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reels.is_empty() {
            return Err(ConfigError::NoReels);
        }
        if let Some(index) = self.reels.iter().position(|palette| palette.is_empty()) {
            return Err(ConfigError::EmptyPalette { index });
        }
        if self.bonus_reel.is_empty() {
            return Err(ConfigError::EmptyBonusPalette);
        }
        if self.spin_duration_ticks == 0 {
            return Err(ConfigError::ZeroSpinDuration);
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MachineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reels.len(), 3);
        assert_eq!(config.evaluation, EvalPolicy::AfterAllReels);
    }

    #[test]
    fn test_no_reels_rejected() {
        let config = MachineConfig {
            reels: Vec::new(),
            ..MachineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoReels));
    }

    #[test]
    fn test_empty_palette_rejected() {
        let mut config = MachineConfig::default();
        config.reels[1].clear();
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyPalette { index: 1 })
        );
    }

    #[test]
    fn test_empty_bonus_palette_rejected() {
        let config = MachineConfig {
            bonus_reel: Vec::new(),
            ..MachineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyBonusPalette));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let config = MachineConfig {
            spin_duration_ticks: 0,
            ..MachineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSpinDuration));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "label": "floor-7",
            "reels": [["Cherry", "Bell"], ["Cherry", "Bell"]],
            "bonus_reel": ["Bell"],
            "spin_duration_ticks": 30,
            "evaluation": "EveryCompletion",
            "rng_seed": 99
        }"#;

        let config = MachineConfig::from_json(json).unwrap();
        assert_eq!(config.label, "floor-7");
        assert_eq!(config.reels.len(), 2);
        assert_eq!(config.evaluation, EvalPolicy::EveryCompletion);
        assert_eq!(config.rng_seed, Some(99));
        // Unspecified fields fall back to defaults
        assert_eq!(config.stop_stagger_ticks, 0);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(MachineConfig::from_json("not json").is_err());

        let invalid = r#"{"reels": []}"#;
        assert!(MachineConfig::from_json(invalid).is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = MachineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back = MachineConfig::from_json(&json).unwrap();
        assert_eq!(config, back);
    }
}
