// crates/wordlink-game/src/difficulty.rs
//
// Adaptive difficulty for pair selection.
//
// A single scalar, the lower edge of the similarity band used to pick new
// start/target pairs, nudged by fixed deltas on player events and clamped
// to [min_possible, max_possible - band_width].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use wordlink_core::error::WordlinkError;

use crate::search::Band;

fn default_initial_min_threshold() -> f64 {
    0.0
}

fn default_band_width() -> f64 {
    0.1
}

fn default_min_possible() -> f64 {
    -0.2
}

fn default_max_possible() -> f64 {
    0.3
}

fn default_hint_delta() -> f64 {
    -0.01
}

fn default_reject_delta() -> f64 {
    -0.005
}

fn default_abandon_delta() -> f64 {
    -0.02
}

fn default_completion_reward() -> f64 {
    0.03
}

/// Tuning for the difficulty controller (the `[difficulty]` config section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    #[serde(default = "default_initial_min_threshold")]
    pub initial_min_threshold: f64,
    /// Width of the pair band above the minimum.
    #[serde(default = "default_band_width")]
    pub band_width: f64,
    #[serde(default = "default_min_possible")]
    pub min_possible: f64,
    #[serde(default = "default_max_possible")]
    pub max_possible: f64,
    #[serde(default = "default_hint_delta")]
    pub hint_delta: f64,
    #[serde(default = "default_reject_delta")]
    pub reject_delta: f64,
    /// Applied when a new game is requested before the current one is done.
    #[serde(default = "default_abandon_delta")]
    pub abandon_delta: f64,
    #[serde(default = "default_completion_reward")]
    pub completion_reward: f64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            initial_min_threshold: default_initial_min_threshold(),
            band_width: default_band_width(),
            min_possible: default_min_possible(),
            max_possible: default_max_possible(),
            hint_delta: default_hint_delta(),
            reject_delta: default_reject_delta(),
            abandon_delta: default_abandon_delta(),
            completion_reward: default_completion_reward(),
        }
    }
}

impl DifficultyConfig {
    /// Check that every value is finite and the clamp range is non-empty.
    pub fn validate(&self) -> Result<(), WordlinkError> {
        let fields = [
            ("initial_min_threshold", self.initial_min_threshold),
            ("band_width", self.band_width),
            ("min_possible", self.min_possible),
            ("max_possible", self.max_possible),
            ("hint_delta", self.hint_delta),
            ("reject_delta", self.reject_delta),
            ("abandon_delta", self.abandon_delta),
            ("completion_reward", self.completion_reward),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(WordlinkError::Config(format!(
                "difficulty {} must be finite (got {})",
                name, value
            )));
        }
        if self.band_width <= 0.0 {
            return Err(WordlinkError::Config(format!(
                "difficulty band_width must be positive (got {})",
                self.band_width
            )));
        }
        if self.max_possible - self.band_width < self.min_possible {
            return Err(WordlinkError::Config(format!(
                "difficulty range [{}, {}] is narrower than band_width {}",
                self.min_possible, self.max_possible, self.band_width
            )));
        }
        Ok(())
    }

    fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min_possible, self.max_possible - self.band_width)
    }

    /// Band at the starting difficulty, before any player feedback.
    pub fn initial_band(&self) -> Band {
        let min = self.clamp(self.initial_min_threshold);
        Band::new(min as f32, (min + self.band_width) as f32)
    }
}

/// Difficulty feedback loop.
///
/// Shareable across tasks; concurrent adjustments never lose updates.
#[derive(Debug)]
pub struct DifficultyController {
    config: DifficultyConfig,
    /// `f64` bits of the current minimum threshold.
    min_bits: AtomicU64,
}

impl DifficultyController {
    /// Build a controller. Fails if the config's clamp range is empty.
    pub fn new(config: DifficultyConfig) -> Result<Self, WordlinkError> {
        config.validate()?;
        let initial = config.clamp(config.initial_min_threshold);
        Ok(Self {
            config,
            min_bits: AtomicU64::new(initial.to_bits()),
        })
    }

    pub fn config(&self) -> &DifficultyConfig {
        &self.config
    }

    /// Current lower edge of the pair band.
    pub fn min_threshold(&self) -> f64 {
        f64::from_bits(self.min_bits.load(Ordering::SeqCst))
    }

    /// Current upper edge of the pair band.
    pub fn max_threshold(&self) -> f64 {
        self.min_threshold() + self.config.band_width
    }

    /// Band to hand to pair search.
    pub fn band(&self) -> Band {
        Band::new(self.min_threshold() as f32, self.max_threshold() as f32)
    }

    /// Shift the minimum threshold by `delta`, clamped. Returns the new value.
    pub fn adjust(&self, delta: f64) -> f64 {
        let mut updated = self.min_threshold();
        // The closure always returns Some, so this never fails.
        let _ = self
            .min_bits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |bits| {
                updated = self.config.clamp(f64::from_bits(bits) + delta);
                Some(updated.to_bits())
            });
        tracing::info!(
            "Difficulty adjusted by {:+.3}. New min threshold: {:.3}",
            delta,
            updated
        );
        updated
    }

    pub fn on_hint_used(&self) -> f64 {
        self.adjust(self.config.hint_delta)
    }

    pub fn on_word_rejected(&self) -> f64 {
        self.adjust(self.config.reject_delta)
    }

    pub fn on_new_game_without_completion(&self) -> f64 {
        self.adjust(self.config.abandon_delta)
    }

    pub fn on_game_completed(&self) -> f64 {
        self.adjust(self.config.completion_reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_initial_band() {
        let controller = DifficultyController::new(DifficultyConfig::default()).unwrap();
        assert!(approx(controller.min_threshold(), 0.0));
        assert!(approx(controller.max_threshold(), 0.1));
        let band = controller.band();
        assert!((band.max - band.min - 0.1).abs() < 1e-6);
        assert_eq!(band, controller.config().initial_band());

        controller.on_hint_used();
        assert_ne!(controller.band(), controller.config().initial_band());
    }

    #[test]
    fn test_triggers_apply_configured_deltas() {
        let controller = DifficultyController::new(DifficultyConfig::default()).unwrap();
        assert!(approx(controller.on_hint_used(), -0.01));
        assert!(approx(controller.on_word_rejected(), -0.015));
        assert!(approx(controller.on_new_game_without_completion(), -0.035));
        assert!(approx(controller.on_game_completed(), -0.005));
    }

    #[test]
    fn test_clamps_at_min_possible() {
        let controller = DifficultyController::new(DifficultyConfig::default()).unwrap();
        for _ in 0..1000 {
            controller.on_word_rejected();
        }
        assert!(approx(controller.min_threshold(), -0.2));
    }

    #[test]
    fn test_clamps_below_max_possible() {
        let controller = DifficultyController::new(DifficultyConfig::default()).unwrap();
        for _ in 0..1000 {
            controller.on_game_completed();
        }
        assert!(approx(controller.min_threshold(), 0.2));
        assert!(approx(controller.max_threshold(), 0.3));
    }

    #[test]
    fn test_rejects_empty_range() {
        let config = DifficultyConfig {
            min_possible: 0.25,
            max_possible: 0.3,
            ..DifficultyConfig::default()
        };
        assert!(DifficultyController::new(config).is_err());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let configs = [
            DifficultyConfig {
                min_possible: f64::NAN,
                ..DifficultyConfig::default()
            },
            DifficultyConfig {
                max_possible: f64::INFINITY,
                ..DifficultyConfig::default()
            },
            DifficultyConfig {
                initial_min_threshold: f64::NAN,
                ..DifficultyConfig::default()
            },
            DifficultyConfig {
                hint_delta: f64::NEG_INFINITY,
                ..DifficultyConfig::default()
            },
        ];
        for config in configs {
            assert!(config.validate().is_err(), "{:?}", config);
            assert!(DifficultyController::new(config).is_err());
        }
    }

    #[test]
    fn test_initial_value_is_clamped() {
        let config = DifficultyConfig {
            initial_min_threshold: 5.0,
            ..DifficultyConfig::default()
        };
        let controller = DifficultyController::new(config).unwrap();
        assert!(approx(controller.min_threshold(), 0.2));
    }

    #[test]
    fn test_concurrent_adjustments_are_not_lost() {
        let config = DifficultyConfig {
            min_possible: -100.0,
            max_possible: 100.0,
            ..DifficultyConfig::default()
        };
        let controller = Arc::new(DifficultyController::new(config).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = controller.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        c.adjust(0.001);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert!((controller.min_threshold() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: DifficultyConfig = serde_json::from_str(r#"{"band_width": 0.2}"#).unwrap();
        assert!(approx(config.band_width, 0.2));
        assert_eq!(config.hint_delta, default_hint_delta());
    }
}
