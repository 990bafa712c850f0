//! Pipeline configuration.
//!
//! All tunables live here, grouped per component.  Every group derives
//! serde with `#[serde(default)]`, so a TOML file only needs the keys it
//! changes.  Per-label stability overrides are merged over the built-in
//! ones; to restore default rates for a label, list it explicitly.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::gesture::{
    ClassifierConfig, InteractionConfig, SchedulerConfig, StabilityConfig, TriggerConfig,
    MAX_CONFIDENCE,
};

/// Complete set of tunables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub classifier: ClassifierConfig,
    pub stability: StabilityConfig,
    pub interaction: InteractionConfig,
    pub trigger: TriggerConfig,
    pub scheduler: SchedulerConfig,
}

impl PipelineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| PipelineError::ConfigLoad(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::ConfigLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Check every tunable against its legal range.
    pub fn validate(&self) -> Result<()> {
        let c = &self.classifier;
        positive("classifier.extension_ratio", c.extension_ratio)?;
        positive("classifier.thumb_extension_ratio", c.thumb_extension_ratio)?;
        positive("classifier.pinch_ratio", c.pinch_ratio)?;
        positive("classifier.min_palm_size", c.min_palm_size)?;
        if let Some(ratio) = c.victory_spread_ratio {
            positive("classifier.victory_spread_ratio", ratio)?;
        }

        let s = &self.stability;
        let all_rates = std::iter::once(("default", s.rates))
            .chain(s.overrides.iter().map(|(label, r)| (label.as_str(), *r)));
        for (name, rates) in all_rates {
            if rates.increment == 0 || rates.decrement == 0 {
                return Err(invalid(format!(
                    "stability rates for {} must be non-zero (increment {}, decrement {})",
                    name, rates.increment, rates.decrement,
                )));
            }
        }

        let i = &self.interaction;
        confidence("interaction.act_threshold", i.act_threshold)?;
        unit_interval("interaction.position_alpha", i.position_alpha)?;
        unit_interval("interaction.axis_alpha", i.axis_alpha)?;
        unit_interval("interaction.scale_rate", i.scale_rate)?;
        non_negative("interaction.dead_zone", i.dead_zone as f64)?;
        non_negative("interaction.rotation_gain", i.rotation_gain as f64)?;
        positive("interaction.min_scale", i.min_scale)?;
        positive("interaction.settle_epsilon", i.settle_epsilon)?;
        if !i.scale_origin.is_finite() {
            return Err(invalid("interaction.scale_origin must be finite".to_string()));
        }
        if i.max_scale.is_nan() || i.max_scale < i.min_scale {
            return Err(invalid(format!(
                "interaction.max_scale {} is below min_scale {}",
                i.max_scale, i.min_scale,
            )));
        }

        let t = &self.trigger;
        confidence("trigger.mode_threshold", t.mode_threshold)?;
        confidence("trigger.theme_threshold", t.theme_threshold)?;
        confidence("trigger.letter_threshold", t.letter_threshold)?;
        non_negative("trigger.theme_cooldown_ms", t.theme_cooldown_ms)?;
        non_negative("trigger.letter_cooldown_ms", t.letter_cooldown_ms)?;
        non_negative("trigger.letter_hold_ms", t.letter_hold_ms)?;
        non_negative("trigger.letter_lock_ms", t.letter_lock_ms)?;

        let sch = &self.scheduler;
        non_negative("scheduler.min_tick_interval_ms", sch.min_tick_interval_ms)?;
        if sch.stats_window == 0 {
            return Err(invalid("scheduler.stats_window must be at least 1".to_string()));
        }

        Ok(())
    }

    /// Generate s-expression for IPC config.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:act-threshold {} :position-alpha {:.2} :axis-alpha {:.2} :dead-zone {:.2} :mode-threshold {} :theme-threshold {} :letter-threshold {} :min-tick-interval-ms {:.0})",
            self.interaction.act_threshold,
            self.interaction.position_alpha,
            self.interaction.axis_alpha,
            self.interaction.dead_zone,
            self.trigger.mode_threshold,
            self.trigger.theme_threshold,
            self.trigger.letter_threshold,
            self.scheduler.min_tick_interval_ms,
        )
    }
}

fn invalid(msg: String) -> PipelineError {
    PipelineError::InvalidConfig(msg)
}

fn unit_interval(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(invalid(format!("{} must be in (0, 1], got {}", name, value)))
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{} must be positive, got {}", name, value)))
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{} must be non-negative, got {}", name, value)))
    }
}

fn confidence(name: &str, value: u8) -> Result<()> {
    if value <= MAX_CONFIDENCE {
        Ok(())
    } else {
        Err(invalid(format!(
            "{} must be at most {}, got {}",
            name, MAX_CONFIDENCE, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{GestureLabel, LabelRates};

    #[test]
    fn test_default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [interaction]
            axis_alpha = 0.1
            dead_zone = 0.3

            [trigger]
            theme_cooldown_ms = 2000.0
            "#,
        )
        .unwrap();
        assert!((config.interaction.axis_alpha - 0.1).abs() < 1e-6);
        assert!((config.interaction.dead_zone - 0.3).abs() < 1e-6);
        assert_eq!(config.interaction.act_threshold, 60);
        assert_eq!(config.trigger.theme_cooldown_ms, 2000.0);
        assert_eq!(config.trigger.letter_cooldown_ms, 3000.0);
        assert_eq!(config.classifier, ClassifierConfig::default());
    }

    #[test]
    fn test_toml_label_overrides() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [stability.rates]
            increment = 25
            decrement = 15

            [stability.overrides.fist-thumb]
            increment = 5
            decrement = 30
            "#,
        )
        .unwrap();
        let s = &config.stability;
        assert_eq!(s.rates_for(GestureLabel::OpenFull).increment, 25);
        assert_eq!(
            s.rates_for(GestureLabel::FistThumb),
            LabelRates {
                increment: 5,
                decrement: 30
            }
        );
    }

    #[test]
    fn test_label_override_keeps_builtin_overrides() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [stability.overrides.fist-thumb]
            increment = 5
            decrement = 30
            "#,
        )
        .unwrap();
        let s = &config.stability;
        assert_eq!(
            s.rates_for(GestureLabel::Ok),
            LabelRates {
                increment: 10,
                decrement: 20
            }
        );
        assert_eq!(s.rates_for(GestureLabel::FistThumb).increment, 5);

        // Listing the built-in label replaces its rates.
        let config = PipelineConfig::from_toml_str(
            r#"
            [stability.overrides.ok]
            increment = 20
            "#,
        )
        .unwrap();
        assert_eq!(
            config.stability.rates_for(GestureLabel::Ok),
            LabelRates {
                increment: 20,
                decrement: 20
            }
        );
    }

    #[test]
    fn test_partial_rates_table() {
        let config = PipelineConfig::from_toml_str("[stability.rates]\nincrement = 25\n").unwrap();
        assert_eq!(
            config.stability.rates,
            LabelRates {
                increment: 25,
                decrement: 20
            }
        );
    }

    #[test]
    fn test_victory_spread_ratio() {
        let config =
            PipelineConfig::from_toml_str("[classifier]\nvictory_spread_ratio = 0.6\n").unwrap();
        assert_eq!(config.classifier.victory_spread_ratio, Some(0.6));
        assert_eq!(PipelineConfig::default().classifier.victory_spread_ratio, None);

        let mut config = PipelineConfig::default();
        config.classifier.victory_spread_ratio = Some(-1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_alpha_out_of_range_rejected() {
        for alpha in [0.0, -0.1, 1.5, f32::NAN] {
            let mut config = PipelineConfig::default();
            config.interaction.position_alpha = alpha;
            assert!(
                matches!(config.validate(), Err(PipelineError::InvalidConfig(_))),
                "alpha {} accepted",
                alpha,
            );
        }
        let mut config = PipelineConfig::default();
        config.interaction.axis_alpha = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_above_100_rejected() {
        let mut config = PipelineConfig::default();
        config.trigger.letter_threshold = 150;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_rate_rejected() {
        let mut config = PipelineConfig::default();
        config.stability.overrides.insert(
            GestureLabel::Pointing,
            LabelRates {
                increment: 0,
                decrement: 20,
            },
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pointing"));
    }

    #[test]
    fn test_negative_cooldown_rejected() {
        let mut config = PipelineConfig::default();
        config.trigger.theme_cooldown_ms = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_toml_is_load_error() {
        let err = PipelineConfig::from_toml_str("[interaction\naxis_alpha = ").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigLoad(_)));
    }

    #[test]
    fn test_invalid_toml_value_is_config_error() {
        let err = PipelineConfig::from_toml_str("[interaction]\naxis_alpha = 2.0\n").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = PipelineConfig::load(Path::new("/nonexistent/gesture.toml")).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigLoad(_)));
    }

    #[test]
    fn test_config_sexp() {
        let sexp = PipelineConfig::default().config_sexp();
        assert!(sexp.contains(":act-threshold 60"));
        assert!(sexp.contains(":min-tick-interval-ms 33"));
    }
}
