//! Overlay settings
//!
//! Hosts hand these over as JSON. Anything left out takes its default, so an
//! empty object (`{}`) is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::OverlayError;
use crate::field::FieldConfig;
use crate::sim::SimConfig;

/// Overlay settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Snowfall on/off (the page toggle)
    pub snow_enabled: bool,
    /// Gold point cloud behind the content
    pub field_enabled: bool,

    // === Accessibility ===
    /// Reduced motion (disables all decorative animation)
    pub reduced_motion: bool,

    /// Fixed RNG seed; hosts pick one per session when absent
    pub seed: Option<u64>,

    // === Tuning ===
    pub snow: SimConfig,
    pub field: FieldConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snow_enabled: true,
            field_enabled: true,
            reduced_motion: false,
            seed: None,
            snow: SimConfig::default(),
            field: FieldConfig::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON, filling gaps with defaults
    ///
    /// Out-of-range tuning values are rejected rather than clamped.
    pub fn from_json(json: &str) -> Result<Self, OverlayError> {
        let json = json.trim();
        if json.is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check every tuning value is usable
    pub fn validate(&self) -> Result<(), OverlayError> {
        self.snow.validate()?;
        self.field.validate()
    }

    pub fn to_json(&self) -> Result<String, OverlayError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Effective snowfall (respects reduced_motion)
    pub fn effective_snow(&self) -> bool {
        self.snow_enabled && !self.reduced_motion
    }

    /// Effective point cloud (respects reduced_motion)
    pub fn effective_field(&self) -> bool {
        self.field_enabled && !self.reduced_motion
    }

    /// Configured seed, or `fallback` when none was given
    pub fn seed_or(&self, fallback: u64) -> u64 {
        self.seed.unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(Settings::from_json("").unwrap(), Settings::default());
        assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{"seed": 7, "snow": {"desktop_count": 100}}"#).unwrap();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.snow.desktop_count, 100);
        assert_eq!(settings.snow.mobile_count, SimConfig::default().mobile_count);
        assert!(settings.snow_enabled);
        assert_eq!(settings.field, FieldConfig::default());
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = Settings::from_json("{snow_enabled: yes").unwrap_err();
        assert!(matches!(err, OverlayError::Settings(_)));
    }

    #[test]
    fn test_out_of_range_settings_rejected() {
        for json in [
            r#"{"snow": {"sprite_size": 70000}}"#,
            r#"{"snow": {"mobile_count": 18446744073709551615}}"#,
            r#"{"snow": {"alpha": {"min": 1.0, "max": 0.5}}}"#,
            r#"{"snow": {"wrap_margin": -5.0}}"#,
            r#"{"field": {"count": 100000000}}"#,
        ] {
            let err = Settings::from_json(json).unwrap_err();
            assert!(matches!(err, OverlayError::InvalidSettings(_)), "{json}");
        }
    }

    #[test]
    fn test_reduced_motion_disables_everything() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert!(!settings.effective_snow());
        assert!(!settings.effective_field());

        let settings = Settings {
            snow_enabled: false,
            ..Settings::default()
        };
        assert!(!settings.effective_snow());
        assert!(settings.effective_field());
    }

    #[test]
    fn test_json_survives_serialization() {
        let settings = Settings {
            seed: Some(99),
            field_enabled: false,
            ..Settings::default()
        };
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
        assert_eq!(settings.seed_or(1), 99);
        assert_eq!(Settings::default().seed_or(1), 1);
    }
}
