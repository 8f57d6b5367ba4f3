//! Game settings and tuning
//!
//! Loaded from JSON at startup and validated before the session is built,
//! so a bad value fails here instead of mid-tick.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::influence::{Cutoff, Falloff, InfluenceProfile};
use crate::sim::launch::LaunchConfig;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Fog mask cell size in world units (smaller = finer mask)
    pub fn fog_cell_size(&self) -> f32 {
        match self {
            QualityPreset::Low => FOG_CELL_SIZE * 2.0,
            QualityPreset::Medium => FOG_CELL_SIZE,
            QualityPreset::High => FOG_CELL_SIZE / 2.0,
        }
    }

    /// Width of the blended band at the edge of a reveal
    pub fn fog_edge_softness(&self) -> f32 {
        match self {
            QualityPreset::Low => 0.0,
            QualityPreset::Medium => FOG_EDGE_SOFTNESS,
            QualityPreset::High => FOG_EDGE_SOFTNESS * 1.5,
        }
    }
}

/// Fog mask resolution and edge quality
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogTuning {
    pub cell_size: f32,
    pub edge_softness: f32,
}

impl Default for FogTuning {
    fn default() -> Self {
        Self::from_preset(QualityPreset::default())
    }
}

impl FogTuning {
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            cell_size: preset.fog_cell_size(),
            edge_softness: preset.fog_edge_softness(),
        }
    }
}

/// Falloff curve and edge mode per influencer variant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldTuning {
    pub well: InfluenceProfile,
    pub repulser: InfluenceProfile,
    pub pulsar: InfluenceProfile,
    pub hazard: InfluenceProfile,
}

impl Default for FieldTuning {
    fn default() -> Self {
        Self {
            well: InfluenceProfile::new(Falloff::InverseDistance { core: 48.0 }, Cutoff::Hard),
            repulser: InfluenceProfile::new(Falloff::Linear, Cutoff::Hard),
            pulsar: InfluenceProfile::new(Falloff::InverseSquare { core: 40.0 }, Cutoff::Hard),
            hazard: InfluenceProfile::new(Falloff::Constant, Cutoff::Smooth { width: 12.0 }),
        }
    }
}

impl FieldTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.well.validate()?;
        self.repulser.validate()?;
        self.pulsar.validate()?;
        self.hazard.validate()
    }
}

/// World bounds and how many of each body to scatter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub width: f32,
    pub height: f32,
    pub planet_count: u32,
    pub repulser_count: u32,
    pub pulsar_count: u32,
    pub hazard_count: u32,
    pub asteroid_count: u32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            planet_count: 10,
            repulser_count: 4,
            pulsar_count: 2,
            hazard_count: 3,
            asteroid_count: 24,
        }
    }
}

/// Launched ship tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipTuning {
    pub radius: f32,
    /// Fog reveal radius around a flying ship
    pub reveal_radius: f32,
    /// Seconds before a ship drifts out of contact
    pub lifetime: f32,
    pub max_speed: f32,
}

impl Default for ShipTuning {
    fn default() -> Self {
        Self {
            radius: SHIP_RADIUS,
            reveal_radius: SHIP_REVEAL_RADIUS,
            lifetime: SHIP_LIFETIME,
            max_speed: SHIP_MAX_SPEED,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    pub fog: FogTuning,
    pub launch: LaunchConfig,
    pub field: FieldTuning,
    pub world: WorldTuning,
    pub ship: ShipTuning,

    // === Debug ===
    /// Skip fog compositing, draw influencer ranges and the mask preview
    pub debug: bool,
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        self.fog = FogTuning::from_preset(preset);
    }

    /// Reject values that would break the simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        let WorldTuning { width, height, .. } = self.world;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidWorldSize { width, height });
        }
        if !self.fog.cell_size.is_finite() || self.fog.cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize(self.fog.cell_size));
        }
        if !self.fog.edge_softness.is_finite() || self.fog.edge_softness < 0.0 {
            return Err(ConfigError::InvalidEdgeSoftness(self.fog.edge_softness));
        }
        self.launch.validate()?;
        self.field.validate()?;

        let ship = &self.ship;
        for value in [ship.radius, ship.reveal_radius, ship.lifetime] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidRange(value));
            }
        }
        if !ship.max_speed.is_finite() || ship.max_speed <= 0.0 {
            return Err(ConfigError::InvalidLaunchSpeed(ship.max_speed));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate settings from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!(
            "Loaded settings from {} (quality {})",
            path.display(),
            settings.quality.as_str()
        );
        Ok(settings)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.quality, QualityPreset::Medium);
        assert_eq!(settings.launch.max_pull, 100.0);
        assert!(!settings.debug);
    }

    #[test]
    fn test_preset_drives_fog_resolution() {
        let low = Settings::from_preset(QualityPreset::Low);
        let high = Settings::from_preset(QualityPreset::High);
        assert!(low.fog.cell_size > high.fog.cell_size);
        assert_eq!(low.fog.edge_softness, 0.0);
        assert!(high.fog.edge_softness > 0.0);
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!(QualityPreset::from_str("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::from_str("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings =
            Settings::from_json(r#"{ "launch": { "max_pull": 150.0, "max_launch_speed": 200.0 } }"#)
                .unwrap();
        assert_eq!(settings.launch.max_pull, 150.0);
        assert!(settings.launch.slingshot);
        assert_eq!(settings.world, WorldTuning::default());
    }

    #[test]
    fn test_falloff_json_shape() {
        let json = r#"{
            "field": {
                "well": { "falloff": { "curve": "inverse_square", "core": 20.0 },
                          "cutoff": { "mode": "smooth", "width": 8.0 } }
            }
        }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(
            settings.field.well,
            InfluenceProfile::new(Falloff::InverseSquare { core: 20.0 }, Cutoff::Smooth { width: 8.0 })
        );
    }

    #[test]
    fn test_invalid_values_fail_fast() {
        let err = Settings::from_json(r#"{ "launch": { "max_pull": -1.0, "max_launch_speed": 1.0 } }"#);
        assert!(matches!(err, Err(ConfigError::InvalidMaxPull(_))));

        let err = Settings::from_json(r#"{ "fog": { "cell_size": 0.0 } }"#);
        assert!(matches!(err, Err(ConfigError::InvalidCellSize(_))));

        let err = Settings::from_json(r#"{ "world": { "width": -5.0 } }"#);
        assert!(matches!(err, Err(ConfigError::InvalidWorldSize { .. })));

        let err = Settings::from_json("not json");
        assert!(matches!(err, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings::from_preset(QualityPreset::High);
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load_from("/definitely/not/here/settings.json");
        assert!(matches!(err, Err(ConfigError::Io(_))));
    }
}
