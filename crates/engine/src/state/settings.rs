//! Engine settings

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::snap::SnapStrategy;

/// Falloff of the distance score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthCurve {
    #[default]
    Linear,
    Quadratic,
}

/// Snap settings for dragging parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    /// Enable snapping
    pub enabled: bool,
    /// Snap tolerance in length units
    pub distance: f64,
    /// Snap edges to parallel edges
    pub edge: bool,
    /// Snap faces to facing faces
    pub face: bool,
    /// Snap to room walls
    pub wall: bool,
    /// Snap into wall corners (needs `wall`)
    pub corner: bool,
    pub strength_curve: StrengthCurve,
    /// Gap left between faces after a face snap
    pub collision_offset: f64,
    /// Candidate generation strategy
    pub version: SnapStrategy,
    /// Pull gradually when outside half the tolerance
    pub magnetic_pull: bool,
    /// Candidates kept for visualization
    pub max_candidates: usize,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            distance: 10.0,
            edge: true,
            face: true,
            wall: true,
            corner: true,
            strength_curve: StrengthCurve::Linear,
            collision_offset: 0.5,
            version: SnapStrategy::default(),
            magnetic_pull: false,
            max_candidates: 20,
        }
    }
}

/// Precision-modifier quantization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Translation/resize step while the precision modifier is held
    pub step: f64,
    /// Rotation step in degrees while the precision modifier is held
    pub rotation_step_deg: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            step: 10.0,
            rotation_step_deg: 15.0,
        }
    }
}

/// Transform session tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Deltas shorter than this never change the inferred axis
    pub axis_threshold: f64,
    /// Smallest dimension a resize may produce
    pub min_dimension: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            axis_threshold: 1.0,
            min_dimension: 1.0,
        }
    }
}

/// Undo history limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Oldest batches are dropped beyond this depth
    pub max_depth: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

/// All engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineSettings {
    #[serde(default)]
    pub snap: SnapSettings,
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub history: HistorySettings,
}

impl EngineSettings {
    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("com", "partsnap", "partsnap") {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                match Self::from_json(&json) {
                    Ok(settings) => return settings,
                    Err(e) => tracing::warn!("Ignoring {}: {e}", config_path.display()),
                }
            }
        }
        Self::default()
    }

    /// Save settings to file
    pub fn save(&self) -> Result<()> {
        if let Some(dirs) = directories::ProjectDirs::from("com", "partsnap", "partsnap") {
            let config_dir = dirs.config_dir();
            std::fs::create_dir_all(config_dir)?;
            self.save_to(&config_dir.join("settings.json"))?;
        }
        Ok(())
    }

    /// Write settings as pretty JSON to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(EngineError::SettingsFormat)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(EngineError::SettingsFormat)
    }
}
