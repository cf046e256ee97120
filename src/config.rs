//! Simulation configuration
//!
//! YAML-based configuration for exposure assessments. Every field has a
//! default so partial files load cleanly; a file with no `antennas` list
//! gets a single default isotropic antenna so a bare config still produces
//! a meaningful run.
//!
//! ## Example
//!
//! ```yaml
//! name: Site A assessment
//! grid:
//!   x_min: -100
//!   x_max: 100
//!   y_min: -100
//!   y_max: 100
//!   z_level: 1.5
//!   resolution: 1.0
//! compliance:
//!   standard: ICNIRP_2020
//!   category: general_public
//! antennas:
//!   - id: sector_a
//!     pattern_file: patterns/sector_a.msi
//!     frequency_mhz: 1800
//!     power_eirp_watts: 250
//!     position: {x: 0, y: 0, z: 30}
//!     orientation: {azimuth_deg: 120, tilt_deg: -4}
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::compliance::ExposureCategory;
use crate::error::{EmfError, EmfResult};
use crate::geometry::Vec3;

/// Full simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub name: String,
    pub grid: GridConfig,
    pub compliance: ComplianceConfig,
    pub antennas: Vec<AntennaConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            name: "EMF Compliance Analysis".to_string(),
            grid: GridConfig::default(),
            compliance: ComplianceConfig::default(),
            antennas: Vec::new(),
        }
    }
}

/// Bounds and sampling of the evaluation plane
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    /// Height of the calculation plane (m)
    pub z_level: f64,
    /// Grid spacing (m)
    pub resolution: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            x_min: -100.0,
            x_max: 100.0,
            y_min: -100.0,
            y_max: 100.0,
            z_level: 1.5,
            resolution: 1.0,
        }
    }
}

/// Which limit table to evaluate against
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    /// Standard token (ICNIRP_2020, FCC, ICASA) or path to a custom table
    pub standard: String,
    pub category: ExposureCategory,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            standard: "ICNIRP_2020".to_string(),
            category: ExposureCategory::GeneralPublic,
        }
    }
}

/// Configuration for a single antenna
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AntennaConfig {
    /// Unique identifier; empty ids are filled in as antenna_<n> on load
    pub id: String,
    /// Path to an MSI/PLN/CSV pattern file, or empty for isotropic
    pub pattern_file: String,
    pub frequency_mhz: f64,
    pub power_eirp_watts: f64,
    pub position: Position,
    pub orientation: Orientation,
}

impl Default for AntennaConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            pattern_file: String::new(),
            frequency_mhz: 1800.0,
            power_eirp_watts: 100.0,
            position: Position::default(),
            orientation: Orientation::default(),
        }
    }
}

/// Antenna location in metres
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 30.0,
        }
    }
}

impl Position {
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Antenna pointing direction
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Orientation {
    /// Rotation in the horizontal plane, 0 = +X axis
    pub azimuth_deg: f64,
    /// Mechanical tilt about the local horizontal axis (positive = down)
    pub tilt_deg: f64,
}

impl SimulationConfig {
    /// Load a configuration from a YAML file
    pub fn load(path: &Path) -> EmfResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| EmfError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut config: SimulationConfig =
            serde_yaml::from_str(&text).map_err(|e| EmfError::ConfigLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        for (i, antenna) in config.antennas.iter_mut().enumerate() {
            if antenna.id.is_empty() {
                antenna.id = format!("antenna_{}", i + 1);
            }
        }

        if config.antennas.is_empty() {
            config.antennas.push(AntennaConfig {
                id: "default".to_string(),
                pattern_file: "isotropic".to_string(),
                ..AntennaConfig::default()
            });
        }

        Ok(config)
    }

    /// Check the configuration for unusable values
    pub fn validate(&self) -> EmfResult<()> {
        if self.grid.x_min >= self.grid.x_max {
            return Err(EmfError::ConfigInvalid(
                "grid x_min must be less than x_max".to_string(),
            ));
        }
        if self.grid.y_min >= self.grid.y_max {
            return Err(EmfError::ConfigInvalid(
                "grid y_min must be less than y_max".to_string(),
            ));
        }
        if self.grid.resolution <= 0.0 {
            return Err(EmfError::ConfigInvalid(
                "grid resolution must be positive".to_string(),
            ));
        }
        if self.grid.resolution < 0.1 {
            warn!("very fine grid resolution may result in long computation times");
        }

        if self.antennas.is_empty() {
            return Err(EmfError::ConfigInvalid("no antennas defined".to_string()));
        }
        for antenna in &self.antennas {
            if antenna.frequency_mhz <= 0.0 {
                return Err(EmfError::ConfigInvalid(format!(
                    "antenna {}: frequency must be positive",
                    antenna.id
                )));
            }
            if antenna.power_eirp_watts < 0.0 {
                return Err(EmfError::ConfigInvalid(format!(
                    "antenna {}: power must be non-negative",
                    antenna.id
                )));
            }
        }

        Ok(())
    }
}
