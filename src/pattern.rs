//! Antenna radiation patterns
//!
//! A pattern answers one question: what is the gain toward a given
//! (azimuth, elevation) pair in the antenna's own frame? Three sources are
//! supported:
//!
//! - isotropic (0 dBi everywhere),
//! - MSI/PLN angular tables (two 360-entry attenuation tables at 1°
//!   resolution, linearly interpolated),
//! - scattered CSV tables (azimuth, elevation, gain triples with
//!   nearest-neighbor fallback).
//!
//! `create_pattern` picks the loader from the file extension.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{EmfError, EmfResult};
use crate::geometry::wrap_degrees;

/// Gain lookup in the antenna's local frame
///
/// Azimuth is measured from boresight in the horizontal plane (0-360),
/// elevation from horizontal with positive up (-90 to +90).
pub trait RadiationPattern {
    /// Gain in dBi at the given angles
    fn gain_dbi(&self, azimuth_deg: f64, elevation_deg: f64) -> f64;

    /// Maximum gain of the pattern in dBi
    fn max_gain_dbi(&self) -> f64;

    /// Linear (non-dB) gain at the given angles
    fn gain_linear(&self, azimuth_deg: f64, elevation_deg: f64) -> f64 {
        10f64.powf(self.gain_dbi(azimuth_deg, elevation_deg) / 10.0)
    }
}

/// Ideal isotropic radiator, 0 dBi in every direction
#[derive(Debug, Default)]
pub struct IsotropicPattern;

impl RadiationPattern for IsotropicPattern {
    fn gain_dbi(&self, _azimuth_deg: f64, _elevation_deg: f64) -> f64 {
        0.0
    }

    fn max_gain_dbi(&self) -> f64 {
        0.0
    }
}

/// Pattern loaded from an MSI/PLN angular-table file
///
/// The file stores attenuation relative to the maximum gain in two
/// independent cuts. Combined gain is the max gain minus the sum of the
/// horizontal and vertical attenuations, an approximation of the full 3D
/// pattern.
pub struct MsiPattern {
    max_gain_dbi: f64,
    horizontal: Vec<f64>,
    vertical: Vec<f64>,
}

impl MsiPattern {
    /// Load a pattern from an MSI/PLN file
    pub fn load(path: &Path) -> EmfResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| EmfError::PatternLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::parse(&text, path))
    }

    fn parse(text: &str, path: &Path) -> Self {
        let mut name = String::new();
        let mut frequency_mhz = 0.0;
        let mut max_gain_dbi = 0.0;
        let mut horizontal = vec![0.0; 360];
        let mut vertical = vec![0.0; 360];

        #[derive(Clone, Copy)]
        enum Section {
            None,
            Horizontal,
            Vertical,
        }
        let mut section = Section::None;
        let mut rows_read = 0usize;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix("NAME") {
                name = rest.trim().to_string();
            } else if line.starts_with("FREQUENCY") {
                if let Some(value) = second_token(line) {
                    frequency_mhz = value;
                }
            } else if line.starts_with("GAIN") {
                if let Some(value) = second_token(line) {
                    max_gain_dbi = value;
                }
            } else if line.starts_with("HORIZONTAL") {
                section = Section::Horizontal;
                rows_read = 0;
            } else if line.starts_with("VERTICAL") {
                section = Section::Vertical;
                rows_read = 0;
            } else if !matches!(section, Section::None) {
                // "angle gain" data row; anything else on the line is ignored
                let mut tokens = line.split_whitespace();
                let angle = tokens.next().and_then(|t| t.parse::<f64>().ok());
                let gain = tokens.next().and_then(|t| t.parse::<f64>().ok());
                if let (Some(angle), Some(gain)) = (angle, gain) {
                    if rows_read < 360 {
                        let idx = (angle.round() as i64).rem_euclid(360) as usize;
                        match section {
                            Section::Horizontal => horizontal[idx] = gain,
                            Section::Vertical => vertical[idx] = gain,
                            Section::None => unreachable!(),
                        }
                        rows_read += 1;
                    }
                }
            }
        }

        debug!(
            "loaded MSI pattern {:?} (name {:?}, {} MHz, max {} dBi)",
            path, name, frequency_mhz, max_gain_dbi
        );

        Self {
            max_gain_dbi,
            horizontal,
            vertical,
        }
    }

    /// Linear interpolation between adjacent 1° samples, wrapping at 0/360
    fn interpolate(table: &[f64], angle_deg: f64) -> f64 {
        let angle = wrap_degrees(angle_deg);
        let idx_low = angle.floor() as usize;
        let idx_high = (idx_low + 1) % 360;
        let frac = angle - idx_low as f64;
        table[idx_low] * (1.0 - frac) + table[idx_high] * frac
    }
}

impl RadiationPattern for MsiPattern {
    fn gain_dbi(&self, azimuth_deg: f64, elevation_deg: f64) -> f64 {
        let h_atten = Self::interpolate(&self.horizontal, azimuth_deg);

        // The vertical cut counts degrees downward from horizontal, so the
        // lookup angle is the negated elevation.
        let v_atten = Self::interpolate(&self.vertical, -elevation_deg);

        self.max_gain_dbi - (h_atten + v_atten)
    }

    fn max_gain_dbi(&self) -> f64 {
        self.max_gain_dbi
    }
}

fn second_token(line: &str) -> Option<f64> {
    line.split_whitespace().nth(1).and_then(|t| t.parse().ok())
}

/// Pattern loaded from a scattered CSV table
///
/// Rows are (azimuth, elevation, gain_dbi) with gains stored as absolute
/// dBi. Queries round to the nearest degree; a miss falls back to the
/// closest stored key by squared angular distance.
pub struct CsvPattern {
    max_gain_dbi: f64,
    gain_map: BTreeMap<(i32, i32), f64>,
}

impl CsvPattern {
    /// Load a pattern from a CSV file
    pub fn load(path: &Path) -> EmfResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| EmfError::PatternLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> EmfResult<Self> {
        let mut gain_map = BTreeMap::new();
        let mut max_gain_dbi = f64::NEG_INFINITY;
        let mut header_skipped = false;

        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }

            if !header_skipped && line.to_lowercase().contains("azimuth") {
                header_skipped = true;
                continue;
            }

            let values: Vec<f64> = line
                .split(',')
                .filter_map(|t| t.trim().parse::<f64>().ok())
                .collect();

            if values.len() >= 3 {
                let az = values[0].round() as i32;
                let el = values[1].round() as i32;
                let gain = values[2];
                gain_map.insert((az, el), gain);
                if gain > max_gain_dbi {
                    max_gain_dbi = gain;
                }
            }
        }

        if gain_map.is_empty() {
            return Err(EmfError::PatternLoad {
                path: path.to_path_buf(),
                reason: "no valid pattern data".to_string(),
            });
        }

        debug!(
            "loaded CSV pattern {:?} ({} samples, max {} dBi)",
            path,
            gain_map.len(),
            max_gain_dbi
        );

        Ok(Self {
            max_gain_dbi,
            gain_map,
        })
    }

    fn lookup(&self, azimuth_deg: f64, elevation_deg: f64) -> f64 {
        let az = wrap_degrees(azimuth_deg.round()) as i32;
        let el = (elevation_deg.round() as i32).clamp(-90, 90);

        if let Some(&gain) = self.gain_map.get(&(az, el)) {
            return gain;
        }

        // Nearest stored sample; azimuth distance wraps, elevation does not
        let mut min_dist = f64::INFINITY;
        let mut nearest = 0.0;
        for (&(key_az, key_el), &gain) in &self.gain_map {
            let mut az_diff = (key_az - az).abs() as f64;
            if az_diff > 180.0 {
                az_diff = 360.0 - az_diff;
            }
            let el_diff = (key_el - el).abs() as f64;
            let dist = az_diff * az_diff + el_diff * el_diff;
            if dist < min_dist {
                min_dist = dist;
                nearest = gain;
            }
        }
        nearest
    }
}

impl RadiationPattern for CsvPattern {
    fn gain_dbi(&self, azimuth_deg: f64, elevation_deg: f64) -> f64 {
        self.lookup(azimuth_deg, elevation_deg)
    }

    fn max_gain_dbi(&self) -> f64 {
        self.max_gain_dbi
    }
}

/// Create a pattern from a file path
///
/// An empty path or the literal `"isotropic"` produces an isotropic
/// pattern. `.msi`/`.pln` files load as angular tables, `.csv` as scattered
/// tables; unrecognized extensions are attempted as MSI.
pub fn create_pattern(pattern_file: &str) -> EmfResult<Box<dyn RadiationPattern>> {
    if pattern_file.is_empty() || pattern_file == "isotropic" {
        return Ok(Box::new(IsotropicPattern));
    }

    let path = PathBuf::from(pattern_file);
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "msi" | "pln" => Ok(Box::new(MsiPattern::load(&path)?)),
        "csv" => Ok(Box::new(CsvPattern::load(&path)?)),
        _ => Ok(Box::new(MsiPattern::load(&path)?)),
    }
}
