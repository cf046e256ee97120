//! Antenna model: position, orientation, power, and pattern
//!
//! An antenna answers point queries in global coordinates. The query point
//! is transformed into the antenna's local frame (boresight = local +X) by
//! undoing the mounting azimuth and mechanical tilt, then the pattern is
//! consulted at the resulting spherical angles.

use std::f64::consts::PI;

use crate::config::AntennaConfig;
use crate::error::EmfResult;
use crate::geometry::{rotate_y, rotate_z, to_spherical, wrap_degrees, Vec3};
use crate::pattern::{create_pattern, RadiationPattern};

/// Distance floor to avoid the singularity at the antenna location (m)
const MIN_DISTANCE: f64 = 0.1;

pub struct Antenna {
    id: String,
    frequency_mhz: f64,
    eirp_watts: f64,
    position: Vec3,
    azimuth_deg: f64,
    tilt_deg: f64,
    pattern: Box<dyn RadiationPattern>,
}

impl Antenna {
    /// Build an antenna from its configuration record
    ///
    /// Fails when the referenced pattern file cannot be loaded.
    pub fn new(config: &AntennaConfig) -> EmfResult<Self> {
        let pattern = create_pattern(&config.pattern_file)?;
        Ok(Self {
            id: config.id.clone(),
            frequency_mhz: config.frequency_mhz,
            eirp_watts: config.power_eirp_watts,
            position: config.position.to_vec3(),
            azimuth_deg: config.orientation.azimuth_deg,
            tilt_deg: config.orientation.tilt_deg,
            pattern,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn frequency_mhz(&self) -> f64 {
        self.frequency_mhz
    }

    pub fn eirp_watts(&self) -> f64 {
        self.eirp_watts
    }

    pub fn position(&self) -> &Vec3 {
        &self.position
    }

    pub fn max_gain_dbi(&self) -> f64 {
        self.pattern.max_gain_dbi()
    }

    /// Direction to a point, expressed in the antenna's local frame
    fn local_direction(&self, point: &Vec3) -> Vec3 {
        let to_point = point - self.position;
        let rotated = rotate_z(&to_point, -self.azimuth_deg.to_radians());
        rotate_y(&rotated, -self.tilt_deg.to_radians())
    }

    /// Local azimuth (0-360) and elevation angles toward a point, degrees
    fn angles_to(&self, point: &Vec3) -> (f64, f64) {
        let local = self.local_direction(point);
        let (azimuth_rad, elevation_rad) = to_spherical(&local);
        (
            wrap_degrees(azimuth_rad.to_degrees()),
            elevation_rad.to_degrees(),
        )
    }

    /// Linear gain of the pattern toward a point
    pub fn gain_towards(&self, point: &Vec3) -> f64 {
        let (azimuth_deg, elevation_deg) = self.angles_to(point);
        self.pattern.gain_linear(azimuth_deg, elevation_deg)
    }

    fn distance_to(&self, point: &Vec3) -> f64 {
        (point - self.position).norm().max(MIN_DISTANCE)
    }

    /// Far-field E-field magnitude at a point (V/m)
    ///
    /// E = sqrt(30 · EIRP · G) / r
    pub fn e_field(&self, point: &Vec3) -> f64 {
        let distance = self.distance_to(point);
        let gain = self.gain_towards(point);
        (30.0 * self.eirp_watts * gain).sqrt() / distance
    }

    /// Power density at a point (W/m²)
    ///
    /// S = EIRP · G / (4π r²)
    pub fn power_density(&self, point: &Vec3) -> f64 {
        let distance = self.distance_to(point);
        let gain = self.gain_towards(point);
        self.eirp_watts * gain / (4.0 * PI * distance * distance)
    }
}
