//! Cumulative field solver over a collection of antennas
//!
//! Contributions combine non-coherently: power densities add, and the
//! equivalent E-field is recovered through the free-space impedance. No
//! phase or interference modeling.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::antenna::Antenna;
use crate::compliance::Compliance;
use crate::config::AntennaConfig;
use crate::error::{EmfError, EmfResult};
use crate::geometry::Vec3;
use crate::grid::{Grid, GridResults, PointResult};

/// Free-space impedance (ohms)
const ETA_0: f64 = 377.0;

/// Height of boundary-search evaluation points (m)
const BOUNDARY_EVAL_HEIGHT: f64 = 1.5;

/// Boundary search bracket (m)
const BOUNDARY_MIN_DISTANCE: f64 = 1.0;
const BOUNDARY_MAX_DISTANCE: f64 = 1000.0;

/// Boundary search convergence tolerance (m)
const BOUNDARY_TOLERANCE: f64 = 0.1;

/// Solves cumulative EMF exposure from a set of antennas
#[derive(Default)]
pub struct FieldSolver {
    antennas: Vec<Antenna>,
}

impl FieldSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_antenna(&mut self, antenna: Antenna) {
        self.antennas.push(antenna);
    }

    /// Build and add an antenna from its configuration record
    pub fn add_antenna_config(&mut self, config: &AntennaConfig) -> EmfResult<()> {
        self.add_antenna(Antenna::new(config)?);
        Ok(())
    }

    pub fn num_antennas(&self) -> usize {
        self.antennas.len()
    }

    pub fn antennas(&self) -> &[Antenna] {
        &self.antennas
    }

    /// Total power density at a point (W/m²), non-coherent sum
    pub fn total_power_density(&self, point: &Vec3) -> f64 {
        self.antennas.iter().map(|a| a.power_density(point)).sum()
    }

    /// Equivalent E-field from the total power density (V/m)
    ///
    /// E = sqrt(η₀ · S)
    pub fn total_e_field(&self, point: &Vec3) -> f64 {
        (ETA_0 * self.total_power_density(point)).sqrt()
    }

    /// Evaluate the whole grid against the compliance limits
    ///
    /// The limit is looked up at the FIRST antenna's frequency for every
    /// point; multi-frequency sites are not disambiguated.
    pub fn solve(&self, grid: &Grid, compliance: &Compliance) -> GridResults {
        let frequency_mhz = self
            .antennas
            .first()
            .map(|a| a.frequency_mhz())
            .unwrap_or(0.0);
        let limit = compliance.e_field_limit(frequency_mhz);

        info!(
            "solving {} x {} grid ({} points) against {} at {} MHz",
            grid.num_x(),
            grid.num_y(),
            grid.total_points(),
            compliance.standard_name(),
            frequency_mhz
        );

        let mut results = GridResults::new(grid.config().clone());
        for point in grid.points() {
            let field_value = self.total_e_field(&point);
            let percentage_of_limit = field_value / limit * 100.0;
            results.push(PointResult {
                x: point.x,
                y: point.y,
                z: point.z,
                field_value,
                limit,
                percentage_of_limit,
                status: compliance.evaluate(field_value, limit),
            });
        }
        results
    }

    /// Distance along a ray at which exposure falls to the limit
    ///
    /// Searches from the named antenna's position in the given horizontal
    /// direction at 1.5 m evaluation height, bisecting a 1-1000 m bracket
    /// to 0.1 m. The total field of ALL antennas is compared against the
    /// limit at the named antenna's frequency. Returns the clamped bracket
    /// edge when the boundary lies outside it.
    pub fn find_compliance_boundary(
        &self,
        antenna_id: &str,
        compliance: &Compliance,
        direction_azimuth_deg: f64,
    ) -> EmfResult<f64> {
        let target = self
            .antennas
            .iter()
            .find(|a| a.id() == antenna_id)
            .ok_or_else(|| EmfError::AntennaNotFound(antenna_id.to_string()))?;

        let limit = compliance.e_field_limit(target.frequency_mhz());
        let direction_rad = direction_azimuth_deg.to_radians();
        let direction = Vec3::new(direction_rad.cos(), direction_rad.sin(), 0.0);
        let origin = *target.position();

        let eval = |distance: f64| {
            let mut point = origin + direction * distance;
            point.z = BOUNDARY_EVAL_HEIGHT;
            self.total_e_field(&point)
        };

        // Already compliant at the inner edge
        if eval(BOUNDARY_MIN_DISTANCE) <= limit {
            return Ok(BOUNDARY_MIN_DISTANCE);
        }

        // Still exceeding at the outer edge: boundary is beyond the search
        // range, report the clamped distance
        if eval(BOUNDARY_MAX_DISTANCE) > limit {
            debug!(
                "compliance boundary for {} beyond {} m search range",
                antenna_id, BOUNDARY_MAX_DISTANCE
            );
            return Ok(BOUNDARY_MAX_DISTANCE);
        }

        let mut min_dist = BOUNDARY_MIN_DISTANCE;
        let mut max_dist = BOUNDARY_MAX_DISTANCE;
        while max_dist - min_dist > BOUNDARY_TOLERANCE {
            let mid = (min_dist + max_dist) / 2.0;
            if eval(mid) > limit {
                min_dist = mid;
            } else {
                max_dist = mid;
            }
        }

        Ok((min_dist + max_dist) / 2.0)
    }

    /// Compliance boundary for every antenna along its 0° direction
    pub fn find_all_compliance_boundaries(
        &self,
        compliance: &Compliance,
    ) -> EmfResult<BTreeMap<String, f64>> {
        let mut boundaries = BTreeMap::new();
        for antenna in &self.antennas {
            let distance = self.find_compliance_boundary(antenna.id(), compliance, 0.0)?;
            boundaries.insert(antenna.id().to_string(), distance);
        }
        Ok(boundaries)
    }
}
