//! Calculation grid and per-point results
//!
//! The grid is a single horizontal plane sampled at a fixed resolution.
//! Points are enumerated row-major (y outer, x inner), both boundary edges
//! included; when the span is not an exact multiple of the resolution the
//! final sample is clamped onto the boundary.

use crate::compliance::ComplianceStatus;
use crate::config::GridConfig;
use crate::geometry::Vec3;

/// Result of evaluating one grid point
#[derive(Debug, Clone)]
pub struct PointResult {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Total E-field at the point (V/m)
    pub field_value: f64,
    /// Applicable limit at the operating frequency (V/m)
    pub limit: f64,
    /// field_value / limit * 100
    pub percentage_of_limit: f64,
    pub status: ComplianceStatus,
}

/// 2D sampling grid at a fixed Z level
#[derive(Debug, Clone)]
pub struct Grid {
    config: GridConfig,
    num_x: usize,
    num_y: usize,
}

impl Grid {
    pub fn new(config: GridConfig) -> Self {
        let num_x = ((config.x_max - config.x_min) / config.resolution).ceil() as usize + 1;
        let num_y = ((config.y_max - config.y_min) / config.resolution).ceil() as usize + 1;
        Self {
            config,
            num_x,
            num_y,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn num_x(&self) -> usize {
        self.num_x
    }

    pub fn num_y(&self) -> usize {
        self.num_y
    }

    pub fn total_points(&self) -> usize {
        self.num_x * self.num_y
    }

    /// Sample point at the given indices
    pub fn point(&self, x_idx: usize, y_idx: usize) -> Vec3 {
        let x = (self.config.x_min + x_idx as f64 * self.config.resolution).min(self.config.x_max);
        let y = (self.config.y_min + y_idx as f64 * self.config.resolution).min(self.config.y_max);
        Vec3::new(x, y, self.config.z_level)
    }

    /// All sample points in row-major order (y outer, x inner)
    pub fn points(&self) -> Vec<Vec3> {
        let mut points = Vec::with_capacity(self.total_points());
        for yi in 0..self.num_y {
            for xi in 0..self.num_x {
                points.push(self.point(xi, yi));
            }
        }
        points
    }
}

/// Ordered results for a full grid evaluation
#[derive(Debug, Clone)]
pub struct GridResults {
    config: GridConfig,
    results: Vec<PointResult>,
}

impl GridResults {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: PointResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[PointResult] {
        &self.results
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn total_points(&self) -> usize {
        self.results.len()
    }

    pub fn compliant_points(&self) -> usize {
        self.count(ComplianceStatus::Compliant)
    }

    pub fn marginal_points(&self) -> usize {
        self.count(ComplianceStatus::Marginal)
    }

    pub fn non_compliant_points(&self) -> usize {
        self.count(ComplianceStatus::NonCompliant)
    }

    fn count(&self, status: ComplianceStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn max_field_value(&self) -> f64 {
        self.results
            .iter()
            .map(|r| r.field_value)
            .fold(0.0, f64::max)
    }

    pub fn max_percentage_of_limit(&self) -> f64 {
        self.results
            .iter()
            .map(|r| r.percentage_of_limit)
            .fold(0.0, f64::max)
    }
}
