//! emf-compliance: EMF exposure assessment for transmitter sites
//!
//! This crate provides:
//! - Radiation pattern loading (MSI/PLN angular tables, scattered CSV,
//!   isotropic)
//! - Far-field E-field and power-density calculation per antenna
//! - Non-coherent multi-antenna superposition over a 2D evaluation grid
//! - Compliance checking against ICNIRP 2020 / FCC / ICASA reference
//!   levels or custom limit tables, including binary-search discovery of
//!   per-antenna compliance boundaries
//!
//! Calculations use far-field approximations and are only valid outside
//! the reactive near-field region of each antenna.

pub mod antenna;
pub mod compliance;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod pattern;
pub mod report;
pub mod solver;

pub use antenna::Antenna;
pub use compliance::{Compliance, ComplianceStatus, ExposureCategory, LimitEntry, Summary};
pub use config::{AntennaConfig, ComplianceConfig, GridConfig, Orientation, Position, SimulationConfig};
pub use error::{EmfError, EmfResult};
pub use geometry::Vec3;
pub use grid::{Grid, GridResults, PointResult};
pub use pattern::{create_pattern, CsvPattern, IsotropicPattern, MsiPattern, RadiationPattern};
pub use solver::FieldSolver;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

/// Everything a completed simulation produced
pub struct SimulationOutcome {
    pub results: GridResults,
    pub summary: Summary,
    /// Compliance boundary distance per antenna id (m)
    pub boundaries: BTreeMap<String, f64>,
    /// Rendered text report, also written to `summary.txt`
    pub summary_text: String,
}

/// Main entry point: run a configured simulation and write its artifacts
///
/// Writes `results.csv`, `report.json`, and `summary.txt` into
/// `output_dir`, creating the directory if needed.
pub fn run(config: &SimulationConfig, output_dir: &Path) -> EmfResult<SimulationOutcome> {
    let compliance = Compliance::new(&config.compliance.standard, config.compliance.category)?;

    let mut solver = FieldSolver::new();
    for antenna_config in &config.antennas {
        debug!(
            "adding antenna {} at ({}, {}, {})",
            antenna_config.id,
            antenna_config.position.x,
            antenna_config.position.y,
            antenna_config.position.z
        );
        solver.add_antenna_config(antenna_config)?;
    }

    let grid = Grid::new(config.grid.clone());
    let results = solver.solve(&grid, &compliance);
    let summary = compliance.generate_summary(results.results());
    let boundaries = solver.find_all_compliance_boundaries(&compliance)?;

    fs::create_dir_all(output_dir)?;
    report::write_csv(&output_dir.join("results.csv"), &results)?;
    report::write_report(&output_dir.join("report.json"), config, &summary, &boundaries)?;
    let summary_text = report::render_summary(config, &summary, &boundaries)?;
    fs::write(output_dir.join("summary.txt"), &summary_text)?;

    Ok(SimulationOutcome {
        results,
        summary,
        boundaries,
        summary_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_default_site() {
        // Default config shrunk to keep the grid small
        let mut config = SimulationConfig::default();
        config.grid = GridConfig {
            x_min: -20.0,
            x_max: 20.0,
            y_min: -20.0,
            y_max: 20.0,
            z_level: 1.5,
            resolution: 5.0,
        };
        config.antennas.push(AntennaConfig {
            id: "default".to_string(),
            pattern_file: "isotropic".to_string(),
            ..AntennaConfig::default()
        });

        let dir = tempfile::tempdir().unwrap();
        let outcome = run(&config, dir.path()).unwrap();

        assert_eq!(outcome.results.total_points(), 81);
        assert_eq!(outcome.summary.total_points, 81);
        // 100 W EIRP 30 m up stays far below the 1800 MHz limit
        assert!(outcome.summary.overall_compliant);
        assert_eq!(outcome.boundaries.get("default"), Some(&1.0));
        assert!(outcome.summary_text.contains("Overall: COMPLIANT"));

        assert!(dir.path().join("results.csv").exists());
        assert!(dir.path().join("report.json").exists());
        assert!(dir.path().join("summary.txt").exists());

        let csv = fs::read_to_string(dir.path().join("results.csv")).unwrap();
        // Header plus one row per point
        assert_eq!(csv.lines().count(), 82);
    }
}
