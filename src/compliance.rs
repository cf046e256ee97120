//! Exposure limits and compliance assessment
//!
//! Limit tables are frequency-banded reference levels from the supported
//! standards (ICNIRP 2020, FCC OET-65, ICASA) or a custom YAML table. The
//! ICNIRP-family standards use closed-form frequency-dependent limits in
//! the 400-2000 MHz band; everywhere else the banded table applies.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EmfError, EmfResult};
use crate::grid::PointResult;

/// Exposure category per ICNIRP terminology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "snake_case")]
pub enum ExposureCategory {
    GeneralPublic,
    Occupational,
}

impl ExposureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExposureCategory::GeneralPublic => "general_public",
            ExposureCategory::Occupational => "occupational",
        }
    }
}

impl From<String> for ExposureCategory {
    /// Lenient parse: anything that is not "occupational" is general public
    fn from(s: String) -> Self {
        match s.as_str() {
            "occupational" | "OCCUPATIONAL" => ExposureCategory::Occupational,
            _ => ExposureCategory::GeneralPublic,
        }
    }
}

impl fmt::Display for ExposureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assessment of a field value against its limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceStatus {
    /// Below 80% of the limit
    Compliant,
    /// 80-100% of the limit (warning zone)
    Marginal,
    /// At or above the limit
    NonCompliant,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "COMPLIANT",
            ComplianceStatus::Marginal => "MARGINAL",
            ComplianceStatus::NonCompliant => "NON_COMPLIANT",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One frequency band of a limit table, bounds inclusive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitEntry {
    pub freq_min_mhz: f64,
    pub freq_max_mhz: f64,
    /// E-field limit in V/m
    pub e_field_limit: f64,
    /// Power density limit in W/m²
    #[serde(default)]
    pub s_limit: f64,
    /// Human-readable provenance of the band
    #[serde(default)]
    pub formula: String,
}

impl LimitEntry {
    fn new(
        freq_min_mhz: f64,
        freq_max_mhz: f64,
        e_field_limit: f64,
        s_limit: f64,
        formula: &str,
    ) -> Self {
        Self {
            freq_min_mhz,
            freq_max_mhz,
            e_field_limit,
            s_limit,
            formula: formula.to_string(),
        }
    }
}

/// Custom limit table file layout
#[derive(Debug, Deserialize)]
struct LimitTableFile {
    name: Option<String>,
    #[serde(default)]
    limits: Vec<LimitEntry>,
}

/// Aggregate statistics over a set of point results
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub standard: String,
    pub category: String,
    pub overall_compliant: bool,
    pub total_points: usize,
    pub compliant_points: usize,
    pub marginal_points: usize,
    pub non_compliant_points: usize,
    pub max_field_value: f64,
    pub max_percentage_of_limit: f64,
}

/// Compliance checker for a named standard or custom limit table
pub struct Compliance {
    standard_name: String,
    category: ExposureCategory,
    limits: Vec<LimitEntry>,
}

/// E-field fallback when the table is empty (ICNIRP general public, 2 GHz+)
const DEFAULT_E_FIELD_LIMIT: f64 = 61.0;
/// Power density fallback when no band matches
const DEFAULT_S_LIMIT: f64 = 10.0;

impl Compliance {
    /// Create a checker from a standard token or a custom table path
    ///
    /// Known tokens (case-insensitive): `ICNIRP_2020` / `ICNIRP`, `FCC`,
    /// `ICASA`. Anything else is treated as a path to a YAML limit table.
    pub fn new(standard: &str, category: ExposureCategory) -> EmfResult<Self> {
        let token = standard.to_uppercase();
        let checker = match token.as_str() {
            "ICNIRP_2020" | "ICNIRP" => Self {
                standard_name: "ICNIRP_2020".to_string(),
                category,
                limits: icnirp_2020_limits(category),
            },
            "FCC" => Self {
                standard_name: "FCC".to_string(),
                category,
                limits: fcc_limits(category),
            },
            // ICASA follows ICNIRP 2020 reference levels
            "ICASA" => Self {
                standard_name: "ICASA".to_string(),
                category,
                limits: icnirp_2020_limits(category),
            },
            _ => Self::from_yaml(Path::new(standard), category)?,
        };

        debug!(
            "compliance standard {} ({}) with {} limit bands",
            checker.standard_name,
            checker.category,
            checker.limits.len()
        );
        Ok(checker)
    }

    /// Load a custom limit table from a YAML file
    fn from_yaml(path: &Path, category: ExposureCategory) -> EmfResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| EmfError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let table: LimitTableFile =
            serde_yaml::from_str(&text).map_err(|e| EmfError::ConfigLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            standard_name: table
                .name
                .unwrap_or_else(|| path.to_string_lossy().into_owned()),
            category,
            limits: table.limits,
        })
    }

    pub fn standard_name(&self) -> &str {
        &self.standard_name
    }

    pub fn category(&self) -> ExposureCategory {
        self.category
    }

    /// E-field limit in V/m at the given frequency
    pub fn e_field_limit(&self, frequency_mhz: f64) -> f64 {
        if self.uses_icnirp_formulas() && (400.0..=2000.0).contains(&frequency_mhz) {
            return match self.category {
                ExposureCategory::GeneralPublic => 1.375 * frequency_mhz.sqrt(),
                ExposureCategory::Occupational => 3.07 * frequency_mhz.sqrt(),
            };
        }

        for entry in &self.limits {
            if frequency_mhz >= entry.freq_min_mhz && frequency_mhz <= entry.freq_max_mhz {
                return entry.e_field_limit;
            }
        }

        // Out-of-table frequency: fall back to the most conservative band
        if self.limits.is_empty() {
            return DEFAULT_E_FIELD_LIMIT;
        }
        self.limits
            .iter()
            .map(|e| e.e_field_limit)
            .fold(f64::INFINITY, f64::min)
    }

    /// Power density limit in W/m² at the given frequency
    pub fn power_density_limit(&self, frequency_mhz: f64) -> f64 {
        if self.uses_icnirp_formulas() && (400.0..=2000.0).contains(&frequency_mhz) {
            return match self.category {
                ExposureCategory::GeneralPublic => frequency_mhz / 200.0,
                ExposureCategory::Occupational => frequency_mhz / 40.0,
            };
        }

        for entry in &self.limits {
            if frequency_mhz >= entry.freq_min_mhz && frequency_mhz <= entry.freq_max_mhz {
                return entry.s_limit;
            }
        }

        DEFAULT_S_LIMIT
    }

    /// Whether the 400-2000 MHz closed-form limits apply to this standard
    fn uses_icnirp_formulas(&self) -> bool {
        matches!(self.standard_name.as_str(), "ICNIRP_2020" | "ICASA")
    }

    /// Classify a field value against a limit
    pub fn evaluate(&self, field_value: f64, limit: f64) -> ComplianceStatus {
        let percentage = field_value / limit * 100.0;
        if percentage >= 100.0 {
            ComplianceStatus::NonCompliant
        } else if percentage >= 80.0 {
            ComplianceStatus::Marginal
        } else {
            ComplianceStatus::Compliant
        }
    }

    /// Aggregate per-point results into summary statistics
    pub fn generate_summary(&self, results: &[PointResult]) -> Summary {
        let mut summary = Summary {
            standard: self.standard_name.clone(),
            category: self.category.to_string(),
            overall_compliant: true,
            total_points: results.len(),
            compliant_points: 0,
            marginal_points: 0,
            non_compliant_points: 0,
            max_field_value: 0.0,
            max_percentage_of_limit: 0.0,
        };

        for result in results {
            match result.status {
                ComplianceStatus::Compliant => summary.compliant_points += 1,
                ComplianceStatus::Marginal => summary.marginal_points += 1,
                ComplianceStatus::NonCompliant => summary.non_compliant_points += 1,
            }
            if result.field_value > summary.max_field_value {
                summary.max_field_value = result.field_value;
            }
            if result.percentage_of_limit > summary.max_percentage_of_limit {
                summary.max_percentage_of_limit = result.percentage_of_limit;
            }
        }

        summary.overall_compliant = summary.non_compliant_points == 0;
        summary
    }
}

/// ICNIRP 2020 reference levels, 100 kHz - 300 GHz
fn icnirp_2020_limits(category: ExposureCategory) -> Vec<LimitEntry> {
    match category {
        ExposureCategory::GeneralPublic => vec![
            LimitEntry::new(0.1, 30.0, 87.0, 20.0, "87 V/m (100 kHz - 30 MHz)"),
            LimitEntry::new(30.0, 400.0, 28.0, 2.0, "28 V/m (30 - 400 MHz)"),
            LimitEntry::new(400.0, 2000.0, 61.4, 10.0, "1.375*sqrt(f) V/m (400 - 2000 MHz)"),
            LimitEntry::new(2000.0, 300_000.0, 61.0, 10.0, "61 V/m (2 - 300 GHz)"),
        ],
        // Occupational: 5x power density, sqrt(5) E-field
        ExposureCategory::Occupational => vec![
            LimitEntry::new(0.1, 30.0, 194.6, 100.0, "194.6 V/m (100 kHz - 30 MHz)"),
            LimitEntry::new(30.0, 400.0, 62.6, 10.0, "62.6 V/m (30 - 400 MHz)"),
            LimitEntry::new(400.0, 2000.0, 137.3, 50.0, "3.07*sqrt(f) V/m (400 - 2000 MHz)"),
            LimitEntry::new(2000.0, 300_000.0, 137.0, 50.0, "137 V/m (2 - 300 GHz)"),
        ],
    }
}

/// FCC OET Bulletin 65 maximum permissible exposure
fn fcc_limits(category: ExposureCategory) -> Vec<LimitEntry> {
    match category {
        ExposureCategory::GeneralPublic => vec![
            LimitEntry::new(0.3, 1.34, 614.0, 1000.0, "614 V/m (0.3 - 1.34 MHz)"),
            LimitEntry::new(
                1.34,
                30.0,
                824.0 / 1.34_f64.sqrt(),
                180.0,
                "824/f V/m (1.34 - 30 MHz)",
            ),
            LimitEntry::new(30.0, 300.0, 27.5, 2.0, "27.5 V/m (30 - 300 MHz)"),
            LimitEntry::new(300.0, 1500.0, 27.5, 1.0, "27.5 V/m, f/1500 mW/cm² (300 - 1500 MHz)"),
            LimitEntry::new(1500.0, 100_000.0, 61.4, 10.0, "61.4 V/m (1.5 - 100 GHz)"),
        ],
        ExposureCategory::Occupational => vec![
            LimitEntry::new(0.3, 3.0, 614.0, 1000.0, "614 V/m (0.3 - 3 MHz)"),
            LimitEntry::new(3.0, 30.0, 1842.0 / 3.0, 900.0, "1842/f V/m (3 - 30 MHz)"),
            LimitEntry::new(30.0, 300.0, 61.4, 10.0, "61.4 V/m (30 - 300 MHz)"),
            LimitEntry::new(300.0, 1500.0, 61.4, 10.0, "61.4 V/m, f/300 mW/cm² (300 - 1500 MHz)"),
            LimitEntry::new(1500.0, 100_000.0, 137.0, 50.0, "137 V/m (1.5 - 100 GHz)"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TOL: f64 = 1e-9;

    fn icnirp_gp() -> Compliance {
        Compliance::new("ICNIRP_2020", ExposureCategory::GeneralPublic).unwrap()
    }

    #[test]
    fn test_classification_thresholds() {
        let c = icnirp_gp();
        assert_eq!(c.evaluate(80.0, 100.0), ComplianceStatus::Marginal);
        assert_eq!(c.evaluate(100.0, 100.0), ComplianceStatus::NonCompliant);
        assert_eq!(c.evaluate(79.999, 100.0), ComplianceStatus::Compliant);
        assert_eq!(c.evaluate(0.0, 100.0), ComplianceStatus::Compliant);
        assert_eq!(c.evaluate(150.0, 100.0), ComplianceStatus::NonCompliant);
    }

    #[test]
    fn test_icnirp_formula_band() {
        let c = icnirp_gp();
        // E = 1.375 * sqrt(900) ≈ 41.25 V/m
        assert!((c.e_field_limit(900.0) - 1.375 * 30.0).abs() < TOL);
        // S = f / 200
        assert!((c.power_density_limit(900.0) - 4.5).abs() < TOL);

        let occ = Compliance::new("icnirp", ExposureCategory::Occupational).unwrap();
        assert!((occ.e_field_limit(900.0) - 3.07 * 30.0).abs() < TOL);
        assert!((occ.power_density_limit(900.0) - 22.5).abs() < TOL);
    }

    #[test]
    fn test_icnirp_table_bands() {
        let c = icnirp_gp();
        assert!((c.e_field_limit(100.0) - 28.0).abs() < TOL);
        assert!((c.e_field_limit(3500.0) - 61.0).abs() < TOL);
        assert!((c.power_density_limit(100.0) - 2.0).abs() < TOL);
    }

    #[test]
    fn test_out_of_table_uses_most_conservative() {
        let c = icnirp_gp();
        // 0.05 MHz is below every band; minimum E-field limit is 28 V/m
        assert!((c.e_field_limit(0.05) - 28.0).abs() < TOL);
        assert!((c.power_density_limit(0.05) - DEFAULT_S_LIMIT).abs() < TOL);
    }

    #[test]
    fn test_fcc_no_formula_override() {
        let c = Compliance::new("FCC", ExposureCategory::GeneralPublic).unwrap();
        // 900 MHz falls in the 300-1500 MHz band, not a formula
        assert!((c.e_field_limit(900.0) - 27.5).abs() < TOL);
        assert!((c.power_density_limit(900.0) - 1.0).abs() < TOL);
    }

    #[test]
    fn test_icasa_mirrors_icnirp_under_its_own_name() {
        let c = Compliance::new("icasa", ExposureCategory::GeneralPublic).unwrap();
        assert_eq!(c.standard_name(), "ICASA");
        assert!((c.e_field_limit(900.0) - 1.375 * 30.0).abs() < TOL);
        assert!((c.e_field_limit(100.0) - 28.0).abs() < TOL);
    }

    #[test]
    fn test_custom_yaml_table() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(
            file,
            "name: CUSTOM\nlimits:\n  - freq_min_mhz: 100\n    freq_max_mhz: 1000\n    e_field_limit: 40\n    s_limit: 5\n"
        )
        .unwrap();

        let c = Compliance::new(
            file.path().to_str().unwrap(),
            ExposureCategory::GeneralPublic,
        )
        .unwrap();
        assert_eq!(c.standard_name(), "CUSTOM");
        assert!((c.e_field_limit(500.0) - 40.0).abs() < TOL);
        assert!((c.power_density_limit(500.0) - 5.0).abs() < TOL);
        // No match and a non-empty table: most conservative entry
        assert!((c.e_field_limit(5000.0) - 40.0).abs() < TOL);
    }

    #[test]
    fn test_missing_custom_table_is_fatal() {
        let result = Compliance::new(
            "/nonexistent/limits.yaml",
            ExposureCategory::GeneralPublic,
        );
        assert!(matches!(result, Err(EmfError::ConfigLoad { .. })));
    }

    #[test]
    fn test_summary_aggregation() {
        let c = icnirp_gp();
        let mk = |field: f64, pct: f64, status: ComplianceStatus| PointResult {
            x: 0.0,
            y: 0.0,
            z: 1.5,
            field_value: field,
            limit: 41.25,
            percentage_of_limit: pct,
            status,
        };
        let results = vec![
            mk(1.0, 2.4, ComplianceStatus::Compliant),
            mk(35.0, 84.8, ComplianceStatus::Marginal),
            mk(50.0, 121.2, ComplianceStatus::NonCompliant),
        ];

        let summary = c.generate_summary(&results);
        assert_eq!(summary.total_points, 3);
        assert_eq!(summary.compliant_points, 1);
        assert_eq!(summary.marginal_points, 1);
        assert_eq!(summary.non_compliant_points, 1);
        assert!(!summary.overall_compliant);
        assert!((summary.max_field_value - 50.0).abs() < TOL);
        assert!((summary.max_percentage_of_limit - 121.2).abs() < TOL);
    }

    #[test]
    fn test_summary_empty_results() {
        let summary = icnirp_gp().generate_summary(&[]);
        assert_eq!(summary.total_points, 0);
        assert!(summary.overall_compliant);
    }
}
