//! Result serialization: CSV point table, JSON report, text summary

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use minijinja::{context, Environment};

use crate::compliance::Summary;
use crate::config::SimulationConfig;
use crate::error::EmfResult;
use crate::grid::GridResults;

/// Write the per-point results as CSV
pub fn write_csv(path: &Path, results: &GridResults) -> EmfResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "x,y,z,field_value_v_m,limit_v_m,percentage_of_limit,status"
    )?;
    for point in results.results() {
        writeln!(
            writer,
            "{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{}",
            point.x,
            point.y,
            point.z,
            point.field_value,
            point.limit,
            point.percentage_of_limit,
            point.status
        )?;
    }

    writer.flush()?;
    Ok(())
}

/// Assemble the structured report document
pub fn build_report(
    config: &SimulationConfig,
    summary: &Summary,
    boundaries: &BTreeMap<String, f64>,
) -> serde_json::Value {
    let antennas: Vec<_> = config
        .antennas
        .iter()
        .map(|ant| {
            serde_json::json!({
                "id": ant.id,
                "frequency_mhz": ant.frequency_mhz,
                "power_eirp_watts": ant.power_eirp_watts,
                "position": {"x": ant.position.x, "y": ant.position.y, "z": ant.position.z},
                "orientation": {
                    "azimuth_deg": ant.orientation.azimuth_deg,
                    "tilt_deg": ant.orientation.tilt_deg,
                },
            })
        })
        .collect();

    serde_json::json!({
        "metadata": {
            "simulation_name": config.name,
            "standard": summary.standard,
            "category": summary.category,
            "generated": chrono::Utc::now().to_rfc3339(),
        },
        "grid": {
            "bounds": {
                "x_min": config.grid.x_min,
                "x_max": config.grid.x_max,
                "y_min": config.grid.y_min,
                "y_max": config.grid.y_max,
            },
            "z_level": config.grid.z_level,
            "resolution": config.grid.resolution,
            "total_points": summary.total_points,
        },
        "antennas": antennas,
        "summary": {
            "overall_compliant": summary.overall_compliant,
            "compliant_points": summary.compliant_points,
            "marginal_points": summary.marginal_points,
            "non_compliant_points": summary.non_compliant_points,
            "max_field_value_v_m": summary.max_field_value,
            "max_percentage_of_limit": summary.max_percentage_of_limit,
        },
        "compliance_boundaries": boundaries,
    })
}

/// Write the structured report as pretty-printed JSON
pub fn write_report(
    path: &Path,
    config: &SimulationConfig,
    summary: &Summary,
    boundaries: &BTreeMap<String, f64>,
) -> EmfResult<()> {
    let report = build_report(config, summary, boundaries);
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

const SUMMARY_TEMPLATE: &str = "\
=== EMF Compliance Analysis Results ===
Simulation: {{ name }}
Standard: {{ standard }} ({{ category }})
Total points analyzed: {{ total_points }}
Compliant: {{ compliant_points }} ({{ \"%.1f\"|format(compliant_percentage) }}%)
Marginal (80-100%): {{ marginal_points }}
Non-compliant: {{ non_compliant_points }}
Max field: {{ \"%.4f\"|format(max_field_value) }} V/m
Max % of limit: {{ \"%.2f\"|format(max_percentage_of_limit) }}%

Compliance boundaries:
{% for b in boundaries %}  {{ b.id }}: {{ \"%.1f\"|format(b.distance) }} m
{% endfor %}
Overall: {{ \"COMPLIANT\" if overall_compliant else \"NON-COMPLIANT\" }}
";

/// Render the human-readable summary report
pub fn render_summary(
    config: &SimulationConfig,
    summary: &Summary,
    boundaries: &BTreeMap<String, f64>,
) -> EmfResult<String> {
    let mut env = Environment::new();
    env.add_template("summary", SUMMARY_TEMPLATE)?;
    let template = env.get_template("summary")?;

    let boundary_rows: Vec<_> = boundaries
        .iter()
        .map(|(id, distance)| serde_json::json!({"id": id, "distance": distance}))
        .collect();

    let text = template.render(context! {
        name => config.name,
        standard => summary.standard,
        category => summary.category,
        total_points => summary.total_points,
        compliant_points => summary.compliant_points,
        compliant_percentage =>
            100.0 * summary.compliant_points as f64 / summary.total_points as f64,
        marginal_points => summary.marginal_points,
        non_compliant_points => summary.non_compliant_points,
        max_field_value => summary.max_field_value,
        max_percentage_of_limit => summary.max_percentage_of_limit,
        boundaries => boundary_rows,
        overall_compliant => summary.overall_compliant,
    })?;

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::ComplianceStatus;
    use crate::config::GridConfig;
    use crate::grid::PointResult;
    use pretty_assertions::assert_eq;

    fn sample_results() -> GridResults {
        let mut results = GridResults::new(GridConfig::default());
        results.push(PointResult {
            x: -1.0,
            y: 0.0,
            z: 1.5,
            field_value: 5.477226,
            limit: 41.25,
            percentage_of_limit: 13.278123,
            status: ComplianceStatus::Compliant,
        });
        results.push(PointResult {
            x: 0.0,
            y: 0.0,
            z: 1.5,
            field_value: 50.0,
            limit: 41.25,
            percentage_of_limit: 121.212121,
            status: ComplianceStatus::NonCompliant,
        });
        results
    }

    fn sample_summary() -> Summary {
        Summary {
            standard: "ICNIRP_2020".to_string(),
            category: "general_public".to_string(),
            overall_compliant: false,
            total_points: 2,
            compliant_points: 1,
            marginal_points: 0,
            non_compliant_points: 1,
            max_field_value: 50.0,
            max_percentage_of_limit: 121.212121,
        }
    }

    #[test]
    fn test_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_csv(&path, &sample_results()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let expected = "\
x,y,z,field_value_v_m,limit_v_m,percentage_of_limit,status
-1.000000,0.000000,1.500000,5.477226,41.250000,13.278123,COMPLIANT
0.000000,0.000000,1.500000,50.000000,41.250000,121.212121,NON_COMPLIANT
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_report_document_keys() {
        let config = SimulationConfig::default();
        let mut boundaries = BTreeMap::new();
        boundaries.insert("default".to_string(), 13.3);

        let report = build_report(&config, &sample_summary(), &boundaries);

        assert_eq!(report["metadata"]["standard"], "ICNIRP_2020");
        assert_eq!(report["metadata"]["simulation_name"], "EMF Compliance Analysis");
        assert!(report["metadata"]["generated"].is_string());
        assert_eq!(report["grid"]["bounds"]["x_min"], -100.0);
        assert_eq!(report["grid"]["total_points"], 2);
        assert_eq!(report["summary"]["overall_compliant"], false);
        assert_eq!(report["summary"]["non_compliant_points"], 1);
        assert_eq!(report["compliance_boundaries"]["default"], 13.3);
    }

    #[test]
    fn test_summary_rendering() {
        let config = SimulationConfig::default();
        let mut boundaries = BTreeMap::new();
        boundaries.insert("north".to_string(), 13.28);
        boundaries.insert("south".to_string(), 1.0);

        let text = render_summary(&config, &sample_summary(), &boundaries).unwrap();

        assert!(text.contains("Standard: ICNIRP_2020 (general_public)"));
        assert!(text.contains("Total points analyzed: 2"));
        assert!(text.contains("Compliant: 1 (50.0%)"));
        assert!(text.contains("north: 13.3 m"));
        assert!(text.contains("south: 1.0 m"));
        assert!(text.contains("Overall: NON-COMPLIANT"));
    }

    #[test]
    fn test_written_report_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let config = SimulationConfig::default();
        write_report(&path, &config, &sample_summary(), &BTreeMap::new()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["summary"]["max_field_value_v_m"], 50.0);
    }
}
