use busmetric::{
    analysis::{self, ArrivalCorrelator, QualitySummary},
    store,
};
use std::path::{Path, PathBuf};
use tracing::info;

pub fn analyze(paths: &[String]) -> Result<(), String> {
    let Some(first) = paths.first() else {
        return Err("analyze needs at least one predictions file".into());
    };
    let records = store::load_files(paths).map_err(|err| err.to_string())?;
    info!("Loaded {} records from {} files", records.len(), paths.len());

    let correlator = ArrivalCorrelator::new(analysis::Config::default());
    let correlation = correlator.correlate(&records);
    info!(
        "{} predictions, {} arrivals, {} with several candidate arrivals",
        correlation.predictions.len(),
        correlation.arrivals,
        correlation.ambiguous
    );

    log_summary("all routes", &correlation.summary());
    for (route_id, summary) in QualitySummary::by_route(&correlation.predictions) {
        log_summary(&format!("route {route_id}"), &summary);
    }

    let output = output_path(Path::new(first));
    store::write_records(&output, &correlation.predictions).map_err(|err| err.to_string())?;
    info!("Wrote {}", output.display());
    Ok(())
}

fn output_path(first: &Path) -> PathBuf {
    first
        .parent()
        .map(|dir| dir.join("correlated.csv"))
        .unwrap_or_else(|| PathBuf::from("correlated.csv"))
}

fn log_summary(label: &str, summary: &QualitySummary) {
    info!(
        "{label}: {}/{} resolved, mean quality {}, mean abs error {} min, method 2 resolved {} (mean quality {})",
        summary.resolved,
        summary.predictions,
        format_option(summary.mean_quality),
        format_option(summary.mean_absolute_error),
        summary.resolved_method2,
        format_option(summary.mean_quality_method2),
    );
}

fn format_option(value: Option<f64>) -> String {
    value
        .map(|value| format!("{value:.3}"))
        .unwrap_or_else(|| "n/a".into())
}
