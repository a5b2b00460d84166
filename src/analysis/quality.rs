use std::collections::BTreeMap;

use crate::store::PredictionRecord;

/// `1 - |predicted - actual| / actual`, undefined when nothing was waited for.
pub fn quality(predicted: f64, actual: f64) -> Option<f64> {
    if actual == 0.0 {
        None
    } else {
        Some(1.0 - (predicted - actual).abs() / actual)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualitySummary {
    pub predictions: usize,
    pub resolved: usize,
    pub resolved_method2: usize,
    /// Resolved rows whose realized wait was zero minutes.
    pub excluded_zero_actual: usize,
    pub mean_quality: Option<f64>,
    pub mean_quality_method2: Option<f64>,
    /// Minutes, method 1.
    pub mean_absolute_error: Option<f64>,
}

impl QualitySummary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a PredictionRecord>,
    {
        let mut summary = Self::default();
        let mut quality_sum = 0.0;
        let mut quality_count = 0usize;
        let mut quality2_sum = 0.0;
        let mut quality2_count = 0usize;
        let mut error_sum = 0.0;

        for record in records.into_iter().filter(|record| !record.is_arrival()) {
            summary.predictions += 1;
            if let Some(actual) = record.actual_minutes_method1 {
                summary.resolved += 1;
                error_sum += (record.predicted_minutes - actual).abs();
                match record.quality() {
                    Some(value) => {
                        quality_sum += value;
                        quality_count += 1;
                    }
                    None => summary.excluded_zero_actual += 1,
                }
            }
            if record.actual_minutes_method2.is_some() {
                summary.resolved_method2 += 1;
                if let Some(value) = record.quality_method2() {
                    quality2_sum += value;
                    quality2_count += 1;
                }
            }
        }

        summary.mean_quality = mean(quality_sum, quality_count);
        summary.mean_quality_method2 = mean(quality2_sum, quality2_count);
        summary.mean_absolute_error = mean(error_sum, summary.resolved);
        summary
    }

    pub fn by_route(records: &[PredictionRecord]) -> BTreeMap<String, QualitySummary> {
        let mut grouped: BTreeMap<&str, Vec<&PredictionRecord>> = BTreeMap::new();
        for record in records {
            grouped.entry(record.route_id.as_str()).or_default().push(record);
        }
        grouped
            .into_iter()
            .map(|(route_id, records)| (route_id.to_string(), Self::from_records(records)))
            .collect()
    }
}

fn mean(sum: f64, count: usize) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[test]
fn quality_test() {
    assert_eq!(quality(5.0, 5.0), Some(1.0));
    assert_eq!(quality(6.0, 4.0), Some(0.5));
    assert_eq!(quality(2.0, 4.0), Some(0.5));
    assert_eq!(quality(3.0, 0.0), None);
}
