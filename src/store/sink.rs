use crate::{poller::VehiclePosition, store::{self, PredictionRecord}};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};
use tracing::debug;

/// Raw vehicle position as kept for audit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PositionRow {
    pub observed_at: NaiveDateTime,
    pub vehicle_id: String,
    pub route_id: String,
    pub lat: f64,
    pub lon: f64,
    pub deviation_minutes: Option<f64>,
    pub direction_text: String,
}

impl PositionRow {
    pub fn new(observed_at: NaiveDateTime, position: &VehiclePosition) -> Self {
        Self {
            observed_at,
            vehicle_id: position.vehicle_id.clone(),
            route_id: position.route_id.clone(),
            lat: position.coordinate.latitude,
            lon: position.coordinate.longitude,
            deviation_minutes: position.deviation_minutes,
            direction_text: position.direction_text.clone(),
        }
    }
}

/// Append-only csv files, one predictions file and one positions file per day.
#[derive(Debug, Clone)]
pub struct DailySink {
    dir: PathBuf,
}

impl DailySink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, store::Error> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn predictions_path(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("predictions_{}.csv", date.format("%Y-%m-%d")))
    }

    pub fn positions_path(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("positions_{}.csv", date.format("%Y-%m-%d")))
    }

    /// Rows are routed to the file of their observation date.
    pub fn append_predictions(&self, records: &[PredictionRecord]) -> Result<(), store::Error> {
        let mut by_day: BTreeMap<NaiveDate, Vec<&PredictionRecord>> = BTreeMap::new();
        for record in records {
            by_day.entry(record.date()).or_default().push(record);
        }
        for (date, rows) in by_day {
            append_rows(&self.predictions_path(date), &rows)?;
        }
        Ok(())
    }

    pub fn append_positions<'a, I>(
        &self,
        observed_at: NaiveDateTime,
        positions: I,
    ) -> Result<(), store::Error>
    where
        I: IntoIterator<Item = &'a VehiclePosition>,
    {
        let rows: Vec<PositionRow> = positions
            .into_iter()
            .map(|position| PositionRow::new(observed_at, position))
            .collect();
        append_rows(&self.positions_path(observed_at.date()), &rows)
    }

    /// Records persisted for `date`, empty when nothing was written yet.
    pub fn load_predictions(&self, date: NaiveDate) -> Result<Vec<PredictionRecord>, store::Error> {
        let path = self.predictions_path(date);
        if path.exists() {
            store::load_file(&path)
        } else {
            Ok(Vec::new())
        }
    }
}

fn append_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), store::Error> {
    if rows.is_empty() {
        return Ok(());
    }
    let write_header = match fs::metadata(path) {
        Ok(metadata) => metadata.len() == 0,
        Err(_) => true,
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(write_header)
        .from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    debug!("Appended {} rows to {}", rows.len(), path.display());
    Ok(())
}
