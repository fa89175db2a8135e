//! Report output.
//!
//! A [`ReportSink`] writes a [`ScheduleReport`] for both audiences:
//! groups and professors. [`JsonSink`] is always available; `XlsxSink`
//! (feature `xlsx`) writes one worksheet per entity.

#[cfg(feature = "xlsx")]
mod xlsx;

#[cfg(feature = "xlsx")]
pub use xlsx::XlsxSink;

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::config::{OutputFormat, OutputSettings};
use crate::error::{TimetableError, TimetableResult};
use crate::models::{EntityTimetable, ScheduleReport};

/// File name stem for group timetables.
pub const GROUPS_STEM: &str = "schedule_groups";
/// File name stem for professor timetables.
pub const PROFESSORS_STEM: &str = "schedule_professors";

/// Destination for extracted schedules.
pub trait ReportSink {
    /// Writes the report; returns the files written.
    fn write(&self, report: &ScheduleReport) -> TimetableResult<Vec<PathBuf>>;
}

/// Sink selected by output settings.
///
/// # Errors
/// `Config` when `xlsx` is requested without the `xlsx` feature.
pub fn sink_for(settings: &OutputSettings) -> TimetableResult<Box<dyn ReportSink>> {
    match settings.format {
        OutputFormat::Json => Ok(Box::new(JsonSink::new(&settings.directory))),
        #[cfg(feature = "xlsx")]
        OutputFormat::Xlsx => Ok(Box::new(XlsxSink::new(&settings.directory))),
        #[cfg(not(feature = "xlsx"))]
        OutputFormat::Xlsx => Err(TimetableError::Config(
            "xlsx output requires the `xlsx` feature".to_string(),
        )),
    }
}

/// One entity's grid as serialized rows.
#[derive(Debug, Serialize)]
struct SheetView<'a> {
    entity_id: &'a str,
    rows: Vec<Vec<String>>,
}

/// Writes `schedule_groups.json` and `schedule_professors.json`.
///
/// Each file is an array of `{ entity_id, rows }`, where `rows` is the
/// header `Block, Mon..Sat` followed by one row per block.
#[derive(Debug, Clone)]
pub struct JsonSink {
    directory: PathBuf,
}

impl JsonSink {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    fn write_audience(&self, stem: &str, tables: &[EntityTimetable]) -> TimetableResult<PathBuf> {
        let views: Vec<SheetView<'_>> = tables
            .iter()
            .map(|t| SheetView {
                entity_id: &t.entity_id,
                rows: t.grid.to_rows(),
            })
            .collect();
        let path = self.directory.join(format!("{stem}.json"));
        fs::write(&path, serde_json::to_string_pretty(&views)?)
            .map_err(|e| TimetableError::Export(format!("{}: {}", path.display(), e)))?;
        Ok(path)
    }
}

impl ReportSink for JsonSink {
    fn write(&self, report: &ScheduleReport) -> TimetableResult<Vec<PathBuf>> {
        fs::create_dir_all(&self.directory).map_err(|e| {
            TimetableError::Export(format!("{}: {}", self.directory.display(), e))
        })?;
        let files = vec![
            self.write_audience(GROUPS_STEM, &report.groups)?,
            self.write_audience(PROFESSORS_STEM, &report.professors)?,
        ];
        info!("Wrote {} report files to {}", files.len(), self.directory.display());
        Ok(files)
    }
}
