//! Excel workbook output (`umya-spreadsheet`).

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use umya_spreadsheet::{new_file, writer, Spreadsheet};

use super::{ReportSink, GROUPS_STEM, PROFESSORS_STEM};
use crate::error::{TimetableError, TimetableResult};
use crate::models::{EntityTimetable, ScheduleReport};

const MAX_SHEET_NAME: usize = 31;

/// Writes `schedule_groups.xlsx` and `schedule_professors.xlsx`.
///
/// One worksheet `Schedule_<id>` per entity: header `Block, Mon..Sat`,
/// then one row per block.
#[derive(Debug, Clone)]
pub struct XlsxSink {
    directory: PathBuf,
}

impl XlsxSink {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    fn write_workbook(&self, stem: &str, tables: &[EntityTimetable]) -> TimetableResult<PathBuf> {
        let book = workbook(tables)?;
        let path = self.directory.join(format!("{stem}.xlsx"));
        writer::xlsx::write(&book, &path)
            .map_err(|e| TimetableError::Export(format!("{}: {:?}", path.display(), e)))?;
        Ok(path)
    }
}

impl ReportSink for XlsxSink {
    fn write(&self, report: &ScheduleReport) -> TimetableResult<Vec<PathBuf>> {
        fs::create_dir_all(&self.directory).map_err(|e| {
            TimetableError::Export(format!("{}: {}", self.directory.display(), e))
        })?;
        let files = vec![
            self.write_workbook(GROUPS_STEM, &report.groups)?,
            self.write_workbook(PROFESSORS_STEM, &report.professors)?,
        ];
        info!("Wrote {} workbooks to {}", files.len(), self.directory.display());
        Ok(files)
    }
}

fn workbook(tables: &[EntityTimetable]) -> TimetableResult<Spreadsheet> {
    let mut book = new_file();
    let mut used = HashSet::new();

    for table in tables {
        let name = unique_sheet_name(&table.entity_id, &mut used);
        let sheet = book
            .new_sheet(&name)
            .map_err(|e| TimetableError::Export(format!("sheet '{name}': {e}")))?;
        for (r, row) in table.grid.to_rows().iter().enumerate() {
            for (c, text) in row.iter().enumerate() {
                sheet
                    .get_cell_mut(((c + 1) as u32, (r + 1) as u32))
                    .set_value(text.as_str());
            }
        }
    }

    // A workbook needs at least one sheet; drop the blank default only
    // when an entity sheet replaced it.
    if !tables.is_empty() {
        book.remove_sheet(0)
            .map_err(|e| TimetableError::Export(e.to_string()))?;
    }
    Ok(book)
}

/// `Schedule_<id>` with characters Excel rejects replaced, truncated to
/// 31 characters and made unique within the workbook.
fn unique_sheet_name(entity_id: &str, used: &mut HashSet<String>) -> String {
    let base: String = format!("Schedule_{entity_id}")
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(MAX_SHEET_NAME)
        .collect();

    let mut name = base.clone();
    let mut n = 2;
    while !used.insert(name.to_lowercase()) {
        let suffix = format!("~{n}");
        let keep = MAX_SHEET_NAME - suffix.len();
        name = base.chars().take(keep).chain(suffix.chars()).collect();
        n += 1;
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, Booking, Day, TimeSlot, WeeklyGrid};

    #[test]
    fn test_sheet_names() {
        let mut used = HashSet::new();
        assert_eq!(unique_sheet_name("G1", &mut used), "Schedule_G1");
        assert_eq!(unique_sheet_name("a/b", &mut used), "Schedule_a_b");
        let long = "X".repeat(40);
        let first = unique_sheet_name(&long, &mut used);
        let second = unique_sheet_name(&long, &mut used);
        assert_eq!(first.chars().count(), 31);
        assert_eq!(second.chars().count(), 31);
        assert!(second.ends_with("~2"));
    }

    #[test]
    fn test_workbook_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut grid = WeeklyGrid::new();
        grid.push(TimeSlot::new(Day::Tue, Block::AM2), Booking::new("U1", "R1", "P1"));
        let report = ScheduleReport {
            groups: vec![EntityTimetable {
                entity_id: "G1".into(),
                grid,
            }],
            professors: vec![],
            objective_value: None,
        };

        let files = XlsxSink::new(dir.path()).write(&report).unwrap();
        let book = umya_spreadsheet::reader::xlsx::read(&files[0]).unwrap();
        let sheet = book.get_sheet_by_name("Schedule_G1").unwrap();
        assert_eq!(sheet.get_value((1, 1)), "Block");
        assert_eq!(sheet.get_value((7, 1)), "Sat");
        assert_eq!(sheet.get_value((1, 3)), "AM2");
        assert_eq!(sheet.get_value((3, 3)), "U1-R1-P1");
        assert!(files[1].exists());
    }
}
