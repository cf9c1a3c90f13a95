//! Workbook persistence and the row-level operations on it.
//!
//! Columns are addressed by header name, not position, so a workbook
//! that was reordered or extended by hand still reads back correctly.

use std::collections::HashSet;
use std::path::Path;

use crate::error::ScraperError;
use crate::kbo::FunctionRecord;

/// Column order of a freshly written sheet.
pub const COLUMNS: [&str; 7] = [
    "company_number",
    "company_name",
    "email",
    "function_title",
    "first_name",
    "last_name",
    "person_company_number",
];

const SHEET_NAME: &str = "Sheet1";

fn column_letter(index: usize) -> char {
    (b'A' + index as u8) as char
}

fn record_fields(record: &FunctionRecord) -> [&str; 7] {
    [
        record.company_number.as_str(),
        record.company_name.as_str(),
        record.email.as_str(),
        record.function_title.as_str(),
        record.first_name.as_str(),
        record.last_name.as_str(),
        record.person_company_number.as_str(),
    ]
}

/// Write records to a fresh workbook at `path`, header row first.
pub fn write_records(path: &Path, records: &[FunctionRecord]) -> Result<(), ScraperError> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book
        .get_sheet_by_name_mut(SHEET_NAME)
        .ok_or_else(|| ScraperError::Workbook("default sheet missing".to_string()))?;

    for (index, name) in COLUMNS.iter().enumerate() {
        sheet
            .get_cell_mut(format!("{}1", column_letter(index)))
            .set_value(*name);
    }

    for (row_index, record) in records.iter().enumerate() {
        let row = row_index + 2;
        for (col_index, value) in record_fields(record).iter().enumerate() {
            // set_value would type number-like strings as numeric cells
            // and lose the leading zero of enterprise numbers
            sheet
                .get_cell_mut(format!("{}{}", column_letter(col_index), row))
                .set_value_string(*value);
        }
    }

    umya_spreadsheet::writer::xlsx::write(&book, path)
        .map_err(|e| ScraperError::Workbook(e.to_string()))?;
    Ok(())
}

/// Read records back from the first sheet of the workbook at `path`.
///
/// The header row is scanned for every expected column name; rows whose
/// cells are all empty are skipped.
pub fn read_records(path: &Path) -> Result<Vec<FunctionRecord>, ScraperError> {
    let book = umya_spreadsheet::reader::xlsx::read(path)
        .map_err(|e| ScraperError::Workbook(e.to_string()))?;
    let sheet = book
        .get_sheet(&0)
        .ok_or_else(|| ScraperError::Workbook("workbook has no sheets".to_string()))?;

    let (max_col, max_row) = sheet.get_highest_column_and_row();

    let mut positions = [0u32; COLUMNS.len()];
    for (index, name) in COLUMNS.iter().enumerate() {
        let found = (1..=max_col).find(|col| sheet.get_value((*col, 1u32)).trim() == *name);
        positions[index] =
            found.ok_or_else(|| ScraperError::MissingColumn(name.to_string()))?;
    }

    let mut records = Vec::new();
    for row in 2..=max_row {
        let fields: Vec<String> = positions
            .iter()
            .map(|col| sheet.get_value((*col, row)).trim().to_string())
            .collect();

        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }

        records.push(FunctionRecord {
            company_number: fields[0].clone(),
            company_name: fields[1].clone(),
            email: fields[2].clone(),
            function_title: fields[3].clone(),
            first_name: fields[4].clone(),
            last_name: fields[5].clone(),
            person_company_number: fields[6].clone(),
        });
    }

    Ok(records)
}

/// Numbers worth a follow-up lookup: rows with no person name at all
/// but a linked company number. First occurrence wins, order preserved.
pub fn requeue_numbers(records: &[FunctionRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut numbers = Vec::new();

    for record in records {
        if !record.first_name.is_empty() || !record.last_name.is_empty() {
            continue;
        }
        if record.person_company_number.is_empty() {
            continue;
        }
        if seen.insert(record.person_company_number.clone()) {
            numbers.push(record.person_company_number.clone());
        }
    }

    numbers
}

/// Row counts before and after a cleaning pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanSummary {
    pub original: usize,
    pub removed: usize,
    pub remaining: usize,
}

/// Drop rows whose function title contains `pattern`, case insensitive.
/// Rows without a title never match.
pub fn drop_matching_titles(
    records: Vec<FunctionRecord>,
    pattern: &str,
) -> (Vec<FunctionRecord>, CleanSummary) {
    let original = records.len();
    let needle = pattern.to_lowercase();

    let kept: Vec<FunctionRecord> = records
        .into_iter()
        .filter(|record| {
            record.function_title.is_empty()
                || !record.function_title.to_lowercase().contains(&needle)
        })
        .collect();

    let summary = CleanSummary {
        original,
        removed: original - kept.len(),
        remaining: kept.len(),
    };
    (kept, summary)
}
