//! Ingestion - validates an uploaded call sheet into a `Dataset`
//!
//! Pipeline: decode payload -> parse sheet -> locate required columns ->
//! drop rows with any absent required cell or unparseable date -> apply the
//! year floor -> reject if nothing is left.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ColumnNames, IngestConfig};
use crate::dates::coerce_date;
use crate::error::{IngestError, Result};
use crate::payload::RawUploadPayload;
use crate::record::{CallRecord, DateRangeSummary, Dataset};
use crate::sheet::{Cell, Sheet};

/// Row accounting for one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Data rows read from the sheet (header excluded).
    pub rows_read: usize,
    /// Rows dropped because a required cell was absent.
    pub missing_fields: usize,
    /// Rows dropped because the date cell could not be parsed.
    pub unparseable_dates: usize,
    /// Rows dropped because their year is below the floor.
    pub before_floor: usize,
    /// Rows kept in the dataset.
    pub rows_kept: usize,
}

/// Successful ingestion result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    /// `File '<name>' uploaded successfully!`
    pub status: String,
    pub date_range: DateRangeSummary,
    pub dataset: Dataset,
    pub report: IngestReport,
}

/// Ingest with the default column headers and the given year floor.
pub fn ingest(payload: RawUploadPayload, year_floor: i32) -> Result<IngestOutcome> {
    ingest_with_config(payload, &IngestConfig::default().with_year_floor(year_floor))
}

/// Ingest an upload using `config` for the year floor and column headers.
pub fn ingest_with_config(payload: RawUploadPayload, config: &IngestConfig) -> Result<IngestOutcome> {
    let RawUploadPayload { filename, .. } = &payload;
    let kind = payload.container_kind();

    let bytes = payload.decode().map_err(|source| {
        warn!("could not decode upload '{}': {}", filename, source);
        IngestError::Unreadable {
            filename: filename.clone(),
            source,
        }
    })?;
    debug!("decoded '{}': {} bytes as {:?}", filename, bytes.len(), kind);

    let sheet = Sheet::parse(&bytes, kind).map_err(|source| {
        warn!("could not parse upload '{}': {}", filename, source);
        IngestError::Unreadable {
            filename: filename.clone(),
            source,
        }
    })?;

    let columns = locate_columns(&sheet, &config.columns).map_err(|missing| {
        warn!("upload '{}' is missing columns {:?}", filename, missing);
        IngestError::SchemaMismatch {
            filename: filename.clone(),
            missing,
        }
    })?;

    let (records, report) = project_rows(&sheet, columns, config.year_floor);
    info!(
        "upload '{}': read {} rows, kept {} (missing fields {}, bad dates {}, before {} {})",
        filename,
        report.rows_read,
        report.rows_kept,
        report.missing_fields,
        report.unparseable_dates,
        config.year_floor,
        report.before_floor
    );

    let dataset = Dataset::from_records(records);
    let Some(date_range) = dataset.date_range() else {
        return Err(IngestError::NoAcceptableRows {
            filename: filename.clone(),
            year_floor: config.year_floor,
        });
    };

    Ok(IngestOutcome {
        status: format!("File '{}' uploaded successfully!", filename),
        date_range,
        dataset,
        report,
    })
}

/// Column positions of the required fields in the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndices {
    date: usize,
    category: usize,
    sub_category: usize,
    resolution: usize,
}

fn locate_columns(sheet: &Sheet, names: &ColumnNames) -> std::result::Result<ColumnIndices, Vec<String>> {
    let found: Vec<(&str, Option<usize>)> = names
        .required()
        .into_iter()
        .map(|name| (name, sheet.column_index(name)))
        .collect();

    let missing: Vec<String> = found
        .iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    let idx = |i: usize| found[i].1.unwrap_or_default();
    Ok(ColumnIndices {
        date: idx(0),
        category: idx(1),
        sub_category: idx(2),
        resolution: idx(3),
    })
}

fn project_rows(sheet: &Sheet, columns: ColumnIndices, year_floor: i32) -> (Vec<CallRecord>, IngestReport) {
    let mut report = IngestReport {
        rows_read: sheet.rows.len(),
        ..IngestReport::default()
    };
    let mut records = Vec::with_capacity(sheet.rows.len());

    for row in &sheet.rows {
        let date_cell = Sheet::cell(row, columns.date);
        let category = required_label(Sheet::cell(row, columns.category));
        let sub_category = required_label(Sheet::cell(row, columns.sub_category));
        let resolution = trimmed_text(Sheet::cell(row, columns.resolution));

        let (Some(category), Some(sub_category), Some(resolution)) = (category, sub_category, resolution) else {
            report.missing_fields += 1;
            continue;
        };
        if date_cell.is_empty() {
            report.missing_fields += 1;
            continue;
        }

        let Some(date) = coerce_date(date_cell) else {
            report.unparseable_dates += 1;
            continue;
        };
        if date.year() < year_floor {
            report.before_floor += 1;
            continue;
        }

        records.push(CallRecord {
            date,
            service_category: category,
            sub_service_category: sub_category,
            resolution_text: resolution,
        });
    }

    report.rows_kept = records.len();
    (records, report)
}

/// Category labels must be non-empty once trimmed.
fn required_label(cell: &Cell) -> Option<String> {
    trimmed_text(cell).filter(|s| !s.is_empty())
}

/// Display text of a present cell, trimmed. `None` for an absent cell.
fn trimmed_text(cell: &Cell) -> Option<String> {
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string().trim().to_string())
    }
}
