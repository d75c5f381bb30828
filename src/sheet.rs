//! Sheet Reader - turns decoded upload bytes into a header row plus typed cells
//!
//! Workbooks (xlsx, xlsm, xlsb, xls, ods) go through calamine's format
//! auto-detection; delimited text goes through the csv reader. Only the first
//! worksheet of a workbook is read.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDateTime;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Why an upload could not be turned into a table.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("unsupported or corrupt workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("malformed delimited text: {0}")]
    Delimited(#[from] csv::Error),

    #[error("workbook contains no worksheets")]
    NoWorksheet,

    #[error("file has no header row")]
    NoHeader,
}

/// Container format of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Any spreadsheet calamine can auto-detect.
    Workbook,
    /// Delimited text with the given field separator.
    Delimited(u8),
}

impl ContainerKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "txt" => Some(ContainerKind::Delimited(b',')),
            "tsv" => Some(ContainerKind::Delimited(b'\t')),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "ods" => Some(ContainerKind::Workbook),
            _ => None,
        }
    }

    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type.to_ascii_lowercase().as_str() {
            "text/csv" | "application/csv" | "text/plain" => Some(ContainerKind::Delimited(b',')),
            "text/tab-separated-values" => Some(ContainerKind::Delimited(b'\t')),
            _ => None,
        }
    }
}

/// One cell value. Spreadsheet error cells and blank cells are both `Empty`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Int(*i),
            Data::Float(v) => Cell::Float(*v),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) if dt.is_duration() => Cell::Float(dt.as_f64()),
            Data::DateTime(dt) => dt.as_datetime().map(Cell::DateTime).unwrap_or(Cell::Empty),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }
}

/// A parsed table: the first row is the header, the rest are data rows.
/// Rows may be shorter than the header; missing trailing cells read as `Empty`.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Parse decoded bytes according to `kind`.
    pub fn parse(bytes: &[u8], kind: ContainerKind) -> Result<Self, ReadError> {
        let sheet = match kind {
            ContainerKind::Workbook => Self::from_workbook(bytes)?,
            ContainerKind::Delimited(delimiter) => Self::from_delimited(bytes, delimiter)?,
        };
        debug!(
            "parsed {:?} sheet: {} columns, {} data rows",
            kind,
            sheet.headers.len(),
            sheet.rows.len()
        );
        Ok(sheet)
    }

    fn from_workbook(bytes: &[u8]) -> Result<Self, ReadError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(ReadError::NoWorksheet)??;

        let mut rows = range.rows();
        let headers = rows
            .next()
            .ok_or(ReadError::NoHeader)?
            .iter()
            .map(|cell| Cell::from(cell).to_string())
            .collect();
        let rows = rows
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();

        Ok(Self { headers, rows })
    }

    fn from_delimited(bytes: &[u8], delimiter: u8) -> Result<Self, ReadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(bytes);

        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ReadError::NoHeader);
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|field| {
                        if field.is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(field.to_string())
                        }
                    })
                    .collect(),
            );
        }

        Ok(Self { headers, rows })
    }

    /// Index of the first header equal to `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (`row`, `column`), `Empty` when the row is short.
    pub fn cell<'a>(row: &'a [Cell], column: usize) -> &'a Cell {
        const EMPTY: &Cell = &Cell::Empty;
        row.get(column).unwrap_or(EMPTY)
    }
}
