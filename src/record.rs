use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One validated service-call row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallRecord {
    pub date: NaiveDate,
    pub service_category: String,
    pub sub_service_category: String,
    /// Trimmed free text; may be empty but the source cell was present.
    pub resolution_text: String,
}

impl CallRecord {
    pub fn new(
        date: NaiveDate,
        service_category: impl Into<String>,
        sub_service_category: impl Into<String>,
        resolution_text: impl Into<String>,
    ) -> Self {
        Self {
            date,
            service_category: service_category.into(),
            sub_service_category: sub_service_category.into(),
            resolution_text: resolution_text.into(),
        }
    }
}

/// Immutable snapshot of one session's records, in source order.
///
/// Ingestion never hands out an empty dataset; `from_records` does not
/// enforce that so callers can build fixtures and degenerate cases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<CallRecord>,
}

impl Dataset {
    pub fn from_records(records: Vec<CallRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CallRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest date, `None` for an empty dataset.
    pub fn date_range(&self) -> Option<DateRangeSummary> {
        let start = self.records.iter().map(|r| r.date).min()?;
        let end = self.records.iter().map(|r| r.date).max()?;
        Some(DateRangeSummary { start, end })
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a CallRecord;
    type IntoIter = std::slice::Iter<'a, CallRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// First and last call date of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Data available from {} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_ignores_row_order() {
        let dataset = Dataset::from_records(vec![
            CallRecord::new(ymd(2024, 5, 2), "A", "a", "x"),
            CallRecord::new(ymd(2024, 1, 9), "A", "a", "y"),
            CallRecord::new(ymd(2024, 3, 1), "B", "b", "z"),
        ]);
        let range = dataset.date_range().unwrap();
        assert_eq!(range.start, ymd(2024, 1, 9));
        assert_eq!(range.end, ymd(2024, 5, 2));
        assert_eq!(range.to_string(), "Data available from 2024-01-09 to 2024-05-02");
    }

    #[test]
    fn test_empty_dataset_has_no_range() {
        assert!(Dataset::default().date_range().is_none());
        assert!(Dataset::default().is_empty());
    }
}
