//! Aggregation Engine - KPIs, chart series and drill-down list for one filter
//!
//! Every call is a full pass over the dataset. Output depends only on the
//! dataset and the filter, so repeating a request yields an identical result.

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::filter::{restrict, FilterState};
use crate::record::{CallRecord, Dataset};
use crate::terms::term_frequencies;

/// Shown in place of the resolution list when there is nothing to summarise.
pub const NO_DATA_MESSAGE: &str = "No data available";

/// Upper bound on the number of resolution terms returned.
pub const MAX_RESOLUTION_TERMS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataStatus {
    Ready,
    NoData,
}

/// Calls observed on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub count: usize,
}

/// A label with its row count, used for the pie and bar charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub label: String,
    pub count: usize,
}

/// Everything a renderer needs for one dashboard refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub status: DataStatus,
    pub total_calls: usize,
    pub service_categories: usize,
    pub sub_categories: usize,
    /// Mean of the per-date row counts, rounded to two decimals.
    pub avg_calls_per_day: f64,
    /// Ascending by date; only dates with calls appear.
    pub calls_over_time: Vec<TimePoint>,
    /// Whole-dataset distribution, independent of the filter.
    pub category_breakdown: Vec<CountEntry>,
    pub sub_category_breakdown: Vec<CountEntry>,
    /// Distinct resolution texts in first-seen order.
    pub resolutions: Vec<String>,
    pub resolution_terms: Vec<CountEntry>,
}

/// Scalar KPI strings for the four dashboard cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiLabels {
    pub total_calls: String,
    pub service_categories: String,
    pub sub_categories: String,
    pub avg_calls_per_day: String,
}

impl AggregateResult {
    /// Degenerate result for an empty dataset or a session without data.
    pub fn no_data() -> Self {
        Self {
            status: DataStatus::NoData,
            total_calls: 0,
            service_categories: 0,
            sub_categories: 0,
            avg_calls_per_day: 0.0,
            calls_over_time: Vec::new(),
            category_breakdown: Vec::new(),
            sub_category_breakdown: Vec::new(),
            resolutions: Vec::new(),
            resolution_terms: Vec::new(),
        }
    }

    pub fn has_data(&self) -> bool {
        self.status == DataStatus::Ready
    }

    /// `None` when data is available, otherwise the placeholder message.
    pub fn no_data_message(&self) -> Option<&'static str> {
        match self.status {
            DataStatus::Ready => None,
            DataStatus::NoData => Some(NO_DATA_MESSAGE),
        }
    }

    pub fn kpi_labels(&self) -> KpiLabels {
        KpiLabels {
            total_calls: self.total_calls.to_string(),
            service_categories: self.service_categories.to_string(),
            sub_categories: self.sub_categories.to_string(),
            avg_calls_per_day: format!("{:.2}", self.avg_calls_per_day),
        }
    }
}

/// Compute the dashboard for `dataset` under `filter`.
///
/// Category narrowing (click, else multi-select) applies to the KPIs, the
/// time series, the sub-category chart and the resolution list. The category
/// chart always covers the full dataset. The sub-category click narrows the
/// resolution list only.
pub fn aggregate(dataset: &Dataset, filter: &FilterState) -> AggregateResult {
    if dataset.is_empty() {
        debug!("aggregate: empty dataset");
        return AggregateResult::no_data();
    }

    let selection = filter.category_selection();
    let scoped = restrict(dataset, |r| selection.admits(&r.service_category));

    let per_date = count_per_date(&scoped);
    let avg_calls_per_day = average_per_day(scoped.len(), per_date.len());

    let category_breakdown = count_by(dataset.iter(), |r| r.service_category.as_str());
    let sub_category_breakdown = count_by(scoped.iter().copied(), |r| r.sub_service_category.as_str());

    let drilled = match filter.sub_category() {
        Some(sub) => restrict(scoped.iter().copied(), |r| r.sub_service_category == sub),
        None => scoped.clone(),
    };
    let resolutions: Vec<String> = drilled
        .iter()
        .map(|r| r.resolution_text.as_str())
        .unique()
        .map(str::to_string)
        .collect();

    let resolution_terms = term_frequencies(
        scoped.iter().map(|r| r.resolution_text.as_str()),
        MAX_RESOLUTION_TERMS,
    );

    debug!(
        "aggregate: {:?} -> {} of {} rows, {} resolutions",
        selection,
        scoped.len(),
        dataset.len(),
        resolutions.len()
    );

    AggregateResult {
        status: DataStatus::Ready,
        total_calls: scoped.len(),
        service_categories: distinct(&scoped, |r| r.service_category.as_str()),
        sub_categories: distinct(&scoped, |r| r.sub_service_category.as_str()),
        avg_calls_per_day,
        calls_over_time: per_date
            .into_iter()
            .map(|(date, count)| TimePoint { date, count })
            .collect(),
        category_breakdown,
        sub_category_breakdown,
        resolutions,
        resolution_terms,
    }
}

/// `rows / days` rounded half away from zero to two decimal places.
///
/// The hundredths are worked out on the integer counts so exact halves such
/// as 1.005 round up instead of drifting with float error. Zero days is `0.0`.
pub fn average_per_day(rows: usize, days: usize) -> f64 {
    if days == 0 {
        return 0.0;
    }
    let cents = (200 * rows + days) / (2 * days);
    cents as f64 / 100.0
}

fn count_per_date(records: &[&CallRecord]) -> BTreeMap<NaiveDate, usize> {
    let mut per_date = BTreeMap::new();
    for record in records {
        *per_date.entry(record.date).or_insert(0) += 1;
    }
    per_date
}

fn distinct<'a, F>(records: &[&'a CallRecord], key: F) -> usize
where
    F: Fn(&'a CallRecord) -> &'a str,
{
    records.iter().map(|r| key(*r)).collect::<HashSet<_>>().len()
}

/// Count rows per key, most frequent first; ties keep first-seen order.
fn count_by<'a, I, F>(records: I, key: F) -> Vec<CountEntry>
where
    I: IntoIterator<Item = &'a CallRecord>,
    F: Fn(&'a CallRecord) -> &'a str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<CountEntry> = Vec::new();
    for record in records {
        let label = key(record);
        match index.get(label) {
            Some(&slot) => entries[slot].count += 1,
            None => {
                index.insert(label, entries.len());
                entries.push(CountEntry {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}
