//! Filter State - narrowing criteria assembled from one interaction event

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::record::{CallRecord, Dataset};

/// Multi-select value meaning "do not narrow by category".
pub const ALL_CATEGORIES: &str = "All";

/// Active narrowing for one aggregation request.
///
/// Absent fields impose no constraint. A category chart click overrides the
/// multi-select list; the sub-category click only narrows the resolution list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_click: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category_click: Option<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_category_click(mut self, label: impl Into<String>) -> Self {
        self.category_click = Some(label.into());
        self
    }

    pub fn with_sub_category_click(mut self, label: impl Into<String>) -> Self {
        self.sub_category_click = Some(label.into());
        self
    }

    /// Assemble a filter from whichever signals accompany an event.
    pub fn from_events(
        categories: Option<Vec<String>>,
        category_click: Option<&ChartClick>,
        sub_category_click: Option<&ChartClick>,
    ) -> Self {
        Self {
            categories,
            category_click: category_click.and_then(ChartClick::label).map(str::to_string),
            sub_category_click: sub_category_click.and_then(ChartClick::label).map(str::to_string),
        }
    }

    /// Resolve the category constraint: click beats list, and a list that is
    /// empty or contains `All` is no constraint.
    pub fn category_selection(&self) -> CategorySelection<'_> {
        if let Some(label) = self.category_click.as_deref() {
            return CategorySelection::Single(label);
        }
        match self.categories.as_deref() {
            None | Some([]) => CategorySelection::Everything,
            Some(list) if list.iter().any(|c| c == ALL_CATEGORIES) => CategorySelection::Everything,
            Some(list) => CategorySelection::AnyOf(list.iter().map(String::as_str).collect()),
        }
    }

    pub fn sub_category(&self) -> Option<&str> {
        self.sub_category_click.as_deref()
    }
}

/// Resolved category constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySelection<'a> {
    Everything,
    Single(&'a str),
    AnyOf(HashSet<&'a str>),
}

impl CategorySelection<'_> {
    pub fn admits(&self, category: &str) -> bool {
        match self {
            CategorySelection::Everything => true,
            CategorySelection::Single(label) => *label == category,
            CategorySelection::AnyOf(set) => set.contains(category),
        }
    }
}

/// Keep the records matching `keep`, preserving order.
pub fn restrict<'a, I, F>(records: I, mut keep: F) -> Vec<&'a CallRecord>
where
    I: IntoIterator<Item = &'a CallRecord>,
    F: FnMut(&CallRecord) -> bool,
{
    records.into_iter().filter(|r| keep(*r)).collect()
}

/// Chart click event: `{"points": [{"label": "...", ...}, ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartClick {
    #[serde(default)]
    pub points: Vec<ClickPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClickPoint {
    #[serde(default)]
    pub label: Option<String>,
}

impl ChartClick {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn for_label(label: impl Into<String>) -> Self {
        Self {
            points: vec![ClickPoint {
                label: Some(label.into()),
            }],
        }
    }

    /// Label of the first clicked point.
    pub fn label(&self) -> Option<&str> {
        self.points.first()?.label.as_deref()
    }
}

/// Options for the category multi-select: `All` then each category in
/// first-seen order.
pub fn category_options(dataset: &Dataset) -> Vec<String> {
    std::iter::once(ALL_CATEGORIES.to_string())
        .chain(
            dataset
                .iter()
                .map(|r| r.service_category.as_str())
                .unique()
                .map(str::to_string),
        )
        .collect()
}
