//! Ingestion configuration - accepted year floor and required column headers

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::warn;

/// Rows dated before this year are discarded unless configured otherwise.
pub const DEFAULT_YEAR_FLOOR: i32 = 2024;

pub const ENV_YEAR_FLOOR: &str = "CALLBOARD_YEAR_FLOOR";
pub const ENV_DATE_COLUMN: &str = "CALLBOARD_DATE_COLUMN";
pub const ENV_CATEGORY_COLUMN: &str = "CALLBOARD_CATEGORY_COLUMN";
pub const ENV_SUB_CATEGORY_COLUMN: &str = "CALLBOARD_SUB_CATEGORY_COLUMN";
pub const ENV_RESOLUTION_COLUMN: &str = "CALLBOARD_RESOLUTION_COLUMN";

/// Header names of the four required columns. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    pub date: String,
    pub category: String,
    pub sub_category: String,
    pub resolution: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: "DATE".to_string(),
            category: "SERVICE CATEGORY".to_string(),
            sub_category: "SERVICE- SUB CATEGORY".to_string(),
            resolution: "DESCRIPTION / RESOLUTION".to_string(),
        }
    }
}

impl ColumnNames {
    /// Required headers in projection order: date, category, sub-category, resolution.
    pub fn required(&self) -> [&str; 4] {
        [
            self.date.as_str(),
            self.category.as_str(),
            self.sub_category.as_str(),
            self.resolution.as_str(),
        ]
    }
}

/// Settings for one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Minimum accepted calendar year (inclusive).
    pub year_floor: i32,
    #[serde(default)]
    pub columns: ColumnNames,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            year_floor: DEFAULT_YEAR_FLOOR,
            columns: ColumnNames::default(),
        }
    }
}

impl IngestConfig {
    pub fn with_year_floor(mut self, year_floor: i32) -> Self {
        self.year_floor = year_floor;
        self
    }

    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }

    /// Build a config from the process environment. The host loads `.env`
    /// before calling this.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys keep their
    /// defaults; unparseable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(floor) = parse_var::<i32>(&lookup, ENV_YEAR_FLOOR) {
            config.year_floor = floor;
        }

        let columns = &mut config.columns;
        for (key, slot) in [
            (ENV_DATE_COLUMN, &mut columns.date),
            (ENV_CATEGORY_COLUMN, &mut columns.category),
            (ENV_SUB_CATEGORY_COLUMN, &mut columns.sub_category),
            (ENV_RESOLUTION_COLUMN, &mut columns.resolution),
        ] {
            match lookup(key) {
                Some(value) if !value.is_empty() => *slot = value,
                Some(_) => warn!("{} is empty, keeping '{}'", key, slot),
                None => {}
            }
        }

        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}
