//! Session - per-user holder of the current dataset
//!
//! The host creates one `Session` per user session. Uploads replace the
//! dataset wholesale on success and leave it untouched on failure; refreshes
//! always read the dataset of the latest successful upload.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregate::{aggregate, AggregateResult};
use crate::config::IngestConfig;
use crate::filter::{category_options, FilterState};
use crate::ingestion::{ingest_with_config, IngestReport};
use crate::payload::RawUploadPayload;
use crate::record::Dataset;

/// Status shown before anything has been uploaded.
pub const NO_UPLOAD_MESSAGE: &str = "No file uploaded yet.";

/// What the upload widget displays after an upload event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    /// `Data available from ...`, empty when the upload was not accepted.
    pub date_range: String,
    pub accepted: bool,
    /// Multi-select options for the dataset now in effect.
    pub category_options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<IngestReport>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    config: IngestConfig,
    dataset: Option<Dataset>,
    date_range: String,
}

impl Session {
    pub fn new(config: IngestConfig) -> Self {
        Self {
            config,
            dataset: None,
            date_range: String::new(),
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Date range line for the dataset currently in effect.
    pub fn date_range(&self) -> &str {
        &self.date_range
    }

    /// Handle an upload event. `None` means the widget fired without a file.
    pub fn upload(&mut self, payload: Option<RawUploadPayload>) -> UploadResponse {
        let Some(payload) = payload else {
            return UploadResponse {
                status: NO_UPLOAD_MESSAGE.to_string(),
                date_range: String::new(),
                accepted: false,
                category_options: self.category_options(),
                report: None,
            };
        };

        match ingest_with_config(payload, &self.config) {
            Ok(outcome) => {
                info!("session dataset replaced: {} rows", outcome.dataset.len());
                let date_range = outcome.date_range.to_string();
                self.date_range = date_range.clone();
                self.dataset = Some(outcome.dataset);
                UploadResponse {
                    status: outcome.status,
                    date_range,
                    accepted: true,
                    category_options: self.category_options(),
                    report: Some(outcome.report),
                }
            }
            Err(err) => {
                warn!("upload '{}' rejected, keeping previous dataset: {}", err.filename(), err);
                UploadResponse {
                    status: err.status_message(),
                    date_range: String::new(),
                    accepted: false,
                    category_options: self.category_options(),
                    report: None,
                }
            }
        }
    }

    /// Recompute the dashboard for `filter` against the current dataset.
    pub fn refresh(&self, filter: &FilterState) -> AggregateResult {
        match &self.dataset {
            Some(dataset) => aggregate(dataset, filter),
            None => AggregateResult::no_data(),
        }
    }

    pub fn category_options(&self) -> Vec<String> {
        self.dataset.as_ref().map(category_options).unwrap_or_default()
    }
}
