pub mod aggregate;
pub mod config;
pub mod dates;
pub mod error;
pub mod filter;
pub mod ingestion;
pub mod payload;
pub mod record;
pub mod session;
pub mod sheet;
pub mod terms;

pub use aggregate::{aggregate, AggregateResult, CountEntry, DataStatus, KpiLabels, TimePoint};
pub use config::{ColumnNames, IngestConfig, DEFAULT_YEAR_FLOOR};
pub use error::{IngestError, Result};
pub use filter::{category_options, CategorySelection, ChartClick, FilterState, ALL_CATEGORIES};
pub use ingestion::{ingest, ingest_with_config, IngestOutcome, IngestReport};
pub use payload::RawUploadPayload;
pub use record::{CallRecord, DateRangeSummary, Dataset};
pub use session::{Session, UploadResponse};
pub use sheet::{ContainerKind, ReadError};
