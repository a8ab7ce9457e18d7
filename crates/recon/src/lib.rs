//! `revsplit-recon`: partner revenue reconciliation pipeline.
//!
//! Pure engine crate: receives parsed workbooks, returns monthly reports.
//! No CLI, filesystem or spreadsheet-format dependencies.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod dates;
pub mod direct;
pub mod domestic;
pub mod engine;
pub mod error;
pub mod header;
pub mod model;
pub mod month;
pub mod sheet;

pub use classify::{classify, SourceKind};
pub use config::ReconConfig;
pub use engine::{route_uploads, run_pipeline, Batch, Rejected, SourceFile};
pub use error::ReconError;
pub use model::{Category, MonthlyReport, Partner, RevenueRow};
pub use month::MonthKey;
pub use sheet::{Cell, Sheet, Workbook};
