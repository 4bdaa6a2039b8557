//! `billdiff-recon`: two-dataset line-item reconciliation engine.
//!
//! Pure engine crate: receives raw delimited text, returns a classified
//! account → item diff and its flattened report. No CLI or IO dependencies.

pub mod aggregate;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod group;
pub mod materialize;
pub mod model;
pub mod numeric;
pub mod report;
pub mod session;
pub mod summary;

pub use config::ReconConfig;
pub use engine::{diff, run};
pub use error::ReconError;
pub use materialize::{Dataset, RawRecord};
pub use model::{CompanyDiff, DiffEntry, DiffResult, DiffStatus, Side};
pub use report::{flatten, Report, ReportRow};
pub use session::ReconSession;
