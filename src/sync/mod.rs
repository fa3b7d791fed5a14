/// Batch import and whole-run orchestration

pub mod importer;
pub mod report;
pub mod runner;

pub use importer::Importer;
pub use report::{BatchOutcome, BatchReport, BatchSummary, RunReport, RunStatus};
pub use runner::{CollectionFilter, FirstBatchLedger, SyncRunner};
