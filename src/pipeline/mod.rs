// Analysis pipeline: bounded fan-out of per-row remote calls.
//
// row.rs processes a single post and turns any failure into a placeholder.
// analyze.rs schedules rows, reports progress and merges results back into
// input order.

pub mod analyze;
pub mod row;

pub use analyze::{analyze, Analyzer, DEFAULT_CONCURRENCY};
pub use row::{process_row, RowOutcome};
