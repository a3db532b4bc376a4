pub mod report_writer;
pub mod run_summary;

pub use report_writer::{render_record, render_to_string, ReportWriter, RECORD_SEPARATOR};
pub use run_summary::RunSummary;
