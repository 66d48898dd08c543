pub mod collect;
pub mod format;
pub mod groups;
pub mod orchestrator;

pub use groups::{ReportGroup, default_groups};
pub use orchestrator::{
    ReportSettings, RunOutcome, WrittenReport, assemble_reports, generate_reports, run,
};
