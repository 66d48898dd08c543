pub mod kind;
pub mod window;

pub use kind::PeriodKind;
pub use window::{ReportingPeriod, compute_period};
