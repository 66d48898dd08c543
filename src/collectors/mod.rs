pub mod script;

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::period::ReportingPeriod;

pub use script::ScriptCollector;

/// Everything a collector learns about the run. Passed explicitly to every
/// invocation instead of being read from ambient process state.
#[derive(Debug, Clone, Copy)]
pub struct CollectorContext<'a> {
    pub period: &'a ReportingPeriod,
    pub output_dir: &'a Path,
}

impl CollectorContext<'_> {
    pub fn data_as_of(&self) -> DateTime<Utc> {
        self.period.reference
    }

    /// Variables handed to external collector processes. The names differ
    /// from the binary's own configuration variables.
    /// Configuration variables of the binary itself, cleared from the child
    /// environment so a collector never sees them.
    pub const PARENT_ONLY_VARS: [&'static str; 2] = ["METRICS_PERIOD", "METRICS_OUTPUT_DIR"];

    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("METRICS_PERIOD_KIND", self.period.kind.to_string()),
            ("METRICS_PERIOD_LABEL", self.period.display_label.clone()),
            ("METRICS_PERIOD_DIRECTORY", self.period.directory_label.clone()),
            ("METRICS_WINDOW_START", self.period.window_start.to_string()),
            ("METRICS_WINDOW_END", self.period.window_end.to_string()),
            (
                "METRICS_DATA_AS_OF",
                self.data_as_of().to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("METRICS_GROUP_DIR", self.output_dir.display().to_string()),
        ]
    }
}

/// A source of one Markdown fragment of a report e-mail. Implementations may
/// drop artifacts (CSV, charts) into `ctx.output_dir` as a side effect.
#[async_trait::async_trait]
pub trait Collector: Send + Sync {
    async fn collect(&self, ctx: &CollectorContext<'_>) -> anyhow::Result<String>;
    fn name(&self) -> &str;
}
