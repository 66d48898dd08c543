use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Granularity of a reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl PeriodKind {
    pub const ALL: [PeriodKind; 4] = [
        PeriodKind::Weekly,
        PeriodKind::Monthly,
        PeriodKind::Quarterly,
        PeriodKind::Yearly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PeriodKind::Weekly => "weekly",
            PeriodKind::Monthly => "monthly",
            PeriodKind::Quarterly => "quarterly",
            PeriodKind::Yearly => "yearly",
        }
    }
}

pub(crate) fn quarter_of(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodKind {
    type Err = AppError;

    /// Accepts the kind's name in any case, or the numeric selector used by
    /// the collector scripts (1 = weekly .. 4 = yearly).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" | "week" | "1" => Ok(PeriodKind::Weekly),
            "monthly" | "month" | "2" => Ok(PeriodKind::Monthly),
            "quarterly" | "quarter" | "3" => Ok(PeriodKind::Quarterly),
            "yearly" | "year" | "4" => Ok(PeriodKind::Yearly),
            other => Err(AppError::Configuration(format!(
                "unknown period kind '{other}' (expected weekly, monthly, quarterly or yearly)"
            ))),
        }
    }
}
