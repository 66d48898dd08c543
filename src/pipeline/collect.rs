use std::time::{Duration, Instant};

use opentelemetry::KeyValue;

use crate::collectors::{Collector, CollectorContext};
use crate::error::{AppError, AppResult};
use crate::telemetry::metrics::{COLLECTOR_DURATION, COLLECTOR_FAILURES};

/// Runs one collector to completion. Elapsed time goes to the logs and
/// metrics only, never into the fragment.
#[tracing::instrument(
    name = "pipeline_stage collect",
    skip(collector, ctx),
    fields(
        collector.name = %collector.name(),
        report.group = %group,
        collector.duration_ms,
        collector.bytes,
    )
)]
pub async fn run_collector(
    collector: &dyn Collector,
    group: &str,
    ctx: &CollectorContext<'_>,
) -> AppResult<String> {
    let start = Instant::now();
    let result = collector.collect(ctx).await;
    let elapsed = start.elapsed();

    let labels = [
        KeyValue::new("collector.name", collector.name().to_string()),
        KeyValue::new("report.group", group.to_string()),
    ];
    COLLECTOR_DURATION.record(elapsed.as_secs_f64(), &labels);

    let span = tracing::Span::current();
    span.record("collector.duration_ms", elapsed.as_millis() as u64);

    match result {
        Ok(fragment) => {
            span.record("collector.bytes", fragment.len());
            tracing::info!(
                collector = %collector.name(),
                elapsed = %format_duration(elapsed),
                bytes = fragment.len(),
                "collector finished"
            );
            Ok(fragment)
        }
        Err(e) => {
            COLLECTOR_FAILURES.add(1, &labels);
            tracing::error!(
                collector = %collector.name(),
                elapsed = %format_duration(elapsed),
                error = %format!("{e:#}"),
                "collector failed"
            );
            Err(AppError::Collector {
                collector: collector.name().to_string(),
                reason: format!("{e:#}"),
            })
        }
    }
}

/// "1 hour, 0 minutes, 5 seconds". Once a unit is non-zero every smaller
/// unit down to seconds is listed as well. Milliseconds are only shown for
/// durations under a minute.
pub fn format_duration(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (days, rest) = (total / 86_400, total % 86_400);
    let (years, days) = (days / 365, days % 365);
    let (hours, rest) = (rest / 3_600, rest % 3_600);
    let (minutes, seconds) = (rest / 60, rest % 60);
    let millis = u64::from(elapsed.subsec_millis());

    let mut parts: Vec<String> = [
        (years, "year"),
        (days, "day"),
        (hours, "hour"),
        (minutes, "minute"),
        (seconds, "second"),
    ]
    .into_iter()
    .skip_while(|(value, _)| *value == 0)
    .map(|(value, unit)| plural(value, unit))
    .collect();

    if total < 60 {
        parts.push(plural(millis, "millisecond"));
    }
    parts.join(", ")
}

fn plural(value: u64, unit: &str) -> String {
    format!("{value} {unit}{}", if value == 1 { "" } else { "s" })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::period::{PeriodKind, compute_period};

    struct Fixed(&'static str, anyhow::Result<&'static str>);

    #[async_trait::async_trait]
    impl Collector for Fixed {
        async fn collect(&self, _ctx: &CollectorContext<'_>) -> anyhow::Result<String> {
            match &self.1 {
                Ok(text) => Ok(text.to_string()),
                Err(e) => Err(anyhow::anyhow!("{e}").context("rate limited")),
            }
        }

        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(5)), "5 seconds, 0 milliseconds");
        assert_eq!(format_duration(Duration::from_secs(1)), "1 second, 0 milliseconds");
        assert_eq!(format_duration(Duration::from_secs(65)), "1 minute, 5 seconds");
        assert_eq!(
            format_duration(Duration::from_secs(3_600)),
            "1 hour, 0 minutes, 0 seconds"
        );
        assert_eq!(
            format_duration(Duration::from_secs(400 * 86_400 + 61)),
            "1 year, 35 days, 0 hours, 1 minute, 1 second"
        );
    }

    #[test]
    fn test_format_duration_shows_milliseconds_under_a_minute() {
        assert_eq!(
            format_duration(Duration::from_millis(5_250)),
            "5 seconds, 250 milliseconds"
        );
        assert_eq!(format_duration(Duration::from_millis(250)), "250 milliseconds");
        assert_eq!(format_duration(Duration::from_millis(1)), "1 millisecond");
        assert_eq!(format_duration(Duration::ZERO), "0 milliseconds");
        assert_eq!(
            format_duration(Duration::from_millis(59_999)),
            "59 seconds, 999 milliseconds"
        );
        assert_eq!(format_duration(Duration::from_millis(60_500)), "1 minute, 0 seconds");
    }

    #[tokio::test]
    async fn test_run_collector_returns_fragment() {
        let now = Utc.with_ymd_and_hms(2025, 7, 10, 0, 0, 0).unwrap();
        let period = compute_period(now, PeriodKind::Monthly).unwrap();
        let ctx = CollectorContext {
            period: &period,
            output_dir: Path::new("."),
        };

        let fragment = run_collector(&Fixed("github", Ok("GitHub stats here")), "github", &ctx)
            .await
            .unwrap();
        assert_eq!(fragment, "GitHub stats here");
    }

    #[tokio::test]
    async fn test_run_collector_tags_failure_with_name() {
        let now = Utc.with_ymd_and_hms(2025, 7, 10, 0, 0, 0).unwrap();
        let period = compute_period(now, PeriodKind::Monthly).unwrap();
        let ctx = CollectorContext {
            period: &period,
            output_dir: Path::new("."),
        };

        let err = run_collector(
            &Fixed("sumo", Err(anyhow::anyhow!("HTTP 429"))),
            "support",
            &ctx,
        )
        .await
        .unwrap_err();

        match err {
            AppError::Collector { collector, reason } => {
                assert_eq!(collector, "sumo");
                assert_eq!(reason, "rate limited: HTTP 429");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
