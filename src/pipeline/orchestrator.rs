use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use opentelemetry::KeyValue;
use serde::Serialize;
use tokio::fs;

use crate::collectors::CollectorContext;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::period::{ReportingPeriod, compute_period};
use crate::telemetry::metrics::{REPORT_EMAILS_WRITTEN, REPORT_RUN_DURATION};

use super::collect::{format_duration, run_collector};
use super::format::{self, EmailParams, Footer};
use super::groups::{ReportGroup, default_groups};

pub const EMAIL_FILE_NAME: &str = "email.md";
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub output_root: PathBuf,
    pub footer: Footer,
}

impl ReportSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_root: config.output_root.clone(),
            footer: Footer::from_config(config),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WrittenReport {
    pub group: String,
    #[serde(skip)]
    pub path: PathBuf,
    /// Path of the e-mail relative to the period directory.
    pub email: String,
    pub collectors: Vec<String>,
    pub bytes: usize,
}

#[derive(Debug, Serialize)]
struct RunManifest<'a> {
    period: &'a ReportingPeriod,
    reports: &'a [WrittenReport],
}

#[derive(Debug)]
pub struct RunOutcome {
    pub period: ReportingPeriod,
    pub reports: Vec<WrittenReport>,
    pub manifest: PathBuf,
}

/// Computes the period preceding `now` and produces every report e-mail
/// from the bundled collector scripts.
#[tracing::instrument(
    name = "pipeline report",
    skip(config),
    fields(
        period.kind = %config.period,
        report.duration_ms,
    )
)]
pub async fn generate_reports(config: &Config, now: DateTime<Utc>) -> AppResult<RunOutcome> {
    let period = compute_period(now, config.period)?;
    let groups = default_groups(config);
    run(period, &groups, &ReportSettings::from_config(config)).await
}

/// Assembles all groups for `period` and records the run manifest.
pub async fn run(
    period: ReportingPeriod,
    groups: &[ReportGroup],
    settings: &ReportSettings,
) -> AppResult<RunOutcome> {
    let start = Instant::now();

    let reports = assemble_reports(&period, groups, settings).await?;
    let manifest = write_manifest(&settings.output_root, &period, &reports).await?;

    let duration = start.elapsed();
    REPORT_RUN_DURATION.record(
        duration.as_secs_f64(),
        &[KeyValue::new("period.kind", period.kind.to_string())],
    );
    tracing::Span::current().record("report.duration_ms", duration.as_millis() as u64);
    tracing::info!(
        period = %period.display_label,
        reports = reports.len(),
        elapsed = %format_duration(duration),
        "all reports written"
    );

    Ok(RunOutcome {
        period,
        reports,
        manifest,
    })
}

/// Runs every group strictly in order. The first collector failure aborts
/// the run; e-mails already written for earlier groups stay on disk.
#[tracing::instrument(
    name = "pipeline assemble",
    skip(period, groups, settings),
    fields(
        period.directory_label = %period.directory_label,
        report.groups = groups.len(),
    )
)]
pub async fn assemble_reports(
    period: &ReportingPeriod,
    groups: &[ReportGroup],
    settings: &ReportSettings,
) -> AppResult<Vec<WrittenReport>> {
    let period_dir = settings.output_root.join(&period.directory_label);
    let topics: Vec<&str> = groups.iter().map(|g| g.topic.as_str()).collect();

    let mut written = Vec::with_capacity(groups.len());
    for (index, group) in groups.iter().enumerate() {
        let report = assemble_group(
            period,
            &period_dir,
            index,
            group,
            &topics,
            &settings.footer,
        )
        .await?;
        written.push(report);
    }

    Ok(written)
}

#[tracing::instrument(
    name = "pipeline_stage group",
    skip_all,
    fields(
        report.group = %group.name,
        report.number = index + 1,
    )
)]
async fn assemble_group(
    period: &ReportingPeriod,
    period_dir: &Path,
    index: usize,
    group: &ReportGroup,
    topics: &[&str],
    footer: &Footer,
) -> AppResult<WrittenReport> {
    let start = Instant::now();

    let group_dir = period_dir.join(&group.output_subdirectory);
    fs::create_dir_all(&group_dir)
        .await
        .map_err(|e| AppError::filesystem(&group_dir, e))?;

    let ctx = CollectorContext {
        period,
        output_dir: &group_dir,
    };

    let mut fragments = Vec::with_capacity(group.collectors.len());
    for collector in &group.collectors {
        fragments.push(run_collector(collector.as_ref(), &group.name, &ctx).await?);
    }

    let body = format::format_email(EmailParams {
        display_label: &period.display_label,
        group_index: index,
        topics,
        fragments: &fragments,
        footer,
    });

    let path = group_dir.join(EMAIL_FILE_NAME);
    fs::write(&path, body.as_bytes())
        .await
        .map_err(|e| AppError::filesystem(&path, e))?;

    REPORT_EMAILS_WRITTEN.add(1, &[KeyValue::new("report.group", group.name.clone())]);
    tracing::info!(
        group = %group.name,
        path = %path.display(),
        bytes = body.len(),
        elapsed = %format_duration(start.elapsed()),
        "report written"
    );

    Ok(WrittenReport {
        group: group.name.clone(),
        path,
        email: format!("{}/{EMAIL_FILE_NAME}", group.output_subdirectory),
        collectors: group.collector_names(),
        bytes: body.len(),
    })
}

async fn write_manifest(
    output_root: &Path,
    period: &ReportingPeriod,
    reports: &[WrittenReport],
) -> AppResult<PathBuf> {
    let path = output_root
        .join(&period.directory_label)
        .join(MANIFEST_FILE_NAME);

    let mut json = serde_json::to_string_pretty(&RunManifest { period, reports })?;
    json.push('\n');

    fs::write(&path, json)
        .await
        .map_err(|e| AppError::filesystem(&path, e))?;

    Ok(path)
}
