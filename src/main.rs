use std::process::ExitCode;

use chrono::Utc;

use thunderbird_metrics::cli;
use thunderbird_metrics::config::Config;
use thunderbird_metrics::pipeline;
use thunderbird_metrics::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = cli::check_usage(std::env::args_os()) {
        eprintln!("{e}");
        return ExitCode::from(&e);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(&e);
        }
    };

    let telemetry_guard = match init_telemetry(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize telemetry: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        period = %config.period,
        output_root = %config.output_root.display(),
        collectors_dir = %config.collectors_dir.display(),
        environment = %config.environment,
        "Starting thunderbird-metrics"
    );

    let code = match pipeline::generate_reports(&config, Utc::now()).await {
        Ok(outcome) => {
            tracing::info!(
                period = %outcome.period.display_label,
                reports = outcome.reports.len(),
                manifest = %outcome.manifest.display(),
                "Metrics run complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Metrics run failed");
            eprintln!("Error: {e}");
            ExitCode::from(&e)
        }
    };

    telemetry_guard.shutdown();
    code
}
