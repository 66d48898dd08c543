use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::LazyLock;

pub static METER: LazyLock<Meter> = LazyLock::new(|| global::meter("thunderbird-metrics"));

// --- Collector Metrics ---

pub static COLLECTOR_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("collector.invocation.duration")
        .with_description("Wall-clock duration of a single collector invocation")
        .with_unit("s")
        .with_boundaries(vec![
            1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0, 3600.0,
        ])
        .build()
});

pub static COLLECTOR_FAILURES: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("collector.failures")
        .with_description("Number of collector invocations that failed")
        .with_unit("{failure}")
        .build()
});

// --- Report Metrics ---

pub static REPORT_EMAILS_WRITTEN: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("report.emails.written")
        .with_description("Number of report e-mail bodies written")
        .with_unit("{email}")
        .build()
});

pub static REPORT_RUN_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("report.run.duration")
        .with_description("Total duration of a complete metrics run in seconds")
        .with_unit("s")
        .build()
});
