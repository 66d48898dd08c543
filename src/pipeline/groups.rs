use std::sync::Arc;

use crate::collectors::{Collector, ScriptCollector};
use crate::config::Config;

/// One e-mail's worth of collectors.
pub struct ReportGroup {
    pub name: String,
    pub output_subdirectory: String,
    pub topic: String,
    pub collectors: Vec<Arc<dyn Collector>>,
}

impl ReportGroup {
    pub fn new(name: &str, topic: &str, collectors: Vec<Arc<dyn Collector>>) -> Self {
        Self {
            name: name.to_string(),
            output_subdirectory: name.to_string(),
            topic: topic.to_string(),
            collectors,
        }
    }

    pub fn collector_names(&self) -> Vec<String> {
        self.collectors.iter().map(|c| c.name().to_string()).collect()
    }
}

pub struct GroupDefinition {
    pub name: &'static str,
    pub topic: &'static str,
    pub collectors: &'static [&'static str],
}

// Order is significant: it is the e-mail numbering.
pub const GROUP_DEFINITIONS: [GroupDefinition; 6] = [
    GroupDefinition {
        name: "bugzilla",
        topic: "Bugzilla/BMO, Phabricator, Crash Stats and Code Coverage",
        collectors: &["bugzilla", "crash_stats", "code_coverage"],
    },
    GroupDefinition {
        name: "github",
        topic: "GitHub",
        collectors: &["github"],
    },
    GroupDefinition {
        name: "mozilla_connect",
        topic: "Mozilla Connect, Thunderbird Pro Ideas and Thunderbird Stats",
        collectors: &["mozilla_connect", "pro_ideas", "stats"],
    },
    GroupDefinition {
        name: "addons",
        topic: "Thunderbird Add-ons/ATN",
        collectors: &["addons"],
    },
    GroupDefinition {
        name: "support",
        topic: "Mozilla Support/SUMO, Topicbox and Mozilla Discourse",
        collectors: &["sumo", "topicbox", "discourse"],
    },
    GroupDefinition {
        name: "localization",
        topic: "Pontoon and Weblate Localization",
        collectors: &["pontoon", "weblate"],
    },
];

/// The six report groups backed by the collector scripts in
/// `config.collectors_dir`.
pub fn default_groups(config: &Config) -> Vec<ReportGroup> {
    GROUP_DEFINITIONS
        .iter()
        .map(|def| {
            let collectors = def
                .collectors
                .iter()
                .map(|name| {
                    Arc::new(ScriptCollector::interpreted(
                        *name,
                        &config.interpreter,
                        config.collectors_dir.join(format!("{name}.py")),
                    )) as Arc<dyn Collector>
                })
                .collect();
            ReportGroup::new(def.name, def.topic, collectors)
        })
        .collect()
}
