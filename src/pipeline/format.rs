use crate::config::Config;

pub const REPORT_TITLE: &str = "📊 Thunderbird Community Metrics";

const FEEDBACK: &str = "Feedback is welcome! If you have questions about any of these metrics, \
    spot something that looks wrong, or have ideas for new ones, please reply to this e-mail \
    or open an issue on the source repository.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    pub source_url: String,
    pub signature: String,
}

impl Footer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_url: config.source_url.clone(),
            signature: config.signature.clone(),
        }
    }
}

pub struct EmailParams<'a> {
    pub display_label: &'a str,
    /// Zero-based position of this group among `topics`.
    pub group_index: usize,
    pub topics: &'a [&'a str],
    pub fragments: &'a [String],
    pub footer: &'a Footer,
}

/// Builds the Markdown body of one e-mail. The output depends only on the
/// parameters, so identical collector output yields identical files.
pub fn format_email(params: EmailParams<'_>) -> String {
    let display = params.display_label;
    let number = params.group_index + 1;
    let total = params.topics.len();
    let topic = params.topics.get(params.group_index).copied().unwrap_or_default();

    let mut body = String::new();
    body.push_str(&format!(
        "Subject: {REPORT_TITLE} {display} ({number}/{total}): {topic}\n\n"
    ));
    body.push_str("Hello Thunderbird Community,\n\n");

    if number == 1 {
        body.push_str(&format!(
            "Welcome to the Thunderbird Community Metrics for {display}! \
            This is e-mail {number} of {total}. The report is split into these e-mails:\n\n"
        ));
        for (i, t) in params.topics.iter().enumerate() {
            body.push_str(&format!("{}. {t}\n", i + 1));
        }
    } else {
        body.push_str(&format!(
            "This is e-mail {number} of {total} of the Thunderbird Community Metrics \
            for {display}, covering {topic}.\n"
        ));
    }

    body.push_str("\n---\n\n");
    body.push_str(&format!("# {REPORT_TITLE} {display}\n\n"));

    let joined = join_fragments(params.fragments);
    if !joined.is_empty() {
        body.push_str(&joined);
        body.push_str("\n\n");
    }

    body.push_str("---\n\n");
    body.push_str(FEEDBACK);
    body.push_str("\n\n");
    body.push_str(&format!("Source: {}\n\n", params.footer.source_url));
    body.push_str(&params.footer.signature);
    body.push('\n');

    body
}

/// Joins fragments with exactly one blank line between them. Leading and
/// trailing blank lines of each fragment are dropped and empty fragments
/// are skipped.
pub fn join_fragments(fragments: &[String]) -> String {
    fragments
        .iter()
        .map(|f| strip_blank_lines(f))
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A line holding only spaces or tabs counts as blank. Indentation of the
/// first non-blank line is kept.
fn strip_blank_lines(fragment: &str) -> &str {
    let mut rest = fragment;
    while let Some((line, tail)) = rest.split_once('\n') {
        if !line.trim().is_empty() {
            break;
        }
        rest = tail;
    }
    rest.trim_end()
}
