use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, bail};
use tokio::process::Command;

use super::{Collector, CollectorContext};

/// Runs an external program and captures its standard output as the
/// fragment. Standard error is passed through to the operator's terminal.
pub struct ScriptCollector {
    name: String,
    program: PathBuf,
    args: Vec<OsString>,
}

impl ScriptCollector {
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// `<interpreter> <script>`, the layout used by the bundled collectors.
    pub fn interpreted(
        name: impl Into<String>,
        interpreter: impl Into<PathBuf>,
        script: impl Into<PathBuf>,
    ) -> Self {
        let script: PathBuf = script.into();
        Self::new(name, interpreter).arg(script)
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait::async_trait]
impl Collector for ScriptCollector {
    async fn collect(&self, ctx: &CollectorContext<'_>) -> anyhow::Result<String> {
        tracing::debug!(
            collector = %self.name,
            command = %self.command_line(),
            cwd = %ctx.output_dir.display(),
            "spawning collector"
        );

        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(ctx.output_dir);
        for name in CollectorContext::PARENT_ONLY_VARS {
            command.env_remove(name);
        }

        let output = command
            .envs(ctx.env_vars())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to run `{}`", self.command_line()))?;

        if !output.status.success() {
            bail!("`{}` exited with {}", self.command_line(), output.status);
        }

        String::from_utf8(output.stdout).context("standard output was not valid UTF-8")
    }

    fn name(&self) -> &str {
        &self.name
    }
}
