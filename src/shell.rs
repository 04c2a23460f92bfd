/*!
 * Auxiliary shell command execution (git diff, git show, ...)
 */

use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::types::ShellOutput;

/// One command to run, with its arguments and optional working directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellCommand {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl ShellCommand {
    pub fn new(command: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Command line as shown in the output
    pub fn display(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command and capture its output
    ///
    /// A command that cannot be spawned or exits unsuccessfully still yields
    /// an output whose text describes the failure.
    pub fn run(&self, default_cwd: Option<&Path>) -> ShellOutput {
        let display = self.display();
        let mut command = Command::new(&self.command);
        command.args(&self.args);
        if let Some(cwd) = self.cwd.as_deref().or(default_cwd) {
            command.current_dir(cwd);
        }

        debug!("Running {}", display);
        let output = match command.output() {
            Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).to_string(),
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                warn!("{} exited with {}", display, out.status);
                format!("Command failed ({}): {}\n{}", out.status, display, stderr.trim_end())
            }
            Err(e) => {
                warn!("Failed to spawn {}: {}", display, e);
                format!("Failed to run {}: {}", display, e)
            }
        };

        ShellOutput {
            command: display,
            output,
        }
    }
}

/// Run commands in order
pub fn run_commands(commands: &[ShellCommand], default_cwd: Option<&Path>) -> Vec<ShellOutput> {
    commands.iter().map(|cmd| cmd.run(default_cwd)).collect()
}
