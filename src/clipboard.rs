/*!
 * Clipboard sink for rendered Markdown
 *
 * The system clipboard is reached through whichever helper program the
 * platform provides; the first available one wins.
 */

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, info};
use strum::Display;
use thiserror::Error;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// No helper program could be found
    #[error("No clipboard helper found (tried: {0})")]
    NoClipboardFound(String),

    /// The helper ran but failed
    #[error("{helper} failed: {reason}")]
    HelperFailed { helper: String, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Anything able to receive clipboard text
pub trait Clipboard {
    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
}

/// Clipboard helper programs, in detection order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ClipboardHelper {
    #[strum(to_string = "tmux")]
    Tmux,
    #[strum(to_string = "pbcopy")]
    MacOS,
    #[strum(to_string = "clip.exe")]
    Windows,
    #[strum(to_string = "wl-copy")]
    Wayland,
    #[strum(to_string = "xsel")]
    Xsel,
    #[strum(to_string = "xclip")]
    Xclip,
    #[strum(to_string = "termux-clipboard-set")]
    Termux,
}

impl ClipboardHelper {
    fn args(&self) -> &'static [&'static str] {
        match self {
            Self::Tmux => &["load-buffer", "-w", "-"],
            Self::Xclip => &["-selection", "clipboard", "-in"],
            Self::Xsel => &["--clipboard", "--input"],
            Self::MacOS | Self::Windows | Self::Wayland | Self::Termux => &[],
        }
    }

    /// Helpers worth trying on this platform
    fn candidates() -> Vec<Self> {
        let mut helpers = Vec::new();

        if env::var_os("TMUX").is_some() {
            helpers.push(Self::Tmux);
        }

        if cfg!(target_os = "macos") {
            helpers.push(Self::MacOS);
        } else if cfg!(target_os = "windows") || env::var_os("WSL_DISTRO_NAME").is_some() {
            helpers.push(Self::Windows);
        } else if cfg!(target_os = "android") {
            helpers.push(Self::Termux);
        } else {
            if env::var_os("WAYLAND_DISPLAY").is_some() {
                helpers.push(Self::Wayland);
            }
            helpers.extend([Self::Xsel, Self::Xclip, Self::Termux]);
        }

        helpers
    }
}

impl Clipboard for ClipboardHelper {
    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        let program = self.to_string();
        let fail = |reason: String| ClipboardError::HelperFailed {
            helper: program.clone(),
            reason,
        };

        let mut child = Command::new(&program)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| fail(format!("could not start: {}", e)))?;

        child
            .stdin
            .take()
            .ok_or_else(|| fail("stdin unavailable".to_string()))?
            .write_all(text.as_bytes())?;

        let status = child.wait()?;
        if !status.success() {
            return Err(fail(format!("exited with {}", status)));
        }

        info!("Copied {} bytes to the clipboard via {}", text.len(), program);
        Ok(())
    }
}

/// Whether `program` is an executable found on `PATH`
pub fn command_exists(program: &str) -> bool {
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| is_executable(&dir.join(program))))
        .unwrap_or(false)
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// Find the first available clipboard helper
pub fn detect_clipboard() -> Result<ClipboardHelper> {
    let candidates = ClipboardHelper::candidates();
    candidates
        .iter()
        .copied()
        .find(|helper| {
            let found = command_exists(&helper.to_string());
            debug!("Clipboard helper {}: {}", helper, if found { "found" } else { "missing" });
            found
        })
        .ok_or_else(|| {
            let tried = candidates
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            ClipboardError::NoClipboardFound(tried)
        })
}

/// Copy text to the system clipboard
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    detect_clipboard()?.copy_to_clipboard(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_command_exists() {
        assert!(command_exists("sh"));
        assert!(!command_exists("nonexistentcommandxyz"));
    }

    #[test]
    fn test_helper_names() {
        assert_eq!(ClipboardHelper::Wayland.to_string(), "wl-copy");
        assert_eq!(ClipboardHelper::Windows.to_string(), "clip.exe");
        assert_eq!(ClipboardHelper::Xclip.args(), &["-selection", "clipboard", "-in"]);
    }

    #[test]
    fn test_candidates_not_empty() {
        assert!(!ClipboardHelper::candidates().is_empty());
    }

    #[test]
    #[ignore] // Requires a running tmux session
    fn test_tmux_clipboard() {
        if env::var_os("TMUX").is_none() {
            return;
        }

        ClipboardHelper::Tmux
            .copy_to_clipboard("marktree clipboard test")
            .expect("Failed to copy to tmux clipboard");

        let output = Command::new("tmux")
            .args(["show-buffer"])
            .output()
            .expect("Failed to execute tmux show-buffer");
        assert_eq!(
            String::from_utf8_lossy(&output.stdout).trim(),
            "marktree clipboard test"
        );
    }
}
