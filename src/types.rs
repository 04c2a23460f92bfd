/*!
 * Core types and data structures for marktree
 */

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A request to scan one or more selections inside a workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// Absolute workspace root; ignore rules and display paths are relative to it
    pub workspace_root: PathBuf,
    /// Selected files and/or directories, scanned in order
    pub selected_paths: Vec<PathBuf>,
    /// File names treated as ignore-rule sources in every directory
    pub ignore_file_names: Vec<String>,
    /// Workspace-wide glob patterns applied at every level
    pub additional_ignore_patterns: Vec<String>,
    /// Skip reading files with a known binary extension
    pub ignore_binary: bool,
}

impl ScanRequest {
    /// Create a request selecting a single path, with no ignore sources
    pub fn new(workspace_root: impl Into<PathBuf>, selected_path: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            selected_paths: vec![selected_path.into()],
            ignore_file_names: Vec::new(),
            additional_ignore_patterns: Vec::new(),
            ignore_binary: false,
        }
    }

    /// Create a request selecting a batch of paths
    pub fn batch(
        workspace_root: impl Into<PathBuf>,
        paths: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            selected_paths: paths.into_iter().map(Into::into).collect(),
            ignore_file_names: Vec::new(),
            additional_ignore_patterns: Vec::new(),
            ignore_binary: false,
        }
    }

    /// Set the ignore-file names (e.g. `.gitignore`)
    pub fn with_ignore_files(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignore_file_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the additional ignore patterns
    pub fn with_additional_ignores(
        mut self,
        patterns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.additional_ignore_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether binary files are skipped when reading
    pub fn with_ignore_binary(mut self, ignore_binary: bool) -> Self {
        self.ignore_binary = ignore_binary;
        self
    }
}

/// Output of one scan: the ASCII tree and the files it listed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Tree lines, root name first and the summary line last
    pub tree_lines: Vec<String>,
    /// Absolute paths of the listed files, in visitation order
    pub files: Vec<PathBuf>,
}

impl ScanResult {
    /// Append another result, preserving order
    pub fn extend(&mut self, other: ScanResult) {
        self.tree_lines.extend(other.tree_lines);
        self.files.extend(other.files);
    }
}

/// Outcome of reading one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    /// Absolute file path
    pub file: PathBuf,
    /// File content, absent for binary or unreadable files
    pub content: Option<String>,
    /// File was skipped because of its binary extension
    #[serde(default)]
    pub is_binary: bool,
    /// Read error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    /// A successfully read text file
    pub fn text(file: &Path, content: String) -> Self {
        Self {
            file: file.to_path_buf(),
            content: Some(content),
            ..Default::default()
        }
    }

    /// A file skipped because it is binary
    pub fn binary(file: &Path) -> Self {
        Self {
            file: file.to_path_buf(),
            is_binary: true,
            ..Default::default()
        }
    }

    /// A file that could not be read
    pub fn unreadable(file: &Path, error: impl Into<String>) -> Self {
        Self {
            file: file.to_path_buf(),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Whether there is no content to display
    pub fn is_empty(&self) -> bool {
        self.content.as_deref().map_or(true, str::is_empty)
    }
}

/// Captured output of one auxiliary shell command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellOutput {
    /// Command line as displayed after the `$` prompt
    pub command: String,
    /// Raw output (stdout, or the error text when the command failed)
    pub output: String,
}

/// Counters describing a set of file results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyStats {
    /// Number of files in the result set
    pub files: usize,
    /// Files skipped as binary
    pub binary: usize,
    /// Files that failed to read
    pub unreadable: usize,
    /// Files with no content
    pub empty: usize,
    /// Total lines of text content
    pub lines: usize,
    /// Total characters of text content
    pub chars: usize,
}

impl CopyStats {
    /// Collect counters from file results
    pub fn from_results(results: &[FileResult]) -> Self {
        results.iter().fold(
            Self {
                files: results.len(),
                ..Default::default()
            },
            |mut stats, result| {
                if result.is_binary {
                    stats.binary += 1;
                } else if result.error.is_some() {
                    stats.unreadable += 1;
                } else if result.is_empty() {
                    stats.empty += 1;
                } else if let Some(content) = &result.content {
                    stats.lines += content.lines().count();
                    stats.chars += content.chars().count();
                }
                stats
            },
        )
    }
}
