/*!
 * Execution boundary
 *
 * A [`Request`] is validated, then handed to a dedicated worker thread that
 * performs exactly one scan/read/format operation and sends back a single
 * [`WorkerOutcome`]. Dropping the [`WorkerHandle`] abandons the request: the
 * worker's result is discarded and never reaches the caller.
 */

use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::error::{MarkTreeError, Result};
use crate::reader::read_files;
use crate::scanner::Scanner;
use crate::shell::{run_commands, ShellCommand};
use crate::types::{CopyStats, ScanRequest};
use crate::writer::{write_shell_outputs, MarkdownWriter};

/// A single selected path inside a workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    pub workspace_root: PathBuf,
    pub selected_path: PathBuf,
    #[serde(default)]
    pub ignore_files: Vec<String>,
    #[serde(default)]
    pub additional_ignores: Vec<String>,
    #[serde(default)]
    pub ignore_binary: bool,
}

impl SelectionRequest {
    fn scan_request(&self) -> ScanRequest {
        ScanRequest::new(&self.workspace_root, &self.selected_path)
            .with_ignore_files(self.ignore_files.iter().cloned())
            .with_additional_ignores(self.additional_ignores.iter().cloned())
            .with_ignore_binary(self.ignore_binary)
    }
}

/// Several explicit paths inside a workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathsRequest {
    pub workspace_root: PathBuf,
    pub paths: Vec<PathBuf>,
    #[serde(default)]
    pub ignore_files: Vec<String>,
    #[serde(default)]
    pub additional_ignores: Vec<String>,
    #[serde(default)]
    pub ignore_binary: bool,
}

impl PathsRequest {
    fn scan_request(&self) -> ScanRequest {
        ScanRequest::batch(&self.workspace_root, self.paths.iter().cloned())
            .with_ignore_files(self.ignore_files.iter().cloned())
            .with_additional_ignores(self.additional_ignores.iter().cloned())
            .with_ignore_binary(self.ignore_binary)
    }
}

/// Explicit files read as-is, without scanning or ignore rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesRequest {
    pub workspace_root: PathBuf,
    pub paths: Vec<PathBuf>,
    #[serde(default)]
    pub ignore_binary: bool,
}

impl FilesRequest {
    fn validate(&self) -> Result<()> {
        crate::ensure!(!self.paths.is_empty(), InvalidRequest, "\"paths\" must not be empty");

        for path in &self.paths {
            crate::ensure!(
                path.is_absolute(),
                InvalidRequest,
                "path must be absolute: {}",
                path.display()
            );
            let escapes = path.components().any(|c| c == Component::ParentDir);
            if escapes || !path.starts_with(&self.workspace_root) {
                crate::bail!(
                    OutsideWorkspace,
                    "{} (workspace root: {})",
                    path.display(),
                    self.workspace_root.display()
                );
            }
        }

        Ok(())
    }
}

/// Shell commands whose outputs are copied as one block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellExecRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,
    #[serde(default)]
    pub shell_commands: Vec<ShellCommand>,
}

/// Operation kinds accepted by the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum RequestKind {
    Tree,
    ReadFilesPaths,
    ReadFilesSelected,
    TreeAndReadFilesPaths,
    TreeAndReadFilesSelected,
    ShellExec,
}

/// A request crossing the execution boundary, tagged by `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    /// Tree of the selection only
    Tree(SelectionRequest),
    /// Contents of the given files, without scanning
    ReadFilesPaths(FilesRequest),
    /// Contents of every file under the selection
    ReadFilesSelected(SelectionRequest),
    /// Tree and contents of several selections
    TreeAndReadFilesPaths(PathsRequest),
    /// Tree and contents of the selection
    TreeAndReadFilesSelected(SelectionRequest),
    /// Formatted output of auxiliary shell commands
    ShellExec(ShellExecRequest),
}

impl Request {
    /// Parse a JSON request
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MarkTreeError::InvalidRequest(e.to_string()))
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Tree(_) => RequestKind::Tree,
            Self::ReadFilesPaths(_) => RequestKind::ReadFilesPaths,
            Self::ReadFilesSelected(_) => RequestKind::ReadFilesSelected,
            Self::TreeAndReadFilesPaths(_) => RequestKind::TreeAndReadFilesPaths,
            Self::TreeAndReadFilesSelected(_) => RequestKind::TreeAndReadFilesSelected,
            Self::ShellExec(_) => RequestKind::ShellExec,
        }
    }

    /// Workspace root the request operates in, if any
    pub fn workspace_root(&self) -> Option<&Path> {
        match self {
            Self::Tree(sel) | Self::ReadFilesSelected(sel) | Self::TreeAndReadFilesSelected(sel) => {
                Some(&sel.workspace_root)
            }
            Self::ReadFilesPaths(files) => Some(&files.workspace_root),
            Self::TreeAndReadFilesPaths(paths) => Some(&paths.workspace_root),
            Self::ShellExec(exec) => exec.workspace_root.as_deref(),
        }
    }

    /// Check the request before dispatch
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Tree(sel) | Self::ReadFilesSelected(sel) | Self::TreeAndReadFilesSelected(sel) => {
                Scanner::new(sel.scan_request()).validate()
            }
            Self::TreeAndReadFilesPaths(paths) => {
                crate::ensure!(!paths.paths.is_empty(), InvalidRequest, "\"paths\" must not be empty");
                Scanner::new(paths.scan_request()).validate()
            }
            Self::ReadFilesPaths(files) => files.validate(),
            Self::ShellExec(exec) => {
                crate::ensure!(
                    !exec.shell_commands.is_empty(),
                    InvalidRequest,
                    "No shell commands provided for \"shellExec\"."
                );
                Ok(())
            }
        }
    }
}

/// Successful result of one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Rendered Markdown
    pub markdown: String,
    /// Number of files the operation covered
    pub files_count: usize,
    /// Disposition counters of the files read
    pub stats: CopyStats,
}

/// What crosses back over the boundary: a response or an error, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkerOutcome {
    Success(Response),
    Failure { error: String },
}

impl From<Result<Response>> for WorkerOutcome {
    fn from(result: Result<Response>) -> Self {
        match result {
            Ok(response) => Self::Success(response),
            Err(e) => Self::Failure {
                error: e.to_string(),
            },
        }
    }
}

impl WorkerOutcome {
    pub fn into_result(self) -> Result<Response> {
        match self {
            Self::Success(response) => Ok(response),
            Self::Failure { error } => Err(MarkTreeError::Worker(error)),
        }
    }
}

/// Perform one request on the current thread
pub fn process(request: &Request) -> Result<Response> {
    request.validate()?;

    let response = match request {
        Request::Tree(sel) => {
            let scan = Scanner::new(sel.scan_request()).scan()?;
            let markdown = MarkdownWriter::new(&sel.workspace_root).write_tree_only(&scan.tree_lines);
            Response {
                markdown,
                files_count: scan.files.len(),
                stats: CopyStats {
                    files: scan.files.len(),
                    ..Default::default()
                },
            }
        }
        Request::ReadFilesPaths(files) => {
            let results = read_files(&files.paths, files.ignore_binary);
            Response {
                markdown: MarkdownWriter::new(&files.workspace_root).write(&results, None),
                files_count: results.len(),
                stats: CopyStats::from_results(&results),
            }
        }
        Request::ReadFilesSelected(sel) => {
            let scan = Scanner::new(sel.scan_request()).scan()?;
            let results = read_files(&scan.files, sel.ignore_binary);
            Response {
                markdown: MarkdownWriter::new(&sel.workspace_root).write(&results, None),
                files_count: results.len(),
                stats: CopyStats::from_results(&results),
            }
        }
        Request::TreeAndReadFilesPaths(paths) => {
            let scan = Scanner::new(paths.scan_request()).scan()?;
            let results = read_files(&scan.files, paths.ignore_binary);
            Response {
                markdown: MarkdownWriter::new(&paths.workspace_root)
                    .write(&results, Some(&scan.tree_lines)),
                files_count: results.len(),
                stats: CopyStats::from_results(&results),
            }
        }
        Request::TreeAndReadFilesSelected(sel) => {
            let scan = Scanner::new(sel.scan_request()).scan()?;
            let results = read_files(&scan.files, sel.ignore_binary);
            Response {
                markdown: MarkdownWriter::new(&sel.workspace_root)
                    .write(&results, Some(&scan.tree_lines)),
                files_count: results.len(),
                stats: CopyStats::from_results(&results),
            }
        }
        Request::ShellExec(exec) => {
            let outputs = run_commands(&exec.shell_commands, exec.workspace_root.as_deref());
            crate::ensure!(
                outputs.iter().any(|out| !out.output.trim().is_empty()),
                Shell,
                "No output from shellExec commands."
            );
            Response {
                markdown: write_shell_outputs(&outputs),
                files_count: 0,
                stats: CopyStats::default(),
            }
        }
    };

    crate::ensure!(
        !response.markdown.is_empty(),
        Worker,
        "No Markdown content to copy."
    );
    Ok(response)
}

/// Handle one JSON-encoded request and encode its outcome as JSON
pub fn process_json(json: &str) -> String {
    let outcome: WorkerOutcome = Request::from_json(json)
        .and_then(|request| process(&request))
        .into();
    serde_json::to_string(&outcome)
        .unwrap_or_else(|e| failure_json(&format!("failed to encode worker outcome: {}", e)))
}

fn failure_json(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

/// Spawns worker threads
pub struct Worker;

impl Worker {
    /// Validate `request` and start processing it on a new thread
    pub fn spawn(request: Request) -> Result<WorkerHandle> {
        request.validate()?;

        let kind = request.kind();
        let (sender, receiver) = mpsc::sync_channel(1);

        thread::Builder::new()
            .name(format!("marktree-{}", kind))
            .spawn(move || {
                info!("Worker {} started", kind);
                let outcome = WorkerOutcome::from(process(&request));
                match &outcome {
                    WorkerOutcome::Success(response) => {
                        info!("Worker {} finished: {} files", kind, response.files_count)
                    }
                    WorkerOutcome::Failure { error: e } => error!("Worker {} failed: {}", kind, e),
                }
                if sender.send(outcome).is_err() {
                    debug!("Worker {} result discarded, caller went away", kind);
                }
            })?;

        Ok(WorkerHandle { kind, receiver })
    }
}

/// Pending result of a spawned request
pub struct WorkerHandle {
    kind: RequestKind,
    receiver: Receiver<WorkerOutcome>,
}

impl WorkerHandle {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Block until the worker answers
    pub fn wait(self) -> Result<Response> {
        match self.receiver.recv() {
            Ok(outcome) => outcome.into_result(),
            Err(_) => Err(crate::error!(
                Worker,
                "worker {} exited without a result",
                self.kind
            )),
        }
    }

    /// Wait at most `timeout`; `None` means the worker is still running
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<Response>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome.into_result()),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(crate::error!(
                Worker,
                "worker {} exited without a result",
                self.kind
            ))),
        }
    }
}

/// Run `request` on a worker thread and wait for its response
pub fn run_in_worker(request: Request) -> Result<Response> {
    Worker::spawn(request)?.wait()
}
