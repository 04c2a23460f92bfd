/*!
 * marktree - Copy directory trees and file contents as Markdown
 *
 * Scans a selection inside a workspace while honoring nested ignore-files
 * and workspace-wide ignore patterns, renders an ASCII tree, reads the
 * listed files and formats everything as Markdown for LLM chats.
 */

pub mod clipboard;
pub mod config;
pub mod error;
pub mod ignore_rules;
pub mod lang;
pub mod logger;
pub mod reader;
pub mod report;
pub mod scanner;
pub mod shell;
pub mod types;
pub mod utils;
pub mod worker;
pub mod writer;


// Re-export main components for easier access
pub use config::{Config, Destination};
pub use error::{MarkTreeError, Result};
pub use ignore_rules::IgnoreRuleSet;
pub use reader::read_files;
pub use report::{CopyReport, Reporter};
pub use scanner::Scanner;
pub use types::{CopyStats, FileResult, ScanRequest, ScanResult, ShellOutput};
pub use worker::{process, run_in_worker, Request, RequestKind, Response, Worker, WorkerOutcome};
pub use writer::{write_shell_outputs, MarkdownWriter};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scan a request and render the tree followed by every file's content
pub fn scan_to_markdown(request: &ScanRequest) -> Result<String> {
    let scan = Scanner::new(request.clone()).scan()?;
    let results = read_files(&scan.files, request.ignore_binary);
    Ok(MarkdownWriter::new(&request.workspace_root).write(&results, Some(&scan.tree_lines)))
}
