/*!
 * Markdown writer implementation for marktree
 */

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::ignore_rules::relative_slash_path;
use crate::lang::language_for;
use crate::types::{FileResult, ShellOutput};

/// Markdown writer for scan output
pub struct MarkdownWriter {
    workspace_root: PathBuf,
    workspace_name: String,
}

impl MarkdownWriter {
    /// Create a writer whose display paths are relative to `workspace_root`
    pub fn new(workspace_root: &Path) -> Self {
        let workspace_name = workspace_root
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            workspace_root: workspace_root.to_path_buf(),
            workspace_name,
        }
    }

    /// Path shown above a file: `<workspace name>/<relative path>`
    ///
    /// Files outside the workspace are shown with their full path.
    pub fn display_path(&self, file: &Path) -> String {
        if !file.starts_with(&self.workspace_root) {
            return file.display().to_string();
        }

        let relative = relative_slash_path(&self.workspace_root, file);
        match (self.workspace_name.is_empty(), relative.is_empty()) {
            (true, _) => relative,
            (false, true) => self.workspace_name.clone(),
            (false, false) => format!("{}/{}", self.workspace_name, relative),
        }
    }

    /// Render the optional tree followed by every file result
    pub fn write(&self, file_results: &[FileResult], tree_lines: Option<&[String]>) -> String {
        let mut markdown = String::new();

        if let Some(lines) = tree_lines.filter(|lines| !lines.is_empty()) {
            self.write_tree(lines, &mut markdown);
        }

        for result in file_results {
            self.write_file(result, &mut markdown);
        }

        markdown
    }

    /// Render only the tree block
    pub fn write_tree_only(&self, tree_lines: &[String]) -> String {
        self.write(&[], Some(tree_lines))
    }

    fn write_tree(&self, lines: &[String], out: &mut String) {
        let _ = write!(out, "```sh\n{}\n```\n\n", lines.join("\n"));
    }

    fn write_file(&self, result: &FileResult, out: &mut String) {
        let path = self.display_path(&result.file);

        if result.is_binary {
            let _ = write!(out, "{}\n(Binary file: content not displayed)\n\n", path);
            return;
        }

        if result.error.is_some() {
            let _ = write!(out, "{}\n(Unreadable file: content not displayed)\n\n", path);
            return;
        }

        match result.content.as_deref() {
            Some(content) if !content.is_empty() => {
                let lang = language_for(&result.file);
                let _ = write!(out, "{}\n```{}\n{}\n```\n\n", path, lang, content);
            }
            _ => {
                let _ = write!(out, "{}\n(Empty file: no content to display)\n\n", path);
            }
        }
    }
}

/// Render shell command outputs as one `sh` block, `$ <command>` before each output
pub fn write_shell_outputs(outputs: &[ShellOutput]) -> String {
    let body = outputs
        .iter()
        .map(|exec| format!("$ {}\n{}", exec.command, exec.output.trim_end()))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("```sh\n{}\n```\n", body)
}
