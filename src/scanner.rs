/*!
 * Directory scanning and tree rendering
 */

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{MarkTreeError, Result};
use crate::ignore_rules::IgnoreRuleSet;
use crate::types::{ScanRequest, ScanResult};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_INDENT: &str = "│   ";
const BLANK_INDENT: &str = "    ";

/// One listed directory entry
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
    is_symlink: bool,
}

/// A directory whose entries are being rendered
struct Frame {
    entries: Vec<Entry>,
    next: usize,
    prefix: String,
    rules: Rc<IgnoreRuleSet>,
}

/// Accumulates tree lines, files and counters for one scan
struct TreeBuilder {
    lines: Vec<String>,
    files: Vec<PathBuf>,
    dirs: usize,
}

impl TreeBuilder {
    fn new(root_name: String) -> Self {
        Self {
            lines: vec![root_name],
            files: Vec::new(),
            dirs: 1,
        }
    }

    fn push_dir(&mut self, line: String) {
        self.lines.push(line);
        self.dirs += 1;
    }

    fn push_file(&mut self, line: String, path: PathBuf) {
        self.lines.push(line);
        self.files.push(path);
    }

    fn finish(mut self) -> ScanResult {
        self.lines.push(format!(
            "\n{} directories, {} files",
            self.dirs,
            self.files.len()
        ));
        ScanResult {
            tree_lines: self.lines,
            files: self.files,
        }
    }
}

/// Scanner for a workspace selection
pub struct Scanner {
    request: ScanRequest,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(request: ScanRequest) -> Self {
        Self { request }
    }

    /// Check the request before any traversal happens
    pub fn validate(&self) -> Result<()> {
        let root = &self.request.workspace_root;

        crate::ensure!(
            !self.request.selected_paths.is_empty(),
            Config,
            "No file or folder selected"
        );
        crate::ensure!(
            root.is_absolute(),
            Config,
            "Workspace root must be an absolute path: {}",
            root.display()
        );
        crate::ensure!(
            root.is_dir(),
            PathNotFound,
            "{}",
            root.display()
        );

        for path in &self.request.selected_paths {
            let escapes = path.components().any(|c| c == Component::ParentDir);
            if !path.is_absolute() || escapes || !path.starts_with(root) {
                return Err(MarkTreeError::OutsideWorkspace(format!(
                    "{} (workspace root: {})",
                    path.display(),
                    root.display()
                )));
            }
            crate::ensure!(path.exists(), PathNotFound, "{}", path.display());
        }

        Ok(())
    }

    /// Scan every selected path and concatenate the results in selection order
    ///
    /// Files reachable from several selections are listed once per selection.
    pub fn scan(&self) -> Result<ScanResult> {
        self.validate()?;

        let mut result = ScanResult::default();
        for path in &self.request.selected_paths {
            result.extend(self.scan_selection(path)?);
        }

        info!(
            "Scanned {} selection(s) under {}: {} files",
            self.request.selected_paths.len(),
            self.request.workspace_root.display(),
            result.files.len()
        );
        Ok(result)
    }

    /// Scan a single selected path
    ///
    /// The tree starts at the workspace root and descends only through the
    /// selection's ancestors; below the selection every entry is shown. A
    /// selected file is rendered as the only entry of its parent.
    pub fn scan_path(&self, selected: &Path) -> Result<ScanResult> {
        Scanner::new(ScanRequest {
            selected_paths: vec![selected.to_path_buf()],
            ..self.request.clone()
        })
        .scan()
    }

    fn scan_selection(&self, selected: &Path) -> Result<ScanResult> {
        let root = &self.request.workspace_root;
        let relative = selected
            .strip_prefix(root)
            .map_err(|_| MarkTreeError::OutsideWorkspace(selected.display().to_string()))?;
        let is_file = !fs::metadata(selected)?.is_dir();

        let mut segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        let file_name = if is_file { segments.pop() } else { None };

        let root_name = root
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());

        let mut tree = TreeBuilder::new(root_name);
        let mut visited = HashSet::new();
        visited.insert(resolve(root));

        let mut rules = IgnoreRuleSet::for_root(
            root,
            &self.request.ignore_file_names,
            &self.request.additional_ignore_patterns,
        );
        let mut current = root.to_path_buf();
        let mut prefix = String::new();

        for segment in segments {
            current.push(&segment);
            tree.push_dir(format!("{}{}{}", prefix, LAST_BRANCH, segment));
            prefix.push_str(BLANK_INDENT);
            visited.insert(resolve(&current));
            rules = rules.for_directory(&current);
        }

        match file_name {
            Some(name) => {
                tree.push_file(
                    format!("{}{}{}", prefix, LAST_BRANCH, name),
                    selected.to_path_buf(),
                );
            }
            None => self.walk(&current, prefix, rules, &mut visited, &mut tree),
        }

        Ok(tree.finish())
    }

    /// Depth-first walk below `dir`, rendering every non-ignored entry
    fn walk(
        &self,
        dir: &Path,
        prefix: String,
        rules: Rc<IgnoreRuleSet>,
        visited: &mut HashSet<PathBuf>,
        tree: &mut TreeBuilder,
    ) {
        let canonical_root = resolve(&self.request.workspace_root);
        let mut stack = vec![self.open_frame(dir, prefix, rules)];

        while let Some(frame) = stack.last_mut() {
            if frame.next >= frame.entries.len() {
                stack.pop();
                continue;
            }

            let index = frame.next;
            frame.next += 1;
            let is_last = index + 1 == frame.entries.len();
            let entry = frame.entries[index].clone();
            let connector = if is_last { LAST_BRANCH } else { BRANCH };
            let line = format!("{}{}{}", frame.prefix, connector, entry.name);

            if !entry.is_dir {
                tree.push_file(line, entry.path);
                continue;
            }

            tree.push_dir(line);
            let indent = if is_last { BLANK_INDENT } else { PIPE_INDENT };
            let child_prefix = format!("{}{}", frame.prefix, indent);
            let parent_rules = Rc::clone(&frame.rules);

            let target = resolve(&entry.path);
            if entry.is_symlink && target.starts_with(&canonical_root) {
                debug!(
                    "Not descending into {}, its target {} is walked under its own path",
                    entry.path.display(),
                    target.display()
                );
            } else if visited.insert(target) {
                let child_rules = parent_rules.for_directory(&entry.path);
                stack.push(self.open_frame(&entry.path, child_prefix, child_rules));
            } else {
                debug!("Not descending into already visited {}", entry.path.display());
            }
        }
    }

    fn open_frame(&self, dir: &Path, prefix: String, rules: Rc<IgnoreRuleSet>) -> Frame {
        Frame {
            entries: self.list_entries(dir, &rules),
            next: 0,
            prefix,
            rules,
        }
    }

    /// List a directory's entries that survive the ignore rules
    ///
    /// Directories come first, then files, each group ordered by name.
    /// An unreadable directory lists as empty.
    fn list_entries(&self, dir: &Path, rules: &IgnoreRuleSet) -> Vec<Entry> {
        let root = &self.request.workspace_root;

        let mut entries: Vec<Entry> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    None
                }
            })
            .map(|entry| {
                let is_symlink = entry.path_is_symlink();
                let is_dir = if is_symlink {
                    fs::metadata(entry.path()).map_or(false, |m| m.is_dir())
                } else {
                    entry.file_type().is_dir()
                };
                Entry {
                    name: entry.file_name().to_string_lossy().to_string(),
                    path: entry.into_path(),
                    is_dir,
                    is_symlink,
                }
            })
            .filter(|entry| {
                let relative = entry.path.strip_prefix(root).unwrap_or(&entry.path);
                let ignored = rules.ignores(relative, entry.is_dir);
                if ignored {
                    debug!("Ignoring {}", relative.display());
                }
                !ignored
            })
            .collect();

        entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
        entries
    }
}

/// Resolved form of a directory path used for cycle detection
fn resolve(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
