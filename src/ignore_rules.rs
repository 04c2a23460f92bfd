/*!
 * Layered ignore-pattern resolution
 *
 * Every directory gets an [`IgnoreRuleSet`] made of the workspace-wide
 * additional patterns plus the patterns of every ignore-file found between
 * the workspace root and that directory. Patterns from nested ignore-files
 * are rewritten so they can be matched against paths relative to the
 * workspace root, and the combined list is handed to the `ignore` crate's
 * gitignore matcher, which owns negation, anchoring, `**` and directory-only
 * semantics.
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use log::{debug, warn};

/// Read the patterns of one ignore-file
///
/// Returns the trimmed, non-blank, non-comment lines of `directory/filename`.
/// A missing or unreadable file yields no patterns.
pub fn load_ignore_file(directory: &Path, filename: &str) -> Vec<String> {
    let path = directory.join(filename);
    match fs::read_to_string(&path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect(),
        Err(e) => {
            if path.exists() {
                warn!("Ignoring unreadable ignore file {}: {}", path.display(), e);
            }
            Vec::new()
        }
    }
}

/// Rewrite patterns written in `relative_dir` so they apply from the workspace root
///
/// `relative_dir` uses `/` separators and is empty for the root itself, in
/// which case the patterns come back unchanged. Anchored patterns (`/x`) and
/// patterns containing a slash stay anchored under `relative_dir`; bare
/// patterns such as `*.log` or `build/` keep matching at any depth below it.
/// Negations keep their `!`. Blank and comment lines pass through.
pub fn rewrite_for_subdirectory(patterns: &[String], relative_dir: &str) -> Vec<String> {
    let dir = escape_glob_path(relative_dir.trim_matches('/'));

    patterns
        .iter()
        .map(|raw| {
            let line = raw.trim();
            if dir.is_empty() || line.is_empty() || line.starts_with('#') {
                return line.to_string();
            }

            let (negation, pattern) = match line.strip_prefix('!') {
                Some(rest) => ("!", rest),
                None => ("", line),
            };

            let rewritten = if pattern.starts_with('/') {
                format!("{}{}", dir, pattern)
            } else if pattern.trim_end_matches('/').contains('/') {
                format!("{}/{}", dir, pattern)
            } else {
                format!("{}/**/{}", dir, pattern)
            };

            format!("{}{}", negation, rewritten)
        })
        .collect()
}

/// Escape a literal directory path for use as a gitignore pattern prefix
///
/// Glob metacharacters in directory names (`[id]`, `{a,b}`, `*`) are
/// backslash-escaped, as is a leading `#` or `!` that would otherwise turn
/// the pattern into a comment or a negation.
pub fn escape_glob_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if matches!(c, '\\' | '*' | '?' | '[' | ']' | '{' | '}') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    if escaped.starts_with('#') || escaped.starts_with('!') {
        escaped.insert(0, '\\');
    }
    escaped
}

/// Compile the additional patterns and every ancestor layer into one matcher
///
/// Additional patterns come first so ignore-files can re-include what they
/// exclude; layers follow outermost-first, so deeper files win ties under
/// gitignore's last-match rule. Invalid patterns are skipped with a warning.
pub fn build_matcher(
    workspace_root: &Path,
    ancestor_patterns: &[Vec<String>],
    additional: &[String],
) -> Gitignore {
    let mut builder = GitignoreBuilder::new(workspace_root);

    for line in additional.iter().chain(ancestor_patterns.iter().flatten()) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Err(e) = builder.add_line(None, line) {
            warn!("Skipping invalid ignore pattern {:?}: {}", line, e);
        }
    }

    builder.build().unwrap_or_else(|e| {
        warn!("Failed to compile ignore patterns, nothing will be ignored: {}", e);
        Gitignore::empty()
    })
}

/// Effective ignore rules for one directory
///
/// Built once per directory and never mutated; children derive their own
/// set with [`IgnoreRuleSet::for_directory`].
#[derive(Debug, Clone)]
pub struct IgnoreRuleSet {
    workspace_root: PathBuf,
    ignore_file_names: Rc<[String]>,
    additional: Rc<[String]>,
    layers: Vec<Vec<String>>,
    matcher: Gitignore,
}

impl IgnoreRuleSet {
    /// Rules at the workspace root: additional patterns plus the root's ignore-files
    pub fn for_root(
        workspace_root: &Path,
        ignore_file_names: &[String],
        additional: &[String],
    ) -> Rc<Self> {
        let root = Self {
            workspace_root: workspace_root.to_path_buf(),
            ignore_file_names: ignore_file_names.into(),
            additional: additional.into(),
            layers: Vec::new(),
            matcher: build_matcher(workspace_root, &[], additional),
        };
        root.descend(workspace_root)
    }

    /// Rules for a child directory of the directory these rules belong to
    ///
    /// When the directory carries no ignore-file patterns the parent's set is
    /// shared instead of rebuilt.
    pub fn for_directory(self: &Rc<Self>, directory: &Path) -> Rc<Self> {
        let local = self.local_patterns(directory);
        if local.is_empty() {
            return Rc::clone(self);
        }
        Rc::new(self.with_layer(local))
    }

    fn descend(self, directory: &Path) -> Rc<Self> {
        let local = self.local_patterns(directory);
        if local.is_empty() {
            Rc::new(self)
        } else {
            Rc::new(self.with_layer(local))
        }
    }

    fn local_patterns(&self, directory: &Path) -> Vec<String> {
        let relative_dir = relative_slash_path(&self.workspace_root, directory);
        let patterns: Vec<String> = self
            .ignore_file_names
            .iter()
            .flat_map(|name| load_ignore_file(directory, name))
            .collect();

        if !patterns.is_empty() {
            debug!(
                "Loaded {} ignore patterns from {}",
                patterns.len(),
                directory.display()
            );
        }

        rewrite_for_subdirectory(&patterns, &relative_dir)
    }

    fn with_layer(&self, local: Vec<String>) -> Self {
        let mut layers = self.layers.clone();
        layers.push(local);
        let matcher = build_matcher(&self.workspace_root, &layers, &self.additional);

        Self {
            workspace_root: self.workspace_root.clone(),
            ignore_file_names: Rc::clone(&self.ignore_file_names),
            additional: Rc::clone(&self.additional),
            layers,
            matcher,
        }
    }

    /// Whether `relative_path` (relative to the workspace root) is ignored
    ///
    /// Directories must be flagged so directory-only patterns (`dist/`) apply.
    pub fn ignores(&self, relative_path: &Path, is_dir: bool) -> bool {
        self.matcher.matched(relative_path, is_dir).is_ignore()
    }

    /// Every pattern in effect, in match order
    pub fn patterns(&self) -> Vec<&str> {
        self.additional
            .iter()
            .chain(self.layers.iter().flatten())
            .map(String::as_str)
            .collect()
    }
}

/// Path of `path` relative to `root`, joined with `/`; empty for the root itself
pub fn relative_slash_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
