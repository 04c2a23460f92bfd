/*!
 * Configuration handling for marktree
 */

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

use crate::error::{MarkTreeError, Result};
use crate::shell::ShellCommand;
use crate::utils::{default_additional_ignores, default_ignore_files};
use crate::worker::{FilesRequest, PathsRequest, Request, SelectionRequest, ShellExecRequest};

/// Command-line arguments for marktree
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "marktree",
    version = env!("CARGO_PKG_VERSION"),
    about = "Copy directory trees and file contents as Markdown",
    long_about = "Renders a directory tree and/or file contents as Markdown, honoring nested .gitignore files, ready to paste into an LLM chat or a document."
)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Workspace root (default: nearest ancestor containing .git)
    #[clap(long, global = true)]
    pub root: Option<String>,

    /// Do not read .gitignore files
    #[clap(long, global = true)]
    pub no_gitignore: bool,

    /// Comma-separated ignore-file names to read in every directory
    #[clap(long, global = true, value_delimiter = ',')]
    pub ignore_files: Vec<String>,

    /// Comma-separated patterns ignored everywhere (replaces the defaults)
    #[clap(long, global = true, value_delimiter = ',')]
    pub additional_ignores: Vec<String>,

    /// Drop the built-in additional ignore patterns
    #[clap(long, global = true)]
    pub no_default_ignores: bool,

    /// Show the content of files with binary extensions
    #[clap(long, global = true)]
    pub include_binary: bool,

    /// Copy output to the system clipboard
    #[clap(long, global = true)]
    pub clip: bool,

    /// Write output to a file instead of stdout
    #[clap(short, long, global = true)]
    pub output: Option<String>,

    /// Do not print the summary report
    #[clap(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v warn, -vv info, -vvv debug)
    #[clap(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Directory tree of a path
    Tree {
        #[clap(default_value = ".")]
        path: String,
    },
    /// Contents of every file under a path
    Contents {
        #[clap(default_value = ".")]
        path: String,
    },
    /// Contents of the given files, without scanning
    Files {
        #[clap(required = true)]
        paths: Vec<String>,
    },
    /// Directory tree and file contents of one or more paths (default)
    All {
        #[clap(default_value = ".")]
        paths: Vec<String>,
    },
    /// Process JSON requests, one per line, from a file or `-` for stdin
    Request {
        #[clap(default_value = "-")]
        file: String,
    },
    /// Staged changes (`git diff --cached`)
    GitDiffStaged,
    /// Full patches of the given commits (`git show <rev> -p`)
    GitShow {
        #[clap(required = true)]
        revs: Vec<String>,
    },
    /// Patches between two commits (`git log <from>..<to> -p --oneline`)
    GitDiffRange { from: String, to: String },
}

/// Where the rendered Markdown goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Clipboard,
    File(PathBuf),
    Stdout,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clipboard => write!(f, "clipboard"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdout => write!(f, "stdout"),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Operation to perform
    pub command: Commands,
    /// Absolute workspace root
    pub workspace_root: PathBuf,
    /// Ignore-file names read in every directory
    pub ignore_files: Vec<String>,
    /// Patterns ignored everywhere
    pub additional_ignores: Vec<String>,
    /// Skip content of binary files
    pub ignore_binary: bool,
    /// Output sink
    pub destination: Destination,
    /// Suppress the summary report
    pub quiet: bool,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Result<Self> {
        let command = args.command.unwrap_or(Commands::All {
            paths: vec![".".to_string()],
        });

        let first_path = match &command {
            Commands::Tree { path } | Commands::Contents { path } => Some(path.as_str()),
            Commands::Files { paths } | Commands::All { paths } => {
                paths.first().map(String::as_str)
            }
            _ => None,
        };

        let workspace_root = match &args.root {
            Some(root) => canonical(root)?,
            None => {
                let start = match first_path {
                    Some(path) => canonical(path)?,
                    None => env::current_dir()?,
                };
                find_workspace_root(&start)?
            }
        };

        let ignore_files = if args.no_gitignore {
            Vec::new()
        } else if args.ignore_files.is_empty() {
            default_ignore_files()
        } else {
            args.ignore_files
        };

        let additional_ignores = if !args.additional_ignores.is_empty() {
            args.additional_ignores
        } else if args.no_default_ignores {
            Vec::new()
        } else {
            default_additional_ignores()
        };

        let destination = match (args.clip, args.output) {
            (true, _) => Destination::Clipboard,
            (false, Some(path)) => Destination::File(PathBuf::from(path)),
            (false, None) => Destination::Stdout,
        };

        Ok(Self {
            command,
            workspace_root,
            ignore_files,
            additional_ignores,
            ignore_binary: !args.include_binary,
            destination,
            quiet: args.quiet,
        })
    }

    /// Build the worker request for the configured command
    pub fn to_request(&self) -> Result<Request> {
        let request = match &self.command {
            Commands::Tree { path } => Request::Tree(self.selection(path)?),
            Commands::Contents { path } => Request::ReadFilesSelected(self.selection(path)?),
            Commands::Files { paths } => Request::ReadFilesPaths(self.files(paths)?),
            Commands::All { paths } if paths.len() == 1 => {
                Request::TreeAndReadFilesSelected(self.selection(&paths[0])?)
            }
            Commands::All { paths } => Request::TreeAndReadFilesPaths(self.paths(paths)?),
            Commands::GitDiffStaged => self.shell_exec(vec![ShellCommand::new(
                "git",
                ["diff", "--cached"],
            )]),
            Commands::GitShow { revs } => self.shell_exec(
                revs.iter()
                    .map(|rev| ShellCommand::new("git", ["show", rev.as_str(), "-p"]))
                    .collect(),
            ),
            Commands::GitDiffRange { from, to } => {
                let range = format!("{}..{}", from, to);
                self.shell_exec(vec![ShellCommand::new(
                    "git",
                    ["log", range.as_str(), "-p", "--oneline"],
                )])
            }
            Commands::Request { .. } => {
                crate::bail!(Config, "JSON requests are processed without a configuration")
            }
        };

        Ok(request)
    }

    fn selection(&self, path: &str) -> Result<SelectionRequest> {
        Ok(SelectionRequest {
            workspace_root: self.workspace_root.clone(),
            selected_path: canonical(path)?,
            ignore_files: self.ignore_files.clone(),
            additional_ignores: self.additional_ignores.clone(),
            ignore_binary: self.ignore_binary,
        })
    }

    fn paths(&self, paths: &[String]) -> Result<PathsRequest> {
        Ok(PathsRequest {
            workspace_root: self.workspace_root.clone(),
            paths: paths.iter().map(|p| canonical(p)).collect::<Result<_>>()?,
            ignore_files: self.ignore_files.clone(),
            additional_ignores: self.additional_ignores.clone(),
            ignore_binary: self.ignore_binary,
        })
    }

    fn files(&self, paths: &[String]) -> Result<FilesRequest> {
        Ok(FilesRequest {
            workspace_root: self.workspace_root.clone(),
            paths: paths.iter().map(|p| canonical(p)).collect::<Result<_>>()?,
            ignore_binary: self.ignore_binary,
        })
    }

    fn shell_exec(&self, commands: Vec<ShellCommand>) -> Request {
        Request::ShellExec(ShellExecRequest {
            workspace_root: Some(self.workspace_root.clone()),
            shell_commands: commands
                .into_iter()
                .map(|cmd| cmd.in_dir(&self.workspace_root))
                .collect(),
        })
    }
}

/// Absolute, symlink-free form of a user-supplied path
fn canonical(path: &str) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|_| MarkTreeError::PathNotFound(path.to_string()))
}

/// Pick the workspace root for a selection
///
/// The nearest ancestor (or the path itself) containing `.git` wins; then
/// the current directory if it contains the selection; then the selection
/// itself when it is a directory, else its parent.
pub fn find_workspace_root(start: &Path) -> Result<PathBuf> {
    if let Some(repo) = start.ancestors().find(|dir| dir.join(".git").exists()) {
        return Ok(repo.to_path_buf());
    }

    if let Ok(cwd) = env::current_dir().and_then(fs::canonicalize) {
        if start.starts_with(&cwd) {
            return Ok(cwd);
        }
    }

    if start.is_dir() {
        return Ok(start.to_path_buf());
    }

    start
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| crate::error!(Config, "Cannot determine a workspace root for {}", start.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("marktree").chain(args.iter().copied()))
    }

    #[test]
    fn test_workspace_root_from_git_ancestor() {
        let dir = TempDir::new().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("a").join("b")).unwrap();

        assert_eq!(find_workspace_root(&root.join("a").join("b")).unwrap(), root);
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        let root_str = root.to_string_lossy().to_string();

        let config = Config::from_args(parse(&["--root", &root_str, "tree", &root_str])).unwrap();
        assert_eq!(config.workspace_root, root);
        assert_eq!(config.ignore_files, vec![".gitignore".to_string()]);
        assert!(config.additional_ignores.contains(&".git".to_string()));
        assert!(config.ignore_binary);
        assert_eq!(config.destination, Destination::Stdout);

        match config.to_request().unwrap() {
            Request::Tree(sel) => assert_eq!(sel.selected_path, root),
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_toggles() {
        let dir = TempDir::new().unwrap();
        let root_str = dir.path().to_string_lossy().to_string();

        let config = Config::from_args(parse(&[
            "--root",
            &root_str,
            "--no-gitignore",
            "--no-default-ignores",
            "--include-binary",
            "--clip",
            "contents",
            &root_str,
        ]))
        .unwrap();

        assert!(config.ignore_files.is_empty());
        assert!(config.additional_ignores.is_empty());
        assert!(!config.ignore_binary);
        assert_eq!(config.destination, Destination::Clipboard);
        assert!(matches!(config.to_request().unwrap(), Request::ReadFilesSelected(_)));
    }

    #[test]
    fn test_all_with_several_paths_is_a_batch() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        let root_str = dir.path().to_string_lossy().to_string();
        let a = dir.path().join("a").to_string_lossy().to_string();
        let b = dir.path().join("b").to_string_lossy().to_string();

        let config = Config::from_args(parse(&["--root", &root_str, "all", &a, &b])).unwrap();
        match config.to_request().unwrap() {
            Request::TreeAndReadFilesPaths(paths) => assert_eq!(paths.paths.len(), 2),
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_files_command_reads_without_ignore_rules() {
        let dir = TempDir::new().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        fs::write(root.join("a.rs"), "fn a() {}").unwrap();
        let root_str = root.to_string_lossy().to_string();
        let file = root.join("a.rs").to_string_lossy().to_string();

        let config = Config::from_args(parse(&["--root", &root_str, "files", &file])).unwrap();
        match config.to_request().unwrap() {
            Request::ReadFilesPaths(files) => {
                assert_eq!(files.workspace_root, root);
                assert_eq!(files.paths, vec![root.join("a.rs")]);
                assert!(files.ignore_binary);
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_git_diff_range_command() {
        let dir = TempDir::new().unwrap();
        let root_str = dir.path().to_string_lossy().to_string();

        let config =
            Config::from_args(parse(&["--root", &root_str, "git-diff-range", "abc", "def"])).unwrap();
        match config.to_request().unwrap() {
            Request::ShellExec(exec) => {
                assert_eq!(exec.shell_commands[0].display(), "git log abc..def -p --oneline")
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_missing_path() {
        let err = Config::from_args(parse(&["tree", "/definitely/not/here"])).unwrap_err();
        assert!(matches!(err, MarkTreeError::PathNotFound(_)));
    }
}
