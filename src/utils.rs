/*!
 * Utility functions and static tables for marktree
 */

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;

/// Ignore-file names consulted when gitignore support is on
pub const DEFAULT_IGNORE_FILES: &[&str] = &[".gitignore"];

/// Default patterns ignored everywhere in the workspace
pub const DEFAULT_ADDITIONAL_IGNORES: &[&str] = &[
    ".git",
    ".gitignore",
    ".vscode/",
    ".idea/",
    ".settings/",
    ".vs/",
    "yarn.lock",
    "pnpm-lock.yaml",
    "package-lock.json",
    "README.md",
    "LICENSE",
    "LICENSE.md",
    "CHANGELOG.md",
    "CODE_OF_CONDUCT.md",
    "CONTRIBUTING.md",
    "SECURITY.md",
    ".editorconfig",
    ".gitattributes",
    ".mailmap",
];

/// File extensions whose content is never displayed when binaries are ignored
pub static BINARY_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Images
        "png", "jpg", "jpeg", "gif", "bmp", "ico", "icns", "tif", "tiff", "webp", "psd", "heic",
        "avif", "cur", "dds", "jxl", "raw", "cr2", "nef", "xcf",
        // Audio & video
        "mp3", "mp4", "m4a", "m4v", "wav", "flac", "ogg", "oga", "opus", "aac", "wma", "mid",
        "midi", "avi", "mov", "mkv", "webm", "wmv", "flv", "mpg", "mpeg", "3gp",
        // Archives
        "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "zst", "lz", "lzma", "cab", "dmg",
        "iso", "jar", "war", "ear", "apk", "deb", "rpm", "pkg", "whl", "egg",
        // Fonts
        "ttf", "otf", "woff", "woff2", "eot", "fnt",
        // Documents
        "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "epub",
        // Executables & objects
        "exe", "dll", "so", "dylib", "bin", "o", "obj", "a", "lib", "class", "pyc", "pyo",
        "wasm", "node", "elf", "msi", "dat",
        // Databases & data
        "db", "sqlite", "sqlite3", "mdb", "pak", "npy", "npz", "pkl", "parquet",
    ]
    .into_iter()
    .collect()
});

/// Whether a path has a well-known binary extension (case-insensitive)
pub fn has_binary_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| BINARY_EXTENSIONS.contains(ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Default ignore-file names as owned strings
pub fn default_ignore_files() -> Vec<String> {
    DEFAULT_IGNORE_FILES.iter().map(|s| s.to_string()).collect()
}

/// Default additional ignores as owned strings
pub fn default_additional_ignores() -> Vec<String> {
    DEFAULT_ADDITIONAL_IGNORES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Format a count with a singular or plural noun
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {}", singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_binary_extension() {
        assert!(has_binary_extension(Path::new("/w/logo.PNG")));
        assert!(has_binary_extension(Path::new("archive.tar.gz")));
        assert!(!has_binary_extension(Path::new("main.rs")));
        assert!(!has_binary_extension(Path::new("Makefile")));
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "file", "files"), "1 file");
        assert_eq!(pluralize(3, "file", "files"), "3 files");
    }
}
