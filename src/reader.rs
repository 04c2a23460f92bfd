/*!
 * File content reading
 */

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;

use crate::types::FileResult;
use crate::utils::has_binary_extension;

/// Read every file in parallel, keeping the input order
///
/// A failed read is recorded on its own result and never aborts the batch.
pub fn read_files(files: &[PathBuf], ignore_binary: bool) -> Vec<FileResult> {
    files
        .par_iter()
        .map(|path| read_file(path, ignore_binary))
        .collect()
}

/// Read a single file as UTF-8 text
pub fn read_file(path: &Path, ignore_binary: bool) -> FileResult {
    if ignore_binary && has_binary_extension(path) {
        debug!("Skipping binary file {}", path.display());
        return FileResult::binary(path);
    }

    match fs::read_to_string(path) {
        Ok(content) => FileResult::text(path, content),
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            FileResult::unreadable(path, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_files_dispositions_in_order() {
        let dir = TempDir::new().unwrap();
        let text = dir.path().join("notes.txt");
        let image = dir.path().join("logo.png");
        let invalid = dir.path().join("latin1.txt");
        let missing = dir.path().join("missing.txt");

        fs::write(&text, "hello").unwrap();
        fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();
        fs::write(&invalid, [0xff, 0xfe, 0x00]).unwrap();

        let files = vec![text.clone(), image.clone(), invalid.clone(), missing.clone()];
        let results = read_files(&files, true);

        assert_eq!(results.len(), 4);
        assert_eq!(results[0], FileResult::text(&text, "hello".to_string()));
        assert_eq!(results[1], FileResult::binary(&image));
        assert!(results[2].error.is_some());
        assert!(results[2].content.is_none());
        assert!(results[3].error.is_some());
        assert_eq!(results[3].file, missing);
    }

    #[test]
    fn test_binary_read_when_not_ignored() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data.bin");
        fs::write(&data, "plain bytes").unwrap();

        let result = read_file(&data, false);
        assert!(!result.is_binary);
        assert_eq!(result.content.as_deref(), Some("plain bytes"));
    }
}
