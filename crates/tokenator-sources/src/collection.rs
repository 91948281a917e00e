//! Resolve command-line inputs into files

use std::path::{Path, PathBuf};

use tokenator_core::{CoreError, InputFile, Result};

use crate::extractor::ExtractorRegistry;

/// Expand inputs into file paths, keeping the order of the inputs
///
/// - a file is taken as is, even if its format is unsupported
/// - a directory is walked recursively, keeping only supported formats
/// - anything else is treated as a glob pattern
pub fn collect_paths(inputs: &[String], registry: &ExtractorRegistry) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            paths.push(path.to_path_buf());
        } else if path.is_dir() {
            paths.extend(expand_dir(path, registry)?);
        } else {
            let matches = expand_glob(input)?;
            if matches.is_empty() {
                return Err(CoreError::Other(anyhow::anyhow!(
                    "No files match: {}",
                    input
                )));
            }
            paths.extend(matches);
        }
    }

    Ok(paths)
}

/// Read every path into an `InputFile`
pub async fn load_inputs(paths: &[PathBuf]) -> Result<Vec<InputFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = InputFile::from_path(path).await.map_err(|e| {
            CoreError::Other(anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
        })?;
        files.push(file);
    }
    Ok(files)
}

fn expand_dir(path: &Path, registry: &ExtractorRegistry) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in walkdir::WalkDir::new(path) {
        let entry = entry.map_err(|e| CoreError::Other(e.into()))?;
        if entry.file_type().is_file() && registry.is_supported(&entry.file_name().to_string_lossy())
        {
            files.push(entry.into_path());
        }
    }

    // Sort for determinism
    files.sort();

    Ok(files)
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in glob::glob(pattern).map_err(|e| CoreError::Other(e.into()))? {
        let path = entry.map_err(|e| CoreError::Other(e.into()))?;
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.txt"), "bee").unwrap();
        std::fs::write(dir.path().join("a.md"), "# a").unwrap();
        std::fs::write(dir.path().join("image.png"), [0u8, 1, 2]).unwrap();
        std::fs::write(dir.path().join("nested/c.TXT"), "sea").unwrap();
        dir
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_directory_keeps_supported_sorted() {
        let dir = fixture();
        let registry = ExtractorRegistry::new();

        let paths =
            collect_paths(&[dir.path().display().to_string()], &registry).unwrap();
        assert_eq!(names(&paths), vec!["a.md", "b.txt", "c.TXT"]);
    }

    #[test]
    fn test_explicit_files_keep_order_and_unsupported() {
        let dir = fixture();
        let registry = ExtractorRegistry::new();
        let inputs = vec![
            dir.path().join("image.png").display().to_string(),
            dir.path().join("b.txt").display().to_string(),
        ];

        let paths = collect_paths(&inputs, &registry).unwrap();
        assert_eq!(names(&paths), vec!["image.png", "b.txt"]);
    }

    #[test]
    fn test_glob_pattern() {
        let dir = fixture();
        let registry = ExtractorRegistry::new();
        let pattern = format!("{}/*.txt", dir.path().display());

        let paths = collect_paths(&[pattern], &registry).unwrap();
        assert_eq!(names(&paths), vec!["b.txt"]);
    }

    #[test]
    fn test_no_match_is_error() {
        let dir = fixture();
        let registry = ExtractorRegistry::new();
        let pattern = format!("{}/*.pdf", dir.path().display());

        assert!(collect_paths(&[pattern], &registry).is_err());
    }

    #[tokio::test]
    async fn test_load_inputs_uses_file_names() {
        let dir = fixture();
        let paths = vec![dir.path().join("b.txt")];

        let files = load_inputs(&paths).await.unwrap();
        assert_eq!(files[0].name, "b.txt");
        assert_eq!(files[0].bytes, b"bee");
    }
}
