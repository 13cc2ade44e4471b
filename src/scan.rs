use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::BindError;

/// Extensions recognized as audio input files
pub const AUDIO_EXTENSIONS: &[&str] = &["aac", "flac", "m4a", "m4b", "mp3", "ogg", "wav"];

/// List the audio files directly inside a directory, sorted by path.
///
/// The listing is flat - input files are expected to sit next to each other
/// in playback order, so subdirectories are ignored.
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        bail!("Directory does not exist: {:?}", dir);
    }
    if !dir.is_dir() {
        bail!("Not a directory: {:?}", dir);
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if path.is_file() && is_audio_file(path) {
            files.push(path.to_path_buf());
        }
    }

    // Sort by path so the input order is deterministic
    files.sort();

    if files.is_empty() {
        return Err(anyhow::Error::new(BindError::NoInput).context(format!("Scanning {:?}", dir)));
    }

    Ok(files)
}

/// Check if a path has a recognized audio extension
fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            AUDIO_EXTENSIONS.contains(&ext_lower.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("/path/to/book.mp3")));
        assert!(is_audio_file(Path::new("/path/to/book.M4B")));
        assert!(is_audio_file(Path::new("/path/to/book.flac")));
        assert!(!is_audio_file(Path::new("/path/to/cover.jpg")));
        assert!(!is_audio_file(Path::new("/path/to/book")));
    }

    #[test]
    fn test_scan_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("02.mp3"), b"").unwrap();
        std::fs::write(temp.path().join("01.mp3"), b"").unwrap();
        std::fs::write(temp.path().join("cover.jpg"), b"").unwrap();
        std::fs::create_dir(temp.path().join("extras")).unwrap();
        std::fs::write(temp.path().join("extras").join("03.mp3"), b"").unwrap();

        let files = scan_directory(temp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["01.mp3", "02.mp3"]);
    }

    #[test]
    fn test_scan_empty_directory_fails() {
        let temp = TempDir::new().unwrap();
        let err = scan_directory(temp.path()).unwrap_err();
        assert!(err.to_string().contains("Scanning"));
        assert!(format!("{:#}", err).contains("no audio files found"));
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let err = scan_directory(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
