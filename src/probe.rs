//! ffprobe collaborator - duration, embedded chapters, and cover detection

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::BindError;

/// A chapter marker embedded in an input container, as reported by ffprobe
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedChapter {
    pub start_secs: f64,
    /// Empty string when the container carries no title tag for the chapter
    pub title: String,
}

/// Everything we need to know about one input file
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub duration_secs: f64,
    pub chapters: Vec<EmbeddedChapter>,
    /// True when the container carries a video/image stream (embedded cover art)
    pub has_cover: bool,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    chapters: Vec<FfprobeChapter>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct FfprobeChapter {
    start_time: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
}

/// Probe an audio file with ffprobe. Any spawn failure, non-zero exit, or
/// unparseable payload is fatal.
pub fn probe(path: &Path) -> Result<ProbeResult, BindError> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_chapters",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| probe_error(path, format!("failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(probe_error(path, format!("exited with {}: {}", output.status, stderr)));
    }

    parse_probe_output(path, &output.stdout)
}

fn parse_probe_output(path: &Path, payload: &[u8]) -> Result<ProbeResult, BindError> {
    let parsed: FfprobeOutput = serde_json::from_slice(payload)
        .map_err(|e| probe_error(path, format!("unparseable output: {}", e)))?;

    let duration_secs = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| probe_error(path, "no duration reported".to_string()))?;

    let mut chapters = Vec::with_capacity(parsed.chapters.len());
    for chapter in parsed.chapters {
        let start_secs = chapter
            .start_time
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| probe_error(path, "unparseable chapter start time".to_string()))?;

        chapters.push(EmbeddedChapter {
            start_secs,
            title: chapter.tags.get("title").cloned().unwrap_or_default(),
        });
    }

    let has_cover = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("video"));

    Ok(ProbeResult {
        duration_secs,
        chapters,
        has_cover,
    })
}

fn probe_error(path: &Path, reason: String) -> BindError {
    BindError::Probe {
        path: path.to_path_buf(),
        reason,
    }
}

/// Probe result paired with the path it came from, in input order
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub duration_secs: f64,
    pub chapters: Vec<EmbeddedChapter>,
    pub has_cover: bool,
}

impl SourceFile {
    pub fn probe(path: &Path) -> Result<Self, BindError> {
        let result = probe(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            duration_secs: result.duration_secs,
            chapters: result.chapters,
            has_cover: result.has_cover,
        })
    }
}
