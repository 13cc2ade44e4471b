use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures in the bind pipeline. Every variant aborts the run;
/// there is no retry or partial-result recovery.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("no audio files found")]
    NoInput,

    #[error("ffprobe failed for {path:?}: {reason}")]
    Probe { path: PathBuf, reason: String },

    #[error("ffmpeg merge failed: {0}")]
    Merge(String),
}
