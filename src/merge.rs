//! ffmpeg merge collaborator - concat list, command construction, execution

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::BindError;

/// Target audio encoder for the merged file
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoder {
    /// ffmpeg's built-in AAC encoder
    Aac,
    /// libfdk_aac (requires an ffmpeg built with it)
    FdkAac,
    /// Stream copy, no re-encoding
    Copy,
}

impl Encoder {
    pub fn codec_arg(&self) -> &'static str {
        match self {
            Encoder::Aac => "aac",
            Encoder::FdkAac => "libfdk_aac",
            Encoder::Copy => "copy",
        }
    }
}

/// One planned ffmpeg merge invocation. Inputs are referenced through the
/// pre-written concat list file.
#[derive(Debug)]
pub struct MergeRequest<'a> {
    /// Pre-rendered FFMETADATA1 file
    pub metadata: &'a Path,
    pub cover: Option<&'a Path>,
    pub encoder: Encoder,
    pub bitrate: Option<&'a str>,
    pub output: &'a Path,
}

/// Render the concat demuxer list: one `file '...'` line per input, with
/// embedded single quotes escaped the way the demuxer expects.
pub fn concat_list(inputs: &[PathBuf]) -> String {
    let mut out = String::new();
    for input in inputs {
        let quoted = input.display().to_string().replace('\'', r"'\''");
        out.push_str(&format!("file '{}'\n", quoted));
    }
    out
}

/// Build the full ffmpeg argument list for a merge.
///
/// Input order is fixed: 0 = concat list, 1 = metadata, 2 = cover (when
/// present). The metadata input contributes tags and chapters only.
pub fn build_args(request: &MergeRequest, list_path: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-nostdin".into(),
        "-y".into(),
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        list_path.display().to_string(),
        "-i".into(),
        request.metadata.display().to_string(),
    ];

    if let Some(cover) = request.cover {
        args.push("-i".into());
        args.push(cover.display().to_string());
    }

    args.push("-map_metadata".into());
    args.push("1".into());
    args.push("-map".into());
    args.push("0:a".into());

    if request.cover.is_some() {
        args.push("-map".into());
        args.push("2:v".into());
        args.push("-c:v".into());
        args.push("copy".into());
        args.push("-disposition:v:0".into());
        args.push("attached_pic".into());
    }

    args.push("-c:a".into());
    args.push(request.encoder.codec_arg().into());

    if request.encoder != Encoder::Copy {
        if let Some(bitrate) = request.bitrate {
            args.push("-b:a".into());
            args.push(bitrate.into());
        }
    }

    args.push(request.output.display().to_string());

    args
}

/// Render a command line for dry-run display, quoting args that need it
pub fn render_command(program: &str, args: &[String]) -> String {
    let mut out = String::from(program);
    for arg in args {
        out.push(' ');
        if arg.is_empty() || arg.contains([' ', '\'', '"']) {
            out.push('\'');
            out.push_str(&arg.replace('\'', r"'\''"));
            out.push('\'');
        } else {
            out.push_str(arg);
        }
    }
    out
}

/// Write the concat demuxer list file for a set of inputs
pub fn write_concat_list(inputs: &[PathBuf], path: &Path) -> Result<()> {
    std::fs::write(path, concat_list(inputs))
        .with_context(|| format!("Failed to write concat list {:?}", path))
}

/// Run a prepared ffmpeg merge. ffmpeg inherits stderr so encode progress
/// stays visible; a non-zero exit is fatal and any partial output is left
/// as-is.
pub fn run(args: &[String]) -> Result<()> {
    tracing::debug!("Running ffmpeg {}", args.join(" "));

    let status = Command::new("ffmpeg")
        .args(args)
        .status()
        .map_err(|e| BindError::Merge(format!("failed to run ffmpeg: {}", e)))?;

    if !status.success() {
        return Err(BindError::Merge(format!("ffmpeg exited with {}", status)).into());
    }

    Ok(())
}

/// Argument list for extracting embedded cover art from an input file into
/// `dest` by stream-copying the attached picture
pub fn extract_cover_args(input: &Path, dest: &Path) -> Vec<String> {
    vec![
        "-nostdin".into(),
        "-y".into(),
        "-i".into(),
        input.display().to_string(),
        "-an".into(),
        "-c:v".into(),
        "copy".into(),
        dest.display().to_string(),
    ]
}

/// Extract embedded cover art. Used when no explicit cover is supplied.
pub fn extract_cover(input: &Path, dest: &Path) -> Result<()> {
    let status = Command::new("ffmpeg")
        .args(extract_cover_args(input, dest))
        .status()
        .map_err(|e| BindError::Merge(format!("failed to run ffmpeg: {}", e)))?;

    if !status.success() {
        return Err(BindError::Merge(format!(
            "cover extraction from {:?} exited with {}",
            input, status
        ))
        .into());
    }

    Ok(())
}
