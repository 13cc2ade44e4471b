use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::merge::Encoder;

#[derive(Parser)]
#[command(name = "audiobind")]
#[command(about = "Bind a directory of audio files into a single chaptered audiobook")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase output verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe the inputs, compute chapters, and merge into one audiobook file
    Bind(BindArgs),

    /// Print the computed ffmetadata document without merging
    Chapters(ChaptersArgs),
}

#[derive(Args)]
pub struct BindArgs {
    /// Source directory containing the audio files, in playback order
    pub source: PathBuf,

    /// Book title (default: inferred from tags or the directory name)
    #[arg(long)]
    pub title: Option<String>,

    /// Author (default: inferred from tags or the directory name)
    #[arg(long)]
    pub author: Option<String>,

    /// Output file (default: "<title>.m4b" in the current directory)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Use a pre-built ffmetadata file verbatim instead of computing one
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Audio encoder for the merged file
    #[arg(long, value_enum)]
    pub encoder: Option<Encoder>,

    /// Audio bitrate, e.g. 64k (ignored with --encoder copy)
    #[arg(long)]
    pub bitrate: Option<String>,

    /// Cover image to attach (default: embedded art from the first input)
    #[arg(long)]
    pub cover: Option<PathBuf>,

    /// Collapse consecutive files with the same group key into one chapter
    #[arg(long)]
    pub group: bool,

    /// Regex whose first capture group is the group key (implies --group)
    #[arg(long)]
    pub group_pattern: Option<String>,

    /// Print the ffmpeg command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ChaptersArgs {
    /// Source directory containing the audio files, in playback order
    pub source: PathBuf,

    /// Book title (default: inferred from tags or the directory name)
    #[arg(long)]
    pub title: Option<String>,

    /// Author (default: inferred from tags or the directory name)
    #[arg(long)]
    pub author: Option<String>,

    /// Collapse consecutive files with the same group key into one chapter
    #[arg(long)]
    pub group: bool,

    /// Regex whose first capture group is the group key (implies --group)
    #[arg(long)]
    pub group_pattern: Option<String>,
}
