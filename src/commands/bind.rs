//! Bind command - probe, compute chapters, and merge into one audiobook

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::chapters::build_chapters;
use crate::cli::BindArgs;
use crate::commands::{load_sources, resolve_grouping, resolve_title_author, Progress};
use crate::config::Config;
use crate::ffmetadata::MetadataDocument;
use crate::merge;
use crate::probe::SourceFile;

/// How the merged file gets its cover, decided before anything runs
#[derive(Debug, Clone, PartialEq, Eq)]
enum CoverPlan {
    None,
    /// Image supplied on the command line
    Explicit(PathBuf),
    /// Embedded art stream-copied out of an input first
    Extract { input: PathBuf, dest: PathBuf },
}

impl CoverPlan {
    fn path(&self) -> Option<&Path> {
        match self {
            CoverPlan::None => None,
            CoverPlan::Explicit(path) => Some(path),
            CoverPlan::Extract { dest, .. } => Some(dest),
        }
    }
}

/// Run the bind command
pub fn run(args: &BindArgs, verbose: bool, quiet: bool) -> Result<()> {
    let config = Config::load()?;

    let sources = load_sources(&args.source, verbose, quiet, Progress::Stdout)?;
    let input_paths: Vec<PathBuf> = sources.iter().map(|s| s.path.clone()).collect();

    let (title, author) = resolve_title_author(
        &args.source,
        args.title.as_deref(),
        args.author.as_deref(),
        input_paths.first().map(|p| p.as_path()),
    );

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.m4b", title)));

    // Intermediate artifacts live here for the duration of the merge
    let workdir = tempfile::tempdir().context("Failed to create temporary directory")?;

    let metadata_path = match &args.metadata {
        // A pre-built metadata file bypasses the builder entirely
        Some(path) => {
            if !quiet {
                println!("Using metadata file {} verbatim", path.display());
            }
            path.clone()
        }
        None => {
            let grouping = resolve_grouping(args.group, args.group_pattern.as_deref(), &config)?;
            let chapters = build_chapters(&sources, grouping.as_ref())?;

            if !quiet {
                println!("Computed {} chapter(s)", chapters.len());
            }

            let document = MetadataDocument::new(title.clone(), author.clone(), chapters);
            let path = workdir.path().join("ffmetadata.txt");
            document.write_to(&path)?;
            path
        }
    };

    let cover_plan = plan_cover(args.cover.as_deref(), &sources, workdir.path());

    let list_path = workdir.path().join("concat.txt");
    merge::write_concat_list(&input_paths, &list_path)?;

    let bitrate = config.bitrate(args.bitrate.as_deref());
    let request = merge::MergeRequest {
        metadata: metadata_path.as_path(),
        cover: cover_plan.path(),
        encoder: config.encoder(args.encoder),
        bitrate: bitrate.as_deref(),
        output: output.as_path(),
    };

    let ffmpeg_args = merge::build_args(&request, &list_path);

    // Dry-run prints every planned invocation and spawns nothing
    if args.dry_run {
        if let CoverPlan::Extract { input, dest } = &cover_plan {
            let extract_args = merge::extract_cover_args(input, dest);
            println!("{}", merge::render_command("ffmpeg", &extract_args));
        }
        println!("{}", merge::render_command("ffmpeg", &ffmpeg_args));
        return Ok(());
    }

    if let CoverPlan::Extract { input, dest } = &cover_plan {
        if !quiet {
            println!("Extracting cover art from {}...", input.display());
        }
        merge::extract_cover(input, dest)?;
    }

    if !quiet {
        println!("Merging into {}...", output.display());
    }

    merge::run(&ffmpeg_args)?;

    if !quiet {
        println!("{} wrote {}", "Done!".green().bold(), output.display());
    }

    Ok(())
}

/// Pick the cover source: an explicit flag wins; otherwise the first input
/// carrying embedded art gets its picture extracted into the workdir.
/// Pure planning, no process is spawned here.
fn plan_cover(explicit: Option<&Path>, sources: &[SourceFile], workdir: &Path) -> CoverPlan {
    if let Some(cover) = explicit {
        return CoverPlan::Explicit(cover.to_path_buf());
    }

    match sources.iter().find(|s| s.has_cover) {
        Some(source) => CoverPlan::Extract {
            input: source.path.clone(),
            dest: workdir.join("cover.jpg"),
        },
        None => CoverPlan::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, has_cover: bool) -> SourceFile {
        SourceFile {
            path: PathBuf::from(name),
            duration_secs: 1.0,
            chapters: vec![],
            has_cover,
        }
    }

    #[test]
    fn test_plan_cover_explicit_wins() {
        let sources = vec![source("01.m4b", true)];
        let plan = plan_cover(
            Some(Path::new("art.png")),
            &sources,
            Path::new("/tmp/work"),
        );
        assert_eq!(plan, CoverPlan::Explicit(PathBuf::from("art.png")));
    }

    #[test]
    fn test_plan_cover_first_embedded_art() {
        let sources = vec![source("01.mp3", false), source("02.m4b", true)];
        let plan = plan_cover(None, &sources, Path::new("/tmp/work"));
        assert_eq!(
            plan,
            CoverPlan::Extract {
                input: PathBuf::from("02.m4b"),
                dest: PathBuf::from("/tmp/work/cover.jpg"),
            }
        );
        assert_eq!(plan.path(), Some(Path::new("/tmp/work/cover.jpg")));
    }

    #[test]
    fn test_plan_cover_none() {
        let sources = vec![source("01.mp3", false)];
        let plan = plan_cover(None, &sources, Path::new("/tmp/work"));
        assert_eq!(plan, CoverPlan::None);
        assert_eq!(plan.path(), None);
    }
}
