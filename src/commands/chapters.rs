//! Chapters command - print the computed ffmetadata document

use anyhow::Result;

use crate::chapters::build_chapters;
use crate::cli::ChaptersArgs;
use crate::commands::{load_sources, resolve_grouping, resolve_title_author, Progress};
use crate::config::Config;
use crate::ffmetadata::MetadataDocument;

/// Run the chapters command
pub fn run(args: &ChaptersArgs, verbose: bool, quiet: bool) -> Result<()> {
    let config = Config::load()?;

    // Progress goes to stderr: stdout carries the document, which callers
    // pipe to files or straight into ffmpeg
    let sources = load_sources(&args.source, verbose, quiet, Progress::Stderr)?;

    let (title, author) = resolve_title_author(
        &args.source,
        args.title.as_deref(),
        args.author.as_deref(),
        sources.first().map(|s| s.path.as_path()),
    );

    let grouping = resolve_grouping(args.group, args.group_pattern.as_deref(), &config)?;
    let chapters = build_chapters(&sources, grouping.as_ref())?;

    let document = MetadataDocument::new(title, author, chapters);
    print!("{}", document.render());

    Ok(())
}
