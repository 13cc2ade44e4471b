pub mod bind;
pub mod chapters;

use anyhow::{Context, Result};
use colored::Colorize;
use regex::Regex;
use std::path::Path;

use crate::config::Config;
use crate::ffmetadata::{embedded_title_author, infer_from_dir_name};
use crate::probe::SourceFile;
use crate::scan::scan_directory;

/// Where probe progress lines go. Commands whose stdout is the product
/// route progress to stderr so the output stays pipeable.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Progress {
    Stdout,
    Stderr,
}

impl Progress {
    fn emit(&self, line: String) {
        match self {
            Progress::Stdout => println!("{}", line),
            Progress::Stderr => eprintln!("{}", line),
        }
    }
}

/// Scan the source directory and probe every input in order
pub(crate) fn load_sources(
    source: &Path,
    verbose: bool,
    quiet: bool,
    progress: Progress,
) -> Result<Vec<SourceFile>> {
    let files = scan_directory(source)?;

    let mut sources = Vec::with_capacity(files.len());
    for path in &files {
        if !quiet {
            progress.emit(format!("  Probing {}...", path.display()));
        }

        let file = SourceFile::probe(path)?;

        if verbose {
            progress.emit(format!(
                "    {:.1}s, {} embedded chapter(s){}",
                file.duration_secs,
                file.chapters.len(),
                if file.has_cover { ", cover art" } else { "" }
            ));
        }

        sources.push(file);
    }

    if !quiet {
        progress.emit(format!(
            "{} {} file(s) probed",
            "Done!".green().bold(),
            sources.len()
        ));
    }

    Ok(sources)
}

/// Resolve the grouping regex from the CLI flags and config. A pattern flag
/// implies grouping; a bare --group falls back to the config default.
pub(crate) fn resolve_grouping(
    group: bool,
    pattern: Option<&str>,
    config: &Config,
) -> Result<Option<Regex>> {
    if !group && pattern.is_none() {
        return Ok(None);
    }

    let pattern = config
        .group_pattern(pattern)
        .context("--group requires --group-pattern or a [bind] group_pattern in the config")?;

    let regex = Regex::new(&pattern)
        .with_context(|| format!("Invalid grouping pattern {:?}", pattern))?;

    Ok(Some(regex))
}

/// Resolve title and author: explicit flags win, then embedded tags of the
/// first input, then the directory-name heuristic.
pub(crate) fn resolve_title_author(
    source: &Path,
    title_flag: Option<&str>,
    author_flag: Option<&str>,
    first_input: Option<&Path>,
) -> (String, String) {
    let (tag_title, tag_author) = first_input
        .map(embedded_title_author)
        .unwrap_or((None, None));

    let (inferred_title, inferred_author) = infer_from_dir_name(&dir_name(source));

    let title = title_flag
        .map(String::from)
        .or(tag_title)
        .unwrap_or(inferred_title);
    let author = author_flag
        .map(String::from)
        .or(tag_author)
        .unwrap_or(inferred_author);

    (title, author)
}

/// Final path component of the source directory, resolving "." and friends
fn dir_name(source: &Path) -> String {
    source
        .canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(source)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "Audiobook".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BindConfig;

    #[test]
    fn test_resolve_grouping_disabled() {
        let config = Config::default();
        assert!(resolve_grouping(false, None, &config).unwrap().is_none());
    }

    #[test]
    fn test_resolve_grouping_requires_pattern() {
        let config = Config::default();
        let err = resolve_grouping(true, None, &config).unwrap_err();
        assert!(err.to_string().contains("--group-pattern"));
    }

    #[test]
    fn test_resolve_grouping_pattern_implies_group() {
        let config = Config::default();
        let regex = resolve_grouping(false, Some(r"(Chapter \d+)"), &config)
            .unwrap()
            .unwrap();
        assert!(regex.is_match("Chapter 12"));
    }

    #[test]
    fn test_resolve_grouping_config_fallback() {
        let config = Config {
            bind: BindConfig {
                group_pattern: Some(r"(Part \d+)".to_string()),
                ..Default::default()
            },
        };
        let regex = resolve_grouping(true, None, &config).unwrap().unwrap();
        assert!(regex.is_match("Part 3"));
    }

    #[test]
    fn test_resolve_grouping_invalid_pattern() {
        let config = Config::default();
        assert!(resolve_grouping(true, Some("(unclosed"), &config).is_err());
    }

    #[test]
    fn test_resolve_title_author_flags_win() {
        let (title, author) = resolve_title_author(
            Path::new("/books/TheMartian_AndyWeir"),
            Some("Override"),
            Some("Someone Else"),
            None,
        );
        assert_eq!(title, "Override");
        assert_eq!(author, "Someone Else");
    }

    #[test]
    fn test_resolve_title_author_dir_heuristic() {
        let (title, author) = resolve_title_author(
            Path::new("/nonexistent/TheMartian_AndyWeir"),
            None,
            None,
            None,
        );
        assert_eq!(title, "The Martian");
        assert_eq!(author, "Andy Weir");
    }
}
