//! Chapter marker computation over an ordered list of probed input files
//!
//! Two mutually exclusive derivation modes:
//!
//! - Grouping: consecutive files whose stems share a group key (the first
//!   capture of a user-supplied regex) collapse into one chapter.
//! - Passthrough: embedded chapters are carried over shifted by the running
//!   offset; chapterless files contribute one chapter titled with their stem.

use regex::Regex;
use std::path::Path;

use crate::error::BindError;
use crate::probe::SourceFile;

/// A resolved chapter in the merged output. Offsets are milliseconds from
/// the start of the merged file; `end_ms` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterMarker {
    pub start_ms: u64,
    pub end_ms: u64,
    pub title: String,
}

/// Round a duration in seconds to milliseconds, half away from zero.
/// Durations are non-negative, so truncating after +0.5 is exact.
pub fn round_ms(secs: f64) -> u64 {
    (secs * 1000.0 + 0.5) as u64
}

/// Build the ordered chapter list for the merged file.
///
/// With `grouping` set, consecutive files sharing a group key become one
/// chapter titled with the key. Without it, embedded chapters pass through
/// and chapterless files get one chapter each.
///
/// Adjacent chapters never overlap: each chapter ends one millisecond before
/// the next begins, and the last ends one millisecond before the total
/// duration.
pub fn build_chapters(
    files: &[SourceFile],
    grouping: Option<&Regex>,
) -> Result<Vec<ChapterMarker>, BindError> {
    if files.is_empty() {
        return Err(BindError::NoInput);
    }

    let mut starts: Vec<(u64, String)> = Vec::new();
    let mut offset_ms: u64 = 0;

    match grouping {
        Some(pattern) => {
            let mut last_key: Option<String> = None;

            for file in files {
                let stem = file_stem(&file.path);
                let key = group_key(pattern, &stem);

                if last_key.as_deref() != Some(key.as_str()) {
                    starts.push((offset_ms, key.clone()));
                    last_key = Some(key);
                }

                offset_ms += round_ms(file.duration_secs);
            }
        }
        None => {
            for file in files {
                if file.chapters.is_empty() {
                    starts.push((offset_ms, file_stem(&file.path)));
                } else {
                    for chapter in &file.chapters {
                        starts.push((offset_ms + round_ms(chapter.start_secs), chapter.title.clone()));
                    }
                }

                // The offset advances by the file's full duration no matter
                // how many chapters it contributed
                offset_ms += round_ms(file.duration_secs);
            }
        }
    }

    let total_ms = offset_ms;

    let mut chapters = Vec::with_capacity(starts.len());
    for (i, (start_ms, title)) in starts.iter().enumerate() {
        let end_ms = if i + 1 < starts.len() {
            starts[i + 1].0.saturating_sub(1)
        } else {
            total_ms.saturating_sub(1)
        };

        chapters.push(ChapterMarker {
            start_ms: *start_ms,
            end_ms,
            title: title.clone(),
        });
    }

    Ok(chapters)
}

/// Extract the group key from a file stem: the pattern's first capture when
/// it matches, otherwise the full stem.
fn group_key(pattern: &Regex, stem: &str) -> String {
    pattern
        .captures(stem)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| stem.to_string())
}

/// Filename without extension, used as chapter title and group-key input
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
