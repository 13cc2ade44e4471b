//! FFMETADATA1 document synthesis and title/author inference

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

use crate::chapters::ChapterMarker;

/// Genre tag written into every document
pub const GENRE: &str = "Audiobooks";

/// The metadata document handed to the muxer: top-level tags plus one
/// `[CHAPTER]` block per marker. Immutable once built; rendering the same
/// document twice produces byte-identical output.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataDocument {
    pub title: String,
    pub author: String,
    pub chapters: Vec<ChapterMarker>,
}

impl MetadataDocument {
    pub fn new(title: String, author: String, chapters: Vec<ChapterMarker>) -> Self {
        Self {
            title,
            author,
            chapters,
        }
    }

    /// Render as an FFMETADATA1 text document
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str(";FFMETADATA1\n");
        let _ = writeln!(out, "title={}", escape_value(&self.title));
        let _ = writeln!(out, "artist={}", escape_value(&self.author));
        let _ = writeln!(out, "authors={}", escape_value(&self.author));
        let _ = writeln!(out, "genre={}", GENRE);

        for chapter in &self.chapters {
            out.push('\n');
            out.push_str("[CHAPTER]\n");
            out.push_str("TIMEBASE=1/1000\n");
            let _ = writeln!(out, "START={}", chapter.start_ms);
            let _ = writeln!(out, "END={}", chapter.end_ms);
            let _ = writeln!(out, "title={}", escape_value(&chapter.title));
        }

        out
    }

    /// Write the rendered document to a file
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render())
            .with_context(|| format!("Failed to write metadata file {:?}", path))
    }
}

/// Escape a tag value per the FFMETADATA rules: `=`, `;`, `#` and `\` are
/// backslash-escaped, newlines become `\n`, carriage returns are dropped.
fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '=' | ';' | '#' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }

    escaped
}

/// Best-effort title/author inference from a source directory name like
/// `TheMartian_AndyWeir`: the part before the first underscore is the title,
/// the rest is the author, both humanized. Callers may always override.
pub fn infer_from_dir_name(name: &str) -> (String, String) {
    let (title_part, author_part) = match name.split_once('_') {
        Some((title, author)) => (title, author),
        None => (name, ""),
    };

    (humanize(title_part), humanize(author_part))
}

/// Insert a space at every lowercase-to-uppercase transition and at every
/// digit/letter boundary, then trim.
fn humanize(part: &str) -> String {
    let mut out = String::with_capacity(part.len() + 4);
    let mut prev: Option<char> = None;

    for c in part.chars() {
        if let Some(p) = prev {
            let case_boundary = p.is_lowercase() && c.is_uppercase();
            let digit_boundary = (p.is_ascii_digit() && c.is_alphabetic())
                || (p.is_alphabetic() && c.is_ascii_digit());
            if case_boundary || digit_boundary {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }

    out.trim().to_string()
}

/// Read embedded title/artist tags from an MP4-family file, used as an
/// inference fallback before the directory-name heuristic. Non-MP4 inputs
/// and unreadable tags yield nothing.
pub fn embedded_title_author(path: &Path) -> (Option<String>, Option<String>) {
    let is_mp4 = path
        .extension()
        .map(|ext| {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            ext_lower == "m4a" || ext_lower == "m4b"
        })
        .unwrap_or(false);

    if !is_mp4 {
        return (None, None);
    }

    match mp4ameta::Tag::read_from_path(path) {
        Ok(tag) => (
            tag.title().map(String::from),
            tag.artist().map(String::from),
        ),
        Err(e) => {
            tracing::warn!("Failed to read tags from {:?}: {}", path, e);
            (None, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> MetadataDocument {
        MetadataDocument::new(
            "The Martian".to_string(),
            "Andy Weir".to_string(),
            vec![
                ChapterMarker {
                    start_ms: 0,
                    end_ms: 89_999,
                    title: "Chapter 1".to_string(),
                },
                ChapterMarker {
                    start_ms: 90_000,
                    end_ms: 134_999,
                    title: "Chapter 2".to_string(),
                },
            ],
        )
    }

    #[test]
    fn test_render_format() {
        let rendered = sample_document().render();
        assert_eq!(
            rendered,
            ";FFMETADATA1\n\
             title=The Martian\n\
             artist=Andy Weir\n\
             authors=Andy Weir\n\
             genre=Audiobooks\n\
             \n\
             [CHAPTER]\n\
             TIMEBASE=1/1000\n\
             START=0\n\
             END=89999\n\
             title=Chapter 1\n\
             \n\
             [CHAPTER]\n\
             TIMEBASE=1/1000\n\
             START=90000\n\
             END=134999\n\
             title=Chapter 2\n"
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let doc = sample_document();
        assert_eq!(doc.render(), doc.render());
    }

    #[test]
    fn test_escape_value() {
        assert_eq!(escape_value("Simple"), "Simple");
        assert_eq!(escape_value("A=B"), "A\\=B");
        assert_eq!(escape_value("A;B"), "A\\;B");
        assert_eq!(escape_value("A#B"), "A\\#B");
        assert_eq!(escape_value("A\\B"), "A\\\\B");
        assert_eq!(escape_value("A\nB"), "A\\nB");
        assert_eq!(escape_value("A\r\nB"), "A\\nB");
    }

    #[test]
    fn test_infer_from_dir_name() {
        assert_eq!(
            infer_from_dir_name("TheMartian_AndyWeir"),
            ("The Martian".to_string(), "Andy Weir".to_string())
        );
    }

    #[test]
    fn test_infer_without_underscore() {
        assert_eq!(
            infer_from_dir_name("ProjectHailMary"),
            ("Project Hail Mary".to_string(), String::new())
        );
    }

    #[test]
    fn test_humanize_digit_boundaries() {
        assert_eq!(humanize("Foundation2"), "Foundation 2");
        assert_eq!(humanize("2001SpaceOdyssey"), "2001 Space Odyssey");
    }

    #[test]
    fn test_embedded_tags_skips_non_mp4() {
        assert_eq!(
            embedded_title_author(Path::new("/nonexistent/book.mp3")),
            (None, None)
        );
    }
}
