//! Logical paths inside a document library and their Graph API form.

use std::fmt;

use crate::error::PathError;

/// Separator between segments of a logical path.
pub const DELIMITER: char = '/';
const DELIMITER_STR: &str = "/";

/// An ordered, non-empty sequence of non-empty segment names.
///
/// Segment order is nesting order: `["a", "b"]` is folder `b` inside folder `a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalPath {
    segments: Vec<String>,
}

impl LogicalPath {
    /// Parse a slash-delimited path. Leading and trailing slashes are ignored,
    /// an empty interior segment (`a//b`) is rejected.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        let trimmed = path.trim_matches(DELIMITER);
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }
        Self::from_segments(trimmed.split(DELIMITER))
    }

    /// Build a path from already-split segments. Each segment is a single
    /// name and may not contain [`DELIMITER`].
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        if let Some(index) = segments.iter().position(|s| s.trim().is_empty()) {
            return Err(PathError::EmptySegment { index });
        }
        if let Some(index) = segments.iter().position(|s| s.contains(DELIMITER)) {
            return Err(PathError::DelimiterInSegment { index });
        }
        Ok(LogicalPath { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when there are no segments. A constructed path always has one.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment.
    pub fn name(&self) -> &str {
        // Non-empty by construction.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Every prefix in nesting order: `a`, `a/b`, `a/b/c`.
    pub fn prefixes(&self) -> impl Iterator<Item = String> + '_ {
        (1..=self.segments.len()).map(move |n| self.segments[..n].join(DELIMITER_STR))
    }

    /// Append a child segment, validating it like any other segment.
    pub fn join(&self, child: &str) -> Result<Self, PathError> {
        let mut segments = self.segments.clone();
        segments.push(child.to_string());
        Self::from_segments(segments)
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(DELIMITER_STR))
    }
}

/// Wrap a logical path the way Graph addresses items by path: `root:/<path>:`.
pub fn format_drive_path(path: &str) -> String {
    format!("root:/{}:", path)
}

/// Parent of a joined prefix, empty for a top-level segment.
pub fn parent_of(prefix: &str) -> &str {
    match prefix.rfind(DELIMITER) {
        Some(idx) => &prefix[..idx],
        None => "",
    }
}
