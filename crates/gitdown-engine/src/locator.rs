//! Directive location.
//!
//! Finds `{"gitdown": "name", ...}` objects inside active regions. The JSON object
//! is embedded in free text, so its end is found by trying successive closing
//! braces until the candidate span parses.

use std::ops::Range;

use serde_json::Value;

use super::{Error, Options, Region};

/// Literal text that starts every directive.
pub const DIRECTIVE_MARKER: &str = r#"{"gitdown""#;

/// JSON key whose value names the helper.
pub const DIRECTIVE_KEY: &str = "gitdown";

/// A directive located in a document.
///
/// Offsets refer to the document the directive was located in and are invalid
/// once that document is spliced.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// Byte offset of the opening `{`.
    pub start: usize,
    /// Byte offset one past the closing `}`.
    pub end: usize,
    /// Line of the opening `{` (1-indexed).
    pub line: usize,
    /// Helper name (the `"gitdown"` value).
    pub helper: String,
    /// Remaining keys of the JSON object.
    pub options: Options,
}

impl Directive {
    /// Byte range of the directive source text.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Locate every directive inside the active regions of `document`, in document order.
///
/// Inactive regions are skipped entirely, including JSON validation.
///
/// # Errors
///
/// Returns [`Error::InvalidDirective`] for the first marker that cannot be extended
/// into a JSON object before its region ends, or whose `"gitdown"` value is not a
/// string.
///
/// # Example
///
/// ```
/// use gitdown_engine::{locate_directives, scan_regions};
///
/// let doc = r#"A {"gitdown": "include", "file": "a.md"} B"#;
/// let directives = locate_directives(doc, &scan_regions(doc)).unwrap();
///
/// assert_eq!(directives[0].helper, "include");
/// assert_eq!(directives[0].options["file"], "a.md");
/// assert_eq!(&doc[directives[0].range()], r#"{"gitdown": "include", "file": "a.md"}"#);
/// ```
pub fn locate_directives(document: &str, regions: &[Region]) -> Result<Vec<Directive>, Error> {
    Directives::new(document, regions).collect()
}

/// Lazy directive locator.
///
/// Yields directives in document order, parsing each one only when it is requested,
/// so a caller can reject a directive before the next marker is looked at. After
/// the first error the iterator is exhausted.
#[derive(Debug)]
pub struct Directives<'a> {
    document: &'a str,
    regions: std::slice::Iter<'a, Region>,
    /// Unscanned part of the current active region.
    pending: Range<usize>,
    line: usize,
    line_offset: usize,
    failed: bool,
}

impl<'a> Directives<'a> {
    /// Create a locator over the active regions of `document`.
    #[must_use]
    pub fn new(document: &'a str, regions: &'a [Region]) -> Self {
        Self {
            document,
            regions: regions.iter(),
            pending: 0..0,
            line: 1,
            line_offset: 0,
            failed: false,
        }
    }
}

impl Iterator for Directives<'_> {
    type Item = Result<Directive, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let Range { start: pos, end } = self.pending.clone();

            if let Some(found) = self.document[pos..end].find(DIRECTIVE_MARKER) {
                let start = pos + found;

                self.line += count_newlines(&self.document[self.line_offset..start]);
                self.line_offset = start;

                return match parse_directive(self.document, start, end, self.line) {
                    Ok(directive) => {
                        self.pending = directive.end..end;
                        Some(Ok(directive))
                    }
                    Err(err) => {
                        self.failed = true;
                        Some(Err(err))
                    }
                };
            }

            let region = self.regions.find(|r| r.is_active())?;
            self.pending = region.range();
        }
    }
}

/// Parse the directive whose marker starts at `start`, without reading past `limit`.
fn parse_directive(
    document: &str,
    start: usize,
    limit: usize,
    line: usize,
) -> Result<Directive, Error> {
    let invalid = |end: usize| Error::InvalidDirective {
        fragment: document[start..end].to_owned(),
        offset: start,
    };

    let (end, mut options) = find_directive_end(document, start, limit).map_err(invalid)?;

    let helper = match options.shift_remove(DIRECTIVE_KEY) {
        Some(Value::String(name)) => name,
        _ => return Err(invalid(end)),
    };

    Ok(Directive {
        start,
        end,
        line,
        helper,
        options,
    })
}

/// Search for the shortest span starting at `start` that parses as a JSON object.
///
/// Candidate ends are the closing braces between `start` and `limit`, tried in
/// order. Returns the end offset and the parsed object, or, when no candidate
/// parses, the offset where scanning stopped: one past the last brace tried, or
/// `limit` when there was none.
fn find_directive_end(
    document: &str,
    start: usize,
    limit: usize,
) -> Result<(usize, Options), usize> {
    let candidate = &document[start..limit];
    let mut stopped = limit;

    for (idx, _) in candidate.match_indices('}') {
        let end = idx + 1;
        if let Ok(object) = serde_json::from_str::<Options>(&candidate[..end]) {
            return Ok((start + end, object));
        }
        stopped = start + end;
    }

    Err(stopped)
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}
