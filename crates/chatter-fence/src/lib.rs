//! Fenced code span scanner for chat message text.
//!
//! Chat messages mark code with backticks: triple backticks delimit a fenced
//! block, single backticks an inline span. Any pass that rewrites message text
//! (line breaks, emoji, links) has to leave that code alone, so they all start
//! by splitting the text with a [`Scanner`].
//!
//! # Example
//!
//! ```rust
//! use chatter_fence::{Scanner, Segment};
//!
//! let segments: Vec<_> = Scanner::new("run ```make all``` now").collect();
//! assert_eq!(
//!     segments,
//!     vec![
//!         Segment::Plain("run "),
//!         Segment::Fenced { source: "```make all```", body: "make all" },
//!         Segment::Plain(" now"),
//!     ]
//! );
//! ```
//!
//! # Fence Rules
//!
//! The scan is a single left-to-right pass with two states, outside and
//! inside a fence. Every delimiter toggles the state. If the text ends while
//! inside a fence, the opening delimiter never closed and everything from it
//! onwards is plain text:
//!
//! ```rust
//! use chatter_fence::{Scanner, Segment};
//!
//! let segments: Vec<_> = Scanner::new("```a``` ```b").collect();
//! assert_eq!(segments[0], Segment::Fenced { source: "```a```", body: "a" });
//! assert_eq!(segments[1], Segment::Plain(" "));
//! assert_eq!(segments[2], Segment::Plain("```b"));
//! ```
//!
//! # Inline Code
//!
//! With [`Scanner::with_inline_code`], plain text is further split on
//! single-backtick spans. A span delimiter is a backtick that is not adjacent
//! to another backtick; the body must be non-empty and fit on one line.
//! Text after an unterminated fence is never split.

/// The fenced block delimiter.
pub const FENCE: &str = "```";

const BACKTICK: u8 = b'`';

/// A contiguous piece of scanned text.
///
/// Concatenating [`Segment::source`] over all segments reproduces the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text outside any code span.
    Plain(&'a str),
    /// A balanced triple-backtick span.
    Fenced {
        /// The span including both delimiters.
        source: &'a str,
        /// The content between the delimiters.
        body: &'a str,
    },
    /// A balanced single-backtick span.
    InlineCode {
        /// The span including both backticks.
        source: &'a str,
        /// The content between the backticks.
        body: &'a str,
    },
}

impl<'a> Segment<'a> {
    /// Returns the original slice covered by this segment.
    pub fn source(&self) -> &'a str {
        match self {
            Segment::Plain(text) => text,
            Segment::Fenced { source, .. } | Segment::InlineCode { source, .. } => source,
        }
    }

    /// Returns the text a transformation would see: the plain text, or the
    /// code body without delimiters.
    pub fn body(&self) -> &'a str {
        match self {
            Segment::Plain(text) => text,
            Segment::Fenced { body, .. } | Segment::InlineCode { body, .. } => body,
        }
    }

    /// Returns `true` for plain text.
    pub fn is_plain(&self) -> bool {
        matches!(self, Segment::Plain(_))
    }

    /// Returns `true` for either kind of code span.
    pub fn is_code(&self) -> bool {
        !self.is_plain()
    }
}

/// Where the next fence delimiter sits relative to the scan position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FenceMatch {
    /// A balanced span: `start` is the opening delimiter, `end` is one past
    /// the closing delimiter.
    Balanced { start: usize, end: usize },
    /// An opening delimiter with no closing one after it.
    Unterminated { start: usize },
}

fn find_fence(text: &str) -> Option<FenceMatch> {
    let start = text.find(FENCE)?;
    let after_open = start + FENCE.len();
    match text[after_open..].find(FENCE) {
        Some(close) => Some(FenceMatch::Balanced {
            start,
            end: after_open + close + FENCE.len(),
        }),
        None => Some(FenceMatch::Unterminated { start }),
    }
}

/// Finds the first valid inline code span in `region`.
///
/// Returns the byte offsets of the opening and closing backticks. The scan
/// stops at the closing backtick, so walking a region span by span reads
/// each byte a bounded number of times.
fn find_inline(region: &str) -> Option<(usize, usize)> {
    let bytes = region.as_bytes();
    let is_single = |i: usize| {
        bytes[i] == BACKTICK
            && (i == 0 || bytes[i - 1] != BACKTICK)
            && (i + 1 == bytes.len() || bytes[i + 1] != BACKTICK)
    };

    let mut previous = None;
    for close in (0..bytes.len()).filter(|&i| is_single(i)) {
        if let Some(open) = previous {
            let body = &region[open + 1..close];
            if !body.is_empty() && !body.contains('\n') && !body.contains('`') {
                return Some((open, close));
            }
        }
        previous = Some(close);
    }
    None
}

/// Iterator over the [`Segment`]s of a text.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    /// End of the plain region currently being emitted, if any.
    region_end: Option<usize>,
    inline: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner that recognizes fenced blocks only.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            region_end: None,
            inline: false,
        }
    }

    /// Creates a scanner that also splits out inline code spans.
    pub fn with_inline_code(input: &'a str) -> Self {
        Self {
            inline: true,
            ..Self::new(input)
        }
    }

    fn next_in_region(&mut self, end: usize) -> Segment<'a> {
        let region = &self.input[self.pos..end];

        if self.inline {
            if let Some((open, close)) = find_inline(region) {
                if open > 0 {
                    self.pos += open;
                    return Segment::Plain(&region[..open]);
                }
                self.pos += close + 1;
                return Segment::InlineCode {
                    source: &region[..=close],
                    body: &region[1..close],
                };
            }
        }

        self.pos = end;
        Segment::Plain(region)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }

        if let Some(end) = self.region_end {
            if self.pos < end {
                return Some(self.next_in_region(end));
            }
            self.region_end = None;
        }

        let rest = &self.input[self.pos..];
        match find_fence(rest) {
            Some(FenceMatch::Balanced { start: 0, end }) => {
                self.pos += end;
                Some(Segment::Fenced {
                    source: &rest[..end],
                    body: &rest[FENCE.len()..end - FENCE.len()],
                })
            }
            Some(FenceMatch::Unterminated { start: 0 }) => {
                // Never closed: literal to the end.
                self.pos = self.input.len();
                Some(Segment::Plain(rest))
            }
            Some(FenceMatch::Balanced { start, .. }) | Some(FenceMatch::Unterminated { start }) => {
                let end = self.pos + start;
                self.region_end = Some(end);
                Some(self.next_in_region(end))
            }
            None => {
                let end = self.input.len();
                self.region_end = Some(end);
                Some(self.next_in_region(end))
            }
        }
    }
}

/// Returns `true` if `text` contains at least one balanced fenced span.
pub fn has_balanced_fence(text: &str) -> bool {
    Scanner::new(text).any(|segment| matches!(segment, Segment::Fenced { .. }))
}

/// Rewrites every plain segment of `text` with `f`, copying code spans
/// through untouched.
///
/// ```rust
/// use chatter_fence::map_plain;
///
/// let out = map_plain("a\n```b\n```", false, |s| s.replace('\n', "|"));
/// assert_eq!(out, "a|```b\n```");
/// ```
pub fn map_plain<F>(text: &str, inline_code: bool, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    let scanner = if inline_code {
        Scanner::with_inline_code(text)
    } else {
        Scanner::new(text)
    };

    let mut output = String::with_capacity(text.len());
    for segment in scanner {
        match segment {
            Segment::Plain(plain) => output.push_str(&f(plain)),
            code => output.push_str(code.source()),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str) -> Vec<Segment<'_>> {
        Scanner::new(input).collect()
    }

    fn scan_inline(input: &str) -> Vec<Segment<'_>> {
        Scanner::with_inline_code(input).collect()
    }

    mod fences {
        use super::*;

        #[test]
        fn empty_input() {
            assert!(scan("").is_empty());
        }

        #[test]
        fn plain_only() {
            assert_eq!(scan("hello world"), vec![Segment::Plain("hello world")]);
        }

        #[test]
        fn single_fence() {
            assert_eq!(
                scan("```code```"),
                vec![Segment::Fenced {
                    source: "```code```",
                    body: "code"
                }]
            );
        }

        #[test]
        fn fence_between_text() {
            assert_eq!(
                scan("a```b```c"),
                vec![
                    Segment::Plain("a"),
                    Segment::Fenced {
                        source: "```b```",
                        body: "b"
                    },
                    Segment::Plain("c"),
                ]
            );
        }

        #[test]
        fn multiple_fences() {
            let segments = scan("```a``` mid ```b```");
            assert_eq!(segments.len(), 3);
            assert_eq!(segments[0].body(), "a");
            assert_eq!(segments[1], Segment::Plain(" mid "));
            assert_eq!(segments[2].body(), "b");
        }

        #[test]
        fn empty_fence_body() {
            assert_eq!(
                scan("``````"),
                vec![Segment::Fenced {
                    source: "``````",
                    body: ""
                }]
            );
        }

        #[test]
        fn fence_keeps_newlines() {
            let segments = scan("x```\nline\n```");
            assert_eq!(segments[1].body(), "\nline\n");
        }

        #[test]
        fn unterminated_fence_is_literal() {
            assert_eq!(
                scan("hello ```world"),
                vec![Segment::Plain("hello "), Segment::Plain("```world")]
            );
        }

        #[test]
        fn trailing_unmatched_after_balanced() {
            let segments = scan("```a```b```c");
            assert_eq!(segments[0].body(), "a");
            assert_eq!(segments[1], Segment::Plain("b"));
            assert_eq!(segments[2], Segment::Plain("```c"));
        }

        #[test]
        fn four_backticks() {
            // The first three open, the fourth starts the body.
            let segments = scan("````x```");
            assert_eq!(
                segments,
                vec![Segment::Fenced {
                    source: "````x```",
                    body: "`x"
                }]
            );
        }

        #[test]
        fn has_balanced() {
            assert!(has_balanced_fence("a```b```"));
            assert!(!has_balanced_fence("a```b"));
            assert!(!has_balanced_fence("plain"));
        }
    }

    mod inline {
        use super::*;

        #[test]
        fn inline_span() {
            assert_eq!(
                scan_inline("use `cargo` here"),
                vec![
                    Segment::Plain("use "),
                    Segment::InlineCode {
                        source: "`cargo`",
                        body: "cargo"
                    },
                    Segment::Plain(" here"),
                ]
            );
        }

        #[test]
        fn inline_disabled_by_default() {
            assert_eq!(scan("use `cargo`"), vec![Segment::Plain("use `cargo`")]);
        }

        #[test]
        fn empty_inline_is_literal() {
            assert_eq!(scan_inline("a `` b"), vec![Segment::Plain("a `` b")]);
        }

        #[test]
        fn inline_cannot_span_lines() {
            assert_eq!(
                scan_inline("`a\nb`"),
                vec![Segment::Plain("`a\nb`")]
            );
        }

        #[test]
        fn inline_next_to_fence() {
            let segments = scan_inline("`x` ```y```");
            assert_eq!(segments[0].body(), "x");
            assert!(matches!(segments[0], Segment::InlineCode { .. }));
            assert_eq!(segments[1], Segment::Plain(" "));
            assert!(matches!(segments[2], Segment::Fenced { .. }));
        }

        #[test]
        fn no_inline_after_unterminated_fence() {
            assert_eq!(
                scan_inline("```a `b`"),
                vec![Segment::Plain("```a `b`")]
            );
        }

        #[test]
        fn many_spans() {
            let input = "`x` ".repeat(10_000);
            let spans = scan_inline(&input)
                .into_iter()
                .filter(|segment| matches!(segment, Segment::InlineCode { .. }))
                .count();
            assert_eq!(spans, 10_000);
        }

        #[test]
        fn unpaired_backtick_before_span() {
            assert_eq!(
                scan_inline("a ` b\n`c`"),
                vec![
                    Segment::Plain("a ` b\n"),
                    Segment::InlineCode {
                        source: "`c`",
                        body: "c"
                    },
                ]
            );
        }

        #[test]
        fn multibyte_text() {
            let segments = scan_inline("héllo `wörld` ✓");
            assert_eq!(segments[1].body(), "wörld");
            assert_eq!(segments[2], Segment::Plain(" ✓"));
        }
    }

    mod map {
        use super::*;

        #[test]
        fn maps_plain_only() {
            let out = map_plain("a`b`c", true, |s| s.to_uppercase());
            assert_eq!(out, "A`b`C");
        }

        #[test]
        fn inline_untouched_only_when_requested() {
            let out = map_plain("a`b`c", false, |s| s.to_uppercase());
            assert_eq!(out, "A`B`C");
        }
    }
}
