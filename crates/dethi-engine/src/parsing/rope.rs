use xi_rope::Rope;

/// A byte range `[start, end)` into the rope.
///
/// Parsed structures address the buffer through spans and 1-based line
/// numbers; slicing the rope with any span reproduces the exact source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

/// A reference to a single line in the rope.
///
/// Line numbers are 1-based: they are the stable addressing scheme shared
/// between the parsed block list and the mutation commands.
#[derive(Debug, Clone)]
pub struct LineRef {
    /// 1-based line number.
    pub number: usize,
    /// Full byte span including the trailing newline if present.
    pub span: Span,
    /// Byte span of the line content, excluding any trailing `\r\n`.
    pub content_span: Span,
    /// The line content without its trailing `\r\n`.
    pub text: String,
}

/// Returns an iterator over lines with their byte spans and 1-based numbers.
///
/// Uses `lines_raw` so newline bytes stay accounted for in `span`, which
/// keeps edits addressed through `content_span` from touching line breaks.
pub fn lines_with_spans(rope: &Rope) -> impl Iterator<Item = LineRef> + '_ {
    let mut offset = 0usize;
    let mut number = 0usize;
    rope.lines_raw(..).map(move |line| {
        let start = offset;
        offset += line.len();
        number += 1;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        LineRef {
            number,
            span: Span { start, end: offset },
            content_span: Span {
                start,
                end: start + trimmed.len(),
            },
            text: trimmed.to_string(),
        }
    })
}

/// Extracts the text for a span from the rope as an owned String.
pub fn slice_to_string(rope: &Rope, sp: Span) -> String {
    rope.slice_to_cow(sp.start..sp.end).into_owned()
}
