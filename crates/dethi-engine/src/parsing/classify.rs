use std::borrow::Cow;

use regex::Regex;

use super::blocks::Part;

/// Classification of a single line containing only local facts.
///
/// This is phase 1 of block parsing: each line is classified independently,
/// without reference to surrounding lines. The scanner combines these
/// tokens with its own part/question state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Whitespace only.
    Blank,
    /// Structural punctuation carried over from table/bracket syntax
    /// (only `[`, `]`, `*`, `|` and whitespace). Never becomes a block.
    MarkerOnly,
    /// Dash/equals padding around an end-of-exam word. Closes the question
    /// that contains it.
    EndOfExam,
    /// A question header: `Câu <N>` (or `Bài <N>`), optionally preceded by
    /// an opaque `[ID:...]` tag. `remainder` is the rest of the line with
    /// the header prefix and its trailing punctuation stripped.
    QuestionStart { index: u32, remainder: String },
    /// A section header naming one of the three exam parts.
    SectionHeader { part: Part, text: String },
    /// Anything else.
    Content,
}

/// Words that, surrounded only by dash/equals padding, end the exam body.
const END_WORDS: [&str; 3] = ["HẾT", "GIÁM THỊ", "GHI CHÚ"];

/// Classifies individual lines for the block scanning phase.
pub struct LineClassifier {
    question: Regex,
    bold: Regex,
    roman_heading: Regex,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self {
            question: Regex::new(r"(?i)^(?:\[ID:[^\]]*\]\s*)?(?:Câu|Bài)\s+(\d+)(.*)$")
                .expect("question pattern"),
            bold: Regex::new(r"\[!b:([^\]]*)\]").expect("bold pattern"),
            roman_heading: Regex::new(r"^[IVX]+\.\s").expect("roman heading pattern"),
        }
    }

    /// Classifies a line into a [`LineKind`].
    ///
    /// The input is expected to be a single line without its newline; it is
    /// trimmed internally, so raw buffer lines can be passed as-is.
    pub fn classify(&self, line: &str) -> LineKind {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineKind::Blank;
        }
        if is_marker_only(trimmed) {
            return LineKind::MarkerOnly;
        }

        let stripped = self.strip_bold(trimmed);
        if is_end_of_exam(&stripped) {
            return LineKind::EndOfExam;
        }

        if let Some(caps) = self.question.captures(trimmed)
            && let Ok(index) = caps[1].parse::<u32>()
        {
            let remainder = strip_header_punct(caps.get(2).map_or("", |m| m.as_str()));
            return LineKind::QuestionStart {
                index,
                remainder: remainder.to_string(),
            };
        }

        if let Some(part) = self.section_part(&stripped) {
            return LineKind::SectionHeader {
                part,
                text: stripped.into_owned(),
            };
        }

        LineKind::Content
    }

    /// Removes `[!b:...]` wrappers, keeping the wrapped text.
    pub fn strip_bold<'a>(&self, line: &'a str) -> Cow<'a, str> {
        self.bold.replace_all(line, "$1")
    }

    /// Resolves which exam part a header line names, if any.
    ///
    /// Only lines opening with the section word or a Roman-numeral heading
    /// are candidates; prose that merely mentions a part keyword stays
    /// content. Part 3 keywords are matched before part 2 before part 1, so
    /// a "PHẦN II" line is never read as part 1 via its "PHẦN I" prefix.
    fn section_part(&self, stripped: &str) -> Option<Part> {
        let upper = stripped.trim().to_uppercase().replace("PHAN", "PHẦN");
        if !(upper.starts_with("PHẦN") || self.roman_heading.is_match(&upper)) {
            return None;
        }

        if upper.contains("PHẦN III") || upper.contains("TRẢ LỜI NGẮN") || upper.starts_with("III.")
        {
            Some(Part::Three)
        } else if upper.contains("PHẦN II") || upper.contains("ĐÚNG SAI") || upper.starts_with("II.")
        {
            Some(Part::Two)
        } else if upper.contains("PHẦN I")
            || upper.contains("TRẮC NGHIỆM")
            || upper.starts_with("I.")
        {
            Some(Part::One)
        } else {
            None
        }
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn is_marker_only(trimmed: &str) -> bool {
    trimmed
        .chars()
        .all(|c| matches!(c, '[' | ']' | '*' | '|') || c.is_whitespace())
}

fn is_end_of_exam(stripped: &str) -> bool {
    let core = stripped.trim_matches(|c: char| c == '-' || c == '=' || c.is_whitespace());
    if core.is_empty() {
        return false;
    }
    let upper = core.to_uppercase();
    END_WORDS.contains(&upper.as_str())
}

/// Strips the punctuation that separates a question header from its body
/// text (`Câu 1.`, `Câu 1:`, `Câu 1 -`).
fn strip_header_punct(rest: &str) -> &str {
    rest.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ':' | ')' | '-'))
        .trim_end()
}
