//! Answer-marker extraction for the two option grammars.
//!
//! Both scans work on a single line and share the marker shape
//! `(*)?<letter><delimiter>`, but they accept different letter populations
//! and different delimiters, and they disambiguate differently:
//!
//! - uppercase mode (multiple choice): letters `A`-`H`, delimiter `.` or
//!   `)`. A candidate letter is accepted when the character before it is
//!   the start of line, whitespace, or the marker's own `*`. When that
//!   character is whitespace, the character before *that* must not be a
//!   digit; this keeps numeric expressions like `2,5 A.` from reading as
//!   an answer letter. Only digits are excluded by the lookback; other
//!   punctuation and letters are accepted.
//! - lowercase mode (true/false): letters `a`-`d`, delimiter `)` only, and
//!   the marker must carry non-empty trailing content. Both restrictions
//!   exist to avoid colliding with ordinary lowercase abbreviations and
//!   list-numbering fragments.
//!
//! Accepted markers partition the line: each marker's content runs from
//! just after its delimiter to just before the next marker (or end of
//! line). Byte offsets of the letter and of the marker start are reported
//! so the mutation side can patch the exact same positions the parse side
//! recognized.

/// One accepted answer marker on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerMark {
    /// The option letter as it appears on the line.
    pub letter: char,
    /// Trimmed text between this marker's delimiter and the next marker.
    pub content: String,
    /// True when the marker carried a `*` directly before the letter.
    pub is_correct: bool,
    /// Byte offset of the letter within the scanned line.
    pub letter_at: usize,
    /// Byte offset where the marker begins (the `*` when present,
    /// otherwise equal to `letter_at`).
    pub marker_at: usize,
}

/// The result of scanning one line for answer markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineAnswers {
    /// Trimmed text before the first accepted marker; empty when the line
    /// opens with a marker. The scanner keeps it as question content.
    pub stem: String,
    /// Accepted markers in line order. Never empty.
    pub marks: Vec<AnswerMark>,
}

/// Scans a line for multiple-choice markers (`A.` .. `H.`, `A)` .. `H)`).
///
/// Returns `None` when no marker on the line survives the disambiguation
/// heuristics; such lines degrade to plain content.
pub fn scan_choice_line(line: &str) -> Option<LineAnswers> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let n = chars.len();
    let mut found: Vec<(usize, usize, bool)> = Vec::new();

    let mut i = 0;
    while i < n {
        let star = chars[i].1 == '*' && i + 1 < n;
        let li = if star { i + 1 } else { i };
        if li + 1 < n
            && ('A'..='H').contains(&chars[li].1)
            && matches!(chars[li + 1].1, '.' | ')')
            && choice_boundary_ok(&chars, li)
        {
            found.push((if star { i } else { li }, li, star));
            i = li + 2;
        } else {
            i += 1;
        }
    }

    build_line_answers(line, &chars, found, false)
}

/// Scans a line for true/false markers (`a)` .. `d)`).
pub fn scan_assertion_line(line: &str) -> Option<LineAnswers> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let n = chars.len();
    let mut found: Vec<(usize, usize, bool)> = Vec::new();

    let mut i = 0;
    while i < n {
        let star = chars[i].1 == '*' && i + 1 < n;
        let li = if star { i + 1 } else { i };
        let mi = if star { i } else { li };
        if li + 1 < n
            && ('a'..='d').contains(&chars[li].1)
            && chars[li + 1].1 == ')'
            && assertion_boundary_ok(&chars, mi)
        {
            found.push((mi, li, star));
            i = li + 2;
        } else {
            i += 1;
        }
    }

    build_line_answers(line, &chars, found, true)
}

/// Uppercase acceptance: inspects the character before the letter.
///
/// Start of line and the marker's own `*` are accepted outright.
/// Whitespace is accepted unless the character before it is a digit
/// (`2,5 A.` is a quantity, not an answer). Everything else, including
/// `]` from id tags and `:` from labels, rejects the candidate.
fn choice_boundary_ok(chars: &[(usize, char)], li: usize) -> bool {
    if li == 0 {
        return true;
    }
    let prev = chars[li - 1].1;
    if prev == '*' {
        return true;
    }
    if prev.is_whitespace() {
        return !(li >= 2 && chars[li - 2].1.is_ascii_digit());
    }
    false
}

/// Lowercase acceptance: the marker (star included) must sit at the start
/// of line or after whitespace. Stricter than uppercase by design.
fn assertion_boundary_ok(chars: &[(usize, char)], mi: usize) -> bool {
    mi == 0 || chars[mi - 1].1.is_whitespace()
}

/// Turns raw candidate positions into [`LineAnswers`], computing content
/// spans from the partition the markers induce on the line.
fn build_line_answers(
    line: &str,
    chars: &[(usize, char)],
    found: Vec<(usize, usize, bool)>,
    require_content: bool,
) -> Option<LineAnswers> {
    if found.is_empty() {
        return None;
    }

    let mut marks = Vec::with_capacity(found.len());
    for (k, &(mi, li, star)) in found.iter().enumerate() {
        let content_start = chars[li + 1].0 + 1;
        let content_end = found
            .get(k + 1)
            .map_or(line.len(), |&(next_mi, _, _)| chars[next_mi].0);
        let content = line[content_start..content_end].trim();
        if require_content && content.is_empty() {
            continue;
        }
        marks.push(AnswerMark {
            letter: chars[li].1,
            content: content.to_string(),
            is_correct: star,
            letter_at: chars[li].0,
            marker_at: chars[mi].0,
        });
    }

    if marks.is_empty() {
        return None;
    }
    let stem = line[..marks[0].marker_at].trim().to_string();
    Some(LineAnswers { stem, marks })
}
