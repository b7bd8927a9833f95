use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::editing::RawDocument;
use crate::parsing::answers::{scan_assertion_line, scan_choice_line};
use crate::parsing::classify::{LineClassifier, LineKind};
use crate::parsing::inline::TableRow;
use crate::parsing::rope::{LineRef, lines_with_spans};

/// The short-answer value prefix, exactly as the serializer writes it.
const ANSWER_PREFIX: &str = "Đáp án:";

/// Structured edits that compile to byte-exact patches on the raw text.
///
/// Targets are addressed by 1-based line numbers taken from the parsed
/// block list. Compilation re-derives the governing question's boundary
/// from the current buffer, so commands stay correct even when an earlier
/// edit inserted or deleted lines below the block list the caller read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Mark `letter` as the correct choice of the question whose header is
    /// at `question_line`, or unmark it if it already is. Single-select:
    /// every other starred uppercase marker in the question loses its star.
    ToggleChoice { question_line: usize, letter: char },
    /// Flip the star of the `letter)` assertion on exactly `line`.
    /// Multi-select: other letters on the same or other lines are
    /// untouched.
    ToggleAssertion { line: usize, letter: char },
    /// Set the question's short-answer value: replaces the existing
    /// `Đáp án:` line, inserts one before the question's boundary when
    /// absent, or deletes it when `text` is empty.
    SetWrittenAnswer { question_line: usize, text: String },
}

/// Compiles a command into a delta against the current buffer.
///
/// Total: any command whose target cannot be located compiles to the
/// identity delta, never to a partial edit.
pub(crate) fn compile_command(doc: &RawDocument, cmd: &Cmd) -> Delta<RopeInfo> {
    match cmd {
        Cmd::ToggleChoice {
            question_line,
            letter,
        } => compile_toggle_choice(doc, *question_line, *letter),
        Cmd::ToggleAssertion { line, letter } => compile_toggle_assertion(doc, *line, *letter),
        Cmd::SetWrittenAnswer {
            question_line,
            text,
        } => compile_set_written_answer(doc, *question_line, text),
    }
}

fn identity(len: usize) -> Delta<RopeInfo> {
    Builder::new(len).build()
}

/// The exclusive 1-based line number where the question starting at
/// `question_line` ends: the next question header, section header or
/// end-of-exam marker, or one past the last line.
fn question_boundary(
    classifier: &LineClassifier,
    lines: &[LineRef],
    question_line: usize,
) -> usize {
    for lr in &lines[question_line..] {
        match classifier.classify(&lr.text) {
            LineKind::QuestionStart { .. }
            | LineKind::SectionHeader { .. }
            | LineKind::EndOfExam => return lr.number,
            _ => {}
        }
    }
    lines.len() + 1
}

/// Validates that `question_line` addresses a question header and returns
/// the line arena plus the question's [start, boundary) range indices.
fn locate_question(
    doc: &RawDocument,
    classifier: &LineClassifier,
    question_line: usize,
) -> Option<(Vec<LineRef>, usize)> {
    let lines: Vec<LineRef> = lines_with_spans(doc.rope()).collect();
    if question_line == 0 || question_line > lines.len() {
        return None;
    }
    if !matches!(
        classifier.classify(&lines[question_line - 1].text),
        LineKind::QuestionStart { .. }
    ) {
        return None;
    }
    let boundary = question_boundary(classifier, &lines, question_line);
    Some((lines, boundary))
}

fn compile_toggle_choice(doc: &RawDocument, question_line: usize, letter: char) -> Delta<RopeInfo> {
    let classifier = LineClassifier::new();
    let Some((lines, boundary)) = locate_question(doc, &classifier, question_line) else {
        return identity(doc.len());
    };
    let range = &lines[question_line - 1..boundary - 1];

    // First pass: the target is the first accepted occurrence of the
    // letter inside the question's range.
    let mut target: Option<(usize, usize, bool)> = None; // (line number, letter_at, had star)
    'search: for lr in range {
        if let Some(found) = scan_choice_line(&lr.text) {
            for mark in &found.marks {
                if mark.letter == letter {
                    target = Some((lr.number, mark.letter_at, mark.is_correct));
                    break 'search;
                }
            }
        }
    }
    let Some((target_line, target_letter_at, had_star)) = target else {
        return identity(doc.len());
    };

    // Second pass: strip every star in range, then re-star the target
    // unless it was already marked (that is the "toggle off" case).
    let mut builder = Builder::new(doc.len());
    for lr in range {
        let Some(found) = scan_choice_line(&lr.text) else {
            continue;
        };
        let starred: Vec<usize> = found
            .marks
            .iter()
            .filter(|m| m.is_correct)
            .map(|m| m.marker_at)
            .collect();

        let mut new_line = lr.text.clone();
        for &at in starred.iter().rev() {
            new_line.remove(at);
        }

        if lr.number == target_line && !had_star {
            let shift = starred.iter().filter(|&&at| at < target_letter_at).count();
            new_line.insert(target_letter_at - shift, '*');
        }

        if new_line != lr.text {
            builder.replace(
                lr.content_span.start..lr.content_span.end,
                Rope::from(new_line),
            );
        }
    }
    builder.build()
}

fn compile_toggle_assertion(doc: &RawDocument, line: usize, letter: char) -> Delta<RopeInfo> {
    let lines: Vec<LineRef> = lines_with_spans(doc.rope()).collect();
    if line == 0 || line > lines.len() {
        return identity(doc.len());
    }
    let lr = &lines[line - 1];

    let Some(found) = scan_assertion_line(&lr.text) else {
        return identity(doc.len());
    };
    let Some(mark) = found.marks.iter().find(|m| m.letter == letter) else {
        return identity(doc.len());
    };

    let mut new_line = lr.text.clone();
    if mark.is_correct {
        new_line.remove(mark.marker_at);
    } else {
        new_line.insert(mark.letter_at, '*');
    }

    let mut builder = Builder::new(doc.len());
    builder.replace(
        lr.content_span.start..lr.content_span.end,
        Rope::from(new_line),
    );
    builder.build()
}

fn compile_set_written_answer(doc: &RawDocument, question_line: usize, text: &str) -> Delta<RopeInfo> {
    let classifier = LineClassifier::new();
    let Some((lines, boundary)) = locate_question(doc, &classifier, question_line) else {
        return identity(doc.len());
    };
    let range = &lines[question_line - 1..boundary - 1];

    let existing = range.iter().find(|lr| lr.text.trim().starts_with(ANSWER_PREFIX));

    let mut builder = Builder::new(doc.len());
    match existing {
        Some(lr) => {
            if text.is_empty() {
                // Remove the whole line, newline included.
                builder.delete(lr.span.start..lr.span.end);
            } else {
                let Some(idx) = lr.text.find(ANSWER_PREFIX) else {
                    return identity(doc.len());
                };
                let prefix_end = idx + ANSWER_PREFIX.len();
                let new_line = format!("{} {}", &lr.text[..prefix_end], text);
                builder.replace(
                    lr.content_span.start..lr.content_span.end,
                    Rope::from(new_line),
                );
            }
        }
        None => {
            if text.is_empty() {
                return identity(doc.len());
            }
            // Insert before the boundary, backing over trailing blank
            // lines and table rows that sit against it.
            let mut ins = boundary;
            while ins > question_line + 1 {
                let prev = &lines[ins - 2].text;
                if prev.trim().is_empty() || TableRow::cells(prev).is_some() {
                    ins -= 1;
                } else {
                    break;
                }
            }

            if ins <= lines.len() {
                let offset = lines[ins - 1].span.start;
                builder.replace(offset..offset, Rope::from(format!("{ANSWER_PREFIX} {text}\n")));
            } else {
                let offset = doc.len();
                let ends_with_newline = lines
                    .last()
                    .is_none_or(|lr| lr.span.end > lr.content_span.end);
                let insert = if ends_with_newline {
                    format!("{ANSWER_PREFIX} {text}\n")
                } else {
                    format!("\n{ANSWER_PREFIX} {text}")
                };
                builder.replace(offset..offset, Rope::from(insert));
            }
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn apply(text: &str, cmd: Cmd) -> String {
        let doc = RawDocument::from(text);
        let (next, _) = doc.apply(&cmd);
        next.text()
    }

    fn toggle_choice(text: &str, question_line: usize, letter: char) -> String {
        apply(
            text,
            Cmd::ToggleChoice {
                question_line,
                letter,
            },
        )
    }

    // ============ ToggleChoice ============

    #[test]
    fn star_is_inserted_before_target_letter() {
        let text = "Câu 1. Một?\nA. x\nB. y";
        assert_eq!(toggle_choice(text, 1, 'B'), "Câu 1. Một?\nA. x\n*B. y");
    }

    #[test]
    fn toggling_marked_letter_unmarks_it() {
        let text = "Câu 1. Một?\nA. x\n*B. y";
        assert_eq!(toggle_choice(text, 1, 'B'), "Câu 1. Một?\nA. x\nB. y");
    }

    #[test]
    fn mark_then_unmark_restores_original_text() {
        let original = "Câu 1. Một?\nA. x\nB. y\nCâu 2. Hai?\nA. z";
        let marked = toggle_choice(original, 1, 'A');
        let restored = toggle_choice(&marked, 1, 'A');
        assert_eq!(restored, original);
    }

    #[test]
    fn single_select_moves_the_star() {
        let text = "Câu 1. Một?\n*A. x\nB. y\nC. z";
        assert_eq!(
            toggle_choice(text, 1, 'C'),
            "Câu 1. Một?\nA. x\nB. y\n*C. z"
        );
    }

    #[test]
    fn inline_options_on_header_line() {
        let text = "Câu 1. Một? A. x *B. y C. z";
        assert_eq!(toggle_choice(text, 1, 'A'), "Câu 1. Một? *A. x B. y C. z");
    }

    #[test]
    fn next_question_is_outside_the_range() {
        let text = "Câu 1. Một?\nA. x\nCâu 2. Hai?\n*A. z";
        assert_eq!(
            toggle_choice(text, 1, 'A'),
            "Câu 1. Một?\n*A. x\nCâu 2. Hai?\n*A. z"
        );
    }

    #[test]
    fn section_header_bounds_the_range() {
        let text = "Câu 1. Một?\nA. x\nPHẦN II. ĐÚNG SAI\nthêm chữ A. không liên quan";
        assert_eq!(
            toggle_choice(text, 1, 'A'),
            "Câu 1. Một?\n*A. x\nPHẦN II. ĐÚNG SAI\nthêm chữ A. không liên quan"
        );
    }

    #[test]
    fn target_line_not_a_question_is_noop() {
        let text = "dòng thường\nA. x";
        assert_eq!(toggle_choice(text, 1, 'A'), text);
        assert_eq!(toggle_choice(text, 99, 'A'), text);
        assert_eq!(toggle_choice(text, 0, 'A'), text);
    }

    #[test]
    fn missing_letter_is_noop_and_strips_nothing() {
        let text = "Câu 1. Một?\n*A. x\nB. y";
        assert_eq!(toggle_choice(text, 1, 'E'), text);
    }

    #[test]
    fn windows_line_endings_survive_toggling() {
        let text = "Câu 1. Một?\r\nA. x\r\nB. y\r\n";
        assert_eq!(toggle_choice(text, 1, 'A'), "Câu 1. Một?\r\n*A. x\r\nB. y\r\n");
    }

    // ============ ToggleAssertion ============

    #[test]
    fn assertion_toggles_independently() {
        let text = "Câu 1. Xét:\na) Đúng *b) Sai";
        assert_eq!(
            apply(text, Cmd::ToggleAssertion { line: 2, letter: 'a' }),
            "Câu 1. Xét:\n*a) Đúng *b) Sai"
        );
    }

    #[test]
    fn assertion_unmark_removes_only_target_star() {
        let text = "Câu 1. Xét:\n*a) Đúng *b) Sai";
        assert_eq!(
            apply(text, Cmd::ToggleAssertion { line: 2, letter: 'b' }),
            "Câu 1. Xét:\n*a) Đúng b) Sai"
        );
    }

    #[test]
    fn assertion_on_other_lines_untouched() {
        let text = "a) một\n*b) hai\nc) ba";
        assert_eq!(
            apply(text, Cmd::ToggleAssertion { line: 3, letter: 'c' }),
            "a) một\n*b) hai\n*c) ba"
        );
    }

    #[test]
    fn assertion_missing_letter_is_noop() {
        let text = "a) một b) hai";
        assert_eq!(
            apply(text, Cmd::ToggleAssertion { line: 1, letter: 'd' }),
            text
        );
        assert_eq!(
            apply(text, Cmd::ToggleAssertion { line: 7, letter: 'a' }),
            text
        );
    }

    // ============ SetWrittenAnswer ============

    fn set_answer(text: &str, question_line: usize, value: &str) -> String {
        apply(
            text,
            Cmd::SetWrittenAnswer {
                question_line,
                text: value.to_string(),
            },
        )
    }

    #[test]
    fn answer_line_is_inserted_at_question_end() {
        let text = "Câu 1. Tính 6 x 7.\nCâu 2. Hai";
        assert_eq!(
            set_answer(text, 1, "42"),
            "Câu 1. Tính 6 x 7.\nĐáp án: 42\nCâu 2. Hai"
        );
    }

    #[test]
    fn answer_line_is_inserted_before_end_marker() {
        let text = "Câu 1. Tính.\n----- HẾT -----";
        assert_eq!(
            set_answer(text, 1, "42"),
            "Câu 1. Tính.\nĐáp án: 42\n----- HẾT -----"
        );
    }

    #[test]
    fn answer_insertion_backs_over_blanks_and_tables() {
        let text = "Câu 1. Tính.\n[* a | b *]\n\nCâu 2. Hai";
        assert_eq!(
            set_answer(text, 1, "42"),
            "Câu 1. Tính.\nĐáp án: 42\n[* a | b *]\n\nCâu 2. Hai"
        );
    }

    #[test]
    fn answer_appended_at_eof_without_trailing_newline() {
        let text = "Câu 1. Tính.";
        assert_eq!(set_answer(text, 1, "42"), "Câu 1. Tính.\nĐáp án: 42");
    }

    #[test]
    fn answer_appended_at_eof_with_trailing_newline() {
        let text = "Câu 1. Tính.\n";
        assert_eq!(set_answer(text, 1, "42"), "Câu 1. Tính.\nĐáp án: 42\n");
    }

    #[test]
    fn existing_answer_line_is_replaced() {
        let text = "Câu 1. Tính.\nĐáp án: 41\nCâu 2. Hai";
        assert_eq!(
            set_answer(text, 1, "42"),
            "Câu 1. Tính.\nĐáp án: 42\nCâu 2. Hai"
        );
    }

    #[test]
    fn empty_text_deletes_existing_answer_line() {
        let text = "Câu 1. Tính.\nĐáp án: 41\nCâu 2. Hai";
        assert_eq!(set_answer(text, 1, ""), "Câu 1. Tính.\nCâu 2. Hai");
    }

    #[test]
    fn empty_text_with_no_answer_line_is_noop() {
        let text = "Câu 1. Tính.\nCâu 2. Hai";
        assert_eq!(set_answer(text, 1, ""), text);
    }

    #[test]
    fn answer_for_invalid_question_is_noop() {
        let text = "văn bản\nĐáp án: 41";
        assert_eq!(set_answer(text, 1, "42"), text);
    }

    #[test]
    fn answer_line_of_next_question_is_not_touched() {
        let text = "Câu 1. Một.\nCâu 2. Hai.\nĐáp án: 9";
        assert_eq!(
            set_answer(text, 1, "5"),
            "Câu 1. Một.\nĐáp án: 5\nCâu 2. Hai.\nĐáp án: 9"
        );
    }
}
