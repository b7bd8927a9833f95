use crate::parsing::answers::{LineAnswers, scan_assertion_line, scan_choice_line};
use crate::parsing::classify::{LineClassifier, LineKind};
use crate::parsing::rope::LineRef;

use super::types::{Answer, Block, Part, Question, QuestionType};

/// Accumulator for the question currently being assembled.
#[derive(Debug)]
struct QuestionDraft {
    index: u32,
    source_line: usize,
    content: Vec<String>,
    answers: Vec<Answer>,
    written_answer: Option<String>,
    saw_assertions: bool,
}

impl QuestionDraft {
    fn new(index: u32, source_line: usize) -> Self {
        Self {
            index,
            source_line,
            content: Vec::new(),
            answers: Vec::new(),
            written_answer: None,
            saw_assertions: false,
        }
    }
}

/// The forward scan over the line arena.
///
/// Two states: scanning between blocks, or accumulating an open question.
/// The scan position is an explicit cursor; a line that closes a question
/// (next question, section header, end marker) is re-processed from the
/// scanning state without advancing past it. The current part is scanner
/// state, updated only by explicit header lines.
///
/// The scanner never fails: unmatched markers degrade to content,
/// unterminated questions are closed at end of input, duplicate question
/// indices are kept as separate blocks.
pub struct ExamScanner<'a> {
    classifier: &'a LineClassifier,
    lines: &'a [LineRef],
    pos: usize,
    part: Part,
    open: Option<QuestionDraft>,
    out: Vec<Block>,
}

impl<'a> ExamScanner<'a> {
    pub fn new(classifier: &'a LineClassifier, lines: &'a [LineRef]) -> Self {
        Self {
            classifier,
            lines,
            pos: 0,
            part: Part::One,
            open: None,
            out: Vec::new(),
        }
    }

    /// Runs the scan to completion and returns the block list.
    pub fn run(mut self) -> Vec<Block> {
        while self.pos < self.lines.len() {
            let line = &self.lines[self.pos];
            let kind = self.classifier.classify(&line.text);
            if self.open.is_some() {
                self.step_in_question(line, kind);
            } else {
                self.step_scanning(line, kind);
            }
        }
        // EOF closes an unterminated question.
        self.flush_question();
        self.out
    }

    fn step_scanning(&mut self, line: &LineRef, kind: LineKind) {
        match kind {
            LineKind::Blank | LineKind::MarkerOnly => {}
            LineKind::SectionHeader { part, text } => {
                self.part = part;
                self.out.push(Block::SectionHeader {
                    part,
                    text,
                    line: line.number,
                });
            }
            LineKind::QuestionStart { index, remainder } => {
                let mut draft = QuestionDraft::new(index, line.number);
                if !remainder.is_empty() {
                    consume_body_line(self.part, &mut draft, &remainder, line.number);
                }
                self.open = Some(draft);
            }
            LineKind::EndOfExam | LineKind::Content => {
                let text = clean_content(&line.text);
                if !text.is_empty() {
                    self.out.push(Block::PlainText {
                        text,
                        line: line.number,
                    });
                }
            }
        }
        self.pos += 1;
    }

    fn step_in_question(&mut self, line: &LineRef, kind: LineKind) {
        match kind {
            LineKind::QuestionStart { .. } | LineKind::SectionHeader { .. } | LineKind::EndOfExam => {
                // Close the question and re-process this line without
                // advancing the cursor.
                self.flush_question();
            }
            LineKind::Blank | LineKind::MarkerOnly => {
                self.pos += 1;
            }
            LineKind::Content => {
                let draft = self.open.as_mut().expect("in-question state has a draft");
                consume_body_line(self.part, draft, &line.text, line.number);
                self.pos += 1;
            }
        }
    }

    fn flush_question(&mut self) {
        if let Some(draft) = self.open.take() {
            let kind = if self.part == Part::Three {
                QuestionType::ShortAnswer
            } else if draft.saw_assertions {
                QuestionType::TrueFalse
            } else {
                QuestionType::MultipleChoice
            };
            self.out.push(Block::Question(Question {
                index: draft.index,
                kind,
                source_line: draft.source_line,
                content: draft.content,
                answers: draft.answers,
                written_answer: draft.written_answer,
            }));
        }
    }
}

/// Feeds one body line (or the question header's remainder) into the
/// draft, applying the answer grammar the current part selects.
fn consume_body_line(part: Part, draft: &mut QuestionDraft, text: &str, number: usize) {
    match part {
        Part::One => {
            if let Some(found) = scan_choice_line(text.trim()) {
                push_answers(draft, found, number, false);
                return;
            }
        }
        Part::Two => {
            if let Some(found) = scan_assertion_line(text.trim()) {
                push_answers(draft, found, number, true);
                return;
            }
        }
        Part::Three => {
            if let Some(value) = written_answer_value(text) {
                draft.written_answer = Some(value);
                return;
            }
        }
    }

    let cleaned = clean_content(text);
    if !cleaned.is_empty() {
        draft.content.push(cleaned);
    }
}

fn push_answers(draft: &mut QuestionDraft, found: LineAnswers, number: usize, assertions: bool) {
    if !found.stem.is_empty() {
        let stem = clean_content(&found.stem);
        if !stem.is_empty() {
            draft.content.push(stem);
        }
    }
    for mark in found.marks {
        draft.answers.push(Answer {
            letter: mark.letter,
            content: mark.content,
            is_correct: mark.is_correct,
            line: number,
        });
    }
    if assertions {
        draft.saw_assertions = true;
    }
}

/// Extracts the value of a `Đáp án:` line, if this is one.
pub(crate) fn written_answer_value(text: &str) -> Option<String> {
    text.trim()
        .strip_prefix("Đáp án:")
        .map(|rest| rest.trim().to_string())
}

/// Cleans a display line: trims and drops formatting-only wrapper debris
/// (a dangling bold opener the serializer split across lines, an orphan
/// closing bracket). Inline tokens with both ends present are kept for the
/// inline parser.
fn clean_content(text: &str) -> String {
    let mut s = text.trim();
    if let Some(rest) = s.strip_suffix("[!b:") {
        s = rest.trim_end();
    }
    if let Some(rest) = s.strip_prefix(']') {
        s = rest.trim_start();
    }
    s.to_string()
}
