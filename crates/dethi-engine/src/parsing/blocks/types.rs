/// One of the three exam parts. The current part decides which answer
/// grammar applies to question bodies and how a question's type resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    One,
    Two,
    Three,
}

impl Part {
    /// The part number as displayed (1, 2 or 3).
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Part::One => 1,
            Part::Two => 2,
            Part::Three => 3,
        }
    }
}

/// The resolved type of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionType {
    /// Part 1: uppercase options, single correct answer.
    MultipleChoice,
    /// Part 2: lowercase assertions, each independently true or false.
    TrueFalse,
    /// Part 3: no options; the value lives on a `Đáp án:` line.
    ShortAnswer,
}

/// One answer option extracted from a question body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Option letter: uppercase `A`-`H` for multiple choice, lowercase
    /// `a`-`d` for true/false. The two populations never mix within one
    /// question.
    pub letter: char,
    /// Display text of the option, trimmed.
    pub content: String,
    /// Whether the marker carried the `*` correct flag.
    pub is_correct: bool,
    /// 1-based line the marker occurs on. Several answers extracted from
    /// the same physical line share this number; synchronization addresses
    /// lines, not columns.
    pub line: usize,
}

/// A question block with its body content and typed answer set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Exam-assigned index, not necessarily sequential or unique.
    pub index: u32,
    pub kind: QuestionType,
    /// 1-based line of the question header. This is the identity the
    /// mutation commands address a question by.
    pub source_line: usize,
    /// Display content lines, in order.
    pub content: Vec<String>,
    pub answers: Vec<Answer>,
    /// Current short-answer value, captured from a `Đáp án:` line in
    /// part 3. `None` for other question types or when no value line
    /// exists yet.
    pub written_answer: Option<String>,
}

/// A parsed block. Closed set: every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    SectionHeader {
        part: Part,
        text: String,
        line: usize,
    },
    Question(Question),
    PlainText {
        text: String,
        line: usize,
    },
}

impl Block {
    /// The 1-based source line this block starts on, for scroll/highlight
    /// requests from the presentation layer.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Block::SectionHeader { line, .. } | Block::PlainText { line, .. } => *line,
            Block::Question(q) => q.source_line,
        }
    }
}
