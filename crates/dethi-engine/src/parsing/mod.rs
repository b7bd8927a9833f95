pub mod answers;
pub mod blocks;
pub mod classify;
pub mod inline;
pub mod rope;

use xi_rope::Rope;

use blocks::{Block, ExamScanner, Question};
use classify::LineClassifier;
use rope::lines_with_spans;

/// The result of one forward scan: an ordered list of typed blocks, each
/// tagged with the 1-based source line(s) it came from.
///
/// Produced fresh on every parse; nothing here points back into the
/// buffer. The scan is linear and cheap, so callers re-run it after every
/// raw-text change instead of patching the block list incrementally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedExam {
    pub blocks: Vec<Block>,
}

impl ParsedExam {
    /// Iterates the question blocks in document order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Question(q) => Some(q),
            _ => None,
        })
    }
}

/// Parses the whole buffer into blocks. Pure; total over arbitrary text.
pub fn parse_document(rope: &Rope) -> ParsedExam {
    let classifier = LineClassifier::new();
    let lines: Vec<_> = lines_with_spans(rope).collect();
    let scanner = ExamScanner::new(&classifier, &lines);
    ParsedExam {
        blocks: scanner.run(),
    }
}
