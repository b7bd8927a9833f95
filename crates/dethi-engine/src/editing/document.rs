use xi_rope::Rope;

use crate::editing::{Cmd, Patch};
use crate::parsing::{ParsedExam, parse_document};

/// The raw annotated exam text.
///
/// Owns the buffer; 1-based line numbering over it is the stable
/// addressing scheme shared with the parsed block list. The document is
/// only ever changed by [`RawDocument::apply`], which returns a *new*
/// document; holders of the old one keep a stable snapshot.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// xi-rope buffer containing the entire text as UTF-8.
    buffer: Rope,
    /// Incremented on every applied edit; lets downstream holders detect
    /// that their snapshot went stale.
    version: u64,
}

impl RawDocument {
    /// Creates a document from raw bytes, validating UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::from(text))
    }

    /// The current text content (exact round-trip of the buffer).
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// The underlying rope buffer.
    pub fn rope(&self) -> &Rope {
        &self.buffer
    }

    /// The current version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Buffer length in bytes.
    pub(crate) fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Runs the forward parse over the current buffer.
    pub fn parse(&self) -> ParsedExam {
        parse_document(&self.buffer)
    }

    /// Applies a command, returning the new document and a patch.
    ///
    /// Pure: `self` is left untouched. The command is compiled against the
    /// current buffer (boundaries are re-derived from live text, never
    /// from a cached block list); commands that cannot locate their target
    /// compile to the identity delta, and the returned document then has
    /// identical content at a bumped version.
    pub fn apply(&self, cmd: &Cmd) -> (RawDocument, Patch) {
        let delta = crate::editing::commands::compile_command(self, cmd);

        // Track changed ranges (positions in the new buffer).
        let mut changed = Vec::new();
        let mut cursor = 0;
        for op in delta.els.iter() {
            match op {
                xi_rope::delta::DeltaElement::Copy(_from, to) => {
                    cursor = *to;
                }
                xi_rope::delta::DeltaElement::Insert(inserted) => {
                    let start = cursor;
                    let end = cursor + inserted.len();
                    changed.push(start..end);
                    cursor = end;
                }
            }
        }

        let buffer = delta.apply(&self.buffer);
        let version = self.version + 1;
        (
            RawDocument { buffer, version },
            Patch { changed, version },
        )
    }
}

impl From<&str> for RawDocument {
    fn from(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
            version: 0,
        }
    }
}

impl PartialEq for RawDocument {
    fn eq(&self, other: &Self) -> bool {
        // Node comparison is structural in xi-rope; content equality is
        // what callers mean here.
        self.buffer.to_string() == other.buffer.to_string() && self.version == other.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_valid_utf8() {
        let text = "Câu 1. Thủ đô?\nA. Hà Nội\n";
        let doc = RawDocument::from_bytes(text.as_bytes()).unwrap();
        assert_eq!(doc.text(), text);
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn from_bytes_invalid_utf8() {
        let invalid = vec![0xFF, 0xFE, 0xFD];
        assert!(RawDocument::from_bytes(&invalid).is_err());
    }

    #[test]
    fn text_preserves_line_endings() {
        let text = "dòng một\r\ndòng hai\nba";
        let doc = RawDocument::from(text);
        assert_eq!(doc.text(), text);
    }

    #[test]
    fn apply_bumps_version_and_keeps_original() {
        let doc = RawDocument::from("Câu 1. Một? A. x B. y");
        let (next, patch) = doc.apply(&Cmd::ToggleChoice {
            question_line: 1,
            letter: 'A',
        });
        assert_eq!(doc.version(), 0);
        assert_eq!(doc.text(), "Câu 1. Một? A. x B. y");
        assert_eq!(next.version(), 1);
        assert_eq!(patch.version, 1);
        assert_eq!(next.text(), "Câu 1. Một? *A. x B. y");
    }

    #[test]
    fn noop_command_changes_nothing_but_version() {
        let doc = RawDocument::from("chỉ là văn bản thường");
        let (next, patch) = doc.apply(&Cmd::ToggleChoice {
            question_line: 1,
            letter: 'A',
        });
        assert_eq!(next.text(), doc.text());
        assert!(patch.changed.is_empty());
        assert_eq!(next.version(), 1);
    }

    #[test]
    fn parse_of_document_matches_free_function() {
        let doc = RawDocument::from("Câu 1. Một? A. x *B. y");
        let parsed = doc.parse();
        assert_eq!(parsed, crate::parsing::parse_document(doc.rope()));
    }
}
