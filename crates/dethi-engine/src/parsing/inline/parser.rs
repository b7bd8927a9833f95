use super::{
    cursor::Cursor,
    kinds::{BoldRun, FormulaRef, ImageRef},
    types::InlineToken,
};

/// Splits a content string into a sequence of render tokens.
///
/// Stateless; operates on one string at a time. Constructs that are not
/// closed degrade to literal text rather than failing; the grammar is
/// total over arbitrary input.
pub fn parse_inline(s: &str) -> Vec<InlineToken> {
    let mut cur = Cursor::new(s);
    let mut out = Vec::new();
    let mut text_start = 0usize;

    // Helper to flush accumulated literal text.
    fn flush_text(out: &mut Vec<InlineToken>, s: &str, start: usize, end: usize) {
        if end > start {
            out.push(InlineToken::Text(s[start..end].to_string()));
        }
    }

    while !cur.eof() {
        let at = cur.pos();
        let token = try_parse_formula(&mut cur)
            .or_else(|| try_parse_image(&mut cur))
            .or_else(|| try_parse_bold(&mut cur));
        if let Some(token) = token {
            flush_text(&mut out, s, text_start, at);
            text_start = cur.pos();
            out.push(token);
            continue;
        }
        cur.bump();
    }

    flush_text(&mut out, s, text_start, cur.pos());
    out
}

/// Attempts to parse a bold run at the current position.
///
/// Content runs to the first `]`. Returns `None` (cursor restored) when
/// the opener is absent or the run is not closed.
fn try_parse_bold(cur: &mut Cursor<'_>) -> Option<InlineToken> {
    if !cur.starts_with(BoldRun::OPEN) {
        return None;
    }

    let saved = cur.clone();
    cur.bump_n(BoldRun::OPEN.len());
    let inner_start = cur.pos();

    while !cur.eof() {
        if cur.peek() == Some(BoldRun::CLOSE) {
            break;
        }
        cur.bump();
    }

    if cur.peek() != Some(BoldRun::CLOSE) {
        *cur = saved;
        return None;
    }
    let inner_end = cur.pos();
    cur.bump(); // ]

    Some(InlineToken::Bold(cur.slice(inner_start, inner_end).to_string()))
}

fn try_parse_image(cur: &mut Cursor<'_>) -> Option<InlineToken> {
    parse_dollar_ref(cur, ImageRef::OPEN, ImageRef::CLOSE)
        .map(|id| InlineToken::Image { id })
}

fn try_parse_formula(cur: &mut Cursor<'_>) -> Option<InlineToken> {
    parse_dollar_ref(cur, FormulaRef::OPEN, FormulaRef::CLOSE)
        .map(|id| InlineToken::Formula { id })
}

/// Shared shape of `[img:$id$]` and `[!m:$id$]`: opener, id bytes, `$]`.
fn parse_dollar_ref(cur: &mut Cursor<'_>, open: &[u8], close: &[u8]) -> Option<String> {
    if !cur.starts_with(open) {
        return None;
    }

    let saved = cur.clone();
    cur.bump_n(open.len());
    let id_start = cur.pos();

    while !cur.eof() {
        if cur.starts_with(close) {
            let id = cur.slice(id_start, cur.pos()).to_string();
            cur.bump_n(close.len());
            return Some(id);
        }
        cur.bump();
    }

    *cur = saved;
    None
}
