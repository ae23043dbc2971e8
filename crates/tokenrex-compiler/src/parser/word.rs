use tokenrex_core::DynamicWordPredicate;

use crate::ast::Node;
use crate::diagnostics::Span;
use crate::error::ParseError;

/// A Unicode scalar in the CJK Unified Ideographs block is treated as its
/// own token-sized literal, since in this domain a single ideograph is
/// ordinarily one token, unlike space-delimited Latin-script words.
pub fn is_chinese(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

pub fn is_special(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | '|' | '*' | '+' | '?' | '{' | '}' | '[' | ']' | '.' | '^' | '$' | '\\' | '/'
            | '<' | '>' | ' ' | '\t' | '\n'
    )
}

/// The ten contiguous Unicode "circled digit" code points `①`-`⑩`
/// (U+2460-U+2469) that introduce a `pos2` constraint in a `DynamicWord`.
fn is_circled_digit(c: char) -> bool {
    ('\u{2460}'..='\u{2469}').contains(&c)
}

/// Scans a single `DynamicWord` predicate from the front of `text`: an
/// ASCII letter (`pos`), optionally followed by either a decimal digit
/// (`length`) or a circled digit (`pos2`, itself optionally followed by one
/// more decimal digit for `length`). Returns the predicate and the number
/// of bytes consumed, or `None` if `text` doesn't start with an ASCII
/// letter.
pub fn scan_dynamic_word(text: &str) -> Option<(DynamicWordPredicate, usize)> {
    let mut chars = text.chars();
    let pos = chars.next()?;
    if !pos.is_ascii_alphabetic() {
        return None;
    }
    let mut pred = DynamicWordPredicate::new();
    pred.pos = Some(pos);
    let mut consumed = pos.len_utf8();

    let mut rest_chars = text[consumed..].chars();
    match rest_chars.next() {
        Some(c) if c.is_ascii_digit() => {
            pred.length = Some(c.to_digit(10).unwrap() as usize);
            consumed += c.len_utf8();
        }
        Some(c) if is_circled_digit(c) => {
            pred.pos2 = Some(c);
            consumed += c.len_utf8();
            if let Some(d) = text[consumed..].chars().next() {
                if d.is_ascii_digit() {
                    pred.length = Some(d.to_digit(10).unwrap() as usize);
                    consumed += d.len_utf8();
                }
            }
        }
        _ => {}
    }
    Some((pred, consumed))
}

/// Parses the body of a `[...]` set.
///
/// - `[#W1|W2|...]` is a pipe-delimited list of literal shapes.
/// - A plain body made entirely of CJK characters is a per-character list
///   of literal shapes (`[汉字]` is the same as `[#汉|字]`).
/// - A plain body made of ASCII letters is a sequence of one-letter
///   `DynamicWord` predicates (`[amv]` is `a`, `m`, `v` as alternatives),
///   compiled into a `DynamicWordSet`.
pub fn scan_set(body: &str, span: Span) -> Result<Node, ParseError> {
    if let Some(rest) = body.strip_prefix('#') {
        let words: Vec<String> = rest.split('|').map(|s| s.to_string()).collect();
        if words.iter().any(|w| w.is_empty()) {
            return Err(ParseError::UnterminatedSet(span));
        }
        return Ok(Node::WordSet(words));
    }

    let mut chars = body.chars();
    match chars.next() {
        Some(c) if is_chinese(c) => {
            let mut words = Vec::new();
            for ch in body.chars() {
                if !is_chinese(ch) {
                    return Err(ParseError::UnterminatedSet(span));
                }
                words.push(ch.to_string());
            }
            Ok(Node::WordSet(words))
        }
        Some(c) if c.is_ascii_alphabetic() => {
            let mut preds = Vec::new();
            let mut rest = body;
            while let Some((pred, consumed)) = scan_dynamic_word(rest) {
                preds.push(pred);
                rest = &rest[consumed..];
            }
            if !rest.is_empty() || preds.is_empty() {
                return Err(ParseError::UnterminatedSet(span));
            }
            Ok(Node::DynamicWordSet(preds))
        }
        _ => Err(ParseError::UnterminatedSet(span)),
    }
}

/// Parses a `<...>` construct that is not a named-group header: `<tag>`
/// compiles to a `DynamicWord` predicate on `semantic_tag`, while the
/// `<#tag>` shorthand compiles to one on `struct_tag`.
pub fn scan_struct(body: &str) -> Node {
    let mut pred = DynamicWordPredicate::new();
    if let Some(tag) = body.strip_prefix('#') {
        pred.struct_tag = Some(tag.to_string());
    } else {
        pred.semantic_tag = Some(body.to_string());
    }
    Node::DynamicWord(pred)
}
