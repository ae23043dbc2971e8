mod word;

use std::str::Chars;

use crate::ast::{Ast, AstBuilder, LookKind, Node, NodeId};
use crate::diagnostics::Span;
use crate::error::ParseError;

pub use word::{is_chinese, is_special, scan_dynamic_word};

/// Parses a single pattern (the main pattern or one named sub-pattern
/// body) into an AST. Group numbering starts at 1 and is shared across a
/// call tree of named sub-patterns by the caller re-using the same
/// `next_group` counter — see `crate::compile::compile`.
pub struct Parser<'a> {
    chars: std::iter::Peekable<Chars<'a>>,
    pos: usize,
    source: &'a str,
    builder: AstBuilder,
    next_group: &'a mut usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, next_group: &'a mut usize) -> Self {
        Self {
            chars: source.chars().peekable(),
            pos: 0,
            source,
            builder: AstBuilder::new(),
            next_group,
        }
    }

    pub fn parse(mut self) -> Result<Ast, ParseError> {
        let root = self.parse_alternation()?;
        if let Some(c) = self.peek() {
            return Err(ParseError::UnexpectedChar(c, self.point()));
        }
        Ok(self.builder.finish(root))
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn point(&self) -> Span {
        Span::point(self.pos)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.pos)
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.builder.push(node)
    }

    fn parse_alternation(&mut self) -> Result<NodeId, ParseError> {
        let mut branches = vec![self.parse_concat()?];
        while self.peek() == Some('|') {
            self.bump();
            branches.push(self.parse_concat()?);
        }
        Ok(if branches.len() == 1 {
            branches.pop().unwrap()
        } else {
            self.push(Node::Alternate(branches))
        })
    }

    fn parse_concat(&mut self) -> Result<NodeId, ParseError> {
        let mut items = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            items.push(self.parse_quantified()?);
        }
        Ok(if items.is_empty() {
            self.push(Node::Empty)
        } else if items.len() == 1 {
            items.pop().unwrap()
        } else {
            self.push(Node::Concatenate(items))
        })
    }

    fn parse_quantified(&mut self) -> Result<NodeId, ParseError> {
        let start = self.pos;
        let atom = self.parse_atom()?;
        match self.peek() {
            Some('*') => {
                self.bump();
                self.finish_repeat(atom, 0, None, start)
            }
            Some('+') => {
                self.bump();
                self.finish_repeat(atom, 1, None, start)
            }
            Some('?') => {
                self.bump();
                self.finish_repeat(atom, 0, Some(1), start)
            }
            Some('{') => {
                self.bump();
                let (min, max) = self.scan_bounds(start)?;
                self.finish_repeat(atom, min, max, start)
            }
            _ => Ok(atom),
        }
    }

    fn finish_repeat(
        &mut self,
        child: NodeId,
        min: u32,
        max: Option<u32>,
        start: usize,
    ) -> Result<NodeId, ParseError> {
        if let Some(max) = max {
            if min > max {
                return Err(ParseError::RepeatBoundsInverted {
                    min,
                    max,
                    span: self.span_from(start),
                });
            }
        }
        let greedy = if self.peek() == Some('?') {
            self.bump();
            false
        } else {
            true
        };
        Ok(self.push(Node::Repeat {
            child,
            min,
            max,
            greedy,
        }))
    }

    /// Scans the body of a `{...}` bound. Reproduces the original
    /// accumulator's digit-folding bug rather than a correct
    /// `num = num * 10 + digit`, so multi-digit bounds beyond a single
    /// digit come out wrong; this is intentional source parity (see
    /// `SPEC_FULL.md` §2.3) rather than an oversight.
    fn scan_number_buggy(&mut self) -> u32 {
        let mut num: u32 = 0;
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            self.bump();
            let digit = c.to_digit(10).unwrap();
            num = num + num * 10 + digit;
        }
        num
    }

    fn scan_bounds(&mut self, start: usize) -> Result<(u32, Option<u32>), ParseError> {
        let min = self.scan_number_buggy();
        let max = match self.peek() {
            Some(',') => {
                self.bump();
                if self.peek() == Some('}') {
                    None
                } else {
                    Some(self.scan_number_buggy())
                }
            }
            _ => Some(min),
        };
        match self.bump() {
            Some('}') => Ok((min, max)),
            _ => Err(ParseError::MalformedRepeat(self.span_from(start))),
        }
    }

    fn parse_atom(&mut self) -> Result<NodeId, ParseError> {
        let start = self.pos;
        match self.peek() {
            None => Err(ParseError::UnexpectedEof),
            Some('(') => self.parse_group(),
            Some('[') => self.parse_set(),
            Some('<') => self.parse_angle(),
            Some('.') => {
                self.bump();
                Ok(self.push(Node::Any))
            }
            Some('^') => {
                self.bump();
                Ok(self.push(Node::Position { start: true }))
            }
            Some('$') => {
                self.bump();
                Ok(self.push(Node::Position { start: false }))
            }
            Some('\\') => self.parse_backref(false),
            Some('/') => self.parse_backref(true),
            Some(' ') => self.parse_sth(),
            Some('*') | Some('+') | Some('?') | Some(')') | Some('}') | Some(']') => {
                Err(ParseError::NothingToRepeat(self.span_from(start)))
            }
            Some(c) if is_chinese(c) => {
                self.bump();
                Ok(self.push(Node::Word(c.to_string())))
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let rest = &self.source[self.pos..];
                let (pred, consumed) =
                    scan_dynamic_word(rest).expect("ascii alphabetic start scans a DynamicWord");
                let target = self.pos + consumed;
                while self.pos < target {
                    self.bump();
                }
                Ok(self.push(Node::DynamicWord(pred)))
            }
            Some(_) => self.parse_literal_run(),
        }
    }

    /// Scans a space-delimited named sub-pattern reference: ` name ` (the
    /// leading space already peeked, consumed here) produces `Node::Sth`.
    fn parse_sth(&mut self) -> Result<NodeId, ParseError> {
        let start = self.pos;
        self.bump(); // leading ' '
        let name = self
            .scan_identifier()
            .ok_or_else(|| ParseError::UnterminatedSth(self.span_from(start)))?;
        match self.bump() {
            Some(' ') => Ok(self.push(Node::Sth(name))),
            _ => Err(ParseError::UnterminatedSth(self.span_from(start))),
        }
    }

    /// Scans an identifier: a leading alphabetic/`_` character followed by
    /// any number of alphanumeric/`_` characters.
    fn scan_identifier(&mut self) -> Option<String> {
        let mut name = String::new();
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => {
                name.push(c);
                self.bump();
            }
            _ => return None,
        }
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Some(name)
    }

    fn parse_literal_run(&mut self) -> Result<NodeId, ParseError> {
        let mut literal = String::new();
        while let Some(c) = self.peek() {
            if is_special(c) || is_chinese(c) {
                break;
            }
            literal.push(c);
            self.bump();
        }
        if literal.is_empty() {
            return Err(ParseError::UnexpectedChar(
                self.peek().unwrap_or('\0'),
                self.point(),
            ));
        }
        Ok(self.push(Node::Word(literal)))
    }

    fn parse_backref(&mut self, reversed: bool) -> Result<NodeId, ParseError> {
        let start = self.pos;
        self.bump(); // consume '\' or '/'
        match self.peek() {
            Some('p') => {
                self.bump();
                if self.bump() != Some('<') {
                    return Err(ParseError::UnexpectedChar('<', self.point()));
                }
                let name = self.scan_until('>')?;
                Ok(self.push(Node::NamedRef { name, reversed }))
            }
            Some(c) if c.is_ascii_digit() => {
                let n = self.scan_number_buggy() as usize;
                Ok(self.push(Node::Ref {
                    group: n,
                    reversed,
                }))
            }
            Some(c) => Err(ParseError::UnknownEscape(c, self.span_from(start))),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn scan_until(&mut self, terminator: char) -> Result<String, ParseError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == terminator => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(ParseError::UnexpectedEof),
            }
        }
    }

    fn parse_set(&mut self) -> Result<NodeId, ParseError> {
        let start = self.pos;
        self.bump(); // '['
        let body = self.scan_until(']').map_err(|_| ParseError::UnterminatedSet(self.span_from(start)))?;
        Ok(self.push(word::scan_set(&body, self.span_from(start))?))
    }

    fn parse_angle(&mut self) -> Result<NodeId, ParseError> {
        let start = self.pos;
        self.bump(); // '<'
        let body = self.scan_until('>').map_err(|_| ParseError::UnterminatedGroup(self.span_from(start)))?;
        Ok(self.push(word::scan_struct(&body)))
    }

    fn parse_group(&mut self) -> Result<NodeId, ParseError> {
        let start = self.pos;
        self.bump(); // '('
        let (kind, capturing, name) = self.scan_group_header()?;
        let body = self.parse_alternation()?;
        if self.bump() != Some(')') {
            return Err(ParseError::UnterminatedGroup(self.span_from(start)));
        }
        let node = match kind {
            Some(look) => Node::Condition { kind: look, child: body },
            None if capturing => {
                let index = *self.next_group;
                *self.next_group += 1;
                Node::Capture {
                    index,
                    name,
                    child: body,
                }
            }
            None => return Ok(body),
        };
        Ok(self.push(node))
    }

    /// Returns `(lookaround_kind, is_capturing, name)` for the header
    /// that follows an already-consumed `(`.
    fn scan_group_header(
        &mut self,
    ) -> Result<(Option<LookKind>, bool, Option<String>), ParseError> {
        if self.peek() != Some('?') {
            return Ok((None, true, None));
        }
        self.bump(); // '?'
        match self.peek() {
            Some(':') => {
                self.bump();
                Ok((None, false, None))
            }
            Some('=') => {
                self.bump();
                Ok((Some(LookKind::Ahead), false, None))
            }
            Some('!') => {
                self.bump();
                Ok((Some(LookKind::AheadNeg), false, None))
            }
            Some('<') => {
                self.bump();
                match self.peek() {
                    Some('=') => {
                        self.bump();
                        Ok((Some(LookKind::Behind), false, None))
                    }
                    Some('!') => {
                        self.bump();
                        Ok((Some(LookKind::BehindNeg), false, None))
                    }
                    _ => {
                        let name = self.scan_until('>')?;
                        Ok((None, true, Some(name)))
                    }
                }
            }
            _ => Err(ParseError::UnexpectedChar(
                self.peek().unwrap_or('\0'),
                self.point(),
            )),
        }
    }
}
