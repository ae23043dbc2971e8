use thiserror::Error;

use crate::diagnostics::Span;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unterminated group starting at {0:?}")]
    UnterminatedGroup(Span),
    #[error("unterminated character set starting at {0:?}")]
    UnterminatedSet(Span),
    #[error("space-delimited sub-pattern name starting at {0:?} is not closed with a space")]
    UnterminatedSth(Span),
    #[error("malformed repeat count at {0:?}")]
    MalformedRepeat(Span),
    #[error("repeat lower bound {min} exceeds upper bound {max} at {span:?}")]
    RepeatBoundsInverted { min: u32, max: u32, span: Span },
    #[error("quantifier at {0:?} has nothing to repeat")]
    NothingToRepeat(Span),
    #[error("unknown escape sequence '\\{0}' at {1:?}")]
    UnknownEscape(char, Span),
    #[error("undefined named back-reference '{0}' at {1:?}")]
    UndefinedBackref(String, Span),
    #[error("unexpected character '{0}' at {1:?}")]
    UnexpectedChar(char, Span),
    #[error("unexpected end of pattern")]
    UnexpectedEof,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
    #[error("reference to undefined named sub-pattern '{0}'")]
    UnknownSubpattern(String),
    #[error("named sub-pattern '{0}' expands into itself (cycle: {1})")]
    SubpatternCycle(String, String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("repeat count {0} exceeds the maximum of {1}")]
    RepeatCountTooLarge(u32, u32),
    #[error("internal error: unexpanded named sub-pattern '{0}' reached the emitter")]
    UnexpandedSubpattern(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Expand(#[from] ExpandError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}
