use serde::{Deserialize, Serialize};

/// A single token in the stream a pattern is matched against.
///
/// All fields are optional: a pattern only inspects the fields its
/// predicates reference, so callers are free to leave the rest unset.
/// There is no stored length field — a `DynamicWord` length constraint is
/// checked against `shape`'s character count instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface form, e.g. `"apple"` or `"苹果"`.
    pub shape: Option<String>,
    /// Part-of-speech tag.
    pub cixing: Option<String>,
    /// Coarse structural role (e.g. `"NP"`, `"VP"`).
    #[serde(rename = "struct")]
    pub struct_tag: Option<String>,
    /// Semantic/sense tag.
    pub semantic: Option<String>,
    /// Part-of-speech code(s); a `DynamicWord` predicate's `pos` is a
    /// single character checked for containment here, not equality.
    pub pos: Option<String>,
    /// Part-of-speech sub-class code(s); a predicate's `pos`+`pos2` pair
    /// is checked for containment here as a two-character string.
    pub pos2: Option<String>,
}

impl Token {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    pub fn with_cixing(mut self, cixing: impl Into<String>) -> Self {
        self.cixing = Some(cixing.into());
        self
    }

    pub fn with_struct_tag(mut self, struct_tag: impl Into<String>) -> Self {
        self.struct_tag = Some(struct_tag.into());
        self
    }

    pub fn with_semantic(mut self, semantic: impl Into<String>) -> Self {
        self.semantic = Some(semantic.into());
        self
    }

    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }

    pub fn with_pos2(mut self, pos2: impl Into<String>) -> Self {
        self.pos2 = Some(pos2.into());
        self
    }

    /// True if this token immediately follows (or is) a line break, per
    /// the `cixing == "\n"` convention the source tags newline pseudo-tokens
    /// with.
    pub fn is_newline(&self) -> bool {
        self.cixing.as_deref() == Some("\n")
    }
}
