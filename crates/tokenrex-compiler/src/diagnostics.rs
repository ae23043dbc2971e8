/// A byte-offset range into the original pattern string, used to anchor
/// an error to the text that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn point(at: usize) -> Self {
        Self { start: at, end: at + 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A rendered diagnostic: a message tied to a span, with enough context
/// to reproduce an `annotate-snippets`-style underlined report.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span,
        }
    }

    /// Renders this diagnostic against the source pattern using
    /// `annotate-snippets`, producing a human-readable, underlined report.
    /// Falls back to a plain one-line message when no span is available.
    pub fn render(&self, pattern: &str) -> String {
        use annotate_snippets::{Level, Renderer, Snippet};

        let Some(span) = self.span else {
            return self.message.clone();
        };
        let level = match self.severity {
            Severity::Error => Level::Error,
            Severity::Warning => Level::Warning,
        };
        let message = level.title(&self.message).snippet(
            Snippet::source(pattern)
                .line_start(1)
                .annotation(level.span(span.start..span.end)),
        );
        let renderer = Renderer::plain();
        renderer.render(message).to_string()
    }
}
