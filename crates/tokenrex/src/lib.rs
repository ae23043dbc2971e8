//! Public entry point: compiles a pattern against a stream of word
//! tokens and finds matches within it.

pub use tokenrex_compiler::{CompileError, CompileOptions, EmitError, ExpandError, ParseError};
pub use tokenrex_core::{matches_dynamic, DynamicWordPredicate, Token};
pub use tokenrex_vm::{MatchResult, NoopTracer, PrintTracer, Runner, RunnerBuilder, RunnerLimits, Tracer};

/// Compiles `pattern` into a `Runner` ready to match against token
/// slices. `options` carries any named sub-patterns the pattern
/// references via `<name>`, `\p<name>`, or `/p<name>`.
pub fn compile(pattern: &str, options: &CompileOptions) -> Result<Runner, CompileError> {
    let program = tokenrex_compiler::compile(pattern, options)?;
    Ok(Runner::new(program))
}

/// Finds the first match anywhere in `tokens`, trying successive start
/// positions left to right.
pub fn find(runner: &Runner, tokens: &[Token]) -> Option<MatchResult> {
    (0..=tokens.len()).find_map(|start| runner.try_match_at(tokens, start))
}

/// Finds every non-overlapping match in `tokens`, left to right. After a
/// match, the next search resumes right after it; a zero-width match
/// advances the search position by one token so the scan always makes
/// progress.
pub fn find_all(runner: &Runner, tokens: &[Token]) -> Vec<MatchResult> {
    let mut results = Vec::new();
    let mut start = 0;
    while start <= tokens.len() {
        match (start..=tokens.len()).find_map(|s| runner.try_match_at(tokens, s)) {
            Some(m) => {
                let next = if m.end > m.start { m.end } else { m.start + 1 };
                start = next;
                results.push(m);
            }
            None => break,
        }
    }
    results
}
