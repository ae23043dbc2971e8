mod trace;
mod vm;

pub use trace::{NoopTracer, PrintTracer, Tracer};
pub use vm::{MatchResult, Runner, RunnerBuilder, RunnerLimits};
