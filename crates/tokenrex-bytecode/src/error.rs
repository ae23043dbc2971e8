use thiserror::Error;

use crate::instr::InstrId;

/// Structural problems a `Program` can be checked for before it's handed
/// to the virtual machine: a malformed program is an internal compiler
/// bug, not a pattern-author mistake, so this is a debug-assertion-style
/// safety net rather than a user-facing error path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgramError {
    #[error("program is empty")]
    Empty,
    #[error("instruction {0} does not end in Stop")]
    MissingStop(InstrId),
    #[error("instruction {at} jumps to out-of-range target {target}")]
    DanglingJump { at: InstrId, target: InstrId },
}
