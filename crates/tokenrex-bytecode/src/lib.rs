//! The instruction set compiled patterns are lowered to, and the runtime
//! types (`Program`, `GroupTable`) shared between the compiler and the
//! virtual machine.

mod dump;
mod error;
mod groups;
mod instr;
mod program;

pub use dump::dump_program;
pub use error::ProgramError;
pub use groups::GroupTable;
pub use instr::{GroupId, InstrId, Instruction, MarkId, PositionKind};
pub use program::Program;

pub use tokenrex_core::DynamicWordPredicate;
