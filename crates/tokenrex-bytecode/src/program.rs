use crate::error::ProgramError;
use crate::groups::GroupTable;
use crate::instr::{Instruction, InstrId};

/// A fully compiled pattern: a flat instruction vector plus the capture
/// group table needed to turn raw match spans back into named results.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    instructions: Vec<Instruction>,
    groups: GroupTable,
    /// Number of distinct mark slots used by `SetMark`/`CaptureMark`,
    /// sized up front so the virtual machine can pre-allocate its mark
    /// stack instead of growing it dynamically.
    mark_slots: usize,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>, groups: GroupTable, mark_slots: usize) -> Self {
        Self {
            instructions,
            groups,
            mark_slots,
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn get(&self, id: InstrId) -> Option<&Instruction> {
        self.instructions.get(id)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn groups(&self) -> &GroupTable {
        &self.groups
    }

    pub fn mark_slots(&self) -> usize {
        self.mark_slots
    }

    pub fn entry(&self) -> InstrId {
        0
    }

    /// Checks the structural invariants the emitter is expected to
    /// uphold: non-empty, ends in `Stop`, and every jump target lies
    /// within range. Intended for `debug_assert!`-style use after
    /// emission, not as a user-facing validation path.
    pub fn validate(&self) -> Result<(), ProgramError> {
        if self.instructions.is_empty() {
            return Err(ProgramError::Empty);
        }
        let last = self.instructions.len() - 1;
        if !matches!(self.instructions[last], Instruction::Stop) {
            return Err(ProgramError::MissingStop(last));
        }
        for (at, instr) in self.instructions.iter().enumerate() {
            for target in jump_targets(instr) {
                if target >= self.instructions.len() {
                    return Err(ProgramError::DanglingJump { at, target });
                }
            }
        }
        Ok(())
    }
}

fn jump_targets(instr: &Instruction) -> Vec<InstrId> {
    match instr {
        Instruction::Goto(t) | Instruction::ForeJump(t) | Instruction::BackJump(t) => vec![*t],
        Instruction::Alt(a, b) => vec![*a, *b],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_empty_program() {
        let program = Program::new(Vec::new(), GroupTable::new(), 0);
        assert_eq!(program.validate(), Err(ProgramError::Empty));
    }

    #[test]
    fn validate_rejects_missing_stop() {
        let program = Program::new(vec![Instruction::Any], GroupTable::new(), 0);
        assert_eq!(program.validate(), Err(ProgramError::MissingStop(0)));
    }

    #[test]
    fn validate_rejects_dangling_jump() {
        let program = Program::new(
            vec![Instruction::Goto(5), Instruction::Stop],
            GroupTable::new(),
            0,
        );
        assert_eq!(
            program.validate(),
            Err(ProgramError::DanglingJump { at: 0, target: 5 })
        );
    }

    #[test]
    fn validate_accepts_well_formed_program() {
        let program = Program::new(vec![Instruction::Any, Instruction::Stop], GroupTable::new(), 0);
        assert_eq!(program.validate(), Ok(()));
    }
}
