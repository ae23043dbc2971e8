use std::fmt::Write as _;

use crate::instr::Instruction;
use crate::program::Program;

/// Renders a program as a plain-text listing, one instruction per line,
/// in the style of a disassembler: `<id>: <mnemonic> <args>`.
///
/// Intended for debugging and for the `Tracer` implementations in
/// `tokenrex-vm` to print alongside a live trace; not a stable on-disk
/// format.
pub fn dump_program(program: &Program) -> String {
    let mut out = String::new();
    for (id, instr) in program.instructions().iter().enumerate() {
        let _ = write!(out, "{id:>4}: {:<16} {}", instr.mnemonic(), dump_args(instr));
        out.push('\n');
    }
    out
}

fn dump_args(instr: &Instruction) -> String {
    match instr {
        Instruction::Stop | Instruction::Nop | Instruction::Any | Instruction::SetJump => {
            String::new()
        }
        Instruction::Goto(target) => format!("-> {target}"),
        Instruction::Alt(a, b) => format!("-> {a}, {b}"),
        Instruction::SetMark(mark) => format!("mark={mark}"),
        Instruction::CaptureMark { group, mark } => format!("group={group} mark={mark}"),
        Instruction::GetJump { negate } => format!("negate={negate}"),
        Instruction::ForeJump(target) => format!("-> {target}"),
        Instruction::BackJump(target) => format!("-> {target}"),
        Instruction::Position(kind) => format!("{kind:?}"),
        Instruction::Ref { group, reversed } => format!("group={group} reversed={reversed}"),
        Instruction::Word(shapes) => format!("{shapes:?}"),
        Instruction::WordSet(shapes) => format!("{shapes:?}"),
        Instruction::DynamicWord(pred) => format!("{pred:?}"),
        Instruction::DynamicWordSet(preds) => format!("{preds:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::GroupTable;

    #[test]
    fn dump_lists_every_instruction_with_its_id() {
        let program = Program::new(
            vec![Instruction::Any, Instruction::Stop],
            GroupTable::new(),
            0,
        );
        let text = dump_program(&program);
        assert!(text.contains("0: any"));
        assert!(text.contains("1: stop"));
    }
}
