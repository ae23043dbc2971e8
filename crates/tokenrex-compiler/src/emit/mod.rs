use tokenrex_bytecode::{GroupTable, InstrId, Instruction, PositionKind, Program};

use crate::ast::{Ast, LookKind, Node, NodeId};
use crate::error::EmitError;

/// Largest repeat count accepted by a bounded `{m,n}` quantifier. Chosen
/// to keep pathological patterns like `x{999999}` from unrolling into an
/// unbounded amount of bytecode.
pub const MAX_REPEAT_COUNT: u32 = 1000;

/// Walks a rewritten AST and lowers it to a flat, id-addressed
/// `Instruction` program.
///
/// Forward jump targets are backpatched: a choice point (`Alt`) or an
/// unconditional jump (`Goto`) is first emitted as a placeholder whose
/// target is filled in once the code it needs to point past has actually
/// been emitted, rather than computing successor positions by hand while
/// walking the tree (the approach the bytecode format's stack-splicing
/// ancestor used). Instruction *semantics* are unaffected; only how their
/// operands are computed is cleaner this way.
pub struct Emitter {
    instructions: Vec<Instruction>,
    next_mark: usize,
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
            next_mark: 0,
        }
    }

    pub fn emit(mut self, ast: &Ast, groups: GroupTable) -> Result<Program, EmitError> {
        self.emit_node(ast, ast.root())?;
        self.instructions.push(Instruction::Stop);
        let program = Program::new(self.instructions, groups, self.next_mark);
        debug_assert!(
            program.validate().is_ok(),
            "emitter produced a malformed program: {:?}",
            program.validate()
        );
        Ok(program)
    }

    fn here(&self) -> InstrId {
        self.instructions.len()
    }

    fn push(&mut self, instr: Instruction) -> InstrId {
        let id = self.here();
        self.instructions.push(instr);
        id
    }

    /// Pushes a placeholder to be overwritten later by `patch`.
    fn reserve(&mut self) -> InstrId {
        self.push(Instruction::Nop)
    }

    fn patch(&mut self, at: InstrId, instr: Instruction) {
        self.instructions[at] = instr;
    }

    fn fresh_mark(&mut self) -> usize {
        let mark = self.next_mark;
        self.next_mark += 1;
        mark
    }

    fn emit_node(&mut self, ast: &Ast, id: NodeId) -> Result<(), EmitError> {
        match ast.get(id) {
            Node::Concatenate(children) => {
                for &child in children {
                    self.emit_node(ast, child)?;
                }
                Ok(())
            }
            Node::Alternate(children) => self.emit_alternate(ast, children),
            Node::Capture { index, child, .. } => self.emit_capture(ast, *index, *child),
            Node::Repeat {
                child,
                min,
                max,
                greedy,
            } => self.emit_repeat(ast, *child, *min, *max, *greedy),
            Node::Condition { kind, child } => self.emit_condition(ast, *kind, *child),
            Node::Word(shape) => {
                self.push(Instruction::Word(vec![shape.clone()]));
                Ok(())
            }
            Node::WordSet(shapes) => {
                self.push(Instruction::WordSet(shapes.clone()));
                Ok(())
            }
            Node::DynamicWord(pred) => {
                self.push(Instruction::DynamicWord(pred.clone()));
                Ok(())
            }
            Node::DynamicWordSet(preds) => {
                self.push(Instruction::DynamicWordSet(preds.clone()));
                Ok(())
            }
            Node::Any => {
                self.push(Instruction::Any);
                Ok(())
            }
            Node::Position { start } => {
                let kind = if *start {
                    PositionKind::LineStart
                } else {
                    PositionKind::LineEnd
                };
                self.push(Instruction::Position(kind));
                Ok(())
            }
            Node::Ref { group, reversed } => {
                self.push(Instruction::Ref {
                    group: *group,
                    reversed: *reversed,
                });
                Ok(())
            }
            Node::Empty => Ok(()),
            Node::Sth(name) => Err(EmitError::UnexpandedSubpattern(name.clone())),
            Node::NamedRef { name, .. } => Err(EmitError::UnexpandedSubpattern(name.clone())),
        }
    }

    /// `Alt(a, b)` chosen first-to-last matches ordered-choice semantics:
    /// branch 0 is tried first, falling through to branch 1 only on
    /// backtrack, and so on for additional branches via a right-leaning
    /// chain of `Alt`s.
    fn emit_alternate(&mut self, ast: &Ast, children: &[NodeId]) -> Result<(), EmitError> {
        let mut end_patches = Vec::new();
        for (i, &child) in children.iter().enumerate() {
            let is_last = i == children.len() - 1;
            if is_last {
                self.emit_node(ast, child)?;
                break;
            }
            let alt_at = self.reserve();
            let branch_start = self.here();
            self.emit_node(ast, child)?;
            let goto_end = self.reserve();
            end_patches.push(goto_end);
            let next_branch = self.here();
            self.patch(alt_at, Instruction::Alt(branch_start, next_branch));
        }
        let end = self.here();
        for patch_at in end_patches {
            self.patch(patch_at, Instruction::Goto(end));
        }
        Ok(())
    }

    fn emit_capture(&mut self, ast: &Ast, group: usize, child: NodeId) -> Result<(), EmitError> {
        let mark = self.fresh_mark();
        self.push(Instruction::SetMark(mark));
        self.emit_node(ast, child)?;
        self.push(Instruction::CaptureMark { group, mark });
        Ok(())
    }

    fn emit_condition(&mut self, ast: &Ast, kind: LookKind, child: NodeId) -> Result<(), EmitError> {
        let negate = matches!(kind, LookKind::AheadNeg | LookKind::BehindNeg);
        let backward = matches!(kind, LookKind::Behind | LookKind::BehindNeg);

        self.push(Instruction::SetJump);
        if negate {
            let alt_at = self.reserve();
            // `jump_at` is where the Alt's first branch lands: the
            // direction-setting instruction itself, not the body past it.
            let jump_at = self.here();
            let jump_slot = self.reserve();
            let body_start = self.here();
            self.emit_node(ast, child)?;
            self.patch(jump_slot, make_jump(backward, body_start));
            // Body fully matched: that is failure for a negative assertion.
            self.push(Instruction::GetJump { negate: true });
            let succeed_at = self.here();
            self.patch(alt_at, Instruction::Alt(jump_at, succeed_at));
            self.push(Instruction::GetJump { negate: false });
        } else {
            let jump_slot = self.reserve();
            let body_start = self.here();
            self.emit_node(ast, child)?;
            self.patch(jump_slot, make_jump(backward, body_start));
            self.push(Instruction::GetJump { negate: false });
        }
        Ok(())
    }

    fn emit_repeat(
        &mut self,
        ast: &Ast,
        child: NodeId,
        min: u32,
        max: Option<u32>,
        greedy: bool,
    ) -> Result<(), EmitError> {
        if let Some(max) = max {
            if max > MAX_REPEAT_COUNT {
                return Err(EmitError::RepeatCountTooLarge(max, MAX_REPEAT_COUNT));
            }
            if max == 0 {
                // No branch matches a `{0,0}` repeat in the unrolling this
                // is adapted from; rather than reproduce that silent gap,
                // it compiles to an explicit no-op.
                self.push(Instruction::Nop);
                return Ok(());
            }
        }

        for _ in 0..min {
            self.emit_node(ast, child)?;
        }

        match max {
            Some(max) => {
                let optional = max - min;
                let mut end_patches = Vec::with_capacity(optional as usize);
                for _ in 0..optional {
                    let alt_at = self.reserve();
                    let body_start = self.here();
                    self.emit_node(ast, child)?;
                    let after = self.here();
                    if greedy {
                        self.patch(alt_at, Instruction::Alt(body_start, after));
                    } else {
                        self.patch(alt_at, Instruction::Alt(after, body_start));
                    }
                    end_patches.push(alt_at);
                }
                let _ = end_patches;
            }
            None => {
                // Unbounded tail: a classic Alt-Body-Goto loop.
                let alt_at = self.reserve();
                let body_start = self.here();
                self.emit_node(ast, child)?;
                self.push(Instruction::Goto(alt_at));
                let after = self.here();
                if greedy {
                    self.patch(alt_at, Instruction::Alt(body_start, after));
                } else {
                    self.patch(alt_at, Instruction::Alt(after, body_start));
                }
            }
        }
        Ok(())
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

fn make_jump(backward: bool, target: InstrId) -> Instruction {
    if backward {
        Instruction::BackJump(target)
    } else {
        Instruction::ForeJump(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstBuilder;
    use tokenrex_bytecode::GroupTable;

    fn emit(ast: &Ast) -> Program {
        Emitter::new().emit(ast, GroupTable::new()).unwrap()
    }

    #[test]
    fn single_word_emits_word_then_stop() {
        let mut b = AstBuilder::new();
        let w = b.push(Node::Word("dog".into()));
        let ast = b.finish(w);
        let program = emit(&ast);
        assert_eq!(program.instructions().len(), 2);
        assert!(matches!(program.get(0), Some(Instruction::Word(_))));
        assert!(matches!(program.get(1), Some(Instruction::Stop)));
    }

    #[test]
    fn alternate_emits_alt_choice_point() {
        let mut b = AstBuilder::new();
        let a = b.push(Node::Word("a".into()));
        let c = b.push(Node::Word("c".into()));
        let alt = b.push(Node::Alternate(vec![a, c]));
        let ast = b.finish(alt);
        let program = emit(&ast);
        assert!(matches!(program.get(0), Some(Instruction::Alt(_, _))));
    }

    #[test]
    fn capture_wraps_body_in_set_and_capture_mark() {
        let mut b = AstBuilder::new();
        let w = b.push(Node::Word("dog".into()));
        let cap = b.push(Node::Capture {
            index: 1,
            name: None,
            child: w,
        });
        let ast = b.finish(cap);
        let program = emit(&ast);
        assert!(matches!(program.get(0), Some(Instruction::SetMark(_))));
        assert!(matches!(program.get(1), Some(Instruction::Word(_))));
        assert!(matches!(
            program.get(2),
            Some(Instruction::CaptureMark { group: 1, .. })
        ));
    }

    #[test]
    fn zero_zero_repeat_compiles_to_nop() {
        let mut b = AstBuilder::new();
        let w = b.push(Node::Word("dog".into()));
        let rep = b.push(Node::Repeat {
            child: w,
            min: 0,
            max: Some(0),
            greedy: true,
        });
        let ast = b.finish(rep);
        let program = emit(&ast);
        assert!(matches!(program.get(0), Some(Instruction::Nop)));
    }

    #[test]
    fn unbounded_star_forms_a_backward_goto_loop() {
        let mut b = AstBuilder::new();
        let w = b.push(Node::Word("dog".into()));
        let rep = b.push(Node::Repeat {
            child: w,
            min: 0,
            max: None,
            greedy: true,
        });
        let ast = b.finish(rep);
        let program = emit(&ast);
        let has_goto_back = program
            .instructions()
            .iter()
            .enumerate()
            .any(|(i, instr)| matches!(instr, Instruction::Goto(target) if *target < i));
        assert!(has_goto_back);
    }

    #[test]
    fn lookahead_jump_target_lands_past_itself_not_on_itself() {
        let mut b = AstBuilder::new();
        let w = b.push(Node::Word("dog".into()));
        let cond = b.push(Node::Condition {
            kind: LookKind::Ahead,
            child: w,
        });
        let ast = b.finish(cond);
        let program = emit(&ast);
        let (jump_at, target) = program
            .instructions()
            .iter()
            .enumerate()
            .find_map(|(i, instr)| match instr {
                Instruction::ForeJump(t) => Some((i, *t)),
                _ => None,
            })
            .expect("emits a ForeJump for a forward lookahead");
        assert_ne!(target, jump_at, "ForeJump must not target itself");
        assert!(matches!(program.get(target), Some(Instruction::Word(_))));
    }

    #[test]
    fn repeat_count_above_limit_is_rejected() {
        let mut b = AstBuilder::new();
        let w = b.push(Node::Word("dog".into()));
        let rep = b.push(Node::Repeat {
            child: w,
            min: 0,
            max: Some(MAX_REPEAT_COUNT + 1),
            greedy: true,
        });
        let ast = b.finish(rep);
        let err = Emitter::new().emit(&ast, GroupTable::new()).unwrap_err();
        assert!(matches!(err, EmitError::RepeatCountTooLarge(_, _)));
    }
}
