use std::collections::HashMap;

use tokenrex_bytecode::{GroupId, InstrId, Instruction, PositionKind, Program};
use tokenrex_core::{matches_dynamic, Token};

use super::trace::{NoopTracer, Tracer};

/// Step/backtrack budget for a single `try_match_at` call. Bounds how
/// much work a pathological, catastrophically-backtracking pattern can
/// do before the VM gives up and reports no match, rather than hanging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerLimits {
    pub max_steps: usize,
}

impl Default for RunnerLimits {
    fn default() -> Self {
        Self { max_steps: 2_000_000 }
    }
}

#[derive(Debug, Default)]
pub struct RunnerBuilder {
    limits: RunnerLimits,
}

impl RunnerBuilder {
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.limits.max_steps = max_steps;
        self
    }

    pub fn build(self, program: Program) -> Runner {
        Runner {
            program,
            limits: self.limits,
        }
    }
}

/// The result of one successful match: the overall span plus every
/// capture group that actually fired during this attempt.
///
/// Groups whose `CaptureMark` never executed (an alternative that wasn't
/// taken, an optional repeat that matched zero times) are simply absent
/// from `groups` rather than present with some placeholder span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub start: usize,
    pub end: usize,
    pub groups: HashMap<GroupId, (usize, usize)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// A backtracking virtual machine bound to one compiled `Program`.
pub struct Runner {
    program: Program,
    limits: RunnerLimits,
}

impl Runner {
    pub fn new(program: Program) -> Self {
        Self {
            program,
            limits: RunnerLimits::default(),
        }
    }

    pub fn builder() -> RunnerBuilder {
        RunnerBuilder::default()
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Attempts to match starting exactly at token index `start`,
    /// anchored (does not itself scan forward looking for a match start;
    /// callers that want that loop over `start` values, see
    /// `tokenrex::find`/`find_all`).
    pub fn try_match_at(&self, tokens: &[Token], start: usize) -> Option<MatchResult> {
        self.try_match_at_traced(tokens, start, &mut NoopTracer)
    }

    pub fn try_match_at_traced(
        &self,
        tokens: &[Token],
        start: usize,
        tracer: &mut impl Tracer,
    ) -> Option<MatchResult> {
        let mut state = State::new(self.program.mark_slots(), start);
        let mut steps = 0usize;

        loop {
            steps += 1;
            if steps > self.limits.max_steps {
                return None;
            }

            let pc = state.pc;
            let Some(instr) = self.program.get(pc) else {
                return None;
            };
            tracer.trace_instruction(pc, state.word_pos);

            match instr {
                Instruction::Stop => {
                    tracer.trace_accept(state.word_pos);
                    return Some(MatchResult {
                        start,
                        end: state.word_pos,
                        groups: state.groups,
                    });
                }
                Instruction::Nop => state.pc += 1,
                Instruction::Goto(target) => state.pc = *target,
                Instruction::Alt(primary, fallback) => {
                    state.push_checkpoint(*fallback);
                    state.pc = *primary;
                }
                Instruction::SetMark(mark) => {
                    state.marks[*mark] = Some(state.word_pos);
                    state.pc += 1;
                }
                Instruction::CaptureMark { group, mark } => {
                    if let Some(mark_pos) = state.marks[*mark] {
                        let (lo, hi) = order(mark_pos, state.word_pos);
                        state.groups.insert(*group, (lo, hi));
                        state.pc += 1;
                    } else if !state.backtrack(tracer) {
                        return None;
                    }
                }
                Instruction::SetJump => {
                    // Remembers how deep the backtrack stack was before
                    // entering the assertion's body, so `GetJump` can
                    // discard every choice point the body created (its
                    // own alternatives included) once the assertion is
                    // resolved, rather than let the VM keep trying the
                    // body's other alternatives as if they were ways to
                    // satisfy the *outer* pattern. Also remembers the
                    // direction-stack depth at this point, i.e. before the
                    // entry jump below pushes this assertion's own
                    // direction marker.
                    state.jump_stack.push((
                        state.word_pos,
                        state.backtrack_stack.len(),
                        state.direction_stack.len(),
                    ));
                    state.pc += 1;
                }
                Instruction::GetJump { negate } => {
                    let (saved_word_pos, guard_depth, direction_depth_before_push) =
                        state.jump_stack.pop().expect("balanced SetJump/GetJump");
                    // A negative assertion that reaches this point via a
                    // `backtrack()`-restored checkpoint already had its
                    // direction marker undone by that checkpoint's wholesale
                    // `direction_stack` restore (the checkpoint was taken by
                    // this Condition's own `Alt`, before `ForeJump`/
                    // `BackJump` pushed the marker). Only pop here if that
                    // push is still on the stack, or an outer Condition's
                    // marker gets discarded instead.
                    if state.direction_stack.len() > direction_depth_before_push {
                        state.direction_stack.pop();
                    }
                    state.backtrack_stack.truncate(guard_depth);
                    if *negate {
                        // Reaching here means the negative assertion's
                        // body fully matched, which is itself a failure;
                        // resume whatever choice existed before the
                        // assertion was entered, if any.
                        if !state.backtrack(tracer) {
                            return None;
                        }
                    } else {
                        state.word_pos = saved_word_pos;
                        state.pc += 1;
                    }
                }
                Instruction::ForeJump(target) => {
                    state.direction_stack.push(Direction::Forward);
                    state.pc = *target;
                }
                Instruction::BackJump(target) => {
                    state.direction_stack.push(Direction::Backward);
                    state.pc = *target;
                }
                Instruction::Any => {
                    if !state.consume(tokens, |_| true) && !state.backtrack(tracer) {
                        return None;
                    }
                }
                Instruction::Position(kind) => {
                    if position_holds(tokens, state.word_pos, *kind) {
                        state.pc += 1;
                    } else if !state.backtrack(tracer) {
                        return None;
                    }
                }
                Instruction::Word(shapes) => {
                    let ok = state.consume(tokens, |t| {
                        t.shape.as_deref().is_some_and(|s| shapes.iter().any(|w| w == s))
                    });
                    if !ok && !state.backtrack(tracer) {
                        return None;
                    }
                }
                Instruction::WordSet(shapes) => {
                    let ok = state.consume(tokens, |t| {
                        t.shape.as_deref().is_some_and(|s| shapes.iter().any(|w| w == s))
                    });
                    if !ok && !state.backtrack(tracer) {
                        return None;
                    }
                }
                Instruction::DynamicWord(pred) => {
                    let ok = state.consume(tokens, |t| matches_dynamic(pred, t));
                    if !ok && !state.backtrack(tracer) {
                        return None;
                    }
                }
                Instruction::DynamicWordSet(preds) => {
                    let ok = state.consume(tokens, |t| preds.iter().any(|p| matches_dynamic(p, t)));
                    if !ok && !state.backtrack(tracer) {
                        return None;
                    }
                }
                Instruction::Ref { group, reversed } => {
                    if state.match_ref(tokens, *group, *reversed) {
                        state.pc += 1;
                    } else if !state.backtrack(tracer) {
                        return None;
                    }
                }
            }

            if matches!(self.program.get(state.pc), None) {
                return None;
            }
        }
    }
}

fn order(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// `LineStart`/`LineEnd` hold at the boundaries of the token stream and
/// at any boundary adjacent to a newline-tagged token.
fn position_holds(tokens: &[Token], word_pos: usize, kind: PositionKind) -> bool {
    match kind {
        PositionKind::LineStart => {
            word_pos == 0 || tokens.get(word_pos - 1).is_some_and(Token::is_newline)
        }
        PositionKind::LineEnd => {
            word_pos == tokens.len() || tokens.get(word_pos).is_some_and(Token::is_newline)
        }
    }
}

/// Mutable execution state for one `try_match_at` call: the token
/// cursor, the two auxiliary stacks the bytecode addresses directly
/// (`marks`, `jump_stack`), the ambient scan direction for lookaround
/// bodies, captured group spans, and the backtrack stack of choice
/// points still available to retry.
struct State {
    pc: InstrId,
    word_pos: usize,
    marks: Vec<Option<usize>>,
    jump_stack: Vec<(usize, usize, usize)>,
    direction_stack: Vec<Direction>,
    groups: HashMap<GroupId, (usize, usize)>,
    backtrack_stack: Vec<Checkpoint>,
}

#[derive(Clone)]
struct Checkpoint {
    resume: InstrId,
    word_pos: usize,
    marks: Vec<Option<usize>>,
    jump_stack: Vec<(usize, usize, usize)>,
    direction_stack: Vec<Direction>,
    groups: HashMap<GroupId, (usize, usize)>,
}

impl State {
    fn new(mark_slots: usize, start: usize) -> Self {
        Self {
            pc: 0,
            word_pos: start,
            marks: vec![None; mark_slots],
            jump_stack: Vec::new(),
            direction_stack: Vec::new(),
            groups: HashMap::new(),
            backtrack_stack: Vec::new(),
        }
    }

    fn direction(&self) -> Direction {
        self.direction_stack.last().copied().unwrap_or(Direction::Forward)
    }

    fn push_checkpoint(&mut self, resume: InstrId) {
        self.backtrack_stack.push(Checkpoint {
            resume,
            word_pos: self.word_pos,
            marks: self.marks.clone(),
            jump_stack: self.jump_stack.clone(),
            direction_stack: self.direction_stack.clone(),
            groups: self.groups.clone(),
        });
    }

    /// Pops the most recent choice point and resumes execution there.
    /// Returns `false` when there is nothing left to retry, meaning the
    /// whole match attempt has failed.
    fn backtrack(&mut self, tracer: &mut impl Tracer) -> bool {
        let Some(checkpoint) = self.backtrack_stack.pop() else {
            return false;
        };
        self.pc = checkpoint.resume;
        self.word_pos = checkpoint.word_pos;
        self.marks = checkpoint.marks;
        self.jump_stack = checkpoint.jump_stack;
        self.direction_stack = checkpoint.direction_stack;
        self.groups = checkpoint.groups;
        tracer.trace_backtrack(self.pc, self.word_pos);
        true
    }

    /// Consumes one token in the ambient direction if `pred` accepts it,
    /// advancing `word_pos` and `pc` on success. Returns `false` without
    /// moving anything on failure (the caller backtracks).
    fn consume(&mut self, tokens: &[Token], pred: impl Fn(&Token) -> bool) -> bool {
        let (index, next_pos) = match self.direction() {
            Direction::Forward => {
                if self.word_pos >= tokens.len() {
                    return false;
                }
                (self.word_pos, self.word_pos + 1)
            }
            Direction::Backward => {
                if self.word_pos == 0 {
                    return false;
                }
                (self.word_pos - 1, self.word_pos - 1)
            }
        };
        if !pred(&tokens[index]) {
            return false;
        }
        self.word_pos = next_pos;
        self.pc += 1;
        true
    }

    /// Matches a back-reference. `reversed` walks the previously
    /// captured span back-to-front while the upcoming tokens are always
    /// compared in the ambient scan direction, one at a time.
    fn match_ref(&mut self, tokens: &[Token], group: GroupId, reversed: bool) -> bool {
        let Some(&(lo, hi)) = self.groups.get(&group) else {
            return false;
        };
        let old_indices: Vec<usize> = if reversed {
            (lo..hi).rev().collect()
        } else {
            (lo..hi).collect()
        };
        let mut cursor = self.word_pos;
        for old_index in old_indices {
            let (new_index, next_cursor) = match self.direction() {
                Direction::Forward => {
                    if cursor >= tokens.len() {
                        return false;
                    }
                    (cursor, cursor + 1)
                }
                Direction::Backward => {
                    if cursor == 0 {
                        return false;
                    }
                    (cursor - 1, cursor - 1)
                }
            };
            if tokens[old_index] != tokens[new_index] {
                return false;
            }
            cursor = next_cursor;
        }
        self.word_pos = cursor;
        true
    }
}
