use tokenrex_core::DynamicWordPredicate;

/// Address of an instruction within a `Program`'s flat instruction vector.
pub type InstrId = usize;

/// Index into the per-match mark stack used by quantifiers and
/// lookaround bookkeeping (distinct from capture group indices).
pub type MarkId = usize;

/// Index of a capture group, `0` is the whole-match group.
pub type GroupId = usize;

/// Which position assertion a `Position` instruction checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionKind {
    /// Start of input, or just after a newline-tagged token.
    LineStart,
    /// End of input, or just before a newline-tagged token.
    LineEnd,
}

/// A single instruction in a compiled program.
///
/// The instruction set is a flat, id-addressed analogue of the AST: every
/// control-flow construct (alternation, repetition, capture, lookaround)
/// compiles down to a small number of these, and the virtual machine is a
/// straight-line dispatch loop over them plus a backtrack stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Successful match of the whole pattern; halts the dispatch loop.
    Stop,
    /// No-op; falls through to the next instruction. Used for repeat
    /// bounds that match zero tokens unconditionally (e.g. `{0,0}`).
    Nop,
    /// Unconditional jump.
    Goto(InstrId),
    /// Try `primary` first; if it (or anything after it) eventually
    /// backtracks into this instruction, resume at `fallback`. This is
    /// the sole source of backtracking choice points besides bounded
    /// repeat unrolling, which itself lowers to chains of `Alt`.
    Alt(InstrId, InstrId),
    /// Record the current token cursor into mark slot `MarkId`, then
    /// fall through. Used to remember repeat-iteration start positions
    /// (to detect and refuse zero-width loop iterations) and capture
    /// group boundaries.
    SetMark(MarkId),
    /// Close capture group `GroupId` using the cursor recorded by a
    /// preceding `SetMark(mark)` as the start and the current cursor as
    /// the end, then fall through.
    CaptureMark { group: GroupId, mark: MarkId },
    /// Push a lookaround checkpoint (cursor + mark-stack depth) onto the
    /// jump stack, then fall through into the lookaround's subprogram.
    SetJump,
    /// Pop the lookaround checkpoint pushed by `SetJump`. If `negate` is
    /// false this always restores the checkpointed cursor (lookaround
    /// never consumes input); if `negate` is true, reaching this
    /// instruction means the negative lookaround's subprogram matched,
    /// which is itself a failure and triggers a backtrack.
    GetJump { negate: bool },
    /// Enter a lookahead subprogram at `InstrId`, scanning forward from
    /// the current cursor.
    ForeJump(InstrId),
    /// Enter a lookbehind subprogram at `InstrId`, scanning backward from
    /// the current cursor (the subprogram itself was reversed at compile
    /// time so it can still be walked instruction-by-instruction in the
    /// forward direction).
    BackJump(InstrId),
    /// Consume exactly one token, unconditionally.
    Any,
    /// Zero-width assertion on token adjacency to a newline-tagged token.
    Position(PositionKind),
    /// Match a back-reference to a previously closed capture group.
    /// `reversed` walks the captured span back-to-front while comparing
    /// against the upcoming (always forward) input.
    Ref { group: GroupId, reversed: bool },
    /// Match one token whose `shape` equals one of the given literal
    /// surface forms exactly.
    Word(Vec<String>),
    /// Match one token whose `shape` is a member of the given set,
    /// compared the same way as `Word`.
    WordSet(Vec<String>),
    /// Match one token against a single compound predicate.
    DynamicWord(DynamicWordPredicate),
    /// Match one token against a disjunction of predicates (succeeds if
    /// any one of them matches).
    DynamicWordSet(Vec<DynamicWordPredicate>),
}

impl Instruction {
    /// Human-readable mnemonic, used by the disassembler.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Stop => "stop",
            Instruction::Nop => "nop",
            Instruction::Goto(_) => "goto",
            Instruction::Alt(_, _) => "alt",
            Instruction::SetMark(_) => "set_mark",
            Instruction::CaptureMark { .. } => "capture_mark",
            Instruction::SetJump => "set_jump",
            Instruction::GetJump { .. } => "get_jump",
            Instruction::ForeJump(_) => "fore_jump",
            Instruction::BackJump(_) => "back_jump",
            Instruction::Any => "any",
            Instruction::Position(_) => "position",
            Instruction::Ref { .. } => "ref",
            Instruction::Word(_) => "word",
            Instruction::WordSet(_) => "word_set",
            Instruction::DynamicWord(_) => "dynamic_word",
            Instruction::DynamicWordSet(_) => "dynamic_word_set",
        }
    }
}
