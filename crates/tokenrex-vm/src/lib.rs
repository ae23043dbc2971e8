//! The backtracking virtual machine that executes a compiled
//! `tokenrex_bytecode::Program` against a slice of tokens.

mod engine;

pub use engine::{MatchResult, NoopTracer, PrintTracer, Runner, RunnerBuilder, RunnerLimits, Tracer};

#[cfg(test)]
mod tests {
    use super::*;
    use tokenrex_bytecode::GroupTable;
    use tokenrex_compiler::ast::{AstBuilder, LookKind, Node};
    use tokenrex_compiler::emit::Emitter;
    use tokenrex_compiler::{compile, CompileOptions};
    use tokenrex_core::{DynamicWordPredicate, Token};

    /// Builds tokens whose `pos` field is the single given letter, the
    /// surface syntax's primary way to address a `DynamicWord` predicate.
    fn pos_tokens(letters: &[&str]) -> Vec<Token> {
        letters.iter().map(|p| Token::new().with_pos(*p)).collect()
    }

    fn shape_tokens(shapes: &[&str]) -> Vec<Token> {
        shapes.iter().map(|s| Token::new().with_shape(*s)).collect()
    }

    #[test]
    fn matches_a_plain_cjk_literal() {
        let program = compile("汉", &CompileOptions::default()).unwrap();
        let runner = Runner::new(program);
        let result = runner.try_match_at(&shape_tokens(&["汉"]), 0);
        assert_eq!(result.unwrap().end, 1);
    }

    #[test]
    fn alternation_tries_branches_in_order() {
        let program = compile("a|v", &CompileOptions::default()).unwrap();
        let runner = Runner::new(program);
        assert!(runner.try_match_at(&pos_tokens(&["v"]), 0).is_some());
        assert!(runner.try_match_at(&pos_tokens(&["a"]), 0).is_some());
        assert!(runner.try_match_at(&pos_tokens(&["n"]), 0).is_none());
    }

    #[test]
    fn star_is_greedy_and_backtracks_on_overreach() {
        let program = compile("v*a", &CompileOptions::default()).unwrap();
        let runner = Runner::new(program);
        let result = runner.try_match_at(&pos_tokens(&["v", "v", "a"]), 0).unwrap();
        assert_eq!(result.end, 3);
    }

    #[test]
    fn capture_group_records_its_span() {
        let program = compile("(?<animal>a|v)", &CompileOptions::default()).unwrap();
        let runner = Runner::new(program);
        let result = runner.try_match_at(&pos_tokens(&["v"]), 0).unwrap();
        let group_index = runner.program().groups().index_of("animal").unwrap();
        assert_eq!(result.groups.get(&group_index), Some(&(0, 1)));
    }

    #[test]
    fn unfired_alternative_groups_are_absent() {
        let program = compile("(?<a>a)|(?<b>v)", &CompileOptions::default()).unwrap();
        let runner = Runner::new(program);
        let result = runner.try_match_at(&pos_tokens(&["v"]), 0).unwrap();
        let a = runner.program().groups().index_of("a").unwrap();
        let b = runner.program().groups().index_of("b").unwrap();
        assert!(!result.groups.contains_key(&a));
        assert!(result.groups.contains_key(&b));
    }

    #[test]
    fn backreference_matches_identical_following_token() {
        let program = compile("(?<w>a|v)\\1", &CompileOptions::default()).unwrap();
        let runner = Runner::new(program);
        let result = runner.try_match_at(&pos_tokens(&["v", "v"]), 0);
        assert!(result.is_some());
        let mismatch = runner.try_match_at(&pos_tokens(&["v", "a"]), 0);
        assert!(mismatch.is_none());
    }

    #[test]
    fn positive_lookahead_does_not_consume_input() {
        let program = compile("a(?=v)", &CompileOptions::default()).unwrap();
        let runner = Runner::new(program);
        let result = runner.try_match_at(&pos_tokens(&["a", "v"]), 0).unwrap();
        assert_eq!(result.end, 1);
    }

    #[test]
    fn negative_lookahead_rejects_when_body_matches() {
        let program = compile("a(?!v)", &CompileOptions::default()).unwrap();
        let runner = Runner::new(program);
        assert!(runner.try_match_at(&pos_tokens(&["a", "v"]), 0).is_none());
        assert!(runner.try_match_at(&pos_tokens(&["a", "n"]), 0).is_some());
    }

    #[test]
    fn negative_lookahead_rejects_when_any_alternative_matches() {
        // Regression: the assertion's own internal `Alt` choice point must
        // not be retried as if it were a way to satisfy the surrounding
        // pattern. If "v" (one alternative) matches, the assertion fails
        // outright rather than falling through to try "a" and reporting
        // success when that branch doesn't match.
        let program = compile("(?!v|a)", &CompileOptions::default()).unwrap();
        let runner = Runner::new(program);
        assert!(runner.try_match_at(&pos_tokens(&["v"]), 0).is_none());
        assert!(runner.try_match_at(&pos_tokens(&["a"]), 0).is_none());
        assert!(runner.try_match_at(&pos_tokens(&["n"]), 0).is_some());
    }

    #[test]
    fn positive_lookahead_with_alternation_still_matches_either_branch() {
        let program = compile("(?=v|a)", &CompileOptions::default()).unwrap();
        let runner = Runner::new(program);
        assert!(runner.try_match_at(&pos_tokens(&["v"]), 0).is_some());
        assert!(runner.try_match_at(&pos_tokens(&["a"]), 0).is_some());
        assert!(runner.try_match_at(&pos_tokens(&["n"]), 0).is_none());
    }

    #[test]
    fn positive_lookbehind_checks_backward_without_consuming() {
        let program = compile("(?<=a)v", &CompileOptions::default()).unwrap();
        let runner = Runner::new(program);
        let result = runner.try_match_at(&pos_tokens(&["a", "v"]), 1).unwrap();
        assert_eq!((result.start, result.end), (1, 2));
        assert!(runner.try_match_at(&pos_tokens(&["n", "v"]), 1).is_none());
    }

    #[test]
    fn step_budget_bounds_a_hanging_match() {
        let program = compile("v*v*v*v*a", &CompileOptions::default()).unwrap();
        let runner = Runner::builder().max_steps(50).build(program);
        let huge = vec![Token::new().with_pos("v"); 64];
        assert!(runner.try_match_at(&huge, 0).is_none());
    }

    /// Regression for a negative lookaround nested inside another
    /// Condition: resolving the inner assertion must not discard the
    /// outer assertion's direction marker. Built directly from the AST
    /// rather than a parsed string so the body's execution order (nearest
    /// token first, as a reversed lookbehind body would already be
    /// ordered) is explicit and doesn't depend on a separate rewrite pass.
    #[test]
    fn nested_condition_preserves_outer_direction_marker() {
        let mut pred = |c: char| {
            let mut p = DynamicWordPredicate::new();
            p.pos = Some(c);
            p
        };

        let mut builder = AstBuilder::new();
        let inner_body = builder.push(Node::DynamicWord(pred('q')));
        let inner_cond = builder.push(Node::Condition {
            kind: LookKind::AheadNeg,
            child: inner_body,
        });
        let trailing = builder.push(Node::DynamicWord(pred('b')));
        let behind_body = builder.push(Node::Concatenate(vec![inner_cond, trailing]));
        let behind = builder.push(Node::Condition {
            kind: LookKind::Behind,
            child: behind_body,
        });
        let x = builder.push(Node::DynamicWord(pred('x')));
        let root = builder.push(Node::Concatenate(vec![behind, x]));
        let ast = builder.finish(root);

        let program = Emitter::new().emit(&ast, GroupTable::new()).unwrap();
        let runner = Runner::new(program);

        let tokens = pos_tokens(&["a", "b", "x"]);
        let result = runner.try_match_at(&tokens, 2);
        assert_eq!(result.unwrap().end, 3);
    }
}
