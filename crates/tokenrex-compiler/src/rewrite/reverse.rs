use crate::ast::{Ast, AstBuilder, LookKind, Node, NodeId};

/// Reverses the child subtree of every lookbehind `Condition` in place,
/// so the emitter and virtual machine can walk a lookbehind's body
/// forward while the tokens it actually examines are scanned
/// right-to-left at match time.
///
/// Reversal does not recurse into a nested `Condition`'s own child: a
/// lookaround inside a lookbehind keeps its own, independently-decided
/// scan direction, matching the nesting rule the behavior is adapted
/// from.
pub struct Reverser {
    builder: AstBuilder,
}

impl Reverser {
    pub fn new() -> Self {
        Self {
            builder: AstBuilder::new(),
        }
    }

    pub fn reverse(mut self, ast: &Ast) -> Ast {
        let root = self.walk(ast, ast.root());
        self.builder.finish(root)
    }

    fn walk(&mut self, ast: &Ast, id: NodeId) -> NodeId {
        match ast.get(id).clone() {
            Node::Concatenate(children) => {
                let children = children.iter().map(|&c| self.walk(ast, c)).collect();
                self.builder.push(Node::Concatenate(children))
            }
            Node::Alternate(children) => {
                let children = children.iter().map(|&c| self.walk(ast, c)).collect();
                self.builder.push(Node::Alternate(children))
            }
            Node::Capture { index, name, child } => {
                let child = self.walk(ast, child);
                self.builder.push(Node::Capture { index, name, child })
            }
            Node::Repeat {
                child,
                min,
                max,
                greedy,
            } => {
                let child = self.walk(ast, child);
                self.builder.push(Node::Repeat {
                    child,
                    min,
                    max,
                    greedy,
                })
            }
            Node::Condition {
                kind: kind @ (LookKind::Behind | LookKind::BehindNeg),
                child,
            } => {
                // The child subtree is copied, not recursively walked:
                // nested lookarounds inside it keep their own direction.
                let copied = self.copy_subtree(ast, child);
                let reversed = self.reverse_sequence(copied);
                self.builder.push(Node::Condition {
                    kind,
                    child: reversed,
                })
            }
            Node::Condition { kind, child } => {
                let child = self.walk(ast, child);
                self.builder.push(Node::Condition { kind, child })
            }
            leaf => self.builder.push(leaf),
        }
    }

    /// Copies a subtree as-is (no direction change) into this builder's
    /// arena, preserving nested `Condition` nodes untouched.
    fn copy_subtree(&mut self, ast: &Ast, id: NodeId) -> NodeId {
        match ast.get(id).clone() {
            Node::Concatenate(children) => {
                let children = children.iter().map(|&c| self.copy_subtree(ast, c)).collect();
                self.builder.push(Node::Concatenate(children))
            }
            Node::Alternate(children) => {
                let children = children.iter().map(|&c| self.copy_subtree(ast, c)).collect();
                self.builder.push(Node::Alternate(children))
            }
            Node::Capture { index, name, child } => {
                let child = self.copy_subtree(ast, child);
                self.builder.push(Node::Capture { index, name, child })
            }
            Node::Repeat {
                child,
                min,
                max,
                greedy,
            } => {
                let child = self.copy_subtree(ast, child);
                self.builder.push(Node::Repeat {
                    child,
                    min,
                    max,
                    greedy,
                })
            }
            Node::Condition { kind, child } => {
                // Left untouched: direction is independently decided for
                // lookarounds nested inside a lookbehind.
                self.builder.push(Node::Condition { kind, child })
            }
            leaf => self.builder.push(leaf),
        }
    }

    /// Reverses the match order of a node in place: a `Concatenate`'s
    /// children are reversed; an `Alternate`'s branches are each reversed
    /// independently (choice order is unaffected, only intra-branch
    /// order); a leaf is returned unchanged.
    fn reverse_sequence(&mut self, id: NodeId) -> NodeId {
        match self.builder.get(id).clone() {
            Node::Concatenate(mut children) => {
                children.reverse();
                let children = children
                    .into_iter()
                    .map(|c| self.reverse_sequence(c))
                    .collect();
                self.builder.push(Node::Concatenate(children))
            }
            Node::Alternate(children) => {
                let children = children
                    .into_iter()
                    .map(|c| self.reverse_sequence(c))
                    .collect();
                self.builder.push(Node::Alternate(children))
            }
            Node::Capture { index, name, child } => {
                let child = self.reverse_sequence(child);
                self.builder.push(Node::Capture { index, name, child })
            }
            Node::Repeat {
                child,
                min,
                max,
                greedy,
            } => {
                let child = self.reverse_sequence(child);
                self.builder.push(Node::Repeat {
                    child,
                    min,
                    max,
                    greedy,
                })
            }
            other => self.builder.push(other),
        }
    }
}

impl Default for Reverser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstBuilder;

    #[test]
    fn lookbehind_body_is_reversed() {
        let mut b = AstBuilder::new();
        let a = b.push(Node::Word("a".into()));
        let c = b.push(Node::Word("c".into()));
        let seq = b.push(Node::Concatenate(vec![a, c]));
        let look = b.push(Node::Condition {
            kind: LookKind::Behind,
            child: seq,
        });
        let ast = b.finish(look);

        let reversed = Reverser::new().reverse(&ast);
        match reversed.get(reversed.root()) {
            Node::Condition { child, .. } => match reversed.get(*child) {
                Node::Concatenate(items) => {
                    assert_eq!(reversed.get(items[0]), &Node::Word("c".into()));
                    assert_eq!(reversed.get(items[1]), &Node::Word("a".into()));
                }
                other => panic!("expected Concatenate, got {other:?}"),
            },
            other => panic!("expected Condition, got {other:?}"),
        }
    }

    #[test]
    fn lookahead_is_left_untouched() {
        let mut b = AstBuilder::new();
        let a = b.push(Node::Word("a".into()));
        let c = b.push(Node::Word("c".into()));
        let seq = b.push(Node::Concatenate(vec![a, c]));
        let look = b.push(Node::Condition {
            kind: LookKind::Ahead,
            child: seq,
        });
        let ast = b.finish(look);

        let result = Reverser::new().reverse(&ast);
        match result.get(result.root()) {
            Node::Condition { child, .. } => match result.get(*child) {
                Node::Concatenate(items) => {
                    assert_eq!(result.get(items[0]), &Node::Word("a".into()));
                    assert_eq!(result.get(items[1]), &Node::Word("c".into()));
                }
                other => panic!("expected Concatenate, got {other:?}"),
            },
            other => panic!("expected Condition, got {other:?}"),
        }
    }
}
