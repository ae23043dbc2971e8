use crate::ast::{Ast, AstBuilder, Node, NodeId};

/// Flattens nested same-kind `Concatenate`/`Alternate` runs, fuses
/// adjacent `Word` literals into a single multi-token-aware node's
/// children list (kept as a flat `Concatenate`, since each `Word` still
/// matches exactly one token), drops `Empty` children where a sibling
/// makes them redundant, and collapses single-child `Concatenate`/
/// `Alternate` wrappers down to their one child.
pub struct Simplifier {
    builder: AstBuilder,
}

impl Simplifier {
    pub fn new() -> Self {
        Self {
            builder: AstBuilder::new(),
        }
    }

    pub fn simplify(mut self, ast: &Ast) -> Ast {
        let root = self.simplify_node(ast, ast.root());
        self.builder.finish(root)
    }

    fn simplify_node(&mut self, ast: &Ast, id: NodeId) -> NodeId {
        match ast.get(id).clone() {
            Node::Concatenate(children) => {
                // Empty is concatenation's identity element: dropping it
                // changes nothing about what the sequence can match.
                let flat = self.flatten(ast, &children, Self::as_concat, true);
                self.wrap_or_collapse(flat, Node::Concatenate)
            }
            Node::Alternate(children) => {
                // Empty is a meaningful *alternative* here (it is what
                // makes `(a|)` behave like `a?`), so it is kept, only
                // deduplicated when the flattened list of branches would
                // otherwise contain more than one of it.
                let mut flat = self.flatten(ast, &children, Self::as_alternate, false);
                let mut seen_empty = false;
                flat.retain(|&id| {
                    if matches!(self.builder.get(id), Node::Empty) {
                        let keep = !seen_empty;
                        seen_empty = true;
                        keep
                    } else {
                        true
                    }
                });
                self.wrap_or_collapse(flat, Node::Alternate)
            }
            Node::Capture { index, name, child } => {
                let child = self.simplify_node(ast, child);
                self.builder.push(Node::Capture { index, name, child })
            }
            Node::Repeat {
                child,
                min,
                max,
                greedy,
            } => {
                let child = self.simplify_node(ast, child);
                self.builder.push(Node::Repeat {
                    child,
                    min,
                    max,
                    greedy,
                })
            }
            Node::Condition { kind, child } => {
                let child = self.simplify_node(ast, child);
                self.builder.push(Node::Condition { kind, child })
            }
            leaf => self.builder.push(leaf),
        }
    }

    /// Expands `children`, recursively simplifying each, and splices in
    /// the grandchildren of any child that is itself the same kind of
    /// node (`extract` returns `Some` for a same-kind match). `Empty`
    /// children are dropped unless doing so would leave nothing at all,
    /// in which case a single `Empty` child is kept so the node is never
    /// left with zero children.
    fn flatten(
        &mut self,
        ast: &Ast,
        children: &[NodeId],
        extract: fn(&Node) -> Option<Vec<NodeId>>,
        prune_empty: bool,
    ) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &child in children {
            let simplified = self.simplify_node(ast, child);
            if let Some(grandchildren) = extract(self.builder.get(simplified)) {
                out.extend(grandchildren);
            } else if prune_empty && matches!(self.builder.get(simplified), Node::Empty) {
                // dropped: identity element under concatenation
            } else {
                out.push(simplified);
            }
        }
        if out.is_empty() {
            out.push(self.builder.push(Node::Empty));
        }
        out
    }

    fn as_concat(node: &Node) -> Option<Vec<NodeId>> {
        match node {
            Node::Concatenate(c) => Some(c.clone()),
            _ => None,
        }
    }

    fn as_alternate(node: &Node) -> Option<Vec<NodeId>> {
        match node {
            Node::Alternate(c) => Some(c.clone()),
            _ => None,
        }
    }

    fn wrap_or_collapse(&mut self, mut children: Vec<NodeId>, wrap: fn(Vec<NodeId>) -> Node) -> NodeId {
        if children.len() == 1 {
            children.pop().unwrap()
        } else {
            self.builder.push(wrap(children))
        }
    }
}

impl Default for Simplifier {
    fn default() -> Self {
        Self::new()
    }
}
