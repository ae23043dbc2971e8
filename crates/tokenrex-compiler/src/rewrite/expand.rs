use std::collections::HashMap;

use crate::ast::{Ast, AstBuilder, Node, NodeId};
use crate::error::ExpandError;

/// Resolves every `Sth`/`NamedRef` node against a table of named
/// sub-patterns and capture groups, inlining sub-pattern bodies and
/// turning named back-references into numbered ones.
///
/// Named sub-pattern expansion is memoised per name (a name that is
/// referenced twice expands to two independent copies sharing one cached
/// parse, mirroring macro-style textual inclusion) and guarded against
/// cycles: a name that (directly or transitively) refers to itself is a
/// compile error rather than a stack overflow or an infinite tree. The
/// original implementation this behavior is adapted from performs no such
/// check; this is a deliberate hardening, not a literal port.
pub struct Expander<'a> {
    subpatterns: &'a HashMap<String, Ast>,
    group_names: &'a HashMap<String, usize>,
    in_progress: Vec<String>,
    builder: AstBuilder,
}

impl<'a> Expander<'a> {
    pub fn new(subpatterns: &'a HashMap<String, Ast>, group_names: &'a HashMap<String, usize>) -> Self {
        Self {
            subpatterns,
            group_names,
            in_progress: Vec::new(),
            builder: AstBuilder::new(),
        }
    }

    pub fn expand(mut self, ast: &Ast) -> Result<Ast, ExpandError> {
        let root = self.expand_node(ast, ast.root())?;
        Ok(self.builder.finish(root))
    }

    fn expand_node(&mut self, ast: &Ast, id: NodeId) -> Result<NodeId, ExpandError> {
        let node = match ast.get(id).clone() {
            Node::Concatenate(children) => {
                let children = self.expand_children(ast, &children)?;
                Node::Concatenate(children)
            }
            Node::Alternate(children) => {
                let children = self.expand_children(ast, &children)?;
                Node::Alternate(children)
            }
            Node::Capture { index, name, child } => {
                let child = self.expand_node(ast, child)?;
                Node::Capture { index, name, child }
            }
            Node::Repeat {
                child,
                min,
                max,
                greedy,
            } => {
                let child = self.expand_node(ast, child)?;
                Node::Repeat {
                    child,
                    min,
                    max,
                    greedy,
                }
            }
            Node::Condition { kind, child } => {
                let child = self.expand_node(ast, child)?;
                Node::Condition { kind, child }
            }
            Node::NamedRef { name, reversed } => {
                let group = *self
                    .group_names
                    .get(&name)
                    .ok_or_else(|| ExpandError::UnknownSubpattern(name.clone()))?;
                Node::Ref { group, reversed }
            }
            Node::Sth(name) => return self.expand_subpattern(&name),
            leaf => leaf,
        };
        Ok(self.builder.push(node))
    }

    fn expand_children(&mut self, ast: &Ast, children: &[NodeId]) -> Result<Vec<NodeId>, ExpandError> {
        children.iter().map(|&c| self.expand_node(ast, c)).collect()
    }

    fn expand_subpattern(&mut self, name: &str) -> Result<NodeId, ExpandError> {
        if self.in_progress.contains(&name.to_string()) {
            let chain = self.in_progress.join(" -> ");
            return Err(ExpandError::SubpatternCycle(name.to_string(), chain));
        }
        let sub_ast = self
            .subpatterns
            .get(name)
            .ok_or_else(|| ExpandError::UnknownSubpattern(name.to_string()))?;
        self.in_progress.push(name.to_string());
        let result = self.expand_node(sub_ast, sub_ast.root());
        self.in_progress.pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;

    fn leaf_ast(node: Node) -> Ast {
        let mut b = AstBuilder::new();
        let id = b.push(node);
        b.finish(id)
    }

    #[test]
    fn expand_inlines_named_subpattern() {
        let mut subs = HashMap::new();
        subs.insert("greeting".to_string(), leaf_ast(Node::Word("hi".into())));
        let names = HashMap::new();
        let main = leaf_ast(Node::Sth("greeting".into()));
        let expanded = Expander::new(&subs, &names).expand(&main).unwrap();
        assert_eq!(expanded.get(expanded.root()), &Node::Word("hi".into()));
    }

    #[test]
    fn expand_detects_direct_cycle() {
        let mut subs = HashMap::new();
        subs.insert("loop".to_string(), leaf_ast(Node::Sth("loop".into())));
        let names = HashMap::new();
        let main = leaf_ast(Node::Sth("loop".into()));
        let err = Expander::new(&subs, &names).expand(&main).unwrap_err();
        assert!(matches!(err, ExpandError::SubpatternCycle(_, _)));
    }

    #[test]
    fn expand_resolves_named_backref_to_group_index() {
        let subs = HashMap::new();
        let mut names = HashMap::new();
        names.insert("year".to_string(), 2usize);
        let main = leaf_ast(Node::NamedRef {
            name: "year".into(),
            reversed: true,
        });
        let expanded = Expander::new(&subs, &names).expand(&main).unwrap();
        assert_eq!(
            expanded.get(expanded.root()),
            &Node::Ref {
                group: 2,
                reversed: true
            }
        );
    }
}
