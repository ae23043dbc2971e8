//! Compiles a pattern string (plus any named sub-patterns it references)
//! into a `tokenrex_bytecode::Program`: surface parsing, named
//! sub-pattern expansion, tree simplification and lookbehind reversal,
//! then instruction emission.

pub mod ast;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod parser;
pub mod rewrite;

use std::collections::HashMap;

use tokenrex_bytecode::{GroupTable, Program};

use ast::{Ast, Node};
pub use error::{CompileError, EmitError, ExpandError, ParseError};

/// Inputs to a compilation beyond the main pattern string: named
/// sub-patterns it may reference via `<name>`/`\p<name>`/`/p<name>`.
///
/// Built through `CompileOptionsBuilder` rather than taking a bare
/// `HashMap` positionally, matching the builder pattern used elsewhere in
/// this workspace for multi-field configuration.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    named_subpatterns: HashMap<String, String>,
}

impl CompileOptions {
    pub fn builder() -> CompileOptionsBuilder {
        CompileOptionsBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct CompileOptionsBuilder {
    named_subpatterns: HashMap<String, String>,
}

impl CompileOptionsBuilder {
    pub fn named_subpattern(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.named_subpatterns.insert(name.into(), pattern.into());
        self
    }

    pub fn build(self) -> CompileOptions {
        CompileOptions {
            named_subpatterns: self.named_subpatterns,
        }
    }
}

/// Compiles `pattern` into an executable program.
pub fn compile(pattern: &str, options: &CompileOptions) -> Result<Program, CompileError> {
    let mut next_group = 1usize;

    let main_ast = parser::Parser::new(pattern, &mut next_group).parse()?;

    let mut sub_asts = HashMap::new();
    for (name, sub_pattern) in &options.named_subpatterns {
        let ast = parser::Parser::new(sub_pattern, &mut next_group).parse()?;
        sub_asts.insert(name.clone(), ast);
    }

    let mut group_names = HashMap::new();
    collect_group_names(&main_ast, &mut group_names);
    for ast in sub_asts.values() {
        collect_group_names(ast, &mut group_names);
    }

    let expanded = rewrite::Expander::new(&sub_asts, &group_names).expand(&main_ast)?;
    let simplified = rewrite::Simplifier::new().simplify(&expanded);
    let reversed = rewrite::Reverser::new().reverse(&simplified);
    let wrapped = wrap_in_global_capture(reversed);

    let groups = build_group_table(&wrapped, next_group);
    let program = emit::Emitter::new().emit(&wrapped, groups)?;
    Ok(program)
}

fn collect_group_names(ast: &Ast, out: &mut HashMap<String, usize>) {
    fn walk(ast: &Ast, id: ast::NodeId, out: &mut HashMap<String, usize>) {
        match ast.get(id) {
            Node::Capture { index, name, child } => {
                if let Some(name) = name {
                    out.insert(name.clone(), *index);
                }
                walk(ast, *child, out);
            }
            Node::Concatenate(children) | Node::Alternate(children) => {
                for &c in children {
                    walk(ast, c, out);
                }
            }
            Node::Repeat { child, .. } | Node::Condition { child, .. } => walk(ast, *child, out),
            _ => {}
        }
    }
    walk(ast, ast.root(), out);
}

fn wrap_in_global_capture(ast: Ast) -> Ast {
    let root = ast.root();
    let mut builder = ast::AstBuilder::new();
    let copied = copy_into(&ast, root, &mut builder);
    let global = builder.push(Node::Capture {
        index: 0,
        name: None,
        child: copied,
    });
    builder.finish(global)
}

fn copy_into(ast: &Ast, id: ast::NodeId, builder: &mut ast::AstBuilder) -> ast::NodeId {
    let node = match ast.get(id).clone() {
        Node::Concatenate(children) => {
            Node::Concatenate(children.iter().map(|&c| copy_into(ast, c, builder)).collect())
        }
        Node::Alternate(children) => {
            Node::Alternate(children.iter().map(|&c| copy_into(ast, c, builder)).collect())
        }
        Node::Capture { index, name, child } => Node::Capture {
            index,
            name,
            child: copy_into(ast, child, builder),
        },
        Node::Repeat {
            child,
            min,
            max,
            greedy,
        } => Node::Repeat {
            child: copy_into(ast, child, builder),
            min,
            max,
            greedy,
        },
        Node::Condition { kind, child } => Node::Condition {
            kind,
            child: copy_into(ast, child, builder),
        },
        leaf => leaf,
    };
    builder.push(node)
}

fn build_group_table(ast: &Ast, next_group: usize) -> GroupTable {
    let mut names: Vec<Option<String>> = vec![None; next_group];
    fn walk(ast: &Ast, id: ast::NodeId, names: &mut Vec<Option<String>>) {
        match ast.get(id) {
            Node::Capture { index, name, child } => {
                if *index < names.len() {
                    names[*index] = name.clone();
                }
                walk(ast, *child, names);
            }
            Node::Concatenate(children) | Node::Alternate(children) => {
                for &c in children {
                    walk(ast, c, names);
                }
            }
            Node::Repeat { child, .. } | Node::Condition { child, .. } => walk(ast, *child, names),
            _ => {}
        }
    }
    walk(ast, ast.root(), &mut names);

    let mut table = GroupTable::new();
    for name in names.into_iter().skip(1) {
        table.declare(name.as_deref());
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_a_plain_literal() {
        let options = CompileOptions::default();
        let program = compile("汉", &options).unwrap();
        assert!(!program.is_empty());
        assert_eq!(program.groups().len(), 1);
    }

    #[test]
    fn compiles_named_capture_group() {
        let options = CompileOptions::default();
        let program = compile("(?<animal>a|v)", &options).unwrap();
        assert_eq!(program.groups().index_of("animal"), Some(1));
    }

    #[test]
    fn named_subpattern_is_expanded() {
        let options = CompileOptions::builder()
            .named_subpattern("greeting", "hi")
            .build();
        let program = compile(" greeting ", &options).unwrap();
        assert!(!program.is_empty());
    }

    #[test]
    fn unknown_subpattern_is_a_compile_error() {
        let options = CompileOptions::default();
        let err = compile(" nope ", &options).unwrap_err();
        assert!(matches!(err, CompileError::Expand(ExpandError::UnknownSubpattern(_))));
    }
}
