//! Shared vocabulary between the tokenrex compiler and virtual machine:
//! the token type patterns are matched against, and the `DynamicWord`
//! predicate evaluator.

mod predicate;
mod token;

pub use predicate::{matches_dynamic, DynamicWordPredicate};
pub use token::Token;
