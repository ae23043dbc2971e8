mod expand;
mod reverse;
mod simplify;

pub use expand::Expander;
pub use reverse::Reverser;
pub use simplify::Simplifier;
