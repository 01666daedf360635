mod rewriter;

pub use rewriter::*;
