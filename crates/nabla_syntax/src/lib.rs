mod flags;
mod green;
mod kind;
mod span;
mod tree;

pub use flags::{SyntaxFlags, SyntaxHead};
pub use green::{GreenElement, GreenNode, GreenToken};
pub use kind::SyntaxKind;
pub use span::{TaggedSpan, TextSize, TextSpan};
pub use tree::{build_tree, TreeBuildError};
