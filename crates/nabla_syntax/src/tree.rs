use thiserror::Error;

use crate::{GreenElement, GreenNode, GreenToken, SyntaxFlags, SyntaxHead, SyntaxKind, TaggedSpan};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeBuildError {
    #[error("no spans were emitted, there is nothing to build a tree from")]
    EmptyLog,
    #[error("found {0} nodes at the top level of the tree")]
    MultipleRoots(usize),
}

/// Folds a flat emission log into a nested green tree.
///
/// Spans arrive in emission order: leaves in non-decreasing start order, and
/// interior spans after the children they enclose. The fold keeps a stack of
/// finished elements; a span that starts at or past the end of the stack top
/// is a new leaf, while a span that overlaps the top encloses every stacked
/// element whose start lies within it and becomes their parent.
///
/// `TOMBSTONE` spans are emptied invisible tokens and are skipped entirely.
///
/// If more than one element remains once the log is exhausted, the roots are
/// wrapped under `wrap_root` when one is supplied; otherwise tree building
/// fails with [`TreeBuildError::MultipleRoots`].
pub fn build_tree(
    spans: &[TaggedSpan],
    wrap_root: Option<SyntaxKind>,
) -> Result<GreenElement, TreeBuildError> {
    let mut stack: Vec<(TaggedSpan, GreenElement)> = Vec::with_capacity(16);

    for &span in spans {
        if span.is_tombstone() {
            continue;
        }

        let encloses_top = match stack.last() {
            Some((top, _)) => span.start() < top.end(),
            None => false,
        };
        if !encloses_top {
            stack.push((span, GreenToken::new(span.head(), span.len()).into()));
            continue;
        }

        let mut first_child = stack.len();
        while first_child > 0 && stack[first_child - 1].0.start() >= span.start() {
            first_child -= 1;
        }
        let children: Vec<GreenElement> = stack
            .drain(first_child..)
            .map(|(_, element)| element)
            .collect();
        let node = GreenNode::new(span.head(), span.len(), children);
        stack.push((span, node.into()));
    }

    match stack.len() {
        0 => Err(TreeBuildError::EmptyLog),
        1 => Ok(stack.pop().map(|(_, element)| element).unwrap()),
        count => {
            let Some(kind) = wrap_root else {
                return Err(TreeBuildError::MultipleRoots(count));
            };
            let width = stack
                .iter()
                .map(|(_, element)| element.width())
                .sum();
            let children = stack.into_iter().map(|(_, element)| element).collect();
            let head = SyntaxHead::new(kind, SyntaxFlags::empty());
            Ok(GreenNode::new(head, width, children).into())
        }
    }
}
