use std::fmt;
use std::ops::Range;

use crate::{SyntaxFlags, SyntaxHead, SyntaxKind};

/// Measures a position or length in the source text, in bytes.
pub type TextSize = u32;

/// A half-open byte range into the source text.
pub type TextSpan = Range<usize>;

/// A head paired with the half-open byte range it covers. This is the unit of
/// tree emission: the parser appends one of these per consumed token and one
/// per finished interior node, and the tree builder folds the resulting flat
/// log into a nested tree by byte-range containment.
///
/// A zero-width span (`start == end`) is an "invisible" token, used for
/// implicit grammatical elements such as the multiplication in `2x`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaggedSpan {
    head: SyntaxHead,
    start: TextSize,
    end: TextSize,
}

impl TaggedSpan {
    pub fn new(head: SyntaxHead, start: TextSize, end: TextSize) -> Self {
        debug_assert!(start <= end, "span must not be inverted: {start}..{end}");
        Self { head, start, end }
    }

    pub fn head(&self) -> SyntaxHead {
        self.head
    }

    pub fn kind(&self) -> SyntaxKind {
        self.head.kind()
    }

    pub fn flags(&self) -> SyntaxFlags {
        self.head.flags()
    }

    pub fn start(&self) -> TextSize {
        self.start
    }

    pub fn end(&self) -> TextSize {
        self.end
    }

    pub fn span(&self) -> TextSpan {
        self.start as usize..self.end as usize
    }

    pub fn len(&self) -> TextSize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_tombstone(&self) -> bool {
        self.kind() == SyntaxKind::TOMBSTONE
    }

    pub fn set_kind(&mut self, kind: SyntaxKind) {
        self.head.set_kind(kind);
    }

    pub fn set_flags(&mut self, flags: SyntaxFlags) {
        self.head.set_flags(flags);
    }
}

impl fmt::Debug for TaggedSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}..{}", self.kind(), self.start, self.end)?;
        if !self.flags().is_empty() {
            write!(f, " {:?}", self.flags())?;
        }
        Ok(())
    }
}
