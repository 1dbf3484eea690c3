use bitflags::bitflags;

use crate::SyntaxKind;

bitflags! {
    /// Per-span metadata carried alongside the kind on every emitted span and
    /// every tree node.
    #[repr(transparent)]
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SyntaxFlags: u8 {
        /// The span is structurally irrelevant: whitespace, comments, and
        /// punctuation that was consumed as part of a surrounding form.
        const TRIVIA = 1;
        /// The token was written in its leading-dot form, e.g. `.+`.
        const DOTTED = 1 << 1;
        /// The token carries an operator-name suffix, e.g. `+′`.
        const SUFFIXED = 1 << 2;
        /// The span covers lexically or syntactically invalid input.
        const ERROR = 1 << 3;
    }
}

impl SyntaxFlags {
    pub fn is_trivia(&self) -> bool {
        self.contains(SyntaxFlags::TRIVIA)
    }

    pub fn is_dotted(&self) -> bool {
        self.contains(SyntaxFlags::DOTTED)
    }

    pub fn is_suffixed(&self) -> bool {
        self.contains(SyntaxFlags::SUFFIXED)
    }

    pub fn is_error(&self) -> bool {
        self.contains(SyntaxFlags::ERROR)
    }
}

/// The pair of kind and flags carried by every span in the emission log and
/// every node of the finished tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SyntaxHead {
    kind: SyntaxKind,
    flags: SyntaxFlags,
}

impl SyntaxHead {
    pub fn new(kind: SyntaxKind, flags: SyntaxFlags) -> Self {
        Self { kind, flags }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn flags(&self) -> SyntaxFlags {
        self.flags
    }

    pub fn is_trivia(&self) -> bool {
        self.flags.is_trivia()
    }

    pub fn set_kind(&mut self, kind: SyntaxKind) {
        self.kind = kind;
    }

    pub fn set_flags(&mut self, flags: SyntaxFlags) {
        self.flags = flags;
    }
}
