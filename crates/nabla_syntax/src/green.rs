use std::fmt;

use crate::{SyntaxFlags, SyntaxHead, SyntaxKind, TextSize};

/// A leaf of the green tree: a head plus the width of the text it covers.
/// Green elements carry no absolute offsets; positions are recomputed on
/// demand by summing widths during traversal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GreenToken {
    head: SyntaxHead,
    width: TextSize,
}

impl GreenToken {
    pub fn new(head: SyntaxHead, width: TextSize) -> Self {
        Self { head, width }
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

    pub fn width(&self) -> TextSize {
        self.width
    }
}

/// An interior node of the green tree. The node's width always equals the sum
/// of its children's widths; the children cover the node's range in order
/// with no gaps.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GreenNode {
    head: SyntaxHead,
    width: TextSize,
    children: Vec<GreenElement>,
}

impl GreenNode {
    pub fn new(head: SyntaxHead, width: TextSize, children: Vec<GreenElement>) -> Self {
        debug_assert_eq!(
            children.iter().map(GreenElement::width).sum::<TextSize>(),
            width,
            "node width must equal the sum of its children's widths"
        );
        Self {
            head,
            width,
            children,
        }
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

    pub fn width(&self) -> TextSize {
        self.width
    }

    pub fn children(&self) -> &[GreenElement] {
        &self.children
    }

    /// Iterates the children that are structurally meaningful, skipping
    /// trivia-flagged elements.
    pub fn meaningful_children(&self) -> impl Iterator<Item = &GreenElement> {
        self.children.iter().filter(|child| !child.is_trivia())
    }
}

/// Either a leaf token or an interior node of the green tree.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum GreenElement {
    Node(GreenNode),
    Token(GreenToken),
}

impl GreenElement {
    pub fn head(&self) -> SyntaxHead {
        match self {
            GreenElement::Node(node) => node.head(),
            GreenElement::Token(token) => token.head(),
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.head().kind()
    }

    pub fn flags(&self) -> SyntaxFlags {
        self.head().flags()
    }

    pub fn width(&self) -> TextSize {
        match self {
            GreenElement::Node(node) => node.width(),
            GreenElement::Token(token) => token.width(),
        }
    }

    pub fn is_trivia(&self) -> bool {
        self.head().is_trivia()
    }

    pub fn as_node(&self) -> Option<&GreenNode> {
        match self {
            GreenElement::Node(node) => Some(node),
            GreenElement::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&GreenToken> {
        match self {
            GreenElement::Node(_) => None,
            GreenElement::Token(token) => Some(token),
        }
    }

    /// Reconstitutes the text this element covers by concatenating its leaf
    /// widths against the original source. When called on the root of a tree
    /// built from a full parse, the result is byte-identical to the source.
    pub fn source_text(&self, source: &str) -> String {
        let mut out = String::with_capacity(self.width() as usize);
        self.write_source(source, &mut 0, &mut out);
        out
    }

    fn write_source(&self, source: &str, offset: &mut usize, out: &mut String) {
        match self {
            GreenElement::Token(token) => {
                let end = *offset + token.width() as usize;
                out.push_str(&source[*offset..end]);
                *offset = end;
            }
            GreenElement::Node(node) => {
                for child in node.children() {
                    child.write_source(source, offset, out);
                }
            }
        }
    }

    fn fmt_at(&self, f: &mut fmt::Formatter<'_>, indent: usize, offset: TextSize) -> fmt::Result {
        write!(
            f,
            "{:indent$}{:?}@{}..{}",
            "",
            self.kind(),
            offset,
            offset + self.width(),
            indent = indent * 2
        )?;
        if !self.flags().is_empty() {
            write!(f, " {:?}", self.flags())?;
        }
        writeln!(f)?;
        if let GreenElement::Node(node) = self {
            let mut child_offset = offset;
            for child in node.children() {
                child.fmt_at(f, indent + 1, child_offset)?;
                child_offset += child.width();
            }
        }
        Ok(())
    }
}

impl From<GreenNode> for GreenElement {
    fn from(node: GreenNode) -> Self {
        GreenElement::Node(node)
    }
}

impl From<GreenToken> for GreenElement {
    fn from(token: GreenToken) -> Self {
        GreenElement::Token(token)
    }
}

impl fmt::Debug for GreenToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}+{}", self.kind(), self.width)
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&GreenElement::Node(self.clone()), f)
    }
}

impl fmt::Debug for GreenElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            self.fmt_at(f, 0, 0)
        } else {
            match self {
                GreenElement::Token(token) => fmt::Debug::fmt(token, f),
                GreenElement::Node(node) => f
                    .debug_struct("GreenNode")
                    .field("kind", &node.kind())
                    .field("width", &node.width())
                    .field("children", &node.children().len())
                    .finish(),
            }
        }
    }
}
