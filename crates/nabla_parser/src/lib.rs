pub use diagnostics::{render_diagnostics, Diagnostic};
pub use state::{LanguageVersion, ParseState};
pub use stream::{ParseStream, StreamPosition, SyntaxToken};

pub use nabla_syntax::{
    build_tree, GreenElement, GreenNode, GreenToken, SyntaxFlags, SyntaxHead, SyntaxKind,
    TaggedSpan, TreeBuildError,
};

use arcstr::ArcStr;

mod diagnostics;
mod grammar;
mod lexer;
mod state;
mod stream;

/// Configuration for a parse. Constructed with defaults and adjusted
/// field-by-field.
#[derive(Clone, Copy, Debug, Default)]
pub struct ParserOptions {
    pub version: LanguageVersion,
}

/// The outcome of a parse: the shared source text, a lossless tree covering
/// every byte of it, and the diagnostics raised along the way in source
/// order. Diagnostics never prevent the tree from being produced.
pub struct ParseResult {
    pub source: ArcStr,
    pub tree: GreenElement,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// Reconstitute the source from the tree's leaves. Always byte-identical
    /// to the original input.
    pub fn source_text(&self) -> String {
        self.tree.source_text(&self.source)
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Render the diagnostics against the source, optionally with terminal
    /// styling.
    pub fn render_diagnostics(&self, colored: bool) -> String {
        render_diagnostics(&self.source, &self.diagnostics, colored)
    }
}

/// Parse a complete source file under default options.
pub fn parse(source: &str) -> ParseResult {
    parse_with_options(source, ParserOptions::default())
}

/// Parse a complete source file targeting a specific language version.
pub fn parse_with_options(source: &str, options: ParserOptions) -> ParseResult {
    let source = ArcStr::from(source);
    let mut stream = ParseStream::new(source.clone());
    let mut state = ParseState::new(&mut stream, options.version);
    grammar::parse_toplevel(&mut state);

    let (spans, diagnostics) = stream.finish();
    let tree = match build_tree(&spans, Some(SyntaxKind::TOPLEVEL)) {
        Ok(tree) => tree,
        Err(error) => unreachable!("the parser always emits a top-level node: {error}"),
    };
    ParseResult {
        source,
        tree,
        diagnostics,
    }
}
