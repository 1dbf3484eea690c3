use nabla_syntax::{SyntaxFlags, SyntaxKind};

use crate::stream::{ParseStream, StreamPosition, SyntaxToken};

/// The language version the parser targets. Gates version-specific grammar,
/// e.g. `var"..."` identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LanguageVersion {
    pub major: u16,
    pub minor: u16,
}

impl LanguageVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    pub fn at_least(&self, major: u16, minor: u16) -> bool {
        (self.major, self.minor) >= (major, minor)
    }
}

impl Default for LanguageVersion {
    fn default() -> Self {
        LanguageVersion::new(1, 1)
    }
}

/// Parser context threaded through the recursive descent.
///
/// A state borrows the stream exclusively and carries a small set of context
/// flags. Productions that need different flags for a sub-parse build a
/// derived state with [`ParseState::derive`] and the chainable `with_*`
/// setters; the derived state reborrows the stream for the duration of the
/// call and the caller's own flags are never touched. A production that
/// fails partway through therefore never has flag cleanup to do.
///
/// The token accessors delegate to the stream, supplying
/// `skip_newlines = whitespace_newline` so that productions read newline
/// significance from context automatically.
pub struct ParseState<'s> {
    stream: &'s mut ParseStream,
    version: LanguageVersion,
    /// `:` forms ranges; disabled between `?` and `:` of a ternary.
    range_colon_enabled: bool,
    /// Whitespace in front of a unary operator starts a new expression
    /// (matrix rows).
    space_sensitive: bool,
    /// `for` terminates expression parsing and forms a generator.
    for_generator: bool,
    /// `end` is an ordinary identifier (inside indexing) rather than a block
    /// terminator.
    end_symbol: bool,
    /// Newlines are ordinary whitespace (inside parentheses) instead of
    /// statement separators.
    whitespace_newline: bool,
    /// `where` clauses may be parsed.
    where_enabled: bool,
}

impl<'s> ParseState<'s> {
    pub fn new(stream: &'s mut ParseStream, version: LanguageVersion) -> Self {
        Self {
            stream,
            version,
            range_colon_enabled: true,
            space_sensitive: false,
            for_generator: false,
            end_symbol: false,
            whitespace_newline: false,
            where_enabled: true,
        }
    }

    /// A child state with the same flags, reborrowing the stream. Chain the
    /// `with_*` setters onto it to change flags for one sub-parse.
    pub fn derive(&mut self) -> ParseState<'_> {
        ParseState {
            stream: &mut *self.stream,
            version: self.version,
            range_colon_enabled: self.range_colon_enabled,
            space_sensitive: self.space_sensitive,
            for_generator: self.for_generator,
            end_symbol: self.end_symbol,
            whitespace_newline: self.whitespace_newline,
            where_enabled: self.where_enabled,
        }
    }

    pub fn with_range_colon_enabled(mut self, value: bool) -> Self {
        self.range_colon_enabled = value;
        self
    }

    pub fn with_space_sensitive(mut self, value: bool) -> Self {
        self.space_sensitive = value;
        self
    }

    pub fn with_for_generator(mut self, value: bool) -> Self {
        self.for_generator = value;
        self
    }

    pub fn with_end_symbol(mut self, value: bool) -> Self {
        self.end_symbol = value;
        self
    }

    pub fn with_whitespace_newline(mut self, value: bool) -> Self {
        self.whitespace_newline = value;
        self
    }

    pub fn with_where_enabled(mut self, value: bool) -> Self {
        self.where_enabled = value;
        self
    }

    pub fn version(&self) -> LanguageVersion {
        self.version
    }

    pub fn range_colon_enabled(&self) -> bool {
        self.range_colon_enabled
    }

    pub fn space_sensitive(&self) -> bool {
        self.space_sensitive
    }

    pub fn for_generator(&self) -> bool {
        self.for_generator
    }

    pub fn end_symbol(&self) -> bool {
        self.end_symbol
    }

    pub fn whitespace_newline(&self) -> bool {
        self.whitespace_newline
    }

    pub fn where_enabled(&self) -> bool {
        self.where_enabled
    }

    //#region Stream delegation

    pub fn peek(&mut self, n: usize) -> SyntaxKind {
        self.stream.peek(n, self.whitespace_newline)
    }

    pub fn peek_token(&mut self, n: usize) -> SyntaxToken {
        self.stream.peek_token(n, self.whitespace_newline)
    }

    pub fn bump(&mut self, flags: SyntaxFlags) -> StreamPosition {
        self.stream.bump(flags, self.whitespace_newline)
    }

    pub fn bump_as(&mut self, new_kind: SyntaxKind, flags: SyntaxFlags) -> StreamPosition {
        self.stream.bump_as(new_kind, flags, self.whitespace_newline)
    }

    pub fn bump_error(&mut self, message: &str) -> StreamPosition {
        self.stream.bump_error(message, self.whitespace_newline)
    }

    pub fn bump_trivia(&mut self) {
        self.stream.bump_trivia(self.whitespace_newline)
    }

    /// Consume all remaining trivia regardless of newline significance; used
    /// once at the very end of a parse to keep the tree lossless.
    pub fn bump_trailing_trivia(&mut self) {
        self.stream.bump_trivia(true)
    }

    pub fn bump_invisible(&mut self, kind: SyntaxKind, flags: SyntaxFlags) -> StreamPosition {
        self.stream.bump_invisible(kind, flags)
    }

    pub fn position(&self) -> StreamPosition {
        self.stream.position()
    }

    pub fn emit(&mut self, mark: StreamPosition, kind: SyntaxKind, flags: SyntaxFlags) -> StreamPosition {
        self.stream.emit(mark, kind, flags)
    }

    pub fn emit_error(&mut self, mark: StreamPosition, message: &str) -> StreamPosition {
        self.stream.emit_error(mark, message)
    }

    pub fn emit_diagnostic(&mut self, message: &str) {
        self.stream.emit_diagnostic(message, self.whitespace_newline)
    }

    pub fn emit_diagnostic_on_whitespace(&mut self, message: &str) {
        self.stream
            .emit_diagnostic_on_whitespace(message, self.whitespace_newline)
    }

    pub fn reset_token(
        &mut self,
        mark: StreamPosition,
        kind: Option<SyntaxKind>,
        flags: Option<SyntaxFlags>,
    ) {
        self.stream.reset_token(mark, kind, flags)
    }

    pub fn last_span_kind(&self) -> Option<SyntaxKind> {
        self.stream.last_span_kind()
    }

    //#endregion
}
