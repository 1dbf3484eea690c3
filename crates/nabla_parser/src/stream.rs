use std::collections::VecDeque;

use arcstr::ArcStr;
use nabla_syntax::{SyntaxFlags, SyntaxHead, SyntaxKind, TaggedSpan, TextSize};

use crate::diagnostics::Diagnostic;
use crate::lexer::{Lexer, RawToken};

/// Upper bound on consecutive peeks without a consuming bump. Exceeding it
/// means a production is looping without making progress, which is a bug in
/// the parser rather than a property of the input.
pub(crate) const PARSER_STUCK_LIMIT: u32 = 100_000;

/// A lexer token enriched with the whitespace context the parser's
/// whitespace-sensitive decisions depend on: whether any whitespace, and
/// whether any newline, preceded this token since the last significant one.
/// Both bits are computed once, when the token is first drawn into the
/// lookahead buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyntaxToken {
    raw: RawToken,
    preceding_whitespace: bool,
    preceding_newline: bool,
}

impl SyntaxToken {
    fn new(raw: RawToken, preceding_whitespace: bool, preceding_newline: bool) -> Self {
        Self {
            raw,
            preceding_whitespace,
            preceding_newline,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.raw.kind()
    }

    pub fn flags(&self) -> SyntaxFlags {
        self.raw.flags()
    }

    pub fn start(&self) -> TextSize {
        self.raw.start()
    }

    pub fn end(&self) -> TextSize {
        self.raw.end()
    }

    pub fn preceding_whitespace(&self) -> bool {
        self.preceding_whitespace
    }

    pub fn preceding_newline(&self) -> bool {
        self.preceding_newline
    }
}

/// A stable mark into the parse stream: the byte position the stream had
/// reached and the index of the span log at that moment. Marks survive
/// arbitrary later emissions; they are used both as the start anchor for
/// interior-node spans and as handles for rewriting an already-emitted span
/// in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamPosition {
    byte: TextSize,
    span_index: u32,
}

impl StreamPosition {
    pub fn byte(&self) -> TextSize {
        self.byte
    }
}

/// The buffered token source and tree sink sitting between the lexer and the
/// parser productions.
///
/// Tokens flow in through a lookahead buffer that is filled lazily, one
/// trivia run plus its significant terminator at a time. Output flows out as
/// a flat log of [`TaggedSpan`]s: every consumed token appends one span, and
/// finished interior nodes append covering spans after their children. The
/// log is later folded into a green tree by byte-range containment.
///
/// The span log is append-only in position but mutable in content: a
/// [`StreamPosition`] returned from a bump can be used to rewrite that span's
/// kind or flags once later context has decided its true role.
pub struct ParseStream {
    source: ArcStr,
    lexer: Lexer,
    lookahead: VecDeque<SyntaxToken>,
    spans: Vec<TaggedSpan>,
    diagnostics: Vec<Diagnostic>,
    /// The byte offset one past the last consumed byte, equivalently the
    /// start of the next token to be consumed.
    next_byte: TextSize,
    /// Peeks since the last consuming bump, for the stuck-parser guard.
    peek_count: u32,
}

impl ParseStream {
    pub fn new(source: ArcStr) -> Self {
        Self {
            lexer: Lexer::new(source.clone()),
            source,
            lookahead: VecDeque::with_capacity(8),
            spans: Vec::with_capacity(64),
            diagnostics: vec![],
            next_byte: 0,
            peek_count: 0,
        }
    }

    pub fn source(&self) -> &ArcStr {
        &self.source
    }

    //#region Lookahead

    /// Draw raw tokens from the lexer until a significant (non-trivia) token
    /// has been buffered, stamping every drawn token with the whitespace and
    /// newline context accumulated over the run before it.
    fn buffer_lookahead(&mut self) {
        if self.at_buffered_end() {
            return;
        }
        let mut had_whitespace = false;
        let mut had_newline = false;
        loop {
            let raw = self.lexer.next_token();
            self.lookahead
                .push_back(SyntaxToken::new(raw, had_whitespace, had_newline));
            if !raw.kind().is_trivia() {
                break;
            }
            had_whitespace = true;
            had_newline |= raw.kind() == SyntaxKind::NEWLINE_WS;
        }
    }

    fn at_buffered_end(&self) -> bool {
        self.lookahead
            .back()
            .is_some_and(|token| token.kind() == SyntaxKind::END_MARKER)
    }

    /// Index into the lookahead buffer of the `n`-th significant token from
    /// the current position. `WHITESPACE` and `COMMENT` are always skipped;
    /// `NEWLINE_WS` is skipped only when `skip_newlines` is set.
    fn lookahead_index(&mut self, n: usize, skip_newlines: bool) -> usize {
        debug_assert!(n >= 1, "lookahead is 1-based");
        let mut remaining = n;
        let mut index = 0;
        loop {
            if index >= self.lookahead.len() {
                if self.at_buffered_end() {
                    // Peeking past the end marker saturates on it.
                    return self.lookahead.len() - 1;
                }
                self.buffer_lookahead();
                continue;
            }
            let kind = self.lookahead[index].kind();
            let skipped = matches!(kind, SyntaxKind::WHITESPACE | SyntaxKind::COMMENT)
                || (kind == SyntaxKind::NEWLINE_WS && skip_newlines);
            if !skipped {
                remaining -= 1;
                if remaining == 0 {
                    return index;
                }
            }
            index += 1;
        }
    }

    /// Returns the `n`-th significant token ahead without consuming anything.
    pub fn peek_token(&mut self, n: usize, skip_newlines: bool) -> SyntaxToken {
        self.note_peek();
        let index = self.lookahead_index(n, skip_newlines);
        self.lookahead[index]
    }

    /// Returns the kind of the `n`-th significant token ahead.
    pub fn peek(&mut self, n: usize, skip_newlines: bool) -> SyntaxKind {
        self.peek_token(n, skip_newlines).kind()
    }

    fn note_peek(&mut self) {
        self.peek_count += 1;
        if self.peek_count > PARSER_STUCK_LIMIT {
            panic!(
                "parser stuck: {} peeks without consuming a token at byte {}",
                self.peek_count, self.next_byte
            );
        }
    }

    //#endregion

    //#region Consuming

    /// Consume lookahead tokens up to and including the next significant
    /// token. The leading trivia tokens are emitted with their own kinds plus
    /// the `TRIVIA` flag; the significant token is emitted with the
    /// caller-supplied flags (keeping any lexer-provided bits).
    pub fn bump(&mut self, flags: SyntaxFlags, skip_newlines: bool) -> StreamPosition {
        self.bump_with(flags, skip_newlines, None)
    }

    /// Like [`ParseStream::bump`], but records the significant token under a
    /// different kind than the lexer gave it.
    pub fn bump_as(
        &mut self,
        new_kind: SyntaxKind,
        flags: SyntaxFlags,
        skip_newlines: bool,
    ) -> StreamPosition {
        self.bump_with(flags, skip_newlines, Some(new_kind))
    }

    /// Consume the next significant token as invalid syntax: the token (and
    /// its leading trivia) is wrapped in a trivia-flagged `ERROR` span and a
    /// diagnostic covering the same range is recorded.
    pub fn bump_error(&mut self, message: &str, skip_newlines: bool) -> StreamPosition {
        let mark = self.position();
        self.bump_with(SyntaxFlags::empty(), skip_newlines, None);
        let position = self.emit(mark, SyntaxKind::ERROR, SyntaxFlags::TRIVIA);
        self.push_diagnostic(mark.byte, self.next_byte, message);
        position
    }

    fn bump_with(
        &mut self,
        flags: SyntaxFlags,
        skip_newlines: bool,
        new_kind: Option<SyntaxKind>,
    ) -> StreamPosition {
        let target = self.lookahead_index(1, skip_newlines);
        let mut span_index = self.spans.len() as u32;
        for i in 0..=target {
            let token = *self.lookahead.front().expect("lookahead ran dry mid-bump");
            // The end marker is never consumed, even when it shows up before
            // the expected significant token.
            if token.kind() == SyntaxKind::END_MARKER {
                break;
            }
            self.lookahead.pop_front();
            let head = if i == target {
                span_index = self.spans.len() as u32;
                let kind = new_kind.unwrap_or(token.kind());
                SyntaxHead::new(kind, flags | token.flags())
            } else {
                SyntaxHead::new(token.kind(), token.flags() | SyntaxFlags::TRIVIA)
            };
            self.spans
                .push(TaggedSpan::new(head, token.start(), token.end()));
            self.next_byte = token.end();
        }
        self.peek_count = 0;
        StreamPosition {
            byte: self.next_byte,
            span_index,
        }
    }

    /// Consume only the trivia run in front of the next significant token,
    /// leaving that token in the buffer.
    pub fn bump_trivia(&mut self, skip_newlines: bool) {
        let target = self.lookahead_index(1, skip_newlines);
        for _ in 0..target {
            let token = self
                .lookahead
                .pop_front()
                .expect("lookahead ran dry mid-bump");
            let head = SyntaxHead::new(token.kind(), token.flags() | SyntaxFlags::TRIVIA);
            self.spans
                .push(TaggedSpan::new(head, token.start(), token.end()));
            self.next_byte = token.end();
        }
        if target > 0 {
            self.peek_count = 0;
        }
    }

    /// Emit a zero-width span at the current position, representing an
    /// implicit grammatical element such as the multiplication in `2x`. If
    /// the invisible token later turns out to be unnecessary, reset its kind
    /// to `TOMBSTONE` rather than removing it, so existing marks stay valid.
    pub fn bump_invisible(&mut self, kind: SyntaxKind, flags: SyntaxFlags) -> StreamPosition {
        let span_index = self.spans.len() as u32;
        self.spans.push(TaggedSpan::new(
            SyntaxHead::new(kind, flags),
            self.next_byte,
            self.next_byte,
        ));
        StreamPosition {
            byte: self.next_byte,
            span_index,
        }
    }

    //#endregion

    //#region Emitting

    /// The current position, usable as the start anchor of a future interior
    /// node covering everything consumed from here on.
    pub fn position(&self) -> StreamPosition {
        StreamPosition {
            byte: self.next_byte,
            span_index: self.spans.len() as u32,
        }
    }

    /// Append an interior-node span covering everything consumed since
    /// `mark`. Interior spans enclose the spans emitted inside them; the tree
    /// builder folds them into parent nodes.
    pub fn emit(&mut self, mark: StreamPosition, kind: SyntaxKind, flags: SyntaxFlags) -> StreamPosition {
        let span_index = self.spans.len() as u32;
        self.spans.push(TaggedSpan::new(
            SyntaxHead::new(kind, flags),
            mark.byte,
            self.next_byte,
        ));
        StreamPosition {
            byte: self.next_byte,
            span_index,
        }
    }

    /// Append an `ERROR` interior node covering everything consumed since
    /// `mark`, together with a diagnostic over the same range.
    pub fn emit_error(&mut self, mark: StreamPosition, message: &str) -> StreamPosition {
        let position = self.emit(mark, SyntaxKind::ERROR, SyntaxFlags::empty());
        self.push_diagnostic(mark.byte, self.next_byte, message);
        position
    }

    /// Record a diagnostic pointing at the next significant token.
    pub fn emit_diagnostic(&mut self, message: &str, skip_newlines: bool) {
        let index = self.lookahead_index(1, skip_newlines);
        let token = self.lookahead[index];
        self.push_diagnostic(token.start(), token.end(), message);
    }

    /// Record a diagnostic pointing at the unconsumed whitespace run in front
    /// of the next significant token.
    pub fn emit_diagnostic_on_whitespace(&mut self, message: &str, skip_newlines: bool) {
        let index = self.lookahead_index(1, skip_newlines);
        let token = self.lookahead[index];
        self.push_diagnostic(self.next_byte, token.start(), message);
    }

    fn push_diagnostic(&mut self, start: TextSize, end: TextSize, message: &str) {
        self.diagnostics
            .push(Diagnostic::new(start as usize..end as usize, message));
    }

    /// Rewrite the kind and/or flags of an already-emitted span in place.
    /// The role of a token is sometimes only decided by later context, e.g. a
    /// separator that turns out to be trailing.
    pub fn reset_token(
        &mut self,
        mark: StreamPosition,
        kind: Option<SyntaxKind>,
        flags: Option<SyntaxFlags>,
    ) {
        let span = &mut self.spans[mark.span_index as usize];
        if let Some(kind) = kind {
            span.set_kind(kind);
        }
        if let Some(flags) = flags {
            span.set_flags(flags);
        }
    }

    //#endregion

    /// The kind of the most recently emitted span, if any. Lets productions
    /// make juxtaposition decisions about the expression they just finished.
    pub fn last_span_kind(&self) -> Option<SyntaxKind> {
        self.spans.last().map(TaggedSpan::kind)
    }

    pub fn spans(&self) -> &[TaggedSpan] {
        &self.spans
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the stream, returning the finished span log and diagnostics.
    pub fn finish(self) -> (Vec<TaggedSpan>, Vec<Diagnostic>) {
        (self.spans, self.diagnostics)
    }
}

#[cfg(feature = "debug-tracing")]
impl ParseStream {
    /// Dump the span log with source excerpts, for debugging the parser.
    pub fn debug_spans(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        for span in &self.spans {
            let _ = writeln!(
                out,
                "{:?} {:?}",
                span,
                self.source
                    .get(span.span())
                    .map(str::escape_debug)
                    .map(|text| text.to_string())
                    .unwrap_or_default(),
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(source: &str) -> ParseStream {
        ParseStream::new(ArcStr::from(source))
    }

    #[test]
    fn peek_skips_trivia() {
        let mut s = stream("a  # comment\n b");
        assert_eq!(s.peek(1, true), SyntaxKind::IDENTIFIER);
        assert_eq!(s.peek(2, true), SyntaxKind::IDENTIFIER);
        assert_eq!(s.peek(3, true), SyntaxKind::END_MARKER);
    }

    #[test]
    fn newlines_are_significant_when_not_skipped() {
        let mut s = stream("a\nb");
        assert_eq!(s.peek(2, false), SyntaxKind::NEWLINE_WS);
        assert_eq!(s.peek(2, true), SyntaxKind::IDENTIFIER);
    }

    #[test]
    fn whitespace_bits_are_aggregated_per_run() {
        let mut s = stream("a # note\n b");
        let first = s.peek_token(1, true);
        assert!(!first.preceding_whitespace());
        let second = s.peek_token(2, true);
        assert!(second.preceding_whitespace());
        assert!(second.preceding_newline());
    }

    #[test]
    fn bump_emits_leading_trivia_and_the_token() {
        let mut s = stream("  a");
        s.bump(SyntaxFlags::empty(), true);
        let spans = s.spans();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].kind(), SyntaxKind::WHITESPACE);
        assert!(spans[0].flags().is_trivia());
        assert_eq!(spans[1].kind(), SyntaxKind::IDENTIFIER);
        assert!(!spans[1].flags().is_trivia());
        assert_eq!(s.position().byte(), 3);
    }

    #[test]
    fn bump_as_renames_the_significant_token() {
        let mut s = stream("end");
        s.bump_as(SyntaxKind::IDENTIFIER, SyntaxFlags::empty(), true);
        assert_eq!(s.spans()[0].kind(), SyntaxKind::IDENTIFIER);
    }

    #[test]
    fn bump_never_consumes_the_end_marker() {
        let mut s = stream("a");
        s.bump(SyntaxFlags::empty(), true);
        let before = s.spans().len();
        s.bump(SyntaxFlags::empty(), true);
        assert_eq!(s.spans().len(), before);
        assert_eq!(s.peek(1, true), SyntaxKind::END_MARKER);
    }

    #[test]
    fn bump_error_wraps_the_token_and_records_a_diagnostic() {
        let mut s = stream("=");
        s.bump_error("unexpected `=`", true);
        let spans = s.spans();
        assert_eq!(spans[0].kind(), SyntaxKind::EQ);
        assert_eq!(spans[1].kind(), SyntaxKind::ERROR);
        assert!(spans[1].flags().is_trivia());
        assert_eq!(spans[1].span(), 0..1);
        assert_eq!(s.diagnostics().len(), 1);
        assert_eq!(s.diagnostics()[0].span(), 0..1);
    }

    #[test]
    fn emit_covers_everything_since_the_mark() {
        let mut s = stream(":foo");
        let mark = s.position();
        s.bump(SyntaxFlags::empty(), true);
        s.bump(SyntaxFlags::empty(), true);
        s.emit(mark, SyntaxKind::QUOTE, SyntaxFlags::empty());
        let spans = s.spans();
        assert_eq!(spans[2].kind(), SyntaxKind::QUOTE);
        assert_eq!(spans[2].span(), 0..4);
    }

    #[test]
    fn invisible_tokens_are_zero_width_and_resettable() {
        let mut s = stream("2x");
        s.bump(SyntaxFlags::empty(), true);
        let star = s.bump_invisible(SyntaxKind::STAR, SyntaxFlags::empty());
        assert_eq!(s.spans()[1].span(), 1..1);
        s.reset_token(star, Some(SyntaxKind::TOMBSTONE), None);
        assert_eq!(s.spans()[1].kind(), SyntaxKind::TOMBSTONE);
    }

    #[test]
    fn reset_token_can_demote_a_separator_to_trivia() {
        let mut s = stream("; ");
        let semi = s.bump(SyntaxFlags::empty(), true);
        s.reset_token(semi, None, Some(SyntaxFlags::TRIVIA));
        assert!(s.spans()[0].flags().is_trivia());
        assert_eq!(s.spans()[0].kind(), SyntaxKind::SEMI);
    }

    #[test]
    fn diagnostic_on_whitespace_covers_the_trivia_run() {
        let mut s = stream(": foo");
        s.bump(SyntaxFlags::empty(), true);
        s.emit_diagnostic_on_whitespace("whitespace not allowed here", true);
        assert_eq!(s.diagnostics()[0].span(), 1..2);
    }

    #[test]
    fn peek_count_resets_on_bump() {
        let mut s = stream("a b c");
        for _ in 0..(PARSER_STUCK_LIMIT - 1) {
            s.peek(1, true);
        }
        s.bump(SyntaxFlags::empty(), true);
        // The counter starts over once a token is consumed.
        for _ in 0..(PARSER_STUCK_LIMIT - 1) {
            s.peek(1, true);
        }
    }

    #[test]
    #[should_panic(expected = "parser stuck")]
    fn progress_guard_fires_after_too_many_peeks() {
        let mut s = stream("a");
        for _ in 0..=PARSER_STUCK_LIMIT {
            s.peek(1, true);
        }
    }
}
