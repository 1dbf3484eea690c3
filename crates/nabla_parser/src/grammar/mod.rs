use nabla_syntax::{SyntaxFlags, SyntaxKind};

use crate::state::ParseState;

mod atoms;
mod expressions;
mod statements;

/// The canonical terminator predicate: true for every token that closes a
/// bounded expression list. `end` only terminates when it is acting as a
/// block terminator, not when the surrounding context (indexing) has turned
/// it into an ordinary identifier.
pub(crate) fn is_closing_token(ps: &ParseState<'_>, kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::ELSEIF_KW
            | SyntaxKind::ELSE_KW
            | SyntaxKind::CATCH_KW
            | SyntaxKind::FINALLY_KW
            | SyntaxKind::COMMA
            | SyntaxKind::R_PAREN
            | SyntaxKind::R_SQUARE
            | SyntaxKind::R_CURLY
            | SyntaxKind::SEMI
            | SyntaxKind::END_MARKER
    ) || (kind == SyntaxKind::END_KW && !ps.end_symbol())
}

/// Parse a whole source file: a statement list wrapped in a single
/// `TOPLEVEL` node. Stray closing tokens at the top level are consumed as
/// errors so the parse always reaches the end of input and the tree always
/// covers every byte.
pub(crate) fn parse_toplevel(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    loop {
        parse_stmt_list(ps);
        let token = ps.peek_token(1);
        if token.kind() == SyntaxKind::END_MARKER {
            break;
        }
        ps.bump_error(&format!("unexpected `{}`", token.kind()));
    }
    // Pick up trailing trivia so the tree stays lossless.
    ps.bump_trailing_trivia();
    ps.emit(mark, SyntaxKind::TOPLEVEL, SyntaxFlags::empty());
}

/// Statements separated by `;` and/or newlines, running until a closing
/// token. Separators are recorded as trivia. Shared by the top level and by
/// every keyword block body.
pub(super) fn parse_stmt_list(ps: &mut ParseState<'_>) {
    parse_separated(
        ps,
        expressions::parse_eq,
        |kind| matches!(kind, SyntaxKind::SEMI | SyntaxKind::NEWLINE_WS),
    );
}

/// The shared N-ary sequence combinator: `item` productions separated by
/// `is_separator` tokens, terminated by a closing token. Junk between items
/// is consumed as error spans so the sequence always makes progress.
pub(super) fn parse_separated(
    ps: &mut ParseState<'_>,
    item: fn(&mut ParseState<'_>),
    is_separator: fn(SyntaxKind) -> bool,
) {
    loop {
        while is_separator(ps.peek(1)) {
            ps.bump(SyntaxFlags::TRIVIA);
        }
        let kind = ps.peek(1);
        if is_closing_token(ps, kind) {
            break;
        }
        item(ps);

        let kind = ps.peek(1);
        if is_separator(kind) {
            ps.bump(SyntaxFlags::TRIVIA);
            continue;
        }
        if is_closing_token(ps, kind) {
            break;
        }
        ps.bump_error("extra token after end of expression");
    }
}

/// Reset to the default statement context: the bracket-local parsing modes
/// do not leak into keyword block bodies or conditions.
pub(super) fn normal_context<'a>(ps: &'a mut ParseState<'_>) -> ParseState<'a> {
    ps.derive()
        .with_range_colon_enabled(true)
        .with_space_sensitive(false)
        .with_for_generator(false)
        .with_end_symbol(false)
        .with_whitespace_newline(false)
        .with_where_enabled(true)
}

#[cfg(test)]
mod tests {
    use arcstr::ArcStr;
    use nabla_syntax::TaggedSpan;

    use super::parse_toplevel;
    use crate::diagnostics::Diagnostic;
    use crate::state::{LanguageVersion, ParseState};
    use crate::stream::ParseStream;

    fn parse_spans(source: &str) -> (Vec<TaggedSpan>, Vec<Diagnostic>) {
        let mut stream = ParseStream::new(ArcStr::from(source));
        let mut state = ParseState::new(&mut stream, LanguageVersion::default());
        parse_toplevel(&mut state);
        stream.finish()
    }

    const INPUTS: &[&str] = &[
        "a = b = c",
        "m = [1 2; 3 4]",
        "x ? y : z",
        "f(a)[end] .+ 2x",
        "begin\n : \nend",
        "= oops [",
    ];

    /// Spans are emitted with non-decreasing starts, except that an interior
    /// span may reach back over the spans it encloses.
    #[test]
    fn emission_order_is_non_decreasing_or_enclosing() {
        for source in INPUTS {
            let (spans, _) = parse_spans(source);
            for j in 1..spans.len() {
                let current = spans[j];
                let previous = spans[j - 1];
                assert!(
                    current.start() >= previous.start()
                        || (current.start() <= previous.start()
                            && current.end() >= previous.end()),
                    "span {current:?} breaks emission order after {previous:?} in {source:?}"
                );
            }
        }
    }

    /// Diagnostics come out in the order they were raised, which for a
    /// single pass over the input is source order.
    #[test]
    fn diagnostics_are_in_source_order() {
        let (_, diagnostics) = parse_spans("= a [ ; b =");
        let starts: Vec<_> = diagnostics.iter().map(|d| d.span().start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
    }

    /// The number of consumed tokens is bounded by the input: every bump
    /// makes progress, so the span log cannot blow up past the token count
    /// plus the interior nodes wrapping them.
    #[test]
    fn parsing_terminates_on_degenerate_input() {
        let source = "((((((((((";
        let (spans, diagnostics) = parse_spans(source);
        assert!(!spans.is_empty());
        assert!(!diagnostics.is_empty());
    }
}
