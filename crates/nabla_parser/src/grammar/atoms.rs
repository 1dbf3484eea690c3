use nabla_syntax::{SyntaxFlags, SyntaxKind};

use super::{expressions::parse_eq_star, is_closing_token, statements};
use crate::state::ParseState;
use crate::stream::StreamPosition;

/// Primary expressions. With `checked` set, identifiers go through name
/// validation; quoting parses its payload unchecked so that reserved words
/// become plain quoted symbols (`:end`, `:if`).
pub(super) fn parse_atom(ps: &mut ParseState<'_>, checked: bool) {
    let token = ps.peek_token(1);
    let kind = token.kind();

    if !checked && kind.is_keyword() {
        ps.bump(SyntaxFlags::empty());
        return;
    }

    match kind {
        SyntaxKind::COLON => parse_quote_or_colon(ps),
        SyntaxKind::EQ => {
            ps.bump_error("unexpected `=`");
        }
        SyntaxKind::IDENTIFIER => {
            ps.bump(SyntaxFlags::empty());
        }
        // `var"..."` bypasses name validation entirely, but is only part of
        // the grammar from language version 1.1.
        SyntaxKind::VAR_IDENTIFIER => {
            if !ps.version().at_least(1, 1) {
                ps.emit_diagnostic("`var\"...\"` identifiers require language version 1.1");
            }
            ps.bump(SyntaxFlags::empty());
        }
        SyntaxKind::INTEGER
        | SyntaxKind::FLOAT
        | SyntaxKind::STRING
        | SyntaxKind::CHAR
        | SyntaxKind::TRUE_KW
        | SyntaxKind::FALSE_KW => {
            ps.bump(SyntaxFlags::empty());
        }
        // `end` in indexing position refers to the last index and parses as
        // an ordinary identifier-like atom.
        SyntaxKind::END_KW if ps.end_symbol() => {
            ps.bump(SyntaxFlags::empty());
        }
        SyntaxKind::L_PAREN => parse_paren(ps),
        SyntaxKind::L_SQUARE => parse_cat(ps, SyntaxKind::R_SQUARE),
        SyntaxKind::L_CURLY => parse_cat(ps, SyntaxKind::R_CURLY),
        // A command literal is an implicit macro call: the macro name is an
        // invisible zero-width token in front of the string content.
        SyntaxKind::CMD_STRING => {
            let mark = ps.position();
            ps.bump_trivia();
            ps.bump_invisible(SyntaxKind::MACRO_NAME, SyntaxFlags::empty());
            ps.bump(SyntaxFlags::empty());
            ps.emit(mark, SyntaxKind::MACRO_CALL, SyntaxFlags::empty());
        }
        SyntaxKind::BEGIN_KW
        | SyntaxKind::IF_KW
        | SyntaxKind::WHILE_KW
        | SyntaxKind::FOR_KW
        | SyntaxKind::TRY_KW => statements::parse_keyword_form(ps),
        SyntaxKind::ERROR => {
            ps.bump_error("invalid token");
        }
        SyntaxKind::END_MARKER => {
            ps.bump_invisible(SyntaxKind::ERROR, SyntaxFlags::empty());
            ps.emit_diagnostic("unexpected end of input");
        }
        kind if is_closing_token(ps, kind) => {
            // The closing token belongs to the caller; leave it unconsumed
            // and record a zero-width error in its place.
            ps.bump_invisible(SyntaxKind::ERROR, SyntaxFlags::empty());
            ps.emit_diagnostic(&format!("unexpected `{kind}`"));
        }
        _ => {
            ps.bump_error("invalid syntax");
        }
    }
}

/// A leading `:` is either a bare colon atom (in front of a closing token)
/// or quotes the atom that follows it. Whitespace between the colon and its
/// payload is not allowed, but the quote is still parsed so the tree stays
/// total.
fn parse_quote_or_colon(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    ps.bump(SyntaxFlags::empty());

    // In front of a closing token or the end of the line the colon is a
    // literal atom, except that a directly-attached keyword still quotes:
    // `:)` and `: end` are bare colons, `:end` is a quoted symbol.
    let next = ps.peek_token(1);
    if (is_closing_token(ps, next.kind()) || next.kind() == SyntaxKind::NEWLINE_WS)
        && (!next.kind().is_keyword() || next.preceding_whitespace())
    {
        return;
    }
    if next.preceding_whitespace() || next.preceding_newline() {
        ps.emit_diagnostic_on_whitespace("whitespace not allowed after `:` used for quoting");
    }

    parse_atom(&mut ps.derive().with_end_symbol(false), false);
    ps.emit(mark, SyntaxKind::QUOTE, SyntaxFlags::empty());
}

/// `()` empty tuple, `(a)` grouping, `(a, b)` tuple. Inside the parentheses
/// newlines are plain whitespace and range colons are re-enabled.
fn parse_paren(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    ps.bump(SyntaxFlags::TRIVIA);

    let mut inner = ps
        .derive()
        .with_whitespace_newline(true)
        .with_range_colon_enabled(true)
        .with_space_sensitive(false)
        .with_where_enabled(true)
        .with_for_generator(false);

    let mut count = 0usize;
    let mut trailing_comma = false;
    if inner.peek(1) == SyntaxKind::R_PAREN {
        inner.bump(SyntaxFlags::TRIVIA);
    } else {
        loop {
            parse_eq_star(&mut inner);
            count += 1;
            match inner.peek(1) {
                SyntaxKind::COMMA => {
                    inner.bump(SyntaxFlags::TRIVIA);
                    if inner.peek(1) == SyntaxKind::R_PAREN {
                        trailing_comma = true;
                        inner.bump(SyntaxFlags::TRIVIA);
                        break;
                    }
                }
                SyntaxKind::R_PAREN => {
                    inner.bump(SyntaxFlags::TRIVIA);
                    break;
                }
                SyntaxKind::END_MARKER => {
                    inner.emit_diagnostic("missing closing `)`");
                    break;
                }
                _ => {
                    inner.bump_error("missing comma or `)` in parentheses");
                }
            }
        }
    }

    let kind = if count == 1 && !trailing_comma {
        SyntaxKind::PARENS
    } else {
        SyntaxKind::TUPLE
    };
    ps.emit(mark, kind, SyntaxFlags::empty());
}

/// The interior of `[...]` and `{...}`. The bracket context enables range
/// colons, space-sensitive rows, `where`, and generators, and makes
/// newlines significant as row separators. Whether `end` is an index
/// identifier is inherited from the surrounding context.
pub(super) fn parse_cat(ps: &mut ParseState<'_>, closer: SyntaxKind) {
    let (empty_kind, list_kind, cat_kind) = if closer == SyntaxKind::R_CURLY {
        (
            SyntaxKind::BRACES,
            SyntaxKind::BRACES,
            SyntaxKind::BRACES_CAT,
        )
    } else {
        (SyntaxKind::VECT, SyntaxKind::VECT, SyntaxKind::VCAT)
    };

    let mark = ps.position();
    ps.bump(SyntaxFlags::TRIVIA);

    let mut inner = ps
        .derive()
        .with_range_colon_enabled(true)
        .with_space_sensitive(true)
        .with_where_enabled(true)
        .with_whitespace_newline(false)
        .with_for_generator(true);

    while inner.peek(1) == SyntaxKind::NEWLINE_WS {
        inner.bump(SyntaxFlags::TRIVIA);
    }
    if inner.peek(1) == closer {
        inner.bump(SyntaxFlags::TRIVIA);
        ps.emit(mark, empty_kind, SyntaxFlags::empty());
        return;
    }

    let list_mark = inner.position();
    parse_eq_star(&mut inner);

    match inner.peek(1) {
        // `[x for x = xs]`: the generator takes over the whole bracket.
        SyntaxKind::FOR_KW if inner.for_generator() => {
            inner.bump(SyntaxFlags::TRIVIA);
            parse_eq_star(&mut inner);
            inner.emit(list_mark, SyntaxKind::GENERATOR, SyntaxFlags::empty());
            expect_closer(&mut inner, closer);
            ps.emit(mark, SyntaxKind::COMPREHENSION, SyntaxFlags::empty());
        }
        SyntaxKind::COMMA => {
            parse_vector_tail(&mut inner, closer);
            ps.emit(mark, list_kind, SyntaxFlags::empty());
        }
        _ => {
            let multi_row = parse_matrix_tail(&mut inner, closer, list_mark);
            let kind = if multi_row { cat_kind } else { list_kind };
            ps.emit(mark, kind, SyntaxFlags::empty());
        }
    }
}

/// Remaining elements of a comma-separated collection, through the closer.
fn parse_vector_tail(ps: &mut ParseState<'_>, closer: SyntaxKind) {
    while ps.peek(1) == SyntaxKind::COMMA {
        ps.bump(SyntaxFlags::TRIVIA);
        while ps.peek(1) == SyntaxKind::NEWLINE_WS {
            ps.bump(SyntaxFlags::TRIVIA);
        }
        if ps.peek(1) == closer || ps.peek(1) == SyntaxKind::END_MARKER {
            break;
        }
        parse_eq_star(ps);
    }
    expect_closer(ps, closer);
}

/// Rows of space-separated elements, separated by `;` or newlines. Returns
/// true when the collection had row structure (any separator or a row of
/// more than one element), distinguishing `[a b; c d]` from plain `[a]`.
fn parse_matrix_tail(
    ps: &mut ParseState<'_>,
    closer: SyntaxKind,
    list_mark: StreamPosition,
) -> bool {
    let mut row_mark = list_mark;
    let mut row_len = 1usize;
    let mut rows = 0usize;
    let mut had_row_node = false;

    loop {
        let kind = ps.peek(1);
        if kind == closer || kind == SyntaxKind::END_MARKER {
            break;
        }
        match kind {
            SyntaxKind::SEMI => {
                had_row_node |= finish_row(ps, row_mark, row_len, &mut rows);
                let separator = ps.bump(SyntaxFlags::empty());
                while ps.peek(1) == SyntaxKind::NEWLINE_WS {
                    ps.bump(SyntaxFlags::TRIVIA);
                }
                if ps.peek(1) == closer {
                    // A separator with no row after it carries no structure.
                    ps.reset_token(separator, None, Some(SyntaxFlags::TRIVIA));
                }
                row_mark = ps.position();
                row_len = 0;
            }
            SyntaxKind::NEWLINE_WS => {
                had_row_node |= finish_row(ps, row_mark, row_len, &mut rows);
                ps.bump(SyntaxFlags::TRIVIA);
                row_mark = ps.position();
                row_len = 0;
            }
            kind if is_closing_token(ps, kind) => {
                ps.bump_error(&format!("unexpected `{kind}` inside a collection literal"));
            }
            _ => {
                parse_eq_star(ps);
                row_len += 1;
            }
        }
    }

    let had_row_node = had_row_node | finish_row(ps, row_mark, row_len, &mut rows);
    expect_closer(ps, closer);
    rows > 1 || had_row_node
}

/// Close off the current row: a row of several elements becomes a row node.
/// Returns true when a row node was emitted; empty runs (trailing
/// separators) do not count as rows at all.
fn finish_row(
    ps: &mut ParseState<'_>,
    row_mark: StreamPosition,
    row_len: usize,
    rows: &mut usize,
) -> bool {
    if row_len > 0 {
        *rows += 1;
    }
    if row_len > 1 {
        ps.emit(row_mark, SyntaxKind::ROW, SyntaxFlags::empty());
        return true;
    }
    false
}

fn expect_closer(ps: &mut ParseState<'_>, closer: SyntaxKind) {
    if ps.peek(1) == closer {
        ps.bump(SyntaxFlags::TRIVIA);
    } else {
        ps.emit_diagnostic(&format!("missing closing `{closer}`"));
    }
}
