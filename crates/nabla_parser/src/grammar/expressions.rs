use nabla_syntax::{SyntaxFlags, SyntaxKind};

use super::{atoms, is_closing_token};
use crate::state::ParseState;

/// Full expression including assignment and comma tuples. This is the entry
/// for statements.
pub(super) fn parse_eq(ps: &mut ParseState<'_>) {
    parse_assignment(ps, parse_comma);
}

/// Expression at assignment precedence but without comma tuples; used for
/// list elements, conditions, and argument positions where `,` separates.
pub(super) fn parse_eq_star(ps: &mut ParseState<'_>) {
    parse_assignment(ps, parse_cond);
}

/// Right-associative assignment. `~` shares the precedence level but is not
/// syntactic assignment: it parses into a call node with the operator as a
/// child. Real assignment operators become a node tagged with the operator's
/// own kind, with the operator token recorded as trivia.
fn parse_assignment(ps: &mut ParseState<'_>, down: fn(&mut ParseState<'_>)) {
    let mark = ps.position();
    down(ps);
    let token = ps.peek_token(1);
    let kind = token.kind();
    if kind == SyntaxKind::TILDE {
        // `~` can also be unary, so in space-sensitive mode `[a ~b]` starts
        // a new element instead of continuing this one.
        if ps.space_sensitive()
            && token.preceding_whitespace()
            && !ps.peek_token(2).preceding_whitespace()
        {
            return;
        }
        ps.bump(SyntaxFlags::empty());
        eat_newlines(ps);
        parse_assignment(ps, down);
        ps.emit(mark, SyntaxKind::CALL, SyntaxFlags::empty());
    } else if kind.is_assignment_op() {
        ps.bump(SyntaxFlags::TRIVIA);
        eat_newlines(ps);
        parse_assignment(ps, down);
        ps.emit(mark, kind, SyntaxFlags::empty());
    }
}

/// Comma-separated expressions fold into a tuple; a single expression passes
/// through unwrapped. A trailing comma still forms a tuple.
fn parse_comma(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    parse_cond(ps);
    if ps.peek(1) != SyntaxKind::COMMA {
        return;
    }
    while ps.peek(1) == SyntaxKind::COMMA {
        ps.bump(SyntaxFlags::TRIVIA);
        eat_newlines(ps);
        let next = ps.peek(1);
        if is_closing_token(ps, next) {
            break;
        }
        parse_cond(ps);
    }
    ps.emit(mark, SyntaxKind::TUPLE, SyntaxFlags::empty());
}

/// Ternary `a ? b : c`. The colon that separates the branches would be
/// ambiguous with a range colon, so the then-branch parses with ranges
/// disabled. Branches right-associate.
fn parse_cond(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    parse_comparison(ps);
    if ps.peek(1) != SyntaxKind::QUESTION {
        return;
    }
    ps.bump(SyntaxFlags::TRIVIA);
    eat_newlines(ps);
    parse_eq_star(&mut ps.derive().with_range_colon_enabled(false));
    if ps.peek(1) == SyntaxKind::COLON {
        ps.bump(SyntaxFlags::TRIVIA);
        eat_newlines(ps);
        parse_eq_star(ps);
    } else {
        ps.emit_diagnostic("expected `:` in `?` expression");
    }
    ps.emit(mark, SyntaxKind::TERNARY, SyntaxFlags::empty());
}

fn parse_comparison(ps: &mut ParseState<'_>) {
    parse_ltor(ps, parse_range, |kind| kind.is_comparison_op());
}

/// `a:b` and `a:b:c` ranges, folded flat into one call on the `:` operator.
/// Only active when the context allows range colons; inside a ternary the
/// colon belongs to the `?` expression instead.
fn parse_range(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    parse_add(ps);
    if !ps.range_colon_enabled() || ps.peek(1) != SyntaxKind::COLON {
        return;
    }
    while ps.peek(1) == SyntaxKind::COLON {
        ps.bump(SyntaxFlags::empty());
        let next = ps.peek_token(1);
        if next.kind() == SyntaxKind::NEWLINE_WS || is_closing_token(ps, next.kind()) {
            ps.emit_diagnostic("missing last argument in range expression");
            break;
        }
        parse_add(ps);
    }
    ps.emit(mark, SyntaxKind::CALL, SyntaxFlags::empty());
}

fn parse_add(ps: &mut ParseState<'_>) {
    parse_ltor(ps, parse_mul, |kind| kind.is_add_op());
}

fn parse_mul(ps: &mut ParseState<'_>) {
    parse_ltor(ps, parse_unary, |kind| kind.is_mul_op());
}

/// Left-associative binary operator chain. In space-sensitive mode (matrix
/// rows), an operator that could also be unary and has whitespace before it
/// but none after it does not continue the chain: it starts a new element,
/// so `[a -b]` is two elements while `[a - b]` is one subtraction.
fn parse_ltor(
    ps: &mut ParseState<'_>,
    down: fn(&mut ParseState<'_>),
    is_op: impl Fn(SyntaxKind) -> bool,
) {
    let mark = ps.position();
    down(ps);
    loop {
        let token = ps.peek_token(1);
        if !is_op(token.kind()) {
            break;
        }
        if ps.space_sensitive()
            && token.kind().is_unary_op()
            && token.preceding_whitespace()
            && !ps.peek_token(2).preceding_whitespace()
        {
            break;
        }
        ps.bump(SyntaxFlags::empty());
        eat_newlines(ps);
        down(ps);
        ps.emit(mark, SyntaxKind::CALL, SyntaxFlags::empty());
    }
}

/// A numeric literal directly followed by an identifier or an open paren is
/// implicit multiplication: `2x` parses as a call with an invisible `*`.
fn parse_juxtapose(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    parse_power(ps);
    loop {
        let token = ps.peek_token(1);
        let juxtaposed = matches!(token.kind(), SyntaxKind::IDENTIFIER | SyntaxKind::L_PAREN)
            && !token.preceding_whitespace()
            && ps
                .last_span_kind()
                .is_some_and(|kind| kind.is_number_literal());
        if !juxtaposed {
            break;
        }
        ps.bump_invisible(SyntaxKind::STAR, SyntaxFlags::empty());
        parse_power(ps);
        ps.emit(mark, SyntaxKind::CALL, SyntaxFlags::empty());
    }
}

/// Prefix `+ - ! ~`. A bare operator directly in front of a closing token is
/// itself the atom, so `(-)` names the operator.
fn parse_unary(ps: &mut ParseState<'_>) {
    let token = ps.peek_token(1);
    if !token.kind().is_unary_op() {
        return parse_juxtapose(ps);
    }
    let next = ps.peek_token(2);
    if is_closing_token(ps, next.kind()) || next.kind() == SyntaxKind::NEWLINE_WS {
        ps.bump(SyntaxFlags::empty());
        return;
    }
    let mark = ps.position();
    ps.bump(SyntaxFlags::empty());
    parse_unary(ps);
    ps.emit(mark, SyntaxKind::CALL, SyntaxFlags::empty());
}

/// Right-associative `^`. The exponent re-enters unary so `2^-3` works and
/// `2^3^4` nests to the right.
fn parse_power(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    parse_where(ps);
    if ps.peek(1) != SyntaxKind::CARET {
        return;
    }
    ps.bump(SyntaxFlags::empty());
    eat_newlines(ps);
    parse_unary(ps);
    ps.emit(mark, SyntaxKind::CALL, SyntaxFlags::empty());
}

/// `expr where T`, left-associative, only when the context has `where`
/// enabled.
fn parse_where(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    parse_call(ps);
    if !ps.where_enabled() {
        return;
    }
    while ps.peek(1) == SyntaxKind::WHERE_KW {
        ps.bump(SyntaxFlags::TRIVIA);
        eat_newlines(ps);
        parse_call(ps);
        ps.emit(mark, SyntaxKind::WHERE, SyntaxFlags::empty());
    }
}

/// Call, indexing, and field-access trailers. Indexing switches `end` into
/// its identifier role for the duration of the brackets, so `a[end]` refers
/// to the last index while the surrounding block's `end` is unaffected.
fn parse_call(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    atoms::parse_atom(ps, true);
    loop {
        let token = ps.peek_token(1);
        match token.kind() {
            SyntaxKind::L_PAREN if !token.preceding_whitespace() => {
                ps.bump(SyntaxFlags::TRIVIA);
                parse_call_args(&mut call_args_context(ps, false), SyntaxKind::R_PAREN);
                ps.emit(mark, SyntaxKind::CALL, SyntaxFlags::empty());
            }
            SyntaxKind::L_SQUARE if !token.preceding_whitespace() => {
                ps.bump(SyntaxFlags::TRIVIA);
                parse_call_args(&mut call_args_context(ps, true), SyntaxKind::R_SQUARE);
                ps.emit(mark, SyntaxKind::REF, SyntaxFlags::empty());
            }
            SyntaxKind::DOT => {
                ps.bump(SyntaxFlags::TRIVIA);
                match ps.peek(1) {
                    SyntaxKind::IDENTIFIER | SyntaxKind::VAR_IDENTIFIER => {
                        ps.bump(SyntaxFlags::empty());
                    }
                    _ => ps.emit_diagnostic("expected a field name after `.`"),
                }
                ps.emit(mark, SyntaxKind::FIELD, SyntaxFlags::empty());
            }
            _ => break,
        }
    }
}

fn call_args_context<'a>(ps: &'a mut ParseState<'_>, end_symbol: bool) -> ParseState<'a> {
    ps.derive()
        .with_whitespace_newline(true)
        .with_range_colon_enabled(true)
        .with_space_sensitive(false)
        .with_where_enabled(true)
        .with_for_generator(false)
        .with_end_symbol(end_symbol)
}

/// Comma-separated argument list up to and including `closer`. The closer
/// and the separating commas are recorded as trivia of the call node.
fn parse_call_args(ps: &mut ParseState<'_>, closer: SyntaxKind) {
    if ps.peek(1) == closer {
        ps.bump(SyntaxFlags::TRIVIA);
        return;
    }
    loop {
        parse_eq_star(ps);
        let kind = ps.peek(1);
        if kind == SyntaxKind::COMMA {
            ps.bump(SyntaxFlags::TRIVIA);
            if ps.peek(1) == closer {
                ps.bump(SyntaxFlags::TRIVIA);
                return;
            }
            continue;
        }
        if kind == closer {
            ps.bump(SyntaxFlags::TRIVIA);
            return;
        }
        if kind == SyntaxKind::END_MARKER {
            ps.emit_diagnostic(&format!("missing closing `{closer}` in argument list"));
            return;
        }
        ps.bump_error(&format!("missing comma or `{closer}` in argument list"));
    }
}

/// Skip newlines after an infix operator so expressions may continue on the
/// next line. In contexts where newlines are already plain whitespace this
/// is a no-op.
fn eat_newlines(ps: &mut ParseState<'_>) {
    while ps.peek(1) == SyntaxKind::NEWLINE_WS {
        ps.bump(SyntaxFlags::TRIVIA);
    }
}
