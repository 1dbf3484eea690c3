use nabla_syntax::{SyntaxFlags, SyntaxKind};

use super::{expressions::parse_eq_star, normal_context, parse_stmt_list};
use crate::state::ParseState;

pub(super) fn parse_keyword_form(ps: &mut ParseState<'_>) {
    match ps.peek(1) {
        SyntaxKind::BEGIN_KW => parse_begin(ps),
        SyntaxKind::IF_KW => parse_if(ps),
        SyntaxKind::WHILE_KW => parse_while(ps),
        SyntaxKind::FOR_KW => parse_for(ps),
        SyntaxKind::TRY_KW => parse_try(ps),
        other => unreachable!("not a keyword form: {other:?}"),
    }
}

/// `begin stmts end`. The statements become a single block node that also
/// covers the delimiting keywords.
fn parse_begin(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    ps.bump(SyntaxFlags::TRIVIA);
    parse_stmt_list(&mut normal_context(ps));
    expect_end(ps);
    ps.emit(mark, SyntaxKind::BLOCK, SyntaxFlags::empty());
}

/// A statement run emitted as its own block node; used for the bodies of
/// the keyword forms, where the delimiting keywords stay outside the block.
fn block_body(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    parse_stmt_list(&mut normal_context(ps));
    ps.emit(mark, SyntaxKind::BLOCK, SyntaxFlags::empty());
}

fn parse_if(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    ps.bump(SyntaxFlags::TRIVIA);
    parse_if_clauses(ps);
    expect_end(ps);
    ps.emit(mark, SyntaxKind::IF, SyntaxFlags::empty());
}

/// Condition and body, then any `elseif`/`else` continuation. Each `elseif`
/// folds into a nested clause node so the chain right-associates the way it
/// reads.
fn parse_if_clauses(ps: &mut ParseState<'_>) {
    parse_eq_star(&mut normal_context(ps));
    block_body(ps);
    match ps.peek(1) {
        SyntaxKind::ELSEIF_KW => {
            let mark = ps.position();
            ps.bump(SyntaxFlags::TRIVIA);
            parse_if_clauses(ps);
            ps.emit(mark, SyntaxKind::ELSE_IF, SyntaxFlags::empty());
        }
        SyntaxKind::ELSE_KW => {
            ps.bump(SyntaxFlags::TRIVIA);
            block_body(ps);
        }
        _ => {}
    }
}

fn parse_while(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    ps.bump(SyntaxFlags::TRIVIA);
    parse_eq_star(&mut normal_context(ps));
    block_body(ps);
    expect_end(ps);
    ps.emit(mark, SyntaxKind::WHILE, SyntaxFlags::empty());
}

/// `for x = iter body end`. The iteration specification is an
/// assignment-shaped expression.
fn parse_for(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    ps.bump(SyntaxFlags::TRIVIA);
    parse_eq_star(&mut normal_context(ps));
    block_body(ps);
    expect_end(ps);
    ps.emit(mark, SyntaxKind::FOR, SyntaxFlags::empty());
}

/// `try body (catch var? body)? (finally body)? end`.
fn parse_try(ps: &mut ParseState<'_>) {
    let mark = ps.position();
    ps.bump(SyntaxFlags::TRIVIA);
    block_body(ps);
    if ps.peek(1) == SyntaxKind::CATCH_KW {
        ps.bump(SyntaxFlags::TRIVIA);
        let token = ps.peek_token(1);
        if token.kind() == SyntaxKind::IDENTIFIER && !token.preceding_newline() {
            ps.bump(SyntaxFlags::empty());
        }
        block_body(ps);
    }
    if ps.peek(1) == SyntaxKind::FINALLY_KW {
        ps.bump(SyntaxFlags::TRIVIA);
        block_body(ps);
    }
    expect_end(ps);
    ps.emit(mark, SyntaxKind::TRY, SyntaxFlags::empty());
}

fn expect_end(ps: &mut ParseState<'_>) {
    if ps.peek(1) == SyntaxKind::END_KW {
        ps.bump(SyntaxFlags::TRIVIA);
    } else {
        ps.emit_diagnostic("expected `end`");
    }
}
