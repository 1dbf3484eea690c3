use test_case::test_case;

use harness::{expect_sexpr, parse_checked, parse_clean};

mod harness;

#[test]
fn assignment_right_associates() {
    expect_sexpr("a = b = c", "(TOPLEVEL (EQ a (EQ b c)))");
}

#[test]
fn tilde_parses_as_a_call_not_an_assignment() {
    expect_sexpr("a ~ b", "(TOPLEVEL (CALL a ~ b))");
    // It still sits at assignment precedence and right-associates.
    expect_sexpr("a ~ b ~ c", "(TOPLEVEL (CALL a ~ (CALL b ~ c)))");
}

#[test_case("a += 1", "(TOPLEVEL (PLUS_EQ a 1))"; "plus_eq")]
#[test_case("a -= 1", "(TOPLEVEL (MINUS_EQ a 1))"; "minus_eq")]
#[test_case("a *= 2", "(TOPLEVEL (STAR_EQ a 2))"; "star_eq")]
#[test_case("a /= 2", "(TOPLEVEL (SLASH_EQ a 2))"; "slash_eq")]
fn compound_assignment_nodes_carry_the_operator_kind(source: &str, expected: &str) {
    expect_sexpr(source, expected);
}

#[test]
fn comma_makes_tuples_below_assignment() {
    expect_sexpr("a, b", "(TOPLEVEL (TUPLE a b))");
    expect_sexpr("a, b = c, d", "(TOPLEVEL (EQ (TUPLE a b) (TUPLE c d)))");
}

#[test]
fn ternary_disables_the_range_colon_between_its_branches() {
    expect_sexpr("a ? b : c", "(TOPLEVEL (TERNARY a b c))");
    // Outside the guarded then-branch the colon forms ranges again.
    expect_sexpr("a ? b : c : d", "(TOPLEVEL (TERNARY a b (CALL c : d)))");
}

#[test]
fn ternary_missing_colon_recovers() {
    let result = parse_checked("a ? b");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].message(), "expected `:` in `?` expression");
}

#[test]
fn ranges_fold_flat() {
    expect_sexpr("1:10", "(TOPLEVEL (CALL 1 : 10))");
    expect_sexpr("1:2:10", "(TOPLEVEL (CALL 1 : 2 : 10))");
}

#[test]
fn range_missing_last_argument() {
    let result = parse_checked("1:");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(
        result.diagnostics[0].message(),
        "missing last argument in range expression"
    );
}

#[test]
fn arithmetic_precedence_and_associativity() {
    expect_sexpr("a + b * c", "(TOPLEVEL (CALL a + (CALL b * c)))");
    expect_sexpr("a - b - c", "(TOPLEVEL (CALL (CALL a - b) - c))");
    expect_sexpr("a < b + c", "(TOPLEVEL (CALL a < (CALL b + c)))");
}

#[test]
fn power_right_associates_and_binds_inside_unary() {
    expect_sexpr("2^3^4", "(TOPLEVEL (CALL 2 ^ (CALL 3 ^ 4)))");
    expect_sexpr("-x^2", "(TOPLEVEL (CALL - (CALL x ^ 2)))");
    expect_sexpr("2^-3", "(TOPLEVEL (CALL 2 ^ (CALL - 3)))");
}

#[test]
fn unary_operators() {
    expect_sexpr("-x", "(TOPLEVEL (CALL - x))");
    expect_sexpr("!ok", "(TOPLEVEL (CALL ! ok))");
    expect_sexpr("- -x", "(TOPLEVEL (CALL - (CALL - x)))");
}

#[test]
fn bare_operator_in_closing_position_is_an_atom() {
    expect_sexpr("(-)", "(TOPLEVEL (PARENS -))");
}

#[test]
fn numeric_juxtaposition_inserts_an_invisible_star() {
    expect_sexpr("2x", "(TOPLEVEL (CALL 2 <STAR> x))");
    expect_sexpr("3(a)", "(TOPLEVEL (CALL 3 <STAR> (PARENS a)))");
    // Unary binds outside the juxtaposition, powers inside it.
    expect_sexpr("-2x", "(TOPLEVEL (CALL - (CALL 2 <STAR> x)))");
    expect_sexpr("2x^2", "(TOPLEVEL (CALL 2 <STAR> (CALL x ^ 2)))");
    // Whitespace defeats juxtaposition.
    let result = parse_checked("2 x");
    assert!(!result.diagnostics.is_empty());
}

#[test]
fn where_clauses_left_associate() {
    expect_sexpr("a where T", "(TOPLEVEL (WHERE a T))");
    expect_sexpr("a where T where U", "(TOPLEVEL (WHERE (WHERE a T) U))");
}

#[test]
fn calls_and_indexing() {
    expect_sexpr("f(x, y)", "(TOPLEVEL (CALL f x y))");
    expect_sexpr("f()", "(TOPLEVEL (CALL f))");
    expect_sexpr("a[i]", "(TOPLEVEL (REF a i))");
    expect_sexpr("f(x)[i]", "(TOPLEVEL (REF (CALL f x) i))");
}

#[test]
fn end_is_an_identifier_inside_indexing_only() {
    expect_sexpr("a[end]", "(TOPLEVEL (REF a end))");
    expect_sexpr("a[1, end]", "(TOPLEVEL (REF a 1 end))");

    let result = parse_checked("end");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].message(), "unexpected `end`");
}

#[test]
fn field_access_chains() {
    expect_sexpr("a.b", "(TOPLEVEL (FIELD a b))");
    expect_sexpr("a.b.c", "(TOPLEVEL (FIELD (FIELD a b) c))");
}

#[test]
fn dotted_operators_parse_like_their_plain_forms() {
    expect_sexpr("a .+ b", "(TOPLEVEL (CALL a .+ b))");
    expect_sexpr("a .+= b", "(TOPLEVEL (PLUS_EQ a b))");
}

#[test]
fn expressions_continue_after_an_operator_at_end_of_line() {
    expect_sexpr("a +\nb", "(TOPLEVEL (CALL a + b))");
    expect_sexpr("x =\n  y", "(TOPLEVEL (EQ x y))");
}

#[test]
fn newlines_are_plain_whitespace_inside_parentheses() {
    expect_sexpr("(a,\n b)", "(TOPLEVEL (TUPLE a b))");
    expect_sexpr("(a\n + b)", "(TOPLEVEL (PARENS (CALL a + b)))");
}

#[test]
fn suffixed_operators_keep_their_flag() {
    let result = parse_clean("a +\u{2032} b");
    assert_eq!(harness::sexpr(&result), "(TOPLEVEL (CALL a +\u{2032} b))");
}
