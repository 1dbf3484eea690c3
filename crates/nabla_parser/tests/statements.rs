use harness::{expect_sexpr, parse_checked, parse_clean, sexpr};

mod harness;

#[test]
fn statements_separate_on_semicolons_and_newlines() {
    expect_sexpr("a; b", "(TOPLEVEL a b)");
    expect_sexpr("a\nb", "(TOPLEVEL a b)");
    expect_sexpr("a;; b\n\nc", "(TOPLEVEL a b c)");
}

#[test]
fn begin_blocks() {
    expect_sexpr("begin\nx\ny\nend", "(TOPLEVEL (BLOCK x y))");
    expect_sexpr("begin end", "(TOPLEVEL (BLOCK))");
    expect_sexpr("x = begin\ny\nend", "(TOPLEVEL (EQ x (BLOCK y)))");
}

#[test]
fn if_chains() {
    expect_sexpr("if c\nx\nend", "(TOPLEVEL (IF c (BLOCK x)))");
    expect_sexpr("if c\nx\nelse\ny\nend", "(TOPLEVEL (IF c (BLOCK x) (BLOCK y)))");
    expect_sexpr(
        "if a\nx\nelseif b\ny\nelse\nz\nend",
        "(TOPLEVEL (IF a (BLOCK x) (ELSE_IF b (BLOCK y) (BLOCK z))))",
    );
}

#[test]
fn while_and_for_loops() {
    expect_sexpr("while x < 3\nstep()\nend", "(TOPLEVEL (WHILE (CALL x < 3) (BLOCK (CALL step))))");
    expect_sexpr("for i = 1:10\nbody(i)\nend", "(TOPLEVEL (FOR (EQ i (CALL 1 : 10)) (BLOCK (CALL body i))))");
}

#[test]
fn try_forms() {
    expect_sexpr("try\nx\ncatch\ny\nend", "(TOPLEVEL (TRY (BLOCK x) (BLOCK y)))");
    expect_sexpr(
        "try\nx\ncatch err\ny\nend",
        "(TOPLEVEL (TRY (BLOCK x) err (BLOCK y)))",
    );
    expect_sexpr(
        "try\nx\nfinally\ncleanup()\nend",
        "(TOPLEVEL (TRY (BLOCK x) (BLOCK (CALL cleanup))))",
    );
    expect_sexpr(
        "try\nx\ncatch e\ny\nfinally\nz\nend",
        "(TOPLEVEL (TRY (BLOCK x) e (BLOCK y) (BLOCK z)))",
    );
}

#[test]
fn missing_end_recovers_with_a_diagnostic() {
    let result = parse_checked("begin\nx");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].message(), "expected `end`");
    assert_eq!(sexpr(&result), "(TOPLEVEL (BLOCK x))");
}

#[test]
fn blocks_nest_and_end_matches_innermost() {
    expect_sexpr(
        "begin\nif c\nx\nend\nend",
        "(TOPLEVEL (BLOCK (IF c (BLOCK x))))",
    );
}

#[test]
fn keyword_forms_are_expressions() {
    expect_sexpr(
        "x = if c\n1\nelse\n2\nend",
        "(TOPLEVEL (EQ x (IF c (BLOCK 1) (BLOCK 2))))",
    );
}

#[test]
fn indexing_inside_a_block_still_sees_end_as_an_index() {
    let result = parse_clean("begin\na[end]\nend");
    assert_eq!(sexpr(&result), "(TOPLEVEL (BLOCK (REF a end)))");
}

#[test]
fn comments_are_preserved_as_trivia() {
    let source = "a = 1  # set a\n#= block\ncomment =#\nb = 2";
    let result = parse_clean(source);
    assert_eq!(sexpr(&result), "(TOPLEVEL (EQ a 1) (EQ b 2))");
    assert_eq!(result.source_text(), source);
}
