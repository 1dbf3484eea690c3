use nabla_parser::{parse, GreenElement, ParseResult, SyntaxKind};

/// Parse and verify the structural invariants that must hold for every
/// input: the tree covers the source exactly, trivia stays trivia, and all
/// diagnostics point into the source.
#[allow(unused)]
pub fn parse_checked(source: &str) -> ParseResult {
    let result = parse(source);
    assert_eq!(
        result.tree.width() as usize,
        source.len(),
        "tree must cover the whole source"
    );
    assert_eq!(
        result.source_text(),
        source,
        "leaf concatenation must reproduce the source"
    );
    check_trivia_flags(&result.tree);
    for diagnostic in &result.diagnostics {
        assert!(
            diagnostic.span().end <= source.len(),
            "diagnostic {diagnostic:?} points outside the source"
        );
    }
    result
}

/// Parse and assert that the input produced no diagnostics at all.
#[allow(unused)]
pub fn parse_clean(source: &str) -> ParseResult {
    let result = parse_checked(source);
    assert!(
        result.diagnostics.is_empty(),
        "expected a clean parse of {source:?}, got {:?}",
        result.diagnostics
    );
    result
}

fn check_trivia_flags(element: &GreenElement) {
    if element.kind().is_trivia() {
        assert!(
            element.flags().is_trivia(),
            "trivia kind {:?} must carry the trivia flag",
            element.kind()
        );
    }
    if let Some(node) = element.as_node() {
        for child in node.children() {
            check_trivia_flags(child);
        }
    }
}

/// Renders the structurally meaningful part of the tree as an
/// s-expression: trivia leaves are dropped, other leaves print their source
/// text, zero-width (invisible) leaves print as `<KIND>`.
#[allow(unused)]
pub fn sexpr(result: &ParseResult) -> String {
    let mut out = String::new();
    let mut offset = 0usize;
    write_sexpr(&result.tree, &result.source, &mut offset, &mut out);
    out
}

/// Like [`sexpr`], but asserts the parse is clean first.
#[allow(unused)]
pub fn expect_sexpr(source: &str, expected: &str) {
    let result = parse_clean(source);
    assert_eq!(sexpr(&result), expected, "tree shape mismatch for {source:?}");
}

fn write_sexpr(element: &GreenElement, source: &str, offset: &mut usize, out: &mut String) {
    match element {
        GreenElement::Token(token) => {
            let end = *offset + token.width() as usize;
            if token.width() == 0 {
                out.push_str(&format!("<{:?}>", token.kind()));
            } else {
                out.push_str(&source[*offset..end]);
            }
            *offset = end;
        }
        GreenElement::Node(node) => {
            out.push('(');
            out.push_str(&format!("{:?}", node.kind()));
            for child in node.children() {
                if child.is_trivia() {
                    *offset += child.width() as usize;
                    continue;
                }
                out.push(' ');
                write_sexpr(child, source, offset, out);
            }
            out.push(')');
        }
    }
}

/// The non-trivia kinds of the root's children, for shape assertions that
/// do not care about the full tree.
#[allow(unused)]
pub fn toplevel_kinds(result: &ParseResult) -> Vec<SyntaxKind> {
    let node = result
        .tree
        .as_node()
        .expect("the parse result root is always a node");
    assert_eq!(node.kind(), SyntaxKind::TOPLEVEL);
    node.meaningful_children()
        .map(GreenElement::kind)
        .collect()
}
