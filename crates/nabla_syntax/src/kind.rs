use std::fmt;

/// A single flat enumeration identifying both terminal token categories and
/// non-terminal node kinds. The tree is homogeneous over this enum: spans
/// emitted for tokens and spans emitted for interior nodes carry the same
/// head type, and assignment nodes reuse their operator's kind directly.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // Tokens
    #[default]
    TOMBSTONE = 0, // An emptied invisible token, skipped by the tree builder.
    END_MARKER, // The end of the input text. Produced exactly once.
    ERROR,      // A lexically or syntactically invalid region.
    // Trivia
    WHITESPACE, // Spaces and tabs containing no newline.
    NEWLINE_WS, // A newline run plus any whitespace continuing it.
    COMMENT,    // `# ...` line comments and nested `#= ... =#` block comments.
    // Identifiers and literals
    IDENTIFIER,
    VAR_IDENTIFIER, // `var"..."` escaped identifier.
    MACRO_NAME,     // Implicit macro name; always zero-width.
    INTEGER,
    FLOAT,
    STRING,
    CHAR,
    CMD_STRING, // A backtick-delimited command literal.
    // Keywords
    BEGIN_KW,
    END_KW,
    IF_KW,
    ELSEIF_KW,
    ELSE_KW,
    FOR_KW,
    WHILE_KW,
    TRY_KW,
    CATCH_KW,
    FINALLY_KW,
    WHERE_KW,
    TRUE_KW,
    FALSE_KW,
    // Punctuation
    L_PAREN,  // (
    R_PAREN,  // )
    L_SQUARE, // [
    R_SQUARE, // ]
    L_CURLY,  // {
    R_CURLY,  // }
    COMMA,    // ,
    SEMI,     // ;
    DOT,      // .
    // Operators
    EQ,         // =
    PLUS_EQ,    // +=
    MINUS_EQ,   // -=
    STAR_EQ,    // *=
    SLASH_EQ,   // /=
    TILDE,      // ~
    QUESTION,   // ?
    COLON,      // :
    EQ_EQ,      // ==
    NOT_EQ,     // !=
    LESS,       // <
    LESS_EQ,    // <=
    GREATER,    // >
    GREATER_EQ, // >=
    PLUS,       // +
    MINUS,      // -
    STAR,       // *
    SLASH,      // /
    PERCENT,    // %
    CARET,      // ^
    BANG,       // !

    // Nodes:
    //
    // All token kinds are placed _above_ this point and all node kinds below
    // it, with one deliberate exception: assignment nodes are tagged with the
    // kind of their assignment operator token.
    TOPLEVEL,
    BLOCK,
    QUOTE,
    CALL,
    REF,
    FIELD,
    MACRO_CALL,
    TUPLE,
    PARENS,
    VECT,
    ROW,
    VCAT,
    BRACES,
    BRACES_CAT,
    COMPREHENSION,
    GENERATOR,
    TERNARY,
    WHERE,
    IF,
    ELSE_IF,
    WHILE,
    FOR,
    TRY,
}

impl SyntaxKind {
    pub const fn is_trivia(&self) -> bool {
        matches!(
            self,
            SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE_WS | SyntaxKind::COMMENT
        )
    }

    pub const fn is_keyword(&self) -> bool {
        (*self as u16) >= (SyntaxKind::BEGIN_KW as u16)
            && (*self as u16) <= (SyntaxKind::FALSE_KW as u16)
    }

    pub const fn is_operator(&self) -> bool {
        (*self as u16) >= (SyntaxKind::EQ as u16) && (*self as u16) <= (SyntaxKind::BANG as u16)
    }

    /// Operators that sit at assignment precedence and produce an assignment
    /// node tagged with the operator kind. `~` shares the precedence level
    /// but is not included here because it parses as a call instead.
    pub const fn is_assignment_op(&self) -> bool {
        matches!(
            self,
            SyntaxKind::EQ
                | SyntaxKind::PLUS_EQ
                | SyntaxKind::MINUS_EQ
                | SyntaxKind::STAR_EQ
                | SyntaxKind::SLASH_EQ
        )
    }

    pub const fn is_comparison_op(&self) -> bool {
        matches!(
            self,
            SyntaxKind::EQ_EQ
                | SyntaxKind::NOT_EQ
                | SyntaxKind::LESS
                | SyntaxKind::LESS_EQ
                | SyntaxKind::GREATER
                | SyntaxKind::GREATER_EQ
        )
    }

    pub const fn is_add_op(&self) -> bool {
        matches!(self, SyntaxKind::PLUS | SyntaxKind::MINUS)
    }

    pub const fn is_mul_op(&self) -> bool {
        matches!(self, SyntaxKind::STAR | SyntaxKind::SLASH | SyntaxKind::PERCENT)
    }

    pub const fn is_unary_op(&self) -> bool {
        matches!(
            self,
            SyntaxKind::PLUS | SyntaxKind::MINUS | SyntaxKind::BANG | SyntaxKind::TILDE
        )
    }

    pub const fn is_number_literal(&self) -> bool {
        matches!(self, SyntaxKind::INTEGER | SyntaxKind::FLOAT)
    }

    pub const fn is_literal(&self) -> bool {
        (*self as u16) >= (SyntaxKind::INTEGER as u16)
            && (*self as u16) <= (SyntaxKind::CMD_STRING as u16)
            || matches!(self, SyntaxKind::TRUE_KW | SyntaxKind::FALSE_KW)
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, SyntaxKind::ERROR)
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SyntaxKind::TOMBSTONE => "<tombstone>",
            SyntaxKind::END_MARKER => "end of input",
            SyntaxKind::ERROR => "invalid token",
            SyntaxKind::WHITESPACE => "whitespace",
            SyntaxKind::NEWLINE_WS => "newline",
            SyntaxKind::COMMENT => "comment",
            SyntaxKind::IDENTIFIER => "identifier",
            SyntaxKind::VAR_IDENTIFIER => "var\"...\" identifier",
            SyntaxKind::MACRO_NAME => "macro name",
            SyntaxKind::INTEGER => "integer literal",
            SyntaxKind::FLOAT => "float literal",
            SyntaxKind::STRING => "string literal",
            SyntaxKind::CHAR => "character literal",
            SyntaxKind::CMD_STRING => "command literal",
            SyntaxKind::BEGIN_KW => "begin",
            SyntaxKind::END_KW => "end",
            SyntaxKind::IF_KW => "if",
            SyntaxKind::ELSEIF_KW => "elseif",
            SyntaxKind::ELSE_KW => "else",
            SyntaxKind::FOR_KW => "for",
            SyntaxKind::WHILE_KW => "while",
            SyntaxKind::TRY_KW => "try",
            SyntaxKind::CATCH_KW => "catch",
            SyntaxKind::FINALLY_KW => "finally",
            SyntaxKind::WHERE_KW => "where",
            SyntaxKind::TRUE_KW => "true",
            SyntaxKind::FALSE_KW => "false",
            SyntaxKind::L_PAREN => "(",
            SyntaxKind::R_PAREN => ")",
            SyntaxKind::L_SQUARE => "[",
            SyntaxKind::R_SQUARE => "]",
            SyntaxKind::L_CURLY => "{",
            SyntaxKind::R_CURLY => "}",
            SyntaxKind::COMMA => ",",
            SyntaxKind::SEMI => ";",
            SyntaxKind::DOT => ".",
            SyntaxKind::EQ => "=",
            SyntaxKind::PLUS_EQ => "+=",
            SyntaxKind::MINUS_EQ => "-=",
            SyntaxKind::STAR_EQ => "*=",
            SyntaxKind::SLASH_EQ => "/=",
            SyntaxKind::TILDE => "~",
            SyntaxKind::QUESTION => "?",
            SyntaxKind::COLON => ":",
            SyntaxKind::EQ_EQ => "==",
            SyntaxKind::NOT_EQ => "!=",
            SyntaxKind::LESS => "<",
            SyntaxKind::LESS_EQ => "<=",
            SyntaxKind::GREATER => ">",
            SyntaxKind::GREATER_EQ => ">=",
            SyntaxKind::PLUS => "+",
            SyntaxKind::MINUS => "-",
            SyntaxKind::STAR => "*",
            SyntaxKind::SLASH => "/",
            SyntaxKind::PERCENT => "%",
            SyntaxKind::CARET => "^",
            SyntaxKind::BANG => "!",
            SyntaxKind::TOPLEVEL => "top level",
            SyntaxKind::BLOCK => "block",
            SyntaxKind::QUOTE => "quote",
            SyntaxKind::CALL => "call",
            SyntaxKind::REF => "indexing",
            SyntaxKind::FIELD => "field access",
            SyntaxKind::MACRO_CALL => "macro call",
            SyntaxKind::TUPLE => "tuple",
            SyntaxKind::PARENS => "parenthesized expression",
            SyntaxKind::VECT => "vector literal",
            SyntaxKind::ROW => "matrix row",
            SyntaxKind::VCAT => "matrix literal",
            SyntaxKind::BRACES => "braces literal",
            SyntaxKind::BRACES_CAT => "braces matrix",
            SyntaxKind::COMPREHENSION => "comprehension",
            SyntaxKind::GENERATOR => "generator",
            SyntaxKind::TERNARY => "ternary expression",
            SyntaxKind::WHERE => "where expression",
            SyntaxKind::IF => "if expression",
            SyntaxKind::ELSE_IF => "elseif clause",
            SyntaxKind::WHILE => "while loop",
            SyntaxKind::FOR => "for loop",
            SyntaxKind::TRY => "try expression",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::SyntaxKind;

    #[test]
    fn keyword_range_is_contiguous() {
        assert!(SyntaxKind::BEGIN_KW.is_keyword());
        assert!(SyntaxKind::FALSE_KW.is_keyword());
        assert!(SyntaxKind::WHERE_KW.is_keyword());
        assert!(!SyntaxKind::IDENTIFIER.is_keyword());
        assert!(!SyntaxKind::L_PAREN.is_keyword());
    }

    #[test]
    fn trivia_kinds() {
        assert!(SyntaxKind::WHITESPACE.is_trivia());
        assert!(SyntaxKind::NEWLINE_WS.is_trivia());
        assert!(SyntaxKind::COMMENT.is_trivia());
        assert!(!SyntaxKind::END_MARKER.is_trivia());
    }

    #[test]
    fn tilde_is_not_an_assignment_op() {
        assert!(SyntaxKind::EQ.is_assignment_op());
        assert!(SyntaxKind::PLUS_EQ.is_assignment_op());
        assert!(!SyntaxKind::TILDE.is_assignment_op());
        assert!(SyntaxKind::TILDE.is_unary_op());
    }
}
