use arcstr::ArcStr;
use memchr::memchr;
use nabla_syntax::{SyntaxFlags, SyntaxKind, TextSize};
use unicode_xid::UnicodeXID;

/// A token as delivered by the lexer: a kind, a half-open byte span, and the
/// flag bits the lexer can determine on its own (`DOTTED`, `SUFFIXED`, and
/// `ERROR` for invalid input). The lexer itself never fails; malformed input
/// becomes `ERROR`-kind tokens covering the offending bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawToken {
    kind: SyntaxKind,
    start: TextSize,
    end: TextSize,
    flags: SyntaxFlags,
}

impl RawToken {
    fn new(kind: SyntaxKind, start: TextSize, end: TextSize, flags: SyntaxFlags) -> Self {
        Self {
            kind,
            start,
            end,
            flags,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn start(&self) -> TextSize {
        self.start
    }

    pub fn end(&self) -> TextSize {
        self.end
    }

    pub fn flags(&self) -> SyntaxFlags {
        self.flags
    }
}

/// The operator-name suffix character, e.g. the prime in `+′`.
const SUFFIX_CHAR: char = '\u{2032}';

pub(crate) struct Lexer {
    source: ArcStr,
    /// Current byte offset into the source.
    position: usize,
    /// Set once the end marker has been produced. The lexer must never be
    /// asked for another token after that.
    done: bool,
}

impl Lexer {
    pub(crate) fn new(source: ArcStr) -> Self {
        Self {
            source,
            position: 0,
            done: false,
        }
    }

    /// Lex the next token from the source text. The final token is always
    /// `END_MARKER`, produced exactly once; calling past it is a bug in the
    /// caller.
    pub(crate) fn next_token(&mut self) -> RawToken {
        debug_assert!(!self.done, "lexer polled past the end marker");

        let start = self.position;
        if self.is_eof() {
            self.done = true;
            return self.token(SyntaxKind::END_MARKER, start);
        }

        match self.current() {
            b'\r' | b'\n' => self.consume_newline_ws(start),
            b' ' | b'\t' => self.consume_whitespace(start),
            b'#' => self.consume_comment(start),
            b'"' => self.consume_string(start),
            b'\'' => self.consume_char(start),
            b'`' => self.consume_cmd_string(start),
            b'0'..=b'9' => self.consume_number(start),
            b'(' => self.consume_byte(SyntaxKind::L_PAREN, start),
            b')' => self.consume_byte(SyntaxKind::R_PAREN, start),
            b'[' => self.consume_byte(SyntaxKind::L_SQUARE, start),
            b']' => self.consume_byte(SyntaxKind::R_SQUARE, start),
            b'{' => self.consume_byte(SyntaxKind::L_CURLY, start),
            b'}' => self.consume_byte(SyntaxKind::R_CURLY, start),
            b',' => self.consume_byte(SyntaxKind::COMMA, start),
            b';' => self.consume_byte(SyntaxKind::SEMI, start),
            b'.' => self.consume_dot(start),
            b'=' | b'!' | b'<' | b'>' | b'+' | b'-' | b'*' | b'/' | b'%' | b'^' | b'~' | b'?'
            | b':' => self.consume_operator(start, SyntaxFlags::empty()),
            _ => self.consume_word(start),
        }
    }

    //#region Trivia

    /// Consume a run of newlines together with any whitespace continuing it.
    /// Blank lines collapse into the same token.
    fn consume_newline_ws(&mut self, start: usize) -> RawToken {
        while !self.is_eof() && self.current().is_ascii_whitespace() {
            self.position += 1;
        }
        self.token(SyntaxKind::NEWLINE_WS, start)
    }

    /// Consume contiguous same-line whitespace. If the run reaches a newline
    /// it is upgraded to a newline token instead.
    fn consume_whitespace(&mut self, start: usize) -> RawToken {
        while !self.is_eof() && matches!(self.current(), b' ' | b'\t') {
            self.position += 1;
        }
        if !self.is_eof() && matches!(self.current(), b'\r' | b'\n') {
            return self.consume_newline_ws(start);
        }
        self.token(SyntaxKind::WHITESPACE, start)
    }

    fn consume_comment(&mut self, start: usize) -> RawToken {
        if self.peek_byte(1) == Some(b'=') {
            return self.consume_block_comment(start);
        }
        // Line comment: everything up to (but not including) the newline.
        match memchr(b'\n', self.rest_bytes()) {
            Some(offset) => {
                // Exclude a `\r` directly before the newline.
                let mut end = self.position + offset;
                if end > start && self.source.as_bytes()[end - 1] == b'\r' {
                    end -= 1;
                }
                self.position = end;
            }
            None => self.position = self.source.len(),
        }
        self.token(SyntaxKind::COMMENT, start)
    }

    /// `#= ... =#`, nesting allowed. An unterminated block comment consumes
    /// the rest of the input as an error token.
    fn consume_block_comment(&mut self, start: usize) -> RawToken {
        self.position += 2;
        let mut depth = 1usize;
        while depth > 0 && !self.is_eof() {
            if self.current() == b'#' && self.peek_byte(1) == Some(b'=') {
                depth += 1;
                self.position += 2;
            } else if self.current() == b'=' && self.peek_byte(1) == Some(b'#') {
                depth -= 1;
                self.position += 2;
            } else {
                self.advance_char();
            }
        }
        if depth > 0 {
            return self.error_token(start);
        }
        self.token(SyntaxKind::COMMENT, start)
    }

    //#endregion

    //#region Literals

    fn consume_string(&mut self, start: usize) -> RawToken {
        self.position += 1;
        match self.scan_delimited(b'"') {
            true => self.token(SyntaxKind::STRING, start),
            false => self.error_token(start),
        }
    }

    fn consume_cmd_string(&mut self, start: usize) -> RawToken {
        self.position += 1;
        match self.scan_delimited(b'`') {
            true => self.token(SyntaxKind::CMD_STRING, start),
            false => self.error_token(start),
        }
    }

    fn consume_char(&mut self, start: usize) -> RawToken {
        self.position += 1;
        if self.is_eof() {
            return self.error_token(start);
        }
        if self.current() == b'\\' {
            self.position += 1;
            if !self.is_eof() {
                self.advance_char();
            }
        } else {
            self.advance_char();
        }
        if !self.is_eof() && self.current() == b'\'' {
            self.position += 1;
            return self.token(SyntaxKind::CHAR, start);
        }
        self.error_token(start)
    }

    /// Scan forward to an unescaped closing delimiter, consuming it. Returns
    /// false if the input ends first.
    fn scan_delimited(&mut self, close: u8) -> bool {
        while !self.is_eof() {
            match self.current() {
                b'\\' => {
                    self.position += 1;
                    if !self.is_eof() {
                        self.advance_char();
                    }
                }
                byte if byte == close => {
                    self.position += 1;
                    return true;
                }
                _ => self.advance_char(),
            }
        }
        false
    }

    fn consume_number(&mut self, start: usize) -> RawToken {
        if self.current() == b'0' && matches!(self.peek_byte(1), Some(b'x' | b'X')) {
            self.position += 2;
            self.consume_digit_run(|byte| byte.is_ascii_hexdigit());
            return self.token(SyntaxKind::INTEGER, start);
        }
        if self.current() == b'0' && matches!(self.peek_byte(1), Some(b'b' | b'B')) {
            self.position += 2;
            self.consume_digit_run(|byte| matches!(byte, b'0' | b'1'));
            return self.token(SyntaxKind::INTEGER, start);
        }

        self.consume_digit_run(|byte| byte.is_ascii_digit());
        let mut is_float = false;

        // A decimal point only joins the number when a digit follows, so that
        // ranges like `1:2` and field access never capture the dot.
        if self.current_is(b'.') && self.peek_byte(1).is_some_and(|byte| byte.is_ascii_digit()) {
            self.position += 1;
            self.consume_digit_run(|byte| byte.is_ascii_digit());
            is_float = true;
        }

        if matches!(self.current_byte(), Some(b'e' | b'E')) {
            let mut offset = 1;
            if matches!(self.peek_byte(1), Some(b'+' | b'-')) {
                offset = 2;
            }
            if self
                .peek_byte(offset)
                .is_some_and(|byte| byte.is_ascii_digit())
            {
                self.position += offset;
                self.consume_digit_run(|byte| byte.is_ascii_digit());
                is_float = true;
            }
        }

        let kind = if is_float {
            SyntaxKind::FLOAT
        } else {
            SyntaxKind::INTEGER
        };
        self.token(kind, start)
    }

    fn consume_digit_run(&mut self, accepts: impl Fn(u8) -> bool) {
        while let Some(byte) = self.current_byte() {
            if accepts(byte) || byte == b'_' {
                self.position += 1;
            } else {
                break;
            }
        }
    }

    //#endregion

    //#region Operators

    /// A `.` is either a dotted-operator prefix (`.+`), or a plain dot.
    fn consume_dot(&mut self, start: usize) -> RawToken {
        match self.peek_byte(1) {
            Some(
                b'=' | b'!' | b'<' | b'>' | b'+' | b'-' | b'*' | b'/' | b'%' | b'^' | b'~',
            ) => {
                self.position += 1;
                self.consume_operator(start, SyntaxFlags::DOTTED)
            }
            _ => self.consume_byte(SyntaxKind::DOT, start),
        }
    }

    fn consume_operator(&mut self, start: usize, flags: SyntaxFlags) -> RawToken {
        let followed_by_eq = self.peek_byte(1) == Some(b'=');
        let (kind, len) = match self.current() {
            b'=' if followed_by_eq => (SyntaxKind::EQ_EQ, 2),
            b'=' => (SyntaxKind::EQ, 1),
            b'!' if followed_by_eq => (SyntaxKind::NOT_EQ, 2),
            b'!' => (SyntaxKind::BANG, 1),
            b'<' if followed_by_eq => (SyntaxKind::LESS_EQ, 2),
            b'<' => (SyntaxKind::LESS, 1),
            b'>' if followed_by_eq => (SyntaxKind::GREATER_EQ, 2),
            b'>' => (SyntaxKind::GREATER, 1),
            b'+' if followed_by_eq => (SyntaxKind::PLUS_EQ, 2),
            b'+' => (SyntaxKind::PLUS, 1),
            b'-' if followed_by_eq => (SyntaxKind::MINUS_EQ, 2),
            b'-' => (SyntaxKind::MINUS, 1),
            b'*' if followed_by_eq => (SyntaxKind::STAR_EQ, 2),
            b'*' => (SyntaxKind::STAR, 1),
            b'/' if followed_by_eq => (SyntaxKind::SLASH_EQ, 2),
            b'/' => (SyntaxKind::SLASH, 1),
            b'%' => (SyntaxKind::PERCENT, 1),
            b'^' => (SyntaxKind::CARET, 1),
            b'~' => (SyntaxKind::TILDE, 1),
            b'?' => (SyntaxKind::QUESTION, 1),
            b':' => (SyntaxKind::COLON, 1),
            byte => unreachable!("consume_operator called on non-operator byte {byte:#x}"),
        };
        self.position += len;

        let mut flags = flags;
        while self.rest().starts_with(SUFFIX_CHAR) {
            self.position += SUFFIX_CHAR.len_utf8();
            flags |= SyntaxFlags::SUFFIXED;
        }
        RawToken::new(kind, start as TextSize, self.position as TextSize, flags)
    }

    //#endregion

    //#region Identifiers and keywords

    /// Consume an identifier, keyword, or `var"..."` form starting at the
    /// current character. Anything that is not a valid identifier start
    /// becomes a one-character error token.
    fn consume_word(&mut self, start: usize) -> RawToken {
        let first = match self.rest().chars().next() {
            Some(c) => c,
            None => return self.error_token(start),
        };
        if first != '_' && !first.is_xid_start() {
            self.advance_char();
            return self.error_token(start);
        }

        self.advance_char();
        while let Some(c) = self.rest().chars().next() {
            if c == '_' || c == SUFFIX_CHAR || c.is_xid_continue() {
                self.position += c.len_utf8();
            } else {
                break;
            }
        }

        let text = &self.source[start..self.position];
        if text == "var" && self.current_is(b'"') {
            self.position += 1;
            return match self.scan_delimited(b'"') {
                true => self.token(SyntaxKind::VAR_IDENTIFIER, start),
                false => self.error_token(start),
            };
        }

        let kind = keyword_kind(text).unwrap_or(SyntaxKind::IDENTIFIER);
        self.token(kind, start)
    }

    //#endregion

    //#region Cursor helpers

    fn is_eof(&self) -> bool {
        self.position >= self.source.len()
    }

    fn current(&self) -> u8 {
        self.source.as_bytes()[self.position]
    }

    fn current_byte(&self) -> Option<u8> {
        self.source.as_bytes().get(self.position).copied()
    }

    fn current_is(&self, byte: u8) -> bool {
        self.current_byte() == Some(byte)
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(self.position + offset).copied()
    }

    fn rest(&self) -> &str {
        &self.source[self.position..]
    }

    fn rest_bytes(&self) -> &[u8] {
        &self.source.as_bytes()[self.position..]
    }

    /// Advance past the current character, however many bytes it occupies.
    fn advance_char(&mut self) {
        if let Some(c) = self.rest().chars().next() {
            self.position += c.len_utf8();
        }
    }

    fn consume_byte(&mut self, kind: SyntaxKind, start: usize) -> RawToken {
        self.position += 1;
        self.token(kind, start)
    }

    fn token(&self, kind: SyntaxKind, start: usize) -> RawToken {
        RawToken::new(
            kind,
            start as TextSize,
            self.position as TextSize,
            SyntaxFlags::empty(),
        )
    }

    fn error_token(&self, start: usize) -> RawToken {
        RawToken::new(
            SyntaxKind::ERROR,
            start as TextSize,
            self.position as TextSize,
            SyntaxFlags::ERROR,
        )
    }

    //#endregion
}

fn keyword_kind(text: &str) -> Option<SyntaxKind> {
    let kind = match text {
        "begin" => SyntaxKind::BEGIN_KW,
        "end" => SyntaxKind::END_KW,
        "if" => SyntaxKind::IF_KW,
        "elseif" => SyntaxKind::ELSEIF_KW,
        "else" => SyntaxKind::ELSE_KW,
        "for" => SyntaxKind::FOR_KW,
        "while" => SyntaxKind::WHILE_KW,
        "try" => SyntaxKind::TRY_KW,
        "catch" => SyntaxKind::CATCH_KW,
        "finally" => SyntaxKind::FINALLY_KW,
        "where" => SyntaxKind::WHERE_KW,
        "true" => SyntaxKind::TRUE_KW,
        "false" => SyntaxKind::FALSE_KW,
        _ => return None,
    };
    Some(kind)
}
