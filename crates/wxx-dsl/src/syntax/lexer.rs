use crate::error::LexError;
use crate::syntax::token::{keyword_or_ident, Pos, Token, TokenKind};

/// Single-pass scanner over the script source. Lines start at 1, columns
/// at 0; a newline resets the column. The lexer never recovers: the first
/// fault aborts the whole tokenize attempt.
pub struct Lexer {
    chars: Vec<char>,
    idx: usize,
    line: usize,
    column: usize,
    filename: Option<String>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            idx: 0,
            line: 1,
            column: 0,
            filename: None,
        }
    }

    pub fn with_filename(source: &str, filename: impl Into<String>) -> Self {
        let mut lexer = Self::new(source);
        lexer.filename = Some(filename.into());
        lexer
    }

    /// Scans the whole input. On success the last token is always `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    // ─── Cursor ──────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn pos(&self) -> Pos {
        Pos::new(self.line, self.column)
    }

    fn mark(&self) -> (usize, usize, usize) {
        (self.idx, self.line, self.column)
    }

    fn restore(&mut self, mark: (usize, usize, usize)) {
        (self.idx, self.line, self.column) = mark;
    }

    fn fail(&self, message: impl Into<String>, pos: Pos) -> LexError {
        LexError::new(message, pos, self.filename.clone())
    }

    // ─── Scanning ────────────────────────────────────────────────────────────

    /// Scans the next token. Returns `Eof` at end of input and keeps
    /// returning it on further calls.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia()?;

        let pos = self.pos();
        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", pos));
        };

        if c.is_ascii_digit() {
            return Ok(self.scan_number(pos));
        }
        if c.is_alphabetic() || c == '_' {
            return Ok(self.scan_ident(pos));
        }
        if c == '"' || c == '\'' {
            return Ok(self.scan_string(pos));
        }

        self.advance();
        let token = |kind, text: &str| Ok(Token::new(kind, text, pos));
        match c {
            ';' => token(TokenKind::Semicolon, ";"),
            '.' => token(TokenKind::Dot, "."),
            ',' => token(TokenKind::Comma, ","),
            '(' => token(TokenKind::LParen, "("),
            ')' => token(TokenKind::RParen, ")"),
            '[' => token(TokenKind::LBracket, "["),
            ']' => token(TokenKind::RBracket, "]"),
            '+' => token(TokenKind::BinOp, "+"),
            '-' => token(TokenKind::BinOp, "-"),
            '*' => token(TokenKind::BinOp, "*"),
            '/' => token(TokenKind::BinOp, "/"),
            '=' => token(TokenKind::BinOp, "="),
            ':' => {
                if self.peek() == Some('=') {
                    self.advance();
                    token(TokenKind::Assign, ":=")
                } else {
                    Err(self.fail("unexpected character ':'", pos))
                }
            }
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    token(TokenKind::BinOp, "<=")
                }
                Some('>') => {
                    self.advance();
                    token(TokenKind::BinOp, "<>")
                }
                _ => token(TokenKind::BinOp, "<"),
            },
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    token(TokenKind::BinOp, ">=")
                } else {
                    token(TokenKind::BinOp, ">")
                }
            }
            _ => Err(self.fail(format!("unexpected character '{c}'"), pos)),
        }
    }

    /// Skips whitespace and all three comment forms. `#` and `//` run to the
    /// end of the line; `/*` opens a block comment that may carry a dash run
    /// (`/*-- ... --*/`) and only a closing with the same dash count ends it.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('#') => self.skip_line(),
                Some('/') if self.peek_at(1) == Some('/') => self.skip_line(),
                Some('/') if self.peek_at(1) == Some('*') => self.skip_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let open = self.pos();
        self.advance(); // /
        self.advance(); // *
        let mut dashes = 0usize;
        while self.peek() == Some('-') {
            self.advance();
            dashes += 1;
        }

        while let Some(c) = self.peek() {
            if c == '-' && dashes > 0 {
                let mark = self.mark();
                let mut run = 0usize;
                while self.peek() == Some('-') {
                    self.advance();
                    run += 1;
                }
                if run == dashes && self.peek() == Some('*') && self.peek_at(1) == Some('/') {
                    self.advance();
                    self.advance();
                    return Ok(());
                }
                // Not a closing; rescan from just past the first dash.
                self.restore(mark);
                self.advance();
            } else if c == '*' && dashes == 0 && self.peek_at(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            } else {
                self.advance();
            }
        }
        Err(self.fail("unterminated block comment", open))
    }

    fn scan_number(&mut self, pos: Pos) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        // A dot only joins the number if a digit follows, so `map.hexes[0].x`
        // lexes the dot as a member access.
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        Token::new(TokenKind::Number, text, pos)
    }

    fn scan_ident(&mut self, pos: Pos) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = keyword_or_ident(&text);
        Token::new(kind, text, pos)
    }

    /// Strings take either quote style and have no escape sequences. A string
    /// still open at end of input simply runs to the end; that is not a fault.
    fn scan_string(&mut self, pos: Pos) -> Token {
        let quote = self.advance().unwrap_or('"');
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == quote {
                self.advance();
                break;
            }
            text.push(c);
            self.advance();
        }
        Token::new(TokenKind::Str, text, pos)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source).tokenize().expect("lexing should succeed")
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input_yields_only_eof() {
        let tokens = lex("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn tokenizing_is_deterministic_and_ends_with_eof() {
        let src = "x := map.hexes[0].terrain;";
        let a = lex(src);
        let b = lex(src);
        assert_eq!(a, b);
        assert_eq!(a.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn assignment_statement() {
        assert_eq!(
            kinds("x := 1;"),
            vec![
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(
            kinds("IF Then eLsE end FOR in DO True FALSE"),
            vec![
                TokenKind::If,
                TokenKind::Then,
                TokenKind::Else,
                TokenKind::End,
                TokenKind::For,
                TokenKind::In,
                TokenKind::Do,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keyword_token_keeps_original_spelling() {
        let tokens = lex("If");
        assert_eq!(tokens[0].kind, TokenKind::If);
        assert_eq!(tokens[0].text, "If");
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let tokens = lex("x := 1;\n  y := 2;");
        assert_eq!(tokens[0].pos, Pos::new(1, 0)); // x
        assert_eq!(tokens[1].pos, Pos::new(1, 2)); // :=
        assert_eq!(tokens[4].pos, Pos::new(2, 2)); // y
    }

    #[test]
    fn both_quote_styles_and_no_escapes() {
        let tokens = lex(r#""swamp" 'swamp' "a\b""#);
        assert_eq!(tokens[0].text, "swamp");
        assert_eq!(tokens[1].text, "swamp");
        assert_eq!(tokens[2].text, r"a\b");
    }

    #[test]
    fn unterminated_string_runs_to_end_of_input() {
        let tokens = lex("\"never closed");
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].text, "never closed");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn numbers_int_and_float() {
        let tokens = lex("42 3.5");
        assert_eq!(tokens[0].text, "42");
        assert_eq!(tokens[1].text, "3.5");
    }

    #[test]
    fn dot_after_number_without_digit_is_member_access() {
        assert_eq!(
            kinds("1.x"),
            vec![TokenKind::Number, TokenKind::Dot, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn comments_are_invisible() {
        let src = "# hash\n// slashes\n/* block */ x /*-- dashed --*/ := 1;";
        assert_eq!(
            kinds(src),
            vec![TokenKind::Ident, TokenKind::Assign, TokenKind::Number, TokenKind::Semicolon, TokenKind::Eof]
        );
    }

    #[test]
    fn dashed_comment_ignores_shorter_dash_runs() {
        // The single dash inside does not close a two-dash comment.
        let tokens = lex("/*-- a - b --*/ x");
        assert_eq!(tokens[0].text, "x");
    }

    #[test]
    fn unterminated_block_comment_is_a_fault() {
        let err = Lexer::new("/* never closed").tokenize().unwrap_err();
        assert!(err.message.contains("unterminated block comment"));
    }

    #[test]
    fn bare_colon_is_a_fault() {
        let err = Lexer::new("x : 1").tokenize().unwrap_err();
        assert_eq!(err.message, "unexpected character ':'");
        assert_eq!(err.pos, Pos::new(1, 2));
    }

    #[test]
    fn comparison_operators() {
        let ops: Vec<String> = lex("< <= > >= <> =")
            .into_iter()
            .filter(|t| t.kind == TokenKind::BinOp)
            .map(|t| t.text)
            .collect();
        assert_eq!(ops, vec!["<", "<=", ">", ">=", "<>", "="]);
    }
}
