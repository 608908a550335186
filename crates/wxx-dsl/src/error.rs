use thiserror::Error;

use crate::syntax::token::{Pos, Token, TokenKind};

fn render_at(filename: Option<&str>, pos: Pos, msg: &str) -> String {
    match filename {
        Some(name) => format!("{}:{}:{}: {}", name, pos.line, pos.column, msg),
        None => format!("{}:{}: {}", pos.line, pos.column, msg),
    }
}

// ─── Lexical faults ──────────────────────────────────────────────────────────

/// A fatal lexical fault: unexpected character or unterminated block comment.
/// Aborts the current tokenize attempt.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{}", self.render())]
pub struct LexError {
    pub message: String,
    pub pos: Pos,
    pub filename: Option<String>,
}

impl LexError {
    pub fn new(message: impl Into<String>, pos: Pos, filename: Option<String>) -> Self {
        Self { message: message.into(), pos, filename }
    }

    fn render(&self) -> String {
        render_at(self.filename.as_deref(), self.pos, &self.message)
    }
}

// ─── Syntax faults ───────────────────────────────────────────────────────────

/// A fatal syntax fault. The first mismatch aborts parsing entirely; there
/// is no error recovery.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{}", self.render())]
pub struct ParseError {
    pub message: String,
    pub pos: Pos,
    pub filename: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, pos: Pos, filename: Option<String>) -> Self {
        Self { message: message.into(), pos, filename }
    }

    pub fn expected(expected: TokenKind, found: &Token, filename: Option<String>) -> Self {
        Self::new(
            format!("syntax error: expected {expected} but found {} '{}'", found.kind, found.text),
            found.pos,
            filename,
        )
    }

    fn render(&self) -> String {
        render_at(self.filename.as_deref(), self.pos, &self.message)
    }
}

/// Either phase of front-end failure, for callers that run lex and parse
/// as one step.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

// ─── Semantic diagnostics ────────────────────────────────────────────────────

/// A recoverable diagnostic from the static checker. The checker collects
/// every diagnostic it finds rather than stopping at the first.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{line}:{col}: {msg}")]
pub struct CheckError {
    pub msg: String,
    pub line: usize,
    pub col: usize,
}

impl CheckError {
    pub fn new(msg: impl Into<String>, pos: Pos) -> Self {
        Self { msg: msg.into(), line: pos.line, col: pos.column }
    }
}

// ─── Runtime faults ──────────────────────────────────────────────────────────

/// A VM-level fault. The first fault aborts the whole execution and is
/// returned to the caller with position (and filename, if known) attached.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{}", self.render())]
pub struct RuntimeError {
    pub msg: String,
    pub pos: Pos,
    pub filename: Option<String>,
}

impl RuntimeError {
    pub fn new(msg: impl Into<String>, pos: Pos, filename: Option<String>) -> Self {
        Self { msg: msg.into(), pos, filename }
    }

    fn render(&self) -> String {
        render_at(self.filename.as_deref(), self.pos, &format!("runtime error: {}", self.msg))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_without_filename() {
        let e = RuntimeError::new("boom", Pos::new(3, 7), None);
        assert_eq!(e.to_string(), "3:7: runtime error: boom");
    }

    #[test]
    fn renders_with_filename() {
        let e = LexError::new("unexpected character ':'", Pos::new(1, 0), Some("edit.wxxsh".into()));
        assert_eq!(e.to_string(), "edit.wxxsh:1:0: unexpected character ':'");
    }

    #[test]
    fn check_error_display() {
        let e = CheckError::new("undefined variable: y", Pos::new(2, 4));
        assert_eq!(e.to_string(), "2:4: undefined variable: y");
    }
}
