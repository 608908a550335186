/// Source location attached to every token and AST node.
/// Used for diagnostics only, never for control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

impl Pos {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// The closed token vocabulary of the WXX DSL. Binary operators share a
/// single kind; the operator itself lives in the token's `text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Ident,
    Number,
    Str,

    Assign,    // :=
    Semicolon, // ;
    Dot,       // .
    Comma,     // ,
    LParen,    // (
    RParen,    // )
    LBracket,  // [
    RBracket,  // ]

    // Keywords
    If,
    Then,
    Else,
    End,
    For,
    In,
    Do,
    True,
    False,

    /// `+`, `-`, `*`, `/`, `=`, `<`, `<=`, `>`, `>=`, `<>`
    BinOp,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Eof => "end of input",
            Self::Ident => "identifier",
            Self::Number => "number",
            Self::Str => "string",
            Self::Assign => "`:=`",
            Self::Semicolon => "`;`",
            Self::Dot => "`.`",
            Self::Comma => "`,`",
            Self::LParen => "`(`",
            Self::RParen => "`)`",
            Self::LBracket => "`[`",
            Self::RBracket => "`]`",
            Self::If => "`if`",
            Self::Then => "`then`",
            Self::Else => "`else`",
            Self::End => "`end`",
            Self::For => "`for`",
            Self::In => "`in`",
            Self::Do => "`do`",
            Self::True => "`true`",
            Self::False => "`false`",
            Self::BinOp => "operator",
        };
        f.write_str(name)
    }
}

/// Immutable value record; tokens are copied freely.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, pos: Pos) -> Self {
        Self { kind, text: text.into(), pos }
    }
}

/// Maps an identifier to its keyword kind, or `Ident` if it is not one.
/// Matching is case-insensitive; the caller keeps the original spelling
/// in the token text.
pub fn keyword_or_ident(word: &str) -> TokenKind {
    match word.to_ascii_lowercase().as_str() {
        "if" => TokenKind::If,
        "then" => TokenKind::Then,
        "else" => TokenKind::Else,
        "end" => TokenKind::End,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "do" => TokenKind::Do,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        _ => TokenKind::Ident,
    }
}
