use crate::error::ParseError;
use crate::syntax::ast::{CallExpr, Expr, LValue, LValueStep, Literal, Program, Stmt};
use crate::syntax::token::{Pos, Token, TokenKind};

/// Recursive-descent parser over the token stream. The first mismatch
/// aborts the whole parse; there is no recovery or resynchronization.
///
/// Grammar sketch:
///
/// ```text
/// program    := statement*
/// statement  := if | for | assignment | call
/// if         := "if" expr "then" statement* ("else" statement*)? "end"
/// for        := "for" IDENT "in" expr "do" statement* "end"
/// assignment := lvalue ":=" expr ";"
/// call       := IDENT "(" (expr ("," expr)*)? ")" ";"
/// lvalue     := IDENT ("." IDENT | "[" expr "]")*
/// expr       := comparison
/// comparison := additive (("=" | "<>" | "<" | "<=" | ">" | ">=") additive)*
/// additive   := multiplicative (("+" | "-") multiplicative)*
/// multiplicative := primary (("*" | "/") primary)*
/// primary    := NUMBER | STRING | "true" | "false" | "(" expr ")"
///             | IDENT ("." IDENT)* | IDENT "(" args ")"
/// ```
///
/// Dotted names in expression position flatten into one identifier; only
/// assignment targets keep their step structure.
pub struct Parser {
    tokens: Vec<Token>,
    idx: usize,
    filename: Option<String>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let pos = tokens.last().map(|t| t.pos).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, "", pos));
        }
        Self { tokens, idx: 0, filename: None }
    }

    pub fn with_filename(tokens: Vec<Token>, filename: impl Into<String>) -> Self {
        let mut parser = Self::new(tokens);
        parser.filename = Some(filename.into());
        parser
    }

    pub fn parse(mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    // ─── Cursor helpers ──────────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        // Construction guarantees a trailing Eof, so the clamp always lands
        // on a real token.
        &self.tokens[self.idx.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        self.idx += 1;
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::expected(kind, self.peek(), self.filename.clone()))
        }
    }

    fn fail(&self, message: impl Into<String>, pos: Pos) -> ParseError {
        ParseError::new(message, pos, self.filename.clone())
    }

    fn unexpected(&self, context: &str) -> ParseError {
        let tok = self.peek();
        self.fail(
            format!("syntax error: unexpected {} '{}'{}", tok.kind, tok.text, context),
            tok.pos,
        )
    }

    // ─── Statements ──────────────────────────────────────────────────────────

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek().kind {
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::Ident => self.parse_assignment_or_call(),
            _ => Err(self.unexpected("")),
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(TokenKind::If)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::Then)?;

        let mut then_branch = Vec::new();
        while !self.check(TokenKind::Else) && !self.check(TokenKind::End) {
            then_branch.push(self.parse_statement()?);
        }

        let mut else_branch = Vec::new();
        if self.check(TokenKind::Else) {
            self.advance();
            while !self.check(TokenKind::End) {
                else_branch.push(self.parse_statement()?);
            }
        }
        self.expect(TokenKind::End)?;

        Ok(Stmt::If { condition, then_branch, else_branch, pos: start.pos })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let start = self.expect(TokenKind::For)?;
        let var = self.expect(TokenKind::Ident)?;
        self.expect(TokenKind::In)?;
        let iterator = self.parse_expr()?;
        self.expect(TokenKind::Do)?;

        let mut body = Vec::new();
        while !self.check(TokenKind::End) {
            body.push(self.parse_statement()?);
        }
        self.expect(TokenKind::End)?;

        Ok(Stmt::For { var_name: var.text, iterator, body, pos: start.pos })
    }

    /// Both assignments and call statements open with an identifier, so we
    /// parse an lvalue first and decide on the next token. A call statement
    /// reuses the lvalue root as the function name; any dotted steps before
    /// the `(` are discarded.
    fn parse_assignment_or_call(&mut self) -> Result<Stmt, ParseError> {
        let start_pos = self.peek().pos;
        let lvalue = self.parse_lvalue()?;

        if self.check(TokenKind::Assign) {
            self.advance();
            let value = self.parse_expr()?;
            self.expect(TokenKind::Semicolon)?;
            return Ok(Stmt::Assign { target: lvalue, value, pos: start_pos });
        }
        if self.check(TokenKind::LParen) {
            let call = self.parse_call(lvalue.root)?;
            self.expect(TokenKind::Semicolon)?;
            return Ok(Stmt::Call { call, pos: start_pos });
        }
        Err(self.unexpected(" after identifier"))
    }

    fn parse_lvalue(&mut self) -> Result<LValue, ParseError> {
        let root = self.expect(TokenKind::Ident)?;
        let mut steps = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    let prop = self.expect(TokenKind::Ident)?;
                    steps.push(LValueStep::Prop { name: prop.text, pos: prop.pos });
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    // Index steps report at the closing bracket.
                    let close = self.expect(TokenKind::RBracket)?;
                    steps.push(LValueStep::Index { index, pos: close.pos });
                }
                _ => return Ok(LValue { root: root.text, steps, pos: root.pos }),
            }
        }
    }

    // ─── Expressions ─────────────────────────────────────────────────────────

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        while self.peek_binop(&["=", "<>", "<", "<=", ">", ">="]) {
            let op = self.advance();
            let right = self.parse_additive()?;
            left = Expr::Binary {
                pos: left.pos(),
                left: Box::new(left),
                op: op.text,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        while self.peek_binop(&["+", "-"]) {
            let op = self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                pos: left.pos(),
                left: Box::new(left),
                op: op.text,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_primary()?;
        while self.peek_binop(&["*", "/"]) {
            let op = self.advance();
            let right = self.parse_primary()?;
            left = Expr::Binary {
                pos: left.pos(),
                left: Box::new(left),
                op: op.text,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn peek_binop(&self, ops: &[&str]) -> bool {
        let tok = self.peek();
        tok.kind == TokenKind::BinOp && ops.contains(&tok.text.as_str())
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Number => {
                let value = self.parse_number(&tok)?;
                Ok(Expr::Literal { value, pos: tok.pos })
            }
            TokenKind::Str => Ok(Expr::Literal { value: Literal::Str(tok.text), pos: tok.pos }),
            TokenKind::True => Ok(Expr::Literal { value: Literal::Bool(true), pos: tok.pos }),
            TokenKind::False => Ok(Expr::Literal { value: Literal::Bool(false), pos: tok.pos }),
            TokenKind::LParen => {
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident => {
                if self.check(TokenKind::LParen) {
                    return Ok(Expr::Call(self.parse_call(tok.text)?));
                }
                if self.check(TokenKind::Dot) {
                    return self.parse_flattened_path(tok);
                }
                Ok(Expr::Ident { name: tok.text, pos: tok.pos })
            }
            _ => Err(self.fail(
                format!("syntax error: unexpected {} '{}' in expression", tok.kind, tok.text),
                tok.pos,
            )),
        }
    }

    /// Member chains in expression position become one dotted identifier;
    /// the VM recognizes the full path as a name (e.g. `map.hexes`).
    fn parse_flattened_path(&mut self, root: Token) -> Result<Expr, ParseError> {
        let mut name = root.text;
        while self.check(TokenKind::Dot) {
            self.advance();
            let prop = self.expect(TokenKind::Ident)?;
            name.push('.');
            name.push_str(&prop.text);
        }
        Ok(Expr::Ident { name, pos: root.pos })
    }

    fn parse_call(&mut self, name: String) -> Result<CallExpr, ParseError> {
        // Calls report at the opening parenthesis.
        let open = self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.check(TokenKind::Comma) {
                self.advance();
                args.push(self.parse_expr()?);
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(CallExpr { name, args, pos: open.pos })
    }

    fn parse_number(&self, tok: &Token) -> Result<Literal, ParseError> {
        if let Ok(i) = tok.text.parse::<i64>() {
            return Ok(Literal::Int(i));
        }
        if let Ok(f) = tok.text.parse::<f64>() {
            return Ok(Literal::Float(f));
        }
        Err(self.fail(format!("invalid number literal '{}'", tok.text), tok.pos))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
