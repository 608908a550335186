//! Scripting core for Worldographer hex maps.
//!
//! The pipeline has four phases, each usable on its own:
//!
//! 1. [`tokenize`] turns source text into tokens.
//! 2. [`parse`] builds the AST (running the lexer for you).
//! 3. [`check`] walks the AST and collects semantic diagnostics.
//! 4. [`Vm::execute`] runs the AST against a borrowed document.
//!
//! ```
//! use wxx_dsl::{check, parse, Vm};
//! use wxx_dsl::document::MapRoot;
//!
//! let program = parse("for h in map.hexes do h.terrain := \"swamp\"; end")?;
//! assert!(check(&program).is_empty());
//!
//! let mut doc = MapRoot::mock();
//! let mut vm = Vm::new();
//! vm.execute(&program, &mut doc)?;
//! assert!(doc.hexes.iter().all(|h| h.terrain == "swamp"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod analysis;
pub mod document;
pub mod error;
pub mod runtime;
pub mod syntax;

pub use analysis::{check, check_with};
pub use error::{CheckError, LexError, ParseError, RuntimeError, SyntaxError};
pub use runtime::{Arity, Builtins, HostIo, Value, Vm};
pub use syntax::ast::Program;
pub use syntax::token::{Pos, Token, TokenKind};

use syntax::lexer::Lexer;
use syntax::parser::Parser;

/// Scans source text into a token stream ending in `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::new(source).tokenize()?;
    log::trace!("lexed {} token(s)", tokens.len());
    Ok(tokens)
}

/// Lexes and parses in one step.
pub fn parse(source: &str) -> Result<Program, SyntaxError> {
    let tokens = tokenize(source)?;
    let program = Parser::new(tokens).parse()?;
    log::trace!("parsed {} top-level statement(s)", program.statements.len());
    Ok(program)
}

/// Lexes and parses with a filename attached to any fault.
pub fn parse_file(source: &str, filename: &str) -> Result<Program, SyntaxError> {
    let tokens = Lexer::with_filename(source, filename).tokenize()?;
    let program = Parser::with_filename(tokens, filename).parse()?;
    Ok(program)
}
