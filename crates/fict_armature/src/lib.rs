//! Armature - the structural front end for the Fict surface dialect.
//!
//! Provides the tokenizer and the recursive-descent parser that lift source
//! text into the `fict_relief` AST. Downstream passes (analysis, lowering)
//! never touch source text again except through spans.

pub mod lexer;
pub mod parser;

pub use lexer::{Kw, LexError, Lexer, Punct, Token, TokenKind};
pub use parser::{parse_module, ParseError, Parser};
