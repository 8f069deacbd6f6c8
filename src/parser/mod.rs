//! Grammar front end
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with TokenKind and Range
//!     ↓
//! Parser (recursive descent) → Grammar AST, one Declaration per rule
//!     ↓
//! Resolve → TypeReference::referent linked to rules and type parameters
//! ```
//!
//! Every stage stops at the first error.

#[allow(clippy::module_inception)]
mod parser;

pub mod ast;
mod lexer;
mod resolve;

pub use ast::*;
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::parse;
