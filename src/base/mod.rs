//! Foundation types for the silverchain toolchain.
//!
//! This module provides fundamental types used throughout the compiler:
//! - [`Position`], [`Range`] - Line/column positions for tokens and AST nodes
//! - [`LineIndex`] - Byte offset to line/column conversion
//! - [`Name`] - Cheap-to-clone identifier text
//!
//! This module has NO dependencies on other silverchain modules.

mod position;

pub use position::{LineIndex, Position, Range};

/// Identifier text shared between the AST, diagrams and generated artifacts
pub type Name = smol_str::SmolStr;

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
