//! # silverchain
//!
//! Compiles a grammar of method-call sequences into fluent-API type
//! definitions. Only call chains the grammar accepts type-check in the
//! generated code.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! pipeline  → Config, compile, input/output files
//!   ↓
//! language  → Target language: validator + backend pair
//!   ↓
//! generator → Diagram → artifacts → rendered files
//! validator → Rejects diagrams the target language cannot express
//!   ↓
//! diagram   → Grammar → state diagram per declaration
//!   ↓
//! parser    → Logos lexer, recursive-descent parser, resolution
//!   ↓
//! error     → Error kinds and exit codes
//!   ↓
//! base      → Primitives (Name, Range, Position, LineIndex)
//! ```

// ============================================================================
// MODULES (dependency order: base → error → parser → diagram → generator)
// ============================================================================

/// Foundation types: Name, Range, Position
pub mod base;

/// Error kinds for every stage, with exit codes
pub mod error;

/// Parser: Logos lexer, recursive-descent parser, name resolution
pub mod parser;

/// State diagrams built from grammar declarations
pub mod diagram;

/// Target-language checks on diagrams
pub mod validator;

/// Artifacts and their rendering
pub mod generator;

/// Supported output languages
pub mod language;

/// End-to-end compilation
pub mod pipeline;

pub use base::{LineIndex, Name, Position, Range};
pub use error::{Error, Result};
pub use generator::GeneratedFile;
pub use language::Language;
pub use pipeline::{Config, DEFAULT_MAX_FILE_COUNT, compile, read_input, save};
