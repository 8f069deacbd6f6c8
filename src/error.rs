//! Error types for every pipeline stage.
//!
//! Each stage returns its own error type. [`Error`] gathers them at the
//! pipeline boundary and maps every kind to a fixed process exit code.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::base::{Name, Position};

/// An unknown command-line option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown option: {0}")]
pub struct OptionError(pub String);

/// A `--language` value without a backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported language: {0}")]
pub struct LanguageError(pub String);

/// The grammar source could not be read.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("File not found: {}", .0.display())]
    File(PathBuf),

    /// Reading standard input failed; reported without a message.
    #[error("")]
    Stdin(#[source] io::Error),
}

/// A character that cannot start any token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unexpected character '{text}' ({position})")]
pub struct TokenizeError {
    pub text: String,
    pub position: Position,
}

/// A token that does not fit the grammar at its position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({position})")]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// A name declared twice in the same scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name} is already defined ({position})")]
pub struct DuplicateDeclarationError {
    pub name: Name,
    pub position: Position,
}

/// Everything the lexer and parser can reject.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    DuplicateDeclaration(#[from] DuplicateDeclarationError),
}

/// A rule reference the diagram builder cannot expand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Undefined rule: {name} ({position})")]
    Undefined { name: String, position: Position },

    #[error("Recursive rule: {name} ({position})")]
    Recursive { name: Name, position: Position },

    #[error("Wildcard cannot instantiate {name} ({position})")]
    Wildcard { name: Name, position: Position },

    #[error("Wrong number of type arguments for {name}: expected {expected}, found {actual} ({position})")]
    TypeArgumentCount {
        name: Name,
        expected: usize,
        actual: usize,
        position: Position,
    },
}

/// Transitions leaving one state that the target language cannot tell apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Conflict: {}", .labels.join(", "))]
pub struct ValidationError {
    /// Conflicting labels rendered as `<node>#<range begins>`
    pub labels: Vec<String>,
}

/// The grammar produces more artifacts than allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "File limit ({max}) exceeded - the grammar results in {actual} generated files. \
     If this is intentional, use --max-file-count to increase the limit."
)]
pub struct FileCountError {
    pub max: usize,
    pub actual: usize,
}

/// A generated file could not be written.
#[derive(Debug, Error)]
#[error("Failed to save generated file: {}", .path.display())]
pub struct SaveError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Any failure of a silverchain run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Option(#[from] OptionError),

    #[error(transparent)]
    Language(#[from] LanguageError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    DuplicateDeclaration(#[from] DuplicateDeclarationError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    FileCount(#[from] FileCountError),

    #[error(transparent)]
    Save(#[from] SaveError),
}

impl Error {
    /// Process exit code reported for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Option(_) => 101,
            Self::Language(_) => 102,
            Self::Input(_) => 103,
            Self::Tokenize(_) => 104,
            Self::Parse(_) => 105,
            Self::DuplicateDeclaration(_) => 106,
            Self::FileCount(_) => 107,
            Self::Save(_) => 108,
            Self::Validation(_) => 109,
            Self::Resolve(_) => 110,
        }
    }
}

impl From<SyntaxError> for Error {
    fn from(error: SyntaxError) -> Self {
        match error {
            SyntaxError::Tokenize(e) => Self::Tokenize(e),
            SyntaxError::Parse(e) => Self::Parse(e),
            SyntaxError::DuplicateDeclaration(e) => Self::DuplicateDeclaration(e),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
