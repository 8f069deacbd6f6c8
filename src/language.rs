//! Target languages: each pairs a [`Validator`] with a [`Backend`].

use std::fmt;
use std::str::FromStr;

use crate::error::LanguageError;
use crate::generator::{Backend, JavaBackend};
use crate::validator::{JavaValidator, Validator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Java,
}

impl Language {
    pub const ALL: &'static [Language] = &[Language::Java];

    /// Name accepted by `--language`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Java => "java",
        }
    }

    pub fn validator(&self) -> Box<dyn Validator> {
        match self {
            Self::Java => Box::new(JavaValidator),
        }
    }

    pub fn backend(&self) -> Box<dyn Backend> {
        match self {
            Self::Java => Box::new(JavaBackend),
        }
    }
}

impl FromStr for Language {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|language| language.as_str() == s)
            .ok_or_else(|| LanguageError(s.to_string()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
