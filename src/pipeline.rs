//! End-to-end compilation and the file-system boundary.
//!
//! ```text
//! read_input → compile (parse → build → validate → generate) → save
//! ```
//!
//! Each stage consumes the previous stage's product and stops the run on
//! its first error.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::diagram;
use crate::error::{InputError, Result, SaveError};
use crate::generator::{self, GeneratedFile};
use crate::language::Language;
use crate::parser;

/// Default for [`Config::max_file_count`]
pub const DEFAULT_MAX_FILE_COUNT: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub language: Language,
    /// Upper bound on generated files; exceeding it fails the run
    pub max_file_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: Language::default(),
            max_file_count: DEFAULT_MAX_FILE_COUNT,
        }
    }
}

/// Compile grammar source into generated files
pub fn compile(source: &str, config: &Config) -> Result<Vec<GeneratedFile>> {
    let diagrams = {
        let grammar = parser::parse(source)?;
        diagram::build(&grammar)?
    };
    config.language.validator().validate(&diagrams)?;
    let backend = config.language.backend();
    let files = generator::generate(&diagrams, &*backend, config.max_file_count)?;
    debug!(
        language = %config.language,
        files = files.len(),
        "compiled grammar"
    );
    Ok(files)
}

/// Read grammar source from `path`, or from standard input when `None`
pub fn read_input(path: Option<&Path>) -> Result<String, InputError> {
    match path {
        Some(path) => {
            fs::read_to_string(path).map_err(|_| InputError::File(path.to_path_buf()))
        }
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .map_err(InputError::Stdin)?;
            Ok(source)
        }
    }
}

/// Write files below `dir`, creating directories as needed.
///
/// Stops at the first failure. Files written before it stay on disk; the
/// file count and every earlier stage have already succeeded by then, so
/// only the file system itself can fail here.
pub fn save(files: &[GeneratedFile], dir: &Path) -> Result<(), SaveError> {
    for file in files {
        let path: PathBuf = dir.join(&file.path);
        let written = match path.parent() {
            Some(parent) => fs::create_dir_all(parent),
            None => Ok(()),
        }
        .and_then(|()| fs::write(&path, &file.content));
        if let Err(source) = written {
            return Err(SaveError { path, source });
        }
        debug!(path = %path.display(), "saved");
    }
    Ok(())
}
