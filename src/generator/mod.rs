//! Diagram → source artifacts
//!
//! Every diagram yields one root artifact, named after the declaration, plus
//! one artifact per state that has outgoing transitions. A state artifact
//! exposes one operation per transition; each operation returns the
//! artifact of the state it leads to, so only legal call orders type-check.
//!
//! This module decides *which* artifacts exist and what they contain. The
//! textual form and file layout belong to a [`Backend`].

mod java;

pub use java::JavaBackend;

use std::path::PathBuf;

use tracing::debug;

use crate::diagram::{Diagram, Diagrams, LabelNode, State, StateId};
use crate::error::FileCountError;
use crate::parser::{MethodCall, TypeReference};

/// Name of the operation a delegating state exposes
pub const DELEGATION_ACCESSOR: &str = "then";

/// One output file, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Public entry type of a declaration; `entry` is the start state when
    /// it has operations to inherit
    Root { entry: Option<StateId> },
    State(StateId),
}

impl ArtifactKind {
    pub fn state(&self) -> Option<StateId> {
        match self {
            Self::Root { .. } => None,
            Self::State(id) => Some(*id),
        }
    }
}

/// What an operation hands back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returns<'d> {
    /// Artifact of a state of the same diagram
    State(StateId),
    /// The diagram's declared return type, once the chain is complete
    Type(&'d TypeReference),
    /// Completed chain without a return type
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'d> {
    Method {
        method: &'d MethodCall,
        returns: Returns<'d>,
    },
    /// Continue the chain with another declaration's root artifact
    Delegate { reference: &'d TypeReference },
}

impl Operation<'_> {
    pub fn name(&self) -> &str {
        match self {
            Self::Method { method, .. } => method.name.as_str(),
            Self::Delegate { .. } => DELEGATION_ACCESSOR,
        }
    }
}

/// One generated type, before rendering
#[derive(Debug, Clone)]
pub struct Artifact<'d> {
    pub diagram: &'d Diagram,
    pub kind: ArtifactKind,
    /// Empty for roots
    pub operations: Vec<Operation<'d>>,
}

/// Renders artifacts for one target language.
pub trait Backend {
    /// Output path of an artifact; a pure function of the diagram name and
    /// the state (`None` for the root)
    fn path(&self, diagram: &str, state: Option<StateId>) -> PathBuf;

    fn render(&self, artifact: &Artifact<'_>) -> String;
}

fn has_artifact(state: &State) -> bool {
    !state.is_terminal()
}

/// Number of files [`generate`] would produce
pub fn count_artifacts(diagrams: &Diagrams) -> usize {
    diagrams
        .iter()
        .map(|d| 1 + d.states().iter().filter(|s| has_artifact(s)).count())
        .sum()
}

/// Artifacts of one diagram: root first, then states by id
pub fn artifacts(diagram: &Diagram) -> Vec<Artifact<'_>> {
    let start = diagram.start();
    let root = Artifact {
        diagram,
        kind: ArtifactKind::Root {
            entry: has_artifact(start).then_some(start.id()),
        },
        operations: Vec::new(),
    };
    let states = diagram
        .states()
        .iter()
        .filter(|s| has_artifact(s))
        .map(|state| Artifact {
            diagram,
            kind: ArtifactKind::State(state.id()),
            operations: operations(diagram, state),
        });
    std::iter::once(root).chain(states).collect()
}

fn operations<'d>(diagram: &'d Diagram, state: &'d State) -> Vec<Operation<'d>> {
    state
        .transitions()
        .iter()
        .map(|transition| match transition.label().node() {
            LabelNode::Reference(reference) => Operation::Delegate { reference },
            LabelNode::Method(method) => {
                let target = diagram.state(transition.target());
                let returns = match target {
                    Some(target) if has_artifact(target) => Returns::State(target.id()),
                    _ => diagram.return_type().map_or(Returns::Void, Returns::Type),
                };
                Operation::Method { method, returns }
            }
        })
        .collect()
}

/// Render every artifact of every diagram.
///
/// Fails without rendering anything when the artifact count exceeds
/// `max_file_count`.
pub fn generate(
    diagrams: &Diagrams,
    backend: &dyn Backend,
    max_file_count: usize,
) -> Result<Vec<GeneratedFile>, FileCountError> {
    let actual = count_artifacts(diagrams);
    if actual > max_file_count {
        return Err(FileCountError {
            max: max_file_count,
            actual,
        });
    }

    let mut files = Vec::with_capacity(actual);
    for diagram in diagrams {
        for artifact in artifacts(diagram) {
            files.push(GeneratedFile {
                path: backend.path(diagram.name(), artifact.kind.state()),
                content: backend.render(&artifact),
            });
        }
    }
    debug!(files = files.len(), "generated files");
    Ok(files)
}
