//! Call-sequence automata
//!
//! A [`Diagram`] is the state machine compiled from one declaration: every
//! path from the start state to a final state is a legal call chain. The
//! [`builder`] produces diagrams without epsilon edges, so the outgoing
//! transitions of a state are exactly the calls available in that state.
//!
//! Diagrams are immutable once built; only accessors are public.

mod builder;

pub use builder::build;

use std::fmt;

use indexmap::IndexMap;

use crate::base::{Name, Range};
use crate::parser::{MethodCall, TypeParameters, TypeReference};

/// State identity, unique within its [`Diagram`]. The start state is `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub usize);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The grammar node a transition was compiled from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelNode {
    Method(MethodCall),
    /// Delegation to another declaration's root artifact
    Reference(TypeReference),
}

impl fmt::Display for LabelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(method) => write!(f, "{method}"),
            Self::Reference(reference) => write!(f, "{reference}"),
        }
    }
}

/// Transition payload plus the grammar ranges it originates from.
///
/// A spliced label carries its own range followed by the range of every
/// rule reference it was spliced through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    node: LabelNode,
    ranges: Vec<Range>,
}

impl Label {
    pub fn method(method: MethodCall) -> Self {
        let range = method.range;
        Self {
            node: LabelNode::Method(method),
            ranges: vec![range],
        }
    }

    pub fn reference(reference: TypeReference) -> Self {
        let range = reference.range;
        Self {
            node: LabelNode::Reference(reference),
            ranges: vec![range],
        }
    }

    pub fn node(&self) -> &LabelNode {
        &self.node
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn as_method(&self) -> Option<&MethodCall> {
        match &self.node {
            LabelNode::Method(method) => Some(method),
            LabelNode::Reference(_) => None,
        }
    }

    pub fn as_reference(&self) -> Option<&TypeReference> {
        match &self.node {
            LabelNode::Reference(reference) => Some(reference),
            LabelNode::Method(_) => None,
        }
    }

    pub fn is_delegation(&self) -> bool {
        matches!(self.node, LabelNode::Reference(_))
    }
}

/// `foo(String s)#L1C6,L3C9`
impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let begins: Vec<String> = self.ranges.iter().map(|r| r.start.to_string()).collect();
        write!(f, "{}#{}", self.node, begins.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    source: StateId,
    target: StateId,
    label: Label,
}

impl Transition {
    pub fn source(&self) -> StateId {
        self.source
    }

    pub fn target(&self) -> StateId {
        self.target
    }

    pub fn label(&self) -> &Label {
        &self.label
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    id: StateId,
    is_final: bool,
    transitions: Vec<Transition>,
}

impl State {
    pub fn id(&self) -> StateId {
        self.id
    }

    /// The chain may legally stop here
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Outgoing transitions in grammar order
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// No outgoing transitions: reaching this state completes the chain
    pub fn is_terminal(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn delegations(&self) -> impl Iterator<Item = &Label> {
        self.transitions
            .iter()
            .map(Transition::label)
            .filter(|l| l.is_delegation())
    }

    pub fn methods(&self) -> impl Iterator<Item = &Label> {
        self.transitions
            .iter()
            .map(Transition::label)
            .filter(|l| !l.is_delegation())
    }
}

/// The automaton of one declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    name: Name,
    type_params: TypeParameters,
    return_type: Option<TypeReference>,
    /// Indexed by [`StateId`]; `states[0]` is the start state
    states: Vec<State>,
}

impl Diagram {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn type_params(&self) -> &TypeParameters {
        &self.type_params
    }

    /// Result of a completed chain; `None` when the chain returns nothing.
    ///
    /// Only calls that end in a state without transitions produce it. A
    /// final state that still has transitions is exposed as its state
    /// artifact, so `Foo: a() b()? String;` stops at `a()` with no way to
    /// obtain the `String`.
    pub fn return_type(&self) -> Option<&TypeReference> {
        self.return_type.as_ref()
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id.0)
    }

    pub fn start(&self) -> &State {
        &self.states[0]
    }

    pub fn finals(&self) -> impl Iterator<Item = &State> {
        self.states.iter().filter(|s| s.is_final)
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.states.iter().flat_map(|s| s.transitions.iter())
    }
}

/// All diagrams of a grammar, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagrams(IndexMap<Name, Diagram>);

impl Diagrams {
    pub fn get(&self, name: &str) -> Option<&Diagram> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagram> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Diagrams {
    type Item = &'a Diagram;
    type IntoIter = indexmap::map::Values<'a, Name, Diagram>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.values()
    }
}

#[cfg(test)]
mod tests;
