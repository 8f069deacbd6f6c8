//! AST → Diagram construction
//!
//! Thompson-style: every sub-expression compiles to a [`Fragment`], an entry
//! state plus the exit states where the sub-expression may end. Instead of
//! epsilon edges, wiring an exit to an entry copies the entry's outgoing
//! transitions onto the exit. Entry states are never transition targets, so
//! a copied-from entry is either still the fragment entry or unreachable.
//!
//! A rule reference is delegated when nothing can follow it in its
//! declaration and spliced otherwise. Splicing copies the referenced rule's
//! inline form, in which its own trailing references are spliced too.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use super::{Diagram, Diagrams, Label, LabelNode, State, StateId, Transition};
use crate::base::{Name, Range};
use crate::error::ResolveError;
use crate::parser::{
    Declaration, Expr, FormalParameter, Grammar, ParamScope, Referent, TypeArgument,
    TypeReference,
};

/// Build one diagram per declaration, in declaration order
pub fn build(grammar: &Grammar) -> Result<Diagrams, ResolveError> {
    let mut builder = DiagramsBuilder {
        grammar,
        built: FxHashMap::default(),
        in_progress: FxHashSet::default(),
    };
    let mut diagrams = Diagrams::default();
    for declaration in &grammar.declarations {
        let diagram = builder.build_declaration(declaration, Form::Delegating)?;
        diagrams.0.insert(declaration.name.name.clone(), diagram);
    }
    debug!(diagrams = diagrams.len(), "built diagrams");
    Ok(diagrams)
}

/// How the last element of a declaration body is compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Form {
    /// Trailing rule references delegate; this is the generated diagram
    Delegating,
    /// Every rule reference is spliced; used when the declaration itself is
    /// spliced into another chain that continues after it
    Inline,
}

struct DiagramsBuilder<'g> {
    grammar: &'g Grammar,
    /// Inline forms, built on first splice
    built: FxHashMap<Name, Diagram>,
    /// Declarations whose body is being compiled; splicing one is a cycle
    in_progress: FxHashSet<(Name, Form)>,
}

impl DiagramsBuilder<'_> {
    fn build_declaration(
        &mut self,
        declaration: &Declaration,
        form: Form,
    ) -> Result<Diagram, ResolveError> {
        let key = (declaration.name.name.clone(), form);
        self.in_progress.insert(key.clone());

        let (body, return_type) = split_return_type(declaration.body.as_ref());
        let mut graph = Graph::default();
        let fragment = match body {
            Some(body) => self.fragment(&mut graph, body, form == Form::Delegating)?,
            None => graph.empty(),
        };

        self.in_progress.remove(&key);
        let diagram = graph.finish(declaration, fragment, return_type);
        trace!(
            diagram = %key.0,
            ?form,
            states = diagram.states().len(),
            transitions = diagram.transitions().count(),
            "built diagram"
        );
        Ok(diagram)
    }

    /// `tail` is true when nothing can follow `expr` in its declaration
    fn fragment(
        &mut self,
        graph: &mut Graph,
        expr: &Expr,
        tail: bool,
    ) -> Result<Fragment, ResolveError> {
        match expr {
            Expr::Method(method) => Ok(graph.transition(Label::method(method.clone()))),
            Expr::Reference(reference) => {
                let Some(target) = reference.declaration() else {
                    return Err(ResolveError::Undefined {
                        name: reference.name.to_string(),
                        position: reference.range.start,
                    });
                };
                self.check_type_arguments(target, reference)?;
                if tail {
                    Ok(graph.transition(Label::reference(reference.clone())))
                } else {
                    self.splice(graph, target, reference)
                }
            }
            Expr::Sequence(left, right) => {
                let left = self.fragment(graph, left, false)?;
                let right = self.fragment(graph, right, tail)?;
                Ok(graph.sequence(left, right))
            }
            Expr::Alternation(left, right) => {
                let left = self.fragment(graph, left, tail)?;
                let right = self.fragment(graph, right, tail)?;
                Ok(graph.alternation(left, right))
            }
            Expr::Group(inner) => self.fragment(graph, inner, tail),
            Expr::Repetition(repetition) => {
                let inner_tail = tail && repetition.is_optional();
                let inner = self.fragment(graph, &repetition.inner, inner_tail)?;
                Ok(graph.repeat(inner, repetition.min, repetition.max))
            }
        }
    }

    /// A rule reference supplies exactly one argument per type parameter
    fn check_type_arguments(
        &self,
        target: &Name,
        reference: &TypeReference,
    ) -> Result<(), ResolveError> {
        let expected = self
            .grammar
            .declaration(target)
            .map_or(0, |declaration| declaration.type_params.len());
        if expected != reference.args.len() {
            return Err(ResolveError::TypeArgumentCount {
                name: target.clone(),
                expected,
                actual: reference.args.len(),
                position: reference.range.start,
            });
        }
        Ok(())
    }

    fn splice(
        &mut self,
        graph: &mut Graph,
        target: &Name,
        reference: &TypeReference,
    ) -> Result<Fragment, ResolveError> {
        if self.in_progress.contains(&(target.clone(), Form::Inline)) {
            return Err(ResolveError::Recursive {
                name: target.clone(),
                position: reference.range.start,
            });
        }
        if !self.built.contains_key(target) {
            let grammar = self.grammar;
            let Some(declaration) = grammar.declaration(target) else {
                return Err(ResolveError::Undefined {
                    name: target.to_string(),
                    position: reference.range.start,
                });
            };
            let diagram = self.build_declaration(declaration, Form::Inline)?;
            self.built.insert(target.clone(), diagram);
        }
        let Some(diagram) = self.built.get(target) else {
            return Err(ResolveError::Undefined {
                name: target.to_string(),
                position: reference.range.start,
            });
        };

        let mut substitution = FxHashMap::default();
        for (param, arg) in diagram.type_params().iter().zip(&reference.args) {
            match arg {
                TypeArgument::Type(ty) => {
                    substitution.insert(param.name.name.clone(), ty.clone());
                }
                TypeArgument::Wildcard(_) => {
                    return Err(ResolveError::Wildcard {
                        name: target.clone(),
                        position: reference.range.start,
                    });
                }
            }
        }
        trace!(rule = %target, at = %reference.range.start, "splicing");
        Ok(graph.splice(diagram, &substitution, reference.range))
    }
}

/// Peel a trailing external type off the top-level sequence: it is the
/// chain's return type, not a transition.
fn split_return_type(body: Option<&Expr>) -> (Option<&Expr>, Option<TypeReference>) {
    let is_return_type = |expr: &Expr| match expr {
        Expr::Reference(reference) if reference.declaration().is_none() => {
            Some(reference.clone())
        }
        _ => None,
    };
    match body {
        Some(Expr::Sequence(left, right)) => match is_return_type(&**right) {
            Some(ty) => (Some(&**left), Some(ty)),
            None => (body, None),
        },
        Some(expr) => match is_return_type(expr) {
            Some(ty) => (None, Some(ty)),
            None => (body, None),
        },
        None => (None, None),
    }
}

/// Replace the declaration type parameters of a spliced rule with the
/// reference's type arguments. Substituted types are not visited again.
fn substitute(ty: &mut TypeReference, substitution: &FxHashMap<Name, TypeReference>) {
    if ty.referent == Some(Referent::TypeParameter(ParamScope::Declaration)) {
        if let Some(replacement) = ty.name.simple().and_then(|n| substitution.get(&n.name)) {
            let is_array = ty.is_array || replacement.is_array;
            *ty = TypeReference {
                is_array,
                ..replacement.clone()
            };
            return;
        }
    }
    for arg in &mut ty.args {
        match arg {
            TypeArgument::Type(inner) => substitute(inner, substitution),
            TypeArgument::Wildcard(Some((_, bound))) => substitute(bound, substitution),
            TypeArgument::Wildcard(None) => {}
        }
    }
}

fn instantiate(
    label: &Label,
    substitution: &FxHashMap<Name, TypeReference>,
    site: Range,
) -> Label {
    let mut label = label.clone();
    if !substitution.is_empty() {
        match &mut label.node {
            LabelNode::Method(method) => {
                for FormalParameter { ty, .. } in &mut method.params.0 {
                    substitute(ty, substitution);
                }
                for bound in method.type_params.0.iter_mut().filter_map(|p| p.bound.as_mut()) {
                    substitute(bound, substitution);
                }
                for thrown in &mut method.throws {
                    substitute(thrown, substitution);
                }
            }
            LabelNode::Reference(reference) => {
                for arg in &mut reference.args {
                    if let TypeArgument::Type(ty) = arg {
                        substitute(ty, substitution);
                    }
                }
            }
        }
    }
    label.ranges.push(site);
    label
}

/// Entry state and exit states of a compiled sub-expression
#[derive(Debug, Clone)]
struct Fragment {
    entry: usize,
    exits: Vec<usize>,
}

/// Mutable automaton under construction
#[derive(Debug, Default)]
struct Graph {
    /// Outgoing `(label, target)` edges per state
    states: Vec<Vec<(Label, usize)>>,
}

fn push_unique(exits: &mut Vec<usize>, state: usize) {
    if !exits.contains(&state) {
        exits.push(state);
    }
}

impl Graph {
    fn add_state(&mut self) -> usize {
        self.states.push(Vec::new());
        self.states.len() - 1
    }

    /// Matches the empty call sequence
    fn empty(&mut self) -> Fragment {
        let state = self.add_state();
        Fragment {
            entry: state,
            exits: vec![state],
        }
    }

    fn transition(&mut self, label: Label) -> Fragment {
        let entry = self.add_state();
        let exit = self.add_state();
        self.states[entry].push((label, exit));
        Fragment {
            entry,
            exits: vec![exit],
        }
    }

    /// Give `into` every outgoing edge of `from` it does not have yet
    fn merge(&mut self, into: usize, from: usize) {
        if into == from {
            return;
        }
        let edges = self.states[from].clone();
        for edge in edges {
            if !self.states[into].contains(&edge) {
                self.states[into].push(edge);
            }
        }
    }

    fn sequence(&mut self, left: Fragment, right: Fragment) -> Fragment {
        for &exit in &left.exits {
            self.merge(exit, right.entry);
        }
        let mut exits = Vec::new();
        for &exit in &right.exits {
            if exit == right.entry {
                for &left_exit in &left.exits {
                    push_unique(&mut exits, left_exit);
                }
            } else {
                push_unique(&mut exits, exit);
            }
        }
        Fragment {
            entry: left.entry,
            exits,
        }
    }

    fn alternation(&mut self, left: Fragment, right: Fragment) -> Fragment {
        let entry = self.add_state();
        self.merge(entry, left.entry);
        self.merge(entry, right.entry);
        let mut exits = Vec::new();
        for &exit in left.exits.iter().chain(&right.exits) {
            if exit == left.entry || exit == right.entry {
                push_unique(&mut exits, entry);
            } else {
                push_unique(&mut exits, exit);
            }
        }
        Fragment { entry, exits }
    }

    /// `min == 0` adds the bypass, `max == None` adds the loop
    fn repeat(&mut self, inner: Fragment, min: u32, max: Option<u32>) -> Fragment {
        if max.is_none() {
            for &exit in &inner.exits {
                self.merge(exit, inner.entry);
            }
        }
        let mut exits = inner.exits;
        if min == 0 {
            push_unique(&mut exits, inner.entry);
        }
        Fragment {
            entry: inner.entry,
            exits,
        }
    }

    /// Copy a finished diagram in as a fragment
    fn splice(
        &mut self,
        diagram: &Diagram,
        substitution: &FxHashMap<Name, TypeReference>,
        site: Range,
    ) -> Fragment {
        let base = self.states.len();
        for _ in diagram.states() {
            self.add_state();
        }
        for transition in diagram.transitions() {
            let label = instantiate(transition.label(), substitution, site);
            self.states[base + transition.source().0].push((label, base + transition.target().0));
        }
        Fragment {
            entry: base + diagram.start().id().0,
            exits: diagram.finals().map(|s| base + s.id().0).collect(),
        }
    }

    /// Drop unreachable states and renumber breadth-first from the entry
    fn finish(
        self,
        declaration: &Declaration,
        fragment: Fragment,
        return_type: Option<TypeReference>,
    ) -> Diagram {
        let mut ids: Vec<Option<usize>> = vec![None; self.states.len()];
        let mut order = vec![fragment.entry];
        ids[fragment.entry] = Some(0);
        let mut next = 0;
        while next < order.len() {
            let old = order[next];
            for (_, target) in &self.states[old] {
                if ids[*target].is_none() {
                    ids[*target] = Some(order.len());
                    order.push(*target);
                }
            }
            next += 1;
        }

        let mut states = Vec::with_capacity(order.len());
        for (new, &old) in order.iter().enumerate() {
            let source = StateId(new);
            let transitions = self.states[old]
                .iter()
                .filter_map(|(label, target)| {
                    ids[*target].map(|target| Transition {
                        source,
                        target: StateId(target),
                        label: label.clone(),
                    })
                })
                .collect();
            states.push(State {
                id: source,
                is_final: fragment.exits.contains(&old),
                transitions,
            });
        }

        Diagram {
            name: declaration.name.name.clone(),
            type_params: declaration.type_params.clone(),
            return_type,
            states,
        }
    }
}
