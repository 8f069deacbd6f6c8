//! Java overload rules: generics are erased and type arguments ignored.
//! A type parameter erases to its bound, or to `Object` when unbounded.

use indexmap::IndexMap;
use tracing::debug;

use super::{Validator, conflict, method_signature};
use crate::diagram::{Diagram, Diagrams, Label, State};
use crate::error::ValidationError;
use crate::parser::{MethodCall, ParamScope, Referent, TypeParameters, TypeReference};

/// Erasure of an unbounded type parameter
const ERASURE: &str = "Object";

#[derive(Debug, Clone, Copy, Default)]
pub struct JavaValidator;

impl Validator for JavaValidator {
    fn validate(&self, diagrams: &Diagrams) -> Result<(), ValidationError> {
        for diagram in diagrams {
            for state in diagram.states() {
                validate_state(diagram, state)?;
            }
        }
        debug!(diagrams = diagrams.len(), "validated diagrams");
        Ok(())
    }
}

fn validate_state(diagram: &Diagram, state: &State) -> Result<(), ValidationError> {
    check_type_reference_conflict(state)?;
    check_type_reference_method_conflict(state)?;
    check_method_conflict(diagram, state)
}

/// Two delegations out of one state
fn check_type_reference_conflict(state: &State) -> Result<(), ValidationError> {
    let delegations: Vec<&Label> = state.delegations().collect();
    if delegations.len() > 1 {
        return Err(conflict(delegations));
    }
    Ok(())
}

/// A delegation next to a method
fn check_type_reference_method_conflict(state: &State) -> Result<(), ValidationError> {
    let delegations: Vec<&Label> = state.delegations().collect();
    let methods: Vec<&Label> = state.methods().collect();
    if !delegations.is_empty() && !methods.is_empty() {
        return Err(conflict(delegations.into_iter().chain(methods)));
    }
    Ok(())
}

/// Two methods with the same erased signature
fn check_method_conflict(diagram: &Diagram, state: &State) -> Result<(), ValidationError> {
    let mut groups: IndexMap<String, Vec<&Label>> = IndexMap::new();
    for label in state.methods() {
        if let Some(method) = label.as_method() {
            let erasure = Erasure {
                declaration: diagram.type_params(),
                method,
            };
            groups
                .entry(method_signature(method, |ty| erasure.signature(ty)))
                .or_default()
                .push(label);
        }
    }
    match groups.into_values().find(|labels| labels.len() > 1) {
        Some(labels) => Err(conflict(labels)),
        None => Ok(()),
    }
}

/// Type parameters in scope of one method label
struct Erasure<'a> {
    declaration: &'a TypeParameters,
    method: &'a MethodCall,
}

impl Erasure<'_> {
    fn bound(&self, scope: ParamScope, name: &str) -> Option<&TypeReference> {
        let params = match scope {
            ParamScope::Declaration => self.declaration,
            ParamScope::Method => &self.method.type_params,
        };
        params.get(name)?.bound.as_ref()
    }

    fn signature(&self, reference: &TypeReference) -> String {
        let mut signature = self.erase(reference);
        if reference.is_array {
            signature.push_str("[]");
        }
        signature
    }

    /// Follows bounds through other type parameters; a bound cycle erases
    /// to `Object`
    fn erase(&self, reference: &TypeReference) -> String {
        let limit = self.declaration.len() + self.method.type_params.len();
        let mut current = reference;
        for _ in 0..=limit {
            match &current.referent {
                Some(Referent::Declaration(name)) => return name.to_string(),
                None => return current.name.to_string(),
                Some(Referent::TypeParameter(scope)) => {
                    let bound = current
                        .name
                        .simple()
                        .and_then(|name| self.bound(*scope, name.as_str()));
                    match bound {
                        Some(bound) => current = bound,
                        None => return ERASURE.to_string(),
                    }
                }
            }
        }
        ERASURE.to_string()
    }
}
