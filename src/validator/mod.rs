//! Ambiguity checks over built diagrams
//!
//! A state is ambiguous when the target language could not tell two of its
//! outgoing transitions apart. Which transitions clash depends on the
//! language's overload rules, so each backend brings its own [`Validator`].

mod java;

pub use java::JavaValidator;

use crate::diagram::{Diagrams, Label};
use crate::error::ValidationError;
use crate::parser::{FormalParameter, MethodCall, TypeReference};

/// Rejects diagrams whose generated code would be ambiguous.
///
/// Implementations stop at the first conflicting state, visiting diagrams in
/// declaration order and states by id.
pub trait Validator {
    fn validate(&self, diagrams: &Diagrams) -> Result<(), ValidationError>;
}

/// Overload signature of a method: `name:param param ...`
pub fn method_signature(
    method: &MethodCall,
    type_signature: impl Fn(&TypeReference) -> String,
) -> String {
    let params: Vec<String> = method
        .params
        .iter()
        .map(|p| parameter_signature(p, &type_signature))
        .collect();
    format!("{}:{}", method.name, params.join(" "))
}

fn parameter_signature(
    parameter: &FormalParameter,
    type_signature: impl Fn(&TypeReference) -> String,
) -> String {
    let mut signature = type_signature(&parameter.ty);
    if parameter.var_args {
        signature.push_str("[]");
    }
    signature
}

/// Conflict error listing `labels` in the given order
pub fn conflict<'a>(labels: impl IntoIterator<Item = &'a Label>) -> ValidationError {
    ValidationError {
        labels: labels.into_iter().map(ToString::to_string).collect(),
    }
}

#[cfg(test)]
mod tests;
