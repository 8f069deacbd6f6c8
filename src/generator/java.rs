//! Java interfaces, one file per artifact.
//!
//! Layout: `<lowercase name>/<Name>.java` for the root and
//! `<lowercase name>/<Name>State<id>.java` for states. References to other
//! rules are package-qualified so no imports are needed.

use std::fmt::Write as _;
use std::path::PathBuf;

use super::{Artifact, ArtifactKind, Backend, Operation, Returns};
use crate::diagram::StateId;
use crate::parser::{
    FormalParameter, Referent, TypeArgument, TypeParameters, TypeReference, join,
};

const INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, Default)]
pub struct JavaBackend;

impl Backend for JavaBackend {
    fn path(&self, diagram: &str, state: Option<StateId>) -> PathBuf {
        PathBuf::from(package(diagram)).join(format!("{}.java", type_name(diagram, state)))
    }

    fn render(&self, artifact: &Artifact<'_>) -> String {
        let diagram = artifact.diagram;
        let name = diagram.name();
        let params = type_parameters(diagram.type_params());
        let args = type_arguments(diagram.type_params());

        let mut out = String::new();
        let _ = writeln!(out, "package {};", package(name));
        out.push('\n');

        match artifact.kind {
            ArtifactKind::Root { entry } => {
                let _ = write!(out, "public interface {name}{params}");
                if let Some(entry) = entry {
                    let _ = write!(out, " extends {}{args}", type_name(name, Some(entry)));
                }
                out.push_str(" {}\n");
            }
            ArtifactKind::State(id) => {
                let _ = writeln!(out, "public interface {}{params} {{", type_name(name, Some(id)));
                for operation in &artifact.operations {
                    out.push('\n');
                    let _ = writeln!(out, "{INDENT}{};", signature(name, &args, operation));
                }
                out.push_str("}\n");
            }
        }
        out
    }
}

fn package(diagram: &str) -> String {
    diagram.to_lowercase()
}

fn type_name(diagram: &str, state: Option<StateId>) -> String {
    match state {
        None => diagram.to_string(),
        Some(id) => format!("{diagram}State{id}"),
    }
}

/// `<T extends Bound, U>` as declared, or nothing
fn type_parameters(params: &TypeParameters) -> String {
    if params.is_empty() {
        return String::new();
    }
    let params: Vec<String> = params
        .iter()
        .map(|param| match &param.bound {
            Some(bound) => format!("{} extends {}", param.name, java_type(bound)),
            None => param.name.to_string(),
        })
        .collect();
    format!("<{}>", params.join(", "))
}

/// `<T, U>` as used, or nothing
fn type_arguments(params: &TypeParameters) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("<{}>", join(&params.names(), ", "))
    }
}

fn signature(diagram: &str, diagram_args: &str, operation: &Operation<'_>) -> String {
    match operation {
        Operation::Delegate { reference } => {
            format!("{} {}()", java_type(reference), operation.name())
        }
        Operation::Method { method, returns } => {
            let returns = match returns {
                Returns::State(id) => format!("{}{diagram_args}", type_name(diagram, Some(*id))),
                Returns::Type(ty) => java_type(ty),
                Returns::Void => "void".to_string(),
            };
            let generics = if method.type_params.is_empty() {
                String::new()
            } else {
                format!("{} ", type_parameters(&method.type_params))
            };
            let params: Vec<String> = method
                .params
                .iter()
                .enumerate()
                .map(|(index, param)| parameter(index, param))
                .collect();
            let mut signature =
                format!("{generics}{returns} {}({})", method.name, params.join(", "));
            if !method.throws.is_empty() {
                let thrown: Vec<String> = method.throws.iter().map(java_type).collect();
                let _ = write!(signature, " throws {}", thrown.join(", "));
            }
            signature
        }
    }
}

fn parameter(index: usize, param: &FormalParameter) -> String {
    let dots = if param.var_args { "..." } else { "" };
    let name = match &param.name {
        Some(name) => name.to_string(),
        None => format!("arg{index}"),
    };
    format!("{}{dots} {name}", java_type(&param.ty))
}

/// Java spelling of a type; rule references become package-qualified
fn java_type(ty: &TypeReference) -> String {
    let mut out = match &ty.referent {
        Some(Referent::Declaration(name)) => format!("{}.{name}", package(name)),
        _ => ty.name.to_string(),
    };
    if !ty.args.is_empty() {
        let args: Vec<String> = ty.args.iter().map(java_type_argument).collect();
        let _ = write!(out, "<{}>", args.join(", "));
    }
    if ty.is_array {
        out.push_str("[]");
    }
    out
}

fn java_type_argument(arg: &TypeArgument) -> String {
    match arg {
        TypeArgument::Type(ty) => java_type(ty),
        TypeArgument::Wildcard(None) => "?".to_string(),
        TypeArgument::Wildcard(Some((bound, ty))) => format!("? {bound} {}", java_type(ty)),
    }
}
