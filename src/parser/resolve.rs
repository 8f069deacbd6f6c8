//! Links type references to the declaration or type parameter they name.

use rustc_hash::FxHashSet;

use super::ast::*;
use crate::base::Name;

/// Fill in [`TypeReference::referent`] everywhere in the grammar.
///
/// Method type parameters shadow declaration type parameters, which shadow
/// rule names. Qualified names never resolve.
pub(crate) fn resolve(grammar: &mut Grammar) {
    let rules: FxHashSet<Name> = grammar
        .declarations
        .iter()
        .map(|d| d.name.name.clone())
        .collect();
    for declaration in &mut grammar.declarations {
        let type_params = declaration.type_params.clone();
        let scope = Scope {
            rules: &rules,
            declaration: &type_params,
            method: None,
        };
        scope.resolve_bounds(&mut declaration.type_params);
        if let Some(body) = &mut declaration.body {
            resolve_expr(body, &scope);
        }
    }
}

struct Scope<'a> {
    rules: &'a FxHashSet<Name>,
    declaration: &'a TypeParameters,
    method: Option<&'a TypeParameters>,
}

impl Scope<'_> {
    fn referent(&self, reference: &TypeReference) -> Option<Referent> {
        let name = reference.name.simple()?.as_str();
        if self.method.is_some_and(|params| params.contains(name)) {
            Some(Referent::TypeParameter(ParamScope::Method))
        } else if self.declaration.contains(name) {
            Some(Referent::TypeParameter(ParamScope::Declaration))
        } else if self.rules.contains(name) {
            Some(Referent::Declaration(Name::new(name)))
        } else {
            None
        }
    }

    fn resolve(&self, reference: &mut TypeReference) {
        reference.walk_mut(&mut |ty: &mut TypeReference| {
            ty.referent = self.referent(ty);
        });
    }

    /// Bounds may name any parameter of the same list
    fn resolve_bounds(&self, params: &mut TypeParameters) {
        for bound in params.0.iter_mut().filter_map(|p| p.bound.as_mut()) {
            self.resolve(bound);
        }
    }
}

fn resolve_expr(expr: &mut Expr, scope: &Scope<'_>) {
    match expr {
        Expr::Sequence(left, right) | Expr::Alternation(left, right) => {
            resolve_expr(left, scope);
            resolve_expr(right, scope);
        }
        Expr::Repetition(repetition) => resolve_expr(&mut repetition.inner, scope),
        Expr::Group(inner) => resolve_expr(inner, scope),
        Expr::Reference(reference) => scope.resolve(reference),
        Expr::Method(method) => {
            let type_params = method.type_params.clone();
            let scope = Scope {
                method: Some(&type_params),
                ..*scope
            };
            scope.resolve_bounds(&mut method.type_params);
            for param in &mut method.params.0 {
                scope.resolve(&mut param.ty);
            }
            for thrown in &mut method.throws {
                scope.resolve(thrown);
            }
        }
    }
}
