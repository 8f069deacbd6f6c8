//! Typed AST for grammar files
//!
//! One [`Declaration`] per rule. Bodies are binary [`Expr`] trees; lists
//! (parameters, type parameters, type arguments) are ordered containers whose
//! `Display` joins the items with a fixed separator. Every node keeps the
//! [`Range`] it was parsed from, for diagnostics.

use std::fmt;

use crate::base::{Name, Range};

/// Join displayable items with a separator.
pub fn join<T: fmt::Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

/// An identifier together with where it was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: Name,
    pub range: Range,
}

impl Ident {
    pub fn new(name: impl Into<Name>, range: Range) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A whole grammar file: declarations in source order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grammar {
    pub declarations: Vec<Declaration>,
}

impl Grammar {
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name.as_str() == name)
    }
}

/// `Name[T, ...]: body;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: Ident,
    pub type_params: TypeParameters,
    /// `None` for an empty body (`Foo: ;`)
    pub body: Option<Expr>,
}

/// `T` or `T extends Bound`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: Ident,
    pub bound: Option<TypeReference>,
}

impl TypeParameter {
    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }
}

impl fmt::Display for TypeParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(bound) = &self.bound {
            write!(f, " extends {bound}")?;
        }
        Ok(())
    }
}

/// Type parameters of a declaration or method, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeParameters(pub Vec<TypeParameter>);

impl TypeParameters {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeParameter> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&TypeParameter> {
        self.0.iter().find(|p| p.as_str() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<Name> {
        self.0.iter().map(|p| p.name.name.clone()).collect()
    }
}

impl fmt::Display for TypeParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", join(&self.0, ", "))
    }
}

/// Rule body expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Sequence(Box<Expr>, Box<Expr>),
    Alternation(Box<Expr>, Box<Expr>),
    Repetition(Repetition),
    Method(MethodCall),
    Reference(TypeReference),
    Group(Box<Expr>),
}

impl Expr {
    pub fn range(&self) -> Range {
        match self {
            Self::Sequence(left, right) | Self::Alternation(left, right) => {
                left.range().cover(right.range())
            }
            Self::Repetition(repetition) => repetition.range,
            Self::Method(method) => method.range,
            Self::Reference(reference) => reference.range,
            Self::Group(inner) => inner.range(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence(left, right) => write!(f, "{left} {right}"),
            Self::Alternation(left, right) => write!(f, "{left} | {right}"),
            Self::Repetition(repetition) => write!(f, "{repetition}"),
            Self::Method(method) => write!(f, "{method}"),
            Self::Reference(reference) => write!(f, "{reference}"),
            Self::Group(inner) => write!(f, "({inner})"),
        }
    }
}

/// `inner?`, `inner*` or `inner+`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repetition {
    pub inner: Box<Expr>,
    pub min: u32,
    /// `None` means unbounded
    pub max: Option<u32>,
    pub range: Range,
}

impl Repetition {
    pub fn is_optional(&self) -> bool {
        self.min == 0 && self.max == Some(1)
    }

    pub fn operator(&self) -> char {
        match (self.min, self.max) {
            (0, Some(1)) => '?',
            (0, None) => '*',
            _ => '+',
        }
    }
}

impl fmt::Display for Repetition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.inner, self.operator())
    }
}

/// `name[S, ...](Type name, ...) throws E, ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub name: Ident,
    pub type_params: TypeParameters,
    pub params: FormalParameters,
    /// Declared exceptions; not part of the overload signature
    pub throws: Vec<TypeReference>,
    pub range: Range,
}

impl fmt::Display for MethodCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.type_params.is_empty() {
            write!(f, "{}", self.type_params)?;
        }
        write!(f, "({})", self.params)?;
        if !self.throws.is_empty() {
            write!(f, " throws {}", join(&self.throws, ", "))?;
        }
        Ok(())
    }
}

/// Formal parameter list of a method, in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormalParameters(pub Vec<FormalParameter>);

impl FormalParameters {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FormalParameter> {
        self.0.iter()
    }
}

impl fmt::Display for FormalParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.0, ", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalParameter {
    pub ty: TypeReference,
    pub var_args: bool,
    pub name: Option<Ident>,
}

impl fmt::Display for FormalParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)?;
        if self.var_args {
            f.write_str("...")?;
        }
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        Ok(())
    }
}

/// Dotted type name such as `java.util.List`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName(pub Vec<Ident>);

impl QualifiedName {
    /// The name itself when it has a single segment
    pub fn simple(&self) -> Option<&Ident> {
        match self.0.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn last(&self) -> Option<&Ident> {
        self.0.last()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.0, "."))
    }
}

/// What a [`TypeReference`] was resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Referent {
    /// Another rule of the same grammar
    Declaration(Name),
    /// A type parameter in scope
    TypeParameter(ParamScope),
}

/// Where a referenced type parameter is declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamScope {
    Declaration,
    Method,
}

/// `a.b.Name<Args>[]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    pub name: QualifiedName,
    pub args: Vec<TypeArgument>,
    pub is_array: bool,
    pub range: Range,
    /// Filled in once all declarations are known; `None` for external types
    pub referent: Option<Referent>,
}

impl TypeReference {
    /// The declaration this reference names, if any
    pub fn declaration(&self) -> Option<&Name> {
        match &self.referent {
            Some(Referent::Declaration(name)) => Some(name),
            _ => None,
        }
    }

    pub fn is_type_parameter(&self) -> bool {
        matches!(self.referent, Some(Referent::TypeParameter(_)))
    }

    /// Visit this reference and every reference nested in its arguments.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut TypeReference)) {
        f(self);
        for arg in &mut self.args {
            match arg {
                TypeArgument::Type(ty) => ty.walk_mut(f),
                TypeArgument::Wildcard(Some((_, bound))) => bound.walk_mut(f),
                TypeArgument::Wildcard(None) => {}
            }
        }
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<{}>", join(&self.args, ", "))?;
        }
        if self.is_array {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardBound {
    Extends,
    Super,
}

impl fmt::Display for WildcardBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extends => f.write_str("extends"),
            Self::Super => f.write_str("super"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    Type(TypeReference),
    /// `?`, `? extends T` or `? super T`
    Wildcard(Option<(WildcardBound, Box<TypeReference>)>),
}

impl fmt::Display for TypeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(ty) => write!(f, "{ty}"),
            Self::Wildcard(None) => f.write_str("?"),
            Self::Wildcard(Some((bound, ty))) => write!(f, "? {bound} {ty}"),
        }
    }
}
