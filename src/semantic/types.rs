//! The declared-type model.
//!
//! Types are either numbers (with a stored byte size) or structures (whose
//! size is the sum of their resolved field sizes). A [`TypeRef`] starts
//! life as a name and is bound to a shared [`TypeInfo`] during module
//! resolution; querying the size of a structure whose fields are still
//! unresolved is a logic error and panics rather than returning zero.

use std::rc::Rc;

use crate::ast::{Expr, FunctionDeclaration, StatementList, SubDeclaration, VariableDeclaration};
use crate::lexer::Token;

/// Symbol visibility.
///
/// The grammar does not currently spell visibility, so user declarations
/// carry [`Visibility::Default`] and resolve against a context-supplied
/// default; the builtin types are [`Visibility::Public`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
    Default,
}

impl Visibility {
    /// Replaces [`Visibility::Default`] with the given default.
    pub fn resolve(self, default: Visibility) -> Visibility {
        debug_assert!(default != Visibility::Default);

        if self == Visibility::Default {
            default
        } else {
            self
        }
    }
}

/// The shape of a numeric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberInfo {
    /// Whether values are signed.
    pub is_signed: bool,
    /// Whether values are floating point.
    pub is_floating_point: bool,
    /// Storage size in bytes.
    pub size: usize,
}

/// One resolved-or-pending structure field.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// The field's name.
    pub name: String,
    /// The field's type; [`TypeRef::Named`] until resolution.
    pub type_ref: TypeRef,
    /// Byte offset within the structure; computed during resolution.
    pub offset: usize,
    /// Optional field initializer.
    pub initializer: Option<Expr>,
}

/// The shape of a structure type.
#[derive(Debug, Clone)]
pub struct StructureInfo {
    /// Fields in declaration order.
    pub fields: Vec<FieldInfo>,
}

/// What a type is: a number or a structure.
#[derive(Debug, Clone)]
pub enum TypeExtra {
    Number(NumberInfo),
    Structure(StructureInfo),
}

/// A declared type.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    /// The type's name.
    pub name: String,
    /// The type's shape.
    pub extra: TypeExtra,
    /// The type's visibility.
    pub visibility: Visibility,
}

impl TypeInfo {
    /// Creates a numeric type.
    pub fn number(
        name: impl Into<String>,
        is_signed: bool,
        is_floating_point: bool,
        size: usize,
        visibility: Visibility,
    ) -> Self {
        Self {
            name: name.into(),
            extra: TypeExtra::Number(NumberInfo {
                is_signed,
                is_floating_point,
                size,
            }),
            visibility,
        }
    }

    /// Creates a structure type from declared members, with every field
    /// left unresolved.
    pub fn structure(name: impl Into<String>, members: &[VariableDeclaration]) -> Self {
        let fields = members
            .iter()
            .map(|member| FieldInfo {
                name: member.name.text.clone(),
                type_ref: TypeRef::Named(member.type_name.clone()),
                offset: 0,
                initializer: member.initializer.clone(),
            })
            .collect();

        Self {
            name: name.into(),
            extra: TypeExtra::Structure(StructureInfo { fields }),
            visibility: Visibility::Default,
        }
    }

    /// Returns the numeric shape, if this is a number type.
    pub fn as_number(&self) -> Option<&NumberInfo> {
        match &self.extra {
            TypeExtra::Number(info) => Some(info),
            TypeExtra::Structure(_) => None,
        }
    }

    /// Returns true once every field (for structures) is bound to a
    /// resolved type.
    pub fn is_fully_resolved(&self) -> bool {
        match &self.extra {
            TypeExtra::Number(_) => true,
            TypeExtra::Structure(info) => {
                info.fields.iter().all(|field| field.type_ref.is_resolved())
            }
        }
    }

    /// The type's size in bytes.
    ///
    /// # Panics
    ///
    /// Panics if a structure field is still unresolved; sizes must only be
    /// queried after resolution.
    pub fn size(&self) -> usize {
        match &self.extra {
            TypeExtra::Number(info) => info.size,
            TypeExtra::Structure(info) => info
                .fields
                .iter()
                .map(|field| match &field.type_ref {
                    TypeRef::Resolved(resolved) => resolved.size(),
                    TypeRef::Named(_) => panic!(
                        "size of {} queried before field {} was resolved",
                        self.name, field.name
                    ),
                })
                .sum(),
        }
    }
}

/// A reference to a type, by name until resolution binds it.
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// Not yet resolved; the token names the type and locates the
    /// reference for error reporting.
    Named(Token),
    /// Bound to a resolved type.
    Resolved(Rc<TypeInfo>),
}

impl TypeRef {
    /// The referenced type's name.
    pub fn name(&self) -> &str {
        match self {
            TypeRef::Named(token) => &token.text,
            TypeRef::Resolved(info) => &info.name,
        }
    }

    /// Returns the resolved type, if bound.
    pub fn resolved(&self) -> Option<&Rc<TypeInfo>> {
        match self {
            TypeRef::Named(_) => None,
            TypeRef::Resolved(info) => Some(info),
        }
    }

    /// Returns true once bound to a resolved type.
    pub fn is_resolved(&self) -> bool {
        matches!(self, TypeRef::Resolved(_))
    }
}

/// One declared sub or function parameter.
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    /// The parameter's name.
    pub name: String,
    /// The parameter's type.
    pub type_ref: TypeRef,
    /// Optional default value.
    pub initializer: Option<Expr>,
}

impl ParameterInfo {
    fn from_declaration(declaration: &VariableDeclaration) -> Self {
        Self {
            name: declaration.name.text.clone(),
            type_ref: TypeRef::Named(declaration.type_name.clone()),
            initializer: declaration.initializer.clone(),
        }
    }
}

/// A declared sub.
#[derive(Debug, Clone)]
pub struct SubInfo {
    /// The sub's name.
    pub name: String,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterInfo>,
    /// The sub's visibility.
    pub visibility: Visibility,
    /// The sub's body, lowered by the backend.
    pub body: StatementList,
}

impl SubInfo {
    /// Wraps a parsed sub declaration.
    pub fn new(declaration: SubDeclaration) -> Self {
        Self {
            name: declaration.name.text.clone(),
            parameters: declaration
                .parameters
                .iter()
                .map(ParameterInfo::from_declaration)
                .collect(),
            visibility: Visibility::Default,
            body: declaration.body,
        }
    }
}

/// A declared function: a sub with a return type.
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    /// The function's name.
    pub name: String,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterInfo>,
    /// The function's visibility.
    pub visibility: Visibility,
    /// The function's body, lowered by the backend.
    pub body: StatementList,
    /// The declared return type.
    pub return_type: TypeRef,
}

impl FunctionInfo {
    /// Wraps a parsed function declaration.
    pub fn new(declaration: FunctionDeclaration) -> Self {
        Self {
            name: declaration.name.text.clone(),
            parameters: declaration
                .parameters
                .iter()
                .map(ParameterInfo::from_declaration)
                .collect(),
            visibility: Visibility::Default,
            body: declaration.body,
            return_type: TypeRef::Named(declaration.return_type),
        }
    }
}
