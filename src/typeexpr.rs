//! rust type expressions
//!
//! symbolic model of the types generated code refers to, plus the recursion
//! that maps graphql wrapper chains (NonNull/List) onto it. a type starts
//! nullable, a NonNull wrapper closes that at its own level, and descending
//! into a list element opens it again — list nullability and element
//! nullability are independent.

use crate::error::{Error, Result};
use crate::naming::to_rust_ident;
use crate::registry::ReferenceRegistry;
use crate::schema::SchemaIndex;
use graphql_parser::query::Type;
use graphql_parser::schema::TypeDefinition;
use graphql_parser::Pos;
use std::collections::BTreeMap;
use std::fmt;

/// symbolic rust type expression
///
/// names stay symbolic until rendering so forward references (a collapse
/// pointing at a fragment emitted later) cost nothing to carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// a bare type name
    Name(String),
    /// `Option<inner>`
    Option(Box<TypeExpr>),
    /// `Vec<inner>`
    Vec(Box<TypeExpr>),
}

impl TypeExpr {
    /// bare name expression
    pub fn name(name: impl Into<String>) -> Self {
        TypeExpr::Name(name.into())
    }

    /// render to rust source text
    pub fn render(&self) -> String {
        match self {
            TypeExpr::Name(name) => name.clone(),
            TypeExpr::Option(inner) => format!("Option<{}>", inner.render()),
            TypeExpr::Vec(inner) => format!("Vec<{}>", inner.render()),
        }
    }

    pub(crate) fn maybe_optional(self, nullable: bool) -> Self {
        if nullable {
            TypeExpr::Option(Box::new(self))
        } else {
            self
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// graphql scalar name to rust type mapping
#[derive(Debug, Clone, Default)]
pub struct ScalarMap {
    overrides: BTreeMap<String, String>,
}

impl ScalarMap {
    /// mapping with per-schema overrides for custom scalars
    pub fn new(overrides: BTreeMap<String, String>) -> Self {
        Self { overrides }
    }

    /// true for the five built-in graphql scalars
    pub fn is_builtin(name: &str) -> bool {
        matches!(name, "String" | "ID" | "Int" | "Float" | "Boolean")
    }

    /// true when a custom scalar has a configured rust type
    pub fn has_override(&self, name: &str) -> bool {
        self.overrides.contains_key(name)
    }

    /// rust type for a graphql scalar name
    ///
    /// custom scalars without an override resolve to their generated alias
    /// name; the alias itself is emitted by the types renderer.
    pub fn resolve(&self, name: &str) -> String {
        if let Some(mapped) = self.overrides.get(name) {
            return mapped.clone();
        }
        match name {
            "String" | "ID" => "String".to_string(),
            "Int" => "i64".to_string(),
            "Float" => "f64".to_string(),
            "Boolean" => "bool".to_string(),
            custom => to_rust_ident(custom),
        }
    }
}

/// resolve a variable-position type node to a rust type expression
///
/// only scalars, enums, and input objects are legal at the named terminal;
/// anything else is an [`Error::UnknownType`]. every named type touched is
/// registered.
pub fn variable_type(
    ty: &Type<'static, String>,
    position: Pos,
    schema: &SchemaIndex,
    scalars: &ScalarMap,
    registry: &mut ReferenceRegistry,
) -> Result<TypeExpr> {
    variable_type_inner(ty, position, schema, scalars, registry, true)
}

fn variable_type_inner(
    ty: &Type<'static, String>,
    position: Pos,
    schema: &SchemaIndex,
    scalars: &ScalarMap,
    registry: &mut ReferenceRegistry,
    nullable: bool,
) -> Result<TypeExpr> {
    match ty {
        Type::NonNullType(inner) => {
            variable_type_inner(inner, position, schema, scalars, registry, false)
        }
        Type::ListType(inner) => {
            let element = variable_type_inner(inner, position, schema, scalars, registry, true)?;
            Ok(TypeExpr::Vec(Box::new(element)).maybe_optional(nullable))
        }
        Type::NamedType(name) => {
            if ScalarMap::is_builtin(name) {
                registry.register_scalar(name.clone());
                return Ok(TypeExpr::name(scalars.resolve(name)).maybe_optional(nullable));
            }
            let expr = match schema.get_type(name) {
                Some(TypeDefinition::Scalar(scalar)) => {
                    registry.register_scalar(scalar.name.clone());
                    TypeExpr::name(scalars.resolve(&scalar.name))
                }
                Some(TypeDefinition::Enum(enum_ty)) => {
                    registry.register_enum(enum_ty.name.clone());
                    TypeExpr::name(to_rust_ident(&enum_ty.name))
                }
                Some(TypeDefinition::InputObject(_)) => {
                    register_input_closure(name, schema, registry);
                    TypeExpr::name(to_rust_ident(name))
                }
                _ => {
                    return Err(Error::UnknownType {
                        name: name.clone(),
                        position,
                    })
                }
            };
            Ok(expr.maybe_optional(nullable))
        }
    }
}

/// resolve an output-position type node to a rust type expression
///
/// `overwrite_final` swaps the named terminal for another type while keeping
/// the Option/Vec chain intact; collapse uses this to forward a field's
/// wrapper structure onto a fragment struct or a synthesized nested type.
pub fn output_type(
    ty: &Type<'static, String>,
    position: Pos,
    schema: &SchemaIndex,
    scalars: &ScalarMap,
    registry: &mut ReferenceRegistry,
    overwrite_final: Option<&str>,
) -> Result<TypeExpr> {
    output_type_inner(
        ty,
        position,
        schema,
        scalars,
        registry,
        overwrite_final,
        true,
    )
}

fn output_type_inner(
    ty: &Type<'static, String>,
    position: Pos,
    schema: &SchemaIndex,
    scalars: &ScalarMap,
    registry: &mut ReferenceRegistry,
    overwrite_final: Option<&str>,
    nullable: bool,
) -> Result<TypeExpr> {
    match ty {
        Type::NonNullType(inner) => output_type_inner(
            inner,
            position,
            schema,
            scalars,
            registry,
            overwrite_final,
            false,
        ),
        Type::ListType(inner) => {
            let element = output_type_inner(
                inner,
                position,
                schema,
                scalars,
                registry,
                overwrite_final,
                true,
            )?;
            Ok(TypeExpr::Vec(Box::new(element)).maybe_optional(nullable))
        }
        Type::NamedType(name) => {
            if let Some(final_name) = overwrite_final {
                return Ok(TypeExpr::name(final_name).maybe_optional(nullable));
            }
            if ScalarMap::is_builtin(name) {
                registry.register_scalar(name.clone());
                return Ok(TypeExpr::name(scalars.resolve(name)).maybe_optional(nullable));
            }
            let expr = match schema.get_type(name) {
                Some(TypeDefinition::Scalar(scalar)) => {
                    registry.register_scalar(scalar.name.clone());
                    TypeExpr::name(scalars.resolve(&scalar.name))
                }
                Some(TypeDefinition::Enum(enum_ty)) => {
                    registry.register_enum(enum_ty.name.clone());
                    TypeExpr::name(to_rust_ident(&enum_ty.name))
                }
                Some(TypeDefinition::Object(_))
                | Some(TypeDefinition::Interface(_))
                | Some(TypeDefinition::Union(_)) => {
                    registry.register_type(name.clone());
                    TypeExpr::name(to_rust_ident(name))
                }
                _ => {
                    return Err(Error::UnknownType {
                        name: name.clone(),
                        position,
                    })
                }
            };
            Ok(expr.maybe_optional(nullable))
        }
    }
}

/// register an input object and everything its fields reach
///
/// inputs are constructed by callers, so unlike output objects the whole
/// reachable input graph must be generated. registry membership doubles as
/// the visited set, which keeps cyclic inputs from recursing forever.
fn register_input_closure(name: &str, schema: &SchemaIndex, registry: &mut ReferenceRegistry) {
    if registry.inputs().contains(name) {
        return;
    }
    registry.register_input(name.to_string());

    let Some(TypeDefinition::InputObject(input)) = schema.get_type(name) else {
        return;
    };
    for field in &input.fields {
        let terminal = named_terminal(&field.value_type);
        if ScalarMap::is_builtin(terminal) {
            registry.register_scalar(terminal.to_string());
            continue;
        }
        match schema.get_type(terminal) {
            Some(TypeDefinition::Scalar(scalar)) => {
                let scalar_name = scalar.name.clone();
                registry.register_scalar(scalar_name);
            }
            Some(TypeDefinition::Enum(enum_ty)) => {
                let enum_name = enum_ty.name.clone();
                registry.register_enum(enum_name);
            }
            Some(TypeDefinition::InputObject(_)) => {
                let input_name = terminal.to_string();
                register_input_closure(&input_name, schema, registry);
            }
            _ => {}
        }
    }
}

/// innermost named type of a wrapper chain
pub fn named_terminal<'t>(ty: &'t Type<'static, String>) -> &'t str {
    match ty {
        Type::NamedType(name) => name,
        Type::ListType(inner) | Type::NonNullType(inner) => named_terminal(inner),
    }
}
