//! collapse resolution
//!
//! an operation whose root selects exactly one field does not always need a
//! synthesized wrapper in the function signature: a leaf field returns its
//! own type, a lone fragment spread forwards to the fragment's struct, and
//! plain nested fields get a freshly named nested type. everything else
//! keeps the operation wrapper.

use crate::documents::OperationDef;
use crate::error::{Error, Result};
use crate::naming::{capitalize, to_rust_ident};
use crate::registry::ReferenceRegistry;
use crate::schema::SchemaIndex;
use crate::typeexpr::{output_type, ScalarMap, TypeExpr};
use graphql_parser::query::{Field, Selection};

/// true iff the operation's root selection set holds exactly one selection
///
/// an operation without any selection is malformed and fails the
/// precondition outright.
pub fn is_collapsable(op: &OperationDef) -> Result<bool> {
    let items = &op.selection_set().items;
    if items.is_empty() {
        return Err(Error::MalformedSelection {
            operation: op.name().to_string(),
            position: op.position(),
        });
    }
    Ok(items.len() == 1)
}

/// generated wrapper type name for an operation
pub fn operation_type_name(op: &OperationDef) -> String {
    to_rust_ident(op.name())
}

/// how one operation's return shape resolves
#[derive(Debug, Clone)]
pub(crate) enum Collapse<'a> {
    /// keep the operation wrapper
    Off,
    /// sole field with no sub-selection: forward the field's own type
    Leaf { field: &'a Field<'static, String> },
    /// sole field whose only child is a fragment spread: forward to the
    /// fragment's generated struct (may be defined later in output order)
    Fragment {
        field: &'a Field<'static, String>,
        fragment: String,
    },
    /// sole field with plain nested selections: synthesize a nested type
    Nested {
        field: &'a Field<'static, String>,
        type_name: String,
    },
}

impl<'a> Collapse<'a> {
    /// the sole root field, when collapsing
    pub(crate) fn field(&self) -> Option<&'a Field<'static, String>> {
        match self {
            Collapse::Off => None,
            Collapse::Leaf { field }
            | Collapse::Fragment { field, .. }
            | Collapse::Nested { field, .. } => Some(field),
        }
    }
}

/// resolve the collapse shape for an operation
///
/// with collapsing disabled the precondition is not checked, mirroring the
/// short-circuit in the configuration flag upstream. a sole selection that
/// is not a plain field keeps the wrapper.
pub(crate) fn resolve_collapse<'a>(op: &'a OperationDef, collapse: bool) -> Result<Collapse<'a>> {
    if !collapse || !is_collapsable(op)? {
        return Ok(Collapse::Off);
    }

    let Selection::Field(field) = &op.selection_set().items[0] else {
        return Ok(Collapse::Off);
    };

    if field.selection_set.items.is_empty() {
        return Ok(Collapse::Leaf { field });
    }

    if let [Selection::FragmentSpread(spread)] = &field.selection_set.items[..] {
        return Ok(Collapse::Fragment {
            field,
            fragment: to_rust_ident(&spread.fragment_name),
        });
    }

    let label = field.alias.as_ref().unwrap_or(&field.name);
    Ok(Collapse::Nested {
        field,
        type_name: format!("{}{}", operation_type_name(op), capitalize(label)),
    })
}

/// type of the collapsed root field, wrapper chain included
///
/// used both for the function return type and for the field on the
/// operation's response struct, so the two always match.
pub(crate) fn collapsed_field_type(
    shape: &Collapse<'_>,
    op: &OperationDef,
    schema: &SchemaIndex,
    scalars: &ScalarMap,
    registry: &mut ReferenceRegistry,
) -> Result<TypeExpr> {
    let field = shape.field().expect("collapsed shape carries a field");
    let root = schema.root_type(op.kind())?;
    let root_name = match root {
        graphql_parser::schema::TypeDefinition::Object(obj) => obj.name.clone(),
        _ => capitalize(op.kind().as_str()),
    };
    let definition =
        schema
            .field_definition(root, &field.name)
            .ok_or_else(|| Error::UnknownField {
                field: field.name.clone(),
                parent: root_name,
                position: field.position,
            })?;

    let overwrite = match shape {
        Collapse::Off | Collapse::Leaf { .. } => None,
        Collapse::Fragment { fragment, .. } => Some(fragment.as_str()),
        Collapse::Nested { type_name, .. } => Some(type_name.as_str()),
    };

    output_type(
        &definition.field_type,
        field.position,
        schema,
        scalars,
        registry,
        overwrite,
    )
}

/// resolve the return type for an operation under a collapse decision
pub fn return_type(
    op: &OperationDef,
    schema: &SchemaIndex,
    scalars: &ScalarMap,
    registry: &mut ReferenceRegistry,
    collapse: bool,
) -> Result<TypeExpr> {
    match resolve_collapse(op, collapse)? {
        Collapse::Off => Ok(TypeExpr::name(operation_type_name(op))),
        shape => collapsed_field_type(&shape, op, schema, scalars, registry),
    }
}

/// docstring projection of [`return_type`]
///
/// rendered from the same expression, so the two projections cannot
/// diverge.
pub fn return_type_label(
    op: &OperationDef,
    schema: &SchemaIndex,
    scalars: &ScalarMap,
    registry: &mut ReferenceRegistry,
    collapse: bool,
) -> Result<String> {
    return_type(op, schema, scalars, registry, collapse).map(|expr| expr.render())
}
