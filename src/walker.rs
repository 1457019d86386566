//! selection walking
//!
//! recursive reference collection over executable documents. every named
//! type a document reaches lands in the reference registry exactly once;
//! fragment spreads register and stop, so cyclic fragment definitions cannot
//! keep the walk alive.

use crate::documents::DocumentSet;
use crate::error::{Error, Result};
use crate::registry::ReferenceRegistry;
use crate::schema::SchemaIndex;
use crate::typeexpr::{variable_type, ScalarMap};
use graphql_parser::query::{Field, Selection, Type, TypeCondition};
use graphql_parser::schema::TypeDefinition;
use graphql_parser::Pos;

/// collect every named type reachable from a document set into a fresh
/// registry
///
/// fragments are walked against their type condition, operation variables go
/// through the variable-position recursion, and operation selections are
/// walked against the matching root type. fails fast on the first
/// unresolvable type or field.
pub fn collect_references(
    documents: &DocumentSet,
    schema: &SchemaIndex,
    scalars: &ScalarMap,
) -> Result<ReferenceRegistry> {
    let mut registry = ReferenceRegistry::new();

    for fragment in documents.fragments() {
        walk_named(
            fragment.type_condition(),
            fragment.position(),
            &fragment.selection_set().items,
            schema,
            &mut registry,
        )?;
    }

    for operation in documents.operations() {
        let root = schema.root_type(operation.kind())?;

        for variable in operation.variable_definitions() {
            variable_type(
                &variable.var_type,
                variable.position,
                schema,
                scalars,
                &mut registry,
            )?;
        }

        walk_children(&operation.selection_set().items, root, schema, &mut registry)?;
    }

    Ok(registry)
}

/// walk one field selection against its declared type
///
/// unwraps NonNull/List wrappers one recursive call per layer, then
/// dispatches on the kind of the named terminal.
pub fn walk_field(
    field: &Field<'static, String>,
    declared: &Type<'static, String>,
    schema: &SchemaIndex,
    registry: &mut ReferenceRegistry,
) -> Result<()> {
    match declared {
        Type::NonNullType(inner) | Type::ListType(inner) => {
            walk_field(field, inner, schema, registry)
        }
        Type::NamedType(name) => walk_named(
            name,
            field.position,
            &field.selection_set.items,
            schema,
            registry,
        ),
    }
}

fn walk_named(
    name: &str,
    position: Pos,
    selections: &[Selection<'static, String>],
    schema: &SchemaIndex,
    registry: &mut ReferenceRegistry,
) -> Result<()> {
    if ScalarMap::is_builtin(name) {
        registry.register_scalar(name.to_string());
        return Ok(());
    }

    match schema.get_type(name) {
        Some(parent @ TypeDefinition::Object(_)) | Some(parent @ TypeDefinition::Interface(_)) => {
            registry.register_type(name.to_string());
            walk_children(selections, parent, schema, registry)
        }
        Some(TypeDefinition::Union(_)) => {
            registry.register_type(name.to_string());
            walk_union_children(selections, schema, registry)
        }
        Some(TypeDefinition::Scalar(scalar)) => {
            registry.register_scalar(scalar.name.clone());
            Ok(())
        }
        Some(TypeDefinition::Enum(enum_ty)) => {
            registry.register_enum(enum_ty.name.clone());
            Ok(())
        }
        // input objects in output position, or names the schema cannot
        // resolve, have no selection semantics
        _ => Err(Error::UnknownType {
            name: name.to_string(),
            position,
        }),
    }
}

/// walk the children of an object or interface selection
///
/// direct fields recurse against their declared types, fragment spreads
/// register and stop, inline fragments re-resolve their type condition.
/// `__typename` is a no-op everywhere.
fn walk_children(
    selections: &[Selection<'static, String>],
    parent: &TypeDefinition<'static, String>,
    schema: &SchemaIndex,
    registry: &mut ReferenceRegistry,
) -> Result<()> {
    for selection in selections {
        match selection {
            Selection::Field(field) if field.name == "__typename" => {}
            Selection::Field(field) => {
                let definition = schema
                    .field_definition(parent, &field.name)
                    .ok_or_else(|| Error::UnknownField {
                        field: field.name.clone(),
                        parent: type_name(parent).to_string(),
                        position: field.position,
                    })?;
                walk_field(field, &definition.field_type, schema, registry)?;
            }
            Selection::FragmentSpread(spread) => {
                registry.register_fragment(spread.fragment_name.clone());
            }
            Selection::InlineFragment(inline) => match &inline.type_condition {
                Some(TypeCondition::On(condition)) => {
                    walk_named(
                        condition,
                        inline.position,
                        &inline.selection_set.items,
                        schema,
                        registry,
                    )?;
                }
                // no condition: the selections apply to the enclosing type
                None => {
                    walk_children(&inline.selection_set.items, parent, schema, registry)?;
                }
            },
        }
    }
    Ok(())
}

/// walk the children of a union selection
///
/// unions carry no fields of their own: only spreads and inline fragments
/// are meaningful. a plain field other than `__typename` is invalid input
/// and skipped rather than recovered.
fn walk_union_children(
    selections: &[Selection<'static, String>],
    schema: &SchemaIndex,
    registry: &mut ReferenceRegistry,
) -> Result<()> {
    for selection in selections {
        match selection {
            Selection::Field(_) => {}
            Selection::FragmentSpread(spread) => {
                registry.register_fragment(spread.fragment_name.clone());
            }
            Selection::InlineFragment(inline) => {
                if let Some(TypeCondition::On(condition)) = &inline.type_condition {
                    walk_named(
                        condition,
                        inline.position,
                        &inline.selection_set.items,
                        schema,
                        registry,
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn type_name<'t>(ty: &'t TypeDefinition<'static, String>) -> &'t str {
    match ty {
        TypeDefinition::Scalar(scalar) => &scalar.name,
        TypeDefinition::Object(obj) => &obj.name,
        TypeDefinition::Interface(iface) => &iface.name,
        TypeDefinition::Union(union_ty) => &union_ty.name,
        TypeDefinition::Enum(enum_ty) => &enum_ty.name,
        TypeDefinition::InputObject(input) => &input.name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_parser::parse_schema;

    const SDL: &str = "\
        type Query { pet: Pet search: [SearchResult!] node: Named broken: PetFilter }\n\
        interface Named { name: String! }\n\
        type Pet implements Named { name: String! species: Species owner: Owner }\n\
        type Owner implements Named { name: String! registered: DateTime }\n\
        union SearchResult = Pet | Owner\n\
        enum Species { CAT DOG }\n\
        scalar DateTime\n\
        input PetFilter { name: String }\n";

    fn schema() -> SchemaIndex {
        let doc = parse_schema::<String>(SDL).expect("schema").into_static();
        SchemaIndex::new(&doc)
    }

    fn collect(source: &str) -> Result<ReferenceRegistry> {
        let docs = DocumentSet::parse(source).expect("documents");
        collect_references(&docs, &schema(), &ScalarMap::default())
    }

    #[test]
    fn test_object_selection_registers_transitively() {
        let registry = collect("query GetPet { pet { name species owner { name } } }").unwrap();

        assert!(registry.objects().contains("Pet"));
        assert!(registry.objects().contains("Owner"));
        assert!(registry.enums().contains("Species"));
        assert!(registry.scalars().contains("String"));
    }

    #[test]
    fn test_union_inline_fragments_register_both_conditions() {
        let registry = collect(
            "query Search { search { __typename ... on Pet { name species } ... on Owner { name } } }",
        )
        .unwrap();

        assert!(registry.objects().contains("SearchResult"));
        assert!(registry.objects().contains("Pet"));
        assert!(registry.objects().contains("Owner"));
        assert!(registry.enums().contains("Species"));
        // both branches touch String; the set holds it once
        assert_eq!(
            registry.scalars().iter().filter(|s| *s == "String").count(),
            1
        );
    }

    #[test]
    fn test_fragment_spread_registers_and_stops() {
        let registry = collect("query GetPet { pet { ...PetFields } }").unwrap();

        assert!(registry.fragments().contains("PetFields"));
        // the spread alone says nothing about what the fragment touches
        assert!(!registry.enums().contains("Species"));
    }

    #[test]
    fn test_fragment_definitions_are_walked() {
        let registry = collect(
            "query GetPet { pet { ...PetFields } }\n\
             fragment PetFields on Pet { name species }",
        )
        .unwrap();

        assert!(registry.fragments().contains("PetFields"));
        assert!(registry.objects().contains("Pet"));
        assert!(registry.enums().contains("Species"));
    }

    #[test]
    fn test_interface_selection_mixes_all_child_kinds() {
        let registry = collect(
            "query GetNode { node { name ...NamedBits ... on Owner { registered } } }\n\
             fragment NamedBits on Named { name }",
        )
        .unwrap();

        assert!(registry.objects().contains("Named"));
        assert!(registry.objects().contains("Owner"));
        assert!(registry.fragments().contains("NamedBits"));
        assert!(registry.scalars().contains("DateTime"));
    }

    #[test]
    fn test_typename_registers_nothing() {
        let registry = collect("query GetPet { pet { __typename name } }").unwrap();

        assert!(!registry.objects().contains("__typename"));
        assert!(!registry.scalars().contains("__typename"));
    }

    #[test]
    fn test_unhandled_kind_in_output_position_fails() {
        // the schema is taken at face value; a field declared with an input
        // object type has no selection semantics and fails with the
        // offending node's position
        let err = collect("query Broken { broken { name } }").unwrap_err();
        match err {
            Error::UnknownType { name, position } => {
                assert_eq!(name, "PetFilter");
                assert!(position.line >= 1);
            }
            other => panic!("expected UnknownType, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_field_fails() {
        let err = collect("query GetPet { pet { wings } }").unwrap_err();
        assert!(
            matches!(err, Error::UnknownField { field, parent, .. } if field == "wings" && parent == "Pet")
        );
    }

    #[test]
    fn test_cyclic_fragments_terminate() {
        // each spread registers and stops, so mutual recursion is inert
        let registry = collect(
            "query GetPet { pet { ...A } }\n\
             fragment A on Pet { name ...B }\n\
             fragment B on Pet { species ...A }",
        )
        .unwrap();

        assert!(registry.fragments().contains("A"));
        assert!(registry.fragments().contains("B"));
    }

    #[test]
    fn test_variables_are_resolved() {
        let docs = DocumentSet::parse(
            "query Search($species: Species, $after: DateTime) { search { ... on Pet { name } } }",
        )
        .unwrap();
        let registry = collect_references(&docs, &schema(), &ScalarMap::default()).unwrap();

        assert!(registry.enums().contains("Species"));
        assert!(registry.scalars().contains("DateTime"));
    }

    #[test]
    fn test_unknown_variable_type_fails() {
        let docs =
            DocumentSet::parse("query Search($filter: Pet) { search { ... on Pet { name } } }")
                .unwrap();
        let err = collect_references(&docs, &schema(), &ScalarMap::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownType { name, .. } if name == "Pet"));
    }
}
