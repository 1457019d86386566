//! schema index
//!
//! lookup surface over a parsed schema document: named types tagged by kind,
//! operation root types, field definitions on composite types. the index
//! never validates; a name that cannot be resolved simply misses.

use crate::error::{Error, Result};
use graphql_parser::schema::{Definition, Document, Field, TypeDefinition};
use std::collections::BTreeMap;

/// executable operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// keyword form of the kind
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }

    fn default_root(self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
            OperationKind::Subscription => "Subscription",
        }
    }
}

/// index over the named types of one schema document
#[derive(Debug, Clone)]
pub struct SchemaIndex {
    types: BTreeMap<String, TypeDefinition<'static, String>>,
    query_type: Option<String>,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
}

impl SchemaIndex {
    /// build an index from a parsed schema document
    pub fn new(doc: &Document<'static, String>) -> Self {
        let mut types = BTreeMap::new();
        let mut query_type = None;
        let mut mutation_type = None;
        let mut subscription_type = None;

        for def in &doc.definitions {
            match def {
                Definition::TypeDefinition(ty) => {
                    let name = match ty {
                        TypeDefinition::Scalar(scalar) => &scalar.name,
                        TypeDefinition::Object(obj) => &obj.name,
                        TypeDefinition::Interface(iface) => &iface.name,
                        TypeDefinition::Union(union_ty) => &union_ty.name,
                        TypeDefinition::Enum(enum_ty) => &enum_ty.name,
                        TypeDefinition::InputObject(input) => &input.name,
                    };
                    types.insert(name.clone(), ty.clone());
                }
                Definition::SchemaDefinition(schema) => {
                    query_type = schema.query.clone();
                    mutation_type = schema.mutation.clone();
                    subscription_type = schema.subscription.clone();
                }
                _ => {}
            }
        }

        Self {
            types,
            query_type,
            mutation_type,
            subscription_type,
        }
    }

    /// look up a named type definition
    pub fn get_type(&self, name: &str) -> Option<&TypeDefinition<'static, String>> {
        self.types.get(name)
    }

    /// resolve the root object type for an operation kind
    ///
    /// honors an explicit `schema {}` declaration, otherwise falls back to
    /// the conventional `Query`/`Mutation`/`Subscription` names.
    pub fn root_type(&self, kind: OperationKind) -> Result<&TypeDefinition<'static, String>> {
        let declared = match kind {
            OperationKind::Query => self.query_type.as_deref(),
            OperationKind::Mutation => self.mutation_type.as_deref(),
            OperationKind::Subscription => self.subscription_type.as_deref(),
        };
        let name = declared.unwrap_or_else(|| kind.default_root());

        match self.types.get(name) {
            Some(root @ TypeDefinition::Object(_)) => Ok(root),
            Some(_) => Err(Error::Config(format!(
                "{} root type `{}` is not an object type",
                kind.as_str(),
                name
            ))),
            None => Err(Error::Config(format!(
                "schema has no {} root type `{}`",
                kind.as_str(),
                name
            ))),
        }
    }

    /// declared field on an object or interface type
    pub fn field_definition<'s>(
        &self,
        parent: &'s TypeDefinition<'static, String>,
        field_name: &str,
    ) -> Option<&'s Field<'static, String>> {
        let fields = match parent {
            TypeDefinition::Object(obj) => &obj.fields,
            TypeDefinition::Interface(iface) => &iface.fields,
            _ => return None,
        };
        fields.iter().find(|field| field.name == field_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_parser::parse_schema;

    fn index(sdl: &str) -> SchemaIndex {
        let doc = parse_schema::<String>(sdl).expect("schema").into_static();
        SchemaIndex::new(&doc)
    }

    #[test]
    fn test_default_roots() {
        let schema = index(
            "type Query { ping: String }\n\
             type Mutation { pong: String }",
        );
        assert!(schema.root_type(OperationKind::Query).is_ok());
        assert!(schema.root_type(OperationKind::Mutation).is_ok());
        assert!(schema.root_type(OperationKind::Subscription).is_err());
    }

    #[test]
    fn test_schema_declaration_overrides_roots() {
        let schema = index(
            "schema { query: Root }\n\
             type Root { ping: String }",
        );
        let root = schema.root_type(OperationKind::Query).expect("root");
        match root {
            TypeDefinition::Object(obj) => assert_eq!(obj.name, "Root"),
            other => panic!("expected object root, got {other:?}"),
        }
    }

    #[test]
    fn test_field_definition_on_object_and_interface() {
        let schema = index(
            "type Query { pet: Pet }\n\
             interface Named { name: String }\n\
             type Pet implements Named { name: String legs: Int }",
        );

        let pet = schema.get_type("Pet").expect("pet");
        assert!(schema.field_definition(pet, "legs").is_some());
        assert!(schema.field_definition(pet, "wings").is_none());

        let named = schema.get_type("Named").expect("interface");
        assert!(schema.field_definition(named, "name").is_some());
    }

    #[test]
    fn test_get_type_kinds() {
        let schema = index(
            "type Query { pet: Pet }\n\
             type Pet { name: String }\n\
             enum Species { CAT DOG }\n\
             union Friend = Pet\n\
             scalar DateTime\n\
             input PetFilter { name: String }",
        );
        assert!(matches!(
            schema.get_type("Pet"),
            Some(TypeDefinition::Object(_))
        ));
        assert!(matches!(
            schema.get_type("Species"),
            Some(TypeDefinition::Enum(_))
        ));
        assert!(matches!(
            schema.get_type("Friend"),
            Some(TypeDefinition::Union(_))
        ));
        assert!(matches!(
            schema.get_type("DateTime"),
            Some(TypeDefinition::Scalar(_))
        ));
        assert!(matches!(
            schema.get_type("PetFilter"),
            Some(TypeDefinition::InputObject(_))
        ));
        assert!(schema.get_type("Missing").is_none());
    }
}
