//! operation synthesis
//!
//! renders the per-operation output: response structs shaped by the collapse
//! decision, nested structs for collapsed field selections, [`Operation`]
//! impls carrying the executable document text, and async wrapper methods on
//! the generated client extension.
//!
//! [`Operation`]: crate::operation::Operation

use crate::collapse::{collapsed_field_type, operation_type_name, resolve_collapse, Collapse};
use crate::config::GeneratorConfig;
use crate::documents::{DocumentSet, OperationDef};
use crate::error::{Error, Result};
use crate::naming::to_rust_field;
use crate::registry::ReferenceRegistry;
use crate::render::{field_expr, push_struct_field};
use crate::schema::{OperationKind, SchemaIndex};
use crate::typeexpr::{named_terminal, output_type, variable_type, ScalarMap, TypeExpr};
use graphql_parser::query::{Field, Selection, Type};
use graphql_parser::schema::TypeDefinition;

/// render the `operations.rs` module
pub(crate) fn render_operations(
    documents: &DocumentSet,
    schema: &SchemaIndex,
    scalars: &ScalarMap,
    config: &GeneratorConfig,
    registry: &mut ReferenceRegistry,
) -> Result<String> {
    let mut out = String::new();
    out.push_str("//! generated operations\n\n");
    out.push_str("#![allow(unused_imports)]\n\n");
    out.push_str("use serde::{Deserialize, Serialize};\n\n");
    out.push_str(&format!("use {}::Operation;\n\n", config.runtime_crate));
    out.push_str("use crate::fragments::*;\n");
    out.push_str("use crate::types::*;\n\n");

    for op in documents.operations() {
        let shape = resolve_collapse(op, config.collapse_lonely)?;
        let op_type = operation_type_name(op);

        out.push_str("#[derive(Debug, Clone, Serialize, Deserialize)]\n");
        out.push_str(&format!("pub struct {} {{\n", op_type));
        for selection in &op.selection_set().items {
            let Selection::Field(field) = selection else {
                continue;
            };
            if field.name == "__typename" {
                continue;
            }
            let wire_name = field.alias.as_ref().unwrap_or(&field.name);
            // a collapsing operation has exactly one root field, so the
            // collapse type is this field's type
            let ty = if !matches!(shape, Collapse::Off) {
                collapsed_field_type(&shape, op, schema, scalars, registry)?
            } else {
                let definition = root_field(op, field, schema)?;
                output_type(
                    &definition.field_type,
                    field.position,
                    schema,
                    scalars,
                    registry,
                    None,
                )?
            };
            push_struct_field(&mut out, wire_name, &ty);
        }
        out.push_str("}\n\n");

        if let Collapse::Nested { field, type_name } = &shape {
            out.push_str(&render_nested_struct(
                type_name, field, op, schema, scalars, registry,
            )?);
        }

        out.push_str(&format!("impl Operation for {} {{\n", op_type));
        out.push_str(&format!(
            "    const NAME: &'static str = \"{}\";\n",
            op.name()
        ));
        out.push_str(&format!(
            "    const QUERY: &'static str = r#\"{}\"#;\n",
            documents.operation_source(op)?.trim_end()
        ));
        out.push_str(&format!("    type Response = {};\n", op_type));
        out.push_str("}\n\n");
    }

    Ok(out)
}

/// render the `client.rs` module with one async method per operation
///
/// subscriptions get response types but no callable; the runtime client
/// speaks plain http.
pub(crate) fn render_operations_client(
    documents: &DocumentSet,
    schema: &SchemaIndex,
    scalars: &ScalarMap,
    config: &GeneratorConfig,
    registry: &mut ReferenceRegistry,
) -> Result<String> {
    let mut out = String::new();
    out.push_str("//! generated client\n\n");
    out.push_str("#![allow(unused_imports, clippy::too_many_arguments)]\n\n");
    out.push_str(&format!(
        "use {}::{{Client, Operation, Result}};\n",
        config.runtime_crate
    ));
    out.push_str("use serde_json::Value;\n\n");
    out.push_str("use crate::fragments::*;\n");
    out.push_str("use crate::inputs::*;\n");
    out.push_str("use crate::operations::*;\n");
    out.push_str("use crate::types::*;\n\n");

    out.push_str("pub trait GeneratedClient {\n");
    out.push_str("    fn generated(&self) -> GeneratedClientImpl<'_>;\n");
    out.push_str("}\n\n");

    out.push_str("impl GeneratedClient for Client {\n");
    out.push_str("    fn generated(&self) -> GeneratedClientImpl<'_> {\n");
    out.push_str("        GeneratedClientImpl { client: self }\n");
    out.push_str("    }\n");
    out.push_str("}\n\n");

    out.push_str("pub struct GeneratedClientImpl<'a> {\n");
    out.push_str("    client: &'a Client,\n");
    out.push_str("}\n\n");

    out.push_str("impl<'a> GeneratedClientImpl<'a> {\n");
    for op in documents.operations() {
        if op.kind() == OperationKind::Subscription {
            continue;
        }
        out.push_str(&render_method(op, schema, scalars, config, registry)?);
    }
    out.push_str("}\n");

    Ok(out)
}

fn render_method(
    op: &OperationDef,
    schema: &SchemaIndex,
    scalars: &ScalarMap,
    config: &GeneratorConfig,
    registry: &mut ReferenceRegistry,
) -> Result<String> {
    let shape = resolve_collapse(op, config.collapse_lonely)?;
    let op_type = operation_type_name(op);
    let method_name = format!("{}{}", config.function_prefix, to_rust_field(op.name()));

    let return_expr = match &shape {
        Collapse::Off => TypeExpr::name(op_type.clone()),
        shape => collapsed_field_type(shape, op, schema, scalars, registry)?,
    };

    let params = split_parameters(op, schema, scalars, registry)?;
    let mut signature_parts = Vec::new();
    for param in params.required.iter().chain(params.optional.iter()) {
        signature_parts.push(format!("{}: {}", param.rust_name, param.expr.render()));
    }
    let signature = if signature_parts.is_empty() {
        String::new()
    } else {
        format!(", {}", signature_parts.join(", "))
    };

    let mut out = String::new();
    out.push_str(&render_method_doc(op, &params, &return_expr, schema)?);
    out.push_str(&format!(
        "    pub async fn {}(&self{}) -> Result<{}> {{\n",
        method_name,
        signature,
        return_expr.render()
    ));

    if params.required.is_empty() && params.optional.is_empty() {
        out.push_str("        let vars = serde_json::Map::new();\n");
    } else {
        out.push_str("        let mut vars = serde_json::Map::new();\n");
        for param in &params.required {
            out.push_str(&format!(
                "        vars.insert(\"{}\".to_string(), serde_json::to_value({})?);\n",
                param.wire_name, param.rust_name
            ));
        }
        for param in &params.optional {
            out.push_str(&format!(
                "        if let Some(value) = {} {{\n",
                param.rust_name
            ));
            out.push_str(&format!(
                "            vars.insert(\"{}\".to_string(), serde_json::to_value(value)?);\n",
                param.wire_name
            ));
            out.push_str("        }\n");
        }
    }

    out.push_str(&format!(
        "        let response = self.client.execute::<{}>({}::QUERY, Some(Value::Object(vars))).await?;\n",
        op_type, op_type
    ));
    out.push_str("        let data = response.into_data()?;\n");
    match shape.field() {
        Some(field) => {
            let accessor = to_rust_field(field.alias.as_ref().unwrap_or(&field.name));
            out.push_str(&format!("        Ok(data.{})\n", accessor));
        }
        None => out.push_str("        Ok(data)\n"),
    }
    out.push_str("    }\n\n");

    Ok(out)
}

struct Parameter {
    wire_name: String,
    rust_name: String,
    expr: TypeExpr,
    default: Option<String>,
}

struct Parameters {
    required: Vec<Parameter>,
    optional: Vec<Parameter>,
}

/// split operation variables into required and optional parameters
///
/// non-null variables without a default are required; everything else is
/// optional and omitted from the variables map when absent, letting the
/// server apply its default.
fn split_parameters(
    op: &OperationDef,
    schema: &SchemaIndex,
    scalars: &ScalarMap,
    registry: &mut ReferenceRegistry,
) -> Result<Parameters> {
    let mut required = Vec::new();
    let mut optional = Vec::new();

    for variable in op.variable_definitions() {
        let is_required = matches!(variable.var_type, Type::NonNullType(_))
            && variable.default_value.is_none();
        let mut expr = variable_type(
            &variable.var_type,
            variable.position,
            schema,
            scalars,
            registry,
        )?;
        if !is_required && !matches!(expr, TypeExpr::Option(_)) {
            expr = TypeExpr::Option(Box::new(expr));
        }

        let param = Parameter {
            wire_name: variable.name.clone(),
            rust_name: to_rust_field(&variable.name),
            expr,
            default: variable.default_value.as_ref().map(|value| value.to_string()),
        };
        if is_required {
            required.push(param);
        } else {
            optional.push(param);
        }
    }

    Ok(Parameters { required, optional })
}

/// doc comment for a generated method: operation header, root field
/// descriptions from the schema, an arguments section, and the return label
fn render_method_doc(
    op: &OperationDef,
    params: &Parameters,
    return_expr: &TypeExpr,
    schema: &SchemaIndex,
) -> Result<String> {
    let mut lines: Vec<String> = vec![op.name().to_string()];

    let root = schema.root_type(op.kind())?;
    let mut described = Vec::new();
    for selection in &op.selection_set().items {
        let Selection::Field(field) = selection else {
            continue;
        };
        if field.name == "__typename" {
            continue;
        }
        let Some(definition) = schema.field_definition(root, &field.name) else {
            continue;
        };
        let target = field.alias.as_ref().unwrap_or(&field.name);
        if let Some(description) = field_type_description(&definition.field_type, schema) {
            described.push(format!("{}: {}", target, description));
        }
    }
    if !described.is_empty() {
        lines.push(String::new());
        lines.extend(described);
    }

    if !params.required.is_empty() || !params.optional.is_empty() {
        lines.push(String::new());
        lines.push("Arguments:".to_string());
        for param in &params.required {
            lines.push(format!(
                "    {} ({}): {}",
                param.rust_name,
                param.expr.render(),
                param.wire_name
            ));
        }
        for param in &params.optional {
            let default = param
                .default
                .as_ref()
                .map(|value| format!(" Defaults to {}.", value))
                .unwrap_or_default();
            lines.push(format!(
                "    {} ({}, optional): {}.{}",
                param.rust_name,
                param.expr.render(),
                param.wire_name,
                default
            ));
        }
    }

    lines.push(String::new());
    lines.push("Returns:".to_string());
    lines.push(format!("    {}", return_expr.render()));

    let mut out = String::new();
    for line in lines {
        if line.is_empty() {
            out.push_str("    ///\n");
        } else {
            out.push_str(&format!("    /// {}\n", line));
        }
    }
    Ok(out)
}

fn field_type_description(ty: &Type<'static, String>, schema: &SchemaIndex) -> Option<String> {
    let terminal = named_terminal(ty);
    match schema.get_type(terminal)? {
        TypeDefinition::Scalar(scalar) => scalar.description.clone(),
        TypeDefinition::Object(obj) => obj.description.clone(),
        TypeDefinition::Interface(iface) => iface.description.clone(),
        TypeDefinition::Union(union_ty) => union_ty.description.clone(),
        TypeDefinition::Enum(enum_ty) => enum_ty.description.clone(),
        TypeDefinition::InputObject(input) => input.description.clone(),
    }
}

/// struct for a collapsed field's plain nested selections
fn render_nested_struct(
    type_name: &str,
    field: &Field<'static, String>,
    op: &OperationDef,
    schema: &SchemaIndex,
    scalars: &ScalarMap,
    registry: &mut ReferenceRegistry,
) -> Result<String> {
    let definition = root_field(op, field, schema)?;
    let terminal = named_terminal(&definition.field_type).to_string();
    let Some(parent) = schema.get_type(&terminal) else {
        return Err(Error::UnknownType {
            name: terminal,
            position: field.position,
        });
    };

    let mut out = String::new();
    out.push_str("#[derive(Debug, Clone, Serialize, Deserialize)]\n");

    // a union has no fields to project into a struct; the nested type is a
    // transparent wrapper instead
    if matches!(parent, TypeDefinition::Union(_)) {
        out.push_str(&format!("pub struct {}(pub serde_json::Value);\n\n", type_name));
        return Ok(out);
    }

    out.push_str(&format!("pub struct {} {{\n", type_name));
    for selection in &field.selection_set.items {
        let Selection::Field(sub_field) = selection else {
            continue;
        };
        if sub_field.name == "__typename" {
            continue;
        }
        let Some(sub_definition) = schema.field_definition(parent, &sub_field.name) else {
            return Err(Error::UnknownField {
                field: sub_field.name.clone(),
                parent: terminal,
                position: sub_field.position,
            });
        };
        let wire_name = sub_field.alias.as_ref().unwrap_or(&sub_field.name);
        let ty = field_expr(&sub_definition.field_type, schema, registry, scalars, false);
        push_struct_field(&mut out, wire_name, &ty);
    }
    out.push_str("}\n\n");

    Ok(out)
}

fn root_field<'s>(
    op: &OperationDef,
    field: &Field<'static, String>,
    schema: &'s SchemaIndex,
) -> Result<&'s graphql_parser::schema::Field<'static, String>> {
    let root = schema.root_type(op.kind())?;
    let root_name = match root {
        TypeDefinition::Object(obj) => obj.name.clone(),
        _ => "Query".to_string(),
    };
    schema
        .field_definition(root, &field.name)
        .ok_or_else(|| Error::UnknownField {
            field: field.name.clone(),
            parent: root_name,
            position: field.position,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::collect_references;
    use graphql_parser::parse_schema;

    const SDL: &str = "\
        \"\"\"a pet in the store\"\"\"\n\
        type Pet { name: String! species: Species }\n\
        type Query { pet(id: ID!): Pet pets(limit: Int): [Pet!]! petCount: Int! }\n\
        type Mutation { renamePet(id: ID!, name: String!): Pet }\n\
        type Subscription { petAdded: Pet }\n\
        enum Species { CAT DOG }\n";

    fn setup(source: &str) -> (SchemaIndex, ReferenceRegistry, DocumentSet) {
        let doc = parse_schema::<String>(SDL).expect("schema").into_static();
        let schema = SchemaIndex::new(&doc);
        let docs = DocumentSet::parse(source).expect("documents");
        let registry = collect_references(&docs, &schema, &ScalarMap::default()).expect("walk");
        (schema, registry, docs)
    }

    fn operations(source: &str) -> String {
        let (schema, mut registry, docs) = setup(source);
        render_operations(
            &docs,
            &schema,
            &ScalarMap::default(),
            &GeneratorConfig::new(),
            &mut registry,
        )
        .unwrap()
    }

    fn client(source: &str) -> String {
        let (schema, mut registry, docs) = setup(source);
        render_operations_client(
            &docs,
            &schema,
            &ScalarMap::default(),
            &GeneratorConfig::new(),
            &mut registry,
        )
        .unwrap()
    }

    #[test]
    fn test_response_struct_and_operation_impl() {
        let out = operations("query GetPet($id: ID!) { pet(id: $id) { name species } }");

        assert!(out.contains("pub struct GetPet {"));
        assert!(out.contains("pub pet: Option<GetPetPet>,"));
        assert!(out.contains("pub struct GetPetPet {"));
        assert!(out.contains("pub name: String,"));
        assert!(out.contains("impl Operation for GetPet {"));
        assert!(out.contains("const NAME: &'static str = \"GetPet\";"));
        assert!(out.contains("type Response = GetPet;"));
        assert!(out.contains("query GetPet"));
    }

    #[test]
    fn test_query_text_carries_fragments() {
        let out = operations(
            "query GetPet($id: ID!) { pet(id: $id) { ...PetBits } }\n\
             fragment PetBits on Pet { name }",
        );
        assert!(out.contains("fragment PetBits on Pet"));
        assert!(out.contains("pub pet: Option<PetBits>,"));
    }

    #[test]
    fn test_multi_selection_keeps_schema_shape() {
        let out = operations("query Overview { petCount pets { name } }");

        assert!(out.contains("pub pet_count: i64,"));
        assert!(out.contains("#[serde(rename = \"petCount\")]"));
        assert!(out.contains("pub pets: Vec<Pet>,"));
        // no synthesized nested type when the wrapper is kept
        assert!(!out.contains("OverviewPets"));
    }

    #[test]
    fn test_method_signature_and_projection() {
        let out = client("query GetPet($id: ID!) { pet(id: $id) { name species } }");

        assert!(out.contains("pub async fn get_pet(&self, id: String) -> Result<Option<GetPetPet>> {"));
        assert!(out.contains("vars.insert(\"id\".to_string(), serde_json::to_value(id)?);"));
        assert!(out.contains("self.client.execute::<GetPet>(GetPet::QUERY"));
        assert!(out.contains("Ok(data.pet)"));
    }

    #[test]
    fn test_optional_parameters_come_last_and_skip_when_absent() {
        let out = client("query ListPets($limit: Int) { pets(limit: $limit) { name } }");

        assert!(out
            .contains("pub async fn list_pets(&self, limit: Option<i64>) -> Result<Vec<ListPetsPets>> {"));
        assert!(out.contains("if let Some(value) = limit {"));
        assert!(out.contains("vars.insert(\"limit\".to_string(), serde_json::to_value(value)?);"));
    }

    #[test]
    fn test_defaulted_nonnull_variable_is_optional() {
        let out = client("query ListPets($limit: Int! = 10) { pets(limit: $limit) { name } }");

        assert!(out.contains("limit: Option<i64>"));
        assert!(out.contains("Defaults to 10."));
    }

    #[test]
    fn test_no_collapse_returns_wrapper() {
        let out = client("query Overview { petCount pets { name } }");

        assert!(out.contains("pub async fn overview(&self) -> Result<Overview> {"));
        assert!(out.contains("Ok(data)"));
    }

    #[test]
    fn test_doc_carries_description_and_return_label() {
        let out = client("query GetPet($id: ID!) { pet(id: $id) { name } }");

        assert!(out.contains("/// GetPet"));
        assert!(out.contains("/// pet: a pet in the store"));
        assert!(out.contains("/// Returns:"));
        assert!(out.contains("///     Option<GetPetPet>"));
    }

    #[test]
    fn test_mutations_render_methods() {
        let out = client(
            "mutation RenamePet($id: ID!, $name: String!) { renamePet(id: $id, name: $name) { name } }",
        );
        assert!(out.contains("pub async fn rename_pet(&self, id: String, name: String) -> Result<Option<RenamePetRenamePet>> {"));
    }

    #[test]
    fn test_subscriptions_get_no_method() {
        let out = client("subscription PetAdded { petAdded { name } }");
        assert!(!out.contains("pub async fn pet_added"));

        let ops = operations("subscription PetAdded { petAdded { name } }");
        assert!(ops.contains("pub struct PetAdded {"));
        assert!(ops.contains("impl Operation for PetAdded {"));
    }

    #[test]
    fn test_leaf_collapse_returns_scalar() {
        let out = client("query CountPets { petCount }");
        assert!(out.contains("pub async fn count_pets(&self) -> Result<i64> {"));
        assert!(out.contains("Ok(data.pet_count)"));
    }
}
