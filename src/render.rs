//! module emitters
//!
//! registry-driven rendering of the generated source set: enums, inputs,
//! object structs, union wrappers, scalar aliases, and fragment structs.
//! everything is filtered through the reference registry, so types no
//! document reaches never show up in the output.

use crate::config::GeneratorConfig;
use crate::documents::DocumentSet;
use crate::naming::{to_rust_field, to_rust_ident};
use crate::registry::ReferenceRegistry;
use crate::schema::SchemaIndex;
use crate::typeexpr::{ScalarMap, TypeExpr};
use graphql_parser::query::{Selection, Type};
use graphql_parser::schema::TypeDefinition;

/// render the rust type for a schema-shaped field
///
/// unlike the fail-fast recursion in the core, emitted structs carry every
/// schema field, so a terminal type nothing registered falls back to
/// `serde_json::Value` instead of erroring. object-valued output fields are
/// boxed outside lists to keep recursive types finite.
pub(crate) fn field_expr(
    ty: &Type<'static, String>,
    schema: &SchemaIndex,
    registry: &ReferenceRegistry,
    scalars: &ScalarMap,
    input: bool,
) -> TypeExpr {
    field_expr_inner(ty, schema, registry, scalars, input, true, false)
}

fn field_expr_inner(
    ty: &Type<'static, String>,
    schema: &SchemaIndex,
    registry: &ReferenceRegistry,
    scalars: &ScalarMap,
    input: bool,
    nullable: bool,
    in_list: bool,
) -> TypeExpr {
    match ty {
        Type::NonNullType(inner) => {
            field_expr_inner(inner, schema, registry, scalars, input, false, in_list)
        }
        Type::ListType(inner) => {
            let element = field_expr_inner(inner, schema, registry, scalars, input, true, true);
            TypeExpr::Vec(Box::new(element)).maybe_optional(nullable)
        }
        Type::NamedType(name) => {
            let rendered = terminal_expr(name, schema, registry, scalars, input, in_list);
            rendered.maybe_optional(nullable)
        }
    }
}

fn terminal_expr(
    name: &str,
    schema: &SchemaIndex,
    registry: &ReferenceRegistry,
    scalars: &ScalarMap,
    input: bool,
    in_list: bool,
) -> TypeExpr {
    if ScalarMap::is_builtin(name) {
        return TypeExpr::name(scalars.resolve(name));
    }

    match schema.get_type(name) {
        Some(TypeDefinition::Scalar(_)) => {
            if scalars.has_override(name) || registry.scalars().contains(name) {
                TypeExpr::name(scalars.resolve(name))
            } else {
                TypeExpr::name("serde_json::Value")
            }
        }
        Some(TypeDefinition::Enum(_)) => {
            if registry.enums().contains(name) {
                TypeExpr::name(to_rust_ident(name))
            } else {
                TypeExpr::name("serde_json::Value")
            }
        }
        Some(TypeDefinition::Object(_)) | Some(TypeDefinition::Interface(_)) => {
            if registry.objects().contains(name) {
                if input || in_list {
                    TypeExpr::name(to_rust_ident(name))
                } else {
                    TypeExpr::name(format!("Box<{}>", to_rust_ident(name)))
                }
            } else {
                TypeExpr::name("serde_json::Value")
            }
        }
        Some(TypeDefinition::Union(_)) => {
            if registry.objects().contains(name) {
                TypeExpr::name(to_rust_ident(name))
            } else {
                TypeExpr::name("serde_json::Value")
            }
        }
        Some(TypeDefinition::InputObject(_)) => {
            if registry.inputs().contains(name) {
                TypeExpr::name(to_rust_ident(name))
            } else {
                TypeExpr::name("serde_json::Value")
            }
        }
        None => TypeExpr::name("serde_json::Value"),
    }
}

/// emit one struct field with an optional serde rename
pub(crate) fn push_struct_field(out: &mut String, wire_name: &str, ty: &TypeExpr) {
    let rust_name = to_rust_field(wire_name);
    if rust_name != wire_name {
        out.push_str(&format!("    #[serde(rename = \"{}\")]\n", wire_name));
    }
    out.push_str(&format!("    pub {}: {},\n", rust_name, ty.render()));
}

/// emit one input struct field
///
/// optional input fields are skipped when absent: graphql distinguishes a
/// missing argument from an explicit null, and defaults only apply to the
/// former.
fn push_input_field(out: &mut String, wire_name: &str, ty: &TypeExpr) {
    let rust_name = to_rust_field(wire_name);
    let mut attrs = Vec::new();
    if rust_name != wire_name {
        attrs.push(format!("rename = \"{}\"", wire_name));
    }
    if matches!(ty, TypeExpr::Option(_)) {
        attrs.push("default".to_string());
        attrs.push("skip_serializing_if = \"Option::is_none\"".to_string());
    }
    if !attrs.is_empty() {
        out.push_str(&format!("    #[serde({})]\n", attrs.join(", ")));
    }
    out.push_str(&format!("    pub {}: {},\n", rust_name, ty.render()));
}

/// a field on a schema-shaped struct is always optional: documents select
/// subsets, so the struct is a partial view of the type
fn partial_view(ty: TypeExpr) -> TypeExpr {
    match ty {
        optional @ TypeExpr::Option(_) => optional,
        other => TypeExpr::Option(Box::new(other)),
    }
}

/// render the `types.rs` module: scalar aliases, enums, object and
/// interface structs, union wrappers
pub(crate) fn render_types(
    schema: &SchemaIndex,
    registry: &ReferenceRegistry,
    scalars: &ScalarMap,
) -> String {
    let mut out = String::new();
    out.push_str("//! generated types\n\n");
    out.push_str("#![allow(unused_imports)]\n\n");
    out.push_str("use serde::{Deserialize, Serialize};\n\n");

    for scalar_name in registry.scalars() {
        if ScalarMap::is_builtin(scalar_name) || scalars.has_override(scalar_name) {
            continue;
        }
        out.push_str(&format!(
            "pub type {} = serde_json::Value;\n",
            to_rust_ident(scalar_name)
        ));
    }
    if registry
        .scalars()
        .iter()
        .any(|name| !ScalarMap::is_builtin(name) && !scalars.has_override(name))
    {
        out.push('\n');
    }

    for enum_name in registry.enums() {
        if let Some(TypeDefinition::Enum(enum_ty)) = schema.get_type(enum_name) {
            out.push_str("#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]\n");
            out.push_str(&format!("pub enum {} {{\n", to_rust_ident(enum_name)));
            for value in &enum_ty.values {
                out.push_str(&format!("    #[serde(rename = \"{}\")]\n", value.name));
                out.push_str(&format!("    {},\n", to_rust_ident(&value.name)));
            }
            out.push_str("}\n\n");
        }
    }

    for object_name in registry.objects() {
        match schema.get_type(object_name) {
            Some(TypeDefinition::Object(obj)) => {
                out.push_str("#[derive(Debug, Clone, Serialize, Deserialize)]\n");
                out.push_str(&format!("pub struct {} {{\n", to_rust_ident(object_name)));
                for field in &obj.fields {
                    let ty =
                        partial_view(field_expr(&field.field_type, schema, registry, scalars, false));
                    push_struct_field(&mut out, &field.name, &ty);
                }
                out.push_str("}\n\n");
            }
            Some(TypeDefinition::Interface(iface)) => {
                out.push_str("#[derive(Debug, Clone, Serialize, Deserialize)]\n");
                out.push_str(&format!("pub struct {} {{\n", to_rust_ident(object_name)));
                for field in &iface.fields {
                    let ty =
                        partial_view(field_expr(&field.field_type, schema, registry, scalars, false));
                    push_struct_field(&mut out, &field.name, &ty);
                }
                out.push_str("}\n\n");
            }
            Some(TypeDefinition::Union(union_ty)) => {
                out.push_str("#[derive(Debug, Clone, Serialize, Deserialize)]\n");
                out.push_str(&format!(
                    "pub struct {}(pub serde_json::Value);\n\n",
                    to_rust_ident(&union_ty.name)
                ));
            }
            _ => {}
        }
    }

    out
}

/// render the `inputs.rs` module
pub(crate) fn render_inputs(
    schema: &SchemaIndex,
    registry: &ReferenceRegistry,
    scalars: &ScalarMap,
) -> String {
    let mut out = String::new();
    out.push_str("//! generated input types\n\n");
    out.push_str("#![allow(unused_imports)]\n\n");
    out.push_str("use serde::{Deserialize, Serialize};\n\n");
    out.push_str("use crate::types::*;\n\n");

    for input_name in registry.inputs() {
        if let Some(TypeDefinition::InputObject(input)) = schema.get_type(input_name) {
            out.push_str("#[derive(Debug, Clone, Serialize, Deserialize)]\n");
            out.push_str(&format!("pub struct {} {{\n", to_rust_ident(input_name)));
            for field in &input.fields {
                let ty = field_expr(&field.value_type, schema, registry, scalars, true);
                push_input_field(&mut out, &field.name, &ty);
            }
            out.push_str("}\n\n");
        }
    }

    out
}

/// render the `fragments.rs` module
///
/// one struct per registered fragment, shaped by its selection set against
/// the type condition. spreads and inline fragments inside a fragment body
/// contribute no fields of their own.
pub(crate) fn render_fragments(
    documents: &DocumentSet,
    schema: &SchemaIndex,
    registry: &ReferenceRegistry,
    scalars: &ScalarMap,
) -> String {
    let mut out = String::new();
    out.push_str("//! generated fragment types\n\n");
    out.push_str("#![allow(unused_imports)]\n\n");
    out.push_str("use serde::{Deserialize, Serialize};\n\n");
    out.push_str("use crate::types::*;\n\n");

    for fragment in documents.fragments() {
        if !registry.fragments().contains(fragment.name()) {
            continue;
        }
        let struct_name = to_rust_ident(fragment.name());
        let Some(condition) = schema.get_type(fragment.type_condition()) else {
            continue;
        };

        if matches!(condition, TypeDefinition::Union(_)) {
            out.push_str("#[derive(Debug, Clone, Serialize, Deserialize)]\n");
            out.push_str(&format!(
                "pub struct {}(pub serde_json::Value);\n\n",
                struct_name
            ));
            continue;
        }

        out.push_str("#[derive(Debug, Clone, Serialize, Deserialize)]\n");
        out.push_str(&format!("pub struct {} {{\n", struct_name));
        for selection in &fragment.selection_set().items {
            let Selection::Field(field) = selection else {
                continue;
            };
            if field.name == "__typename" {
                continue;
            }
            let Some(definition) = schema.field_definition(condition, &field.name) else {
                continue;
            };
            let wire_name = field.alias.as_ref().unwrap_or(&field.name);
            let ty = field_expr(&definition.field_type, schema, registry, scalars, false);
            push_struct_field(&mut out, wire_name, &ty);
        }
        out.push_str("}\n\n");
    }

    out
}

/// render the generated crate's `lib.rs`
pub(crate) fn render_lib() -> String {
    let mut out = String::new();
    out.push_str("//! generated graphql client\n\n");
    out.push_str("pub mod client;\n");
    out.push_str("pub mod fragments;\n");
    out.push_str("pub mod inputs;\n");
    out.push_str("pub mod operations;\n");
    out.push_str("pub mod types;\n\n");
    out.push_str("pub use client::GeneratedClient;\n");
    out
}

/// render the generated crate's `Cargo.toml`
pub(crate) fn render_cargo_toml(config: &GeneratorConfig) -> String {
    let crate_name = config.crate_name.as_deref().unwrap_or("generated-client");
    let mut out = String::new();
    out.push_str("[package]\n");
    out.push_str(&format!("name = \"{}\"\n", crate_name));
    out.push_str("version = \"0.0.1\"\n");
    out.push_str("edition = \"2021\"\n\n");
    out.push_str("[dependencies]\n");
    if let Some(path) = &config.runtime_path {
        out.push_str(&format!(
            "{} = {{ path = \"{}\" }}\n",
            config.runtime_crate, path
        ));
    } else {
        out.push_str(&format!(
            "{} = \"{}\"\n",
            config.runtime_crate,
            env!("CARGO_PKG_VERSION")
        ));
    }
    out.push_str("serde = { version = \"1\", features = [\"derive\"] }\n");
    out.push_str("serde_json = \"1\"\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::collect_references;
    use graphql_parser::parse_schema;

    const SDL: &str = "\
        type Query { pet: Pet unused: Loner search: [SearchResult!] }\n\
        type Pet { name: String! species: Species friend: Pet born: DateTime }\n\
        type Loner { nothing: String }\n\
        union SearchResult = Pet\n\
        enum Species { CAT DOG }\n\
        scalar DateTime\n\
        input PetFilter { species: Species limit: Int }\n";

    fn setup(source: &str) -> (SchemaIndex, ReferenceRegistry, DocumentSet) {
        let doc = parse_schema::<String>(SDL).expect("schema").into_static();
        let schema = SchemaIndex::new(&doc);
        let docs = DocumentSet::parse(source).expect("documents");
        let registry = collect_references(&docs, &schema, &ScalarMap::default()).expect("walk");
        (schema, registry, docs)
    }

    #[test]
    fn test_types_are_registry_filtered() {
        let (schema, registry, _) =
            setup("query GetPet { pet { name species } }");
        let types = render_types(&schema, &registry, &ScalarMap::default());

        assert!(types.contains("pub struct Pet {"));
        assert!(types.contains("pub enum Species {"));
        assert!(!types.contains("Loner"));
    }

    #[test]
    fn test_unregistered_field_types_fall_back_to_value() {
        // nothing selects species or born, so their enum/scalar types are
        // not generated and the fields type loosely. friend points at Pet,
        // which is generated, so it stays typed.
        let (schema, registry, _) = setup("query GetPet { pet { name } }");
        let types = render_types(&schema, &registry, &ScalarMap::default());

        assert!(types.contains("pub species: Option<serde_json::Value>,"));
        assert!(types.contains("pub born: Option<serde_json::Value>,"));
        assert!(types.contains("pub friend: Option<Box<Pet>>,"));
    }

    #[test]
    fn test_recursive_object_fields_are_boxed() {
        let (schema, registry, _) = setup("query GetPet { pet { name friend { name } } }");
        let types = render_types(&schema, &registry, &ScalarMap::default());

        assert!(types.contains("pub friend: Option<Box<Pet>>,"));
    }

    #[test]
    fn test_custom_scalar_alias() {
        let (schema, registry, _) = setup("query GetPet { pet { born } }");
        let types = render_types(&schema, &registry, &ScalarMap::default());
        assert!(types.contains("pub type DateTime = serde_json::Value;"));
        assert!(types.contains("pub born: Option<DateTime>,"));
    }

    #[test]
    fn test_scalar_override_skips_alias() {
        let (schema, registry, _) = setup("query GetPet { pet { born } }");
        let mut overrides = std::collections::BTreeMap::new();
        overrides.insert("DateTime".to_string(), "String".to_string());
        let scalars = ScalarMap::new(overrides);

        let types = render_types(&schema, &registry, &scalars);
        assert!(!types.contains("pub type DateTime"));
        assert!(types.contains("pub born: Option<String>,"));
    }

    #[test]
    fn test_union_renders_as_newtype() {
        let (schema, registry, _) =
            setup("query Search { search { ... on Pet { name } } }");
        let types = render_types(&schema, &registry, &ScalarMap::default());
        assert!(types.contains("pub struct SearchResult(pub serde_json::Value);"));
    }

    #[test]
    fn test_inputs_render() {
        let (schema, registry, _) = setup(
            "query Search($filter: PetFilter) { search { ... on Pet { name species } } }",
        );
        let inputs = render_inputs(&schema, &registry, &ScalarMap::default());

        assert!(inputs.contains("pub struct PetFilter {"));
        assert!(inputs.contains("pub species: Option<Species>,"));
        assert!(inputs.contains("pub limit: Option<i64>,"));
    }

    #[test]
    fn test_fragments_render_with_alias() {
        let (schema, registry, docs) = setup(
            "query GetPet { pet { ...PetBits } }\n\
             fragment PetBits on Pet { petName: name species }",
        );
        let fragments = render_fragments(&docs, &schema, &registry, &ScalarMap::default());

        assert!(fragments.contains("pub struct PetBits {"));
        assert!(fragments.contains("#[serde(rename = \"petName\")]"));
        assert!(fragments.contains("pub pet_name: String,"));
        assert!(fragments.contains("pub species: Option<Species>,"));
    }

    #[test]
    fn test_unspread_fragment_is_skipped() {
        let (schema, registry, docs) = setup(
            "query GetPet { pet { name } }\n\
             fragment PetBits on Pet { species }",
        );
        let fragments = render_fragments(&docs, &schema, &registry, &ScalarMap::default());
        assert!(!fragments.contains("PetBits"));
    }

    #[test]
    fn test_cargo_toml_path_dependency() {
        let config = GeneratorConfig::new()
            .with_crate_name("petstore-client")
            .with_runtime_path("../querygen");
        let cargo = render_cargo_toml(&config);

        assert!(cargo.contains("name = \"petstore-client\""));
        assert!(cargo.contains("querygen = { path = \"../querygen\" }"));
        assert!(cargo.contains("serde ="));
    }
}
