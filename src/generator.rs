//! generation runs
//!
//! one run takes a schema and a document set, collects references, and
//! renders the generated module set. the no-documents case is deliberately
//! soft: a pipeline step with nothing to do warns and emits nothing instead
//! of failing the run.

use crate::config::GeneratorConfig;
use crate::documents::DocumentSet;
use crate::error::{Error, Result};
use crate::funcs;
use crate::render;
use crate::schema::SchemaIndex;
use crate::typeexpr::ScalarMap;
use crate::walker::collect_references;
use graphql_parser::parse_schema;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// rendered output of one generation run, keyed by relative path
#[derive(Debug, Clone, Default)]
pub struct GeneratedFiles {
    files: BTreeMap<String, String>,
}

impl GeneratedFiles {
    /// all rendered files
    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.files
    }

    /// contents of one rendered file
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// true when the run produced nothing
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// write every file below an output directory
    pub fn write_to(&self, out_dir: &Path) -> Result<()> {
        for (relative, contents) in &self.files {
            let path = out_dir.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, contents)?;
        }
        Ok(())
    }
}

/// run the generator over a schema and an already-loaded document set
pub fn generate(
    config: &GeneratorConfig,
    schema_text: &str,
    documents: &DocumentSet,
) -> Result<GeneratedFiles> {
    config.validate()?;

    let schema_doc = parse_schema::<String>(schema_text)?.into_static();
    let schema = SchemaIndex::new(&schema_doc);

    if documents.is_empty() {
        log::warn!("document set is empty; nothing to generate");
        return Ok(GeneratedFiles::default());
    }

    let scalars = ScalarMap::new(config.scalars.clone());
    let mut registry = collect_references(documents, &schema, &scalars)?;

    // operations first: collapse resolution may still register leaf types
    // the type and input renderers need to see
    let operations_rs =
        funcs::render_operations(documents, &schema, &scalars, config, &mut registry)?;
    let client_rs =
        funcs::render_operations_client(documents, &schema, &scalars, config, &mut registry)?;
    let fragments_rs = render::render_fragments(documents, &schema, &registry, &scalars);
    let inputs_rs = render::render_inputs(&schema, &registry, &scalars);
    let types_rs = render::render_types(&schema, &registry, &scalars);

    let mut files = BTreeMap::new();
    files.insert("src/client.rs".to_string(), client_rs);
    files.insert("src/fragments.rs".to_string(), fragments_rs);
    files.insert("src/inputs.rs".to_string(), inputs_rs);
    files.insert("src/lib.rs".to_string(), render::render_lib());
    files.insert("src/operations.rs".to_string(), operations_rs);
    files.insert("src/types.rs".to_string(), types_rs);
    if config.crate_name.is_some() {
        files.insert("Cargo.toml".to_string(), render::render_cargo_toml(config));
    }

    Ok(GeneratedFiles { files })
}

/// run the generator, loading documents from the configured glob
///
/// a glob that matches nothing is reported and produces an empty result
/// rather than an error, so multi-step pipelines keep going.
pub fn generate_from_glob(config: &GeneratorConfig, schema_text: &str) -> Result<GeneratedFiles> {
    match DocumentSet::load_glob(&config.documents) {
        Ok(documents) => generate(config, schema_text, &documents),
        Err(Error::NoDocumentsFound { pattern }) => {
            log::warn!("no graphql documents found for `{pattern}`; nothing to generate");
            Ok(GeneratedFiles::default())
        }
        Err(err) => Err(err),
    }
}
