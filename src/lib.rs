//! typed graphql client generation
//!
//! this crate reads a graphql schema and a set of executable documents and
//! emits a typed rust module set: enums, input structs, fragment structs,
//! per-operation response types, and async call wrappers. only types the
//! documents actually reach are generated. the [`Client`] here is the small
//! runtime the generated code executes through.
//!
//! ## quick start
//!
//! ```no_run
//! use querygen::{generate, DocumentSet, GeneratorConfig};
//!
//! # fn example() -> querygen::Result<()> {
//! let schema = std::fs::read_to_string("schema.graphql")?;
//! let documents = DocumentSet::load_glob("queries/**/*.graphql")?;
//! let config = GeneratorConfig::new().with_crate_name("petstore-client");
//! let files = generate(&config, &schema, &documents)?;
//! files.write_to(std::path::Path::new("petstore-client"))?;
//! # Ok(())
//! # }
//! ```
//!
//! the `querygen` binary wraps the same entry points with schema loading
//! from a file or an http endpoint.

mod client;
mod collapse;
mod config;
mod documents;
mod error;
mod funcs;
mod generator;
mod graphql;
mod naming;
mod operation;
mod registry;
mod render;
mod schema;
mod typeexpr;
mod walker;

pub use client::Client;
pub use collapse::{is_collapsable, operation_type_name, return_type, return_type_label};
pub use config::{ClientConfig, GeneratorConfig};
pub use documents::{DocumentSet, FragmentDef, OperationDef};
pub use error::{Error, Result};
pub use generator::{generate, generate_from_glob, GeneratedFiles};
pub use graphql::{GraphQlError, GraphQlLocation, GraphQlResponse};
pub use operation::Operation;
pub use registry::ReferenceRegistry;
pub use schema::{OperationKind, SchemaIndex};
pub use typeexpr::{output_type, variable_type, ScalarMap, TypeExpr};
pub use walker::{collect_references, walk_field};
