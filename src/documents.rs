//! executable documents
//!
//! parses query documents from strings or a glob of files and splits them
//! into named operations and fragments. also renders the standalone
//! executable text for one operation (the operation plus every fragment it
//! transitively spreads), which generated code bakes in as its query.

use crate::error::{Error, Result};
use crate::schema::OperationKind;
use graphql_parser::query::{
    Definition, Document, FragmentDefinition, OperationDefinition, Selection, SelectionSet,
    TypeCondition, VariableDefinition,
};
use graphql_parser::{parse_query, Pos};
use std::collections::BTreeSet;
use std::fs;

/// a named operation from a document set
#[derive(Debug, Clone)]
pub struct OperationDef {
    name: String,
    kind: OperationKind,
    position: Pos,
    variable_definitions: Vec<VariableDefinition<'static, String>>,
    selection_set: SelectionSet<'static, String>,
    ast: OperationDefinition<'static, String>,
}

impl OperationDef {
    /// operation name as written in the document
    pub fn name(&self) -> &str {
        &self.name
    }

    /// query, mutation, or subscription
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// source position of the operation keyword
    pub fn position(&self) -> Pos {
        self.position
    }

    /// declared variables
    pub fn variable_definitions(&self) -> &[VariableDefinition<'static, String>] {
        &self.variable_definitions
    }

    /// root selection set
    pub fn selection_set(&self) -> &SelectionSet<'static, String> {
        &self.selection_set
    }
}

#[cfg(test)]
impl OperationDef {
    /// same operation with its selection set emptied, for precondition tests
    /// (the parser itself refuses an empty selection set)
    pub(crate) fn clone_with_empty_selection(&self) -> Self {
        let mut cloned = self.clone();
        cloned.selection_set.items.clear();
        cloned
    }
}

/// a named fragment definition from a document set
#[derive(Debug, Clone)]
pub struct FragmentDef {
    name: String,
    type_condition: String,
    position: Pos,
    selection_set: SelectionSet<'static, String>,
    ast: FragmentDefinition<'static, String>,
}

impl FragmentDef {
    /// fragment name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// name of the type the fragment conditions on
    pub fn type_condition(&self) -> &str {
        &self.type_condition
    }

    /// source position of the fragment keyword
    pub fn position(&self) -> Pos {
        self.position
    }

    /// fragment selection set
    pub fn selection_set(&self) -> &SelectionSet<'static, String> {
        &self.selection_set
    }
}

/// parsed operations and fragments for one generation run
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    operations: Vec<OperationDef>,
    fragments: Vec<FragmentDef>,
}

impl DocumentSet {
    /// parse a document set from one source text
    pub fn parse(source: &str) -> Result<Self> {
        let mut set = Self::default();
        set.add_source(source)?;
        Ok(set)
    }

    /// load and parse every file matching a glob pattern
    ///
    /// zero matching files, or files containing no definitions, surface as
    /// [`Error::NoDocumentsFound`]; the generator treats that as soft.
    pub fn load_glob(pattern: &str) -> Result<Self> {
        let paths = glob::glob(pattern).map_err(|err| {
            Error::Config(format!("invalid documents glob `{pattern}`: {err}"))
        })?;

        let mut set = Self::default();
        for entry in paths {
            let path = entry.map_err(glob::GlobError::into_error)?;
            if !path.is_file() {
                continue;
            }
            let source = fs::read_to_string(&path)?;
            set.add_source(&source)?;
        }

        if set.is_empty() {
            return Err(Error::NoDocumentsFound {
                pattern: pattern.to_string(),
            });
        }
        Ok(set)
    }

    fn add_source(&mut self, source: &str) -> Result<()> {
        let document = parse_query::<String>(source)
            .map_err(Error::DocumentParse)?
            .into_static();

        for definition in document.definitions {
            match definition {
                Definition::Operation(op) => self.add_operation(op)?,
                Definition::Fragment(frag) => {
                    let TypeCondition::On(condition) = &frag.type_condition;
                    self.fragments.push(FragmentDef {
                        name: frag.name.clone(),
                        type_condition: condition.clone(),
                        position: frag.position,
                        selection_set: frag.selection_set.clone(),
                        ast: frag,
                    });
                }
            }
        }
        Ok(())
    }

    fn add_operation(&mut self, op: OperationDefinition<'static, String>) -> Result<()> {
        let (name, kind, position, variable_definitions, selection_set) = match &op {
            OperationDefinition::SelectionSet(set) => {
                return Err(Error::Config(format!(
                    "anonymous operation at {} is not supported; name it to generate code",
                    set.span.0
                )))
            }
            OperationDefinition::Query(query) => (
                query.name.clone(),
                OperationKind::Query,
                query.position,
                query.variable_definitions.clone(),
                query.selection_set.clone(),
            ),
            OperationDefinition::Mutation(mutation) => (
                mutation.name.clone(),
                OperationKind::Mutation,
                mutation.position,
                mutation.variable_definitions.clone(),
                mutation.selection_set.clone(),
            ),
            OperationDefinition::Subscription(sub) => (
                sub.name.clone(),
                OperationKind::Subscription,
                sub.position,
                sub.variable_definitions.clone(),
                sub.selection_set.clone(),
            ),
        };

        let Some(name) = name else {
            return Err(Error::Config(format!(
                "anonymous {} at {} is not supported; name it to generate code",
                kind.as_str(),
                position
            )));
        };

        self.operations.push(OperationDef {
            name,
            kind,
            position,
            variable_definitions,
            selection_set,
            ast: op,
        });
        Ok(())
    }

    /// operations in document order
    pub fn operations(&self) -> &[OperationDef] {
        &self.operations
    }

    /// fragments in document order
    pub fn fragments(&self) -> &[FragmentDef] {
        &self.fragments
    }

    /// look up a fragment by name
    pub fn fragment(&self, name: &str) -> Option<&FragmentDef> {
        self.fragments.iter().find(|frag| frag.name == name)
    }

    /// true when no operations or fragments were parsed
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty() && self.fragments.is_empty()
    }

    /// executable text for one operation: the operation plus the transitive
    /// closure of fragments it spreads, each exactly once
    pub fn operation_source(&self, op: &OperationDef) -> Result<String> {
        let mut needed = BTreeSet::new();
        spread_names(&op.selection_set, &mut needed);

        // chase spreads inside fragments until the set stops growing
        let mut resolved: BTreeSet<String> = BTreeSet::new();
        while let Some(name) = needed.iter().find(|n| !resolved.contains(*n)).cloned() {
            resolved.insert(name.clone());
            let fragment = self.fragment(&name).ok_or_else(|| {
                Error::Config(format!(
                    "operation `{}` spreads undefined fragment `{}`",
                    op.name, name
                ))
            })?;
            spread_names(&fragment.selection_set, &mut needed);
        }

        let mut definitions = vec![Definition::Operation(op.ast.clone())];
        for name in &resolved {
            // resolved names all hit the lookup above
            if let Some(fragment) = self.fragment(name) {
                definitions.push(Definition::Fragment(fragment.ast.clone()));
            }
        }

        let document = Document::<String> { definitions };
        Ok(document.to_string())
    }
}

fn spread_names(set: &SelectionSet<'static, String>, out: &mut BTreeSet<String>) {
    for selection in &set.items {
        match selection {
            Selection::Field(field) => spread_names(&field.selection_set, out),
            Selection::FragmentSpread(spread) => {
                out.insert(spread.fragment_name.clone());
            }
            Selection::InlineFragment(inline) => spread_names(&inline.selection_set, out),
        }
    }
}
