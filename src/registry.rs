//! reference registry
//!
//! accumulates the named types a document set actually reaches. downstream
//! generators emit only what is registered here. one registry lives for one
//! generation run.

use std::collections::BTreeSet;

/// set-valued index of named types reachable from a document set
///
/// registration is idempotent and never fails; validity of the names is the
/// caller's concern. entry order carries no meaning.
#[derive(Debug, Clone, Default)]
pub struct ReferenceRegistry {
    objects: BTreeSet<String>,
    fragments: BTreeSet<String>,
    enums: BTreeSet<String>,
    inputs: BTreeSet<String>,
    scalars: BTreeSet<String>,
    // declared for parity with upstream tooling; nothing registers into it
    // (see DESIGN.md)
    operations: BTreeSet<String>,
}

impl ReferenceRegistry {
    /// create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// record an object, interface, or union type by name
    pub fn register_type(&mut self, name: impl Into<String>) {
        self.objects.insert(name.into());
    }

    /// record a fragment by name
    pub fn register_fragment(&mut self, name: impl Into<String>) {
        self.fragments.insert(name.into());
    }

    /// record an enum type by name
    pub fn register_enum(&mut self, name: impl Into<String>) {
        self.enums.insert(name.into());
    }

    /// record an input object type by name
    pub fn register_input(&mut self, name: impl Into<String>) {
        self.inputs.insert(name.into());
    }

    /// record a scalar type by name
    pub fn register_scalar(&mut self, name: impl Into<String>) {
        self.scalars.insert(name.into());
    }

    /// object, interface, and union names seen so far
    pub fn objects(&self) -> &BTreeSet<String> {
        &self.objects
    }

    /// fragment names seen so far
    pub fn fragments(&self) -> &BTreeSet<String> {
        &self.fragments
    }

    /// enum names seen so far
    pub fn enums(&self) -> &BTreeSet<String> {
        &self.enums
    }

    /// input object names seen so far
    pub fn inputs(&self) -> &BTreeSet<String> {
        &self.inputs
    }

    /// scalar names seen so far
    pub fn scalars(&self) -> &BTreeSet<String> {
        &self.scalars
    }

    /// operation names; see DESIGN.md for why this set stays empty
    pub fn operations(&self) -> &BTreeSet<String> {
        &self.operations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_is_idempotent() {
        let mut registry = ReferenceRegistry::new();
        registry.register_type("Pet");
        registry.register_type("Pet");
        registry.register_fragment("PetFields");
        registry.register_fragment("PetFields");
        registry.register_enum("Species");
        registry.register_enum("Species");
        registry.register_input("PetFilter");
        registry.register_input("PetFilter");
        registry.register_scalar("DateTime");
        registry.register_scalar("DateTime");

        assert_eq!(registry.objects().len(), 1);
        assert_eq!(registry.fragments().len(), 1);
        assert_eq!(registry.enums().len(), 1);
        assert_eq!(registry.inputs().len(), 1);
        assert_eq!(registry.scalars().len(), 1);
    }

    #[test]
    fn test_categories_are_disjoint() {
        let mut registry = ReferenceRegistry::new();
        registry.register_type("Pet");
        registry.register_scalar("Pet");

        assert!(registry.objects().contains("Pet"));
        assert!(registry.scalars().contains("Pet"));
        assert!(registry.enums().is_empty());
        assert!(registry.inputs().is_empty());
        assert!(registry.fragments().is_empty());
    }

    #[test]
    fn test_operations_set_stays_empty() {
        let mut registry = ReferenceRegistry::new();
        registry.register_type("Pet");
        registry.register_fragment("PetFields");
        assert!(registry.operations().is_empty());
    }
}
