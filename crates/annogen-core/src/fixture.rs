//! Fixture lookup seam for stub generation

use crate::model::TypeRef;
use std::collections::{BTreeMap, HashMap};

/// Supplies default value expressions for types the generator cannot construct.
///
/// Providers are consulted before the built-in defaults.
pub trait FixtureProvider: Send + Sync {
    fn fixture_for(&self, ty: &TypeRef) -> Option<String>;
}

impl FixtureProvider for BTreeMap<String, String> {
    fn fixture_for(&self, ty: &TypeRef) -> Option<String> {
        self.get(&ty.to_string()).cloned()
    }
}

impl FixtureProvider for HashMap<String, String> {
    fn fixture_for(&self, ty: &TypeRef) -> Option<String> {
        self.get(&ty.to_string()).cloned()
    }
}
