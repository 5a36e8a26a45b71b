//! Mutable builders for components
//!
//! A builder mirrors the constructor parameters of one component type. It is
//! never validated on its own; [`Builder::commit`] runs the data constructor,
//! which validates. A builder whose fields are all unset commits to `None`.
//!
//! Nested builders are committed with [`Builder::commit_as`] so that the whole
//! tree is built against the version of the outermost builder.

use crate::error::Result;
use crate::versions::{current_version, Version};
use std::sync::Arc;

/// Staging type that produces an immutable component
pub trait Builder {
    /// The component this builder produces
    type Target;

    /// True when no field has been set
    fn is_empty(&self) -> bool;

    /// The version requested on this builder, if any
    fn version(&self) -> Option<Version>;

    /// Run the data constructor against `version`
    fn build(&self, version: Version) -> Result<Self::Target>;

    /// Build and validate the component, or `None` when the builder is empty
    fn commit(&self) -> Result<Option<Self::Target>> {
        self.commit_as(resolve_version(self.version()))
    }

    /// Commit against a version chosen by an enclosing builder
    fn commit_as(&self, version: Version) -> Result<Option<Self::Target>> {
        if self.is_empty() {
            Ok(None)
        } else {
            self.build(version).map(Some)
        }
    }
}

/// The version a builder commits against: its own, or the ambient default
pub fn resolve_version(version: Option<Version>) -> Version {
    version.unwrap_or_else(current_version)
}

/// An ordered list of sub-builders.
///
/// Indexed access never grows the list; call [`BuilderList::ensure_len`]
/// first to synthesize empty slots.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderList<B> {
    items: Vec<B>,
}

impl<B> Default for BuilderList<B> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<B: Builder + Default> BuilderList<B> {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow the list with empty builders until it holds at least `len` items
    pub fn ensure_len(&mut self, len: usize) -> &mut Self {
        while self.items.len() < len {
            self.items.push(B::default());
        }
        self
    }

    /// The builder at `index`, if the list is long enough
    pub fn get(&self, index: usize) -> Option<&B> {
        self.items.get(index)
    }

    /// Mutable access to the builder at `index`, if the list is long enough
    pub fn get_mut(&mut self, index: usize) -> Option<&mut B> {
        self.items.get_mut(index)
    }

    /// Append a builder
    pub fn push(&mut self, builder: B) {
        self.items.push(builder);
    }

    /// Number of slots, empty ones included
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over the slots
    pub fn iter(&self) -> impl Iterator<Item = &B> {
        self.items.iter()
    }

    /// True when every slot is empty
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(Builder::is_empty)
    }

    /// Commit every non-empty slot against `version`, in order
    pub fn commit_all(&self, version: Version) -> Result<Vec<Arc<B::Target>>> {
        let mut committed = Vec::new();
        for builder in &self.items {
            if let Some(component) = builder.commit_as(version)? {
                committed.push(Arc::new(component));
            }
        }
        Ok(committed)
    }
}

impl<B> From<Vec<B>> for BuilderList<B> {
    fn from(items: Vec<B>) -> Self {
        Self { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Scratch {
        value: String,
    }

    impl Builder for Scratch {
        type Target = String;

        fn is_empty(&self) -> bool {
            self.value.is_empty()
        }

        fn version(&self) -> Option<Version> {
            None
        }

        fn build(&self, version: Version) -> Result<String> {
            Ok(format!("{}@{}", self.value, version))
        }
    }

    #[test]
    fn test_ensure_len_synthesizes_empty_slots() {
        let mut list: BuilderList<Scratch> = BuilderList::new();
        assert!(list.get_mut(2).is_none());
        list.ensure_len(3);
        assert_eq!(list.len(), 3);
        list.get_mut(2).unwrap().value = "third".to_string();
        assert!(!list.is_empty());
        let committed = list.commit_all(Version::V3_1).unwrap();
        assert_eq!(committed.len(), 1);
        assert_eq!(*committed[0], "third@3.1");
    }

    #[test]
    fn test_ensure_len_never_shrinks() {
        let mut list: BuilderList<Scratch> = BuilderList::new();
        list.ensure_len(2).ensure_len(1);
        assert_eq!(list.len(), 2);
        assert!(list.is_empty());
    }
}
