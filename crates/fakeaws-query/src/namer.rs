//! Positional sub-path generation for lists and maps

use crate::shape::{ContainerTraits, join};

/// Generates `{prefix}.{n}` element paths, 1-based
#[derive(Debug, Clone)]
pub struct ElementNamer {
    prefix: String,
}

impl ElementNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Path of the element at zero-based position `index`
    pub fn name(&self, index: usize) -> String {
        join(&self.prefix, &(index + 1).to_string())
    }
}

/// Generates key and value paths for map entries
#[derive(Debug, Clone)]
pub struct MapNamer {
    elements: ElementNamer,
    key_name: String,
    value_name: String,
}

impl MapNamer {
    pub fn new(prefix: impl Into<String>, traits: &ContainerTraits) -> Self {
        Self {
            elements: ElementNamer::new(prefix),
            key_name: traits.key_name().to_string(),
            value_name: traits.value_name().to_string(),
        }
    }

    pub fn key_name(&self, index: usize) -> String {
        join(&self.elements.name(index), &self.key_name)
    }

    pub fn value_name(&self, index: usize) -> String {
        join(&self.elements.name(index), &self.value_name)
    }
}
