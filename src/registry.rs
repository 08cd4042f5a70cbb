use crate::spec::PatchSpec;
use std::collections::HashSet;
use thiserror::Error;

/// The ordered, immutable list of specs for one run. Registration order is
/// the only execution order: no dependency graph, no reordering.
#[derive(Debug, Clone)]
pub struct Registry {
    name: String,
    specs: Vec<PatchSpec>,
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("registry '{registry}' contains duplicate spec id '{spec_id}'")]
    DuplicateId { registry: String, spec_id: String },

    #[error("registry '{registry}' contains no specs")]
    Empty { registry: String },
}

impl Registry {
    pub fn new(name: impl Into<String>, specs: Vec<PatchSpec>) -> Result<Self, RegistryError> {
        let name = name.into();

        if specs.is_empty() {
            return Err(RegistryError::Empty { registry: name });
        }

        let mut seen = HashSet::new();
        for spec in &specs {
            if !seen.insert(spec.id.as_str()) {
                return Err(RegistryError::DuplicateId {
                    registry: name.clone(),
                    spec_id: spec.id.clone(),
                });
            }
        }

        Ok(Self { name, specs })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn specs(&self) -> &[PatchSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
