//! Read-only views of rank-local particle clouds.
//!
//! Unlike the mesh, particle populations change every step: particles are
//! created, destroyed, and migrate between ranks. The cloud writer therefore
//! recomputes the global layout for every cloud at every write. A rank that
//! currently holds no particles for a cloud simply contributes zero rows.

use crate::error::ExportError;
use std::collections::BTreeMap;

/// Per-particle values of one attribute on this rank.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeData {
    Scalar(Vec<f64>),
    Vector(Vec<[f64; 3]>),
    /// Integer-valued attributes (particle ids, origin processor, ...).
    Label(Vec<i64>),
}

impl AttributeData {
    pub fn len(&self) -> usize {
        match self {
            AttributeData::Scalar(v) => v.len(),
            AttributeData::Vector(v) => v.len(),
            AttributeData::Label(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn components(&self) -> usize {
        match self {
            AttributeData::Vector(_) => 3,
            _ => 1,
        }
    }

    /// Wire code used to agree on an attribute's kind across ranks:
    /// 0 absent, 1 scalar, 2 vector, 3 label.
    pub(crate) fn kind_code(&self) -> u64 {
        match self {
            AttributeData::Scalar(_) => 1,
            AttributeData::Vector(_) => 2,
            AttributeData::Label(_) => 3,
        }
    }
}

/// One cloud's local particles and their attributes.
#[derive(Clone, Debug, Default)]
pub struct CloudView {
    name: String,
    n_particles: usize,
    attributes: BTreeMap<String, AttributeData>,
}

impl CloudView {
    pub fn new(name: impl Into<String>, n_particles: usize) -> Self {
        Self {
            name: name.into(),
            n_particles,
            attributes: BTreeMap::new(),
        }
    }

    /// Attach an attribute; its length must match the particle count.
    pub fn insert_attribute(
        &mut self,
        name: impl Into<String>,
        data: AttributeData,
    ) -> Result<(), ExportError> {
        let name = name.into();
        if data.len() != self.n_particles {
            return Err(ExportError::AttributeLengthMismatch {
                cloud: self.name.clone(),
                attrib: name,
                expected: self.n_particles as u64,
                actual: data.len() as u64,
            });
        }
        self.attributes.insert(name, data);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_particles(&self) -> usize {
        self.n_particles
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeData> {
        self.attributes.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_length_is_checked() {
        let mut cloud = CloudView::new("kinematicCloud", 3);
        let err = cloud
            .insert_attribute("d", AttributeData::Scalar(vec![1.0]))
            .unwrap_err();
        assert!(matches!(err, ExportError::AttributeLengthMismatch { .. }));
        cloud
            .insert_attribute("d", AttributeData::Scalar(vec![1.0, 2.0, 3.0]))
            .unwrap();
        assert_eq!(cloud.attribute("d").unwrap().len(), 3);
    }

    #[test]
    fn empty_cloud_accepts_empty_attributes() {
        let mut cloud = CloudView::new("dust", 0);
        cloud
            .insert_attribute("U", AttributeData::Vector(Vec::new()))
            .unwrap();
        assert_eq!(cloud.attribute("U").unwrap().components(), 3);
    }
}
