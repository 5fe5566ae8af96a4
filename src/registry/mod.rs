// SPDX-License-Identifier: PMPL-1.0-or-later

//! Capability registry
//!
//! Maps a primitive identity to the known exploits that can be mounted
//! against it and the structural constraints it imposes. A registry is an
//! ordinary value: build one (or load a catalog) and pass it to the chain
//! when producing layers.
//!
//! Lookups cover a primitive's own identity and its *immediate*
//! generalizations only. `AES` generalizing to `BlockCipher` picks up the
//! `BlockCipher` facts, but not those of whatever `BlockCipher` generalizes to.

pub mod catalog;
pub mod standard;

use crate::types::{Constraint, Exploit, PrimitiveId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use catalog::CatalogSpec;

/// Anything that can key a registry lookup
pub trait Primitive {
    fn identity(&self) -> &PrimitiveId;

    /// Direct generalizations, in lookup order
    fn generalizes_to(&self) -> &[PrimitiveId];
}

/// Declared primitive identity with its direct generalizations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrimitiveDescriptor {
    pub id: PrimitiveId,
    #[serde(default)]
    pub generalizes: Vec<PrimitiveId>,
}

impl PrimitiveDescriptor {
    pub fn new(id: &str, generalizes: &[&str]) -> Self {
        Self {
            id: PrimitiveId::new(id),
            generalizes: generalizes.iter().map(|g| PrimitiveId::new(g)).collect(),
        }
    }
}

impl Primitive for PrimitiveDescriptor {
    fn identity(&self) -> &PrimitiveId {
        &self.id
    }

    fn generalizes_to(&self) -> &[PrimitiveId] {
        &self.generalizes
    }
}

#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    primitives: HashMap<PrimitiveId, PrimitiveDescriptor>,
    exploits: HashMap<PrimitiveId, Vec<Exploit>>,
    constraints: HashMap<PrimitiveId, Vec<Constraint>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a primitive so it can later be resolved by name.
    /// Redeclaring an identity replaces its generalizations.
    pub fn declare(&mut self, descriptor: PrimitiveDescriptor) {
        self.primitives.insert(descriptor.id.clone(), descriptor);
    }

    pub fn register_exploit(&mut self, primitive: &str, exploit: Exploit) {
        self.exploits
            .entry(PrimitiveId::new(primitive))
            .or_default()
            .push(exploit);
    }

    pub fn register_constraint(&mut self, primitive: &str, constraint: Constraint) {
        self.constraints
            .entry(PrimitiveId::new(primitive))
            .or_default()
            .push(constraint);
    }

    /// Resolve a declared primitive by identity
    pub fn primitive(&self, id: &str) -> Option<&PrimitiveDescriptor> {
        self.primitives.get(&PrimitiveId::new(id))
    }

    /// Declared primitives sorted by identity
    pub fn primitives(&self) -> Vec<&PrimitiveDescriptor> {
        let mut all: Vec<_> = self.primitives.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    pub fn exploits_for(&self, primitive: &dyn Primitive) -> Vec<Exploit> {
        Self::lookup(&self.exploits, primitive)
    }

    pub fn constraints_for(&self, primitive: &dyn Primitive) -> Vec<Constraint> {
        Self::lookup(&self.constraints, primitive)
    }

    pub fn exploit_count(&self) -> usize {
        self.exploits.values().map(Vec::len).sum()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.values().map(Vec::len).sum()
    }

    fn lookup<T: Clone>(table: &HashMap<PrimitiveId, Vec<T>>, primitive: &dyn Primitive) -> Vec<T> {
        std::iter::once(primitive.identity())
            .chain(primitive.generalizes_to().iter())
            .filter_map(|id| table.get(id))
            .flat_map(|entries| entries.iter().cloned())
            .collect()
    }
}
