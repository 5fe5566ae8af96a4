// SPDX-License-Identifier: PMPL-1.0-or-later

//! Keyless derivations: PRNG output, hashing, encodings, plaintext sources
//!
//! Key chains are rooted in derivation layers, and a plaintext anchor is
//! usually a derivation layer of the `Plaintext` primitive.

use crate::chain::{Chain, LayerId};
use crate::error::Result;
use crate::registry::PrimitiveDescriptor;
use crate::transform::{Key, TransformAdapter, TransformKind};
use crate::types::Requirement;

#[derive(Debug, Clone)]
pub struct Derivation {
    pub alg: PrimitiveDescriptor,
    key: Key,
}

impl Derivation {
    pub fn new(alg: PrimitiveDescriptor) -> Self {
        Self { alg, key: Key::None }
    }
}

impl TransformAdapter for Derivation {
    fn kind(&self) -> TransformKind {
        TransformKind::Derivation
    }

    fn components(&self) -> Vec<&PrimitiveDescriptor> {
        vec![&self.alg]
    }

    fn key(&self) -> &Key {
        &self.key
    }

    fn on_consume(&self, chain: &mut Chain, layer: LayerId) -> Result<()> {
        chain.satisfy(layer, Requirement::EventuallyDecrypts)
    }
}
