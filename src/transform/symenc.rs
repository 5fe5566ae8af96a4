// SPDX-License-Identifier: PMPL-1.0-or-later

//! Symmetric encryption transform (algorithm plus optional mode)

use crate::chain::{Chain, LayerId};
use crate::error::Result;
use crate::registry::PrimitiveDescriptor;
use crate::transform::{Key, TransformAdapter, TransformKind};
use crate::types::Requirement;

#[derive(Debug, Clone)]
pub struct SymEnc {
    pub alg: PrimitiveDescriptor,
    pub mode: Option<PrimitiveDescriptor>,
    pub key: Key,
}

impl SymEnc {
    pub fn new(alg: PrimitiveDescriptor, mode: Option<PrimitiveDescriptor>, key: Key) -> Self {
        Self { alg, mode, key }
    }
}

impl TransformAdapter for SymEnc {
    fn kind(&self) -> TransformKind {
        TransformKind::Encryption
    }

    fn components(&self) -> Vec<&PrimitiveDescriptor> {
        std::iter::once(&self.alg).chain(self.mode.iter()).collect()
    }

    fn key(&self) -> &Key {
        &self.key
    }

    fn on_consume(&self, chain: &mut Chain, layer: LayerId) -> Result<()> {
        chain.satisfy(layer, Requirement::EventuallyDecrypts)
    }
}
