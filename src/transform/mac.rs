// SPDX-License-Identifier: PMPL-1.0-or-later

//! Message authentication transform

use crate::chain::{Chain, LayerId};
use crate::error::Result;
use crate::registry::PrimitiveDescriptor;
use crate::transform::{Key, TransformAdapter, TransformKind};
use crate::types::Constraint;

#[derive(Debug, Clone)]
pub struct Mac {
    pub alg: PrimitiveDescriptor,
    pub key: Key,
}

impl Mac {
    pub fn new(alg: PrimitiveDescriptor, key: Key) -> Self {
        Self { alg, key }
    }
}

impl TransformAdapter for Mac {
    fn kind(&self) -> TransformKind {
        TransformKind::Authentication
    }

    fn components(&self) -> Vec<&PrimitiveDescriptor> {
        vec![&self.alg]
    }

    fn key(&self) -> &Key {
        &self.key
    }

    /// Validation covers everything the tag wraps: the exposed layer and
    /// every layer inside it.
    fn on_consume(&self, chain: &mut Chain, layer: LayerId) -> Result<()> {
        for covered in chain.descendants(layer)? {
            chain.constrain(covered, Constraint::mac())?;
        }
        Ok(())
    }
}
