// SPDX-License-Identifier: PMPL-1.0-or-later

//! Transform adapters
//!
//! A transform bridges a concrete primitive identity to the layer chain.
//! Producing wraps the current chain head in a new layer carrying the
//! registry's facts for the transform's components; consuming peels the
//! layer a cursor exposes, asserting ownership first.
//!
//! Ownership is structural: two transforms are the same owner when their
//! kind, component identities and keys match, where a key that is itself a
//! chain compares by the layer its cursor currently exposes.

pub mod derivation;
pub mod mac;
pub mod symenc;

use crate::chain::{Chain, CursorId, LayerId, TransformId};
use crate::error::{AceError, Result};
use crate::registry::{CapabilityRegistry, PrimitiveDescriptor};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use derivation::Derivation;
pub use mac::Mac;
pub use symenc::SymEnc;

/// Key held by a transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    None,
    /// Opaque key material (hex, label, ...)
    Material(String),
    /// Output of another derivation; recoverable through its own chain
    Chain(CursorId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    Encryption,
    Authentication,
    Derivation,
}

/// Behaviour a concrete transform contributes to the chain
pub trait TransformAdapter {
    fn kind(&self) -> TransformKind;

    /// Primitives whose registry facts are unioned into produced layers, in lookup order
    fn components(&self) -> Vec<&PrimitiveDescriptor>;

    fn key(&self) -> &Key;

    /// Effect of a successful, owner-checked peel of `layer`
    fn on_consume(&self, chain: &mut Chain, layer: LayerId) -> Result<()>;
}

#[derive(Debug, Clone)]
pub enum Transform {
    SymEnc(SymEnc),
    Mac(Mac),
    Derivation(Derivation),
}

impl Transform {
    pub fn adapter(&self) -> &dyn TransformAdapter {
        match self {
            Transform::SymEnc(t) => t,
            Transform::Mac(t) => t,
            Transform::Derivation(t) => t,
        }
    }

    pub fn kind(&self) -> TransformKind {
        self.adapter().kind()
    }

    pub fn key(&self) -> &Key {
        self.adapter().key()
    }

    /// `AES/CBC`, `HMAC`, `MT19937`
    pub fn label(&self) -> String {
        self.adapter()
            .components()
            .iter()
            .map(|c| c.id.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyView<'a> {
    None,
    Material(&'a str),
    Exposed(Option<LayerId>),
}

impl Chain {
    /// Wrap `inner` (the current chain head, or nothing) in a new layer owned by `transform`
    pub fn produce(
        &mut self,
        registry: &CapabilityRegistry,
        transform: TransformId,
        inner: Option<LayerId>,
    ) -> Result<LayerId> {
        let mut exploits = Vec::new();
        let mut constraints = Vec::new();
        for component in self.transform(transform)?.adapter().components() {
            exploits.extend(registry.exploits_for(component));
            constraints.extend(registry.constraints_for(component));
        }
        self.push_layer(transform, inner, constraints, exploits)
    }

    /// Peel the layer `cursor` exposes on behalf of `transform`.
    ///
    /// A transform that does not own the layer still peels it (the attacker
    /// forced a wrong decrypt), but proves nothing about it.
    pub fn consume(&mut self, transform: TransformId, cursor: CursorId) -> Result<CursorId> {
        let exposed = self
            .exposed(cursor)?
            .ok_or(AceError::CursorExhausted { cursor })?;
        let owner = self.layer(exposed)?.owner();

        if self.transforms_equal(owner, transform)? {
            let adapter = self.transform(transform)?.clone();
            adapter.adapter().on_consume(self, exposed)?;
        } else {
            warn!(
                transform = %self.transform(transform)?.label(),
                owner = %self.transform(owner)?.label(),
                layer = %exposed,
                "transform is not the owner of the exposed layer; peeling without effect"
            );
        }

        let child = self.layer(exposed)?.child();
        self.advance(cursor, child)?;
        Ok(cursor)
    }

    /// Structural equality over (kind, components, key)
    pub fn transforms_equal(&self, a: TransformId, b: TransformId) -> Result<bool> {
        let left = self.transform(a)?.adapter();
        let right = self.transform(b)?.adapter();
        if a == b {
            return Ok(true);
        }

        let same_components = left
            .components()
            .iter()
            .map(|c| &c.id)
            .eq(right.components().iter().map(|c| &c.id));

        Ok(left.kind() == right.kind()
            && same_components
            && self.key_view(left.key())? == self.key_view(right.key())?)
    }

    fn key_view<'a>(&self, key: &'a Key) -> Result<KeyView<'a>> {
        Ok(match key {
            Key::None => KeyView::None,
            Key::Material(material) => KeyView::Material(material),
            Key::Chain(cursor) => KeyView::Exposed(self.exposed(*cursor)?),
        })
    }
}
