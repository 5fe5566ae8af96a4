// SPDX-License-Identifier: PMPL-1.0-or-later

//! Layer chain arena
//!
//! A ciphertext is a finite, acyclic, doubly-linked sequence of layers.
//! `parent` points outward (towards the observed ciphertext), `child` points
//! inward (towards the plaintext anchor). Layers, transforms and cursors all
//! live in one arena and are addressed by index; peeling a layer moves a
//! cursor, it never frees a node.

use crate::error::{AceError, Result};
use crate::transform::{Key, Transform};
use crate::types::{Constraint, Exploit, Fact};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CursorId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformId(usize);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl fmt::Display for CursorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

impl fmt::Display for TransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// One peelable wrapping of the ciphertext
#[derive(Debug, Clone)]
pub struct Layer {
    pub(crate) owner: TransformId,
    pub(crate) parent: Option<LayerId>,
    pub(crate) child: Option<LayerId>,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) exploits: Vec<Exploit>,
    pub(crate) requirements_satisfied: BTreeSet<Fact>,
}

impl Layer {
    pub fn owner(&self) -> TransformId {
        self.owner
    }

    pub fn parent(&self) -> Option<LayerId> {
        self.parent
    }

    pub fn child(&self) -> Option<LayerId> {
        self.child
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn exploits(&self) -> &[Exploit] {
        &self.exploits
    }

    pub fn requirements_satisfied(&self) -> &BTreeSet<Fact> {
        &self.requirements_satisfied
    }

    pub fn is_satisfied(&self, fact: impl Into<Fact>) -> bool {
        self.requirements_satisfied.contains(&fact.into())
    }

    pub fn is_innermost(&self) -> bool {
        self.child.is_none()
    }
}

/// How much of a chain has been peeled
#[derive(Debug, Clone, Copy)]
struct CursorState {
    origin: LayerId,
    exposed: Option<LayerId>,
}

#[derive(Debug, Default)]
pub struct Chain {
    layers: Vec<Layer>,
    transforms: Vec<Transform>,
    cursors: Vec<CursorState>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transform(&mut self, transform: Transform) -> TransformId {
        self.transforms.push(transform);
        TransformId(self.transforms.len() - 1)
    }

    pub fn transform(&self, id: TransformId) -> Result<&Transform> {
        self.transforms
            .get(id.0)
            .ok_or(AceError::UnknownTransform(id))
    }

    pub fn layer(&self, id: LayerId) -> Result<&Layer> {
        self.layers.get(id.0).ok_or(AceError::UnknownLayer(id))
    }

    pub(crate) fn layer_mut(&mut self, id: LayerId) -> Result<&mut Layer> {
        self.layers.get_mut(id.0).ok_or(AceError::UnknownLayer(id))
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Open a cursor exposing `layer`
    pub fn cursor(&mut self, layer: LayerId) -> Result<CursorId> {
        self.layer(layer)?;
        self.cursors.push(CursorState {
            origin: layer,
            exposed: Some(layer),
        });
        Ok(CursorId(self.cursors.len() - 1))
    }

    /// Layer currently exposed by a cursor; `None` once fully peeled
    pub fn exposed(&self, cursor: CursorId) -> Result<Option<LayerId>> {
        self.cursors
            .get(cursor.0)
            .map(|state| state.exposed)
            .ok_or(AceError::UnknownCursor(cursor))
    }

    /// Layer the cursor was opened on
    pub fn cursor_origin(&self, cursor: CursorId) -> Result<LayerId> {
        self.cursors
            .get(cursor.0)
            .map(|state| state.origin)
            .ok_or(AceError::UnknownCursor(cursor))
    }

    pub(crate) fn advance(&mut self, cursor: CursorId, to: Option<LayerId>) -> Result<()> {
        let state = self
            .cursors
            .get_mut(cursor.0)
            .ok_or(AceError::UnknownCursor(cursor))?;
        state.exposed = to;
        Ok(())
    }

    /// Append a constraint to a layer
    pub fn constrain(&mut self, layer: LayerId, constraint: Constraint) -> Result<()> {
        self.layer_mut(layer)?.constraints.push(constraint);
        Ok(())
    }

    pub(crate) fn satisfy(&mut self, layer: LayerId, fact: impl Into<Fact>) -> Result<()> {
        self.layer_mut(layer)?.requirements_satisfied.insert(fact.into());
        Ok(())
    }

    pub(crate) fn push_layer(
        &mut self,
        owner: TransformId,
        child: Option<LayerId>,
        constraints: Vec<Constraint>,
        exploits: Vec<Exploit>,
    ) -> Result<LayerId> {
        let id = LayerId(self.layers.len());
        if let Some(inner) = child {
            let inner_layer = self.layer_mut(inner)?;
            if let Some(existing) = inner_layer.parent {
                return Err(AceError::MalformedChain {
                    layer: inner,
                    reason: format!("already wrapped by {}", existing),
                });
            }
            inner_layer.parent = Some(id);
        }
        self.layers.push(Layer {
            owner,
            parent: None,
            child,
            constraints,
            exploits,
            requirements_satisfied: BTreeSet::new(),
        });
        Ok(id)
    }

    /// `from` and every layer it wraps, outermost first
    pub fn descendants(&self, from: LayerId) -> Result<Vec<LayerId>> {
        self.walk(from, |layer| layer.child)
    }

    /// Follow `child` pointers to the plaintext anchor
    pub fn innermost(&self, from: LayerId) -> Result<LayerId> {
        let path = self.descendants(from)?;
        Ok(*path.last().unwrap_or(&from))
    }

    /// Follow `parent` pointers to the observed ciphertext
    pub fn root(&self, from: LayerId) -> Result<LayerId> {
        let path = self.walk(from, |layer| layer.parent)?;
        Ok(*path.last().unwrap_or(&from))
    }

    /// Number of layers from `from` inward, inclusive
    pub fn depth(&self, from: LayerId) -> Result<usize> {
        Ok(self.descendants(from)?.len())
    }

    /// Outermost layer of the transform's key chain, if the key is a chain
    pub fn key_root(&self, transform: TransformId) -> Result<Option<LayerId>> {
        match self.transform(transform)?.key() {
            Key::Chain(cursor) => {
                let origin = self.cursor_origin(*cursor)?;
                Ok(Some(self.root(origin)?))
            }
            _ => Ok(None),
        }
    }

    fn walk(&self, from: LayerId, step: impl Fn(&Layer) -> Option<LayerId>) -> Result<Vec<LayerId>> {
        let mut seen = HashSet::new();
        let mut path = Vec::new();
        let mut current = from;

        loop {
            if !seen.insert(current) {
                return Err(AceError::MalformedChain {
                    layer: current,
                    reason: "cycle detected while walking the chain".to_string(),
                });
            }
            path.push(current);
            match step(self.layer(current)?) {
                Some(next) => current = next,
                None => return Ok(path),
            }
        }
    }
}
