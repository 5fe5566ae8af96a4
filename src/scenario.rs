// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scenario files: a declarative recipe for building a chain and a goal
//!
//! Steps run in file order, so a transform keyed by a layer must come after
//! the step that produces that layer.
//!
//! ```yaml
//! name: aes-cbc with prng key
//! steps:
//!   - { op: transform, name: prng, kind: derivation, algorithm: MT19937 }
//!   - { op: produce, layer: key, transform: prng }
//!   - { op: transform, name: source, kind: derivation, algorithm: Plaintext }
//!   - { op: produce, layer: message, transform: source }
//!   - op: transform
//!     name: enc
//!     kind: encryption
//!     algorithm: AES
//!     mode: CBC
//!     key: { layer: key }
//!   - { op: produce, layer: ciphertext, transform: enc, wraps: message }
//! goal: { layer: ciphertext, consequence: plaintext_recovery }
//! ```

use crate::chain::{Chain, CursorId, LayerId, TransformId};
use crate::error::AceError;
use crate::registry::{CapabilityRegistry, PrimitiveDescriptor};
use crate::report::PlanReport;
use crate::solver::{Ace, SolverConfig};
use crate::transform::{Derivation, Key, Mac, SymEnc, Transform, TransformKind};
use crate::types::{Consequence, PrimitiveId};
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json;
use serde_yaml;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub solver: SolverConfig,
    pub steps: Vec<StepSpec>,
    pub goal: GoalSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum StepSpec {
    Transform {
        name: String,
        kind: TransformKind,
        algorithm: String,
        #[serde(default)]
        mode: Option<String>,
        #[serde(default)]
        key: Option<KeySpec>,
    },
    Produce {
        layer: String,
        transform: String,
        #[serde(default)]
        wraps: Option<String>,
    },
    Cursor {
        name: String,
        layer: String,
    },
    Consume {
        transform: String,
        cursor: String,
    },
}

/// Exactly one of `material` or `layer`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeySpec {
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub layer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoalSpec {
    pub layer: String,
    pub consequence: Consequence,
}

/// A scenario's chain with its names resolved
#[derive(Debug, Default)]
pub struct BuiltScenario {
    pub chain: Chain,
    pub layers: HashMap<String, LayerId>,
    pub transforms: HashMap<String, TransformId>,
    pub cursors: HashMap<String, CursorId>,
}

impl BuiltScenario {
    pub fn layer(&self, name: &str) -> Result<LayerId> {
        self.layers
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("unknown layer '{}'", name))
    }

    fn transform(&self, name: &str) -> Result<TransformId> {
        self.transforms
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("unknown transform '{}'", name))
    }

    fn cursor(&self, name: &str) -> Result<CursorId> {
        self.cursors
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("unknown cursor '{}'", name))
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("parsing json scenario {}", path.display())),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("parsing yaml scenario {}", path.display())),
            _ => Err(anyhow!("unsupported scenario extension for {}", path.display())),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed scenario")
    }

    /// Run every step against a fresh chain
    pub fn build(&self, registry: &CapabilityRegistry) -> Result<BuiltScenario> {
        let mut built = BuiltScenario::default();

        for (index, step) in self.steps.iter().enumerate() {
            self.apply_step(registry, &mut built, step)
                .with_context(|| format!("scenario step {}", index + 1))?;
        }

        Ok(built)
    }

    /// Build the chain, set the goal and solve it
    pub fn plan(&self, registry: &CapabilityRegistry) -> Result<PlanReport> {
        let mut built = self.build(registry)?;
        let head = built.layer(&self.goal.layer)?;

        let mut ace = Ace::with_config(self.solver.clone());
        ace.goal(&mut built.chain, head, self.goal.consequence)?;
        let report = ace
            .solve_report(&mut built.chain)
            .with_context(|| format!("planning {}", self.display_name()))?;

        Ok(PlanReport::new(self.display_name(), self.goal.consequence, report))
    }

    fn apply_step(
        &self,
        registry: &CapabilityRegistry,
        built: &mut BuiltScenario,
        step: &StepSpec,
    ) -> Result<()> {
        match step {
            StepSpec::Transform {
                name,
                kind,
                algorithm,
                mode,
                key,
            } => {
                let alg = resolve(registry, algorithm)?;
                let key = match key {
                    Some(spec) => resolve_key(built, spec)?,
                    None => Key::None,
                };
                let transform = match kind {
                    TransformKind::Encryption => {
                        let mode = mode.as_deref().map(|m| resolve(registry, m)).transpose()?;
                        Transform::SymEnc(SymEnc::new(alg, mode, key))
                    }
                    TransformKind::Authentication => {
                        if mode.is_some() {
                            bail!("authentication transform '{}' cannot take a mode", name);
                        }
                        Transform::Mac(Mac::new(alg, key))
                    }
                    TransformKind::Derivation => {
                        if mode.is_some() || key != Key::None {
                            bail!("derivation '{}' takes neither mode nor key", name);
                        }
                        Transform::Derivation(Derivation::new(alg))
                    }
                };
                let id = built.chain.add_transform(transform);
                if built.transforms.insert(name.clone(), id).is_some() {
                    bail!("transform '{}' declared twice", name);
                }
            }
            StepSpec::Produce {
                layer,
                transform,
                wraps,
            } => {
                let transform = built.transform(transform)?;
                let inner = wraps.as_deref().map(|w| built.layer(w)).transpose()?;
                let id = built.chain.produce(registry, transform, inner)?;
                if built.layers.insert(layer.clone(), id).is_some() {
                    bail!("layer '{}' produced twice", layer);
                }
            }
            StepSpec::Cursor { name, layer } => {
                let layer = built.layer(layer)?;
                let id = built.chain.cursor(layer)?;
                built.cursors.insert(name.clone(), id);
            }
            StepSpec::Consume { transform, cursor } => {
                let transform = built.transform(transform)?;
                let cursor = built.cursor(cursor)?;
                built.chain.consume(transform, cursor)?;
            }
        }
        Ok(())
    }
}

fn resolve(registry: &CapabilityRegistry, id: &str) -> Result<PrimitiveDescriptor> {
    registry
        .primitive(id)
        .cloned()
        .ok_or_else(|| AceError::UnknownPrimitive(PrimitiveId::new(id)).into())
}

fn resolve_key(built: &mut BuiltScenario, spec: &KeySpec) -> Result<Key> {
    match (&spec.material, &spec.layer) {
        (Some(material), None) => Ok(Key::Material(material.clone())),
        (None, Some(layer)) => {
            let layer = built.layer(layer)?;
            Ok(Key::Chain(built.chain.cursor(layer)?))
        }
        _ => Err(anyhow!("key must name exactly one of 'material' or 'layer'")),
    }
}
