// SPDX-License-Identifier: PMPL-1.0-or-later

//! Data-driven catalog loader for the capability registry

use crate::registry::{CapabilityRegistry, PrimitiveDescriptor};
use crate::types::{Consequence, Constraint, Exploit, ExploitKind, Fact, PrimitiveId};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json;
use serde_yaml;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSpec {
    #[serde(default)]
    pub primitives: Vec<PrimitiveDescriptor>,
    #[serde(default)]
    pub exploits: Vec<ExploitEntry>,
    #[serde(default)]
    pub constraints: Vec<ConstraintEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExploitEntry {
    pub primitive: PrimitiveId,
    pub name: String,
    #[serde(default)]
    pub requirements: BTreeSet<Fact>,
    pub consequence: Consequence,
    #[serde(default)]
    pub kind: ExploitKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintEntry {
    pub primitive: PrimitiveId,
    pub name: String,
    pub needed: Consequence,
    #[serde(default)]
    pub prevents: Option<Consequence>,
}

impl ExploitEntry {
    fn to_exploit(&self) -> Exploit {
        Exploit {
            name: self.name.clone(),
            requirements: self.requirements.clone(),
            consequence: self.consequence,
            kind: self.kind,
        }
    }
}

impl ConstraintEntry {
    fn to_constraint(&self) -> Constraint {
        Constraint::structural(&self.name, self.needed, self.prevents)
    }
}

impl CatalogSpec {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("parsing json catalog {}", path.display())),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("parsing yaml catalog {}", path.display())),
            _ => Err(anyhow!("unsupported catalog extension for {}", path.display())),
        }
    }

    /// Register every entry, in file order. Entries naming an undeclared
    /// primitive are still registered; they are reachable once something
    /// declares or generalizes to that identity.
    pub fn apply_to_registry(&self, registry: &mut CapabilityRegistry) {
        for primitive in &self.primitives {
            registry.declare(primitive.clone());
        }
        for entry in &self.exploits {
            registry.register_exploit(entry.primitive.as_str(), entry.to_exploit());
        }
        for entry in &self.constraints {
            registry.register_constraint(entry.primitive.as_str(), entry.to_constraint());
        }
    }

    pub fn into_registry(self) -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::new();
        self.apply_to_registry(&mut registry);
        registry
    }
}

/// Registry from a catalog file, or the built-in standard catalog
pub fn load_registry(path: Option<&Path>) -> Result<CapabilityRegistry> {
    match path {
        Some(path) => Ok(CatalogSpec::load(path)?.into_registry()),
        None => Ok(crate::registry::standard::standard_registry()),
    }
}
