// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for ace-chain
//!
//! Consequences, requirements, exploits and constraints are the vocabulary
//! shared by the capability registry, the layer chain and the solver.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Cryptanalytic outcome an exploit delivers or a constraint guards against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consequence {
    KeyRecovery,
    PlaintextRecovery,
    PlaintextManipulation,
    IntegrityBypass,
    Forgery,
    Collision,
    StateRecovery,
}

impl Consequence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Consequence::KeyRecovery => "key_recovery",
            Consequence::PlaintextRecovery => "plaintext_recovery",
            Consequence::PlaintextManipulation => "plaintext_manipulation",
            Consequence::IntegrityBypass => "integrity_bypass",
            Consequence::Forgery => "forgery",
            Consequence::Collision => "collision",
            Consequence::StateRecovery => "state_recovery",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "key_recovery" => Some(Consequence::KeyRecovery),
            "plaintext_recovery" => Some(Consequence::PlaintextRecovery),
            "plaintext_manipulation" => Some(Consequence::PlaintextManipulation),
            "integrity_bypass" => Some(Consequence::IntegrityBypass),
            "forgery" => Some(Consequence::Forgery),
            "collision" => Some(Consequence::Collision),
            "state_recovery" => Some(Consequence::StateRecovery),
            _ => None,
        }
    }
}

impl fmt::Display for Consequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Goal-side precondition about how a layer is eventually handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// Someone holding the right component decrypts this layer at some point
    EventuallyDecrypts,
}

/// A fact proven about a layer.
///
/// Consequences and requirements share one namespace here: an exploit may
/// require either, and a layer records either as satisfied. The two are
/// never otherwise interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fact {
    Consequence(Consequence),
    Requirement(Requirement),
}

impl From<Consequence> for Fact {
    fn from(consequence: Consequence) -> Self {
        Fact::Consequence(consequence)
    }
}

impl From<Requirement> for Fact {
    fn from(requirement: Requirement) -> Self {
        Fact::Requirement(requirement)
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fact::Consequence(c) => write!(f, "{}", c),
            Fact::Requirement(Requirement::EventuallyDecrypts) => f.write_str("eventually_decrypts"),
        }
    }
}

/// Stable identity of a primitive, used as the registry key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimitiveId(String);

impl PrimitiveId {
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PrimitiveId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExploitKind {
    #[default]
    Technique,
    /// Structural placeholder; never part of an emitted plan
    Identity,
}

/// A known attack technique against a primitive
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exploit {
    pub name: String,
    #[serde(default)]
    pub requirements: BTreeSet<Fact>,
    pub consequence: Consequence,
    #[serde(default)]
    pub kind: ExploitKind,
}

impl Exploit {
    pub fn new(name: &str, consequence: Consequence) -> Self {
        Self {
            name: name.to_string(),
            requirements: BTreeSet::new(),
            consequence,
            kind: ExploitKind::Technique,
        }
    }

    /// No-op exploit for layers whose content is already exposed
    pub fn identity(consequence: Consequence) -> Self {
        Self {
            name: "identity".to_string(),
            requirements: BTreeSet::new(),
            consequence,
            kind: ExploitKind::Identity,
        }
    }

    pub fn requires(mut self, fact: impl Into<Fact>) -> Self {
        self.requirements.insert(fact.into());
        self
    }

    pub fn is_identity(&self) -> bool {
        self.kind == ExploitKind::Identity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    /// Carries the solver's goal on the innermost layer
    Identity,
    /// Integrity was verified over this layer
    Mac,
    /// Imposed by the primitive itself, sourced from the registry
    Structural,
}

/// A structural obstacle a layer imposes on an attacker
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub needed_consequence: Consequence,
    pub prevents_consequence: Option<Consequence>,
}

impl Constraint {
    pub fn structural(
        name: &str,
        needed_consequence: Consequence,
        prevents_consequence: Option<Consequence>,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind: ConstraintKind::Structural,
            needed_consequence,
            prevents_consequence,
        }
    }

    pub fn identity(goal: Consequence) -> Self {
        Self {
            name: "identity".to_string(),
            kind: ConstraintKind::Identity,
            needed_consequence: goal,
            prevents_consequence: None,
        }
    }

    pub fn mac() -> Self {
        Self {
            name: "mac".to_string(),
            kind: ConstraintKind::Mac,
            needed_consequence: Consequence::IntegrityBypass,
            prevents_consequence: Some(Consequence::PlaintextManipulation),
        }
    }

    /// Whether this constraint blocks an exploit that depends on `fact`
    pub fn prevents(&self, fact: &Fact) -> bool {
        match (self.prevents_consequence, fact) {
            (Some(prevented), Fact::Consequence(c)) => prevented == *c,
            _ => false,
        }
    }
}
