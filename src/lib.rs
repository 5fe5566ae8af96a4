// SPDX-License-Identifier: PMPL-1.0-or-later

//! ACE: automated exploit chaining.
//!
//! Models a ciphertext as a chain of layers, one per cryptographic transform
//! (encryption, authentication, key derivation), and plans an ordered
//! sequence of known attacks that reaches a goal such as plaintext recovery.
//!
//! ENGINE PILLARS:
//! 1. **Chain**: arena of layers, transforms and cursors.
//! 2. **Transforms**: adapters that wrap and peel layers, attaching the
//!    registry's exploits and constraints to what they produce.
//! 3. **Registry**: primitives, their generalizations, and the attacks and
//!    security properties known for each.
//! 4. **Solver**: greedy backward search with recursive key-recovery sub-goals.

pub mod chain;
pub mod error;
pub mod registry;
pub mod report;
pub mod scenario;
pub mod solver;
pub mod transform;
pub mod types;

pub use chain::{Chain, CursorId, Layer, LayerId, TransformId};
pub use error::{AceError, Result};
pub use registry::{CapabilityRegistry, PrimitiveDescriptor};
pub use solver::{Ace, SolveReport, SolverConfig};
pub use transform::{Derivation, Key, Mac, SymEnc, Transform, TransformKind};
pub use types::{Consequence, Constraint, Exploit, Fact, Requirement};
