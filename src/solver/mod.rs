// SPDX-License-Identifier: PMPL-1.0-or-later

//! ACE: automated exploit chaining
//!
//! Goal-directed backward search over a layer chain. Starting from the
//! outermost layer, each layer's exploits are tried in registration order
//! and the first usable one is taken (greedy, deterministic, not optimal).
//! When an exploit is blocked on key recovery, the owner's key chain becomes
//! a sub-goal solved by a nested solver, after which the traversal restarts
//! from the goal layer.

use crate::chain::{Chain, Layer, LayerId, TransformId};
use crate::error::{AceError, Result};
use crate::types::{Consequence, Constraint, Exploit};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum nesting of key-recovery sub-goals
    pub max_depth: usize,
    /// Maximum traversal restarts per solver instance
    pub max_restarts: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_restarts: 64,
        }
    }
}

/// Exploit chain plus what it took to find it
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub exploits: Vec<Exploit>,
    pub restarts: usize,
    pub subgoals: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct SolveStats {
    restarts: usize,
    subgoals: usize,
}

enum Step {
    Advance(Exploit),
    Restart,
}

#[derive(Debug, Clone, Default)]
pub struct Ace {
    config: SolverConfig,
    depth: usize,
    final_state: Option<LayerId>,
    goal_consequence: Option<Consequence>,
}

impl Ace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn final_state(&self) -> Option<LayerId> {
        self.final_state
    }

    pub fn goal_consequence(&self) -> Option<Consequence> {
        self.goal_consequence
    }

    /// Hand the solver to caller code to declare goals and constraints
    pub fn execute<F, R>(&mut self, setup: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        setup(self)
    }

    /// Aim the solver at achieving `consequence` starting from `head`
    pub fn goal(&mut self, chain: &mut Chain, head: LayerId, consequence: Consequence) -> Result<()> {
        let innermost = chain.innermost(head)?;
        chain.constrain(innermost, Constraint::identity(consequence))?;
        self.final_state = Some(head);
        self.goal_consequence = Some(consequence);
        Ok(())
    }

    pub fn solve(&self, chain: &mut Chain) -> Result<Vec<Exploit>> {
        self.solve_report(chain).map(|report| report.exploits)
    }

    pub fn solve_report(&self, chain: &mut Chain) -> Result<SolveReport> {
        let started = Instant::now();
        let mut stats = SolveStats::default();
        let exploits = self.search(chain, &mut stats)?;
        let elapsed = started.elapsed();

        info!(
            exploits = exploits.len(),
            restarts = stats.restarts,
            subgoals = stats.subgoals,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "solve completed"
        );

        Ok(SolveReport {
            exploits,
            restarts: stats.restarts,
            subgoals: stats.subgoals,
            elapsed,
        })
    }

    /// Walk from the goal layer inward, one exploit per layer.
    ///
    /// The returned plan is every key-recovery sub-goal chain in the order
    /// it was solved, followed by the exploits of the final traversal,
    /// outermost layer first. Exploits picked in a traversal that ended in a
    /// restart are dropped, so no layer appears twice.
    fn search(&self, chain: &mut Chain, stats: &mut SolveStats) -> Result<Vec<Exploit>> {
        let start = self.final_state.ok_or(AceError::NoGoal)?;
        let goal = self.goal_consequence.ok_or(AceError::NoGoal)?;

        // Sub-goal chains survive a restart; per-layer picks do not.
        let mut prerequisites = Vec::new();
        let mut traversal = Vec::new();
        let mut restarts = 0;
        let mut current = Some(start);

        while let Some(layer) = current {
            match self.step(chain, layer, goal, &mut prerequisites, stats)? {
                Step::Advance(exploit) => {
                    traversal.push(exploit);
                    current = chain.layer(layer)?.child();
                }
                Step::Restart => {
                    restarts += 1;
                    stats.restarts += 1;
                    if restarts > self.config.max_restarts {
                        return Err(AceError::RestartLimit { restarts });
                    }
                    debug!(depth = self.depth, restarts, "returning to top");
                    traversal.clear();
                    current = Some(start);
                }
            }
        }

        Ok(prerequisites
            .into_iter()
            .chain(traversal)
            .filter(|exploit| !exploit.is_identity())
            .collect())
    }

    fn step(
        &self,
        chain: &mut Chain,
        id: LayerId,
        goal: Consequence,
        prerequisites: &mut Vec<Exploit>,
        stats: &mut SolveStats,
    ) -> Result<Step> {
        let layer = chain.layer(id)?.clone();
        let mut last_needed = None;

        for exploit in &layer.exploits {
            let blocking = blocking_needs(&layer, exploit);
            if let Some(&first) = blocking.first() {
                if first == Consequence::KeyRecovery {
                    if let Some(key_chain) = self.recover_key(chain, id, layer.owner, stats)? {
                        prerequisites.extend(key_chain);
                        chain.satisfy(id, Consequence::KeyRecovery)?;
                        return Ok(Step::Restart);
                    }
                }
                debug!(layer = %id, exploit = %exploit.name, need = %first, "exploit blocked");
                continue;
            }

            if !exploit
                .requirements
                .iter()
                .all(|requirement| layer.requirements_satisfied.contains(requirement))
            {
                last_needed = None;
                continue;
            }

            for (index, constraint) in layer.constraints.iter().enumerate() {
                last_needed = Some(constraint.needed_consequence);
                if defeats(&layer, exploit, index, goal) {
                    debug!(
                        layer = %id,
                        exploit = %exploit.name,
                        needed = %constraint.needed_consequence,
                        "constraint reachable"
                    );
                    return Ok(Step::Advance(exploit.clone()));
                }
            }
        }

        Err(AceError::UnresolvedGoal {
            layer: id,
            last_needed,
        })
    }

    /// Solve the owner's key chain for plaintext recovery.
    /// `None` when the key is not a chain and so cannot be a sub-goal.
    fn recover_key(
        &self,
        chain: &mut Chain,
        layer: LayerId,
        owner: TransformId,
        stats: &mut SolveStats,
    ) -> Result<Option<Vec<Exploit>>> {
        let Some(key_root) = chain.key_root(owner)? else {
            debug!(layer = %layer, owner = %owner, "key recovery needed but the key is not a chain");
            return Ok(None);
        };

        if self.depth >= self.config.max_depth {
            return Err(AceError::RecursionLimit {
                depth: self.config.max_depth,
            });
        }

        debug!(
            layer = %layer,
            key_root = %key_root,
            depth = self.depth + 1,
            "cannot continue without key; attempting key recovery"
        );

        let mut sub_solver = Ace {
            config: self.config.clone(),
            depth: self.depth + 1,
            final_state: None,
            goal_consequence: None,
        };
        sub_solver.goal(chain, key_root, Consequence::PlaintextRecovery)?;
        stats.subgoals += 1;
        sub_solver.search(chain, stats).map(Some)
    }
}

/// Needs of this layer's constraints that stand between the exploit and its
/// requirements and are not yet satisfied, in constraint order
fn blocking_needs(layer: &Layer, exploit: &Exploit) -> Vec<Consequence> {
    layer
        .constraints
        .iter()
        .filter(|constraint| exploit.requirements.iter().any(|r| constraint.prevents(r)))
        .filter(|constraint| !layer.is_satisfied(constraint.needed_consequence))
        .map(|constraint| constraint.needed_consequence)
        .collect()
}

/// Whether `exploit` defeats the constraint at `index`:
/// it delivers the needed consequence or is not what the constraint prevents,
/// satisfying that constraint does not break a sibling, and on the innermost
/// layer it delivers the goal itself.
fn defeats(layer: &Layer, exploit: &Exploit, index: usize, goal: Consequence) -> bool {
    let constraint = &layer.constraints[index];

    let reaches = exploit.consequence == constraint.needed_consequence
        || Some(exploit.consequence) != constraint.prevents_consequence;

    let breaks_sibling = layer
        .constraints
        .iter()
        .enumerate()
        .any(|(i, other)| i != index && other.prevents_consequence == Some(constraint.needed_consequence));

    let terminal_ok = !layer.is_innermost() || exploit.consequence == goal;

    reaches && !breaks_sibling && terminal_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CapabilityRegistry, PrimitiveDescriptor};
    use crate::transform::{Derivation, Key, SymEnc, Transform};
    use crate::types::Requirement;
    use std::collections::BTreeSet;

    fn layer_with(constraints: Vec<Constraint>, innermost: bool) -> Layer {
        let mut chain = Chain::new();
        let owner = chain.add_transform(Transform::Derivation(Derivation::new(
            PrimitiveDescriptor::new("Plaintext", &[]),
        )));
        let inner = chain.push_layer(owner, None, Vec::new(), Vec::new()).unwrap();
        let id = if innermost {
            inner
        } else {
            chain.push_layer(owner, Some(inner), Vec::new(), Vec::new()).unwrap()
        };
        let mut layer = chain.layer(id).unwrap().clone();
        layer.constraints = constraints;
        layer.requirements_satisfied = BTreeSet::new();
        layer
    }

    fn secret_key() -> Constraint {
        Constraint::structural("secret_key", Consequence::KeyRecovery, Some(Consequence::KeyRecovery))
    }

    #[test]
    fn test_blocking_needs_follow_prevented_requirements() {
        let layer = layer_with(vec![secret_key(), Constraint::mac()], false);
        let keyed = Exploit::new("keyed", Consequence::PlaintextRecovery).requires(Consequence::KeyRecovery);
        let oracle = Exploit::new("oracle", Consequence::PlaintextRecovery)
            .requires(Requirement::EventuallyDecrypts);
        let flip = Exploit::new("flip", Consequence::Forgery).requires(Consequence::PlaintextManipulation);

        assert_eq!(blocking_needs(&layer, &keyed), vec![Consequence::KeyRecovery]);
        assert!(blocking_needs(&layer, &oracle).is_empty());
        assert_eq!(blocking_needs(&layer, &flip), vec![Consequence::IntegrityBypass]);
    }

    #[test]
    fn test_satisfied_need_no_longer_blocks() {
        let mut layer = layer_with(vec![secret_key()], false);
        layer
            .requirements_satisfied
            .insert(Consequence::KeyRecovery.into());
        let keyed = Exploit::new("keyed", Consequence::PlaintextRecovery).requires(Consequence::KeyRecovery);
        assert!(blocking_needs(&layer, &keyed).is_empty());
    }

    #[test]
    fn test_defeats_requires_goal_on_innermost() {
        let layer = layer_with(vec![Constraint::identity(Consequence::PlaintextRecovery)], true);
        let recover = Exploit::new("recover", Consequence::PlaintextRecovery);
        let manipulate = Exploit::new("manipulate", Consequence::PlaintextManipulation);
        assert!(defeats(&layer, &recover, 0, Consequence::PlaintextRecovery));
        assert!(!defeats(&layer, &manipulate, 0, Consequence::PlaintextRecovery));
    }

    #[test]
    fn test_defeats_rejects_prevented_consequence() {
        let layer = layer_with(vec![Constraint::mac()], false);
        let manipulate = Exploit::new("manipulate", Consequence::PlaintextManipulation);
        let bypass = Exploit::new("bypass", Consequence::IntegrityBypass);
        assert!(!defeats(&layer, &manipulate, 0, Consequence::PlaintextRecovery));
        assert!(defeats(&layer, &bypass, 0, Consequence::PlaintextRecovery));
    }

    #[test]
    fn test_defeats_rejects_breaking_a_sibling() {
        let guard = Constraint::structural("guard", Consequence::Collision, Some(Consequence::KeyRecovery));
        let layer = layer_with(vec![secret_key(), guard], false);
        let exploit = Exploit::new("anything", Consequence::Forgery);
        // secret_key's need (key recovery) is what `guard` prevents
        assert!(!defeats(&layer, &exploit, 0, Consequence::PlaintextRecovery));
        assert!(defeats(&layer, &exploit, 1, Consequence::PlaintextRecovery));
    }

    #[test]
    fn test_solve_without_goal() {
        let mut chain = Chain::new();
        assert!(matches!(Ace::new().solve(&mut chain), Err(AceError::NoGoal)));
    }

    #[test]
    fn test_execute_passes_solver_through() {
        let mut registry = CapabilityRegistry::new();
        registry.register_exploit("Plaintext", Exploit::new("read", Consequence::PlaintextRecovery));
        let mut chain = Chain::new();
        let source = chain.add_transform(Transform::Derivation(Derivation::new(
            PrimitiveDescriptor::new("Plaintext", &[]),
        )));
        let head = chain.produce(&registry, source, None).unwrap();

        let mut ace = Ace::new();
        ace.execute(|solver| solver.goal(&mut chain, head, Consequence::PlaintextRecovery))
            .unwrap();
        assert_eq!(ace.final_state(), Some(head));
        assert_eq!(ace.goal_consequence(), Some(Consequence::PlaintextRecovery));
        assert_eq!(ace.solve(&mut chain).unwrap()[0].name, "read");
    }

    #[test]
    fn test_restart_limit() {
        let mut registry = CapabilityRegistry::new();
        registry.register_exploit("PRNG", Exploit::new("predict", Consequence::PlaintextRecovery));
        registry.register_exploit(
            "AES",
            Exploit::new("keyed", Consequence::PlaintextRecovery).requires(Consequence::KeyRecovery),
        );
        registry.register_constraint("AES", secret_key());

        let mut chain = Chain::new();
        let prng = chain.add_transform(Transform::Derivation(Derivation::new(
            PrimitiveDescriptor::new("PRNG", &[]),
        )));
        let key_layer = chain.produce(&registry, prng, None).unwrap();
        let key_cursor = chain.cursor(key_layer).unwrap();
        let aes = chain.add_transform(Transform::SymEnc(SymEnc::new(
            PrimitiveDescriptor::new("AES", &[]),
            None,
            Key::Chain(key_cursor),
        )));
        let head = chain.produce(&registry, aes, None).unwrap();

        let mut ace = Ace::with_config(SolverConfig {
            max_depth: 8,
            max_restarts: 0,
        });
        ace.goal(&mut chain, head, Consequence::PlaintextRecovery).unwrap();
        assert!(matches!(
            ace.solve(&mut chain),
            Err(AceError::RestartLimit { restarts: 1 })
        ));
    }
}
