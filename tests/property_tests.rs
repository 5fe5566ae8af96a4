// SPDX-License-Identifier: PMPL-1.0-or-later

//! Property tests over randomly stacked chains

use ace_chain::{
    Ace, CapabilityRegistry, Chain, Consequence, Constraint, Derivation, Exploit, Key, LayerId, Mac,
    PrimitiveDescriptor, Requirement, SymEnc, Transform, TransformId,
};
use proptest::prelude::*;

/// `true` stacks an encryption layer, `false` an authentication layer.
/// Returns the chain, its head and the stacked transforms, innermost first.
fn build(stack: &[bool]) -> (Chain, LayerId, Vec<TransformId>) {
    let mut registry = CapabilityRegistry::new();
    registry.register_exploit("Plaintext", Exploit::new("read", Consequence::PlaintextRecovery));
    registry.register_exploit("Cipher", Exploit::new("peel", Consequence::PlaintextRecovery));
    registry.register_constraint(
        "Cipher",
        Constraint::structural("opaque", Consequence::PlaintextRecovery, None),
    );
    registry.register_exploit("Tag", Exploit::new("strip_tag", Consequence::IntegrityBypass));
    registry.register_constraint("Tag", Constraint::mac());

    let mut chain = Chain::new();
    let source = chain.add_transform(Transform::Derivation(Derivation::new(
        PrimitiveDescriptor::new("Plaintext", &[]),
    )));
    let mut head = chain.produce(&registry, source, None).unwrap();
    let mut transforms = Vec::new();

    for (i, encrypted) in stack.iter().enumerate() {
        let key = Key::Material(format!("k{}", i));
        let transform = if *encrypted {
            Transform::SymEnc(SymEnc::new(PrimitiveDescriptor::new("Cipher", &[]), None, key))
        } else {
            Transform::Mac(Mac::new(PrimitiveDescriptor::new("Tag", &[]), key))
        };
        let id = chain.add_transform(transform);
        head = chain.produce(&registry, id, Some(head)).unwrap();
        transforms.push(id);
    }
    (chain, head, transforms)
}

fn plan(stack: &[bool]) -> Vec<Exploit> {
    let (mut chain, head, _) = build(stack);
    let mut ace = Ace::new();
    ace.goal(&mut chain, head, Consequence::PlaintextRecovery).unwrap();
    ace.solve(&mut chain).unwrap()
}

proptest! {
    #[test]
    fn prop_one_exploit_per_layer(stack in prop::collection::vec(any::<bool>(), 0..8)) {
        let exploits = plan(&stack);
        prop_assert_eq!(exploits.len(), stack.len() + 1);

        // Outermost layer was stacked last
        for (exploit, encrypted) in exploits.iter().zip(stack.iter().rev()) {
            let expected = if *encrypted { "peel" } else { "strip_tag" };
            prop_assert_eq!(exploit.name.as_str(), expected);
        }
        prop_assert_eq!(exploits.last().map(|e| e.name.as_str()), Some("read"));
    }

    #[test]
    fn prop_planning_is_deterministic(stack in prop::collection::vec(any::<bool>(), 0..8)) {
        prop_assert_eq!(plan(&stack), plan(&stack));
    }

    #[test]
    fn prop_depth_counts_every_layer(stack in prop::collection::vec(any::<bool>(), 0..8)) {
        let (chain, head, _) = build(&stack);
        prop_assert_eq!(chain.depth(head).unwrap(), stack.len() + 1);
        prop_assert_eq!(chain.layer_count(), stack.len() + 1);
        let innermost = chain.innermost(head).unwrap();
        prop_assert_eq!(chain.root(innermost).unwrap(), head);
    }

    #[test]
    fn prop_consuming_every_layer_exposes_the_innermost(
        stack in prop::collection::vec(any::<bool>(), 0..8)
    ) {
        let (mut chain, head, transforms) = build(&stack);
        let innermost = chain.innermost(head).unwrap();
        let cursor = chain.cursor(head).unwrap();

        for (transform, encrypted) in transforms.iter().rev().zip(stack.iter().rev()) {
            let peeled = chain.exposed(cursor).unwrap().unwrap();
            chain.consume(*transform, cursor).unwrap();
            if *encrypted {
                prop_assert!(chain
                    .layer(peeled)
                    .unwrap()
                    .is_satisfied(Requirement::EventuallyDecrypts));
            }
        }

        prop_assert_eq!(chain.exposed(cursor).unwrap(), Some(innermost));
        prop_assert_eq!(chain.cursor_origin(cursor).unwrap(), head);
    }
}
