// SPDX-License-Identifier: PMPL-1.0-or-later

//! Built-in catalog of primitives and the known attacks against them
//!
//! Used whenever no catalog file is supplied. Each primitive lists only its
//! direct generalizations; facts registered two levels up are deliberately
//! invisible to it.

use crate::registry::{CapabilityRegistry, PrimitiveDescriptor};
use crate::types::Consequence::*;
use crate::types::{Constraint, Exploit, Requirement};

const PRIMITIVES: &[(&str, &[&str])] = &[
    ("SymmetricCipher", &[]),
    ("BlockCipher", &["SymmetricCipher"]),
    ("AES", &["BlockCipher"]),
    ("Blowfish", &["BlockCipher"]),
    ("StreamCipher", &["SymmetricCipher"]),
    ("RC4", &["StreamCipher"]),
    ("XOR", &["StreamCipher"]),
    ("BlockCipherMode", &[]),
    ("ECB", &["BlockCipherMode"]),
    ("CBC", &["BlockCipherMode"]),
    ("CTR", &["BlockCipherMode", "StreamCipher"]),
    ("MAC", &[]),
    ("HMAC", &["MAC"]),
    ("CBCMAC", &["MAC"]),
    ("Hash", &[]),
    ("MerkleDamgardConstruction", &["Hash"]),
    ("MD5", &["MerkleDamgardConstruction"]),
    ("SHA1", &["MerkleDamgardConstruction"]),
    ("SpongeConstruction", &["Hash"]),
    ("PRNG", &[]),
    ("MT19937", &["PRNG"]),
    ("PCG", &["PRNG"]),
    ("DualEC", &["PRNG"]),
    ("PublicKeyCipher", &[]),
    ("RSA", &["PublicKeyCipher"]),
    ("RSAPadding", &[]),
    ("PKCS1v15", &["RSAPadding"]),
    ("OAEP", &["RSAPadding"]),
    ("Compression", &[]),
    ("DEFLATE", &["Compression"]),
    ("Plaintext", &[]),
];

pub fn standard_registry() -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();

    for (id, generalizes) in PRIMITIVES {
        registry.declare(PrimitiveDescriptor::new(id, generalizes));
    }

    // Keyed primitives: nothing keyed is readable without the key
    for keyed in ["BlockCipher", "StreamCipher", "MAC"] {
        registry.register_constraint(
            keyed,
            Constraint::structural("secret_key", KeyRecovery, Some(KeyRecovery)),
        );
    }
    registry.register_constraint(
        "PublicKeyCipher",
        Constraint::structural("private_key", KeyRecovery, Some(KeyRecovery)),
    );
    registry.register_constraint(
        "PRNG",
        Constraint::structural("unpredictable_output", StateRecovery, None),
    );
    registry.register_constraint(
        "Hash",
        Constraint::structural("preimage_resistance", Collision, Some(Forgery)),
    );
    registry.register_constraint(
        "Compression",
        Constraint::structural("length_leak", PlaintextRecovery, None),
    );

    for keyed in ["BlockCipher", "StreamCipher"] {
        registry.register_exploit(
            keyed,
            Exploit::new("decrypt_with_recovered_key", PlaintextRecovery).requires(KeyRecovery),
        );
    }

    registry.register_exploit("ECB", Exploit::new("ecb_prepend_attack", PlaintextRecovery));
    registry.register_exploit(
        "CBC",
        Exploit::new("cbc_padding_oracle_attack", PlaintextRecovery)
            .requires(Requirement::EventuallyDecrypts),
    );
    registry.register_exploit(
        "CBC",
        Exploit::new("cbc_iv_key_equivalence_attack", KeyRecovery)
            .requires(Requirement::EventuallyDecrypts),
    );
    registry.register_exploit(
        "StreamCipher",
        Exploit::new("xor_bitflipping_attack", PlaintextManipulation),
    );
    registry.register_exploit("RC4", Exploit::new("rc4_prepend_attack", PlaintextRecovery));
    registry.register_exploit("XOR", Exploit::new("xor_transposition_attack", PlaintextRecovery));
    registry.register_exploit("XOR", Exploit::new("xor_dictionary_attack", KeyRecovery));

    registry.register_exploit("CBCMAC", Exploit::new("cbc_mac_length_extension", Forgery));
    registry.register_exploit(
        "MAC",
        Exploit::new("mac_forgery_with_recovered_key", Forgery).requires(KeyRecovery),
    );

    registry.register_exploit(
        "MerkleDamgardConstruction",
        Exploit::new("iterated_hash_multicollision", Collision),
    );
    registry.register_exploit(
        "MerkleDamgardConstruction",
        Exploit::new("nostradamus_attack", Forgery).requires(Collision),
    );

    registry.register_exploit("MT19937", Exploit::new("mt19937_output_prediction", PlaintextRecovery));
    registry.register_exploit("PCG", Exploit::new("pcg_state_recovery", PlaintextRecovery));
    registry.register_exploit("DualEC", Exploit::new("dual_ec_backdoor_prediction", PlaintextRecovery));

    registry.register_exploit(
        "PKCS1v15",
        Exploit::new("pkcs1v15_padding_oracle_attack", PlaintextRecovery)
            .requires(Requirement::EventuallyDecrypts),
    );
    registry.register_exploit(
        "OAEP",
        Exploit::new("mangers_attack", PlaintextRecovery).requires(Requirement::EventuallyDecrypts),
    );

    registry.register_exploit("Compression", Exploit::new("crime_attack", PlaintextRecovery));
    registry.register_exploit(
        "Compression",
        Exploit::new("compression_ratio_side_channel_attack", PlaintextRecovery),
    );

    registry.register_exploit("Plaintext", Exploit::identity(PlaintextRecovery));

    registry
}
