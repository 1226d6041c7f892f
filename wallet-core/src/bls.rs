// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! BLS12-381 signing adapter.
//!
//! Wraps `blst` in its `min_pk` configuration (48-byte G1 public keys,
//! 96-byte G2 signatures) under the proof-of-possession ciphersuite used by
//! the consensus layer.

use blst::min_pk;
use blst::BLST_ERROR;

use crate::Error;

/// Domain separation tag of the G2 proof-of-possession scheme.
const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// Size of a serialized secret scalar in bytes.
pub const SECRET_KEY_SIZE: usize = 32;
/// Size of a compressed G1 public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 48;
/// Size of a compressed G2 signature in bytes.
pub const SIGNATURE_SIZE: usize = 96;

/// A BLS12-381 secret scalar in `[1, r)`.
///
/// The backing store is wiped on drop by the `blst` backend.
#[derive(Clone)]
pub struct SecretKey(min_pk::SecretKey);

impl SecretKey {
    /// Deserializes a secret key from its 32-byte big-endian encoding.
    ///
    /// Rejects zero and anything at or above the subgroup order.
    pub fn from_bytes(bytes: &[u8; SECRET_KEY_SIZE]) -> Result<Self, Error> {
        min_pk::SecretKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| Error::InvalidSecretKey)
    }

    /// The 32-byte big-endian encoding of the scalar.
    pub fn to_bytes(&self) -> [u8; SECRET_KEY_SIZE] {
        self.0.to_bytes()
    }

    /// The compressed G1 public key of this secret key.
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.sk_to_pk().to_bytes()
    }

    /// Signs `message` under the proof-of-possession ciphersuite.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_SIZE] {
        self.0.sign(message, DST, &[]).to_bytes()
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for SecretKey {}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // never print key material
        f.write_str("SecretKey(..)")
    }
}

/// Verifies `signature` over `message` against a compressed public key.
///
/// Malformed keys or signatures verify as `false`, they are not errors.
pub fn verify(
    public_key: &[u8; PUBLIC_KEY_SIZE],
    message: &[u8],
    signature: &[u8; SIGNATURE_SIZE],
) -> bool {
    let Ok(pk) = min_pk::PublicKey::from_bytes(public_key) else {
        return false;
    };
    let Ok(sig) = min_pk::Signature::from_bytes(signature) else {
        return false;
    };
    sig.verify(true, message, DST, &[], &pk, true) == BLST_ERROR::BLST_SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SecretKey {
        let mut bytes = [0u8; SECRET_KEY_SIZE];
        bytes[31] = 1;
        SecretKey::from_bytes(&bytes).expect("one is a valid scalar")
    }

    #[test]
    fn rejects_zero_secret_key() {
        assert!(SecretKey::from_bytes(&[0u8; SECRET_KEY_SIZE]).is_err());
    }

    #[test]
    fn sign_and_verify() {
        let sk = test_key();
        let pk = sk.public_key();
        let sig = sk.sign(b"message");

        assert!(verify(&pk, b"message", &sig));
        assert!(!verify(&pk, b"other message", &sig));
    }

    #[test]
    fn malformed_inputs_do_not_verify() {
        let sk = test_key();
        let sig = sk.sign(b"message");
        assert!(!verify(&[0xffu8; PUBLIC_KEY_SIZE], b"message", &sig));

        let pk = sk.public_key();
        assert!(!verify(&pk, b"message", &[0xffu8; SIGNATURE_SIZE]));
    }
}
