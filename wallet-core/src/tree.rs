// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! EIP-2333 tree-structured key derivation.
//!
//! A parent secret key and a 32-bit index deterministically yield a child
//! secret key through a Lamport intermediate: the parent scalar (and its
//! bitwise complement) expand via HKDF into 255 chunks each, the hashed
//! chunks compress into the child's Lamport public key, and `hkdf_mod_r`
//! maps that into the scalar field.

use num_bigint::BigUint;

use crate::bls::{SecretKey, SECRET_KEY_SIZE};
use crate::crypto::{hkdf_sha256, sha256};
use crate::Error;

/// Order of the BLS12-381 subgroup, big-endian.
const CURVE_ORDER: [u8; 32] = [
    0x73, 0xed, 0xa7, 0x53, 0x29, 0x9d, 0x7d, 0x48, 0x33, 0x39, 0xd8, 0x08,
    0x09, 0xa1, 0xd8, 0x05, 0x53, 0xbd, 0xa4, 0x02, 0xff, 0xfe, 0x5b, 0xfe,
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01,
];

/// Initial HKDF salt of `hkdf_mod_r`, rehashed on every loop iteration.
const KEYGEN_SALT: &[u8] = b"BLS-SIG-KEYGEN-SALT-";

/// Number of 32-byte chunks in one Lamport secret key.
const LAMPORT_CHUNKS: usize = 255;

/// Derives the master secret key of a seed.
///
/// The seed must be at least 32 bytes; a BIP-39 seed is 64.
pub fn derive_master_sk(seed: &[u8]) -> Result<SecretKey, Error> {
    if seed.len() < 32 {
        return Err(Error::SeedTooShort(seed.len()));
    }
    hkdf_mod_r(seed, &[])
}

/// Derives the child secret key of `parent_sk` at `index`.
pub fn derive_child_sk(
    parent_sk: &SecretKey,
    index: u32,
) -> Result<SecretKey, Error> {
    let lamport_pk = parent_sk_to_lamport_pk(parent_sk, index)?;
    hkdf_mod_r(&lamport_pk, &[])
}

/// Maps input key material into a nonzero scalar mod r.
///
/// The salt starts from `KEYGEN_SALT` and is rehashed with SHA-256 before
/// every attempt, so a candidate scalar of zero advances the salt instead
/// of being returned.
pub(crate) fn hkdf_mod_r(ikm: &[u8], key_info: &[u8]) -> Result<SecretKey, Error> {
    let order = BigUint::from_bytes_be(&CURVE_ORDER);

    // ikm ‖ I2OSP(0, 1)
    let mut input = Vec::with_capacity(ikm.len() + 1);
    input.extend_from_slice(ikm);
    input.push(0x00);

    // key_info ‖ I2OSP(L, 2), L = 48
    let mut info = Vec::with_capacity(key_info.len() + 2);
    info.extend_from_slice(key_info);
    info.extend_from_slice(&48u16.to_be_bytes());

    let mut salt = KEYGEN_SALT.to_vec();
    loop {
        salt = sha256(&salt).to_vec();

        let mut okm = [0u8; 48];
        hkdf_sha256(&salt, &input, &info, &mut okm)?;

        let candidate = BigUint::from_bytes_be(&okm) % &order;
        if candidate != BigUint::from(0u32) {
            let bytes = candidate.to_bytes_be();
            let mut sk = [0u8; SECRET_KEY_SIZE];
            sk[SECRET_KEY_SIZE - bytes.len()..].copy_from_slice(&bytes);
            return SecretKey::from_bytes(&sk);
        }
    }
}

/// XOR of a 256-bit value with all ones.
fn flip_bits_256(input: &[u8; 32]) -> [u8; 32] {
    let mut flipped = [0u8; 32];
    for (out, byte) in flipped.iter_mut().zip(input) {
        *out = !byte;
    }
    flipped
}

/// Expands `ikm` into the 255 chunks of a Lamport secret key.
fn ikm_to_lamport_sk(
    ikm: &[u8; 32],
    salt: &[u8; 4],
) -> Result<Vec<[u8; 32]>, Error> {
    let mut okm = vec![0u8; LAMPORT_CHUNKS * 32];
    hkdf_sha256(salt, ikm, &[], &mut okm)?;
    Ok(okm
        .chunks_exact(32)
        .map(|chunk| {
            let mut piece = [0u8; 32];
            piece.copy_from_slice(chunk);
            piece
        })
        .collect())
}

/// Compresses the `index`th child's Lamport public key out of `parent_sk`.
fn parent_sk_to_lamport_pk(
    parent_sk: &SecretKey,
    index: u32,
) -> Result<[u8; 32], Error> {
    let salt = index.to_be_bytes();
    let ikm = parent_sk.to_bytes();

    let lamport_0 = ikm_to_lamport_sk(&ikm, &salt)?;
    let not_ikm = flip_bits_256(&ikm);
    let lamport_1 = ikm_to_lamport_sk(&not_ikm, &salt)?;

    let mut hashes = Vec::with_capacity(2 * LAMPORT_CHUNKS * 32);
    for chunk in lamport_0.iter().chain(lamport_1.iter()) {
        hashes.extend_from_slice(&sha256(chunk));
    }
    Ok(sha256(&hashes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flips_every_bit() {
        let flipped = flip_bits_256(&[0x0fu8; 32]);
        assert_eq!(flipped, [0xf0u8; 32]);
    }

    #[test]
    fn lamport_expansion_shape() {
        let chunks = ikm_to_lamport_sk(&[7u8; 32], &[0, 0, 0, 1]).unwrap();
        assert_eq!(chunks.len(), LAMPORT_CHUNKS);
        // chunks are distinct HKDF output, not repeats
        assert_ne!(chunks[0], chunks[1]);
    }

    #[test]
    fn key_info_changes_the_key() {
        let plain = hkdf_mod_r(&[0u8; 32], &[]).unwrap();
        let with_info = hkdf_mod_r(&[0u8; 32], &[0xff; 16]).unwrap();
        assert_ne!(plain, with_info);
    }

    #[test]
    fn rejects_short_seed() {
        assert!(matches!(
            derive_master_sk(&[0x12u8; 31]),
            Err(Error::SeedTooShort(31))
        ));
    }
}
