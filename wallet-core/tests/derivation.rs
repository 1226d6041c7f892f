// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Key-tree derivation against the published EIP-2333 fixture.

use num_bigint::BigUint;

use wallet_core::bls::SecretKey;
use wallet_core::mnemonic::get_seed;
use wallet_core::path::mnemonic_and_path_to_key;
use wallet_core::tree::{derive_child_sk, derive_master_sk};

const TREZOR_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon \
     abandon abandon abandon about";

// EIP-2333 test case 0: the seed is the BIP-39 Trezor vector under the
// passphrase "TREZOR"; the expected keys are the EIP's decimal scalars.
const CASE0_SEED: &str =
    "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e5349553\
     1f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04";
const CASE0_MASTER_SK: &str =
    "6083874454709270928345386274498605044986640685124978867557563392430687146096";
const CASE0_CHILD_INDEX: u32 = 0;
const CASE0_CHILD_SK: &str =
    "20397789859736650942317412262472558107875392172444076792671091975210932703118";

fn sk_bytes_from_decimal(decimal: &str) -> [u8; 32] {
    let value = BigUint::parse_bytes(decimal.as_bytes(), 10).unwrap();
    let bytes = value.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

#[test]
fn master_key_matches_fixture() {
    let seed = hex::decode(CASE0_SEED).unwrap();
    let master = derive_master_sk(&seed).unwrap();
    assert_eq!(master.to_bytes(), sk_bytes_from_decimal(CASE0_MASTER_SK));
}

#[test]
fn child_key_matches_fixture() {
    let seed = hex::decode(CASE0_SEED).unwrap();
    let master = derive_master_sk(&seed).unwrap();
    let child = derive_child_sk(&master, CASE0_CHILD_INDEX).unwrap();
    assert_eq!(child.to_bytes(), sk_bytes_from_decimal(CASE0_CHILD_SK));
}

#[test]
fn child_at_max_index_derives() {
    let seed = hex::decode(CASE0_SEED).unwrap();
    let master = derive_master_sk(&seed).unwrap();
    let child = derive_child_sk(&master, u32::MAX).unwrap();
    assert_ne!(child, master);
}

#[test]
fn seed_of_trezor_mnemonic_feeds_the_fixture() {
    let seed = get_seed(TREZOR_MNEMONIC, "TREZOR").unwrap();
    assert_eq!(hex::encode(seed.as_bytes()), CASE0_SEED);
}

#[test]
fn path_walk_equals_manual_derivation() {
    let root = mnemonic_and_path_to_key(TREZOR_MNEMONIC, "m", "TREZOR").unwrap();
    assert_eq!(root.to_bytes(), sk_bytes_from_decimal(CASE0_MASTER_SK));

    let child = mnemonic_and_path_to_key(TREZOR_MNEMONIC, "m/0", "TREZOR").unwrap();
    assert_eq!(child.to_bytes(), sk_bytes_from_decimal(CASE0_CHILD_SK));
}

#[test]
fn validator_paths_yield_distinct_keys() {
    let signing =
        mnemonic_and_path_to_key(TREZOR_MNEMONIC, "m/12381/3600/0/0/0", "")
            .unwrap();
    let withdrawal =
        mnemonic_and_path_to_key(TREZOR_MNEMONIC, "m/12381/3600/0/0", "")
            .unwrap();
    assert_ne!(signing, withdrawal);

    // same inputs, same key
    let again =
        mnemonic_and_path_to_key(TREZOR_MNEMONIC, "m/12381/3600/0/0/0", "")
            .unwrap();
    assert_eq!(signing, again);
}

#[test]
fn derived_keys_expose_consistent_public_keys() {
    let sk = mnemonic_and_path_to_key(TREZOR_MNEMONIC, "m/12381/3600/0/0/0", "")
        .unwrap();
    let rebuilt = SecretKey::from_bytes(&sk.to_bytes()).unwrap();
    assert_eq!(sk.public_key(), rebuilt.public_key());
}
