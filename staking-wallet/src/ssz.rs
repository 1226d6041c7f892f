// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! SSZ containers and signing domains.
//!
//! The fixed-size containers the consensus layer hashes and signs, plus the
//! domain computation that binds a signature to one network. Field order
//! and widths are consensus-critical; they follow the beacon-chain phase 0
//! specification exactly.

use ssz_rs::prelude::*;

use crate::Error;

/// Domain type of deposit signatures.
pub const DOMAIN_DEPOSIT: [u8; 4] = [0x03, 0x00, 0x00, 0x00];
/// Domain type of voluntary-exit signatures.
pub const DOMAIN_VOLUNTARY_EXIT: [u8; 4] = [0x04, 0x00, 0x00, 0x00];
/// Domain type of BLS-to-execution-change signatures.
pub const DOMAIN_BLS_TO_EXECUTION_CHANGE: [u8; 4] = [0x0a, 0x00, 0x00, 0x00];

const ZERO_VALIDATORS_ROOT: [u8; 32] = [0u8; 32];

/// Identifies a fork of the beacon chain.
#[derive(Default, Clone, SimpleSerialize)]
pub struct ForkData {
    /// Fork version of the current epoch.
    pub current_version: Vector<u8, 4>,
    /// Genesis validators root of the chain.
    pub genesis_validators_root: Vector<u8, 32>,
}

/// Wraps an object root with a domain before signing.
#[derive(Default, Clone, SimpleSerialize)]
pub struct SigningData {
    /// Hash tree root of the object being signed.
    pub object_root: Vector<u8, 32>,
    /// Signing domain the signature commits to.
    pub domain: Vector<u8, 32>,
}

/// The message part of a validator deposit.
#[derive(Default, Clone, SimpleSerialize)]
pub struct DepositMessage {
    /// Signing public key of the validator.
    pub pubkey: Vector<u8, 48>,
    /// Withdrawal credentials committed to by the deposit.
    pub withdrawal_credentials: Vector<u8, 32>,
    /// Deposit amount in gwei.
    pub amount: u64,
}

/// A complete, signed validator deposit.
#[derive(Default, Clone, SimpleSerialize)]
pub struct DepositData {
    /// Signing public key of the validator.
    pub pubkey: Vector<u8, 48>,
    /// Withdrawal credentials committed to by the deposit.
    pub withdrawal_credentials: Vector<u8, 32>,
    /// Deposit amount in gwei.
    pub amount: u64,
    /// Deposit signature under the deposit domain.
    pub signature: Vector<u8, 96>,
}

/// Rotation of BLS withdrawal credentials to an execution address.
#[derive(Default, Clone, SimpleSerialize)]
pub struct BLSToExecutionChange {
    /// Index of the validator on the beacon chain.
    pub validator_index: u64,
    /// The withdrawal public key the credentials derive from.
    pub from_bls_pubkey: Vector<u8, 48>,
    /// Execution address future withdrawals are sent to.
    pub to_execution_address: Vector<u8, 20>,
}

/// A [`BLSToExecutionChange`] with its signature.
#[derive(Default, Clone, SimpleSerialize)]
pub struct SignedBLSToExecutionChange {
    /// The change message.
    pub message: BLSToExecutionChange,
    /// Signature by the withdrawal key under the change domain.
    pub signature: Vector<u8, 96>,
}

/// A request to exit the active validator set.
#[derive(Default, Clone, SimpleSerialize)]
pub struct VoluntaryExit {
    /// Earliest epoch at which the exit can be processed.
    pub epoch: u64,
    /// Index of the validator on the beacon chain.
    pub validator_index: u64,
}

/// A [`VoluntaryExit`] with its signature.
#[derive(Default, Clone, SimpleSerialize)]
pub struct SignedVoluntaryExit {
    /// The exit message.
    pub message: VoluntaryExit,
    /// Signature by the signing key under the exit domain.
    pub signature: Vector<u8, 96>,
}

/// Copies a fixed-size byte array into an SSZ byte vector.
pub(crate) fn byte_vector<const N: usize>(bytes: [u8; N]) -> Vector<u8, N> {
    Vector::try_from(bytes.to_vec()).expect("length matches the vector size")
}

fn root_bytes(node: Node) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(node.as_ref());
    out
}

/// Hash tree root of an SSZ object as a plain byte array.
pub fn hash_tree_root<T: SimpleSerialize>(
    object: &mut T,
) -> Result<[u8; 32], Error> {
    Ok(root_bytes(object.hash_tree_root()?))
}

/// Hash tree root of the [`ForkData`] for a fork version and genesis
/// validators root.
pub fn compute_fork_data_root(
    current_version: [u8; 4],
    genesis_validators_root: [u8; 32],
) -> Result<[u8; 32], Error> {
    let mut fork_data = ForkData {
        current_version: byte_vector(current_version),
        genesis_validators_root: byte_vector(genesis_validators_root),
    };
    hash_tree_root(&mut fork_data)
}

/// A 32-byte signing domain: the domain type followed by the first 28
/// bytes of the fork data root.
pub fn compute_domain(
    domain_type: [u8; 4],
    fork_version: [u8; 4],
    genesis_validators_root: [u8; 32],
) -> Result<[u8; 32], Error> {
    let fork_data_root =
        compute_fork_data_root(fork_version, genesis_validators_root)?;
    let mut domain = [0u8; 32];
    domain[..4].copy_from_slice(&domain_type);
    domain[4..].copy_from_slice(&fork_data_root[..28]);
    Ok(domain)
}

/// Deposit domain for a fork version.
///
/// Deposits are valid across forks, so the validators root is fixed to
/// zero by specification.
pub fn compute_deposit_domain(fork_version: [u8; 4]) -> Result<[u8; 32], Error> {
    compute_domain(DOMAIN_DEPOSIT, fork_version, ZERO_VALIDATORS_ROOT)
}

/// Voluntary-exit domain for a fork version and genesis validators root.
pub fn compute_voluntary_exit_domain(
    fork_version: [u8; 4],
    genesis_validators_root: [u8; 32],
) -> Result<[u8; 32], Error> {
    compute_domain(DOMAIN_VOLUNTARY_EXIT, fork_version, genesis_validators_root)
}

/// BLS-to-execution-change domain for a fork version and genesis
/// validators root.
pub fn compute_bls_to_execution_change_domain(
    fork_version: [u8; 4],
    genesis_validators_root: [u8; 32],
) -> Result<[u8; 32], Error> {
    compute_domain(
        DOMAIN_BLS_TO_EXECUTION_CHANGE,
        fork_version,
        genesis_validators_root,
    )
}

/// Signing root of an SSZ object under `domain`.
pub fn compute_signing_root<T: SimpleSerialize>(
    object: &mut T,
    domain: [u8; 32],
) -> Result<[u8; 32], Error> {
    let object_root = hash_tree_root(object)?;
    let mut signing_data = SigningData {
        object_root: byte_vector(object_root),
        domain: byte_vector(domain),
    };
    hash_tree_root(&mut signing_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_domain_starts_with_its_type() {
        let domain = compute_deposit_domain([0, 0, 0, 0]).unwrap();
        assert_eq!(domain[..4], DOMAIN_DEPOSIT);

        let other_fork = compute_deposit_domain([1, 0, 0, 0]).unwrap();
        assert_ne!(domain, other_fork);
    }

    #[test]
    fn domains_differ_per_type_and_network() {
        let fv = [0u8; 4];
        let gvr = [0x11u8; 32];
        let exit = compute_voluntary_exit_domain(fv, gvr).unwrap();
        let btec = compute_bls_to_execution_change_domain(fv, gvr).unwrap();
        assert_ne!(exit, btec);
        assert_ne!(
            exit,
            compute_voluntary_exit_domain(fv, [0x22u8; 32]).unwrap()
        );
    }

    #[test]
    fn uint64_leaves_are_little_endian() {
        // hash_tree_root of a lone uint64 is the value little-endian padded
        // to a 32-byte chunk; DepositMessage places it in the third leaf.
        let mut message = DepositMessage {
            pubkey: byte_vector([0u8; 48]),
            withdrawal_credentials: byte_vector([0u8; 32]),
            amount: 1,
        };
        let root_one = hash_tree_root(&mut message).unwrap();
        message.amount = 256;
        let root_two_fifty_six = hash_tree_root(&mut message).unwrap();
        assert_ne!(root_one, root_two_fifty_six);
    }

    #[test]
    fn signing_root_commits_to_the_domain() {
        let mut exit = VoluntaryExit {
            epoch: 1,
            validator_index: 2,
        };
        let a = compute_signing_root(&mut exit, [0u8; 32]).unwrap();
        let b = compute_signing_root(&mut exit, [1u8; 32]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn fork_data_root_is_order_sensitive() {
        let a = compute_fork_data_root([1, 2, 3, 4], [0u8; 32]).unwrap();
        let b = compute_fork_data_root([4, 3, 2, 1], [0u8; 32]).unwrap();
        assert_ne!(a, b);
    }
}
