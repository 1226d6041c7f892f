// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::io;

/// Errors returned by this library
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Key-derivation errors
    #[error(transparent)]
    Derivation(#[from] wallet_core::Error),
    /// Filesystem errors
    #[error(transparent)]
    Io(#[from] io::Error),
    /// JSON serialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Hex decoding errors
    #[error("Invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),
    /// SSZ merkleization errors
    #[error("A merkleization error occurred: {0:?}")]
    Ssz(ssz_rs::MerkleizationError),
    /// Keystore decryption checksum mismatch
    #[error("Invalid password or corrupt keystore")]
    KeystoreChecksum,
    /// Keystore fields inconsistent with EIP-2335
    #[error("Keystore file content is not valid: {0}")]
    KeystoreFormat(String),
    /// KDF function string not recognized
    #[error("Unsupported KDF function {0}")]
    UnsupportedKdf(String),
    /// Provided network not found
    #[error("Unknown network {0}")]
    UnknownNetwork(String),
    /// Fork versions are 4 bytes
    #[error("Fork version should be 4 bytes, got {0}")]
    InvalidForkVersion(usize),
    /// Genesis validators roots are 32 bytes
    #[error("Genesis validators root should be 32 bytes, got {0}")]
    InvalidValidatorsRoot(usize),
    /// Deposit amount outside the supported bounds
    #[error("A deposit of {0} gwei is not within the bounds of this wallet")]
    DepositAmount(u64),
    /// Caller-supplied list does not match the number of validators
    #[error("Expected {expected} {what}, got {actual}")]
    LengthMismatch {
        /// What the list holds
        what: &'static str,
        /// Number of validators in the batch
        expected: usize,
        /// Length of the supplied list
        actual: usize,
    },
    /// Keystore passwords must be at least 8 characters
    #[error("The password length should be at least 8")]
    WeakPassword,
    /// Execution address is not 20 hex-encoded bytes
    #[error("Invalid execution address {0}")]
    InvalidAddress(String),
    /// Execution address fails its EIP-55 checksum
    #[error("Execution address {0} is not checksummed correctly")]
    AddressChecksum(String),
    /// Operation requires an execution address but none was set
    #[error("The execution address should not be empty")]
    MissingExecutionAddress,
    /// Withdrawal credentials malformed or of the wrong kind
    #[error("Invalid BLS withdrawal credentials")]
    InvalidWithdrawalCredentials,
    /// Withdrawal credentials do not belong to the derived withdrawal key
    #[error("The withdrawal credentials do not match the provided mnemonic")]
    WithdrawalCredentialsMismatch,
    /// Validator indices are unsigned 32-bit integers
    #[error("Validator index {0} is out of range")]
    IndexOutOfRange(u64),
    /// A numeric input could not be parsed
    #[error("Expected a non-negative integer, got {0}")]
    NotAnInteger(String),
    /// A produced artifact failed re-verification after export
    #[error("Verification of the exported {0} failed")]
    VerificationFailed(&'static str),
    /// System clock is set before the Unix epoch
    #[error("System time is invalid")]
    SystemTime,
}

impl From<ssz_rs::MerkleizationError> for Error {
    fn from(e: ssz_rs::MerkleizationError) -> Self {
        Self::Ssz(e)
    }
}
