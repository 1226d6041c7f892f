// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! # Staking Wallet
//!
//! An offline wallet for Ethereum proof-of-stake validators. From a BIP-39
//! mnemonic it derives BLS12-381 validator key pairs, encrypts them into
//! EIP-2335 keystores, and emits signed deposit, BLS-to-execution-change
//! and voluntary-exit messages a consensus-layer node can verify
//! bit-exactly.
//!
//! The wallet never touches the network: every artifact is written to disk
//! and re-read for verification before a batch is reported as complete.

#![deny(missing_docs)]

pub mod batch;
pub mod chain;
pub mod credential;
pub mod exit_transaction;
pub mod keystore;
pub mod ssz;
pub mod validation;

mod error;

pub use error::Error;

/// Gwei per ETH.
pub const ETH2GWEI: u64 = 1_000_000_000;
/// Smallest deposit this wallet will produce, in gwei.
pub const MIN_DEPOSIT_AMOUNT: u64 = ETH2GWEI;
/// Largest deposit this wallet will produce, in gwei.
pub const MAX_DEPOSIT_AMOUNT: u64 = 32 * ETH2GWEI;

/// Prefix byte of BLS withdrawal credentials.
pub const BLS_WITHDRAWAL_PREFIX: u8 = 0x00;
/// Prefix byte of execution-address withdrawal credentials.
pub const ETH1_ADDRESS_WITHDRAWAL_PREFIX: u8 = 0x01;

/// Folder created under the output directory for keystores and deposit data.
pub const DEFAULT_VALIDATOR_KEYS_FOLDER_NAME: &str = "validator_keys";
/// Folder created under the output directory for BLS-to-execution changes.
pub const DEFAULT_BLS_TO_EXECUTION_CHANGES_FOLDER_NAME: &str =
    "bls_to_execution_changes";
/// Folder created under the output directory for signed exit transactions.
pub const DEFAULT_EXIT_TRANSACTION_FOLDER_NAME: &str = "exit_transactions";
