// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "staking-wallet", version, about, long_about = None)]
pub(crate) struct WalletArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Output directory for the produced artifacts
    #[arg(long, global = true, default_value = ".")]
    pub output_folder: PathBuf,

    /// Network to produce artifacts for
    #[arg(long, global = true, default_value = "mainnet")]
    pub chain: String,

    /// Ad-hoc network as NAME:FORK_VERSION:GENESIS_VALIDATORS_ROOT,
    /// overrides --chain
    #[arg(long, global = true)]
    pub devnet_chain_setting: Option<String>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Log format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub(crate) enum LogFormat {
    Json,
    Plain,
    Coloured,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Generate a fresh mnemonic, validator keystores and deposit data
    NewMnemonic {
        /// Word-list language of the generated mnemonic
        #[arg(long, default_value = "english")]
        mnemonic_language: String,
        /// Number of validators to create
        #[arg(long)]
        num_validators: usize,
        /// Deposit amount per validator in gwei
        #[arg(long, default_value_t = 32_000_000_000)]
        amount_gwei: u64,
        /// First validator index of the batch
        #[arg(long, default_value_t = 0)]
        validator_start_index: u64,
        /// Execution address for 0x01 withdrawal credentials (EIP-55)
        #[arg(long)]
        execution_address: Option<String>,
        /// Keystore password; prompted for when omitted
        #[arg(long)]
        keystore_password: Option<String>,
    },
    /// Regenerate keystores and deposit data from an existing mnemonic
    ExistingMnemonic {
        /// The mnemonic; prompted for when omitted
        #[arg(long)]
        mnemonic: Option<String>,
        /// BIP-39 passphrase of the mnemonic
        #[arg(long, default_value = "")]
        mnemonic_password: String,
        /// Number of validators to create
        #[arg(long)]
        num_validators: usize,
        /// Deposit amount per validator in gwei
        #[arg(long, default_value_t = 32_000_000_000)]
        amount_gwei: u64,
        /// First validator index of the batch
        #[arg(long, default_value_t = 0)]
        validator_start_index: u64,
        /// Execution address for 0x01 withdrawal credentials (EIP-55)
        #[arg(long)]
        execution_address: Option<String>,
        /// Keystore password; prompted for when omitted
        #[arg(long)]
        keystore_password: Option<String>,
    },
    /// Rotate BLS withdrawal credentials to an execution address
    GenerateBlsToExecutionChange {
        /// The mnemonic; prompted for when omitted
        #[arg(long)]
        mnemonic: Option<String>,
        /// BIP-39 passphrase of the mnemonic
        #[arg(long, default_value = "")]
        mnemonic_password: String,
        /// First validator index of the original batch
        #[arg(long, default_value_t = 0)]
        validator_start_index: u64,
        /// On-chain validator indices, comma separated
        #[arg(long)]
        validator_indices: String,
        /// Current BLS withdrawal credentials, comma separated
        #[arg(long)]
        bls_withdrawal_credentials_list: String,
        /// Execution address to rotate to (EIP-55)
        #[arg(long)]
        execution_address: String,
    },
    /// Sign a voluntary exit with a keystore-held key
    ExitTransactionKeystore {
        /// Path of the EIP-2335 keystore
        #[arg(long)]
        keystore: PathBuf,
        /// Keystore password; prompted for when omitted
        #[arg(long)]
        keystore_password: Option<String>,
        /// On-chain index of the validator
        #[arg(long)]
        validator_index: u64,
        /// Earliest processing epoch of the exit
        #[arg(long)]
        epoch: u64,
    },
    /// Sign voluntary exits with mnemonic-derived keys
    ExitTransactionMnemonic {
        /// The mnemonic; prompted for when omitted
        #[arg(long)]
        mnemonic: Option<String>,
        /// BIP-39 passphrase of the mnemonic
        #[arg(long, default_value = "")]
        mnemonic_password: String,
        /// First validator index of the original batch
        #[arg(long, default_value_t = 0)]
        validator_start_index: u64,
        /// On-chain validator indices, comma separated
        #[arg(long)]
        validator_indices: String,
        /// Earliest processing epoch of the exits
        #[arg(long)]
        epoch: u64,
    },
}
