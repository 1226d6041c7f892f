// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Batch orchestration.
//!
//! [`run_batch`] is the single entry point the CLI shell drives: it takes
//! one fully-parameterized [`Command`], writes every artifact the command
//! produces into the output directory, re-reads and verifies all of them,
//! and reports the produced paths. Failures propagate unchanged; there are
//! no retries, and files already written before a failure stay on disk for
//! the caller to inspect.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use wallet_core::bls::SecretKey;
use wallet_core::mnemonic::reconstruct_mnemonic;

use crate::chain::ChainSetting;
use crate::credential::CredentialList;
use crate::exit_transaction::{
    exit_transaction_generation, export_exit_transactions_json,
};
use crate::keystore::Keystore;
use crate::ssz::SignedVoluntaryExit;
use crate::validation::{
    validate_bls_withdrawal_credentials_matching, validate_password_strength,
    verify_bls_to_execution_change_json, verify_deposit_data_json,
    verify_exit_transactions_json,
};
use crate::{
    Error, DEFAULT_BLS_TO_EXECUTION_CHANGES_FOLDER_NAME,
    DEFAULT_EXIT_TRANSACTION_FOLDER_NAME,
    DEFAULT_VALIDATOR_KEYS_FOLDER_NAME,
};

/// Parameters shared by the two key-generation commands.
#[derive(Clone)]
pub struct KeygenParams {
    /// The mnemonic to derive from.
    pub mnemonic: String,
    /// BIP-39 passphrase, usually empty.
    pub mnemonic_password: String,
    /// Number of validators to produce.
    pub num_validators: usize,
    /// Deposit amount per validator, in gwei.
    pub amounts: Vec<u64>,
    /// Target network.
    pub chain_setting: ChainSetting,
    /// First EIP-2334 account index of the batch.
    pub validator_start_index: u64,
    /// Optional execution address for `0x01` withdrawal credentials.
    pub execution_address: Option<[u8; 20]>,
    /// Password the keystores are encrypted under.
    pub keystore_password: String,
}

/// Parameters of the BLS-to-execution-change command.
#[derive(Clone)]
pub struct BlsToExecutionChangeParams {
    /// The mnemonic the validators were created from.
    pub mnemonic: String,
    /// BIP-39 passphrase, usually empty.
    pub mnemonic_password: String,
    /// Number of validators to rotate.
    pub num_validators: usize,
    /// Target network.
    pub chain_setting: ChainSetting,
    /// First EIP-2334 account index of the original batch.
    pub validator_start_index: u64,
    /// On-chain index of each validator, in batch order.
    pub validator_indices: Vec<u64>,
    /// The current BLS withdrawal credentials of each validator.
    pub bls_withdrawal_credentials_list: Vec<[u8; 32]>,
    /// Execution address the credentials rotate to.
    pub execution_address: [u8; 20],
}

/// Parameters of the keystore-based exit command.
#[derive(Clone)]
pub struct ExitKeystoreParams {
    /// Path of the EIP-2335 keystore holding the signing key.
    pub keystore_path: PathBuf,
    /// Password of that keystore.
    pub keystore_password: String,
    /// On-chain index of the validator.
    pub validator_index: u64,
    /// Earliest epoch at which the exit can be processed.
    pub epoch: u64,
    /// Target network.
    pub chain_setting: ChainSetting,
}

/// Parameters of the mnemonic-based exit command.
#[derive(Clone)]
pub struct ExitMnemonicParams {
    /// The mnemonic the validators were created from.
    pub mnemonic: String,
    /// BIP-39 passphrase, usually empty.
    pub mnemonic_password: String,
    /// Target network.
    pub chain_setting: ChainSetting,
    /// First EIP-2334 account index of the original batch.
    pub validator_start_index: u64,
    /// On-chain index of each validator, in batch order.
    pub validator_indices: Vec<u64>,
    /// Earliest epoch at which the exits can be processed.
    pub epoch: u64,
}

/// One fully-parameterized batch operation.
#[derive(Clone)]
pub enum Command {
    /// Produce keystores and deposit data from a freshly generated
    /// mnemonic.
    NewMnemonic(KeygenParams),
    /// Produce keystores and deposit data from an existing mnemonic,
    /// abbreviations allowed.
    ExistingMnemonic(KeygenParams),
    /// Rotate BLS withdrawal credentials to an execution address.
    GenerateBlsToExecutionChange(BlsToExecutionChangeParams),
    /// Sign a voluntary exit with a key held in a keystore.
    ExitTransactionKeystore(ExitKeystoreParams),
    /// Sign voluntary exits with keys derived from a mnemonic.
    ExitTransactionMnemonic(ExitMnemonicParams),
}

/// Paths produced by a completed batch.
#[derive(Clone, Debug, Default)]
pub struct BatchSummary {
    /// Folder the artifacts were written into.
    pub output_folder: PathBuf,
    /// One keystore per validator, in batch order.
    pub keystore_files: Vec<PathBuf>,
    /// The deposit-data JSON array, if the command produced one.
    pub deposit_data_file: Option<PathBuf>,
    /// The BLS-to-execution-change JSON array, if produced.
    pub bls_to_execution_change_file: Option<PathBuf>,
    /// The signed-exit JSON array, if produced.
    pub exit_transaction_file: Option<PathBuf>,
}

/// Runs one batch operation under `output_folder`.
///
/// Every artifact is re-read from disk and verified before this returns;
/// any verification failure is fatal.
pub fn run_batch(
    command: Command,
    output_folder: &Path,
) -> Result<BatchSummary, Error> {
    match command {
        Command::NewMnemonic(params) => generate_keys(params, output_folder),
        Command::ExistingMnemonic(mut params) => {
            params.mnemonic = reconstruct_mnemonic(&params.mnemonic)?;
            generate_keys(params, output_folder)
        }
        Command::GenerateBlsToExecutionChange(params) => {
            generate_bls_to_execution_change(params, output_folder)
        }
        Command::ExitTransactionKeystore(params) => {
            exit_transaction_keystore(params, output_folder)
        }
        Command::ExitTransactionMnemonic(params) => {
            exit_transaction_mnemonic(params, output_folder)
        }
    }
}

fn generate_keys(
    params: KeygenParams,
    output_folder: &Path,
) -> Result<BatchSummary, Error> {
    validate_password_strength(&params.keystore_password)?;

    let folder = output_folder.join(DEFAULT_VALIDATOR_KEYS_FOLDER_NAME);
    fs::create_dir_all(&folder)?;

    info!(
        num_validators = params.num_validators,
        network = %params.chain_setting.network_name,
        "creating validator credentials"
    );
    let credentials = CredentialList::from_mnemonic(
        &params.mnemonic,
        &params.mnemonic_password,
        params.num_validators,
        &params.amounts,
        &params.chain_setting,
        params.validator_start_index,
        params.execution_address,
    )?;

    let keystore_files =
        credentials.export_keystores(&params.keystore_password, &folder)?;
    let deposit_data_file = credentials.export_deposit_data_json(&folder)?;

    if !credentials
        .verify_keystores(&keystore_files, &params.keystore_password)?
    {
        return Err(Error::VerificationFailed("keystores"));
    }
    if !verify_deposit_data_json(&deposit_data_file, credentials.credentials())?
    {
        return Err(Error::VerificationFailed("deposit data"));
    }
    info!("batch verified");

    Ok(BatchSummary {
        output_folder: folder,
        keystore_files,
        deposit_data_file: Some(deposit_data_file),
        ..Default::default()
    })
}

fn generate_bls_to_execution_change(
    params: BlsToExecutionChangeParams,
    output_folder: &Path,
) -> Result<BatchSummary, Error> {
    if params.validator_indices.len() != params.num_validators {
        return Err(Error::LengthMismatch {
            what: "validator indices",
            expected: params.num_validators,
            actual: params.validator_indices.len(),
        });
    }
    if params.bls_withdrawal_credentials_list.len() != params.num_validators {
        return Err(Error::LengthMismatch {
            what: "withdrawal credentials",
            expected: params.num_validators,
            actual: params.bls_withdrawal_credentials_list.len(),
        });
    }

    let folder =
        output_folder.join(DEFAULT_BLS_TO_EXECUTION_CHANGES_FOLDER_NAME);
    fs::create_dir_all(&folder)?;

    let mnemonic = reconstruct_mnemonic(&params.mnemonic)?;
    let credentials = CredentialList::from_mnemonic(
        &mnemonic,
        &params.mnemonic_password,
        params.num_validators,
        &vec![0; params.num_validators],
        &params.chain_setting,
        params.validator_start_index,
        Some(params.execution_address),
    )?;

    // the supplied credentials must belong to the derived withdrawal keys
    for (credential, supplied) in credentials
        .credentials()
        .iter()
        .zip(&params.bls_withdrawal_credentials_list)
    {
        validate_bls_withdrawal_credentials_matching(supplied, credential)?;
    }

    let change_file = credentials.export_bls_to_execution_change_json(
        &folder,
        &params.validator_indices,
    )?;

    if !verify_bls_to_execution_change_json(
        &change_file,
        credentials.credentials(),
        &params.validator_indices,
        &params.execution_address,
        &params.chain_setting,
    )? {
        return Err(Error::VerificationFailed("BLS to execution change"));
    }
    info!("batch verified");

    Ok(BatchSummary {
        output_folder: folder,
        bls_to_execution_change_file: Some(change_file),
        ..Default::default()
    })
}

fn exit_transaction_keystore(
    params: ExitKeystoreParams,
    output_folder: &Path,
) -> Result<BatchSummary, Error> {
    let keystore = Keystore::from_file(&params.keystore_path)?;
    let secret = keystore.decrypt(&params.keystore_password)?;
    let secret: [u8; 32] = secret.as_slice().try_into().map_err(|_| {
        Error::KeystoreFormat(format!(
            "secret should be 32 bytes, got {}",
            secret.len()
        ))
    })?;
    let signing_key = SecretKey::from_bytes(&secret)?;

    export_exits(
        output_folder,
        &params.chain_setting,
        &[(signing_key, params.validator_index)],
        params.epoch,
    )
}

fn exit_transaction_mnemonic(
    params: ExitMnemonicParams,
    output_folder: &Path,
) -> Result<BatchSummary, Error> {
    let mnemonic = reconstruct_mnemonic(&params.mnemonic)?;
    let num_validators = params.validator_indices.len();
    let credentials = CredentialList::from_mnemonic(
        &mnemonic,
        &params.mnemonic_password,
        num_validators,
        &vec![0; num_validators],
        &params.chain_setting,
        params.validator_start_index,
        None,
    )?;

    let keys: Vec<(SecretKey, u64)> = credentials
        .credentials()
        .iter()
        .zip(&params.validator_indices)
        .map(|(credential, &index)| (credential.signing_sk().clone(), index))
        .collect();

    export_exits(output_folder, &params.chain_setting, &keys, params.epoch)
}

fn export_exits(
    output_folder: &Path,
    chain_setting: &ChainSetting,
    keys: &[(SecretKey, u64)],
    epoch: u64,
) -> Result<BatchSummary, Error> {
    let folder = output_folder.join(DEFAULT_EXIT_TRANSACTION_FOLDER_NAME);
    fs::create_dir_all(&folder)?;

    let signed_exits: Vec<SignedVoluntaryExit> = keys
        .iter()
        .map(|(signing_key, validator_index)| {
            exit_transaction_generation(
                chain_setting,
                signing_key,
                *validator_index,
                epoch,
            )
        })
        .collect::<Result<_, _>>()?;

    let exit_file = export_exit_transactions_json(&folder, &signed_exits)?;

    let signing_pks: Vec<[u8; 48]> = keys
        .iter()
        .map(|(signing_key, _)| signing_key.public_key())
        .collect();
    if !verify_exit_transactions_json(&exit_file, &signing_pks, chain_setting)?
    {
        return Err(Error::VerificationFailed("exit transactions"));
    }
    info!("batch verified");

    Ok(BatchSummary {
        output_folder: folder,
        exit_transaction_file: Some(exit_file),
        ..Default::default()
    })
}
