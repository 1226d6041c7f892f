// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! End-to-end batch runs through `run_batch`, against a temp directory.

use staking_wallet::batch::{
    run_batch, BlsToExecutionChangeParams, Command, ExitKeystoreParams,
    ExitMnemonicParams, KeygenParams,
};
use staking_wallet::chain::{chain_setting, MAINNET};
use staking_wallet::credential::{Credential, DepositDatum};
use staking_wallet::exit_transaction::SignedExitEntry;
use staking_wallet::keystore::Keystore;
use staking_wallet::{Error, MAX_DEPOSIT_AMOUNT};
use wallet_core::path::mnemonic_and_path_to_key;

const TREZOR_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon \
     abandon abandon abandon about";
const ABBREVIATED_MNEMONIC: &str =
    "aban aban aban aban aban aban aban aban aban aban aban abou";
const KEYSTORE_PASSWORD: &str = "password-for-tests";

const EXECUTION_ADDRESS: [u8; 20] = [
    0x00, 0x00, 0x00, 0x00, 0x21, 0x9a, 0xb5, 0x40, 0x35, 0x6c, 0xbb, 0x83,
    0x9c, 0xbe, 0x05, 0x30, 0x3d, 0x77, 0x05, 0xfa,
];

fn keygen_params(num_validators: usize) -> KeygenParams {
    KeygenParams {
        mnemonic: ABBREVIATED_MNEMONIC.to_string(),
        mnemonic_password: String::new(),
        num_validators,
        amounts: vec![MAX_DEPOSIT_AMOUNT; num_validators],
        chain_setting: chain_setting(MAINNET).unwrap(),
        validator_start_index: 0,
        execution_address: None,
        keystore_password: KEYSTORE_PASSWORD.to_string(),
    }
}

#[test]
fn existing_mnemonic_batch_produces_verified_artifacts() {
    let dir = tempfile::tempdir().unwrap();

    let summary = run_batch(
        Command::ExistingMnemonic(keygen_params(1)),
        dir.path(),
    )
    .unwrap();

    assert_eq!(summary.keystore_files.len(), 1);
    let keystore_name = summary.keystore_files[0]
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    assert!(keystore_name.starts_with("keystore-m_12381_3600_0_0_0-"));

    let deposit_file = summary.deposit_data_file.unwrap();
    let deposits: Vec<DepositDatum> =
        serde_json::from_str(&std::fs::read_to_string(&deposit_file).unwrap())
            .unwrap();
    assert_eq!(deposits.len(), 1);
    assert_eq!(deposits[0].network_name, "mainnet");

    // the exported keystore holds the key derived at the signing path
    let keystore = Keystore::from_file(&summary.keystore_files[0]).unwrap();
    assert_eq!(keystore.path, "m/12381/3600/0/0/0");
    let secret = keystore.decrypt(KEYSTORE_PASSWORD).unwrap();
    let expected =
        mnemonic_and_path_to_key(TREZOR_MNEMONIC, "m/12381/3600/0/0/0", "")
            .unwrap();
    assert_eq!(secret.as_slice(), expected.to_bytes());
}

#[test]
fn weak_keystore_password_aborts_before_writing() {
    let dir = tempfile::tempdir().unwrap();

    let mut params = keygen_params(1);
    params.keystore_password = "short".to_string();
    let result = run_batch(Command::ExistingMnemonic(params), dir.path());

    assert!(matches!(result, Err(Error::WeakPassword)));
    assert!(!dir.path().join("validator_keys").exists());
}

#[test]
fn bls_to_execution_change_batch_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let chain = chain_setting(MAINNET).unwrap();

    // the credentials the validators were created with, BLS form
    let credential =
        Credential::new(TREZOR_MNEMONIC, "", 0, MAX_DEPOSIT_AMOUNT, &chain, None)
            .unwrap();
    let withdrawal_credentials = credential.withdrawal_credentials();

    let summary = run_batch(
        Command::GenerateBlsToExecutionChange(BlsToExecutionChangeParams {
            mnemonic: TREZOR_MNEMONIC.to_string(),
            mnemonic_password: String::new(),
            num_validators: 1,
            chain_setting: chain,
            validator_start_index: 0,
            validator_indices: vec![42],
            bls_withdrawal_credentials_list: vec![withdrawal_credentials],
            execution_address: EXECUTION_ADDRESS,
        }),
        dir.path(),
    )
    .unwrap();

    let change_file = summary.bls_to_execution_change_file.unwrap();
    let content = std::fs::read_to_string(&change_file).unwrap();
    assert!(content.contains("\"validator_index\":\"42\""));
    assert!(content.contains(&format!("0x{}", hex::encode(EXECUTION_ADDRESS))));
}

#[test]
fn bls_to_execution_change_rejects_foreign_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let chain = chain_setting(MAINNET).unwrap();

    let result = run_batch(
        Command::GenerateBlsToExecutionChange(BlsToExecutionChangeParams {
            mnemonic: TREZOR_MNEMONIC.to_string(),
            mnemonic_password: String::new(),
            num_validators: 1,
            chain_setting: chain,
            validator_start_index: 0,
            validator_indices: vec![42],
            bls_withdrawal_credentials_list: vec![[0u8; 32]],
            execution_address: EXECUTION_ADDRESS,
        }),
        dir.path(),
    );

    assert!(matches!(
        result,
        Err(Error::WithdrawalCredentialsMismatch)
    ));
}

#[test]
fn exit_transaction_mnemonic_batch_verifies() {
    let dir = tempfile::tempdir().unwrap();

    let summary = run_batch(
        Command::ExitTransactionMnemonic(ExitMnemonicParams {
            mnemonic: TREZOR_MNEMONIC.to_string(),
            mnemonic_password: String::new(),
            chain_setting: chain_setting(MAINNET).unwrap(),
            validator_start_index: 0,
            validator_indices: vec![7, 8],
            epoch: 305658,
        }),
        dir.path(),
    )
    .unwrap();

    let exit_file = summary.exit_transaction_file.unwrap();
    let exits: Vec<SignedExitEntry> =
        serde_json::from_str(&std::fs::read_to_string(&exit_file).unwrap())
            .unwrap();
    assert_eq!(exits.len(), 2);
    assert_eq!(exits[0].message.validator_index, "7");
    assert_eq!(exits[0].message.epoch, "305658");
    assert_eq!(exits[1].message.validator_index, "8");
}

#[test]
fn exit_transaction_keystore_batch_verifies() {
    let dir = tempfile::tempdir().unwrap();

    // stage a keystore holding the validator's signing key
    let signing_sk =
        mnemonic_and_path_to_key(TREZOR_MNEMONIC, "m/12381/3600/0/0/0", "")
            .unwrap();
    let keystore = Keystore::encrypt_pbkdf2(
        &signing_sk.to_bytes(),
        KEYSTORE_PASSWORD,
        "m/12381/3600/0/0/0",
        None,
        None,
    )
    .unwrap();
    let keystore_path = dir.path().join("keystore.json");
    keystore.save(&keystore_path).unwrap();

    let summary = run_batch(
        Command::ExitTransactionKeystore(ExitKeystoreParams {
            keystore_path,
            keystore_password: KEYSTORE_PASSWORD.to_string(),
            validator_index: 11,
            epoch: 0,
            chain_setting: chain_setting(MAINNET).unwrap(),
        }),
        dir.path(),
    )
    .unwrap();

    let exit_file = summary.exit_transaction_file.unwrap();
    let exits: Vec<SignedExitEntry> =
        serde_json::from_str(&std::fs::read_to_string(&exit_file).unwrap())
            .unwrap();
    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].message.validator_index, "11");
}

#[test]
fn exit_transaction_keystore_wrong_password_fails() {
    let dir = tempfile::tempdir().unwrap();

    let signing_sk =
        mnemonic_and_path_to_key(TREZOR_MNEMONIC, "m/12381/3600/0/0/0", "")
            .unwrap();
    let keystore = Keystore::encrypt_pbkdf2(
        &signing_sk.to_bytes(),
        KEYSTORE_PASSWORD,
        "m/12381/3600/0/0/0",
        None,
        None,
    )
    .unwrap();
    let keystore_path = dir.path().join("keystore.json");
    keystore.save(&keystore_path).unwrap();

    let result = run_batch(
        Command::ExitTransactionKeystore(ExitKeystoreParams {
            keystore_path,
            keystore_password: "not-the-password".to_string(),
            validator_index: 11,
            epoch: 0,
            chain_setting: chain_setting(MAINNET).unwrap(),
        }),
        dir.path(),
    );

    assert!(matches!(result, Err(Error::KeystoreChecksum)));
}
