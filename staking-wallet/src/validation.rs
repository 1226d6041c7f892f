// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Input validation and artifact re-verification.
//!
//! Everything the wallet writes is read back and checked here before a
//! batch is reported as complete. Validation works on the exported JSON
//! forms, not on the in-memory objects that produced them, so a bug in
//! serialization fails the batch rather than slipping through.

use std::fs;
use std::path::Path;

use sha3::{Digest, Keccak256};

use wallet_core::bls;

use crate::chain::ChainSetting;
use crate::credential::{BlsToExecutionChangeEntry, Credential, DepositDatum};
use crate::exit_transaction::SignedExitEntry;
use crate::ssz::{
    byte_vector, compute_bls_to_execution_change_domain,
    compute_deposit_domain, compute_signing_root,
    compute_voluntary_exit_domain, hash_tree_root, BLSToExecutionChange,
    DepositData, DepositMessage, VoluntaryExit,
};
use crate::{
    chain::strip_0x, Error, BLS_WITHDRAWAL_PREFIX,
    ETH1_ADDRESS_WITHDRAWAL_PREFIX, MAX_DEPOSIT_AMOUNT, MIN_DEPOSIT_AMOUNT,
};

/// Re-validates every deposit of an exported deposit-data file against the
/// credentials that produced it.
pub fn verify_deposit_data_json(
    filefolder: &Path,
    credentials: &[Credential],
) -> Result<bool, Error> {
    let deposits: Vec<DepositDatum> =
        serde_json::from_str(&fs::read_to_string(filefolder)?)?;
    if deposits.len() != credentials.len() {
        return Ok(false);
    }
    for (deposit, credential) in deposits.iter().zip(credentials) {
        if !validate_deposit(deposit, credential)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Checks one deposit entry against the staking deposit rules.
///
/// The amount bound here is the beacon chain's half-open
/// `MIN < amount <= MAX`; generation uses the closed form.
pub fn validate_deposit(
    deposit: &DepositDatum,
    credential: &Credential,
) -> Result<bool, Error> {
    let pubkey = hex::decode(&deposit.pubkey)?;
    let withdrawal_credentials =
        hex::decode(&deposit.withdrawal_credentials)?;
    let signature = hex::decode(&deposit.signature)?;
    let deposit_data_root = hex::decode(&deposit.deposit_data_root)?;
    let fork_version = hex::decode(&deposit.fork_version)?;
    let amount = deposit.amount;

    let Some(pubkey) = as_array::<48>(&pubkey) else {
        return Ok(false);
    };
    if pubkey != credential.signing_pk() {
        return Ok(false);
    }

    let Some(withdrawal_credentials) = as_array::<32>(&withdrawal_credentials)
    else {
        return Ok(false);
    };
    match withdrawal_credentials[0] {
        BLS_WITHDRAWAL_PREFIX if credential.execution_address().is_none() => {
            let expected =
                wallet_core::crypto::sha256(&credential.withdrawal_pk());
            if withdrawal_credentials[1..] != expected[1..] {
                return Ok(false);
            }
        }
        ETH1_ADDRESS_WITHDRAWAL_PREFIX => {
            if withdrawal_credentials[1..12] != [0u8; 11] {
                return Ok(false);
            }
            let Some(address) = credential.execution_address() else {
                return Ok(false);
            };
            if withdrawal_credentials[12..] != address {
                return Ok(false);
            }
        }
        _ => return Ok(false),
    }

    if !(amount > MIN_DEPOSIT_AMOUNT && amount <= MAX_DEPOSIT_AMOUNT) {
        return Ok(false);
    }

    let Some(signature) = as_array::<96>(&signature) else {
        return Ok(false);
    };
    let Some(fork_version) = as_array::<4>(&fork_version) else {
        return Ok(false);
    };

    let mut message = DepositMessage {
        pubkey: byte_vector(pubkey),
        withdrawal_credentials: byte_vector(withdrawal_credentials),
        amount,
    };
    let domain = compute_deposit_domain(fork_version)?;
    let signing_root = compute_signing_root(&mut message, domain)?;
    if !bls::verify(&pubkey, &signing_root, &signature) {
        return Ok(false);
    }

    let mut signed_deposit = DepositData {
        pubkey: byte_vector(pubkey),
        withdrawal_credentials: byte_vector(withdrawal_credentials),
        amount,
        signature: byte_vector(signature),
    };
    Ok(hash_tree_root(&mut signed_deposit)?.as_slice() == deposit_data_root)
}

/// Re-validates every entry of an exported BLS-to-execution-change file.
pub fn verify_bls_to_execution_change_json(
    filefolder: &Path,
    credentials: &[Credential],
    input_validator_indices: &[u64],
    input_execution_address: &[u8; 20],
    chain_setting: &ChainSetting,
) -> Result<bool, Error> {
    let changes: Vec<BlsToExecutionChangeEntry> =
        serde_json::from_str(&fs::read_to_string(filefolder)?)?;
    if changes.len() != credentials.len()
        || changes.len() != input_validator_indices.len()
    {
        return Ok(false);
    }
    for ((change, credential), &index) in
        changes.iter().zip(credentials).zip(input_validator_indices)
    {
        if !validate_bls_to_execution_change(
            change,
            credential,
            index,
            input_execution_address,
            chain_setting,
        )? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Checks one exported BLS-to-execution change.
///
/// The target address must equal both the credential's withdrawal address
/// and the address the caller asked for.
pub fn validate_bls_to_execution_change(
    change: &BlsToExecutionChangeEntry,
    credential: &Credential,
    input_validator_index: u64,
    input_execution_address: &[u8; 20],
    chain_setting: &ChainSetting,
) -> Result<bool, Error> {
    let validator_index: u64 = match change.message.validator_index.parse() {
        Ok(index) => index,
        Err(_) => return Ok(false),
    };
    let from_bls_pubkey =
        hex::decode(strip_0x(&change.message.from_bls_pubkey))?;
    let to_execution_address =
        hex::decode(strip_0x(&change.message.to_execution_address))?;
    let signature = hex::decode(strip_0x(&change.signature))?;
    let genesis_validators_root =
        hex::decode(strip_0x(&change.metadata.genesis_validators_root))?;

    if validator_index != input_validator_index {
        return Ok(false);
    }

    let Some(from_bls_pubkey) = as_array::<48>(&from_bls_pubkey) else {
        return Ok(false);
    };
    if from_bls_pubkey != credential.withdrawal_pk() {
        return Ok(false);
    }

    let Some(to_execution_address) = as_array::<20>(&to_execution_address)
    else {
        return Ok(false);
    };
    let matches_credential = credential.execution_address()
        == Some(to_execution_address);
    if !matches_credential || &to_execution_address != input_execution_address {
        return Ok(false);
    }

    let Some(genesis_validators_root) =
        as_array::<32>(&genesis_validators_root)
    else {
        return Ok(false);
    };
    if genesis_validators_root != chain_setting.genesis_validators_root {
        return Ok(false);
    }

    let Some(signature) = as_array::<96>(&signature) else {
        return Ok(false);
    };

    let mut message = BLSToExecutionChange {
        validator_index,
        from_bls_pubkey: byte_vector(from_bls_pubkey),
        to_execution_address: byte_vector(to_execution_address),
    };
    let domain = compute_bls_to_execution_change_domain(
        chain_setting.genesis_fork_version,
        genesis_validators_root,
    )?;
    let signing_root = compute_signing_root(&mut message, domain)?;
    Ok(bls::verify(&from_bls_pubkey, &signing_root, &signature))
}

/// Re-validates every entry of an exported signed-exit file.
pub fn verify_exit_transactions_json(
    filefolder: &Path,
    signing_pks: &[[u8; 48]],
    chain_setting: &ChainSetting,
) -> Result<bool, Error> {
    let exits: Vec<SignedExitEntry> =
        serde_json::from_str(&fs::read_to_string(filefolder)?)?;
    if exits.len() != signing_pks.len() {
        return Ok(false);
    }
    for (exit, signing_pk) in exits.iter().zip(signing_pks) {
        if !validate_signed_exit(exit, signing_pk, chain_setting)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Checks one exported signed exit against the validator's signing key.
pub fn validate_signed_exit(
    exit: &SignedExitEntry,
    signing_pk: &[u8; 48],
    chain_setting: &ChainSetting,
) -> Result<bool, Error> {
    let (Ok(epoch), Ok(validator_index)) = (
        exit.message.epoch.parse::<u64>(),
        exit.message.validator_index.parse::<u64>(),
    ) else {
        return Ok(false);
    };
    let signature = hex::decode(strip_0x(&exit.signature))?;
    let Some(signature) = as_array::<96>(&signature) else {
        return Ok(false);
    };

    let mut message = VoluntaryExit {
        epoch,
        validator_index,
    };
    let domain = compute_voluntary_exit_domain(
        chain_setting.genesis_fork_version,
        chain_setting.genesis_validators_root,
    )?;
    let signing_root = compute_signing_root(&mut message, domain)?;
    Ok(bls::verify(signing_pk, &signing_root, &signature))
}

fn as_array<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.try_into().ok()
}

/// Requires a password of at least 8 characters.
pub fn validate_password_strength(password: &str) -> Result<(), Error> {
    if password.chars().count() < 8 {
        return Err(Error::WeakPassword);
    }
    Ok(())
}

/// Parses an integer and requires `low <= value < high`.
pub fn validate_int_range(value: &str, low: u64, high: u64) -> Result<u64, Error> {
    let parsed: u64 = value
        .trim()
        .parse()
        .map_err(|_| Error::NotAnInteger(value.to_string()))?;
    if !(low..high).contains(&parsed) {
        return Err(Error::IndexOutOfRange(parsed));
    }
    Ok(parsed)
}

/// Splits a user-supplied list on commas, semicolons and whitespace.
pub fn normalize_input_list(input: &str) -> Vec<&str> {
    input
        .trim_matches(|c| "[({})]".contains(c))
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// Parses a list of validator indices, each below 2^32.
pub fn validate_validator_indices(input: &str) -> Result<Vec<u64>, Error> {
    normalize_input_list(input)
        .into_iter()
        .map(|entry| validate_int_range(entry, 0, 1 << 32))
        .collect()
}

/// Parses and checksum-validates an EIP-55 execution address.
pub fn validate_eth1_withdrawal_address(
    address: &str,
) -> Result<[u8; 20], Error> {
    let hex_part = address
        .strip_prefix("0x")
        .ok_or_else(|| Error::InvalidAddress(address.to_string()))?;
    let bytes = hex::decode(hex_part)
        .map_err(|_| Error::InvalidAddress(address.to_string()))?;
    let bytes: [u8; 20] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| Error::InvalidAddress(address.to_string()))?;

    if to_checksum_address(&bytes) != address {
        return Err(Error::AddressChecksum(address.to_string()));
    }
    Ok(bytes)
}

/// The EIP-55 mixed-case encoding of an address.
pub fn to_checksum_address(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let digest = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = digest[i / 2] >> (if i % 2 == 0 { 4 } else { 0 }) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Parses `0x`-optional hex withdrawal credentials and requires the BLS
/// form: 32 bytes, `0x00` prefix, not already an execution-address rotation.
pub fn validate_bls_withdrawal_credentials(
    credentials: &str,
) -> Result<[u8; 32], Error> {
    let bytes = hex::decode(strip_0x(credentials))
        .map_err(|_| Error::InvalidWithdrawalCredentials)?;
    let bytes: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| Error::InvalidWithdrawalCredentials)?;

    if is_eth1_address_withdrawal_credentials(&bytes)
        || bytes[0] != BLS_WITHDRAWAL_PREFIX
    {
        return Err(Error::InvalidWithdrawalCredentials);
    }
    Ok(bytes)
}

/// Whether credentials already carry the execution-address form.
pub fn is_eth1_address_withdrawal_credentials(credentials: &[u8; 32]) -> bool {
    credentials[0] == ETH1_ADDRESS_WITHDRAWAL_PREFIX
        && credentials[1..12] == [0u8; 11]
}

/// Parses a comma/semicolon/space separated list of BLS withdrawal
/// credentials.
pub fn validate_bls_withdrawal_credentials_list(
    input: &str,
) -> Result<Vec<[u8; 32]>, Error> {
    normalize_input_list(input)
        .into_iter()
        .map(validate_bls_withdrawal_credentials)
        .collect()
}

/// Requires `credentials` to belong to the credential's withdrawal key.
pub fn validate_bls_withdrawal_credentials_matching(
    credentials: &[u8; 32],
    credential: &Credential,
) -> Result<(), Error> {
    let expected = wallet_core::crypto::sha256(&credential.withdrawal_pk());
    if credentials[1..] != expected[1..] {
        return Err(Error::WithdrawalCredentialsMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksums_the_known_address() {
        // the mainnet deposit contract
        let bytes: [u8; 20] =
            hex::decode("00000000219ab540356cbb839cbe05303d7705fa")
                .unwrap()
                .try_into()
                .unwrap();
        assert_eq!(
            to_checksum_address(&bytes),
            "0x00000000219ab540356Cbb839Cbe05303d7705Fa"
        );
    }

    #[test]
    fn accepts_checksummed_addresses_only() {
        let checksummed = "0x00000000219ab540356Cbb839Cbe05303d7705Fa";
        assert!(validate_eth1_withdrawal_address(checksummed).is_ok());

        let lowercase = checksummed.to_lowercase();
        assert!(matches!(
            validate_eth1_withdrawal_address(&lowercase),
            Err(Error::AddressChecksum(_))
        ));
        assert!(matches!(
            validate_eth1_withdrawal_address("00000000219ab540356Cbb839Cbe05303d7705Fa"),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            validate_eth1_withdrawal_address("0x1234"),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn password_strength_counts_characters() {
        assert!(validate_password_strength("pass🔑678").is_ok());
        assert!(matches!(
            validate_password_strength("1234567"),
            Err(Error::WeakPassword)
        ));
    }

    #[test]
    fn splits_index_lists() {
        assert_eq!(
            validate_validator_indices("[1, 2;3 4]").unwrap(),
            vec![1, 2, 3, 4]
        );
        assert!(validate_validator_indices("1, 4294967296").is_err());
    }

    #[test]
    fn recognizes_credential_forms() {
        let mut eth1 = [0u8; 32];
        eth1[0] = ETH1_ADDRESS_WITHDRAWAL_PREFIX;
        assert!(is_eth1_address_withdrawal_credentials(&eth1));
        assert!(validate_bls_withdrawal_credentials(&hex::encode(eth1)).is_err());

        let bls = [0u8; 32];
        assert!(validate_bls_withdrawal_credentials(&hex::encode(bls)).is_ok());
    }
}
