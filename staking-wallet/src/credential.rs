// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Validator credentials.
//!
//! A [`Credential`] holds everything one validator needs: both EIP-2334
//! keys, the deposit parameters and the network identity. It is the only
//! object required to produce that validator's keystore, deposit data,
//! BLS-to-execution change and voluntary exit. A [`CredentialList`] is a
//! batch of them derived from one mnemonic.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use wallet_core::bls::SecretKey;
use wallet_core::crypto::sha256;
use wallet_core::path::mnemonic_and_path_to_key;

use crate::chain::{ChainSetting, DEPOSIT_CLI_VERSION};
use crate::keystore::Keystore;
use crate::ssz::{
    byte_vector, compute_bls_to_execution_change_domain,
    compute_deposit_domain, compute_signing_root, hash_tree_root,
    BLSToExecutionChange, DepositData, DepositMessage,
    SignedBLSToExecutionChange,
};
use crate::{
    Error, BLS_WITHDRAWAL_PREFIX, ETH1_ADDRESS_WITHDRAWAL_PREFIX,
    MAX_DEPOSIT_AMOUNT, MIN_DEPOSIT_AMOUNT,
};

/// One deposit as it appears in the exported deposit-data JSON.
///
/// Everything past `signature` is sidecar metadata for tooling; it is not
/// part of the SSZ hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositDatum {
    /// Hex-encoded signing public key.
    pub pubkey: String,
    /// Hex-encoded withdrawal credentials.
    pub withdrawal_credentials: String,
    /// Deposit amount in gwei.
    pub amount: u64,
    /// Hex-encoded deposit signature.
    pub signature: String,
    /// Hash tree root of the deposit message.
    pub deposit_message_root: String,
    /// Hash tree root of the signed deposit data.
    pub deposit_data_root: String,
    /// Genesis fork version the deposit is bound to.
    pub fork_version: String,
    /// Name of the target network.
    pub network_name: String,
    /// Version of the tool that produced the file.
    pub deposit_cli_version: String,
}

/// The message part of an exported BLS-to-execution change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlsToExecutionChangeMessage {
    /// Validator index as a decimal string.
    pub validator_index: String,
    /// `0x`-prefixed withdrawal public key.
    pub from_bls_pubkey: String,
    /// `0x`-prefixed execution address.
    pub to_execution_address: String,
}

/// Metadata attached to an exported BLS-to-execution change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlsToExecutionChangeMetadata {
    /// Name of the target network.
    pub network_name: String,
    /// `0x`-prefixed genesis validators root.
    pub genesis_validators_root: String,
    /// Version of the tool that produced the file.
    pub deposit_cli_version: String,
}

/// One entry of the exported BLS-to-execution-change JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlsToExecutionChangeEntry {
    /// The signed message.
    pub message: BlsToExecutionChangeMessage,
    /// `0x`-prefixed signature by the withdrawal key.
    pub signature: String,
    /// Network metadata.
    pub metadata: BlsToExecutionChangeMetadata,
}

/// All key material and deposit parameters of a single validator.
pub struct Credential {
    amount: u64,
    chain_setting: ChainSetting,
    signing_key_path: String,
    signing_sk: SecretKey,
    withdrawal_sk: SecretKey,
    execution_address: Option<[u8; 20]>,
}

impl Credential {
    /// Derives the credential of validator `index` from a mnemonic.
    ///
    /// The withdrawal key lives at `m/12381/3600/{index}/0` and the signing
    /// key one level below it, as EIP-2334 prescribes.
    pub fn new(
        mnemonic: &str,
        mnemonic_password: &str,
        index: u32,
        amount: u64,
        chain_setting: &ChainSetting,
        execution_address: Option<[u8; 20]>,
    ) -> Result<Self, Error> {
        let withdrawal_key_path = format!("m/12381/3600/{index}/0");
        let signing_key_path = format!("{withdrawal_key_path}/0");

        let withdrawal_sk = mnemonic_and_path_to_key(
            mnemonic,
            &withdrawal_key_path,
            mnemonic_password,
        )?;
        let signing_sk = mnemonic_and_path_to_key(
            mnemonic,
            &signing_key_path,
            mnemonic_password,
        )?;

        Ok(Self {
            amount,
            chain_setting: chain_setting.clone(),
            signing_key_path,
            signing_sk,
            withdrawal_sk,
            execution_address,
        })
    }

    /// The signing public key.
    pub fn signing_pk(&self) -> [u8; 48] {
        self.signing_sk.public_key()
    }

    /// The withdrawal public key.
    pub fn withdrawal_pk(&self) -> [u8; 48] {
        self.withdrawal_sk.public_key()
    }

    /// The execution address withdrawals are directed to, if any.
    pub fn execution_address(&self) -> Option<[u8; 20]> {
        self.execution_address
    }

    /// The network this credential signs for.
    pub fn chain_setting(&self) -> &ChainSetting {
        &self.chain_setting
    }

    /// EIP-2334 path of the signing key.
    pub fn signing_key_path(&self) -> &str {
        &self.signing_key_path
    }

    /// The 32-byte withdrawal credentials committed to by the deposit.
    ///
    /// With an execution address set these are `0x01 ‖ 11 zero bytes ‖
    /// address`; otherwise `0x00 ‖ SHA-256(withdrawal_pk)[1..]`.
    pub fn withdrawal_credentials(&self) -> [u8; 32] {
        match self.execution_address {
            Some(address) => {
                let mut credentials = [0u8; 32];
                credentials[0] = ETH1_ADDRESS_WITHDRAWAL_PREFIX;
                credentials[12..].copy_from_slice(&address);
                credentials
            }
            None => {
                let mut credentials = sha256(&self.withdrawal_pk());
                credentials[0] = BLS_WITHDRAWAL_PREFIX;
                credentials
            }
        }
    }

    /// The unsigned deposit message.
    ///
    /// The amount must lie in `[MIN_DEPOSIT_AMOUNT, MAX_DEPOSIT_AMOUNT]`.
    pub fn deposit_message(&self) -> Result<DepositMessage, Error> {
        if !(MIN_DEPOSIT_AMOUNT..=MAX_DEPOSIT_AMOUNT).contains(&self.amount) {
            return Err(Error::DepositAmount(self.amount));
        }
        Ok(DepositMessage {
            pubkey: byte_vector(self.signing_pk()),
            withdrawal_credentials: byte_vector(self.withdrawal_credentials()),
            amount: self.amount,
        })
    }

    /// The deposit message signed under the deposit domain.
    pub fn signed_deposit(&self) -> Result<DepositData, Error> {
        let mut message = self.deposit_message()?;
        let domain =
            compute_deposit_domain(self.chain_setting.genesis_fork_version)?;
        let signing_root = compute_signing_root(&mut message, domain)?;
        let signature = self.signing_sk.sign(&signing_root);

        Ok(DepositData {
            pubkey: message.pubkey.clone(),
            withdrawal_credentials: message.withdrawal_credentials.clone(),
            amount: message.amount,
            signature: byte_vector(signature),
        })
    }

    /// The deposit in its exported JSON form, roots and metadata included.
    pub fn deposit_datum(&self) -> Result<DepositDatum, Error> {
        let mut message = self.deposit_message()?;
        let mut data = self.signed_deposit()?;

        let deposit_message_root = hash_tree_root(&mut message)?;
        let deposit_data_root = hash_tree_root(&mut data)?;

        Ok(DepositDatum {
            pubkey: hex::encode(self.signing_pk()),
            withdrawal_credentials: hex::encode(self.withdrawal_credentials()),
            amount: self.amount,
            signature: hex::encode(&*data.signature),
            deposit_message_root: hex::encode(deposit_message_root),
            deposit_data_root: hex::encode(deposit_data_root),
            fork_version: hex::encode(self.chain_setting.genesis_fork_version),
            network_name: self.chain_setting.network_name.clone(),
            deposit_cli_version: DEPOSIT_CLI_VERSION.to_string(),
        })
    }

    /// Signs the rotation of this credential's BLS withdrawal credentials
    /// to its execution address.
    ///
    /// Signed with the withdrawal key; requires the execution address to be
    /// set.
    pub fn get_bls_to_execution_change(
        &self,
        validator_index: u64,
    ) -> Result<SignedBLSToExecutionChange, Error> {
        let address =
            self.execution_address.ok_or(Error::MissingExecutionAddress)?;

        let mut message = BLSToExecutionChange {
            validator_index,
            from_bls_pubkey: byte_vector(self.withdrawal_pk()),
            to_execution_address: byte_vector(address),
        };
        let domain = compute_bls_to_execution_change_domain(
            self.chain_setting.genesis_fork_version,
            self.chain_setting.genesis_validators_root,
        )?;
        let signing_root = compute_signing_root(&mut message, domain)?;
        let signature = self.withdrawal_sk.sign(&signing_root);

        Ok(SignedBLSToExecutionChange {
            message,
            signature: byte_vector(signature),
        })
    }

    /// The BLS-to-execution change in its exported JSON form.
    pub fn bls_to_execution_change_entry(
        &self,
        validator_index: u64,
    ) -> Result<BlsToExecutionChangeEntry, Error> {
        let signed = self.get_bls_to_execution_change(validator_index)?;
        Ok(BlsToExecutionChangeEntry {
            message: BlsToExecutionChangeMessage {
                validator_index: validator_index.to_string(),
                from_bls_pubkey: format!(
                    "0x{}",
                    hex::encode(&*signed.message.from_bls_pubkey)
                ),
                to_execution_address: format!(
                    "0x{}",
                    hex::encode(&*signed.message.to_execution_address)
                ),
            },
            signature: format!("0x{}", hex::encode(&*signed.signature)),
            metadata: BlsToExecutionChangeMetadata {
                network_name: self.chain_setting.network_name.clone(),
                genesis_validators_root: format!(
                    "0x{}",
                    hex::encode(self.chain_setting.genesis_validators_root)
                ),
                deposit_cli_version: DEPOSIT_CLI_VERSION.to_string(),
            },
        })
    }

    /// The signing key for exit transactions.
    pub(crate) fn signing_sk(&self) -> &SecretKey {
        &self.signing_sk
    }

    /// Encrypts the signing key into an EIP-2335 keystore.
    pub fn signing_keystore(&self, password: &str) -> Result<Keystore, Error> {
        let secret = self.signing_sk.to_bytes();
        Keystore::encrypt_scrypt(
            &secret,
            password,
            &self.signing_key_path,
            None,
            None,
        )
    }

    /// Writes the signing keystore into `folder` and returns its path.
    pub fn save_signing_keystore(
        &self,
        password: &str,
        folder: &Path,
    ) -> Result<PathBuf, Error> {
        let keystore = self.signing_keystore(password)?;
        let filename = format!(
            "keystore-{}-{}.json",
            self.signing_key_path.replace('/', "_"),
            unix_timestamp()?
        );
        let filefolder = folder.join(filename);
        keystore.save(&filefolder)?;
        Ok(filefolder)
    }

    /// Re-reads a saved keystore and checks it decrypts back to the
    /// in-memory signing key.
    pub fn verify_keystore(
        &self,
        keystore_path: &Path,
        password: &str,
    ) -> Result<bool, Error> {
        let saved = Keystore::from_file(keystore_path)?;
        let secret = saved.decrypt(password)?;
        Ok(secret.as_slice() == self.signing_sk.to_bytes())
    }
}

/// An ordered batch of credentials, one per validator.
pub struct CredentialList {
    credentials: Vec<Credential>,
}

impl CredentialList {
    /// Derives credentials for validator indices
    /// `[start_index, start_index + num_keys)`.
    ///
    /// `amounts` holds one deposit amount per validator and must match
    /// `num_keys` in length; every index must stay below 2^32.
    #[allow(clippy::too_many_arguments)]
    pub fn from_mnemonic(
        mnemonic: &str,
        mnemonic_password: &str,
        num_keys: usize,
        amounts: &[u64],
        chain_setting: &ChainSetting,
        start_index: u64,
        execution_address: Option<[u8; 20]>,
    ) -> Result<Self, Error> {
        if amounts.len() != num_keys {
            return Err(Error::LengthMismatch {
                what: "deposit amounts",
                expected: num_keys,
                actual: amounts.len(),
            });
        }
        if start_index >= 1 << 32 || start_index + num_keys as u64 > 1 << 32 {
            return Err(Error::IndexOutOfRange(start_index));
        }

        let mut credentials = Vec::with_capacity(num_keys);
        for (offset, amount) in amounts.iter().enumerate() {
            let index = start_index as u32 + offset as u32;
            debug!(index, "deriving validator keys");
            credentials.push(Credential::new(
                mnemonic,
                mnemonic_password,
                index,
                *amount,
                chain_setting,
                execution_address,
            )?);
        }
        Ok(Self { credentials })
    }

    /// The credentials, in ascending validator-index order.
    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    /// Number of credentials in the batch.
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Writes one keystore per credential into `folder`.
    ///
    /// Returns the file paths in batch order.
    pub fn export_keystores(
        &self,
        password: &str,
        folder: &Path,
    ) -> Result<Vec<PathBuf>, Error> {
        self.credentials
            .iter()
            .map(|credential| credential.save_signing_keystore(password, folder))
            .collect()
    }

    /// Writes the deposit-data JSON array into `folder`.
    pub fn export_deposit_data_json(
        &self,
        folder: &Path,
    ) -> Result<PathBuf, Error> {
        let deposit_data: Vec<DepositDatum> = self
            .credentials
            .iter()
            .map(Credential::deposit_datum)
            .collect::<Result<_, _>>()?;

        let filefolder =
            folder.join(format!("deposit_data-{}.json", unix_timestamp()?));
        write_export(&filefolder, &deposit_data)?;
        Ok(filefolder)
    }

    /// Writes the BLS-to-execution-change JSON array into `folder`.
    ///
    /// `validator_indices` carries the on-chain index of each credential
    /// and must match the batch in length.
    pub fn export_bls_to_execution_change_json(
        &self,
        folder: &Path,
        validator_indices: &[u64],
    ) -> Result<PathBuf, Error> {
        if validator_indices.len() != self.credentials.len() {
            return Err(Error::LengthMismatch {
                what: "validator indices",
                expected: self.credentials.len(),
                actual: validator_indices.len(),
            });
        }

        let changes: Vec<BlsToExecutionChangeEntry> = self
            .credentials
            .iter()
            .zip(validator_indices)
            .map(|(credential, &index)| {
                credential.bls_to_execution_change_entry(index)
            })
            .collect::<Result<_, _>>()?;

        let filefolder = folder.join(format!(
            "bls_to_execution_change-{}.json",
            unix_timestamp()?
        ));
        write_export(&filefolder, &changes)?;
        Ok(filefolder)
    }

    /// Decrypts every exported keystore and compares it against the
    /// in-memory keys.
    pub fn verify_keystores(
        &self,
        keystore_paths: &[PathBuf],
        password: &str,
    ) -> Result<bool, Error> {
        if keystore_paths.len() != self.credentials.len() {
            return Ok(false);
        }
        for (credential, path) in self.credentials.iter().zip(keystore_paths) {
            if !credential.verify_keystore(path, password)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Serializes `values` as JSON, read-only for owner and group.
pub(crate) fn write_export<T: Serialize>(
    path: &Path,
    values: &T,
) -> Result<(), Error> {
    std::fs::write(path, serde_json::to_string(values)?)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(
            path,
            std::fs::Permissions::from_mode(0o440),
        )?;
    }
    Ok(())
}

pub(crate) fn unix_timestamp() -> Result<u64, Error> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .map_err(|_| Error::SystemTime)
}
