// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Signed voluntary-exit transactions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use wallet_core::bls::SecretKey;

use crate::chain::ChainSetting;
use crate::credential::{unix_timestamp, write_export};
use crate::ssz::{
    byte_vector, compute_signing_root, compute_voluntary_exit_domain,
    SignedVoluntaryExit, VoluntaryExit,
};
use crate::Error;

/// The message part of an exported signed exit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitMessage {
    /// Earliest processing epoch as a decimal string.
    pub epoch: String,
    /// Validator index as a decimal string.
    pub validator_index: String,
}

/// One entry of the exported signed-exit JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedExitEntry {
    /// The exit message.
    pub message: ExitMessage,
    /// `0x`-prefixed signature by the signing key.
    pub signature: String,
}

impl From<&SignedVoluntaryExit> for SignedExitEntry {
    fn from(signed: &SignedVoluntaryExit) -> Self {
        Self {
            message: ExitMessage {
                epoch: signed.message.epoch.to_string(),
                validator_index: signed.message.validator_index.to_string(),
            },
            signature: format!("0x{}", hex::encode(&*signed.signature)),
        }
    }
}

/// Signs a voluntary exit for `validator_index` at `epoch` with the
/// validator's signing key.
pub fn exit_transaction_generation(
    chain_setting: &ChainSetting,
    signing_key: &SecretKey,
    validator_index: u64,
    epoch: u64,
) -> Result<SignedVoluntaryExit, Error> {
    let mut message = VoluntaryExit {
        epoch,
        validator_index,
    };
    let domain = compute_voluntary_exit_domain(
        chain_setting.genesis_fork_version,
        chain_setting.genesis_validators_root,
    )?;
    let signing_root = compute_signing_root(&mut message, domain)?;
    let signature = signing_key.sign(&signing_root);

    Ok(SignedVoluntaryExit {
        message,
        signature: byte_vector(signature),
    })
}

/// Writes the signed exits as one JSON array into `folder`.
pub fn export_exit_transactions_json(
    folder: &Path,
    signed_exits: &[SignedVoluntaryExit],
) -> Result<PathBuf, Error> {
    let entries: Vec<SignedExitEntry> =
        signed_exits.iter().map(SignedExitEntry::from).collect();

    let filefolder = folder.join(format!(
        "signed_exit_transactions-{}.json",
        unix_timestamp()?
    ));
    write_export(&filefolder, &entries)?;
    Ok(filefolder)
}
