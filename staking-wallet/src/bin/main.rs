// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

mod args;
mod prompt;

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use staking_wallet::batch::{
    run_batch, BatchSummary, BlsToExecutionChangeParams, Command,
    ExitKeystoreParams, ExitMnemonicParams, KeygenParams,
};
use staking_wallet::chain::{chain_setting, devnet_chain_setting, ChainSetting};
use staking_wallet::validation::{
    validate_bls_withdrawal_credentials_list, validate_eth1_withdrawal_address,
    validate_validator_indices,
};
use wallet_core::mnemonic::{random_mnemonic, Language, LANGUAGES};

use crate::args::{LogFormat, WalletArgs};

fn main() -> ExitCode {
    match exec() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn exec() -> anyhow::Result<()> {
    let args = WalletArgs::parse();

    let level: Level = args.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr);
    match args.log_format {
        LogFormat::Json => {
            let subscriber = subscriber.json().flatten_event(true).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Plain => {
            let subscriber = subscriber.with_ansi(false).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Coloured => {
            let subscriber = subscriber.finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    };

    let chain = resolve_chain(&args)?;

    let command = match args.command {
        args::Command::NewMnemonic {
            mnemonic_language,
            num_validators,
            amount_gwei,
            validator_start_index,
            execution_address,
            keystore_password,
        } => {
            let language = resolve_language(&mnemonic_language)?;
            let mnemonic = random_mnemonic(language)?;
            prompt::confirm_mnemonic_phrase(&mnemonic)?;

            Command::NewMnemonic(KeygenParams {
                mnemonic,
                mnemonic_password: String::new(),
                num_validators,
                amounts: vec![amount_gwei; num_validators],
                chain_setting: chain,
                validator_start_index,
                execution_address: execution_address
                    .as_deref()
                    .map(validate_eth1_withdrawal_address)
                    .transpose()?,
                keystore_password: prompt::keystore_password(
                    keystore_password,
                )?,
            })
        }
        args::Command::ExistingMnemonic {
            mnemonic,
            mnemonic_password,
            num_validators,
            amount_gwei,
            validator_start_index,
            execution_address,
            keystore_password,
        } => Command::ExistingMnemonic(KeygenParams {
            mnemonic: prompt::mnemonic(mnemonic)?,
            mnemonic_password,
            num_validators,
            amounts: vec![amount_gwei; num_validators],
            chain_setting: chain,
            validator_start_index,
            execution_address: execution_address
                .as_deref()
                .map(validate_eth1_withdrawal_address)
                .transpose()?,
            keystore_password: prompt::keystore_password(keystore_password)?,
        }),
        args::Command::GenerateBlsToExecutionChange {
            mnemonic,
            mnemonic_password,
            validator_start_index,
            validator_indices,
            bls_withdrawal_credentials_list,
            execution_address,
        } => {
            let validator_indices =
                validate_validator_indices(&validator_indices)?;
            let credentials_list = validate_bls_withdrawal_credentials_list(
                &bls_withdrawal_credentials_list,
            )?;
            Command::GenerateBlsToExecutionChange(BlsToExecutionChangeParams {
                mnemonic: prompt::mnemonic(mnemonic)?,
                mnemonic_password,
                num_validators: validator_indices.len(),
                chain_setting: chain,
                validator_start_index,
                validator_indices,
                bls_withdrawal_credentials_list: credentials_list,
                execution_address: validate_eth1_withdrawal_address(
                    &execution_address,
                )?,
            })
        }
        args::Command::ExitTransactionKeystore {
            keystore,
            keystore_password,
            validator_index,
            epoch,
        } => Command::ExitTransactionKeystore(ExitKeystoreParams {
            keystore_path: keystore,
            keystore_password: prompt::existing_keystore_password(
                keystore_password,
            )?,
            validator_index,
            epoch,
            chain_setting: chain,
        }),
        args::Command::ExitTransactionMnemonic {
            mnemonic,
            mnemonic_password,
            validator_start_index,
            validator_indices,
            epoch,
        } => Command::ExitTransactionMnemonic(ExitMnemonicParams {
            mnemonic: prompt::mnemonic(mnemonic)?,
            mnemonic_password,
            chain_setting: chain,
            validator_start_index,
            validator_indices: validate_validator_indices(&validator_indices)?,
            epoch,
        }),
    };

    let summary = run_batch(command, &args.output_folder)?;
    print_summary(&summary);
    Ok(())
}

fn resolve_chain(args: &WalletArgs) -> anyhow::Result<ChainSetting> {
    if let Some(devnet) = &args.devnet_chain_setting {
        let mut parts = devnet.splitn(3, ':');
        let (Some(name), Some(fork_version), Some(validators_root)) =
            (parts.next(), parts.next(), parts.next())
        else {
            anyhow::bail!(
                "--devnet-chain-setting must be \
                 NAME:FORK_VERSION:GENESIS_VALIDATORS_ROOT"
            );
        };
        return Ok(devnet_chain_setting(name, fork_version, validators_root)?);
    }
    Ok(chain_setting(&args.chain)?)
}

fn resolve_language(name: &str) -> anyhow::Result<Language> {
    let lowered = name.to_lowercase();
    LANGUAGES
        .into_iter()
        .find(|language| format!("{language:?}").to_lowercase() == lowered)
        .ok_or_else(|| anyhow::anyhow!("Unknown word-list language {name}"))
}

fn print_summary(summary: &BatchSummary) {
    println!("Artifacts written to {}", summary.output_folder.display());
    for path in &summary.keystore_files {
        println!("  keystore: {}", path.display());
    }
    if let Some(path) = &summary.deposit_data_file {
        println!("  deposit data: {}", path.display());
    }
    if let Some(path) = &summary.bls_to_execution_change_file {
        println!("  bls to execution change: {}", path.display());
    }
    if let Some(path) = &summary.exit_transaction_file {
        println!("  exit transactions: {}", path.display());
    }
}
