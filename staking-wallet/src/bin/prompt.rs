// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

use anyhow::Result;
use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Text};

use staking_wallet::validation::validate_password_strength;
use wallet_core::mnemonic::reconstruct_mnemonic;

pub(crate) fn ask_pwd(msg: &str) -> Result<String, InquireError> {
    Password::new(msg)
        .with_display_toggle_enabled()
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
}

pub(crate) fn create_keystore_password() -> Result<String> {
    loop {
        let pwd = Password::new("Keystore password:")
            .with_display_toggle_enabled()
            .with_display_mode(PasswordDisplayMode::Hidden)
            .with_custom_confirmation_message("Confirm password:")
            .with_custom_confirmation_error_message("The passwords don't match")
            .prompt()?;

        match validate_password_strength(&pwd) {
            Ok(()) => break Ok(pwd),
            Err(err) => println!("{err}, please try again"),
        }
    }
}

/// Resolve the keystore password from the command line or the prompt.
pub(crate) fn keystore_password(arg: Option<String>) -> Result<String> {
    match arg {
        Some(pwd) => Ok(pwd),
        None => create_keystore_password(),
    }
}

/// Resolve the password of an existing keystore file.
pub(crate) fn existing_keystore_password(arg: Option<String>) -> Result<String> {
    match arg {
        Some(pwd) => Ok(pwd),
        None => Ok(ask_pwd("Keystore password:")?),
    }
}

/// Request the mnemonic phrase, allowing four-letter abbreviations.
pub(crate) fn request_mnemonic_phrase() -> Result<String> {
    let mut attempt = 1;
    loop {
        let phrase = Text::new("Please enter the mnemonic phrase:").prompt()?;

        match reconstruct_mnemonic(&phrase) {
            Ok(mnemonic) => break Ok(mnemonic),
            Err(err) if attempt > 2 => break Err(err.into()),
            Err(_) => {
                println!("Invalid mnemonic phrase, please try again");
                attempt += 1;
            }
        }
    }
}

/// Resolve the mnemonic from the command line or the prompt.
pub(crate) fn mnemonic(arg: Option<String>) -> Result<String> {
    match arg {
        Some(phrase) => Ok(phrase),
        None => request_mnemonic_phrase(),
    }
}

/// Display a freshly generated mnemonic and ask for backup confirmation.
pub(crate) fn confirm_mnemonic_phrase(phrase: &str) -> Result<()> {
    let msg = format!(
        "This is your mnemonic. Write it down and store it safely. It is the \
         ONLY way to recover your validator keys.\n> {phrase}\nHave you \
         written it down?"
    );

    let confirm = Confirm::new(&msg)
        .with_help_message(
            "It is important you back up the mnemonic before proceeding",
        )
        .prompt()?;

    if !confirm {
        confirm_mnemonic_phrase(phrase)?
    }

    Ok(())
}
