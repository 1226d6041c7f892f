// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

/// Errors returned by the key-derivation core
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Entropy must be 128, 160, 192, 224 or 256 bits
    #[error("Entropy must be 16, 20, 24, 28 or 32 bytes, got {0}")]
    InvalidEntropyLength(usize),
    /// Mnemonic word count outside {12, 15, 18, 21, 24}
    #[error("{0} is not a valid number of words in a mnemonic")]
    InvalidWordCount(usize),
    /// No supported language both matches every word and passes the checksum
    #[error("Mnemonic is not valid in any supported language")]
    InvalidMnemonic,
    /// More than one language validates the phrase
    #[error("Mnemonic is valid in more than one language")]
    AmbiguousMnemonic,
    /// KDF parameters below the safety floor
    #[error("The KDF parameters chosen are not secure")]
    InsecureKdfParams,
    /// KDF parameters outside the valid domain
    #[error("Invalid KDF parameters: {0}")]
    InvalidKdfParams(String),
    /// AES-128 keys are 16 bytes
    #[error("AES-128 key must be 16 bytes, got {0}")]
    InvalidAesKeyLength(usize),
    /// Seeds feeding the key tree must be at least 32 bytes
    #[error("Seed must be at least 32 bytes, got {0}")]
    SeedTooShort(usize),
    /// Derivation indices are unsigned 32-bit integers
    #[error("Derivation index must be below 2^32")]
    IndexOutOfRange,
    /// Derivation path is malformed
    #[error("Invalid derivation path {0}")]
    InvalidPath(String),
    /// Secret key bytes rejected by the BLS backend
    #[error("Invalid BLS secret key")]
    InvalidSecretKey,
}
