// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Hashing and key-derivation primitives.
//!
//! Thin wrappers over the RustCrypto crates that enforce the parameter
//! floors the rest of the crate relies on. KDF parameter sets below the
//! floors are refused outright rather than warned about.

use aes::Aes128;
use hkdf::Hkdf;
use sha2::{Digest, Sha256, Sha512};

pub use ctr::cipher::StreamCipher;

use crate::Error;

/// AES-128 in counter mode with a big-endian counter, as used by EIP-2335.
pub type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// Pseudo-random functions selectable for [`pbkdf2`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prf {
    /// HMAC-SHA-256
    HmacSha256,
    /// HMAC-SHA-512
    HmacSha512,
}

/// SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// HKDF-SHA-256 expand-and-extract into `okm` (RFC 5869).
pub fn hkdf_sha256(
    salt: &[u8],
    ikm: &[u8],
    info: &[u8],
    okm: &mut [u8],
) -> Result<(), Error> {
    Hkdf::<Sha256>::new(Some(salt), ikm)
        .expand(info, okm)
        .map_err(|_| {
            Error::InvalidKdfParams(format!(
                "HKDF output length {} is too large",
                okm.len()
            ))
        })
}

/// PBKDF2 with the given PRF and iteration count.
///
/// The SHA-256 variant refuses iteration counts below 2^18. The SHA-512
/// variant is uncapped: BIP-39 mandates c=2048 there.
pub fn pbkdf2(
    password: &[u8],
    salt: &[u8],
    dklen: usize,
    c: u32,
    prf: Prf,
) -> Result<Vec<u8>, Error> {
    if prf == Prf::HmacSha256 && c < (1 << 18) {
        return Err(Error::InsecureKdfParams);
    }
    let mut dk = vec![0u8; dklen];
    match prf {
        Prf::HmacSha256 => {
            ::pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, c, &mut dk)
        }
        Prf::HmacSha512 => {
            ::pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, c, &mut dk)
        }
    }
    Ok(dk)
}

/// scrypt with explicit cost parameters.
///
/// Refuses parameter sets with `n * r * p < 2^20` (under 128 MiB of work)
/// and rejects `n` values that are not a power of two or reach
/// `2^(128 * r / 8)`.
pub fn scrypt(
    password: &[u8],
    salt: &[u8],
    n: u32,
    r: u32,
    p: u32,
    dklen: usize,
) -> Result<Vec<u8>, Error> {
    if u64::from(n) * u64::from(r) * u64::from(p) < (1 << 20) {
        return Err(Error::InsecureKdfParams);
    }
    if !n.is_power_of_two() {
        return Err(Error::InvalidKdfParams(format!(
            "scrypt `n` must be a power of two, got {n}"
        )));
    }
    let log_n = n.trailing_zeros();
    if u64::from(log_n) >= 128 * u64::from(r) / 8 {
        return Err(Error::InvalidKdfParams(format!(
            "scrypt `n` must be below 2^(128 * r / 8), got n={n}, r={r}"
        )));
    }
    let params = ::scrypt::Params::new(log_n as u8, r, p, dklen)
        .map_err(|err| Error::InvalidKdfParams(err.to_string()))?;
    let mut dk = vec![0u8; dklen];
    ::scrypt::scrypt(password, salt, &params, &mut dk)
        .map_err(|err| Error::InvalidKdfParams(err.to_string()))?;
    Ok(dk)
}

/// AES-128-CTR streaming cipher over `key` and `iv`.
///
/// Encryption and decryption are the same keystream application.
pub fn aes_128_ctr(key: &[u8], iv: &[u8; 16]) -> Result<Aes128Ctr, Error> {
    use ctr::cipher::KeyIvInit;

    if key.len() != 16 {
        return Err(Error::InvalidAesKeyLength(key.len()));
    }
    Aes128Ctr::new_from_slices(key, iv)
        .map_err(|_| Error::InvalidAesKeyLength(key.len()))
}
