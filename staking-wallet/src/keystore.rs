// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! EIP-2335 keystores.
//!
//! A keystore stores a BLS secret key encrypted under a user password:
//! a KDF stretches the password into a decryption key, AES-128-CTR
//! encrypts the secret with its first half, and a SHA-256 checksum over
//! the second half and the ciphertext gates decryption. The JSON envelope
//! parses once into typed fields; hex is decoded exactly where a byte
//! field is declared.

use std::fs;
use std::path::Path;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;
use zeroize::Zeroizing;

use wallet_core::bls::SecretKey;
use wallet_core::crypto::{self, Prf, StreamCipher};

use crate::Error;

/// Length of the derived decryption key in bytes.
pub const DKLEN: u32 = 32;
/// Length of a KDF salt in bytes.
pub const SALT_SIZE: usize = 32;
/// Length of an AES-128-CTR IV in bytes.
pub const IV_SIZE: usize = 16;

/// PBKDF2 iteration count used for new keystores.
const PBKDF2_ROUNDS: u32 = 1 << 18;
/// scrypt cost parameter used for new keystores.
const SCRYPT_N: u32 = 1 << 18;

/// KDF parameter sets supported by EIP-2335.
///
/// The variant is picked by the module's `function` string on load; the
/// two shapes share no field set, so the untagged representation is
/// unambiguous.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KdfParams {
    /// PBKDF2-HMAC-SHA-256 parameters.
    Pbkdf2 {
        /// Iteration count.
        c: u32,
        /// Derived key length in bytes.
        dklen: u32,
        /// PRF identifier, always `hmac-sha256`.
        prf: String,
        /// Random salt.
        #[serde_as(as = "Hex")]
        salt: Vec<u8>,
    },
    /// scrypt parameters.
    Scrypt {
        /// Derived key length in bytes.
        dklen: u32,
        /// CPU/memory cost.
        n: u32,
        /// Parallelization.
        p: u32,
        /// Block size.
        r: u32,
        /// Random salt.
        #[serde_as(as = "Hex")]
        salt: Vec<u8>,
    },
}

impl KdfParams {
    fn function(&self) -> &'static str {
        match self {
            Self::Pbkdf2 { .. } => "pbkdf2",
            Self::Scrypt { .. } => "scrypt",
        }
    }
}

/// The key-derivation module of the crypto section.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfModule {
    /// KDF identifier, `pbkdf2` or `scrypt`.
    pub function: String,
    /// KDF parameters.
    pub params: KdfParams,
    /// Unused by EIP-2335, always empty.
    #[serde_as(as = "Hex")]
    pub message: Vec<u8>,
}

/// Empty parameter object of the checksum module.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumParams {}

/// The checksum module of the crypto section.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumModule {
    /// Checksum function, always `sha256`.
    pub function: String,
    /// Always empty.
    pub params: ChecksumParams,
    /// SHA-256 over the second decryption-key half and the ciphertext.
    #[serde_as(as = "Hex")]
    pub message: Vec<u8>,
}

/// Parameters of the cipher module.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherParams {
    /// AES-128-CTR initialization vector.
    #[serde_as(as = "Hex")]
    pub iv: Vec<u8>,
}

/// The cipher module of the crypto section.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherModule {
    /// Cipher identifier, always `aes-128-ctr`.
    pub function: String,
    /// Cipher parameters.
    pub params: CipherParams,
    /// The encrypted secret.
    #[serde_as(as = "Hex")]
    pub message: Vec<u8>,
}

/// The crypto section of a keystore.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreCrypto {
    /// Key-derivation module.
    pub kdf: KdfModule,
    /// Checksum module.
    pub checksum: ChecksumModule,
    /// Cipher module.
    pub cipher: CipherModule,
}

/// An EIP-2335 keystore.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keystore {
    /// Crypto section.
    pub crypto: KeystoreCrypto,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Hex-encoded public key of the stored secret.
    #[serde(default)]
    pub pubkey: String,
    /// Derivation path of the stored secret, if known.
    pub path: String,
    /// Fresh v4 identifier of this keystore.
    pub uuid: Uuid,
    /// Format version, always 4.
    pub version: u32,
}

impl Keystore {
    /// Encrypts `secret` with scrypt at the EIP-2335 default cost.
    ///
    /// `kdf_salt` and `aes_iv` override the CSPRNG values, which the test
    /// vectors need; production callers pass `None`.
    pub fn encrypt_scrypt(
        secret: &[u8; 32],
        password: &str,
        path: &str,
        kdf_salt: Option<[u8; SALT_SIZE]>,
        aes_iv: Option<[u8; IV_SIZE]>,
    ) -> Result<Self, Error> {
        let salt = kdf_salt.unwrap_or_else(random_bytes::<SALT_SIZE>);
        let params = KdfParams::Scrypt {
            dklen: DKLEN,
            n: SCRYPT_N,
            p: 1,
            r: 8,
            salt: salt.to_vec(),
        };
        Self::encrypt(secret, password, path, params, aes_iv)
    }

    /// Encrypts `secret` with PBKDF2 at the EIP-2335 default cost.
    pub fn encrypt_pbkdf2(
        secret: &[u8; 32],
        password: &str,
        path: &str,
        kdf_salt: Option<[u8; SALT_SIZE]>,
        aes_iv: Option<[u8; IV_SIZE]>,
    ) -> Result<Self, Error> {
        let salt = kdf_salt.unwrap_or_else(random_bytes::<SALT_SIZE>);
        let params = KdfParams::Pbkdf2 {
            c: PBKDF2_ROUNDS,
            dklen: DKLEN,
            prf: "hmac-sha256".to_string(),
            salt: salt.to_vec(),
        };
        Self::encrypt(secret, password, path, params, aes_iv)
    }

    fn encrypt(
        secret: &[u8; 32],
        password: &str,
        path: &str,
        params: KdfParams,
        aes_iv: Option<[u8; IV_SIZE]>,
    ) -> Result<Self, Error> {
        let iv = aes_iv.unwrap_or_else(random_bytes::<IV_SIZE>);
        let password_bytes = Zeroizing::new(process_password(password));
        let dk = Zeroizing::new(derive_decryption_key(&params, &password_bytes)?);

        let mut message = secret.to_vec();
        crypto::aes_128_ctr(&dk[..16], &iv)?.apply_keystream(&mut message);

        let mut checksum_input = Vec::with_capacity(16 + message.len());
        checksum_input.extend_from_slice(&dk[16..32]);
        checksum_input.extend_from_slice(&message);
        let checksum = crypto::sha256(&checksum_input);

        let pubkey = SecretKey::from_bytes(secret)?.public_key();

        Ok(Keystore {
            crypto: KeystoreCrypto {
                kdf: KdfModule {
                    function: params.function().to_string(),
                    params,
                    message: Vec::new(),
                },
                checksum: ChecksumModule {
                    function: "sha256".to_string(),
                    params: ChecksumParams {},
                    message: checksum.to_vec(),
                },
                cipher: CipherModule {
                    function: "aes-128-ctr".to_string(),
                    params: CipherParams { iv: iv.to_vec() },
                    message,
                },
            },
            description: String::new(),
            pubkey: hex::encode(pubkey),
            path: path.to_string(),
            uuid: Uuid::new_v4(),
            version: 4,
        })
    }

    /// Recovers the secret by re-deriving the decryption key from
    /// `password`.
    ///
    /// The checksum is recomputed before anything is decrypted; a mismatch
    /// means a wrong password or a corrupt file and yields no partial
    /// secret.
    pub fn decrypt(&self, password: &str) -> Result<Zeroizing<Vec<u8>>, Error> {
        if self.crypto.kdf.function != self.crypto.kdf.params.function() {
            return Err(Error::UnsupportedKdf(self.crypto.kdf.function.clone()));
        }
        let password_bytes = Zeroizing::new(process_password(password));
        let dk = Zeroizing::new(derive_decryption_key(
            &self.crypto.kdf.params,
            &password_bytes,
        )?);
        if dk.len() < 32 {
            return Err(Error::KeystoreFormat(format!(
                "dklen should be at least 32, got {}",
                dk.len()
            )));
        }

        let mut checksum_input =
            Vec::with_capacity(16 + self.crypto.cipher.message.len());
        checksum_input.extend_from_slice(&dk[16..32]);
        checksum_input.extend_from_slice(&self.crypto.cipher.message);
        let checksum = crypto::sha256(&checksum_input);
        if checksum[..] != self.crypto.checksum.message[..] {
            return Err(Error::KeystoreChecksum);
        }

        let iv: [u8; IV_SIZE] =
            self.crypto.cipher.params.iv.as_slice().try_into().map_err(
                |_| {
                    Error::KeystoreFormat(format!(
                        "IV should be {IV_SIZE} bytes, got {}",
                        self.crypto.cipher.params.iv.len()
                    ))
                },
            )?;

        let mut secret = Zeroizing::new(self.crypto.cipher.message.clone());
        crypto::aes_128_ctr(&dk[..16], &iv)?
            .apply_keystream(secret.as_mut_slice());
        Ok(secret)
    }

    /// Serializes to canonical JSON: lower-case hex, no `0x` prefixes.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a keystore from its JSON encoding.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let keystore: Keystore = serde_json::from_str(json)?;
        if keystore.version != 4 {
            return Err(Error::KeystoreFormat(format!(
                "unsupported version {}",
                keystore.version
            )));
        }
        Ok(keystore)
    }

    /// Writes the keystore as JSON, read-only for owner and group.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        fs::write(&path, self.to_json()?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o440))?;
        }
        Ok(())
    }

    /// Reads a keystore from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

/// Preprocesses a password as EIP-2335 requires.
///
/// NFKD-normalize, strip the C0, C1 and delete control code points, encode
/// UTF-8.
pub fn process_password(password: &str) -> Vec<u8> {
    password
        .nfkd()
        .filter(|c| {
            let cp = *c as u32;
            !(cp < 0x20 || (0x7f..0xa0).contains(&cp))
        })
        .collect::<String>()
        .into_bytes()
}

fn derive_decryption_key(
    params: &KdfParams,
    password: &[u8],
) -> Result<Vec<u8>, Error> {
    match params {
        KdfParams::Pbkdf2 {
            c,
            dklen,
            prf,
            salt,
        } => {
            if prf != "hmac-sha256" {
                return Err(Error::UnsupportedKdf(prf.clone()));
            }
            Ok(crypto::pbkdf2(
                password,
                salt,
                *dklen as usize,
                *c,
                Prf::HmacSha256,
            )?)
        }
        KdfParams::Scrypt {
            dklen,
            n,
            p,
            r,
            salt,
        } => Ok(crypto::scrypt(password, salt, *n, *r, *p, *dklen as usize)?),
    }
}

fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_control_characters_from_passwords() {
        assert_eq!(process_password("\u{7}"), b"");
        assert_eq!(process_password("\u{8}"), b"");
        assert_eq!(process_password("\t"), b"");
        assert_eq!(process_password("a"), b"a");
        assert_eq!(process_password("abc"), b"abc");
        assert_eq!(process_password("a\u{8}c"), b"ac");
    }

    #[test]
    fn kdf_function_mismatch_is_rejected() {
        let mut keystore = Keystore::encrypt_pbkdf2(
            &[0x11u8; 32],
            "password-for-tests",
            "m/12381/3600/0/0/0",
            Some([0u8; SALT_SIZE]),
            Some([0u8; IV_SIZE]),
        )
        .unwrap();
        keystore.crypto.kdf.function = "scrypt".to_string();
        assert!(matches!(
            keystore.decrypt("password-for-tests"),
            Err(Error::UnsupportedKdf(_))
        ));
    }
}
