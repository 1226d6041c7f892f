// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! BIP-39 mnemonic codec.
//!
//! Entropy to mnemonic with checksum, reconstruction of a phrase from full
//! words or their first-four-character abbreviations across every supported
//! word list, and derivation of the 64-byte seed.
//!
//! The 2048-entry word lists are the ones vendored by the `bip39` crate;
//! the codec itself lives here because phrase reconstruction has to work on
//! abbreviated words and has to detect the language on its own.

use rand::rngs::OsRng;
use rand::RngCore;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use bip39::Language;

use crate::crypto::{self, sha256, Prf};
use crate::Error;

/// Number of bytes in a BIP-39 seed.
pub const SEED_SIZE: usize = 64;

/// PBKDF2 iteration count mandated by BIP-39.
const SEED_ITERATIONS: u32 = 2048;

/// Every word-list language supported for generation and reconstruction.
pub const LANGUAGES: [Language; 10] = [
    Language::English,
    Language::SimplifiedChinese,
    Language::TraditionalChinese,
    Language::Czech,
    Language::French,
    Language::Italian,
    Language::Japanese,
    Language::Korean,
    Language::Portuguese,
    Language::Spanish,
];

/// A 64-byte BIP-39 seed, wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_SIZE]);

impl Seed {
    /// The raw seed bytes.
    pub fn as_bytes(&self) -> &[u8; SEED_SIZE] {
        &self.0
    }
}

/// Returns the mnemonic encoding `entropy` in the given `language`.
///
/// Entropy must be 128, 160, 192, 224 or 256 bits long. The checksum is the
/// high `len/32` bits of its SHA-256 digest; words are the 11-bit MSB-first
/// chunks of `entropy ‖ checksum`, joined by single ASCII spaces.
pub fn get_mnemonic(language: Language, entropy: &[u8]) -> Result<String, Error> {
    if !matches!(entropy.len() * 8, 128 | 160 | 192 | 224 | 256) {
        return Err(Error::InvalidEntropyLength(entropy.len()));
    }
    let checksum_bits = entropy.len() / 4;
    let digest = sha256(entropy);
    let word_count = (entropy.len() * 8 + checksum_bits) / 11;

    let word_list = language.word_list();
    let words: Vec<&str> = (0..word_count)
        .map(|chunk| word_list[index_at(entropy, &digest, chunk)])
        .collect();
    Ok(words.join(" "))
}

/// Generates a fresh 24-word mnemonic from 256 bits of OS entropy.
pub fn random_mnemonic(language: Language) -> Result<String, Error> {
    let mut entropy = [0u8; 32];
    OsRng.fill_bytes(&mut entropy);
    let mnemonic = get_mnemonic(language, &entropy);
    entropy.zeroize();
    mnemonic
}

/// Rebuilds the canonical mnemonic from a phrase of full words or
/// first-four-character abbreviations.
///
/// The input is NFKC-normalized and lower-cased, then matched against every
/// supported word list on the first four characters of each word. Exactly
/// one language must yield indices whose checksum validates; none is a
/// recognition failure and more than one is an ambiguity error.
pub fn reconstruct_mnemonic(phrase: &str) -> Result<String, Error> {
    let normalized = phrase.nfkc().collect::<String>().to_lowercase();
    let words: Vec<&str> = normalized.split(' ').collect();
    if !matches!(words.len(), 12 | 15 | 18 | 21 | 24) {
        return Err(Error::InvalidWordCount(words.len()));
    }

    let mut reconstructed = None;
    for language in LANGUAGES {
        let Some(indices) = word_indices(language, &words) else {
            continue;
        };
        if !checksum_is_valid(&indices) {
            continue;
        }
        let word_list = language.word_list();
        let full: Vec<&str> =
            indices.iter().map(|&index| word_list[index]).collect();
        if reconstructed.replace(full.join(" ")).is_some() {
            return Err(Error::AmbiguousMnemonic);
        }
    }
    reconstructed.ok_or(Error::InvalidMnemonic)
}

/// Whether `phrase` reconstructs to a valid mnemonic in exactly one
/// supported language.
pub fn verify_mnemonic(phrase: &str) -> bool {
    reconstruct_mnemonic(phrase).is_ok()
}

/// Derives the BIP-39 seed for a mnemonic under an optional passphrase.
///
/// PBKDF2-HMAC-SHA-512 over the NFKD-normalized mnemonic with the salt
/// `"mnemonic" ‖ password`, also NFKD-normalized.
pub fn get_seed(mnemonic: &str, password: &str) -> Result<Seed, Error> {
    let mut normalized: String = mnemonic.nfkd().collect();
    let mut salt: String = "mnemonic"
        .chars()
        .chain(password.chars())
        .nfkd()
        .collect();

    let mut dk = crypto::pbkdf2(
        normalized.as_bytes(),
        salt.as_bytes(),
        SEED_SIZE,
        SEED_ITERATIONS,
        Prf::HmacSha512,
    )?;

    let mut seed = [0u8; SEED_SIZE];
    seed.copy_from_slice(&dk);
    dk.zeroize();
    normalized.zeroize();
    salt.zeroize();
    Ok(Seed(seed))
}

/// The 11-bit MSB-first chunk at `chunk` of `entropy ‖ checksum`.
fn index_at(entropy: &[u8], digest: &[u8; 32], chunk: usize) -> usize {
    let entropy_bits = entropy.len() * 8;
    let mut index = 0usize;
    for i in chunk * 11..(chunk + 1) * 11 {
        let bit = if i < entropy_bits {
            entropy[i / 8] >> (7 - i % 8) & 1
        } else {
            let j = i - entropy_bits;
            digest[j / 8] >> (7 - j % 8) & 1
        };
        index = index << 1 | bit as usize;
    }
    index
}

/// Maps every word to its index in `language`, or `None` if any word is
/// absent from that list.
fn word_indices(language: Language, words: &[&str]) -> Option<Vec<usize>> {
    words
        .iter()
        .map(|word| find_word(language, word))
        .collect()
}

/// Finds a word by its first four NFKC characters.
///
/// BIP-39 word lists are unique within their first four characters, so the
/// abbreviation of a word identifies it as well as the full word does.
fn find_word(language: Language, word: &str) -> Option<usize> {
    let key = abbreviation(word);
    language
        .word_list()
        .iter()
        .position(|candidate| abbreviation(candidate) == key)
}

fn abbreviation(word: &str) -> String {
    word.nfkc().take(4).collect()
}

/// Validates the checksum of a complete index sequence.
fn checksum_is_valid(indices: &[usize]) -> bool {
    let checksum_bits = indices.len() / 3;
    let entropy_bits = indices.len() * 11 - checksum_bits;

    let mut entropy = vec![0u8; entropy_bits / 8];
    let mut checksum = 0u16;
    for (chunk, &index) in indices.iter().enumerate() {
        for offset in 0..11 {
            let i = chunk * 11 + offset;
            let bit = (index >> (10 - offset) & 1) as u16;
            if i < entropy_bits {
                entropy[i / 8] |= (bit as u8) << (7 - i % 8);
            } else {
                checksum = checksum << 1 | bit;
            }
        }
    }

    let digest = sha256(&entropy);
    let expected = (u16::from(digest[0]) << 8 | u16::from(digest[1]))
        >> (16 - checksum_bits);
    checksum == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREZOR_MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon \
         abandon abandon abandon about";

    #[test]
    fn trezor_vector_entropy_to_mnemonic() {
        let mnemonic = get_mnemonic(Language::English, &[0u8; 16]).unwrap();
        assert_eq!(mnemonic, TREZOR_MNEMONIC);

        let mnemonic = get_mnemonic(Language::English, &[0xffu8; 16]).unwrap();
        assert_eq!(
            mnemonic,
            "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo wrong"
        );

        let mnemonic = get_mnemonic(Language::English, &[0x7fu8; 16]).unwrap();
        assert_eq!(
            mnemonic,
            "legal winner thank year wave sausage worth useful legal winner \
             thank yellow"
        );
    }

    #[test]
    fn trezor_vector_seed() {
        let seed = get_seed(TREZOR_MNEMONIC, "TREZOR").unwrap();
        let expected = hex::decode(
            "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e5349553\
             1f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04",
        )
        .unwrap();
        assert_eq!(seed.as_bytes().as_slice(), expected.as_slice());
    }

    #[test]
    fn rejects_invalid_entropy_length() {
        assert!(matches!(
            get_mnemonic(Language::English, &[0u8; 17]),
            Err(Error::InvalidEntropyLength(17))
        ));
    }

    #[test]
    fn reconstructs_abbreviated_phrase() {
        let abbreviated =
            "aban aban aban aban aban aban aban aban aban aban aban abou";
        assert_eq!(reconstruct_mnemonic(abbreviated).unwrap(), TREZOR_MNEMONIC);
    }

    #[test]
    fn reconstructs_full_phrase() {
        assert_eq!(
            reconstruct_mnemonic(TREZOR_MNEMONIC).unwrap(),
            TREZOR_MNEMONIC
        );
    }

    #[test]
    fn rejects_bad_checksum() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon \
                      abandon abandon abandon abandon abandon";
        assert!(matches!(
            reconstruct_mnemonic(phrase),
            Err(Error::InvalidMnemonic)
        ));
    }

    #[test]
    fn rejects_bad_word_count() {
        assert!(matches!(
            reconstruct_mnemonic("abandon abandon abandon"),
            Err(Error::InvalidWordCount(3))
        ));
    }

    #[test]
    fn round_trips_distinct_scripts() {
        // Hangul and kana cannot shadow each other or the Latin lists, so
        // reconstruction is unambiguous for these languages.
        for language in [Language::English, Language::Korean, Language::Japanese]
        {
            let entropy = [0x42u8; 32];
            let mnemonic = get_mnemonic(language, &entropy).unwrap();
            assert_eq!(mnemonic.split(' ').count(), 24);
            assert_eq!(reconstruct_mnemonic(&mnemonic).unwrap(), mnemonic);
        }
    }

    #[test]
    fn random_mnemonics_differ() {
        let a = random_mnemonic(Language::English).unwrap();
        let b = random_mnemonic(Language::English).unwrap();
        assert_eq!(a.split(' ').count(), 24);
        assert!(verify_mnemonic(&a));
        assert_ne!(a, b);
    }
}
