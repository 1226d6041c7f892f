// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! EIP-2334 derivation-path handling.

use crate::bls::SecretKey;
use crate::mnemonic::get_seed;
use crate::tree::{derive_child_sk, derive_master_sk};
use crate::Error;

/// Parses a derivation path of the form `m/i/j/...` into its indices.
///
/// Spaces are stripped first; any character outside `m`, digits and `/` is
/// rejected, the leading segment must be exactly `m`, and every index must
/// fit an unsigned 32-bit integer.
pub fn path_to_nodes(path: &str) -> Result<Vec<u32>, Error> {
    let stripped = path.replace(' ', "");
    if !stripped
        .chars()
        .all(|c| matches!(c, 'm' | '0'..='9' | '/'))
    {
        return Err(Error::InvalidPath(stripped.clone()));
    }

    let mut segments = stripped.split('/');
    if segments.next() != Some("m") {
        return Err(Error::InvalidPath(stripped.clone()));
    }

    segments
        .map(|segment| {
            let index: u64 = segment
                .parse()
                .map_err(|_| Error::InvalidPath(stripped.clone()))?;
            u32::try_from(index).map_err(|_| Error::IndexOutOfRange)
        })
        .collect()
}

/// Walks the key tree from `mnemonic` (under `password`) down to `path`.
pub fn mnemonic_and_path_to_key(
    mnemonic: &str,
    path: &str,
    password: &str,
) -> Result<SecretKey, Error> {
    let seed = get_seed(mnemonic, password)?;
    let mut sk = derive_master_sk(seed.as_bytes())?;
    for node in path_to_nodes(path)? {
        sk = derive_child_sk(&sk, node)?;
    }
    Ok(sk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_validator_paths() {
        assert_eq!(
            path_to_nodes("m/12381/3600/0/0/0").unwrap(),
            vec![12381, 3600, 0, 0, 0]
        );
        assert_eq!(
            path_to_nodes("m / 12381 / 3600 / 4 / 0").unwrap(),
            vec![12381, 3600, 4, 0]
        );
    }

    #[test]
    fn rejects_malformed_paths() {
        for path in ["x/12381/3600/0/0", "m/qwert", "m/12381//0", "n/0", ""] {
            assert!(
                matches!(path_to_nodes(path), Err(Error::InvalidPath(_))),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_index() {
        assert!(matches!(
            path_to_nodes("m/4294967296"),
            Err(Error::IndexOutOfRange)
        ));
        assert_eq!(path_to_nodes("m/4294967295").unwrap(), vec![u32::MAX]);
    }
}
