// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! Consensus-layer network settings.
//!
//! The name → (genesis fork version, genesis validators root) registry is
//! the only runtime-configurable input to domain computation. Unknown
//! networks are errors; devnets are supplied explicitly.

use crate::Error;

/// Version string embedded in exported artifact metadata.
pub const DEPOSIT_CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ethereum mainnet.
pub const MAINNET: &str = "mainnet";
/// The Sepolia testnet.
pub const SEPOLIA: &str = "sepolia";
/// The Holesky testnet.
pub const HOLESKY: &str = "holesky";
/// The Mekong devnet.
pub const MEKONG: &str = "mekong";

/// Networks known to this build, in menu order.
pub const ALL_CHAINS: [&str; 4] = [MAINNET, SEPOLIA, HOLESKY, MEKONG];

/// Identity of a consensus-layer network as used in signing domains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainSetting {
    /// Human-readable network name, echoed into exported metadata.
    pub network_name: String,
    /// Genesis fork version of the network.
    pub genesis_fork_version: [u8; 4],
    /// Genesis validators root of the network.
    pub genesis_validators_root: [u8; 32],
}

/// Looks up the setting of a known network by name.
pub fn chain_setting(name: &str) -> Result<ChainSetting, Error> {
    match name {
        MAINNET => setting(
            MAINNET,
            "00000000",
            "4b363db94e286120d76eb905340fdd4e54bfe9f06bf33ff6cf5ad27f511bfe95",
        ),
        SEPOLIA => setting(
            SEPOLIA,
            "90000069",
            "d8ea171f3c94aea21ebc42a1ed61052acf3f9209c00e4efbaaddac09ed9b8078",
        ),
        HOLESKY => setting(
            HOLESKY,
            "01017000",
            "9143aa7c615a7f7115e2b6aac319c03529df8242ae705fba9df39b79c59fa8b1",
        ),
        MEKONG => setting(
            MEKONG,
            "10637624",
            "9838240bca889c52818d7502179b393a828f61f15119d9027827c36caeb67db7",
        ),
        _ => Err(Error::UnknownNetwork(name.to_string())),
    }
}

/// Builds a setting for an ad-hoc devnet from hex-encoded parameters.
///
/// Both values accept an optional `0x` prefix. Lengths other than 4 and 32
/// bytes respectively are rejected.
pub fn devnet_chain_setting(
    name: &str,
    genesis_fork_version: &str,
    genesis_validators_root: &str,
) -> Result<ChainSetting, Error> {
    setting(name, genesis_fork_version, genesis_validators_root)
}

fn setting(
    name: &str,
    fork_version_hex: &str,
    validators_root_hex: &str,
) -> Result<ChainSetting, Error> {
    let fork_version = hex::decode(strip_0x(fork_version_hex))?;
    let genesis_fork_version: [u8; 4] = fork_version
        .as_slice()
        .try_into()
        .map_err(|_| Error::InvalidForkVersion(fork_version.len()))?;

    let validators_root = hex::decode(strip_0x(validators_root_hex))?;
    let genesis_validators_root: [u8; 32] = validators_root
        .as_slice()
        .try_into()
        .map_err(|_| Error::InvalidValidatorsRoot(validators_root.len()))?;

    Ok(ChainSetting {
        network_name: name.to_string(),
        genesis_fork_version,
        genesis_validators_root,
    })
}

pub(crate) fn strip_0x(hex: &str) -> &str {
    hex.strip_prefix("0x").unwrap_or(hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_networks_resolve() {
        let mainnet = chain_setting(MAINNET).unwrap();
        assert_eq!(mainnet.genesis_fork_version, [0, 0, 0, 0]);
        assert_eq!(mainnet.genesis_validators_root[..2], [0x4b, 0x36]);

        for name in ALL_CHAINS {
            assert!(chain_setting(name).is_ok());
        }
    }

    #[test]
    fn unknown_network_is_an_error() {
        assert!(matches!(
            chain_setting("ropsten"),
            Err(Error::UnknownNetwork(_))
        ));
    }

    #[test]
    fn devnet_settings_parse_and_validate() {
        let devnet = devnet_chain_setting(
            "devnet0",
            "0x01000000",
            "0x0000000000000000000000000000000000000000000000000000000000000000",
        )
        .unwrap();
        assert_eq!(devnet.genesis_fork_version, [1, 0, 0, 0]);

        assert!(matches!(
            devnet_chain_setting("devnet0", "010000", "00"),
            Err(Error::InvalidForkVersion(3))
        ));
    }
}
