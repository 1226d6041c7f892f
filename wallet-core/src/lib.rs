// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.

//! # Staking Wallet Core
//!
//! The key-derivation core of the staking wallet: BIP-39 mnemonic handling,
//! seed derivation, the EIP-2333 BLS12-381 key tree and EIP-2334 path
//! resolution, together with the crypto primitives they are built on.
//!
//! Everything in this crate is deterministic and offline. Secret material is
//! wiped on drop where the containers are ours to control.

pub mod bls;
pub mod crypto;
pub mod mnemonic;
pub mod path;
pub mod tree;

mod error;

pub use error::Error;
