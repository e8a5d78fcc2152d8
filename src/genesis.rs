//! Genesis payload derivation.
//!
//! The 27-byte genesis is the middle section of an identifier. It is
//! produced in one of two ways: truncated from the identity's genesis state
//! integer, or zero-padded from a 20-byte Ethereum address. Only the second
//! form is reversible.

use num_bigint::BigUint;
use thiserror::Error;

/// Number of bytes in a genesis payload.
pub const GENESIS_LENGTH: usize = 27;

/// Number of bytes in an Ethereum address.
pub const ETH_ADDRESS_LENGTH: usize = 20;

/// The 27-byte genesis payload embedded in an identifier.
pub type Genesis = [u8; GENESIS_LENGTH];

/// A raw Ethereum address.
pub type EthAddress = [u8; ETH_ADDRESS_LENGTH];

const STATE_LENGTH: usize = 32;

#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum GenesisError {
    /// The identity state does not fit into the protocol's 32-byte integer
    /// encoding.
    #[error("identity state does not fit into 32 bytes")]
    StateTooLarge,
    /// The genesis was not derived from an Ethereum address.
    #[error("can't get Ethereum address: high bytes of genesis are not zero")]
    NonZeroGenesisHighBytes,
}

/// Derives the genesis payload of an identity from its genesis state.
///
/// The state is encoded as a 32-byte little-endian integer and the last 27
/// bytes of that encoding become the genesis; the 5 low-order bytes are
/// dropped. One-way: the state cannot be recovered from the genesis.
pub fn genesis_from_state(state: &BigUint) -> Result<Genesis, GenesisError> {
    let le = state.to_bytes_le();
    if le.len() > STATE_LENGTH {
        return Err(GenesisError::StateTooLarge);
    }
    let mut state_bytes = [0u8; STATE_LENGTH];
    state_bytes[..le.len()].copy_from_slice(&le);
    let mut genesis = [0u8; GENESIS_LENGTH];
    genesis.copy_from_slice(&state_bytes[STATE_LENGTH - GENESIS_LENGTH..]);
    Ok(genesis)
}

/// Embeds a 20-byte Ethereum address into a genesis payload by prefixing it
/// with 7 zero bytes. Reversible via [`eth_address_from_genesis`].
pub fn genesis_from_eth_address(addr: EthAddress) -> Genesis {
    let mut genesis = [0u8; GENESIS_LENGTH];
    genesis[GENESIS_LENGTH - ETH_ADDRESS_LENGTH..].copy_from_slice(&addr);
    genesis
}

/// Extracts the Ethereum address embedded in an address-derived genesis.
///
/// Fails unless the 7 high bytes are exactly zero; a state-derived genesis
/// is all but guaranteed to be rejected here.
pub fn eth_address_from_genesis(genesis: &Genesis) -> Result<EthAddress, GenesisError> {
    if genesis[..GENESIS_LENGTH - ETH_ADDRESS_LENGTH]
        .iter()
        .any(|&b| b != 0)
    {
        return Err(GenesisError::NonZeroGenesisHighBytes);
    }
    let mut addr = [0u8; ETH_ADDRESS_LENGTH];
    addr.copy_from_slice(&genesis[GENESIS_LENGTH - ETH_ADDRESS_LENGTH..]);
    Ok(addr)
}
