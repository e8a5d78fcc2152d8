//! Core identity types for the iden3 protocol.
//!
//! An identity is referenced in two interchangeable forms: a compact
//! 31-byte binary [`Id`] embedded in claims and on-chain state, and a DID
//! URI such as
//! `did:polygonid:polygon:mumbai:2qCU58EJgrEM9NKvHkvg5NFWUiJPgN3M3LnCr98j3x`.
//! This crate implements the codec between the two: the identifier layout
//! (type prefix, genesis payload, checksum trailer), the compiled-in
//! registry of methods, blockchains and networks, genesis derivation from
//! an identity state or an Ethereum address, and the DID string grammar
//! with its cross-validation of the textual and binary representations.
//!
//! ## Example
//! Issue a genesis DID from an identity state and resolve it back.
//! ```
//! use iden3_core::{Blockchain, Did, DidMethod, DidType, NetworkId};
//! use num_bigint::BigUint;
//!
//! let typ = DidType::new(DidMethod::Iden3, Blockchain::NoChain, NetworkId::NoNetwork)?;
//! let did = Did::from_genesis_state(typ, &BigUint::from(1u8))?;
//! assert_eq!(did.to_string(), "did:iden3:tJ93RwaVfE1PEMxd5rpZZuPtLCwbEaDCrNBhAy8HM");
//!
//! let parsed: Did = did.to_string().parse()?;
//! assert_eq!(parsed, did);
//! # Ok::<(), iden3_core::DidError>(())
//! ```
//!
//! Everything here is a deterministic, side-effect-free function over
//! immutable values; the registry table is compiled in and read-only, so
//! all operations are safe to call concurrently without coordination.

pub mod did;
pub mod genesis;
pub mod id;
pub mod registry;

pub use did::{Did, DidError, DID_SCHEME};
pub use genesis::{
    eth_address_from_genesis, genesis_from_eth_address, genesis_from_state, EthAddress, Genesis,
    GenesisError, ETH_ADDRESS_LENGTH, GENESIS_LENGTH,
};
pub use id::{calculate_checksum, Id, IdParseError, CHECKSUM_LENGTH, ID_LENGTH, TYPE_LENGTH};
pub use registry::{Blockchain, DidMethod, DidType, NetworkId, RegistryError};
