//! The 31-byte identifier and its binary, base58 and integer codecs.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::de;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::genesis::{
    eth_address_from_genesis, genesis_from_state, EthAddress, Genesis, GenesisError,
    GENESIS_LENGTH,
};
use crate::registry::{Blockchain, DidMethod, DidType, NetworkId, RegistryError};

/// Total number of bytes in an identifier.
pub const ID_LENGTH: usize = 31;

/// Number of bytes in the type prefix.
pub const TYPE_LENGTH: usize = 2;

/// Number of bytes in the checksum trailer.
pub const CHECKSUM_LENGTH: usize = 2;

const PAYLOAD_LENGTH: usize = TYPE_LENGTH + GENESIS_LENGTH;

/// An error resulting from decoding an identifier from bytes, base58 text or
/// an integer.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum IdParseError {
    /// The string is not valid base58.
    #[error("invalid base58 string: {0}")]
    Base58(#[from] bs58::decode::Error),
    /// The decoded byte string is not exactly 31 bytes.
    #[error("unexpected identifier length {0}, expected 31 bytes")]
    Length(usize),
    /// The checksum trailer does not match the recomputed checksum;
    /// the identifier is corrupt or was tampered with.
    #[error("identifier checksum mismatch")]
    ChecksumMismatch,
}

/// Checksum over the type prefix and genesis of an identifier: the 16-bit
/// wrapping sum of the 29 payload bytes, stored little-endian.
pub fn calculate_checksum(typ: &DidType, genesis: &Genesis) -> [u8; CHECKSUM_LENGTH] {
    let mut sum: u16 = 0;
    for &b in typ.as_bytes() {
        sum = sum.wrapping_add(u16::from(b));
    }
    for &b in genesis {
        sum = sum.wrapping_add(u16::from(b));
    }
    [(sum & 0xff) as u8, (sum >> 8) as u8]
}

/// A 31-byte identity identifier.
///
/// Laid out as a 2-byte [`DidType`], a 27-byte [`Genesis`] and a 2-byte
/// checksum trailer. An `Id` is an immutable value compared byte-wise;
/// every decoding path verifies the trailer before exposing the value, and
/// a mismatch is always an error, never repaired.
///
/// The canonical text form is base58 (Bitcoin alphabet) over the raw bytes,
/// available through `Display` and `FromStr`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id([u8; ID_LENGTH]);

impl Id {
    /// Assembles an identifier from a type and genesis, computing the
    /// checksum trailer. Infallible: validity of both parts was established
    /// when they were built.
    pub fn new(typ: DidType, genesis: Genesis) -> Self {
        let mut bytes = [0u8; ID_LENGTH];
        bytes[..TYPE_LENGTH].copy_from_slice(typ.as_bytes());
        bytes[TYPE_LENGTH..PAYLOAD_LENGTH].copy_from_slice(&genesis);
        bytes[PAYLOAD_LENGTH..].copy_from_slice(&calculate_checksum(&typ, &genesis));
        Id(bytes)
    }

    /// Decodes an identifier from its 31-byte wire form, verifying the
    /// checksum trailer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IdParseError> {
        if bytes.len() != ID_LENGTH {
            return Err(IdParseError::Length(bytes.len()));
        }
        let mut raw = [0u8; ID_LENGTH];
        raw.copy_from_slice(bytes);
        let id = Id(raw);
        if id.checksum() != calculate_checksum(&id.type_tag(), &id.genesis()) {
            return Err(IdParseError::ChecksumMismatch);
        }
        Ok(id)
    }

    pub const fn as_bytes(&self) -> &[u8; ID_LENGTH] {
        &self.0
    }

    /// The 2-byte type prefix.
    pub fn type_tag(&self) -> DidType {
        DidType::from_raw([self.0[0], self.0[1]])
    }

    /// The 27-byte genesis payload.
    pub fn genesis(&self) -> Genesis {
        let mut genesis = [0u8; GENESIS_LENGTH];
        genesis.copy_from_slice(&self.0[TYPE_LENGTH..PAYLOAD_LENGTH]);
        genesis
    }

    /// The 2-byte checksum trailer as stored.
    pub fn checksum(&self) -> [u8; CHECKSUM_LENGTH] {
        [self.0[PAYLOAD_LENGTH], self.0[PAYLOAD_LENGTH + 1]]
    }

    /// The DID method encoded in the type prefix.
    pub fn method(&self) -> Result<DidMethod, RegistryError> {
        self.type_tag().method()
    }

    /// The blockchain encoded in the type prefix.
    pub fn blockchain(&self) -> Result<Blockchain, RegistryError> {
        Ok(self.type_tag().blockchain_network()?.0)
    }

    /// The network encoded in the type prefix.
    pub fn network_id(&self) -> Result<NetworkId, RegistryError> {
        Ok(self.type_tag().blockchain_network()?.1)
    }

    /// The Ethereum address embedded in the genesis, if the genesis was
    /// derived from one.
    pub fn eth_address(&self) -> Result<EthAddress, GenesisError> {
        eth_address_from_genesis(&self.genesis())
    }

    /// Whether this identifier's genesis was derived from the given state.
    pub fn is_genesis_of(&self, state: &BigUint) -> Result<bool, GenesisError> {
        Ok(self.genesis() == genesis_from_state(state)?)
    }

    /// The little-endian integer view of the identifier, as embedded in
    /// claims and on-chain state.
    pub fn to_big_int(&self) -> BigUint {
        BigUint::from_bytes_le(&self.0)
    }

    /// Decodes an identifier from its integer view, verifying the checksum.
    pub fn from_big_int(value: &BigUint) -> Result<Self, IdParseError> {
        let mut le = value.to_bytes_le();
        if le.len() > ID_LENGTH {
            return Err(IdParseError::Length(le.len()));
        }
        le.resize(ID_LENGTH, 0);
        Id::from_bytes(&le)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&bs58::encode(&self.0).into_string())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Id({self})")
    }
}

impl FromStr for Id {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s).into_vec()?;
        Id::from_bytes(&bytes)
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = Id;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a base58 identifier string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(Visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::genesis_from_eth_address;

    fn mumbai_type() -> DidType {
        DidType::new(DidMethod::PolygonId, Blockchain::Polygon, NetworkId::Mumbai).unwrap()
    }

    #[test]
    fn assemble_and_decompose() {
        let mut addr = [0u8; 20];
        addr.copy_from_slice(&hex::decode("a51c1fc2f0d1a1b8494ed1fe312d7c3a78ed91c0").unwrap());
        let genesis = genesis_from_eth_address(addr);
        let id = Id::new(mumbai_type(), genesis);

        assert_eq!(id.to_string(), "2qCU58EJgrEM9NKvHkvg5NFWUiJPgN3M3LnCr98j3x");
        assert_eq!(id.type_tag().as_bytes(), &[0x02, 0x12]);
        assert_eq!(id.genesis(), genesis);
        assert_eq!(id.checksum(), calculate_checksum(&mumbai_type(), &genesis));
        assert_eq!(id.method().unwrap(), DidMethod::PolygonId);
        assert_eq!(id.blockchain().unwrap(), Blockchain::Polygon);
        assert_eq!(id.network_id().unwrap(), NetworkId::Mumbai);
        assert_eq!(id.eth_address().unwrap(), addr);
    }

    #[test]
    fn base58_round_trip() {
        let id = Id::new(mumbai_type(), [7u8; GENESIS_LENGTH]);
        let decoded: Id = id.to_string().parse().unwrap();
        assert_eq!(decoded, id);
    }

    #[test]
    fn every_bit_flip_is_detected() {
        let id = Id::new(mumbai_type(), [7u8; GENESIS_LENGTH]);
        for byte in 0..ID_LENGTH {
            for bit in 0..8 {
                let mut corrupted = *id.as_bytes();
                corrupted[byte] ^= 1 << bit;
                assert_eq!(
                    Id::from_bytes(&corrupted),
                    Err(IdParseError::ChecksumMismatch),
                    "flip of bit {bit} in byte {byte} went undetected"
                );
            }
        }
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert_eq!(
            Id::from_bytes(&[0u8; 30]),
            Err(IdParseError::Length(30))
        );
        // 32 one-bytes decode to more than 31 bytes.
        let long = bs58::encode([1u8; 32]).into_string();
        assert_eq!(long.parse::<Id>(), Err(IdParseError::Length(32)));
    }

    #[test]
    fn invalid_base58_is_rejected() {
        assert!(matches!(
            "l0O".parse::<Id>(),
            Err(IdParseError::Base58(_))
        ));
    }

    #[test]
    fn big_int_round_trip() {
        let id = Id::new(mumbai_type(), [7u8; GENESIS_LENGTH]);
        assert_eq!(Id::from_big_int(&id.to_big_int()).unwrap(), id);
    }

    #[test]
    fn genesis_state_check() {
        let state = BigUint::from(1u8);
        let genesis = genesis_from_state(&state).unwrap();
        let id = Id::new(mumbai_type(), genesis);
        assert!(id.is_genesis_of(&state).unwrap());
        assert!(!id.is_genesis_of(&(BigUint::from(1u8) << 250)).unwrap());
    }

    #[test]
    fn serde_string_form() {
        let id = Id::new(mumbai_type(), [7u8; GENESIS_LENGTH]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
