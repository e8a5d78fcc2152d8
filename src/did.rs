//! The DID value type and its string grammar.
//!
//! A DID renders as `did:<method>[:<blockchain>[:<network>]]:<base58 id>`.
//! The blockchain and network segments are spelled out only when they are
//! not the method's chainless defaults, and the network never appears
//! without the blockchain.
//!
//! The method, blockchain and network are encoded twice: as text segments
//! and inside the identifier's type prefix. Parsing checks the two
//! representations against each other, so tampering with either one alone
//! is detected.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::de;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::genesis::{genesis_from_state, Genesis, GenesisError, GENESIS_LENGTH};
use crate::id::{Id, IdParseError};
use crate::registry::{Blockchain, DidMethod, DidType, NetworkId, RegistryError};

/// The URI scheme shared by every DID.
pub const DID_SCHEME: &str = "did";

// did : method [: blockchain [: network]] : id
const MIN_SEGMENTS: usize = 3;
const MAX_SEGMENTS: usize = 5;

/// An error resulting from parsing or constructing a [`Did`].
#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum DidError {
    /// The leading literal is not `did`.
    #[error("invalid DID scheme {0:?}, expected \"did\"")]
    Scheme(String),
    /// Fewer than 3 colon-separated segments.
    #[error("not enough segments in DID, expected at least 3")]
    TooFewSegments,
    /// More than 5 colon-separated segments.
    #[error("too many segments in DID, expected at most 5")]
    TooManySegments,
    /// A name or a decoded type byte is missing from the registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The identifier segment failed to decode.
    #[error(transparent)]
    Id(#[from] IdParseError),
    /// Genesis derivation failed.
    #[error(transparent)]
    Genesis(#[from] GenesisError),
    /// The method spelled in the string contradicts the identifier's type.
    #[error("did method of core identity {found} differs from given did method {given}")]
    MethodMismatch { found: DidMethod, given: DidMethod },
    /// The network spelled in the string contradicts the identifier's type.
    #[error("network method of core identity {found} differs from given did network specific id {given}")]
    NetworkMismatch { found: NetworkId, given: NetworkId },
    /// The blockchain spelled in the string contradicts the identifier's
    /// type.
    #[error("blockchain of core identity {found} differs from given did blockchain {given}")]
    BlockchainMismatch { found: Blockchain, given: Blockchain },
}

/// A DID of a registered method.
///
/// Immutable aggregate of the method, blockchain and network names and the
/// 31-byte identifier. The fields are private so they can never drift from
/// the identifier's type prefix; every constructor resolves them through
/// the registry.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Did {
    method: DidMethod,
    blockchain: Blockchain,
    network_id: NetworkId,
    id: Id,
}

impl Did {
    /// Builds the genesis DID of an identity from its type and genesis
    /// state.
    pub fn from_genesis_state(typ: DidType, state: &BigUint) -> Result<Self, DidError> {
        let genesis = genesis_from_state(state)?;
        Ok(Self::from_type_and_genesis(typ, genesis)?)
    }

    /// Builds a DID from its type and an already-derived genesis.
    pub fn from_type_and_genesis(typ: DidType, genesis: Genesis) -> Result<Self, RegistryError> {
        Self::from_id(Id::new(typ, genesis))
    }

    /// Recovers the DID of an identifier by resolving its type prefix.
    ///
    /// Fails for unassigned type bytes, including the sentinel type of
    /// identifiers synthesized from foreign DIDs.
    pub fn from_id(id: Id) -> Result<Self, RegistryError> {
        let typ = id.type_tag();
        let method = typ.method()?;
        let (blockchain, network_id) = typ.blockchain_network()?;
        Ok(Did {
            method,
            blockchain,
            network_id,
            id,
        })
    }

    pub fn method(&self) -> DidMethod {
        self.method
    }

    pub fn blockchain(&self) -> Blockchain {
        self.blockchain
    }

    pub fn network_id(&self) -> NetworkId {
        self.network_id
    }

    pub fn id(&self) -> Id {
        self.id
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{DID_SCHEME}:{}", self.method)?;
        if self.blockchain != Blockchain::NoChain {
            write!(f, ":{}", self.blockchain)?;
        }
        if self.network_id != NetworkId::NoNetwork {
            write!(f, ":{}", self.network_id)?;
        }
        write!(f, ":{}", self.id)
    }
}

impl FromStr for Did {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split(':').collect();
        if segments.len() < MIN_SEGMENTS {
            return Err(DidError::TooFewSegments);
        }
        if segments[0] != DID_SCHEME {
            return Err(DidError::Scheme(segments[0].to_string()));
        }
        let method: DidMethod = segments[1].parse()?;
        if segments.len() > MAX_SEGMENTS {
            return Err(DidError::TooManySegments);
        }

        let given = &segments[2..segments.len() - 1];
        let blockchain = match given.first() {
            Some(token) => token.parse()?,
            None => Blockchain::NoChain,
        };
        let network_id = match given.get(1) {
            Some(token) => token.parse()?,
            None => NetworkId::NoNetwork,
        };

        let id: Id = segments[segments.len() - 1].parse()?;
        let did = Did::from_id(id)?;

        if did.method != method {
            return Err(DidError::MethodMismatch {
                found: did.method,
                given: method,
            });
        }
        if did.network_id != network_id {
            return Err(DidError::NetworkMismatch {
                found: did.network_id,
                given: network_id,
            });
        }
        if did.blockchain != blockchain {
            return Err(DidError::BlockchainMismatch {
                found: did.blockchain,
                given: blockchain,
            });
        }
        Ok(did)
    }
}

impl Serialize for Did {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = Did;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a DID string")
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

impl Id {
    /// Resolves a DID string to its identifier.
    ///
    /// DIDs whose method name is outside the registry are not rejected:
    /// they resolve to an opaque identifier carrying the `0xff` method
    /// sentinel and a genesis hashed from the full DID string, so foreign
    /// DIDs can be stored and deduplicated uniformly. Such an identifier
    /// cannot be mapped back to the original string. The fallback never
    /// applies to a registered method, nor to failures below the text
    /// level such as a bad checksum.
    pub fn from_did(s: &str) -> Result<Self, DidError> {
        match s.parse::<Did>() {
            Ok(did) => Ok(did.id()),
            Err(DidError::Registry(RegistryError::UnknownMethod(_))) => {
                Ok(Self::from_unsupported_did(s))
            }
            Err(e) => Err(e),
        }
    }

    fn from_unsupported_did(s: &str) -> Self {
        let digest = Sha256::digest(s.as_bytes());
        let mut genesis = [0u8; GENESIS_LENGTH];
        genesis.copy_from_slice(&digest[digest.len() - GENESIS_LENGTH..]);
        Id::new(DidType::UNSUPPORTED, genesis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_omits_default_segments() {
        let typ = DidType::new(DidMethod::Iden3, Blockchain::NoChain, NetworkId::NoNetwork)
            .unwrap();
        let did = Did::from_genesis_state(typ, &BigUint::from(1u8)).unwrap();
        assert_eq!(
            did.to_string(),
            "did:iden3:tJ93RwaVfE1PEMxd5rpZZuPtLCwbEaDCrNBhAy8HM"
        );
    }

    #[test]
    fn parse_checks_scheme_and_segment_count() {
        assert_eq!("did:iden3".parse::<Did>(), Err(DidError::TooFewSegments));
        assert_eq!(
            "url:iden3:x".parse::<Did>(),
            Err(DidError::Scheme("url".to_string()))
        );
        assert_eq!(
            "did:iden3:a:b:c:d".parse::<Did>(),
            Err(DidError::TooManySegments)
        );
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!(
            "did:web:example".parse::<Did>(),
            Err(DidError::Registry(RegistryError::UnknownMethod(
                "web".to_string()
            )))
        );
        assert_eq!(
            "did:iden3:ropsten:main:tJ93RwaVfE1PEMxd5rpZZuPtLCwbEaDCrNBhAy8HM".parse::<Did>(),
            Err(DidError::Registry(RegistryError::UnknownBlockchain(
                "ropsten".to_string()
            )))
        );
    }

    #[test]
    fn parse_verifies_checksum() {
        // Last character changed in a valid DID.
        let err = "did:iden3:tJ93RwaVfE1PEMxd5rpZZuPtLCwbEaDCrNBhAy8HN"
            .parse::<Did>()
            .unwrap_err();
        assert_eq!(err, DidError::Id(IdParseError::ChecksumMismatch));
    }

    #[test]
    fn text_segments_must_match_binary_type() {
        // The identifier below encodes polygon/mumbai.
        let err = "did:iden3:eth:goerli:wyFiV4w71QgWPn6bYLsZoysFay66gKtVa9kfu6yMZ"
            .parse::<Did>()
            .unwrap_err();
        assert_eq!(
            err,
            DidError::NetworkMismatch {
                found: NetworkId::Mumbai,
                given: NetworkId::Goerli,
            }
        );
        assert_eq!(
            err.to_string(),
            "network method of core identity mumbai differs from given did network specific id goerli"
        );

        let err = "did:iden3:eth:mumbai:wyFiV4w71QgWPn6bYLsZoysFay66gKtVa9kfu6yMZ"
            .parse::<Did>()
            .unwrap_err();
        assert_eq!(
            err,
            DidError::BlockchainMismatch {
                found: Blockchain::Polygon,
                given: Blockchain::Ethereum,
            }
        );

        let err = "did:polygonid:polygon:mumbai:wyFiV4w71QgWPn6bYLsZoysFay66gKtVa9kfu6yMZ"
            .parse::<Did>()
            .unwrap_err();
        assert_eq!(
            err,
            DidError::MethodMismatch {
                found: DidMethod::Iden3,
                given: DidMethod::PolygonId,
            }
        );
    }

    #[test]
    fn omitted_segments_mean_the_chainless_defaults() {
        // polygon/mumbai identifier with no text segments to back it up.
        let err = "did:iden3:wyFiV4w71QgWPn6bYLsZoysFay66gKtVa9kfu6yMZ"
            .parse::<Did>()
            .unwrap_err();
        assert_eq!(
            err,
            DidError::NetworkMismatch {
                found: NetworkId::Mumbai,
                given: NetworkId::NoNetwork,
            }
        );
    }

    #[test]
    fn unsupported_method_falls_back_to_opaque_id() {
        let id = Id::from_did("did:something:x").unwrap();
        assert_eq!(&id.as_bytes()[..2], &[0xff, 0xff]);
        assert_eq!(
            hex::encode(id.as_bytes()),
            "ffff84b1e6d0d9ecbe951348ea578dbacc022cdbbff4b11218671dca871c11"
        );
        // The strict parser still rejects the method.
        assert!(matches!(
            "did:something:x".parse::<Did>(),
            Err(DidError::Registry(RegistryError::UnknownMethod(_)))
        ));
        // The sentinel type cannot be resolved back to a DID.
        assert!(Did::from_id(id).is_err());
    }

    #[test]
    fn fallback_does_not_mask_binary_errors() {
        // Registered method with a corrupt identifier segment.
        assert_eq!(
            Id::from_did("did:iden3:tJ93RwaVfE1PEMxd5rpZZuPtLCwbEaDCrNBhAy8HN"),
            Err(DidError::Id(IdParseError::ChecksumMismatch))
        );
    }
}
