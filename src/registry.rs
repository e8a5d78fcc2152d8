//! The DID method, blockchain and network registry.
//!
//! The leading two bytes of an [`Id`](crate::id::Id) encode which DID method
//! an identity belongs to and which blockchain and network anchor it. The
//! table in this module is the single source of truth for that encoding, in
//! both directions. It is fixed at compile time and read-only at runtime;
//! bytes that have been assigned are part of the protocol's compatibility
//! surface and must never be reassigned, only extended with unused values.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A DID method known to the registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DidMethod {
    /// The `iden3` method.
    Iden3,
    /// The `polygonid` method.
    PolygonId,
    /// The `shib` method.
    Shib,
}

/// A blockchain a DID can be anchored to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Blockchain {
    /// No blockchain; the identity is not anchored to a chain. Spelled as an
    /// absent segment in the DID string.
    NoChain,
    Ethereum,
    Polygon,
    ZkEvm,
    Shibarium,
}

/// A network of a blockchain.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum NetworkId {
    /// No network. Spelled as an absent segment in the DID string.
    NoNetwork,
    Main,
    Mumbai,
    Amoy,
    Goerli,
    Sepolia,
    Test,
    Cardona,
    PuppyNet,
}

/// An error resulting from a registry lookup in either direction.
#[derive(Error, Clone, PartialEq, Eq, Debug)]
pub enum RegistryError {
    /// The method name is not in the registry.
    #[error("unknown DID method {0:?}")]
    UnknownMethod(String),
    /// The blockchain name is not in the registry.
    #[error("unknown blockchain {0:?}")]
    UnknownBlockchain(String),
    /// The network name is not in the registry.
    #[error("unknown network {0:?}")]
    UnknownNetwork(String),
    /// The method byte of a decoded identifier is unassigned.
    #[error("unknown DID method byte {0:#04x}")]
    UnknownMethodByte(u8),
    /// The blockchain/network byte of a decoded identifier is unassigned
    /// under its method.
    #[error("unknown blockchain/network byte {flag:#04x} for method {method}")]
    UnknownNetworkFlag { method: DidMethod, flag: u8 },
    /// The triple is not registered, although each name individually is.
    #[error("blockchain {blockchain:?} and network {network:?} are not registered for method {method}")]
    UnsupportedCombination {
        method: DidMethod,
        blockchain: Blockchain,
        network: NetworkId,
    },
}

/// Registered (method, blockchain, network) triples and the byte that
/// jointly encodes the blockchain and network under that method.
///
/// The upper nibble of the byte identifies the blockchain, the lower nibble
/// the network within it. Decoding is scoped to the method taken from the
/// method byte, so the same flag may be reused across methods.
const NETWORK_TABLE: &[(DidMethod, Blockchain, NetworkId, u8)] = &[
    (DidMethod::Iden3, Blockchain::NoChain, NetworkId::NoNetwork, 0x00),
    (DidMethod::Iden3, Blockchain::Polygon, NetworkId::Main, 0x11),
    (DidMethod::Iden3, Blockchain::Polygon, NetworkId::Mumbai, 0x12),
    (DidMethod::Iden3, Blockchain::Polygon, NetworkId::Amoy, 0x13),
    (DidMethod::Iden3, Blockchain::Ethereum, NetworkId::Main, 0x21),
    (DidMethod::Iden3, Blockchain::Ethereum, NetworkId::Goerli, 0x22),
    (DidMethod::Iden3, Blockchain::Ethereum, NetworkId::Sepolia, 0x23),
    (DidMethod::Iden3, Blockchain::ZkEvm, NetworkId::Main, 0x31),
    (DidMethod::Iden3, Blockchain::ZkEvm, NetworkId::Test, 0x32),
    (DidMethod::Iden3, Blockchain::ZkEvm, NetworkId::Cardona, 0x33),
    (DidMethod::PolygonId, Blockchain::NoChain, NetworkId::NoNetwork, 0x00),
    (DidMethod::PolygonId, Blockchain::Polygon, NetworkId::Main, 0x11),
    (DidMethod::PolygonId, Blockchain::Polygon, NetworkId::Mumbai, 0x12),
    (DidMethod::PolygonId, Blockchain::Polygon, NetworkId::Amoy, 0x13),
    (DidMethod::PolygonId, Blockchain::Ethereum, NetworkId::Main, 0x21),
    (DidMethod::PolygonId, Blockchain::Ethereum, NetworkId::Goerli, 0x22),
    (DidMethod::PolygonId, Blockchain::Ethereum, NetworkId::Sepolia, 0x23),
    (DidMethod::PolygonId, Blockchain::ZkEvm, NetworkId::Main, 0x31),
    (DidMethod::PolygonId, Blockchain::ZkEvm, NetworkId::Test, 0x32),
    (DidMethod::PolygonId, Blockchain::ZkEvm, NetworkId::Cardona, 0x33),
    (DidMethod::Shib, Blockchain::NoChain, NetworkId::NoNetwork, 0x00),
    (DidMethod::Shib, Blockchain::Shibarium, NetworkId::Main, 0x41),
    (DidMethod::Shib, Blockchain::Shibarium, NetworkId::PuppyNet, 0x42),
];

impl DidMethod {
    /// The byte identifying this method in an identifier's type prefix.
    pub const fn byte(self) -> u8 {
        match self {
            DidMethod::Iden3 => 0x01,
            DidMethod::PolygonId => 0x02,
            DidMethod::Shib => 0x03,
        }
    }

    /// Resolves a method byte back to the method.
    ///
    /// The `0xff` sentinel carried by identifiers of unregistered methods is
    /// deliberately not resolvable here.
    pub fn from_byte(byte: u8) -> Result<Self, RegistryError> {
        match byte {
            0x01 => Ok(DidMethod::Iden3),
            0x02 => Ok(DidMethod::PolygonId),
            0x03 => Ok(DidMethod::Shib),
            other => Err(RegistryError::UnknownMethodByte(other)),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DidMethod::Iden3 => "iden3",
            DidMethod::PolygonId => "polygonid",
            DidMethod::Shib => "shib",
        }
    }
}

impl FromStr for DidMethod {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iden3" => Ok(DidMethod::Iden3),
            "polygonid" => Ok(DidMethod::PolygonId),
            "shib" => Ok(DidMethod::Shib),
            other => Err(RegistryError::UnknownMethod(other.to_string())),
        }
    }
}

impl fmt::Display for DidMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Blockchain {
    /// The token used for this blockchain in DID strings. [`NoChain`] has no
    /// token; it renders as an absent segment.
    ///
    /// [`NoChain`]: Blockchain::NoChain
    pub const fn as_str(self) -> &'static str {
        match self {
            Blockchain::NoChain => "",
            Blockchain::Ethereum => "eth",
            Blockchain::Polygon => "polygon",
            Blockchain::ZkEvm => "zkevm",
            Blockchain::Shibarium => "shibarium",
        }
    }
}

impl FromStr for Blockchain {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eth" => Ok(Blockchain::Ethereum),
            "polygon" => Ok(Blockchain::Polygon),
            "zkevm" => Ok(Blockchain::ZkEvm),
            "shibarium" => Ok(Blockchain::Shibarium),
            other => Err(RegistryError::UnknownBlockchain(other.to_string())),
        }
    }
}

impl fmt::Display for Blockchain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NetworkId {
    /// The token used for this network in DID strings. [`NoNetwork`] has no
    /// token; it renders as an absent segment.
    ///
    /// [`NoNetwork`]: NetworkId::NoNetwork
    pub const fn as_str(self) -> &'static str {
        match self {
            NetworkId::NoNetwork => "",
            NetworkId::Main => "main",
            NetworkId::Mumbai => "mumbai",
            NetworkId::Amoy => "amoy",
            NetworkId::Goerli => "goerli",
            NetworkId::Sepolia => "sepolia",
            NetworkId::Test => "test",
            NetworkId::Cardona => "cardona",
            NetworkId::PuppyNet => "puppynet",
        }
    }
}

impl FromStr for NetworkId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(NetworkId::Main),
            "mumbai" => Ok(NetworkId::Mumbai),
            "amoy" => Ok(NetworkId::Amoy),
            "goerli" => Ok(NetworkId::Goerli),
            "sepolia" => Ok(NetworkId::Sepolia),
            "test" => Ok(NetworkId::Test),
            "cardona" => Ok(NetworkId::Cardona),
            "puppynet" => Ok(NetworkId::PuppyNet),
            other => Err(RegistryError::UnknownNetwork(other.to_string())),
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The 2-byte type prefix of an identifier: `[method byte, network flag]`.
///
/// Values obtained from [`DidType::new`] are always registered. Identifiers
/// decoded from the wire may carry unassigned bytes; resolving the fields of
/// such a type fails rather than guessing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DidType([u8; 2]);

impl DidType {
    /// Sentinel type carried by identifiers synthesized from DIDs of
    /// unregistered methods. Kept out of the registry table so that normal
    /// encode and decode paths can never produce or consume it.
    pub(crate) const UNSUPPORTED: DidType = DidType([0xff, 0xff]);

    /// Looks up the type encoding a registered (method, blockchain, network)
    /// triple.
    pub fn new(
        method: DidMethod,
        blockchain: Blockchain,
        network: NetworkId,
    ) -> Result<Self, RegistryError> {
        for &(m, b, n, flag) in NETWORK_TABLE {
            if m == method && b == blockchain && n == network {
                return Ok(DidType([method.byte(), flag]));
            }
        }
        Err(RegistryError::UnsupportedCombination {
            method,
            blockchain,
            network,
        })
    }

    pub(crate) const fn from_raw(bytes: [u8; 2]) -> Self {
        DidType(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }

    pub fn method(&self) -> Result<DidMethod, RegistryError> {
        DidMethod::from_byte(self.0[0])
    }

    /// Resolves the blockchain and network encoded by the flag byte, scoped
    /// to this type's method.
    pub fn blockchain_network(&self) -> Result<(Blockchain, NetworkId), RegistryError> {
        let method = self.method()?;
        for &(m, b, n, flag) in NETWORK_TABLE {
            if m == method && flag == self.0[1] {
                return Ok((b, n));
            }
        }
        Err(RegistryError::UnknownNetworkFlag {
            method,
            flag: self.0[1],
        })
    }
}
