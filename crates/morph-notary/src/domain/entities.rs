//! # Domain Entities
//!
//! Transaction-level data carried by a notary request.
//!
//! Everything here arrives already decoded from the wire and is treated as
//! untrusted until the preparator has validated it.

use crate::domain::errors::KeyError;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Identifiers
// =============================================================================

/// 160-bit script hash (account or contract identifier).
///
/// Stored in little-endian byte order, the order `Hash160` produces.
#[serde_as]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScriptHash(#[serde_as(as = "Hex")] pub [u8; 20]);

impl ScriptHash {
    pub const LEN: usize = 20;

    /// Decode from a big-endian slice, the order contract hashes are pushed in.
    pub fn from_be_slice(bytes: &[u8]) -> Option<Self> {
        let mut le: [u8; 20] = bytes.try_into().ok()?;
        le.reverse();
        Some(Self(le))
    }

    /// Big-endian bytes, as pushed by `System.Contract.Call` scripts.
    pub fn to_be_bytes(&self) -> [u8; 20] {
        let mut be = self.0;
        be.reverse();
        be
    }

    pub fn as_le_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_be_bytes()))
    }
}

/// Compressed secp256r1 public key (33 bytes, prefix `0x02`/`0x03`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "KeyRepr", into = "KeyRepr")]
pub struct PublicKey([u8; 33]);

#[serde_as]
#[derive(Serialize, Deserialize)]
struct KeyRepr(#[serde_as(as = "Hex")] [u8; 33]);

impl TryFrom<KeyRepr> for PublicKey {
    type Error = KeyError;

    fn try_from(repr: KeyRepr) -> Result<Self, Self::Error> {
        Self::from_bytes(&repr.0)
    }
}

impl From<PublicKey> for KeyRepr {
    fn from(key: PublicKey) -> Self {
        KeyRepr(key.0)
    }
}

impl PublicKey {
    pub const LEN: usize = 33;

    /// Parse a compressed key encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let raw: [u8; 33] = bytes.try_into().map_err(|_| KeyError::Length(bytes.len()))?;
        match raw[0] {
            0x02 | 0x03 => Ok(Self(raw)),
            prefix => Err(KeyError::Prefix(prefix)),
        }
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Big-endian X coordinate.
    pub fn x(&self) -> &[u8] {
        &self.0[1..]
    }
}

/// Keys order by X coordinate first; equal X falls back to the parity prefix.
impl Ord for PublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x()
            .cmp(other.x())
            .then_with(|| self.0[0].cmp(&other.0[0]))
    }
}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| KeyError::Hex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

// =============================================================================
// Transaction parts
// =============================================================================

/// Transaction witness: invocation script (signatures) and verification
/// script (defines the account).
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    #[serde_as(as = "Hex")]
    pub invocation_script: Vec<u8>,
    #[serde_as(as = "Hex")]
    pub verification_script: Vec<u8>,
}

impl Witness {
    pub fn new(invocation_script: Vec<u8>, verification_script: Vec<u8>) -> Self {
        Self {
            invocation_script,
            verification_script,
        }
    }

    /// Both scripts are empty.
    pub fn is_empty(&self) -> bool {
        self.invocation_script.is_empty() && self.verification_script.is_empty()
    }

    /// Account hash defined by the verification script.
    pub fn script_hash(&self) -> ScriptHash {
        crate::domain::multisig::hash160(&self.verification_script)
    }
}

/// Witness scope bitmask of a signer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WitnessScope(pub u8);

impl WitnessScope {
    pub const NONE: Self = Self(0x00);
    pub const CALLED_BY_ENTRY: Self = Self(0x01);
    pub const CUSTOM_CONTRACTS: Self = Self(0x10);
    pub const CUSTOM_GROUPS: Self = Self(0x20);
    pub const RULES: Self = Self(0x40);
    pub const GLOBAL: Self = Self(0x80);

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Transaction signer. Signer order must match witness order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    pub account: ScriptHash,
    pub scopes: WitnessScope,
}

impl Signer {
    pub fn new(account: ScriptHash, scopes: WitnessScope) -> Self {
        Self { account, scopes }
    }
}

/// Wire type tag of a transaction attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AttributeType {
    HighPriority = 0x01,
    OracleResponse = 0x11,
    NotValidBefore = 0x20,
    Conflicts = 0x21,
    NotaryAssisted = 0x22,
}

/// Typed transaction attribute.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Attribute {
    HighPriority,
    OracleResponse {
        id: u64,
        code: u8,
        #[serde_as(as = "Hex")]
        result: Vec<u8>,
    },
    /// Transaction is invalid before this height.
    NotValidBefore { height: u32 },
    Conflicts {
        #[serde_as(as = "Hex")]
        hash: [u8; 32],
    },
    /// Number of keys the Notary service collects signatures from.
    NotaryAssisted { n_keys: u8 },
}

impl Attribute {
    pub fn kind(&self) -> AttributeType {
        match self {
            Self::HighPriority => AttributeType::HighPriority,
            Self::OracleResponse { .. } => AttributeType::OracleResponse,
            Self::NotValidBefore { .. } => AttributeType::NotValidBefore,
            Self::Conflicts { .. } => AttributeType::Conflicts,
            Self::NotaryAssisted { .. } => AttributeType::NotaryAssisted,
        }
    }
}

/// Transaction as seen by the preparator.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub nonce: u32,
    pub valid_until_block: u32,
    #[serde_as(as = "Hex")]
    pub script: Vec<u8>,
    pub signers: Vec<Signer>,
    pub attributes: Vec<Attribute>,
    /// Witnesses, one per signer.
    pub scripts: Vec<Witness>,
}

impl Transaction {
    /// Attributes of the given kind, in declaration order.
    pub fn attributes_of(&self, kind: AttributeType) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(move |a| a.kind() == kind)
    }
}

/// Raw P2P notary request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotaryRequest {
    pub main_transaction: Transaction,
    pub fallback_transaction: Transaction,
}
