//! # Notary Events
//!
//! Validated output of the preparator, handed to per-contract parsers.

use crate::domain::entities::{NotaryRequest, ScriptHash};
use crate::domain::opcode::Op;
use std::fmt;
use std::sync::Arc;

/// Operation type derived from the called method name.
///
/// Unrecognised methods map to `Unknown` rather than failing, so that the
/// structural checks stay independent of contract semantics.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NotaryType {
    /// Container contract `put`.
    Put,
    /// Container contract `putNamed`.
    PutNamed,
    /// Container or subnet contract `delete`.
    Delete,
    /// Container contract `setEACL`.
    SetEacl,
    /// Netmap contract `addPeer`.
    AddPeer,
    /// Netmap contract `updateState`.
    UpdatePeerState,
    /// Netmap contract `newEpoch`.
    NewEpoch,
    /// NeoFS ID contract `bind`.
    Bind,
    /// NeoFS ID contract `unbind`.
    Unbind,
    Unknown(String),
}

impl NotaryType {
    pub fn from_method(method: &str) -> Self {
        match method {
            "put" => Self::Put,
            "putNamed" => Self::PutNamed,
            "delete" => Self::Delete,
            "setEACL" => Self::SetEacl,
            "addPeer" => Self::AddPeer,
            "updateState" => Self::UpdatePeerState,
            "newEpoch" => Self::NewEpoch,
            "bind" => Self::Bind,
            "unbind" => Self::Unbind,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Method name this type was derived from.
    pub fn method(&self) -> &str {
        match self {
            Self::Put => "put",
            Self::PutNamed => "putNamed",
            Self::Delete => "delete",
            Self::SetEacl => "setEACL",
            Self::AddPeer => "addPeer",
            Self::UpdatePeerState => "updateState",
            Self::NewEpoch => "newEpoch",
            Self::Bind => "bind",
            Self::Unbind => "unbind",
            Self::Unknown(method) => method,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for NotaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method())
    }
}

/// Contract call reconstructed from a validated notary request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotaryEvent {
    script_hash: ScriptHash,
    notary_type: NotaryType,
    params: Vec<Op>,
    raw: Arc<NotaryRequest>,
}

impl NotaryEvent {
    pub(crate) fn new(
        script_hash: ScriptHash,
        notary_type: NotaryType,
        params: Vec<Op>,
        raw: Arc<NotaryRequest>,
    ) -> Self {
        Self {
            script_hash,
            notary_type,
            params,
            raw,
        }
    }

    /// Hash of the called contract.
    pub fn script_hash(&self) -> ScriptHash {
        self.script_hash
    }

    pub fn notary_type(&self) -> &NotaryType {
        &self.notary_type
    }

    /// Argument instructions in script order, without the `<count> PACK`
    /// trailer. Script order is the reverse of the call's parameter order.
    pub fn params(&self) -> &[Op] {
        &self.params
    }

    /// The request this event was built from.
    pub fn raw(&self) -> &Arc<NotaryRequest> {
        &self.raw
    }
}
