//! Subnet contract events.

use crate::domain::args::bytes_from_op;
use crate::domain::entities::{NotaryRequest, Transaction};
use crate::domain::event::NotaryEvent;
use crate::events::{expect_params, ParseError};
use std::sync::Arc;

const DELETE_PARAMS: usize = 1;

/// Removal of a subnet requested through the Notary service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubnetDelete {
    notary_request: Arc<NotaryRequest>,
    id: Vec<u8>,
}

impl SubnetDelete {
    /// Subnet identifier in the binary format of the storage API.
    pub fn id(&self) -> &[u8] {
        &self.id
    }

    /// Main transaction of the notary request.
    pub fn notary_main_tx(&self) -> &Transaction {
        &self.notary_request.main_transaction
    }
}

/// Parse `delete(id)` of the Subnet contract.
pub fn parse_notary_delete(event: &NotaryEvent) -> Result<SubnetDelete, ParseError> {
    let params = event.params();
    expect_params(DELETE_PARAMS, params.len())?;

    let id = bytes_from_op(&params[0]).map_err(|source| ParseError::Param { name: "id", source })?;

    Ok(SubnetDelete {
        notary_request: Arc::clone(event.raw()),
        id: id.to_vec(),
    })
}
