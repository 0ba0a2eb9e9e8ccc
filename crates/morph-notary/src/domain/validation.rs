//! # Structural Validation
//!
//! Checks over the shape of a committee-assisted notary request:
//!
//! ```text
//! witness[0]      proxy contract       empty
//! witness[1]      Alphabet multisig    unsigned, committee verification script
//! witness[2]      invoker (optional)   non-empty
//! witness[last]   Notary placeholder   unsigned, empty verification script
//! ```
//!
//! Every check returns on first failure. None of them touch the chain.

use crate::domain::entities::{Attribute, AttributeType, ScriptHash, Signer, Transaction, Witness};
use crate::domain::errors::NotaryError;
use crate::domain::opcode::OpCode;

/// Invocation script of an unsigned slot as produced by older client APIs:
/// `PUSHDATA1 64` followed by 64 zero bytes.
pub const DUMMY_INVOCATION_SCRIPT: [u8; 66] = {
    let mut script = [0u8; 66];
    script[0] = OpCode::PushData1 as u8;
    script[1] = 64;
    script
};

/// Witness count without an invoker.
pub const WITNESSES_WITHOUT_INVOKER: usize = 3;

/// Witness count with an invoker.
pub const WITNESSES_WITH_INVOKER: usize = 4;

/// Attribute count of a fallback transaction: `NotValidBefore`,
/// `Conflicts` and `NotaryAssisted`.
pub const FALLBACK_ATTRIBUTES: usize = 3;

const ALPHABET_SLOT: usize = 1;

/// True if `invocation` leaves the slot unsigned.
pub fn is_unsigned_invocation(invocation: &[u8], accept_legacy_dummy: bool) -> bool {
    invocation.is_empty() || (accept_legacy_dummy && invocation == DUMMY_INVOCATION_SCRIPT)
}

/// Returns whether an invoker witness is present.
pub fn witness_layout(witnesses: &[Witness]) -> Result<bool, NotaryError> {
    match witnesses.len() {
        WITNESSES_WITHOUT_INVOKER => Ok(false),
        WITNESSES_WITH_INVOKER => Ok(true),
        other => Err(NotaryError::UnexpectedWitnessAmount(other)),
    }
}

/// Fails with `TxAlreadyHandled` if the Alphabet slot is signed.
///
/// Looks at the invocation script only, so it holds regardless of the rest
/// of the request.
pub fn ensure_not_handled(witnesses: &[Witness], accept_legacy_dummy: bool) -> Result<(), NotaryError> {
    match witnesses.get(ALPHABET_SLOT) {
        Some(w) if !is_unsigned_invocation(&w.invocation_script, accept_legacy_dummy) => {
            Err(NotaryError::TxAlreadyHandled)
        }
        _ => Ok(()),
    }
}

pub fn validate_cosigners(
    witness_count: usize,
    signers: &[Signer],
    alphabet_account: &ScriptHash,
) -> Result<(), NotaryError> {
    if signers.len() != witness_count {
        return Err(NotaryError::UnexpectedCosignersAmount {
            expected: witness_count,
            actual: signers.len(),
        });
    }

    match signers.get(ALPHABET_SLOT) {
        Some(signer) if signer.account == *alphabet_account => Ok(()),
        _ => Err(NotaryError::IncorrectAlphabetSigner),
    }
}

/// Main transaction carries a single `NotaryAssisted` attribute naming the
/// committee, plus one for the invoker when present.
pub fn validate_attributes(
    attributes: &[Attribute],
    alphabet_size: usize,
    has_invoker: bool,
) -> Result<(), NotaryError> {
    let [attribute] = attributes else {
        return Err(NotaryError::IncorrectAttributesAmount(attributes.len()));
    };

    let expected = alphabet_size + usize::from(has_invoker);
    match attribute {
        Attribute::NotaryAssisted { n_keys } if usize::from(*n_keys) == expected => Ok(()),
        _ => Err(NotaryError::IncorrectAttribute),
    }
}

pub fn validate_witnesses(
    witnesses: &[Witness],
    alphabet_script: &[u8],
    has_invoker: bool,
    accept_legacy_dummy: bool,
) -> Result<(), NotaryError> {
    let (proxy, alphabet, placeholder) = match witnesses {
        [proxy, alphabet, placeholder] => (proxy, alphabet, placeholder),
        [proxy, alphabet, _, placeholder] => (proxy, alphabet, placeholder),
        other => return Err(NotaryError::UnexpectedWitnessAmount(other.len())),
    };

    if !proxy.is_empty() {
        return Err(NotaryError::IncorrectProxyWitnesses);
    }

    if alphabet.verification_script != alphabet_script {
        return Err(NotaryError::IncorrectAlphabet);
    }

    if has_invoker && witnesses[2].is_empty() {
        return Err(NotaryError::IncorrectInvokerWitnesses);
    }

    if !placeholder.verification_script.is_empty()
        || !is_unsigned_invocation(&placeholder.invocation_script, accept_legacy_dummy)
    {
        return Err(NotaryError::IncorrectNotaryPlaceholder);
    }

    Ok(())
}

/// Height from which the fallback transaction becomes valid.
pub fn fallback_not_valid_before(fallback: &Transaction) -> Result<u32, NotaryError> {
    if fallback.attributes.len() != FALLBACK_ATTRIBUTES {
        return Err(NotaryError::IncorrectFbAttributesAmount(
            fallback.attributes.len(),
        ));
    }

    let mut found = fallback.attributes_of(AttributeType::NotValidBefore);
    match (found.next(), found.next()) {
        (Some(Attribute::NotValidBefore { height }), None) => Ok(*height),
        _ => Err(NotaryError::IncorrectFbAttributes),
    }
}

/// Fails with `MainTxExpired` once the fallback is valid at `current`.
pub fn check_expiration(current: u32, not_valid_before: u32) -> Result<(), NotaryError> {
    if current >= not_valid_before {
        return Err(NotaryError::MainTxExpired {
            current,
            not_valid_before,
        });
    }
    Ok(())
}
