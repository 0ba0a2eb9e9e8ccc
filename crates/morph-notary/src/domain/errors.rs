//! # Notary Errors
//!
//! Error types for notary request preparation.
//!
//! `NotaryError::TxAlreadyHandled` and `NotaryError::MainTxExpired` are skip
//! signals: every accepted request comes back once more already co-signed,
//! and stale requests keep circulating until their fallback becomes valid.
//! Callers drop them silently; everything else is a rejection.

use crate::domain::opcode::OpCode;
use crate::ports::outbound::AccessorError;
use thiserror::Error;

/// Coarse classification of a preparation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Request shape does not follow the committee-assisted pattern.
    Structural,
    /// Normal lifecycle outcome, not a failure.
    Skip,
    /// Bytecode grammar violation, potentially a forgery attempt.
    Grammar,
    /// Committee key or chain height lookup failed.
    Accessor,
}

/// Errors returned by the notary preparator.
#[derive(Debug, Error)]
pub enum NotaryError {
    #[error("received main tx has unexpected amount of witnesses: {0}")]
    UnexpectedWitnessAmount(usize),

    /// Committee slot already carries a real signature.
    #[error("received main tx has already been handled")]
    TxAlreadyHandled,

    #[error("could not fetch Alphabet public keys: {0}")]
    AlphabetKeys(#[source] AccessorError),

    #[error("could not get Alphabet verification script: {0}")]
    AlphabetVerification(#[from] MultisigError),

    #[error("received main tx has unexpected amount of cosigners: expected {expected}, got {actual}")]
    UnexpectedCosignersAmount { expected: usize, actual: usize },

    #[error("received main tx has incorrect Alphabet signer")]
    IncorrectAlphabetSigner,

    #[error("received main tx has incorrect attributes amount: {0}")]
    IncorrectAttributesAmount(usize),

    #[error("received main tx has incorrect attribute")]
    IncorrectAttribute,

    #[error("received main tx has non-empty Proxy witnesses")]
    IncorrectProxyWitnesses,

    #[error("received main tx has incorrect Alphabet verification")]
    IncorrectAlphabet,

    #[error("received main tx has empty Invoker witness")]
    IncorrectInvokerWitnesses,

    #[error("received main tx has incorrect Notary contract placeholder")]
    IncorrectNotaryPlaceholder,

    #[error("received fallback tx has incorrect attributes amount: {0}")]
    IncorrectFbAttributesAmount(usize),

    #[error("received fallback tx has incorrect attributes")]
    IncorrectFbAttributes,

    #[error("could not fetch current chain height: {0}")]
    BlockCount(#[source] AccessorError),

    /// Fallback transaction is already valid.
    #[error("received main tx has expired: chain height {current}, fallback valid from {not_valid_before}")]
    MainTxExpired { current: u32, not_valid_before: u32 },

    #[error("could not get next opcode in script: {0}")]
    Disassembly(#[from] DecodeError),

    #[error("received main tx is not a contract call")]
    NotContractCall,

    #[error("could not decode contract hash: expected 20 bytes, got {0}")]
    ContractHash(usize),

    #[error("received main tx has non UTF-8 method name")]
    IncorrectMethod,

    #[error("received main tx has unexpected call flag: {0}")]
    IncorrectCallFlag(OpCode),

    #[error("could not validate arguments: {0}")]
    Arguments(#[from] ArgumentError),
}

impl NotaryError {
    /// Returns true for outcomes the caller must drop silently.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::TxAlreadyHandled | Self::MainTxExpired { .. })
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::TxAlreadyHandled | Self::MainTxExpired { .. } => ErrorClass::Skip,
            Self::AlphabetKeys(_) | Self::BlockCount(_) => ErrorClass::Accessor,
            Self::Disassembly(_)
            | Self::NotContractCall
            | Self::ContractHash(_)
            | Self::IncorrectMethod
            | Self::IncorrectCallFlag(_)
            | Self::Arguments(_) => ErrorClass::Grammar,
            _ => ErrorClass::Structural,
        }
    }
}

/// Script decoding failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown opcode 0x{byte:02X} at offset {offset}")]
    UnknownOpcode { offset: usize, byte: u8 },

    #[error("truncated length prefix of {opcode} at offset {offset}")]
    TruncatedPrefix { offset: usize, opcode: OpCode },

    #[error("truncated operand of {opcode} at offset {offset}: need {expected} bytes, {available} left")]
    TruncatedOperand {
        offset: usize,
        opcode: OpCode,
        expected: usize,
        available: usize,
    },

    #[error("operand length at offset {offset} does not fit into memory")]
    OperandTooLarge { offset: usize },
}

/// Argument encoding and operand value failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("unexpected packing opcode: {0}")]
    UnexpectedPackingOpcode(OpCode),

    #[error("received main tx has incorrect argument packing")]
    IncorrectArgPacking,

    #[error("received main tx has unexpected CONVERT opcode")]
    UnexpectedConvert,

    #[error("received main tx has unexpected (not PUSH) NeoVM opcode: {0}")]
    UnexpectedOpcode(OpCode),

    #[error("could not parse argument len at position {position}: {source}")]
    ArgumentLength {
        position: usize,
        #[source]
        source: Box<ArgumentError>,
    },

    #[error("negative argument len {0}")]
    NegativeLength(i64),

    #[error("unexpected INT opcode {0}")]
    UnexpectedIntOpcode(OpCode),

    #[error("integer operand of {0} bytes does not fit into 64 bits")]
    IntegerOverflow(usize),

    #[error("unexpected BYTES opcode {0}")]
    UnexpectedBytesOpcode(OpCode),

    #[error("unexpected BOOL opcode {0}")]
    UnexpectedBoolOpcode(OpCode),

    #[error("operand is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(#[from] KeyError),
}

/// Multisignature script construction failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MultisigError {
    #[error("empty public key set")]
    EmptyKeySet,

    #[error("too many public keys: {count} > {max}")]
    TooManyKeys { count: usize, max: usize },

    #[error("invalid threshold {m} for {n} keys")]
    InvalidThreshold { m: usize, n: usize },
}

/// Public key encoding failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("expected 33 bytes, got {0}")]
    Length(usize),

    #[error("unexpected prefix 0x{0:02x}")]
    Prefix(u8),

    #[error("invalid hex: {0}")]
    Hex(String),
}

/// Preparator construction failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("alphabet keys source must be set")]
    MissingAlphabetKeys,

    #[error("block counter must be set")]
    MissingBlockCounter,

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_signals() {
        assert!(NotaryError::TxAlreadyHandled.is_skip());
        assert!(NotaryError::MainTxExpired {
            current: 10,
            not_valid_before: 10
        }
        .is_skip());
        assert!(!NotaryError::NotContractCall.is_skip());
        assert!(!NotaryError::Arguments(ArgumentError::UnexpectedConvert).is_skip());
    }

    #[test]
    fn test_classes() {
        assert_eq!(NotaryError::TxAlreadyHandled.class(), ErrorClass::Skip);
        assert_eq!(
            NotaryError::IncorrectAlphabetSigner.class(),
            ErrorClass::Structural
        );
        assert_eq!(
            NotaryError::Arguments(ArgumentError::IncorrectArgPacking).class(),
            ErrorClass::Grammar
        );
        assert_eq!(
            NotaryError::BlockCount(AccessorError::Unavailable("rpc down".into())).class(),
            ErrorClass::Accessor
        );
    }

    /// Test: wrapped errors keep the inner message
    #[test]
    fn test_messages_carry_context() {
        let err = NotaryError::Arguments(ArgumentError::UnexpectedOpcode(OpCode::Drop));
        assert_eq!(
            err.to_string(),
            "could not validate arguments: received main tx has unexpected (not PUSH) NeoVM opcode: DROP"
        );

        let err = NotaryError::AlphabetKeys(AccessorError::Unavailable("timeout".into()));
        assert!(err.to_string().contains("timeout"));
    }
}
