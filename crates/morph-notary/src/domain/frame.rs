//! # Contract Call Frame
//!
//! The trailing instructions of a `System.Contract.Call` script:
//!
//! ```text
//! <args...> <count> PACK   (optional)
//! PUSH<flags>
//! PUSHDATA <method>
//! PUSHDATA <contract hash, big-endian>
//! SYSCALL System.Contract.Call
//! ```

use crate::domain::entities::ScriptHash;
use crate::domain::errors::NotaryError;
use crate::domain::opcode::{Op, OpCode};
use std::fmt;

/// Call flag bitmask restricting what an invoked contract may do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallFlags(u8);

impl CallFlags {
    pub const NONE: Self = Self(0x00);
    pub const READ_STATES: Self = Self(0x01);
    pub const WRITE_STATES: Self = Self(0x02);
    pub const ALLOW_CALL: Self = Self(0x04);
    pub const ALLOW_NOTIFY: Self = Self(0x08);
    pub const STATES: Self = Self(0x03);
    pub const READ_ONLY: Self = Self(0x05);
    pub const ALL: Self = Self(0x0F);

    /// Flags from raw bits, if no undefined bit is set.
    pub fn from_bits(bits: u8) -> Option<Self> {
        if bits <= Self::ALL.0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl fmt::Display for CallFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

/// Decoded view over the tail of a contract call script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame<'a> {
    pub contract: ScriptHash,
    pub method: &'a str,
    pub flags: CallFlags,
    /// Everything before the call flag push, including the pack trailer.
    pub args: &'a [Op],
}

impl<'a> CallFrame<'a> {
    /// Split `ops` into the call trailer and its argument instructions.
    ///
    /// `contract_call_id` is the `SYSCALL` operand of `System.Contract.Call`.
    pub fn parse(ops: &'a [Op], contract_call_id: &[u8; 4]) -> Result<Self, NotaryError> {
        let [args @ .., flag_op, method_op, hash_op, call_op] = ops else {
            return Err(NotaryError::NotContractCall);
        };

        if call_op.code() != OpCode::Syscall || call_op.param() != contract_call_id.as_slice() {
            return Err(NotaryError::NotContractCall);
        }

        let contract = ScriptHash::from_be_slice(hash_op.param())
            .ok_or(NotaryError::ContractHash(hash_op.param().len()))?;

        let method =
            std::str::from_utf8(method_op.param()).map_err(|_| NotaryError::IncorrectMethod)?;

        let flags = flag_op
            .code()
            .small_int()
            .and_then(CallFlags::from_bits)
            .ok_or(NotaryError::IncorrectCallFlag(flag_op.code()))?;

        Ok(Self {
            contract,
            method,
            flags,
            args,
        })
    }
}
