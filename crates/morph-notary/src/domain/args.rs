//! # Call Arguments
//!
//! Operand value extraction and the argument packing grammar.
//!
//! A contract call pushes its arguments, then `<count> PACK` to collect them
//! into one array. Only three argument shapes are recognised:
//!
//! - a single push literal (`PUSHINT*`, `PUSHDATA*`, `PUSHT`/`PUSHF`, ...)
//! - a boolean cast: `PUSHT`/`PUSHF` followed by `CONVERT Boolean`
//! - a nested array: its elements, then `<len> PACK`
//!
//! The validator walks the instructions backwards from the pack boundary and
//! requires every position to be accounted for by exactly one shape.

use crate::domain::entities::PublicKey;
use crate::domain::errors::ArgumentError;
use crate::domain::opcode::{Op, OpCode, STACK_ITEM_BOOLEAN};

// =============================================================================
// Operand values
// =============================================================================

/// Integer pushed by an instruction.
///
/// Accepts `PUSHM1`, `PUSH0`..`PUSH16` and `PUSHINT8`..`PUSHINT256`
/// (little-endian two's complement). Wider integers must fit into `i64`.
pub fn int_from_op(op: &Op) -> Result<i64, ArgumentError> {
    let code = op.code();
    if code == OpCode::PushM1 {
        return Ok(-1);
    }
    if let Some(n) = code.small_int() {
        return Ok(i64::from(n));
    }
    if code <= OpCode::PushInt256 {
        return le_twos_complement(op.param());
    }

    Err(ArgumentError::UnexpectedIntOpcode(code))
}

fn le_twos_complement(bytes: &[u8]) -> Result<i64, ArgumentError> {
    if bytes.is_empty() {
        return Ok(0);
    }

    let width = bytes.len().min(8);
    let negative = bytes[width - 1] & 0x80 != 0;
    let fill = if negative { 0xFF } else { 0x00 };

    if bytes[width..].iter().any(|&b| b != fill) {
        return Err(ArgumentError::IntegerOverflow(bytes.len()));
    }

    let mut buf = [fill; 8];
    buf[..width].copy_from_slice(&bytes[..width]);
    Ok(i64::from_le_bytes(buf))
}

/// Bytes pushed by `PUSHDATA1`/`PUSHDATA2`/`PUSHDATA4`.
pub fn bytes_from_op(op: &Op) -> Result<&[u8], ArgumentError> {
    match op.code() {
        OpCode::PushData1 | OpCode::PushData2 | OpCode::PushData4 => Ok(op.param()),
        code => Err(ArgumentError::UnexpectedBytesOpcode(code)),
    }
}

/// UTF-8 string pushed as bytes.
pub fn string_from_op(op: &Op) -> Result<&str, ArgumentError> {
    let bytes = bytes_from_op(op)?;
    std::str::from_utf8(bytes).map_err(|_| ArgumentError::InvalidUtf8)
}

/// Boolean literal.
pub fn bool_from_op(op: &Op) -> Result<bool, ArgumentError> {
    match op.code() {
        OpCode::PushT => Ok(true),
        OpCode::PushF => Ok(false),
        code => Err(ArgumentError::UnexpectedBoolOpcode(code)),
    }
}

/// Compressed public key pushed as bytes.
pub fn public_key_from_op(op: &Op) -> Result<PublicKey, ArgumentError> {
    Ok(PublicKey::from_bytes(bytes_from_op(op)?)?)
}

// =============================================================================
// Packing grammar
// =============================================================================

/// Classification of one position during the backward scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgShape {
    Literal,
    BoolCast,
    Array,
    Other,
}

impl ArgShape {
    fn of(code: OpCode) -> Self {
        match code {
            c if c.is_push() => Self::Literal,
            OpCode::Convert => Self::BoolCast,
            OpCode::Pack => Self::Array,
            _ => Self::Other,
        }
    }
}

/// Validate a complete argument frame `<args...> <count> PACK`.
///
/// Returns the declared number of top-level arguments.
pub fn validate_parameter_opcodes(ops: &[Op]) -> Result<usize, ArgumentError> {
    let [args @ .., count, pack] = ops else {
        return Err(ArgumentError::IncorrectArgPacking);
    };

    if pack.code() != OpCode::Pack {
        return Err(ArgumentError::UnexpectedPackingOpcode(pack.code()));
    }

    let declared = declared_len(count, ops.len() - 2)?;
    validate_nested_args(declared, args)?;

    Ok(declared)
}

/// Check that `ops` encodes exactly `declared` arguments.
pub fn validate_nested_args(declared: usize, ops: &[Op]) -> Result<(), ArgumentError> {
    let mut expected = declared;
    let mut i = ops.len();

    while i > 0 {
        i -= 1;
        let op = &ops[i];

        match ArgShape::of(op.code()) {
            ArgShape::Literal => {}
            ArgShape::BoolCast => {
                let after_bool = i > 0 && ops[i - 1].code().is_bool_literal();
                if !after_bool || op.param() != [STACK_ITEM_BOOLEAN] {
                    return Err(ArgumentError::UnexpectedConvert);
                }

                expected = expected
                    .checked_add(1)
                    .ok_or(ArgumentError::IncorrectArgPacking)?;
            }
            ArgShape::Array => {
                if i == 0 {
                    return Err(ArgumentError::IncorrectArgPacking);
                }

                let inner = declared_len(&ops[i - 1], i - 1)?;
                expected = expected
                    .checked_add(inner)
                    .and_then(|e| e.checked_add(1))
                    .ok_or(ArgumentError::IncorrectArgPacking)?;
                i -= 1;
            }
            ArgShape::Other => return Err(ArgumentError::UnexpectedOpcode(op.code())),
        }
    }

    if ops.len() != expected {
        return Err(ArgumentError::IncorrectArgPacking);
    }

    Ok(())
}

fn declared_len(op: &Op, position: usize) -> Result<usize, ArgumentError> {
    let wrap = |source| ArgumentError::ArgumentLength {
        position,
        source: Box::new(source),
    };

    let n = int_from_op(op).map_err(wrap)?;
    usize::try_from(n).map_err(|_| wrap(ArgumentError::NegativeLength(n)))
}

// =============================================================================
// TESTS
// =============================================================================
