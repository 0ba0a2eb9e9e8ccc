//! # NeoVM Opcodes
//!
//! Opcode table, operand encodings and the single-pass disassembler used to
//! turn a transaction script into an instruction sequence.

use crate::domain::errors::DecodeError;
use std::fmt;

/// How the operand of an opcode is laid out in the script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandEncoding {
    /// No operand follows the opcode.
    None,
    /// A fixed number of operand bytes follows the opcode.
    Fixed(usize),
    /// A little-endian length prefix of the given width, then that many bytes.
    Prefixed(usize),
}

macro_rules! opcodes {
    ($($variant:ident = $byte:literal => $name:literal,)+) => {
        /// NeoVM opcode enumeration.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u8)]
        pub enum OpCode {
            $($variant = $byte,)+
        }

        impl OpCode {
            /// Try to decode an opcode from a byte.
            #[must_use]
            pub fn from_byte(byte: u8) -> Option<Self> {
                match byte {
                    $($byte => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Canonical mnemonic of the opcode.
            #[must_use]
            pub fn mnemonic(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }
    };
}

opcodes! {
    // Constants
    PushInt8 = 0x00 => "PUSHINT8",
    PushInt16 = 0x01 => "PUSHINT16",
    PushInt32 = 0x02 => "PUSHINT32",
    PushInt64 = 0x03 => "PUSHINT64",
    PushInt128 = 0x04 => "PUSHINT128",
    PushInt256 = 0x05 => "PUSHINT256",
    PushT = 0x08 => "PUSHT",
    PushF = 0x09 => "PUSHF",
    PushA = 0x0A => "PUSHA",
    PushNull = 0x0B => "PUSHNULL",
    PushData1 = 0x0C => "PUSHDATA1",
    PushData2 = 0x0D => "PUSHDATA2",
    PushData4 = 0x0E => "PUSHDATA4",
    PushM1 = 0x0F => "PUSHM1",
    Push0 = 0x10 => "PUSH0",
    Push1 = 0x11 => "PUSH1",
    Push2 = 0x12 => "PUSH2",
    Push3 = 0x13 => "PUSH3",
    Push4 = 0x14 => "PUSH4",
    Push5 = 0x15 => "PUSH5",
    Push6 = 0x16 => "PUSH6",
    Push7 = 0x17 => "PUSH7",
    Push8 = 0x18 => "PUSH8",
    Push9 = 0x19 => "PUSH9",
    Push10 = 0x1A => "PUSH10",
    Push11 = 0x1B => "PUSH11",
    Push12 = 0x1C => "PUSH12",
    Push13 = 0x1D => "PUSH13",
    Push14 = 0x1E => "PUSH14",
    Push15 = 0x1F => "PUSH15",
    Push16 = 0x20 => "PUSH16",

    // Flow control
    Nop = 0x21 => "NOP",
    Jmp = 0x22 => "JMP",
    JmpL = 0x23 => "JMP_L",
    JmpIf = 0x24 => "JMPIF",
    JmpIfL = 0x25 => "JMPIF_L",
    JmpIfNot = 0x26 => "JMPIFNOT",
    JmpIfNotL = 0x27 => "JMPIFNOT_L",
    JmpEq = 0x28 => "JMPEQ",
    JmpEqL = 0x29 => "JMPEQ_L",
    JmpNe = 0x2A => "JMPNE",
    JmpNeL = 0x2B => "JMPNE_L",
    JmpGt = 0x2C => "JMPGT",
    JmpGtL = 0x2D => "JMPGT_L",
    JmpGe = 0x2E => "JMPGE",
    JmpGeL = 0x2F => "JMPGE_L",
    JmpLt = 0x30 => "JMPLT",
    JmpLtL = 0x31 => "JMPLT_L",
    JmpLe = 0x32 => "JMPLE",
    JmpLeL = 0x33 => "JMPLE_L",
    Call = 0x34 => "CALL",
    CallL = 0x35 => "CALL_L",
    CallA = 0x36 => "CALLA",
    CallT = 0x37 => "CALLT",
    Abort = 0x38 => "ABORT",
    Assert = 0x39 => "ASSERT",
    Throw = 0x3A => "THROW",
    Try = 0x3B => "TRY",
    TryL = 0x3C => "TRY_L",
    EndTry = 0x3D => "ENDTRY",
    EndTryL = 0x3E => "ENDTRY_L",
    EndFinally = 0x3F => "ENDFINALLY",
    Ret = 0x40 => "RET",
    Syscall = 0x41 => "SYSCALL",

    // Stack
    Depth = 0x43 => "DEPTH",
    Drop = 0x45 => "DROP",
    Nip = 0x46 => "NIP",
    XDrop = 0x48 => "XDROP",
    Clear = 0x49 => "CLEAR",
    Dup = 0x4A => "DUP",
    Over = 0x4B => "OVER",
    Pick = 0x4D => "PICK",
    Tuck = 0x4E => "TUCK",
    Swap = 0x50 => "SWAP",
    Rot = 0x51 => "ROT",
    Roll = 0x52 => "ROLL",
    Reverse3 = 0x53 => "REVERSE3",
    Reverse4 = 0x54 => "REVERSE4",
    ReverseN = 0x55 => "REVERSEN",

    // Slots
    InitSSlot = 0x56 => "INITSSLOT",
    InitSlot = 0x57 => "INITSLOT",
    LdSFld0 = 0x58 => "LDSFLD0",
    LdSFld1 = 0x59 => "LDSFLD1",
    LdSFld2 = 0x5A => "LDSFLD2",
    LdSFld3 = 0x5B => "LDSFLD3",
    LdSFld4 = 0x5C => "LDSFLD4",
    LdSFld5 = 0x5D => "LDSFLD5",
    LdSFld6 = 0x5E => "LDSFLD6",
    LdSFld = 0x5F => "LDSFLD",
    StSFld0 = 0x60 => "STSFLD0",
    StSFld1 = 0x61 => "STSFLD1",
    StSFld2 = 0x62 => "STSFLD2",
    StSFld3 = 0x63 => "STSFLD3",
    StSFld4 = 0x64 => "STSFLD4",
    StSFld5 = 0x65 => "STSFLD5",
    StSFld6 = 0x66 => "STSFLD6",
    StSFld = 0x67 => "STSFLD",
    LdLoc0 = 0x68 => "LDLOC0",
    LdLoc1 = 0x69 => "LDLOC1",
    LdLoc2 = 0x6A => "LDLOC2",
    LdLoc3 = 0x6B => "LDLOC3",
    LdLoc4 = 0x6C => "LDLOC4",
    LdLoc5 = 0x6D => "LDLOC5",
    LdLoc6 = 0x6E => "LDLOC6",
    LdLoc = 0x6F => "LDLOC",
    StLoc0 = 0x70 => "STLOC0",
    StLoc1 = 0x71 => "STLOC1",
    StLoc2 = 0x72 => "STLOC2",
    StLoc3 = 0x73 => "STLOC3",
    StLoc4 = 0x74 => "STLOC4",
    StLoc5 = 0x75 => "STLOC5",
    StLoc6 = 0x76 => "STLOC6",
    StLoc = 0x77 => "STLOC",
    LdArg0 = 0x78 => "LDARG0",
    LdArg1 = 0x79 => "LDARG1",
    LdArg2 = 0x7A => "LDARG2",
    LdArg3 = 0x7B => "LDARG3",
    LdArg4 = 0x7C => "LDARG4",
    LdArg5 = 0x7D => "LDARG5",
    LdArg6 = 0x7E => "LDARG6",
    LdArg = 0x7F => "LDARG",
    StArg0 = 0x80 => "STARG0",
    StArg1 = 0x81 => "STARG1",
    StArg2 = 0x82 => "STARG2",
    StArg3 = 0x83 => "STARG3",
    StArg4 = 0x84 => "STARG4",
    StArg5 = 0x85 => "STARG5",
    StArg6 = 0x86 => "STARG6",
    StArg = 0x87 => "STARG",

    // Splice
    NewBuffer = 0x88 => "NEWBUFFER",
    MemCpy = 0x89 => "MEMCPY",
    Cat = 0x8B => "CAT",
    SubStr = 0x8C => "SUBSTR",
    Left = 0x8D => "LEFT",
    Right = 0x8E => "RIGHT",

    // Bitwise logic
    Invert = 0x90 => "INVERT",
    And = 0x91 => "AND",
    Or = 0x92 => "OR",
    Xor = 0x93 => "XOR",
    Equal = 0x97 => "EQUAL",
    NotEqual = 0x98 => "NOTEQUAL",

    // Arithmetic
    Sign = 0x99 => "SIGN",
    Abs = 0x9A => "ABS",
    Negate = 0x9B => "NEGATE",
    Inc = 0x9C => "INC",
    Dec = 0x9D => "DEC",
    Add = 0x9E => "ADD",
    Sub = 0x9F => "SUB",
    Mul = 0xA0 => "MUL",
    Div = 0xA1 => "DIV",
    Mod = 0xA2 => "MOD",
    Pow = 0xA3 => "POW",
    Sqrt = 0xA4 => "SQRT",
    ModMul = 0xA5 => "MODMUL",
    ModPow = 0xA6 => "MODPOW",
    Shl = 0xA8 => "SHL",
    Shr = 0xA9 => "SHR",
    Not = 0xAA => "NOT",
    BoolAnd = 0xAB => "BOOLAND",
    BoolOr = 0xAC => "BOOLOR",
    Nz = 0xB1 => "NZ",
    NumEqual = 0xB3 => "NUMEQUAL",
    NumNotEqual = 0xB4 => "NUMNOTEQUAL",
    Lt = 0xB5 => "LT",
    Le = 0xB6 => "LE",
    Gt = 0xB7 => "GT",
    Ge = 0xB8 => "GE",
    Min = 0xB9 => "MIN",
    Max = 0xBA => "MAX",
    Within = 0xBB => "WITHIN",

    // Compound types
    PackMap = 0xBE => "PACKMAP",
    PackStruct = 0xBF => "PACKSTRUCT",
    Pack = 0xC0 => "PACK",
    Unpack = 0xC1 => "UNPACK",
    NewArray0 = 0xC2 => "NEWARRAY0",
    NewArray = 0xC3 => "NEWARRAY",
    NewArrayT = 0xC4 => "NEWARRAY_T",
    NewStruct0 = 0xC5 => "NEWSTRUCT0",
    NewStruct = 0xC6 => "NEWSTRUCT",
    NewMap = 0xC8 => "NEWMAP",
    Size = 0xCA => "SIZE",
    HasKey = 0xCB => "HASKEY",
    Keys = 0xCC => "KEYS",
    Values = 0xCD => "VALUES",
    PickItem = 0xCE => "PICKITEM",
    Append = 0xCF => "APPEND",
    SetItem = 0xD0 => "SETITEM",
    ReverseItems = 0xD1 => "REVERSEITEMS",
    Remove = 0xD2 => "REMOVE",
    ClearItems = 0xD3 => "CLEARITEMS",
    PopItem = 0xD4 => "POPITEM",

    // Types
    IsNull = 0xD8 => "ISNULL",
    IsType = 0xD9 => "ISTYPE",
    Convert = 0xDB => "CONVERT",

    // Extensions
    AbortMsg = 0xE0 => "ABORTMSG",
    AssertMsg = 0xE1 => "ASSERTMSG",
}

/// Stack item type tag carried by `CONVERT`/`ISTYPE` for booleans.
pub const STACK_ITEM_BOOLEAN: u8 = 0x20;

impl OpCode {
    /// Operand layout following this opcode.
    #[must_use]
    pub fn operand_encoding(&self) -> OperandEncoding {
        use OpCode::*;

        match self {
            PushInt8 => OperandEncoding::Fixed(1),
            PushInt16 => OperandEncoding::Fixed(2),
            PushInt32 => OperandEncoding::Fixed(4),
            PushInt64 => OperandEncoding::Fixed(8),
            PushInt128 => OperandEncoding::Fixed(16),
            PushInt256 => OperandEncoding::Fixed(32),
            PushA => OperandEncoding::Fixed(4),
            PushData1 => OperandEncoding::Prefixed(1),
            PushData2 => OperandEncoding::Prefixed(2),
            PushData4 => OperandEncoding::Prefixed(4),

            Jmp | JmpIf | JmpIfNot | JmpEq | JmpNe | JmpGt | JmpGe | JmpLt | JmpLe | Call
            | EndTry => OperandEncoding::Fixed(1),
            JmpL | JmpIfL | JmpIfNotL | JmpEqL | JmpNeL | JmpGtL | JmpGeL | JmpLtL | JmpLeL
            | CallL | EndTryL => OperandEncoding::Fixed(4),
            CallT => OperandEncoding::Fixed(2),
            Try => OperandEncoding::Fixed(2),
            TryL => OperandEncoding::Fixed(8),
            Syscall => OperandEncoding::Fixed(4),

            InitSSlot => OperandEncoding::Fixed(1),
            InitSlot => OperandEncoding::Fixed(2),
            LdSFld | StSFld | LdLoc | StLoc | LdArg | StArg => OperandEncoding::Fixed(1),

            NewArrayT | IsType | Convert => OperandEncoding::Fixed(1),

            _ => OperandEncoding::None,
        }
    }

    /// Returns true for every opcode in the constant-push range
    /// (`PUSHINT8` through `PUSH16`).
    #[must_use]
    pub fn is_push(&self) -> bool {
        *self <= Self::Push16
    }

    /// Returns true for the boolean literals `PUSHT` and `PUSHF`.
    #[must_use]
    pub fn is_bool_literal(&self) -> bool {
        matches!(self, Self::PushT | Self::PushF)
    }

    /// Small integer pushed by `PUSH0`..`PUSH16`.
    #[must_use]
    pub fn small_int(&self) -> Option<u8> {
        if (Self::Push0..=Self::Push16).contains(self) {
            Some(*self as u8 - Self::Push0 as u8)
        } else {
            None
        }
    }

    /// `PUSH<n>` opcode for `n` in `0..=16`.
    #[must_use]
    pub fn push_small(n: u8) -> Option<Self> {
        if n <= 16 {
            Self::from_byte(Self::Push0 as u8 + n)
        } else {
            None
        }
    }
}

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Self::from_byte(byte).ok_or(byte)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

// =============================================================================
// Instructions
// =============================================================================

/// A single decoded instruction: opcode plus its raw operand bytes.
///
/// For length-prefixed pushes the operand is the pushed data without the
/// length prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Op {
    code: OpCode,
    param: Vec<u8>,
}

impl Op {
    /// Instruction without an operand.
    pub fn new(code: OpCode) -> Self {
        Self {
            code,
            param: Vec::new(),
        }
    }

    /// Instruction with an operand.
    pub fn with_param(code: OpCode, param: impl Into<Vec<u8>>) -> Self {
        Self {
            code,
            param: param.into(),
        }
    }

    pub fn code(&self) -> OpCode {
        self.code
    }

    pub fn param(&self) -> &[u8] {
        &self.param
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.param.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, hex::encode(&self.param))
        }
    }
}

// =============================================================================
// Disassembler
// =============================================================================

/// Sequential single-pass decoder over a script.
///
/// Yields instructions until `RET` is reached; the `RET` itself is not
/// yielded. Running off the end of the script behaves like an explicit
/// `RET`. After the first decode error the iterator is exhausted.
#[derive(Debug, Clone)]
pub struct Disassembler<'a> {
    script: &'a [u8],
    ip: usize,
    done: bool,
}

impl<'a> Disassembler<'a> {
    pub fn new(script: &'a [u8]) -> Self {
        Self {
            script,
            ip: 0,
            done: false,
        }
    }

    /// Decode the instruction at the current position and advance past it.
    pub fn next_op(&mut self) -> Result<Op, DecodeError> {
        let offset = self.ip;
        let Some(&byte) = self.script.get(offset) else {
            return Ok(Op::new(OpCode::Ret));
        };
        let code = OpCode::from_byte(byte).ok_or(DecodeError::UnknownOpcode { offset, byte })?;

        let mut cursor = offset + 1;
        let len = match code.operand_encoding() {
            OperandEncoding::None => 0,
            OperandEncoding::Fixed(n) => n,
            OperandEncoding::Prefixed(width) => {
                let prefix = self.operand(cursor, width).ok_or(DecodeError::TruncatedPrefix {
                    offset,
                    opcode: code,
                })?;
                cursor += width;
                read_le_len(prefix).ok_or(DecodeError::OperandTooLarge { offset })?
            }
        };

        let param = self.operand(cursor, len).ok_or(DecodeError::TruncatedOperand {
            offset,
            opcode: code,
            expected: len,
            available: self.script.len().saturating_sub(cursor),
        })?;

        self.ip = cursor + len;
        Ok(Op::with_param(code, param))
    }

    fn operand(&self, start: usize, len: usize) -> Option<&'a [u8]> {
        let end = start.checked_add(len)?;
        self.script.get(start..end)
    }
}

impl Iterator for Disassembler<'_> {
    type Item = Result<Op, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_op() {
            Ok(op) if op.code() == OpCode::Ret => {
                self.done = true;
                None
            }
            Ok(op) => Some(Ok(op)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode every instruction of `script` preceding the terminal `RET`.
pub fn disassemble(script: &[u8]) -> Result<Vec<Op>, DecodeError> {
    Disassembler::new(script).collect()
}

fn read_le_len(prefix: &[u8]) -> Option<usize> {
    let mut buf = [0u8; 8];
    buf[..prefix.len()].copy_from_slice(prefix);
    usize::try_from(u64::from_le_bytes(buf)).ok()
}

// =============================================================================
// Script builder
// =============================================================================

/// Emits canonical NeoVM encodings.
#[derive(Debug, Default, Clone)]
pub struct ScriptBuilder {
    buf: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a bare opcode.
    pub fn op(&mut self, code: OpCode) -> &mut Self {
        self.buf.push(code as u8);
        self
    }

    /// Emit an opcode followed by a raw operand.
    pub fn op_with(&mut self, code: OpCode, operand: &[u8]) -> &mut Self {
        self.buf.push(code as u8);
        self.buf.extend_from_slice(operand);
        self
    }

    /// Emit the shortest push of an integer.
    pub fn push_int(&mut self, value: i64) -> &mut Self {
        if value == -1 {
            return self.op(OpCode::PushM1);
        }
        if let Some(code) = u8::try_from(value).ok().and_then(OpCode::push_small) {
            return self.op(code);
        }

        let bytes = value.to_le_bytes();
        let (code, width) = if i8::try_from(value).is_ok() {
            (OpCode::PushInt8, 1)
        } else if i16::try_from(value).is_ok() {
            (OpCode::PushInt16, 2)
        } else if i32::try_from(value).is_ok() {
            (OpCode::PushInt32, 4)
        } else {
            (OpCode::PushInt64, 8)
        };
        self.op_with(code, &bytes[..width])
    }

    /// Emit the shortest `PUSHDATA` for `data`.
    ///
    /// # Panics
    ///
    /// If `data` is longer than `u32::MAX` bytes, which no `PUSHDATA`
    /// prefix can describe.
    pub fn push_bytes(&mut self, data: &[u8]) -> &mut Self {
        let Some((code, prefix, width)) = pushdata_prefix(data.len()) else {
            panic!("PUSHDATA payload of {} bytes exceeds u32::MAX", data.len());
        };
        self.op_with(code, &prefix[..width]);
        self.buf.extend_from_slice(data);
        self
    }

    /// Emit a `SYSCALL` with the given interop id.
    pub fn syscall(&mut self, id: [u8; 4]) -> &mut Self {
        self.op_with(OpCode::Syscall, &id)
    }

    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

/// Shortest `PUSHDATA` opcode for a payload of `len` bytes, with its
/// little-endian length prefix and the prefix width.
fn pushdata_prefix(len: usize) -> Option<(OpCode, [u8; 4], usize)> {
    let l = u32::try_from(len).ok()?;
    let (code, width) = if l <= u32::from(u8::MAX) {
        (OpCode::PushData1, 1)
    } else if l <= u32::from(u16::MAX) {
        (OpCode::PushData2, 2)
    } else {
        (OpCode::PushData4, 4)
    };
    Some((code, l.to_le_bytes(), width))
}

// =============================================================================
// TESTS
// =============================================================================
