//! # Multisignature Accounts
//!
//! Interop ids, `Hash160` and the m-of-n verification script the chain uses
//! for multisignature accounts. The script must match the chain's own
//! construction byte for byte, since the account hash is derived from it.

use crate::domain::entities::{PublicKey, ScriptHash};
use crate::domain::errors::MultisigError;
use crate::domain::opcode::{OpCode, ScriptBuilder};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Interop name of the contract-call syscall.
pub const SYSTEM_CONTRACT_CALL: &str = "System.Contract.Call";

/// Interop name of the multisignature check syscall.
pub const SYSTEM_CRYPTO_CHECK_MULTISIG: &str = "System.Crypto.CheckMultisig";

/// Upper bound on keys in a multisignature account.
pub const MAX_MULTISIG_KEYS: usize = 1024;

/// Interop id of a syscall: the first four bytes of SHA-256 over its name,
/// which is the little-endian `u32` operand of `SYSCALL`.
pub fn interop_id(name: &str) -> [u8; 4] {
    let digest = Sha256::digest(name.as_bytes());
    let mut id = [0u8; 4];
    id.copy_from_slice(&digest[..4]);
    id
}

/// RIPEMD-160 over SHA-256 of the script.
pub fn hash160(script: &[u8]) -> ScriptHash {
    let sha = Sha256::digest(script);
    let digest = Ripemd160::digest(sha);
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&digest);
    ScriptHash(hash)
}

/// Signature threshold of the committee account: ⌊2n/3⌋ + 1.
pub fn alphabet_threshold(n: usize) -> usize {
    n * 2 / 3 + 1
}

/// Build an `m`-of-`n` multisignature verification script over `keys`.
///
/// Layout: `PUSH m`, one `PUSHDATA1` per key in ascending key order,
/// `PUSH n`, `SYSCALL System.Crypto.CheckMultisig`.
pub fn create_multisig_redeem_script(m: usize, keys: &[PublicKey]) -> Result<Vec<u8>, MultisigError> {
    let n = keys.len();
    if n == 0 {
        return Err(MultisigError::EmptyKeySet);
    }
    if n > MAX_MULTISIG_KEYS {
        return Err(MultisigError::TooManyKeys {
            count: n,
            max: MAX_MULTISIG_KEYS,
        });
    }
    if m < 1 || m > n {
        return Err(MultisigError::InvalidThreshold { m, n });
    }

    let mut sorted = keys.to_vec();
    sorted.sort();

    let mut builder = ScriptBuilder::new();
    // Bounded by MAX_MULTISIG_KEYS above.
    builder.push_int(m as i64);
    for key in &sorted {
        builder.push_bytes(key.as_bytes());
    }
    builder
        .push_int(n as i64)
        .syscall(interop_id(SYSTEM_CRYPTO_CHECK_MULTISIG));

    Ok(builder.finish())
}

/// Verification script of the committee account over `keys`.
pub fn alphabet_verification_script(keys: &[PublicKey]) -> Result<Vec<u8>, MultisigError> {
    create_multisig_redeem_script(alphabet_threshold(keys.len()), keys)
}

/// Committee multisignature account: verification script and its hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphabetAccount {
    pub verification_script: Vec<u8>,
    pub script_hash: ScriptHash,
    pub size: usize,
}

impl AlphabetAccount {
    pub fn from_keys(keys: &[PublicKey]) -> Result<Self, MultisigError> {
        let verification_script = alphabet_verification_script(keys)?;
        Ok(Self {
            script_hash: hash160(&verification_script),
            verification_script,
            size: keys.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::args::int_from_op;
    use crate::domain::opcode::{disassemble, Op};
    use crate::test_utils::{committee, key};
    use proptest::prelude::*;

    /// Threshold pushed by a multisignature script, if it has that shape.
    fn multisig_threshold(script: &[u8]) -> Option<usize> {
        let ops = disassemble(script).ok()?;
        let last = ops.last()?;
        if last.code() != OpCode::Syscall
            || last.param() != interop_id(SYSTEM_CRYPTO_CHECK_MULTISIG)
        {
            return None;
        }
        let m = int_from_op(ops.first()?).ok()?;
        usize::try_from(m).ok()
    }

    /// Test: interop ids match the chain's syscall table
    #[test]
    fn test_interop_ids() {
        assert_eq!(hex::encode(interop_id(SYSTEM_CONTRACT_CALL)), "627d5b52");
        assert_eq!(
            hex::encode(interop_id(SYSTEM_CRYPTO_CHECK_MULTISIG)),
            "9ed0dc3a"
        );
    }

    #[test]
    fn test_threshold() {
        assert_eq!(alphabet_threshold(1), 1);
        assert_eq!(alphabet_threshold(4), 3);
        assert_eq!(alphabet_threshold(7), 5);
        assert_eq!(alphabet_threshold(21), 15);
    }

    /// Test: script layout is PUSH m, keys ascending, PUSH n, SYSCALL
    #[test]
    fn test_script_layout() {
        let keys = committee(4);
        let script = alphabet_verification_script(&keys).unwrap();
        let ops = disassemble(&script).unwrap();

        assert_eq!(ops.len(), 7);
        assert_eq!(ops[0], Op::new(OpCode::Push3));
        assert_eq!(ops[5], Op::new(OpCode::Push4));
        assert_eq!(ops[6].code(), OpCode::Syscall);

        let mut sorted = keys.clone();
        sorted.sort();
        for (op, key) in ops[1..5].iter().zip(&sorted) {
            assert_eq!(op.code(), OpCode::PushData1);
            assert_eq!(op.param(), key.as_bytes());
        }
    }

    /// Test: key order in the input does not change the script
    #[test]
    fn test_script_is_order_independent() {
        let keys = committee(7);
        let mut reversed = keys.clone();
        reversed.reverse();

        assert_eq!(
            alphabet_verification_script(&keys).unwrap(),
            alphabet_verification_script(&reversed).unwrap()
        );
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            alphabet_verification_script(&[]),
            Err(MultisigError::EmptyKeySet)
        );
        assert_eq!(
            create_multisig_redeem_script(0, &committee(3)),
            Err(MultisigError::InvalidThreshold { m: 0, n: 3 })
        );
        assert_eq!(
            create_multisig_redeem_script(4, &committee(3)),
            Err(MultisigError::InvalidThreshold { m: 4, n: 3 })
        );
    }

    /// Test: large committees use PUSHINT for the counts
    #[test]
    fn test_large_committee_counts() {
        let keys = committee(30);
        let script = alphabet_verification_script(&keys).unwrap();
        let ops = disassemble(&script).unwrap();

        assert_eq!(ops[0], Op::with_param(OpCode::PushInt8, vec![21]));
        assert_eq!(ops[31], Op::with_param(OpCode::PushInt8, vec![30]));
    }

    #[test]
    fn test_alphabet_account() {
        let keys = committee(4);
        let account = AlphabetAccount::from_keys(&keys).unwrap();
        assert_eq!(account.size, 4);
        assert_eq!(account.script_hash, hash160(&account.verification_script));
    }

    #[test]
    fn test_hash160_of_empty_script() {
        // RIPEMD160(SHA256("")), a well-known constant.
        assert_eq!(
            hex::encode(hash160(&[]).as_le_bytes()),
            "b472a266d0bd89c13706a4132ccfb16f7c3b9fcb"
        );
    }

    proptest! {
        /// Threshold pushed by the script is always ⌊2n/3⌋ + 1.
        #[test]
        fn prop_threshold_in_script(n in 1usize..40) {
            let script = alphabet_verification_script(&committee(n)).unwrap();
            prop_assert_eq!(multisig_threshold(&script), Some(n * 2 / 3 + 1));
        }

        /// Replacing any single key changes the committee account.
        #[test]
        fn prop_single_key_change_changes_account(n in 1usize..22, idx in 0usize..22, seed in 1000u64..2000) {
            let keys = committee(n);
            let mut changed = keys.clone();
            changed[idx % n] = key(seed);

            let old = hash160(&alphabet_verification_script(&keys).unwrap());
            let new = hash160(&alphabet_verification_script(&changed).unwrap());
            prop_assert_ne!(old, new);
        }
    }
}
