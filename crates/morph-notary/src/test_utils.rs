//! Test utilities for notary request preparation.
//!
//! Deterministic committees and a builder for well-formed notary requests.
//! Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust
//! use morph_notary::test_utils::{committee, RequestBuilder};
//!
//! let request = RequestBuilder::new(committee(4))
//!     .method("put")
//!     .int_args(&[7, 8])
//!     .build();
//! assert_eq!(request.main_transaction.scripts.len(), 3);
//! ```

use crate::domain::entities::{
    Attribute, NotaryRequest, PublicKey, ScriptHash, Signer, Transaction, Witness, WitnessScope,
};
use crate::domain::multisig::{interop_id, AlphabetAccount, SYSTEM_CONTRACT_CALL};
use crate::domain::opcode::{OpCode, ScriptBuilder};
use sha2::{Digest, Sha256};

/// Account of the proxy contract paying for notary requests.
pub const PROXY_ACCOUNT: ScriptHash = ScriptHash([0x11; 20]);

/// Account of the native Notary contract.
pub const NOTARY_ACCOUNT: ScriptHash = ScriptHash([0x33; 20]);

/// Deterministic key derived from a seed.
pub fn key(seed: u64) -> PublicKey {
    let digest = Sha256::digest(seed.to_le_bytes());
    let mut raw = [0u8; 33];
    raw[0] = 0x02 | (digest[0] & 1);
    raw[1..].copy_from_slice(&digest);
    match PublicKey::from_bytes(&raw) {
        Ok(key) => key,
        Err(_) => unreachable!("prefix is always 0x02 or 0x03"),
    }
}

/// Deterministic committee of `n` distinct keys.
pub fn committee(n: usize) -> Vec<PublicKey> {
    (0..n).map(|i| key(i as u64 + 1)).collect()
}

/// A signed-looking invocation script: one 64-byte signature push.
pub fn signature_invocation(fill: u8) -> Vec<u8> {
    ScriptBuilder::new().push_bytes(&[fill; 64]).finish()
}

/// Builder for notary requests that pass every structural check.
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    keys: Vec<PublicKey>,
    invoker: bool,
    contract: [u8; 20],
    method: String,
    call_flags: OpCode,
    args: Vec<u8>,
    not_valid_before: u32,
}

impl RequestBuilder {
    /// Request for committee `keys` calling `put` with no arguments.
    pub fn new(keys: Vec<PublicKey>) -> Self {
        Self {
            keys,
            invoker: false,
            contract: [0xAB; 20],
            method: "put".to_string(),
            call_flags: OpCode::Push15,
            args: Vec::new(),
            not_valid_before: 1_000,
        }
    }

    /// Add an invoker witness (four-witness layout).
    pub fn with_invoker(mut self, invoker: bool) -> Self {
        self.invoker = invoker;
        self
    }

    /// Contract hash in big-endian order, as pushed by the script.
    pub fn contract(mut self, be: [u8; 20]) -> Self {
        self.contract = be;
        self
    }

    pub fn method(mut self, method: &str) -> Self {
        self.method = method.to_string();
        self
    }

    /// Opcode pushing the call flags.
    pub fn call_flags(mut self, push: OpCode) -> Self {
        self.call_flags = push;
        self
    }

    /// Integer arguments in call order, packed the way the chain's script
    /// builder does: last argument first, then `<count> PACK`.
    pub fn int_args(mut self, values: &[i64]) -> Self {
        let mut builder = ScriptBuilder::new();
        for value in values.iter().rev() {
            builder.push_int(*value);
        }
        builder.push_int(values.len() as i64).op(OpCode::Pack);
        self.args = builder.finish();
        self
    }

    /// Pre-encoded argument instructions, placed before the call flags.
    pub fn raw_args(mut self, script: Vec<u8>) -> Self {
        self.args = script;
        self
    }

    /// Height from which the fallback transaction is valid.
    pub fn not_valid_before(mut self, height: u32) -> Self {
        self.not_valid_before = height;
        self
    }

    /// Main transaction script: arguments, then the call trailer.
    pub fn script(&self) -> Vec<u8> {
        let mut script = self.args.clone();
        let trailer = ScriptBuilder::new()
            .op(self.call_flags)
            .push_bytes(self.method.as_bytes())
            .push_bytes(&self.contract)
            .syscall(interop_id(SYSTEM_CONTRACT_CALL))
            .finish();
        script.extend(trailer);
        script
    }

    /// # Panics
    ///
    /// If the committee is empty or larger than a multisignature account
    /// allows.
    pub fn build(&self) -> NotaryRequest {
        let account = AlphabetAccount::from_keys(&self.keys)
            .unwrap_or_else(|e| panic!("invalid committee: {e}"));
        let invoker_account = ScriptHash([0x22; 20]);

        let mut signers = vec![
            Signer::new(PROXY_ACCOUNT, WitnessScope::NONE),
            Signer::new(account.script_hash, WitnessScope::NONE),
        ];
        let mut scripts = vec![
            Witness::default(),
            Witness::new(Vec::new(), account.verification_script.clone()),
        ];
        if self.invoker {
            signers.push(Signer::new(invoker_account, WitnessScope::CALLED_BY_ENTRY));
            scripts.push(Witness::new(signature_invocation(0x5A), vec![0x40]));
        }
        signers.push(Signer::new(NOTARY_ACCOUNT, WitnessScope::NONE));
        scripts.push(Witness::default());

        let n_keys = u8::try_from(account.size + usize::from(self.invoker)).unwrap_or(u8::MAX);

        let main_transaction = Transaction {
            nonce: 1,
            valid_until_block: self.not_valid_before,
            script: self.script(),
            signers,
            attributes: vec![Attribute::NotaryAssisted { n_keys }],
            scripts,
        };

        let fallback_transaction = Transaction {
            nonce: 2,
            valid_until_block: self.not_valid_before.saturating_add(100),
            script: ScriptBuilder::new().op(OpCode::Ret).finish(),
            signers: vec![
                Signer::new(NOTARY_ACCOUNT, WitnessScope::NONE),
                Signer::new(PROXY_ACCOUNT, WitnessScope::NONE),
            ],
            attributes: vec![
                Attribute::NotValidBefore {
                    height: self.not_valid_before,
                },
                Attribute::Conflicts { hash: [0x44; 32] },
                Attribute::NotaryAssisted { n_keys: 0 },
            ],
            scripts: vec![Witness::default(), Witness::default()],
        };

        NotaryRequest {
            main_transaction,
            fallback_transaction,
        }
    }
}
