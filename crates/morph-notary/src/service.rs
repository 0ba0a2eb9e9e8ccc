//! # Notary Preparator Service
//!
//! Application service layer that implements the `NotaryPreparatorApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`NotaryPreparatorApi`)
//! - Reads the committee and chain height through the outbound ports
//! - Delegates every check to the domain layer
//!
//! ## Check Order
//!
//! ```text
//! witness count ─→ already handled ─→ committee keys ─→ cosigners
//!   ─→ attributes ─→ witnesses ─→ fallback height ─→ expiration
//!   ─→ disassemble ─→ call frame ─→ arguments ─→ NotaryEvent
//! ```
//!
//! The already-handled check only needs the witness list, so it runs before
//! anything touches the accessors.

use crate::domain::args::validate_parameter_opcodes;
use crate::domain::config::PreparatorConfig;
use crate::domain::entities::NotaryRequest;
use crate::domain::errors::{ConfigError, ErrorClass, MultisigError, NotaryError};
use crate::domain::event::{NotaryEvent, NotaryType};
use crate::domain::frame::CallFrame;
use crate::domain::multisig::{interop_id, AlphabetAccount, SYSTEM_CONTRACT_CALL};
use crate::domain::opcode::{disassemble, Op, OpCode};
use crate::domain::validation;
use crate::ports::inbound::NotaryPreparatorApi;
use crate::ports::outbound::{AlphabetKeysSource, BlockCounter};
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

/// Notary request preparator.
///
/// Holds only immutable configuration and the two accessors; every call
/// re-reads the committee and chain height.
pub struct NotaryPreparator<K: AlphabetKeysSource, B: BlockCounter> {
    alphabet: K,
    blocks: B,
    config: PreparatorConfig,
    contract_call_id: [u8; 4],
}

impl<K: AlphabetKeysSource, B: BlockCounter> NotaryPreparator<K, B> {
    /// Create a preparator with the default configuration.
    pub fn new(alphabet: K, blocks: B) -> Self {
        Self {
            alphabet,
            blocks,
            config: PreparatorConfig::default(),
            contract_call_id: interop_id(SYSTEM_CONTRACT_CALL),
        }
    }

    /// Create a preparator with a validated configuration.
    pub fn with_config(alphabet: K, blocks: B, config: PreparatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(alphabet, blocks)
        })
    }

    pub fn config(&self) -> &PreparatorConfig {
        &self.config
    }

    fn reconstruct(&self, request: Arc<NotaryRequest>) -> Result<NotaryEvent, NotaryError> {
        let main = &request.main_transaction;
        let legacy = self.config.accept_legacy_dummy_invocation;

        let has_invoker = validation::witness_layout(&main.scripts)?;
        validation::ensure_not_handled(&main.scripts, legacy)?;

        let keys = self
            .alphabet
            .alphabet_keys()
            .map_err(NotaryError::AlphabetKeys)?;
        if keys.len() > self.config.max_committee_size {
            return Err(MultisigError::TooManyKeys {
                count: keys.len(),
                max: self.config.max_committee_size,
            }
            .into());
        }
        let account = AlphabetAccount::from_keys(&keys)?;

        validation::validate_cosigners(main.scripts.len(), &main.signers, &account.script_hash)?;
        validation::validate_attributes(&main.attributes, account.size, has_invoker)?;
        validation::validate_witnesses(
            &main.scripts,
            &account.verification_script,
            has_invoker,
            legacy,
        )?;

        let not_valid_before =
            validation::fallback_not_valid_before(&request.fallback_transaction)?;
        let current = self.blocks.block_count().map_err(NotaryError::BlockCount)?;
        validation::check_expiration(current, not_valid_before)?;

        let ops = disassemble(&main.script)?;
        trace!(instructions = ops.len(), "main tx script disassembled");

        let frame = CallFrame::parse(&ops, &self.contract_call_id)?;
        let params = self.call_arguments(frame.args)?.to_vec();
        let notary_type = NotaryType::from_method(frame.method);
        let contract = frame.contract;

        Ok(NotaryEvent::new(contract, notary_type, params, request))
    }

    /// Argument instructions without the `<count> PACK` trailer.
    fn call_arguments<'a>(&self, args: &'a [Op]) -> Result<&'a [Op], NotaryError> {
        match args {
            [] => Ok(args),
            [only] if only.code() == OpCode::NewArray0 && self.config.allow_newarray0_arguments => {
                Ok(&[])
            }
            _ => {
                validate_parameter_opcodes(args)?;
                Ok(&args[..args.len() - 2])
            }
        }
    }
}

impl<K: AlphabetKeysSource, B: BlockCounter> NotaryPreparatorApi for NotaryPreparator<K, B> {
    #[instrument(
        skip_all,
        fields(
            witnesses = request.main_transaction.scripts.len(),
            script_len = request.main_transaction.script.len()
        )
    )]
    fn prepare(&self, request: Arc<NotaryRequest>) -> Result<NotaryEvent, NotaryError> {
        let result = self.reconstruct(request);

        match &result {
            Ok(event) => debug!(
                contract = %event.script_hash(),
                method = %event.notary_type(),
                params = event.params().len(),
                "notary request prepared"
            ),
            Err(e) => match e.class() {
                ErrorClass::Skip => debug!(reason = %e, "notary request skipped"),
                ErrorClass::Grammar => warn!(error = %e, "notary request with malformed script"),
                ErrorClass::Accessor => warn!(error = %e, "chain accessor failed"),
                ErrorClass::Structural => debug!(error = %e, "notary request rejected"),
            },
        }

        result
    }
}

/// Builder for `NotaryPreparator`.
///
/// # Example
///
/// ```ignore
/// use morph_notary::adapters::{SharedBlockCounter, StaticAlphabet};
/// use morph_notary::service::PreparatorBuilder;
/// use morph_notary::test_utils::committee;
///
/// let preparator = PreparatorBuilder::new()
///     .alphabet_keys(StaticAlphabet::new(committee(7)))
///     .block_counter(SharedBlockCounter::new(100))
///     .build()
///     .expect("both accessors set");
/// assert!(preparator.config().accept_legacy_dummy_invocation);
/// ```
pub struct PreparatorBuilder<K, B> {
    alphabet: Option<K>,
    blocks: Option<B>,
    config: PreparatorConfig,
}

impl<K, B> Default for PreparatorBuilder<K, B> {
    fn default() -> Self {
        Self {
            alphabet: None,
            blocks: None,
            config: PreparatorConfig::default(),
        }
    }
}

impl<K: AlphabetKeysSource, B: BlockCounter> PreparatorBuilder<K, B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the committee key accessor (required)
    pub fn alphabet_keys(mut self, source: K) -> Self {
        self.alphabet = Some(source);
        self
    }

    /// Set the chain height accessor (required)
    pub fn block_counter(mut self, counter: B) -> Self {
        self.blocks = Some(counter);
        self
    }

    pub fn config(mut self, config: PreparatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the preparator, checking that both accessors were supplied.
    pub fn build(self) -> Result<NotaryPreparator<K, B>, ConfigError> {
        let alphabet = self.alphabet.ok_or(ConfigError::MissingAlphabetKeys)?;
        let blocks = self.blocks.ok_or(ConfigError::MissingBlockCounter)?;
        NotaryPreparator::with_config(alphabet, blocks, self.config)
    }
}

// =============================================================================
// TESTS
// =============================================================================
