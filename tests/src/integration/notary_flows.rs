//! # Notary Request Flows
//!
//! Drives complete notary requests through `NotaryPreparator` the way an
//! Alphabet node's request dispatcher does:
//!
//! 1. **Unsigned request**: prepared, then parsed by the contract handler
//! 2. **Co-signed echo**: the same request returns signed and is skipped
//! 3. **Stale request**: the chain passes the fallback height and it is skipped
//! 4. **Committee rotation**: requests for the old committee are rejected
//!
//! Dispatchers share one preparator across worker threads, so several flows
//! run concurrently against the shared adapters.

#[cfg(test)]
mod tests {
    use morph_notary::adapters::{SharedAlphabet, SharedBlockCounter, StaticAlphabet};
    use morph_notary::domain::opcode::ScriptBuilder;
    use morph_notary::events::subnet::parse_notary_delete;
    use morph_notary::test_utils::{committee, key, signature_invocation, RequestBuilder};
    use morph_notary::{
        ErrorClass, NotaryError, NotaryEvent, NotaryPreparator, NotaryPreparatorApi,
        NotaryRequest, NotaryType, OpCode, PreparatorBuilder, PreparatorConfig,
        DUMMY_INVOCATION_SCRIPT,
    };
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;
    use tracing_subscriber::EnvFilter;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const FALLBACK_HEIGHT: u32 = 1_000;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Outcome of one request as a dispatcher records it.
    #[derive(Debug, PartialEq, Eq)]
    enum Dispatch {
        Accepted(NotaryType),
        Skipped,
        Rejected(ErrorClass),
    }

    fn dispatch(p: &impl NotaryPreparatorApi, request: &Arc<NotaryRequest>) -> Dispatch {
        match p.prepare(Arc::clone(request)) {
            Ok(event) => Dispatch::Accepted(event.notary_type().clone()),
            Err(e) if e.is_skip() => Dispatch::Skipped,
            Err(e) => Dispatch::Rejected(e.class()),
        }
    }

    fn subnet_delete(keys: Vec<morph_notary::PublicKey>, id: &[u8]) -> NotaryRequest {
        let args = ScriptBuilder::new()
            .push_bytes(id)
            .push_int(1)
            .op(OpCode::Pack)
            .finish();
        RequestBuilder::new(keys)
            .method("delete")
            .raw_args(args)
            .not_valid_before(FALLBACK_HEIGHT)
            .build()
    }

    fn cosign(request: &NotaryRequest) -> NotaryRequest {
        let mut signed = request.clone();
        signed.main_transaction.scripts[1].invocation_script = signature_invocation(0x42);
        signed
    }

    // =============================================================================
    // REQUEST LIFECYCLE
    // =============================================================================

    /// Test: unsigned request is prepared and parsed, its echo is skipped
    #[test]
    fn test_request_lifecycle() {
        init_tracing();

        let alphabet = SharedAlphabet::with_keys(committee(7));
        let height = SharedBlockCounter::new(FALLBACK_HEIGHT - 10);
        let preparator = PreparatorBuilder::new()
            .alphabet_keys(alphabet)
            .block_counter(height.clone())
            .build()
            .unwrap();

        let request = subnet_delete(committee(7), b"subnet-42");
        let event: NotaryEvent = preparator.prepare(Arc::new(request.clone())).unwrap();

        let delete = parse_notary_delete(&event).unwrap();
        assert_eq!(delete.id(), b"subnet-42");
        assert_eq!(delete.notary_main_tx(), &request.main_transaction);

        let echo = Arc::new(cosign(&request));
        assert_eq!(dispatch(&preparator, &echo), Dispatch::Skipped);

        height.advance(FALLBACK_HEIGHT);
        assert_eq!(dispatch(&preparator, &Arc::new(request)), Dispatch::Skipped);
    }

    /// Test: rotation invalidates requests built for the previous committee
    #[test]
    fn test_committee_rotation() {
        let alphabet = SharedAlphabet::with_keys(committee(4));
        let preparator = NotaryPreparator::new(alphabet.clone(), SharedBlockCounter::new(1));

        let old = Arc::new(subnet_delete(committee(4), b"a"));
        assert_eq!(dispatch(&preparator, &old), Dispatch::Accepted(NotaryType::Delete));

        let mut rotated = committee(4);
        rotated[0] = key(4_000);
        alphabet.replace(rotated.clone());

        assert_eq!(
            dispatch(&preparator, &old),
            Dispatch::Rejected(ErrorClass::Structural)
        );

        let fresh = Arc::new(subnet_delete(rotated, b"a"));
        assert_eq!(dispatch(&preparator, &fresh), Dispatch::Accepted(NotaryType::Delete));
    }

    /// Test: forged argument encoding is routed as a grammar violation
    #[test]
    fn test_forged_arguments() {
        let preparator = NotaryPreparator::new(
            StaticAlphabet::new(committee(4)),
            SharedBlockCounter::new(1),
        );

        // Claims one argument but hides a second behind it.
        let args = ScriptBuilder::new()
            .push_bytes(b"payload")
            .push_bytes(b"smuggled")
            .push_int(1)
            .op(OpCode::Pack)
            .finish();
        let request = Arc::new(
            RequestBuilder::new(committee(4))
                .method("put")
                .raw_args(args)
                .build(),
        );

        assert_eq!(
            dispatch(&preparator, &request),
            Dispatch::Rejected(ErrorClass::Grammar)
        );
    }

    // =============================================================================
    // CONFIGURATION
    // =============================================================================

    /// Test: configuration file is loaded and enforced
    #[test]
    fn test_config_fixture() {
        let config: PreparatorConfig =
            serde_json::from_str(include_str!("../../fixtures/preparator.json")).unwrap();
        assert!(config.validate().is_ok());
        assert!(!config.accept_legacy_dummy_invocation);
        assert_eq!(config.max_committee_size, 21);

        let preparator = PreparatorBuilder::new()
            .alphabet_keys(StaticAlphabet::new(committee(7)))
            .block_counter(SharedBlockCounter::new(1))
            .config(config)
            .build()
            .unwrap();

        let mut request = subnet_delete(committee(7), b"x");
        request.main_transaction.scripts[2].invocation_script = DUMMY_INVOCATION_SCRIPT.to_vec();
        assert!(matches!(
            preparator.prepare(Arc::new(request)),
            Err(NotaryError::IncorrectNotaryPlaceholder)
        ));
    }

    /// Test: requests survive a JSON round trip unchanged
    #[test]
    fn test_request_json_roundtrip() {
        let preparator = NotaryPreparator::new(
            StaticAlphabet::new(committee(4)),
            SharedBlockCounter::new(1),
        );
        let request = RequestBuilder::new(committee(4))
            .with_invoker(true)
            .int_args(&[-1, 0, 300])
            .build();

        let json = serde_json::to_string(&request).unwrap();
        let decoded: NotaryRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, request);

        let direct = preparator.prepare(Arc::new(request)).unwrap();
        let via_json = preparator.prepare(Arc::new(decoded)).unwrap();
        assert_eq!(direct.params(), via_json.params());
        assert_eq!(direct.script_hash(), via_json.script_hash());
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    /// Test: one preparator serves many worker threads
    #[test]
    fn test_concurrent_dispatch() {
        let preparator = Arc::new(NotaryPreparator::new(
            SharedAlphabet::with_keys(committee(7)),
            SharedBlockCounter::new(1),
        ));

        let handles: Vec<_> = (0..8u8)
            .map(|worker| {
                let preparator = Arc::clone(&preparator);
                thread::spawn(move || {
                    let mut outcomes = Vec::new();
                    for i in 0..25u8 {
                        let request = subnet_delete(committee(7), &[worker, i]);
                        let request = if i % 5 == 0 { cosign(&request) } else { request };
                        outcomes.push(dispatch(preparator.as_ref(), &Arc::new(request)));
                    }
                    outcomes
                })
            })
            .collect();

        for handle in handles {
            let outcomes = handle.join().unwrap();
            let skipped = outcomes.iter().filter(|o| **o == Dispatch::Skipped).count();
            let accepted = outcomes
                .iter()
                .filter(|o| **o == Dispatch::Accepted(NotaryType::Delete))
                .count();
            assert_eq!(skipped, 5);
            assert_eq!(accepted, 20);
        }
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    proptest! {
        /// Random bytes in place of the script never panic and only fail as grammar errors.
        #[test]
        fn prop_arbitrary_script_is_rejected(script in proptest::collection::vec(any::<u8>(), 0..64)) {
            let preparator = NotaryPreparator::new(
                StaticAlphabet::new(committee(4)),
                SharedBlockCounter::new(1),
            );
            let mut request = RequestBuilder::new(committee(4)).build();
            request.main_transaction.script = script;

            let result = preparator.prepare(Arc::new(request));
            if let Err(e) = result {
                prop_assert_eq!(e.class(), ErrorClass::Grammar);
            }
        }
    }
}
