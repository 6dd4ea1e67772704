//! Property tests over generated requests.

use docprint::core::{canonical_request_bytes, fingerprint_request};
use docprint::render::{Assembler, PdfAssembler};
use docprint::{CacheConfig, GenerationCache, MemoryStore, Outcome};
use docprint_testkit::generators::transaction_request;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fingerprint_is_deterministic(request in transaction_request()) {
        let copy = request.clone();
        prop_assert_eq!(canonical_request_bytes(&request), canonical_request_bytes(&copy));
        prop_assert_eq!(fingerprint_request(&request), fingerprint_request(&copy));
    }

    #[test]
    fn distinct_encodings_have_distinct_fingerprints(
        a in transaction_request(),
        b in transaction_request(),
    ) {
        prop_assume!(canonical_request_bytes(&a) != canonical_request_bytes(&b));
        prop_assert_ne!(fingerprint_request(&a), fingerprint_request(&b));
    }

    #[test]
    fn rendering_is_deterministic(request in transaction_request()) {
        let assembler = PdfAssembler::new();
        let first = assembler.render(&request).unwrap();
        let second = assembler.render(&request.clone()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn second_call_is_always_a_hit(request in transaction_request()) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let cache = GenerationCache::new(
                MemoryStore::new(),
                PdfAssembler::new(),
                CacheConfig::default(),
            );
            let first = cache.get_or_generate(&request).await.unwrap();
            let second = cache.get_or_generate(&request).await.unwrap();

            assert_eq!(first.outcome, Outcome::Rendered);
            assert_eq!(second.outcome, Outcome::Hit);
            assert_eq!(first.artifact, second.artifact);
        });
    }
}
