use ethash_core::dag::calculate_dataset_item;
use ethash_core::{
    EpochContext, EpochParameters, Hash256, search, search_light, seed_hash,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn context(epoch_number: u32, cache_items: usize, dataset_items: usize) -> EpochContext {
    EpochContext::with_parameters(EpochParameters {
        epoch_number,
        cache_items,
        dataset_items,
        seed: seed_hash(epoch_number),
    })
    .unwrap()
}

fn random_header(rng: &mut StdRng) -> Hash256 {
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    Hash256(bytes)
}

#[test]
fn test_light_equals_full_for_random_inputs() {
    let mut rng = StdRng::seed_from_u64(0x00e7_4a54);
    for (epoch, cache_items, dataset_items) in [(0, 17, 262), (1, 31, 1024), (5, 61, 2050)] {
        let mut ctx = context(epoch, cache_items, dataset_items);
        ctx.init_full_dataset().unwrap();
        for _ in 0..16 {
            let header = random_header(&mut rng);
            let nonce: u64 = rng.r#gen();
            let light = ctx.hash_light(&header, nonce);
            let full = ctx.hash(&header, nonce).unwrap();
            assert_eq!(light, full, "epoch {epoch} nonce {nonce:#x}");
        }
    }
}

#[test]
fn test_lazy_dataset_matches_direct_items() {
    let mut ctx = context(2, 29, 300);
    ctx.init_full_dataset().unwrap();
    for index in [0u32, 1, 150, 299] {
        let first = ctx.dataset_item(index).unwrap();
        let second = ctx.dataset_item(index).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, calculate_dataset_item(ctx.cache(), index));
    }
    assert!(ctx.dataset_item(300).is_err());
}

#[test]
fn test_context_recreation_is_deterministic() {
    let a = context(3, 41, 128);
    let b = context(3, 41, 128);
    assert_eq!(a.cache(), b.cache());
    let header = Hash256([0xee; 32]);
    assert_eq!(a.hash_light(&header, 77), b.hash_light(&header, 77));
}

#[test]
fn test_parallel_light_search_over_disjoint_ranges() {
    let ctx = context(0, 16, 512);
    let header = Hash256([0x21; 32]);
    let target = u64::MAX / 64;

    let sequential = search_light(&ctx, &header, &target, 0, 4000);

    // Four workers share the context read-only, each scanning its own slice.
    let found: Vec<Option<u64>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4u64)
            .map(|w| {
                let ctx = &ctx;
                let header = &header;
                scope.spawn(move || search_light(ctx, header, &target, w * 1000, 1000))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let first = found.into_iter().flatten().min();
    assert_eq!(first, sequential);
}

#[test]
fn test_full_and_light_search_agree() {
    let mut ctx = context(0, 16, 512);
    let header = Hash256([0x99; 32]);
    let target = u64::MAX / 200;
    let light = search_light(&ctx, &header, &target, 10, 2000);
    ctx.init_full_dataset().unwrap();
    let full = search(&mut ctx, &header, &target, 10, 2000).unwrap();
    assert_eq!(light, full);
}
