use ethash_core::{
    EpochContext, EpochParameters, Hash256, cache_size, dataset_size, hash_light, seed_hash,
    verify_light,
};

fn h256(hex: &str) -> Hash256 {
    hex.parse().unwrap()
}

/// Reference vector with a 1 KiB cache and a 32 KiB dataset built from the
/// zero seed, as published alongside the go-ethereum implementation.
#[test]
fn test_small_parameter_reference_vector() {
    let mut ctx = EpochContext::with_parameters(EpochParameters {
        epoch_number: 0,
        cache_items: 1024 / 64,
        dataset_items: 32 * 1024 / 64,
        seed: Hash256::ZERO,
    })
    .unwrap();

    let header = h256("c9149cc0386e689d789a1c2f3d5d169a61a6218ed30e74414dc736e442ef3d1f");
    let want_mix = h256("e4073cffaef931d37117cefd9afd27ea0f1cad6a981dd2605c4a1ac97c519800");
    let want_final = h256("d3539235ee2e6f8db665c0a72169f55b7f6c605712330b778ec3944f0eb5a557");

    let light = hash_light(&ctx, &header, 0);
    assert_eq!(light.mix_hash, want_mix);
    assert_eq!(light.final_hash, want_final);

    ctx.init_full_dataset().unwrap();
    let full = ctx.hash(&header, 0).unwrap();
    assert_eq!(full, light);
}

#[test]
fn test_epoch_zero_parameters() {
    let params = EpochParameters::for_epoch(0).unwrap();
    assert_eq!(params.cache_items, 262_139);
    assert_eq!(params.dataset_items, 16_777_186);
    assert_eq!(params.light_pages(), 8_388_593);
    assert_eq!(params.seed, seed_hash(0));
    assert_eq!(params.cache_bytes(), cache_size(0));
    assert_eq!(params.dataset_bytes(), dataset_size(0));
}

/// Published epoch 0 vector: exercises the seed, the real size schedule and
/// the full cache build end to end.
#[test]
fn test_epoch_zero_reference_vector() {
    let ctx = EpochContext::new(0).unwrap();
    assert_eq!(ctx.cache().len(), 262_139);

    let header = h256("2a8de2adf89af77358250bf908bf04ba94a6e8c3ba87775564a41d269a05e4ce");
    let nonce = 0x4242_4242_4242_4242;
    let a = ctx.hash_light(&header, nonce);
    assert_eq!(
        a.mix_hash,
        h256("58f759ede17a706c93f13030328bcea40c1d1341fb26f2facd21ceb0dae57017")
    );
    assert_eq!(
        a.final_hash,
        h256("dd47fd2d98db51078356852d7c4014e6a5d6c387c35f40e2875b74a256ed7906")
    );
    assert_eq!(ctx.hash_light(&header, nonce), a);

    let target = a.final_hash.leading_u64_be();
    verify_light(&ctx, &header, &a.mix_hash, nonce, &target).unwrap();
}

#[test]
#[ignore = "allocates the 1 GiB epoch 0 dataset"]
fn test_epoch_zero_cross_mode() {
    let mut ctx = EpochContext::new(0).unwrap();
    ctx.init_full_dataset().unwrap();
    let header = h256("2a8de2adf89af77358250bf908bf04ba94a6e8c3ba87775564a41d269a05e4ce");
    for nonce in [0u64, 1, 0x4242_4242_4242_4242] {
        assert_eq!(ctx.hash(&header, nonce).unwrap(), ctx.hash_light(&header, nonce));
    }
}
