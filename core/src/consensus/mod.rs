// core/consensus: Ethash proof-of-work (epochs, DAG, hashimoto, search, verify)
use crate::crypto::Hash256;
use crate::error::{EthashError, Result};

pub mod context;
pub mod dag;
pub mod epoch;
pub mod hashimoto;
pub mod target;

pub use context::EpochContext;
pub use epoch::{
    EpochParameters, cache_size, dataset_size, epoch_of, find_epoch_number, seed_hash,
};
pub use hashimoto::{HashResult, hash_final, hash_seed};
pub use target::{Boundary, Target};

/// Create the context for `epoch_number` (light cache built, no full dataset)
pub fn create_epoch_context(epoch_number: u32) -> Result<EpochContext> {
    EpochContext::new(epoch_number)
}

pub fn hash_light(context: &EpochContext, header_hash: &Hash256, nonce: u64) -> HashResult {
    context.hash_light(header_hash, nonce)
}

pub fn hash(context: &mut EpochContext, header_hash: &Hash256, nonce: u64) -> Result<HashResult> {
    context.hash(header_hash, nonce)
}

/// Search `iterations` consecutive nonces from `start_nonce` (wrapping at
/// 2^64) in light mode and return the first one whose final hash meets
/// `target`, or `None`.
pub fn search_light<T: Target + ?Sized>(
    context: &EpochContext,
    header_hash: &Hash256,
    target: &T,
    start_nonce: u64,
    iterations: usize,
) -> Option<u64> {
    let mut nonce = start_nonce;
    for _ in 0..iterations {
        let result = context.hash_light(header_hash, nonce);
        if target.is_met_by(&result.final_hash) {
            log::debug!("Light search hit: nonce={} final={}", nonce, result.final_hash);
            return Some(nonce);
        }
        nonce = nonce.wrapping_add(1);
    }
    None
}

/// Full-mode counterpart of [`search_light`]. Fails up front if the context
/// has no full dataset.
pub fn search<T: Target + ?Sized>(
    context: &mut EpochContext,
    header_hash: &Hash256,
    target: &T,
    start_nonce: u64,
    iterations: usize,
) -> Result<Option<u64>> {
    if !context.has_full_dataset() {
        return Err(EthashError::FullDatasetNotInitialized);
    }
    let mut nonce = start_nonce;
    for _ in 0..iterations {
        let result = context.hash(header_hash, nonce)?;
        if target.is_met_by(&result.final_hash) {
            log::debug!("Full search hit: nonce={} final={}", nonce, result.final_hash);
            return Ok(Some(nonce));
        }
        nonce = nonce.wrapping_add(1);
    }
    Ok(None)
}

/// Cheap pre-check: recompute the final hash from a claimed mix hash and
/// test it against `target`. No dataset access.
pub fn verify_final_hash<T: Target + ?Sized>(
    header_hash: &Hash256,
    mix_hash: &Hash256,
    nonce: u64,
    target: &T,
) -> Result<Hash256> {
    let final_hash = hash_final(&hash_seed(header_hash, nonce), mix_hash);
    if !target.is_met_by(&final_hash) {
        return Err(EthashError::TargetNotMet { final_hash });
    }
    Ok(final_hash)
}

/// Full light-mode verification of a sealed header: the final hash must meet
/// `target` and the claimed mix hash must match the recomputed one.
pub fn verify_light<T: Target + ?Sized>(
    context: &EpochContext,
    header_hash: &Hash256,
    mix_hash: &Hash256,
    nonce: u64,
    target: &T,
) -> Result<()> {
    verify_final_hash(header_hash, mix_hash, nonce, target)?;

    let computed = context.hash_light(header_hash, nonce).mix_hash;
    if computed != *mix_hash {
        return Err(EthashError::InvalidMixHash {
            expected: *mix_hash,
            computed,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_context() -> EpochContext {
        EpochContext::with_parameters(EpochParameters {
            epoch_number: 0,
            cache_items: 16,
            dataset_items: 512,
            seed: seed_hash(0),
        })
        .unwrap()
    }

    /// Target that accepts exactly one nonce in `0..1000`: the one with the
    /// smallest leading word.
    fn unique_target(ctx: &EpochContext, header: &Hash256) -> (u64, u64) {
        let mut scored: Vec<(u64, u64)> = (0..1000u64)
            .map(|n| (ctx.hash_light(header, n).final_hash.leading_u64_be(), n))
            .collect();
        scored.sort();
        assert!(scored[0].0 < scored[1].0, "tie in leading word");
        (scored[0].0, scored[0].1)
    }

    #[test]
    fn test_search_finds_unique_nonce() {
        let mut ctx = small_context();
        let header = Hash256([0x5a; 32]);
        let (target, winner) = unique_target(&ctx, &header);

        assert_eq!(search_light(&ctx, &header, &target, 0, 1000), Some(winner));

        ctx.init_full_dataset().unwrap();
        assert_eq!(search(&mut ctx, &header, &target, 0, 1000).unwrap(), Some(winner));
    }

    #[test]
    fn test_search_disjoint_range_not_found() {
        let mut ctx = small_context();
        let header = Hash256([0x5a; 32]);
        let (target, winner) = unique_target(&ctx, &header);

        // Everything in 0..1000 except the winner.
        assert_eq!(search_light(&ctx, &header, &target, 0, winner as usize), None);
        assert_eq!(
            search_light(&ctx, &header, &target, winner + 1, (999 - winner) as usize),
            None
        );

        ctx.init_full_dataset().unwrap();
        assert_eq!(search(&mut ctx, &header, &target, 0, winner as usize).unwrap(), None);
    }

    #[test]
    fn test_search_zero_nonce_is_found() {
        let ctx = small_context();
        let header = Hash256::ZERO;
        assert_eq!(search_light(&ctx, &header, &u64::MAX, 0, 1), Some(0));
    }

    #[test]
    fn test_search_zero_iterations() {
        let ctx = small_context();
        assert_eq!(search_light(&ctx, &Hash256::ZERO, &u64::MAX, 0, 0), None);
    }

    #[test]
    fn test_search_wraps_nonce() {
        let ctx = small_context();
        let header = Hash256([1; 32]);
        let target = ctx.hash_light(&header, 1).final_hash.leading_u64_be();
        let found = search_light(&ctx, &header, &target, u64::MAX - 1, 4);
        // Candidates are MAX-1, MAX, 0, 1; the first one at or below target wins.
        let expected = [u64::MAX - 1, u64::MAX, 0, 1]
            .into_iter()
            .find(|n| ctx.hash_light(&header, *n).final_hash.leading_u64_be() <= target);
        assert_eq!(found, expected);
        assert!(found.is_some());
    }

    #[test]
    fn test_search_full_requires_dataset() {
        let mut ctx = small_context();
        assert!(matches!(
            search(&mut ctx, &Hash256::ZERO, &u64::MAX, 0, 10),
            Err(EthashError::FullDatasetNotInitialized)
        ));
    }

    #[test]
    fn test_search_with_boundary() {
        let ctx = small_context();
        let header = Hash256([0x33; 32]);
        let (target, winner) = unique_target(&ctx, &header);
        let boundary = Boundary::from_compact(target);
        assert_eq!(search_light(&ctx, &header, &boundary, 0, 1000), Some(winner));
    }

    #[test]
    fn test_verify_light() {
        let ctx = small_context();
        let header = Hash256([0x77; 32]);
        let result = ctx.hash_light(&header, 42);
        let target = result.final_hash.leading_u64_be();

        verify_light(&ctx, &header, &result.mix_hash, 42, &target).unwrap();

        assert!(matches!(
            verify_light(&ctx, &header, &result.mix_hash, 42, &target.wrapping_sub(1)),
            Err(EthashError::TargetNotMet { .. })
        ));

        let forged = Hash256([0; 32]);
        let err = verify_light(&ctx, &header, &forged, 42, &u64::MAX).unwrap_err();
        assert!(matches!(err, EthashError::InvalidMixHash { .. }));
    }

    #[test]
    fn test_verify_final_hash_returns_digest() {
        let ctx = small_context();
        let header = Hash256([0x10; 32]);
        let result = ctx.hash_light(&header, 9);
        let final_hash = verify_final_hash(&header, &result.mix_hash, 9, &u64::MAX).unwrap();
        assert_eq!(final_hash, result.final_hash);
    }
}
