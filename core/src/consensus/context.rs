// Epoch context: one light cache plus an optional, lazily filled full dataset

use super::dag::{FullDataset, build_cache, calculate_dataset_item};
use super::epoch::EpochParameters;
use super::hashimoto::{HashResult, hashimoto};
use crate::crypto::{Hash256, Hash512};
use crate::error::{EthashError, Result};
use std::time::Instant;

/// Owns everything needed to hash for one epoch.
///
/// Building the cache is the expensive part, so a context should be created
/// once per epoch and reused across hash / search calls. Light-mode hashing
/// only borrows the context immutably and can be shared between threads.
/// Full-mode hashing fills the dataset lazily and therefore needs `&mut`;
/// callers sharing one full-mode context across threads wrap it in a lock.
/// Dropping the context releases the cache and the dataset.
pub struct EpochContext {
    parameters: EpochParameters,
    cache: Box<[Hash512]>,
    full_dataset: Option<FullDataset>,
}

impl EpochContext {
    /// Build the context for a standard epoch. Fails only if the epoch is
    /// out of range or the cache buffer cannot be allocated.
    pub fn new(epoch_number: u32) -> Result<Self> {
        Self::with_parameters(EpochParameters::for_epoch(epoch_number)?)
    }

    /// Build a context for explicit parameters (non-standard sizes are
    /// accepted, which keeps test datasets small).
    pub fn with_parameters(parameters: EpochParameters) -> Result<Self> {
        if parameters.cache_items == 0 {
            return Err(EthashError::InvalidParameters("cache must hold at least one item".into()));
        }
        if parameters.dataset_items < 2 || parameters.dataset_items % 2 != 0 {
            return Err(EthashError::InvalidParameters(format!(
                "dataset item count must be a positive even number, got {}",
                parameters.dataset_items
            )));
        }
        if parameters.dataset_items as u64 > u32::MAX as u64 + 1 {
            return Err(EthashError::InvalidParameters(format!(
                "dataset item count {} exceeds 32-bit indexing",
                parameters.dataset_items
            )));
        }

        let started = Instant::now();
        let cache = build_cache(&parameters.seed, parameters.cache_items)?;
        log::info!(
            "Epoch {} context ready: cache {} items ({} KiB) in {:.2?}, dataset {} items",
            parameters.epoch_number,
            parameters.cache_items,
            parameters.cache_bytes() >> 10,
            started.elapsed(),
            parameters.dataset_items,
        );

        Ok(EpochContext {
            parameters,
            cache,
            full_dataset: None,
        })
    }

    pub fn epoch_number(&self) -> u32 {
        self.parameters.epoch_number
    }

    pub fn parameters(&self) -> &EpochParameters {
        &self.parameters
    }

    pub fn cache(&self) -> &[Hash512] {
        &self.cache
    }

    pub fn full_dataset(&self) -> Option<&FullDataset> {
        self.full_dataset.as_ref()
    }

    pub fn has_full_dataset(&self) -> bool {
        self.full_dataset.is_some()
    }

    /// Allocate the full dataset with every item marked not-generated.
    ///
    /// Idempotent. On allocation failure the context is left exactly as it
    /// was (still usable in light mode).
    pub fn init_full_dataset(&mut self) -> Result<()> {
        if self.full_dataset.is_none() {
            self.full_dataset = Some(FullDataset::allocate(self.parameters.dataset_items)?);
            log::info!(
                "Epoch {} full dataset allocated ({} MiB)",
                self.parameters.epoch_number,
                self.parameters.dataset_bytes() >> 20
            );
        }
        Ok(())
    }

    /// Initialize the full dataset if needed and generate every item up
    /// front in parallel, instead of on first access.
    pub fn prewarm_full_dataset(&mut self) -> Result<()> {
        self.init_full_dataset()?;
        let started = Instant::now();
        if let Some(dataset) = self.full_dataset.as_mut() {
            dataset.generate_all(&self.cache);
        }
        log::info!(
            "Epoch {} full dataset prewarmed in {:.2?}",
            self.parameters.epoch_number,
            started.elapsed()
        );
        Ok(())
    }

    /// Dataset item `index` from the full dataset, generated on first access
    pub fn dataset_item(&mut self, index: u32) -> Result<Hash512> {
        let dataset = self
            .full_dataset
            .as_mut()
            .ok_or(EthashError::FullDatasetNotInitialized)?;
        dataset.try_item(&self.cache, index)
    }

    /// Hash in light mode: dataset items are recomputed from the cache
    pub fn hash_light(&self, header_hash: &Hash256, nonce: u64) -> HashResult {
        let cache = &self.cache[..];
        hashimoto(header_hash, nonce, self.parameters.light_pages(), |index| {
            calculate_dataset_item(cache, index)
        })
    }

    /// Hash in full mode against the (lazily filled) full dataset.
    /// Rejects with `FullDatasetNotInitialized` if `init_full_dataset` was
    /// never called.
    pub fn hash(&mut self, header_hash: &Hash256, nonce: u64) -> Result<HashResult> {
        let pages = self.parameters.light_pages();
        let cache = &self.cache[..];
        let dataset = self
            .full_dataset
            .as_mut()
            .ok_or(EthashError::FullDatasetNotInitialized)?;
        Ok(hashimoto(header_hash, nonce, pages, |index| dataset.item(cache, index)))
    }
}
