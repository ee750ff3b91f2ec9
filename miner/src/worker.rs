// Multi-threaded nonce search over disjoint batches
use anyhow::{Result, anyhow};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct SearchOutcome {
    pub nonce: Option<u64>,
    pub hashes: u64,
    pub elapsed: Duration,
}

impl SearchOutcome {
    pub fn hashrate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 { self.hashes as f64 / secs } else { 0.0 }
    }
}

/// Scan `iterations` nonces from `start_nonce` with `threads` workers.
///
/// Workers claim `batch_size` slices in increasing order and hand each to
/// `run_batch(first_nonce, len)`. Once a hit is known, slices past it are
/// skipped but earlier ones still finish, so the reported nonce is the first
/// match in the range, as with a sequential scan.
pub fn drive<F>(
    threads: usize,
    start_nonce: u64,
    iterations: u64,
    batch_size: u64,
    run_batch: F,
) -> Result<SearchOutcome>
where
    F: Fn(u64, usize) -> ethash_core::Result<Option<u64>> + Sync,
{
    let threads = threads.max(1);
    let batch = batch_size.max(1);
    let iterations = iterations.min(u64::MAX / 2);

    let next = AtomicU64::new(0);
    let best = AtomicU64::new(u64::MAX);
    let hashes = AtomicU64::new(0);
    let started = Instant::now();

    let worker = || -> ethash_core::Result<()> {
        loop {
            let offset = next.fetch_add(batch, Ordering::Relaxed);
            if offset >= iterations || offset > best.load(Ordering::Relaxed) {
                return Ok(());
            }
            let len = batch.min(iterations - offset);
            match run_batch(start_nonce.wrapping_add(offset), len as usize)? {
                Some(found) => {
                    let found_offset = found.wrapping_sub(start_nonce);
                    hashes.fetch_add(found_offset - offset + 1, Ordering::Relaxed);
                    best.fetch_min(found_offset, Ordering::Relaxed);
                    log::debug!("Worker hit at nonce {}", found);
                    return Ok(());
                }
                None => {
                    hashes.fetch_add(len, Ordering::Relaxed);
                }
            }
        }
    };

    thread::scope(|scope| -> Result<()> {
        let handles: Vec<_> = (0..threads).map(|_| scope.spawn(worker)).collect();
        for handle in handles {
            handle
                .join()
                .map_err(|_| anyhow!("search worker panicked"))??;
        }
        Ok(())
    })?;

    let best = best.load(Ordering::Relaxed);
    Ok(SearchOutcome {
        nonce: (best != u64::MAX).then(|| start_nonce.wrapping_add(best)),
        hashes: hashes.load(Ordering::Relaxed),
        elapsed: started.elapsed(),
    })
}
