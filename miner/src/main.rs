mod worker;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use ethash_config::config::{Config, ConfigArgs};
use ethash_core::{
    Boundary, EpochContext, EpochParameters, Hash256, HashResult, Target, epoch_of,
    find_epoch_number, search, search_light, verify_light,
};
use parking_lot::Mutex;

#[derive(Parser, Debug)]
#[command(author, version, about = "Ethash hashing, verification and CPU nonce search", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct EpochArgs {
    /// Epoch number
    #[arg(long, conflicts_with_all = ["block", "seed"])]
    epoch: Option<u32>,

    /// Block number (epoch = block / 30000)
    #[arg(long, conflicts_with = "seed")]
    block: Option<u64>,

    /// Epoch seed hash, as sent by pools
    #[arg(long)]
    seed: Option<Hash256>,
}

impl EpochArgs {
    fn resolve(&self) -> Result<u32> {
        match (self.epoch, self.block, &self.seed) {
            (Some(epoch), _, _) => Ok(epoch),
            (_, Some(block), _) => Ok(epoch_of(block)),
            (_, _, Some(seed)) => {
                find_epoch_number(seed).ok_or_else(|| anyhow!("no known epoch has seed {seed}"))
            }
            _ => bail!("one of --epoch, --block or --seed is required"),
        }
    }
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// Compact target: leading 64 bits of the final hash must be <= this (decimal or 0x-hex)
    #[arg(long, value_parser = parse_u64, required_unless_present = "boundary")]
    target: Option<u64>,

    /// Full 256-bit boundary (hex)
    #[arg(long, conflicts_with = "target")]
    boundary: Option<Hash256>,
}

impl TargetArgs {
    fn target(&self) -> Box<dyn Target + Send + Sync> {
        match (self.target, &self.boundary) {
            (_, Some(boundary)) => Box::new(Boundary::from_hash(boundary)),
            (Some(target), None) => Box::new(target),
            (None, None) => Box::new(u64::MAX),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print epoch parameters
    Info {
        #[command(flatten)]
        epoch: EpochArgs,
    },
    /// Hash one header/nonce pair
    Hash {
        #[command(flatten)]
        epoch: EpochArgs,
        #[arg(long)]
        header: Hash256,
        #[arg(long, value_parser = parse_u64)]
        nonce: u64,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Verify a sealed header in light mode
    Verify {
        #[command(flatten)]
        epoch: EpochArgs,
        #[arg(long)]
        header: Hash256,
        #[arg(long, value_parser = parse_u64)]
        nonce: u64,
        #[arg(long)]
        mix: Hash256,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Search a nonce range for a hash meeting the target
    Search {
        #[command(flatten)]
        epoch: EpochArgs,
        #[arg(long)]
        header: Hash256,
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long, value_parser = parse_u64, default_value = "0")]
        start: u64,
        #[arg(long, value_parser = parse_u64, default_value = "1000000")]
        iterations: u64,
    },
}

fn parse_u64(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number {s:?}: {e}"))
}

fn init_logging(cfg: &Config) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cfg.log_level))
        .format_timestamp_millis()
        .init();
}

fn open_context(epoch: u32, cfg: &Config) -> Result<EpochContext> {
    let mut ctx = EpochContext::new(epoch)
        .with_context(|| format!("failed to create epoch {epoch} context"))?;
    if cfg.prewarm {
        ctx.prewarm_full_dataset()
            .context("failed to prewarm the full dataset")?;
    } else if cfg.full_dataset {
        ctx.init_full_dataset()
            .context("failed to allocate the full dataset")?;
    }
    Ok(ctx)
}

fn print_result(result: &HashResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("final_hash: {}", result.final_hash);
        println!("mix_hash:   {}", result.mix_hash);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = cli
        .config
        .resolve()
        .context("failed to load configuration")?;
    init_logging(&cfg);
    log::debug!("Configuration: {:?}", cfg);

    match cli.command {
        Command::Info { epoch } => {
            let params = EpochParameters::for_epoch(epoch.resolve()?)?;
            println!("epoch:         {}", params.epoch_number);
            println!("seed:          {}", params.seed);
            println!("cache:         {} bytes ({} items)", params.cache_bytes(), params.cache_items);
            println!(
                "full dataset:  {} bytes ({} items)",
                params.dataset_bytes(),
                params.dataset_items
            );
        }
        Command::Hash { epoch, header, nonce, json } => {
            let mut ctx = open_context(epoch.resolve()?, &cfg)?;
            let result = if ctx.has_full_dataset() {
                ctx.hash(&header, nonce)?
            } else {
                ctx.hash_light(&header, nonce)
            };
            print_result(&result, json)?;
        }
        Command::Verify { epoch, header, nonce, mix, target } => {
            let ctx = EpochContext::new(epoch.resolve()?)?;
            let target = target.target();
            verify_light(&ctx, &header, &mix, nonce, &*target)?;
            println!("valid");
        }
        Command::Search { epoch, header, target, start, iterations } => {
            let ctx = open_context(epoch.resolve()?, &cfg)?;
            run_search(ctx, &cfg, &header, &*target.target(), start, iterations)?;
        }
    }
    Ok(())
}

fn run_search(
    ctx: EpochContext,
    cfg: &Config,
    header: &Hash256,
    target: &(dyn Target + Send + Sync),
    start: u64,
    iterations: u64,
) -> Result<()> {
    log::info!(
        "Searching {} nonces from {} on {} thread(s), {} mode",
        iterations,
        start,
        cfg.threads,
        if ctx.has_full_dataset() { "full" } else { "light" }
    );

    let (outcome, result) = if ctx.has_full_dataset() {
        // Lazy dataset fills need exclusive access; workers take turns per batch.
        let shared = Mutex::new(ctx);
        let outcome = worker::drive(cfg.threads, start, iterations, cfg.batch_size, |nonce, len| {
            search(&mut shared.lock(), header, target, nonce, len)
        })?;
        let result = match outcome.nonce {
            Some(nonce) => Some(shared.lock().hash(header, nonce)?),
            None => None,
        };
        (outcome, result)
    } else {
        let outcome = worker::drive(cfg.threads, start, iterations, cfg.batch_size, |nonce, len| {
            Ok(search_light(&ctx, header, target, nonce, len))
        })?;
        let result = outcome.nonce.map(|nonce| ctx.hash_light(header, nonce));
        (outcome, result)
    };

    log::info!(
        "Hashed {} nonces in {:.2?} ({:.1} H/s)",
        outcome.hashes,
        outcome.elapsed,
        outcome.hashrate()
    );

    match (outcome.nonce, result) {
        (Some(nonce), Some(result)) => {
            println!("nonce:      {nonce:#018x}");
            print_result(&result, false)?;
        }
        _ => println!("not found"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u64() {
        assert_eq!(parse_u64("42"), Ok(42));
        assert_eq!(parse_u64("0x2a"), Ok(42));
        assert!(parse_u64("0xzz").is_err());
    }

    #[test]
    fn test_cli_parses_search() {
        let cli = Cli::try_parse_from([
            "ethash-miner",
            "search",
            "--block",
            "60000",
            "--header",
            "0x2a8de2adf89af77358250bf908bf04ba94a6e8c3ba87775564a41d269a05e4ce",
            "--target",
            "0x0000ffffffffffff",
            "--threads",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.config.threads, Some(2));
        match cli.command {
            Command::Search { epoch, target, start, .. } => {
                assert_eq!(epoch.resolve().unwrap(), 2);
                assert_eq!(target.target, Some(0x0000_ffff_ffff_ffff));
                assert_eq!(start, 0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_epoch_from_seed() {
        let args = EpochArgs {
            epoch: None,
            block: None,
            seed: Some(ethash_core::seed_hash(3)),
        };
        assert_eq!(args.resolve().unwrap(), 3);
    }
}
