//! gda-sim - run one auction end to end against the simulated pool manager.
//!
//! Each epoch receives `swaps_per_epoch` swaps spread evenly across it:
//! buys of `buy_amount` numeraire, and with `sell_probability` a sell of
//! half the asset bought so far. After `ending_time` the authority
//! migrates and the receipt is printed.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use gda_engine::engine::SwapDirection;
use gda_engine::settings::Settings;
use gda_engine::types::price::{asset_price, from_atomic_trimmed};
use gda_engine::{telemetry, Address, AuctionRegistry, PoolKey, PoolManager, SimulatedPoolManager, SwapParams};

const DEFAULT_SETTINGS: &str = r#"
[auction]
token_decimals = 18
num_tokens_to_sell = "100000"
minimum_proceeds = "100"
maximum_proceeds = "10000"
starting_time = 1000
ending_time = 87400
starting_tick = 1600
ending_tick = -171200
epoch_length = 400
gamma = 800
is_token0 = true
num_price_discovery_slugs = 3

[pool]
fee = 3000
tick_spacing = 8

[simulation]
swaps_per_epoch = 1
buy_amount = "2"
sell_probability = 0.2
"#;

#[derive(Debug, Parser)]
#[command(name = "gda-sim", version, about = "Simulate a gradual Dutch auction")]
struct Args {
    /// Settings file (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override `simulation.swaps_per_epoch`
    #[arg(long)]
    swaps_per_epoch: Option<u32>,

    /// Override `simulation.seed`
    #[arg(long)]
    seed: Option<u64>,

    /// Override `logging.filter`
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::from_toml_str(DEFAULT_SETTINGS)?,
    };
    if let Some(n) = args.swaps_per_epoch {
        settings.simulation.swaps_per_epoch = n;
    }
    if let Some(seed) = args.seed {
        settings.simulation.seed = seed;
    }
    if let Some(filter) = args.log {
        settings.logging.filter = filter;
    }
    telemetry::init(&settings.logging);

    let config = settings.auction_config()?;
    let buy_amount = settings.buy_amount()?;
    let decimals = settings.auction.token_decimals;
    let sim = &settings.simulation;

    let authority = Address::repeat_byte(0xA1);
    let recipient = Address::repeat_byte(0xB0);
    let numeraire = Address::repeat_byte(0x02);
    // Pick the asset address so it sorts on the configured side
    let asset = if config.is_token0 {
        Address::repeat_byte(0x01)
    } else {
        Address::repeat_byte(0x03)
    };
    let key = PoolKey::new(
        asset,
        numeraire,
        settings.pool.fee,
        settings.pool.tick_spacing,
        Address::repeat_byte(0xAA),
    );

    let mut registry: AuctionRegistry<SimulatedPoolManager> =
        AuctionRegistry::new(SimulatedPoolManager::new(), authority);
    let pool_id = registry.create(authority, key, config, config.starting_time)?;

    let mut rng = ChaCha8Rng::seed_from_u64(sim.seed);
    let sell_probability = sim.sell_probability.clamp(0.0, 1.0);
    let swaps = sim.swaps_per_epoch.max(1) as u64;
    let spacing = (config.epoch_length / swaps).max(1);
    let mut held: u128 = 0;
    let mut rejected = 0u64;

    for epoch in 0..config.total_epochs() {
        let epoch_start = config.starting_time + epoch * config.epoch_length;
        for i in 0..swaps {
            let now = epoch_start + i * spacing;
            let params = if held > 1 && rng.gen_bool(sell_probability) {
                SwapParams::exact_in(config.is_token0, held / 2)
            } else {
                SwapParams::exact_in(!config.is_token0, buy_amount)
            };

            match registry.swap(&pool_id, &params, now) {
                Ok(outcome) => match outcome.report.entry.direction {
                    SwapDirection::Buy => held += outcome.report.entry.asset,
                    SwapDirection::Sell => held = held.saturating_sub(outcome.report.entry.asset),
                },
                Err(err) => {
                    rejected += 1;
                    warn!(epoch = epoch + 1, now, error = %err, "swap rejected");
                }
            }
        }

        if let Some(auction) = registry.get(&pool_id) {
            let slot0 = registry.pool_manager().slot0(&pool_id)?;
            let (floor, ceiling) = auction.global_range();
            info!(
                epoch = epoch + 1,
                tick = slot0.tick,
                floor,
                ceiling,
                price = %asset_price(&slot0.sqrt_price_x96, config.is_token0).unwrap_or_default(),
                sold = %auction.total_tokens_sold(),
                proceeds = %auction.total_proceeds(),
                "epoch closed"
            );
        }
    }

    let sold = registry
        .get(&pool_id)
        .map(|auction| auction.total_tokens_sold().max(0) as u128)
        .unwrap_or(0);
    let proceeds = registry.get(&pool_id).map(|auction| auction.total_proceeds()).unwrap_or(0);

    println!("===========================================");
    println!("  gda-sim - auction summary");
    println!("===========================================");
    println!("  Pool:      {}", pool_id);
    println!("  Sold:      {}", from_atomic_trimmed(sold, decimals).unwrap_or_default());
    println!("  Proceeds:  {}", from_atomic_trimmed(proceeds, decimals).unwrap_or_default());
    println!("  Rejected:  {} swaps", rejected);

    match registry.migrate(&pool_id, authority, recipient, config.ending_time) {
        Ok(receipt) => {
            println!("  Migrated:  yes");
            println!("  Principal: {} / {}", receipt.principal0, receipt.principal1);
            println!("  Fees:      {} / {}", receipt.fees0, receipt.fees1);
            println!("  Root:      0x{}", receipt.state_root_hex());
        }
        Err(err) => {
            println!("  Migrated:  no ({})", err);
        }
    }
    Ok(())
}
