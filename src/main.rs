use anyhow::{Context, Result};
use raydium_volume_bot::{
    bot::OrderScheduler,
    config::{self, AppConfig},
    dex::{BotContext, PoolKeys, RpcLedger},
    supervisor, utils,
};
use solana_sdk::signature::Signer;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let cfg = AppConfig::load().context("invalid configuration")?;
    let payer = config::load_payer().context("cannot load wallet")?;
    let pool = PoolKeys::from_file(&cfg.pool_keys_path)
        .with_context(|| format!("cannot load pool keys from {}", cfg.pool_keys_path))?;

    tracing::info!(
        payer = %payer.pubkey(),
        pool = %pool.id,
        rpc_url = %cfg.rpc_url,
        buy_count = cfg.orders.buy_count,
        sell_count = cfg.orders.sell_count,
        interval_ms = cfg.orders.interval.as_millis() as u64,
        repeat_cycles = ?cfg.orders.repeat_cycles,
        slippage_bps = cfg.slippage_bps,
        "[INIT] volume bot starting"
    );

    let ctx = BotContext::new(RpcLedger::new(&cfg.rpc_url), payer, pool, cfg.slippage_bps);
    let mut scheduler = OrderScheduler::new(&ctx, cfg.orders.clone());
    supervisor::supervise(&mut scheduler, cfg.restart_cooldown).await;

    let state = scheduler.state();
    tracing::info!(
        total_placed = state.total_placed,
        cycles = state.cycles_completed,
        "[EXIT] all cycles completed"
    );
    Ok(())
}
