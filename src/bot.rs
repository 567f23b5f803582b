//! Order scheduling: interleaved buy/sell cycles executed one at a time.

use crate::dex::{AmountResolver, BotContext, Ledger, TransactionAssembler};
use crate::errors::Result;
use crate::models::{OrderSide, OrderSpec, RunState, SwapOutcome};
use crate::supervisor::{Restartable, RunExit};
use crate::utils::pause;
use tracing::{info, warn};

/// Positional interleave of `buys` buy tokens and `sells` sell tokens:
/// index 0 of each, then index 1 of each, and so on; the longer tail follows.
pub fn interleave(buys: usize, sells: usize) -> Vec<OrderSide> {
    let mut schedule = Vec::with_capacity(buys + sells);
    for i in 0..buys.max(sells) {
        if i < buys {
            schedule.push(OrderSide::Buy);
        }
        if i < sells {
            schedule.push(OrderSide::Sell);
        }
    }
    schedule
}

/// Drives cycles of the configured schedule against one pool.
pub struct OrderScheduler<'a, L> {
    ctx: &'a BotContext<L>,
    spec: OrderSpec,
    state: RunState,
}

impl<'a, L: Ledger> OrderScheduler<'a, L> {
    pub fn new(ctx: &'a BotContext<L>, spec: OrderSpec) -> Self {
        Self {
            ctx,
            spec,
            state: RunState::default(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn cap_reached(&self) -> bool {
        self.spec
            .repeat_cycles
            .is_some_and(|cap| self.state.cycles_completed >= cap)
    }

    async fn place(&self, side: OrderSide, order_no: u64) -> Result<SwapOutcome> {
        let desired = self.spec.amount_for(side);
        info!(order_no, side = side.as_str(), %desired, "[ORDER] creating order");

        let direction = side.direction();
        let amounts = AmountResolver::new(self.ctx)
            .resolve(direction, &desired)
            .await?;
        let outcome = TransactionAssembler::new(self.ctx)
            .execute(direction, &amounts)
            .await?;

        match outcome {
            SwapOutcome::Submitted(signature) => {
                info!(order_no, side = side.as_str(), %signature, "[ORDER] order sent");
            }
            SwapOutcome::NothingToSubmit => {
                warn!(order_no, side = side.as_str(), "[ORDER] nothing to submit");
            }
        }
        Ok(outcome)
    }

    /// Run one full schedule. Any failure aborts the rest of it.
    async fn run_cycle(&mut self) -> Result<()> {
        let schedule = interleave(self.spec.buy_count, self.spec.sell_count);
        info!(
            cycle = self.state.cycles_completed + 1,
            orders = schedule.len(),
            "[SCHEDULE] cycle started"
        );
        for side in schedule {
            let order_no = self.state.record_order();
            self.place(side, order_no).await?;
            pause(self.spec.interval).await;
        }
        let completed = self.state.record_cycle();
        info!(
            completed,
            total_placed = self.state.total_placed,
            "[SCHEDULE] cycle finished"
        );
        Ok(())
    }

    /// Repeat cycles until the cap is reached. Without a cap this only
    /// returns on failure.
    pub async fn run(&mut self) -> Result<RunExit> {
        while !self.cap_reached() {
            self.run_cycle().await?;
        }
        info!(
            cycles = self.state.cycles_completed,
            total_placed = self.state.total_placed,
            "[SCHEDULE] repetition cap reached"
        );
        Ok(RunExit::Done)
    }
}

impl<L: Ledger> Restartable for OrderScheduler<'_, L> {
    async fn run_once(&mut self) -> Result<RunExit> {
        self.run().await
    }
}
