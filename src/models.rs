//! Shared data structures used throughout the application.

use bigdecimal::BigDecimal;
use solana_sdk::signature::Signature;
use std::time::Duration;

/// Which side of the pool is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Spend the quote currency, receive base.
    Inbound,
    /// Spend the base currency, receive quote.
    Outbound,
}

/// Schedule token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn direction(self) -> Direction {
        match self {
            OrderSide::Buy => Direction::Inbound,
            OrderSide::Sell => Direction::Outbound,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

/// How sell orders are sized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SellSizing {
    /// Every sell uses `SELL_ORDER_AMOUNT`.
    Fixed(BigDecimal),
    /// Every sell unwinds an equal share of the cycle's buy volume.
    Proportional,
}

/// Per-cycle order configuration.
#[derive(Debug, Clone)]
pub struct OrderSpec {
    pub buy_count: usize,
    pub sell_count: usize,
    /// Buy size in quote display units.
    pub buy_amount: BigDecimal,
    pub sell_sizing: SellSizing,
    /// Pause after every order.
    pub interval: Duration,
    /// `None` repeats forever.
    pub repeat_cycles: Option<u64>,
}

impl OrderSpec {
    /// Desired trade size in quote display units for one order of `side`.
    pub fn amount_for(&self, side: OrderSide) -> BigDecimal {
        match (side, &self.sell_sizing) {
            (OrderSide::Buy, _) => self.buy_amount.clone(),
            (OrderSide::Sell, SellSizing::Fixed(amount)) => amount.clone(),
            (OrderSide::Sell, SellSizing::Proportional) => {
                if self.sell_count == 0 {
                    return BigDecimal::from(0u32);
                }
                &self.buy_amount * BigDecimal::from(self.buy_count as u64)
                    / BigDecimal::from(self.sell_count as u64)
            }
        }
    }
}

/// Process-lifetime counters. Only ever incremented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunState {
    pub total_placed: u64,
    pub cycles_completed: u64,
}

impl RunState {
    pub fn record_order(&mut self) -> u64 {
        self.total_placed += 1;
        self.total_placed
    }

    pub fn record_cycle(&mut self) -> u64 {
        self.cycles_completed += 1;
        self.cycles_completed
    }
}

/// Amounts for one swap, in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapAmounts {
    pub amount_in: u64,
    pub min_amount_out: u64,
}

/// Result of a swap attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    Submitted(Signature),
    NothingToSubmit,
}
