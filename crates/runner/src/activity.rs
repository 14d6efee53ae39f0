//! Market activity - background order flow for paper sessions
//!
//! Drives the simulated exchange so the feed carries realistic traffic:
//! - a fair value that follows a random walk
//! - resting liquidity added a few ticks either side of fair value
//! - market orders that take liquidity
//! - cancellations of earlier background orders
//!
//! Seeded `StdRng` keeps sessions reproducible.

use hermes_core::Side;
use hermes_gateway::{GatewayError, SimulatedExchange};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Configuration for market activity
#[derive(Debug, Clone)]
pub struct MarketActivityConfig {
    pub initial_price: Decimal,
    /// Random walk step as a fraction of price (e.g. 0.0005 = 0.05%)
    pub volatility: f64,
    pub tick_size: Decimal,
    pub max_order_size: Decimal,
    /// Probability per tick of a market order
    pub take_probability: f64,
    /// Probability per tick of a cancellation
    pub cancel_probability: f64,
    pub seed: u64,
}

impl Default for MarketActivityConfig {
    fn default() -> Self {
        Self {
            initial_price: dec!(50000),
            volatility: 0.0005,
            tick_size: dec!(0.01),
            max_order_size: dec!(0.5),
            take_probability: 0.3,
            cancel_probability: 0.2,
            seed: 42,
        }
    }
}

/// What one tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Added { side: Side, price: Decimal, size: Decimal },
    Took { side: Side, executed: Decimal },
    Canceled,
    Idle,
}

/// Generates background order flow
pub struct MarketActivity {
    fair_value: Decimal,
    config: MarketActivityConfig,
    rng: StdRng,
    ticks: u64,
}

impl MarketActivity {
    pub fn new(config: MarketActivityConfig) -> Self {
        Self {
            fair_value: config.initial_price,
            rng: StdRng::seed_from_u64(config.seed),
            config,
            ticks: 0,
        }
    }

    pub fn fair_value(&self) -> Decimal {
        self.fair_value
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance the random walk one step
    pub fn step_fair_value(&mut self) -> Decimal {
        let change: f64 = self.rng.gen_range(-1.0..1.0);
        let multiplier =
            Decimal::from_f64_retain(1.0 + self.config.volatility * change).unwrap_or(Decimal::ONE);
        let next = (self.fair_value * multiplier).round_dp(2);
        if next > Decimal::ZERO {
            self.fair_value = next;
        }
        self.fair_value
    }

    fn random_size(&mut self) -> Decimal {
        let steps = self.rng.gen_range(1..=100);
        (self.config.max_order_size * Decimal::from(steps) / dec!(100)).round_dp(8)
    }

    fn random_side(&mut self) -> Side {
        if self.rng.gen_bool(0.5) {
            Side::Buy
        } else {
            Side::Sell
        }
    }

    /// Price `ticks` ticks away from fair value on the passive side
    fn passive_price(&self, side: Side, ticks: u32) -> Decimal {
        let offset = self.config.tick_size * Decimal::from(ticks);
        match side {
            Side::Buy => self.fair_value - offset,
            Side::Sell => self.fair_value + offset,
        }
    }

    /// Rest `levels` orders on each side around the initial price
    pub async fn seed_book(
        &mut self,
        exchange: &SimulatedExchange,
        levels: u32,
    ) -> Result<(), GatewayError> {
        for level in 1..=levels {
            for side in [Side::Buy, Side::Sell] {
                let size = self.random_size();
                let price = self.passive_price(side, level * 5);
                exchange.add_liquidity(side, price, size).await?;
            }
        }
        info!(
            "[ACTIVITY] Seeded {} levels per side around {}",
            levels, self.fair_value
        );
        Ok(())
    }

    /// Generate and send one action
    pub async fn tick(&mut self, exchange: &SimulatedExchange) -> Result<Activity, GatewayError> {
        self.ticks += 1;
        self.step_fair_value();

        let roll: f64 = self.rng.gen_range(0.0..1.0);
        let side = self.random_side();
        let size = self.random_size();

        let activity = if roll < self.config.take_probability {
            let executed = exchange.take_liquidity(side, size).await?;
            Activity::Took { side, executed }
        } else if roll < self.config.take_probability + self.config.cancel_probability {
            match exchange.cancel_random_liquidity().await? {
                Some(_) => Activity::Canceled,
                None => Activity::Idle,
            }
        } else {
            let ticks = self.rng.gen_range(1..=10);
            let price = self.passive_price(side, ticks);
            match exchange.add_liquidity(side, price, size).await? {
                Some(_) => Activity::Added { side, price, size },
                None => Activity::Idle,
            }
        };

        debug!("[ACTIVITY] Tick {}: {:?}", self.ticks, activity);
        Ok(activity)
    }

    /// Run until shutdown; returns the number of ticks generated
    pub async fn run(
        mut self,
        exchange: Arc<SimulatedExchange>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> u64 {
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.tick(&exchange).await {
                        warn!("[ACTIVITY] Tick failed: {}", e);
                    }
                }
            }
        }

        info!(
            "[ACTIVITY] Stopped after {} ticks, fair value {}",
            self.ticks, self.fair_value
        );
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_gateway::{ChannelPublisher, FeedMessage, SimulatedExchangeConfig, SimulatorFeed};

    fn exchange() -> SimulatedExchange {
        let (publisher, _subscriber) = ChannelPublisher::<FeedMessage>::pair(1024);
        SimulatedExchange::new(
            SimulatedExchangeConfig::default(),
            SimulatorFeed::new(Box::new(publisher), "BTC-USD"),
        )
    }

    #[test]
    fn test_fair_value_random_walk() {
        let mut activity = MarketActivity::new(MarketActivityConfig {
            initial_price: dec!(100),
            ..Default::default()
        });

        for _ in 0..100 {
            activity.step_fair_value();
        }

        // Price should have changed but stay in reasonable range
        let final_val = activity.fair_value();
        assert!(final_val > dec!(50) && final_val < dec!(200));
    }

    #[test]
    fn test_same_seed_same_walk() {
        let mut a = MarketActivity::new(MarketActivityConfig::default());
        let mut b = MarketActivity::new(MarketActivityConfig::default());
        for _ in 0..20 {
            assert_eq!(a.step_fair_value(), b.step_fair_value());
        }
    }

    #[tokio::test]
    async fn test_seed_book_is_two_sided() {
        let exchange = exchange();
        let mut activity = MarketActivity::new(MarketActivityConfig::default());

        activity.seed_book(&exchange, 5).await.unwrap();

        let (bid, ask) = exchange.quote().await;
        assert!(bid.unwrap() < dec!(50000));
        assert!(ask.unwrap() > dec!(50000));
        assert_eq!(exchange.resting_count().await, 10);
    }

    #[tokio::test]
    async fn test_ticks_generate_activity() {
        let exchange = exchange();
        let mut activity = MarketActivity::new(MarketActivityConfig::default());
        activity.seed_book(&exchange, 3).await.unwrap();

        let mut non_idle = 0;
        for _ in 0..50 {
            if activity.tick(&exchange).await.unwrap() != Activity::Idle {
                non_idle += 1;
            }
        }
        assert_eq!(activity.ticks(), 50);
        assert!(non_idle > 0);
    }
}
