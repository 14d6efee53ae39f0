use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of an aggregated depth table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: Decimal,
    /// Total resting size at `price`
    pub size: Decimal,
}

impl DepthLevel {
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }

    /// Padding row used when the book has fewer populated levels than the table
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_zero() && self.size.is_zero()
    }
}
