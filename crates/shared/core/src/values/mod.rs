use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Size value - uses Decimal so fills subtract exactly
pub type Size = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Exchange-assigned order identifier
pub type OrderId = String;

/// Traded product, e.g. `BTC-USD`
pub type InstrumentId = String;
