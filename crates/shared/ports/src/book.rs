use rust_decimal::Decimal;

/// Read access to the price-level order book.
///
/// The book itself is maintained outside the order core; the ledger only
/// reads best prices and per-price aggregated sizes from it.
pub trait PriceLevelBook: Send + Sync {
    /// Highest resting bid price
    fn best_bid(&self) -> Option<Decimal>;

    /// Lowest resting ask price
    fn best_ask(&self) -> Option<Decimal>;

    /// Top `n` bid levels as (price, total size), highest price first
    fn top_bids(&self, n: usize) -> Vec<(Decimal, Decimal)>;

    /// Top `n` ask levels as (price, total size), lowest price first
    fn top_asks(&self, n: usize) -> Vec<(Decimal, Decimal)>;
}
