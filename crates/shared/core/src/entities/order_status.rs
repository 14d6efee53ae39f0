use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an owned order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Resting on the book (or accepted and not yet resting)
    Open,
    /// Exchange reported the order done with reason `filled`
    Filled,
    /// Exchange reported the order done with reason `canceled`
    Canceled,
    /// Remaining size reached zero through matches
    Done,
}

impl OrderStatus {
    /// Returns true if no further stream events are expected for the order
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Open)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Filled => "filled",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Done => "done",
        }
    }

    /// Map an exchange order record status onto the ledger status.
    ///
    /// Exchange records use `open`, `pending`, `active` and `done`; a done
    /// record carries a `done_reason`.
    pub fn from_exchange(status: &str, done_reason: Option<&str>) -> Self {
        match status {
            "done" | "settled" => match done_reason {
                Some("filled") => OrderStatus::Filled,
                Some("canceled") => OrderStatus::Canceled,
                _ => OrderStatus::Done,
            },
            "filled" => OrderStatus::Filled,
            "canceled" => OrderStatus::Canceled,
            _ => OrderStatus::Open,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_exchange() {
        assert_eq!(OrderStatus::from_exchange("open", None), OrderStatus::Open);
        assert_eq!(OrderStatus::from_exchange("pending", None), OrderStatus::Open);
        assert_eq!(
            OrderStatus::from_exchange("done", Some("filled")),
            OrderStatus::Filled
        );
        assert_eq!(
            OrderStatus::from_exchange("done", Some("canceled")),
            OrderStatus::Canceled
        );
        assert_eq!(OrderStatus::from_exchange("done", None), OrderStatus::Done);
    }

    #[test]
    fn test_terminal() {
        assert!(!OrderStatus::Open.is_terminal());
        assert!(OrderStatus::Done.is_terminal());
        assert!(OrderStatus::Canceled.is_terminal());
    }
}
