//! Transport configuration

/// Subjects for logical message routing
///
/// Even with tokio channels, we use logical subject names for:
/// - Clear message categorization
/// - Easy migration to a websocket transport later
/// - Debugging and logging
pub struct Subjects;

impl Subjects {
    /// Full-channel feed for a specific instrument: `full.BTC-USD`
    pub fn full_channel(instrument: &str) -> String {
        format!("full.{}", instrument)
    }
}
