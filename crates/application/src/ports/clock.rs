//! Clock port

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Token stores compute entry deadlines from it and the client uses it to
/// decide which webhook subscriptions are close to expiry.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
