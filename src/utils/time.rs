use chrono::{DateTime, Utc};

/// Ambient clock entry point. Services read the clock once here and
/// pass the timestamp into the pure availability/expiry predicates.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
