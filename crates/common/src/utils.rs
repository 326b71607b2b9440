use chrono::{DateTime, Utc};

/// Wall-clock time used for history entries and chat messages
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
