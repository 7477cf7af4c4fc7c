use chrono::Utc;

/// Returns current timestamp in seconds (Unix epoch)
pub fn current_timestamp_seconds() -> i64 {
    Utc::now().timestamp()
}
