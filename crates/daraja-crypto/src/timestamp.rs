//! Gateway timestamps.
//!
//! The gateway expects `YYYYMMDDHHmmss` on a 24-hour clock. The timezone is
//! fixed at construction and never read from the process environment.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};

/// East Africa Time (UTC+03:00, no daylight saving).
pub const EAST_AFRICA_TIME: FixedOffset = match FixedOffset::east_opt(3 * 3600) {
    Some(offset) => offset,
    None => panic!("invalid EAT offset"),
};

/// Gateway timestamp format.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Current time in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant (for tests and replays).
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Produces gateway timestamps in a fixed timezone.
#[derive(Clone)]
pub struct TimestampProvider {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl TimestampProvider {
    /// Create a provider from an explicit clock and offset.
    pub fn new(clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self { clock, offset }
    }

    /// Wall clock in East Africa Time.
    pub fn east_africa() -> Self {
        Self::new(Arc::new(SystemClock), EAST_AFRICA_TIME)
    }

    /// Fixed instant in East Africa Time.
    pub fn fixed(instant: DateTime<Utc>) -> Self {
        Self::new(Arc::new(FixedClock(instant)), EAST_AFRICA_TIME)
    }

    /// The current timestamp as 14 ASCII digits.
    pub fn now(&self) -> String {
        self.format(self.clock.now())
    }

    /// Format an instant in this provider's timezone.
    pub fn format(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }

    /// Seconds since the Unix epoch, used for generated reference numbers.
    pub fn unix_seconds(&self) -> i64 {
        self.clock.now().timestamp()
    }

    /// The configured timezone offset.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Default for TimestampProvider {
    fn default() -> Self {
        Self::east_africa()
    }
}

impl std::fmt::Debug for TimestampProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimestampProvider")
            .field("offset", &self.offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_afternoon_uses_24_hour_clock() {
        // 12:30:05 UTC is 15:30:05 EAT
        let instant = Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 5).unwrap();
        let provider = TimestampProvider::fixed(instant);
        assert_eq!(provider.now(), "20240309153005");
    }

    #[test]
    fn test_rolls_over_to_next_day() {
        let instant = Utc.with_ymd_and_hms(2023, 12, 31, 22, 0, 0).unwrap();
        let provider = TimestampProvider::fixed(instant);
        assert_eq!(provider.now(), "20240101010000");
    }

    #[test]
    fn test_fourteen_digits() {
        let ts = TimestampProvider::east_africa().now();
        assert_eq!(ts.len(), 14);
        assert!(ts.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_custom_offset() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let provider = TimestampProvider::new(
            Arc::new(FixedClock(instant)),
            FixedOffset::east_opt(0).unwrap(),
        );
        assert_eq!(provider.now(), "20240601080000");
    }

    #[test]
    fn test_unix_seconds() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let provider = TimestampProvider::fixed(instant);
        assert_eq!(provider.unix_seconds(), 1_704_067_200);
    }
}
