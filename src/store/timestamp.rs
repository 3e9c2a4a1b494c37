use std::cmp::Ordering;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A point in time with nanosecond precision, as assigned by the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        let mut timestamp = Self { seconds, nanos };
        timestamp.normalize();
        timestamp
    }

    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            seconds: now.timestamp(),
            nanos: now.timestamp_subsec_nanos() as i32,
        }
    }

    /// Renders the timestamp as an RFC 3339 string with millisecond precision,
    /// or `None` when it falls outside the representable date range.
    pub fn to_rfc3339(&self) -> Option<String> {
        let nanos = self.nanos.clamp(0, 999_999_999) as u32;
        DateTime::<Utc>::from_timestamp(self.seconds, nanos)
            .map(|datetime| datetime.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    fn normalize(&mut self) {
        let extra_seconds = self.nanos.div_euclid(1_000_000_000);
        self.seconds += extra_seconds as i64;
        self.nanos = self.nanos.rem_euclid(1_000_000_000);
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.seconds.cmp(&other.seconds) {
            Ordering::Equal => self.nanos.cmp(&other.nanos),
            ordering => ordering,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_nanoseconds() {
        let timestamp = Timestamp::new(1, 1_500_000_000);
        assert_eq!(timestamp.seconds, 2);
        assert_eq!(timestamp.nanos, 500_000_000);
    }

    #[test]
    fn ordering() {
        let earlier = Timestamp::new(5, 100);
        let later = Timestamp::new(5, 101);
        assert!(earlier < later);
        assert!(Timestamp::new(6, 0) > later);
    }

    #[test]
    fn rfc3339_rendering() {
        let timestamp = Timestamp::new(0, 0);
        assert_eq!(
            timestamp.to_rfc3339().as_deref(),
            Some("1970-01-01T00:00:00.000Z")
        );
    }
}
