use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Nanoseconds in one millisecond.
pub const NANOS_PER_MILLI: i64 = 1_000_000;

/// Largest wire millisecond value that widens to nanoseconds exactly.
/// [`Timestamp::from_millis`] saturates beyond it (and below its negation).
pub const MAX_EXACT_MILLIS: i64 = i64::MAX / NANOS_PER_MILLI;

/// Nanosecond-resolution instant since the UNIX epoch.
///
/// Records keep timestamps in nanoseconds but every wire format carries
/// milliseconds. Encoding truncates with [`Timestamp::as_millis`] and decoding
/// widens with [`Timestamp::from_millis`], so sub-millisecond precision never
/// survives a round trip.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The epoch.
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Widen a wire value. Saturates instead of overflowing on hostile input.
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(NANOS_PER_MILLI))
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX))
    }

    pub const fn as_nanos(&self) -> i64 {
        self.0
    }

    /// The wire value: nanoseconds divided by one million, truncating.
    pub const fn as_millis(&self) -> i64 {
        self.0 / NANOS_PER_MILLI
    }

    /// This instant with the sub-millisecond part dropped, i.e. what a peer
    /// sees after decoding.
    pub const fn truncated_to_millis(&self) -> Self {
        Self::from_millis(self.as_millis())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}ns)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.to_datetime().to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

impl From<i64> for Timestamp {
    fn from(nanos: i64) -> Self {
        Self(nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn millis_conversion_truncates() {
        let ts = Timestamp::from_nanos(1_600_000_000_123_456_789);
        assert_eq!(ts.as_millis(), 1_600_000_000_123);
        assert_eq!(
            ts.truncated_to_millis(),
            Timestamp::from_nanos(1_600_000_000_123_000_000)
        );
    }

    #[test]
    fn from_millis_widens() {
        assert_eq!(Timestamp::from_millis(42).as_nanos(), 42_000_000);
    }

    #[test]
    fn from_millis_saturates() {
        assert_eq!(Timestamp::from_millis(i64::MAX).as_nanos(), i64::MAX);
        assert_eq!(Timestamp::from_millis(i64::MIN).as_nanos(), i64::MIN);
    }

    #[test]
    fn exact_millis_bound() {
        let ts = Timestamp::from_millis(MAX_EXACT_MILLIS);
        assert_eq!(ts.as_millis(), MAX_EXACT_MILLIS);
        assert_eq!(Timestamp::from_millis(ts.as_millis()), ts);
        assert_eq!(Timestamp::from_millis(MAX_EXACT_MILLIS + 1).as_nanos(), i64::MAX);
        assert_eq!(Timestamp::from_millis(-MAX_EXACT_MILLIS).as_millis(), -MAX_EXACT_MILLIS);
    }

    #[test]
    fn now_produces_reasonable_timestamp() {
        // Should be after 2020-01-01 (1577836800000 ms)
        assert!(Timestamp::now().as_millis() > 1_577_836_800_000);
    }

    #[test]
    fn display_is_rfc3339() {
        let ts = Timestamp::from_millis(1_000);
        assert_eq!(format!("{ts}"), "1970-01-01T00:00:01.000Z");
    }

    #[test]
    fn serde_is_plain_integer() {
        let ts = Timestamp::from_nanos(123);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "123");
    }

    proptest! {
        #[test]
        fn aligned_timestamps_survive_millis(ms in -MAX_EXACT_MILLIS..=MAX_EXACT_MILLIS) {
            let ts = Timestamp::from_millis(ms);
            prop_assert_eq!(Timestamp::from_millis(ts.as_millis()), ts);
        }

        #[test]
        fn truncation_never_moves_forward(ns in 0i64..i64::MAX) {
            let ts = Timestamp::from_nanos(ns);
            prop_assert!(ts.truncated_to_millis() <= ts);
            prop_assert!(ts.as_nanos() - ts.truncated_to_millis().as_nanos() < NANOS_PER_MILLI);
        }
    }
}
