//! Signed durations.

use core::fmt;
use core::ops::{Add, Neg, Sub};

use crate::{RangeError, NANOS_PER_SEC};

/// A signed, nanosecond-precision span of time.
///
/// A duration is represented as a signed number of seconds and a positive
/// number of nanoseconds, the latter always pointing towards the future, as
/// for [`TaiTime`](crate::TaiTime) timestamps. A duration of minus one
/// nanosecond is thus represented as -1 second and 999 999 999 nanoseconds.
///
/// # Examples
///
/// ```
/// use leap_time::Duration;
///
/// let d = Duration::new(0, -1);
/// assert_eq!(d.as_secs(), -1);
/// assert_eq!(d.subsec_nanos(), 999_999_999);
/// assert_eq!(d.as_nanos(), -1);
///
/// assert_eq!(Duration::new(1, 1_500_000_000), Duration::new(2, 500_000_000));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Duration {
    /// Whole seconds, rounded towards `-∞`.
    ///
    /// Declared before `nanos` so that the derived ordering is
    /// lexicographical on `(secs, nanos)`.
    secs: i64,
    nanos: u32,
}

impl Duration {
    /// A null duration.
    pub const ZERO: Self = Self { secs: 0, nanos: 0 };

    /// The most negative representable duration.
    pub const MIN: Self = Self {
        secs: i64::MIN,
        nanos: 0,
    };

    /// The most positive representable duration.
    pub const MAX: Self = Self {
        secs: i64::MAX,
        nanos: NANOS_PER_SEC - 1,
    };

    /// Creates a duration from a number of seconds and a signed number of
    /// nanoseconds, which may exceed one second in either direction.
    ///
    /// # Panics
    ///
    /// This constructor will panic if the normalized number of seconds
    /// overflows. See [`Duration::checked_new`] for a panic-free version.
    pub const fn new(secs: i64, nanos: i64) -> Self {
        match Self::checked_new(secs, nanos) {
            Some(duration) => duration,
            None => panic!("overflow when normalizing duration"),
        }
    }

    /// Creates a duration from a number of seconds and a signed number of
    /// nanoseconds, returning `None` if the normalized number of seconds
    /// overflows.
    pub const fn checked_new(secs: i64, nanos: i64) -> Option<Self> {
        let carry = nanos.div_euclid(NANOS_PER_SEC as i64);
        let nanos = nanos.rem_euclid(NANOS_PER_SEC as i64) as u32;

        match secs.checked_add(carry) {
            Some(secs) => Some(Self { secs, nanos }),
            None => None,
        }
    }

    /// Creates a duration from a whole number of seconds.
    pub const fn from_secs(secs: i64) -> Self {
        Self { secs, nanos: 0 }
    }

    /// Creates a duration from a signed number of nanoseconds.
    pub const fn from_nanos(nanos: i64) -> Self {
        Self::new(0, nanos)
    }

    /// Creates a duration from a signed number of nanoseconds, returning
    /// `None` if it cannot be represented.
    pub const fn checked_from_nanos_i128(nanos: i128) -> Option<Self> {
        let secs = nanos.div_euclid(NANOS_PER_SEC as i128);
        let nanos = nanos.rem_euclid(NANOS_PER_SEC as i128) as u32;

        if secs < i64::MIN as i128 || secs > i64::MAX as i128 {
            return None;
        }

        Some(Self {
            secs: secs as i64,
            nanos,
        })
    }

    /// Returns the number of whole seconds, rounded towards `-∞`.
    pub const fn as_secs(&self) -> i64 {
        self.secs
    }

    /// Returns the sub-second fractional part in nanoseconds, which always
    /// points towards the future.
    pub const fn subsec_nanos(&self) -> u32 {
        self.nanos
    }

    /// Returns the total number of nanoseconds.
    pub const fn as_nanos(&self) -> i128 {
        self.secs as i128 * NANOS_PER_SEC as i128 + self.nanos as i128
    }

    /// Returns `true` if the duration is strictly negative.
    pub const fn is_negative(&self) -> bool {
        self.secs < 0
    }

    /// Adds two durations, returning `None` on overflow.
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        Self::checked_from_nanos_i128(self.as_nanos() + rhs.as_nanos())
    }

    /// Subtracts two durations, returning `None` on overflow.
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        Self::checked_from_nanos_i128(self.as_nanos() - rhs.as_nanos())
    }

    /// Negates the duration, returning `None` on overflow.
    pub const fn checked_neg(self) -> Option<Self> {
        Self::checked_from_nanos_i128(-self.as_nanos())
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(other)
            .expect("overflow when adding durations")
    }
}

impl Sub for Duration {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(other)
            .expect("overflow when subtracting durations")
    }
}

impl Neg for Duration {
    type Output = Self;

    fn neg(self) -> Self {
        self.checked_neg().expect("overflow when negating duration")
    }
}

impl TryFrom<core::time::Duration> for Duration {
    type Error = RangeError;

    fn try_from(duration: core::time::Duration) -> Result<Self, RangeError> {
        let secs = i64::try_from(duration.as_secs()).map_err(|_| RangeError::Overflow)?;

        Ok(Self {
            secs,
            nanos: duration.subsec_nanos(),
        })
    }
}

impl fmt::Display for Duration {
    /// Formats the duration as a signed decimal number of seconds.
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.as_nanos();
        let sign = if nanos < 0 { "-" } else { "" };
        let nanos = nanos.unsigned_abs();
        let secs = nanos / NANOS_PER_SEC as u128;
        let frac = (nanos % NANOS_PER_SEC as u128) as u32;

        write!(fmt, "{}{}", sign, secs)?;
        crate::date_time::write_fraction(fmt, frac)?;
        "s".fmt(fmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization() {
        assert_eq!(Duration::new(0, 1), Duration { secs: 0, nanos: 1 });
        assert_eq!(
            Duration::new(0, -1),
            Duration {
                secs: -1,
                nanos: 999_999_999
            }
        );
        assert_eq!(
            Duration::new(-3, 2_000_000_001),
            Duration { secs: -1, nanos: 1 }
        );
        assert_eq!(Duration::new(5, -5_000_000_000), Duration::ZERO);
        assert_eq!(Duration::checked_new(i64::MAX, 1_000_000_000), None);
        assert_eq!(Duration::checked_new(i64::MIN, -1), None);
    }

    #[test]
    #[should_panic]
    fn new_overflow() {
        let _ = Duration::new(i64::MAX, NANOS_PER_SEC as i64);
    }

    #[test]
    fn arithmetic() {
        let a = Duration::new(10, 900_000_000);
        let b = Duration::new(2, 200_000_000);

        assert_eq!(a + b, Duration::new(13, 100_000_000));
        assert_eq!(b - a, Duration::new(-8, -700_000_000));
        assert_eq!(-a, Duration::new(-11, 100_000_000));
        assert!((b - a).is_negative());
        assert_eq!(Duration::MAX.checked_add(Duration::new(0, 1)), None);
        assert_eq!(Duration::MIN.checked_neg(), None);
    }

    #[test]
    fn from_std() {
        assert_eq!(
            Duration::try_from(core::time::Duration::new(3, 5)),
            Ok(Duration::new(3, 5))
        );
        assert_eq!(
            Duration::try_from(core::time::Duration::MAX),
            Err(RangeError::Overflow)
        );
    }

    #[cfg(feature = "std")]
    #[test]
    fn display() {
        assert_eq!(Duration::new(86_400, 0).to_string(), "86400s");
        assert_eq!(Duration::new(0, -1).to_string(), "-0.000000001s");
        assert_eq!(Duration::new(-2, 500_000_000).to_string(), "-1.500s");
        assert_eq!(Duration::new(1, 250_000).to_string(), "1.000250s");
    }
}
