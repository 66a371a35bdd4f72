//! Leap-second-free TAI timestamps.

use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};
use core::str::FromStr;

use crate::date_time::{self, UNIX_EPOCH_FROM_YEAR_0};
use crate::{
    DateTimeError, Duration, ParseDateTimeError, RangeError, UtcInstant, UtcRules, NANOS_PER_SEC,
    SECS_PER_DAY,
};

/// A [`TaiTime`] alias using an epoch set at 1970-01-01 00:00:00 TAI.
///
/// The epoch of this timestamp coincides with the PTP epoch as defined by the
/// IEEE 1588-2008 standard, and with the
/// [`TAI64`](https://cr.yp.to/libtai/tai64.html) epoch. It is, however,
/// distinct from the Unix epoch, which is set at 1970-01-01 00:00:00 UTC.
pub type MonotonicTime = TaiTime<0>;

/// A [`TaiTime`] alias using the Global Positioning System (GPS) epoch.
///
/// This timestamp is relative to 1980-01-06 00:00:19 TAI (1980-01-06 00:00:00
/// UTC).
pub type GpsTime = TaiTime<315_964_819>;

/// A [`TaiTime`] alias using an epoch set at 1958-01-01 00:00:00 TAI.
///
/// See also [`TaiInstant`], the canonical alias used by the UTC conversions
/// of this crate.
pub type Tai1958Time = TaiTime<-378_691_200>;

/// The TAI counterpart of a [`UtcInstant`]: a number of elapsed SI seconds
/// since 1958-01-01 00:00:00 TAI.
///
/// # Examples
///
/// ```
/// use leap_time::{TaiInstant, UtcInstant};
///
/// // The leap second at the end of 1972-12-31 and the first second of 1973
/// // are distinct TAI seconds.
/// let leap = UtcInstant::of_day(41_682, 86_400_000_000_000).unwrap();
/// let next = UtcInstant::of_day(41_683, 0).unwrap();
///
/// let tai_leap = TaiInstant::from_utc_instant(leap).unwrap();
/// let tai_next = TaiInstant::from_utc_instant(next).unwrap();
/// assert_eq!(tai_next.as_secs() - tai_leap.as_secs(), 1);
/// assert_eq!(tai_leap.to_utc_instant(), Ok(leap));
/// ```
pub type TaiInstant = Tai1958Time;

/// Nanosecond-precision monotonic clock timestamp parametrized by the epoch.
///
/// A timestamp specifies a [TAI] point in time. It is represented as a 64-bit
/// signed number of seconds and a positive number of nanoseconds counted with
/// reference to the epoch specified by the generic parameter. Days are always
/// 86 400 seconds long on the TAI scale.
///
/// The `EPOCH_REF` generic parameter defines the epoch via its signed distance
/// in seconds from 1970-01-01 00:00:00 TAI.
///
/// [TAI]: https://en.wikipedia.org/wiki/International_Atomic_Time
///
/// # Examples
///
/// ```
/// use leap_time::{Duration, TaiTime};
///
/// // A timestamp type with an epoch at 1970:01:01 00:02:03 TAI.
/// type MyCustomTime = TaiTime<123>;
///
/// // A timestamp set to 2009-02-13 23:33:33.333333333 TAI.
/// let mut timestamp = MyCustomTime::new(1_234_567_890, 333_333_333);
///
/// // Increment the timestamp by 123.456s.
/// timestamp += Duration::new(123, 456_000_000);
///
/// assert_eq!(timestamp, MyCustomTime::new(1_234_568_013, 789_333_333));
/// assert_eq!(timestamp.as_secs(), 1_234_568_013);
/// assert_eq!(timestamp.subsec_nanos(), 789_333_333);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaiTime<const EPOCH_REF: i64> {
    /// The number of whole seconds in the future (if positive) or in the past
    /// (if negative) of the epoch.
    ///
    /// Note that the automatic derivation of `PartialOrd` relies on
    /// lexicographical comparison so the `secs` field must appear before
    /// `nanos` in declaration order to be given higher priority.
    secs: i64,
    /// The sub-second number of nanoseconds in the future of the point in time
    /// defined by `secs`.
    nanos: u32,
}

impl<const EPOCH_REF: i64> TaiTime<EPOCH_REF> {
    /// The reference epoch, which by definition is always a null timestamp.
    pub const EPOCH: Self = Self { secs: 0, nanos: 0 };

    /// The minimum possible `TaiTime` timestamp.
    pub const MIN: Self = Self {
        secs: i64::MIN,
        nanos: 0,
    };

    /// The maximum possible `TaiTime` timestamp.
    pub const MAX: Self = Self {
        secs: i64::MAX,
        nanos: NANOS_PER_SEC - 1,
    };

    /// Creates a timestamp relative to the epoch.
    ///
    /// The number of seconds is for dates in the past of the epoch. The number
    /// of nanoseconds is always positive and always points towards the future.
    ///
    /// # Panics
    ///
    /// This constructor will panic if the number of nanoseconds is greater than
    /// or equal to 1 second.
    pub const fn new(secs: i64, subsec_nanos: u32) -> Self {
        assert!(
            subsec_nanos < NANOS_PER_SEC,
            "invalid number of nanoseconds"
        );

        Self {
            secs,
            nanos: subsec_nanos,
        }
    }

    /// Creates a timestamp from the date-time components of the TAI calendar.
    ///
    /// The year is the proleptic Gregorian year, with the ISO 8601
    /// interpretation of year 0 as year 1 BC. Since TAI has no leap seconds,
    /// the second field must be less than 60.
    ///
    /// # Examples
    ///
    /// ```
    /// use leap_time::{MonotonicTime, TaiInstant};
    ///
    /// assert_eq!(
    ///     MonotonicTime::try_from_date_time(1970, 1, 1, 0, 0, 1, 5),
    ///     Ok(MonotonicTime::new(1, 5))
    /// );
    /// assert_eq!(
    ///     TaiInstant::try_from_date_time(1958, 1, 2, 0, 0, 0, 0),
    ///     Ok(TaiInstant::new(86_400, 0))
    /// );
    /// ```
    pub const fn try_from_date_time(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        min: u8,
        sec: u8,
        nano: u32,
    ) -> Result<Self, DateTimeError> {
        if month < 1 || month > 12 {
            return Err(DateTimeError::InvalidMonth(month));
        }
        if day < 1 || day > date_time::days_in_month(year as i64, month) {
            return Err(DateTimeError::InvalidDayOfMonth(day));
        }
        if hour > 23 {
            return Err(DateTimeError::InvalidHour(hour));
        }
        if min > 59 {
            return Err(DateTimeError::InvalidMinute(min));
        }
        if sec > 59 {
            return Err(DateTimeError::InvalidSecond(sec));
        }
        if nano >= NANOS_PER_SEC {
            return Err(DateTimeError::InvalidNanosecond(nano));
        }

        let days = date_time::days_from_year_0(year as i64)
            + date_time::day_of_year(year as i64, month, day) as i64
            - UNIX_EPOCH_FROM_YEAR_0;
        let secs =
            days * SECS_PER_DAY + hour as i64 * 3600 + min as i64 * 60 + sec as i64;

        match secs.checked_sub(EPOCH_REF) {
            Some(secs) => Ok(Self { secs, nanos: nano }),
            None => Err(DateTimeError::OutOfRange),
        }
    }

    /// Creates a timestamp from a UTC instant using the builtin leap second
    /// table.
    ///
    /// See [`UtcRules::to_tai`] to use another table.
    ///
    /// Returns an error if the timestamp is outside the representable range.
    pub fn from_utc_instant(instant: UtcInstant) -> Result<Self, RangeError> {
        UtcRules::builtin().to_tai(instant)
    }

    /// Returns the UTC instant corresponding to this timestamp according to the
    /// builtin leap second table.
    ///
    /// See [`UtcRules::to_utc`] to use another table.
    ///
    /// Returns an error if the instant is outside the representable range of
    /// [`UtcInstant`].
    pub fn to_utc_instant(&self) -> Result<UtcInstant, RangeError> {
        UtcRules::builtin().to_utc(*self)
    }

    /// Returns the number of whole seconds relative to the
    /// [`EPOCH`](TaiTime::EPOCH).
    ///
    /// Consistently with the interpretation of seconds and nanoseconds in the
    /// [`new()`](TaiTime::new) constructor, seconds are always rounded towards
    /// `-∞`.
    pub const fn as_secs(&self) -> i64 {
        self.secs
    }

    /// Returns the sub-second fractional part in nanoseconds.
    ///
    /// Note that nanoseconds always point towards the future even if the date
    /// is in the past of the [`EPOCH`](TaiTime::EPOCH).
    pub const fn subsec_nanos(&self) -> u32 {
        self.nanos
    }

    /// Returns a timestamp with a different reference epoch.
    ///
    /// Returns an error if the new timestamp is outside the representable
    /// range.
    ///
    /// # Examples
    ///
    /// ```
    /// use leap_time::{GpsTime, MonotonicTime};
    ///
    /// // Set the date to 2000-01-01 00:00:00 TAI.
    /// let timestamp = MonotonicTime::new(946_684_800, 0);
    ///
    /// // Convert to a GPS timestamp.
    /// let gps_timestamp: GpsTime = timestamp.to_tai_time().unwrap();
    /// assert_eq!(
    ///     gps_timestamp,
    ///     GpsTime::new(630_719_981, 0)
    /// );
    /// ```
    pub const fn to_tai_time<const OTHER_EPOCH_REF: i64>(
        &self,
    ) -> Result<TaiTime<OTHER_EPOCH_REF>, RangeError> {
        if let Some(epoch_diff) = EPOCH_REF.checked_sub(OTHER_EPOCH_REF) {
            if let Some(secs) = self.secs.checked_add(epoch_diff) {
                return Ok(TaiTime {
                    secs,
                    nanos: self.nanos,
                });
            }
        }

        Err(RangeError::Overflow)
    }

    /// Adds a signed duration to a timestamp, checking for overflow.
    ///
    /// Returns `None` if overflow occurred.
    ///
    /// # Examples
    ///
    /// ```
    /// use leap_time::{Duration, MonotonicTime};
    ///
    /// let timestamp = MonotonicTime::new(1_234_567_890, 987_654_321);
    /// assert!(timestamp.checked_add(Duration::new(10, 123_456_789)).is_some());
    /// assert!(timestamp.checked_add(Duration::MAX).is_none());
    /// ```
    pub const fn checked_add(self, rhs: Duration) -> Option<Self> {
        // The addition is carried out on 128 bits since the intermediate sum
        // of the seconds may overflow even though the normalized timestamp
        // does not.
        let mut secs = self.secs as i128 + rhs.as_secs() as i128;
        let mut nanos = self.nanos + rhs.subsec_nanos();
        if nanos >= NANOS_PER_SEC {
            secs += 1;
            nanos -= NANOS_PER_SEC;
        }

        if secs < i64::MIN as i128 || secs > i64::MAX as i128 {
            return None;
        }

        Some(Self {
            secs: secs as i64,
            nanos,
        })
    }

    /// Subtracts a signed duration from a timestamp, checking for overflow.
    ///
    /// Returns `None` if overflow occurred.
    ///
    /// # Examples
    ///
    /// ```
    /// use leap_time::{Duration, MonotonicTime};
    ///
    /// let timestamp = MonotonicTime::new(1_234_567_890, 987_654_321);
    /// assert!(timestamp.checked_sub(Duration::new(10, 123_456_789)).is_some());
    /// assert!(timestamp.checked_sub(Duration::MAX).is_some());
    /// assert!(timestamp.checked_sub(Duration::MIN).is_none());
    /// ```
    pub const fn checked_sub(self, rhs: Duration) -> Option<Self> {
        let mut secs = self.secs as i128 - rhs.as_secs() as i128;
        let nanos = if self.nanos < rhs.subsec_nanos() {
            secs -= 1;
            (self.nanos + NANOS_PER_SEC) - rhs.subsec_nanos()
        } else {
            self.nanos - rhs.subsec_nanos()
        };

        if secs < i64::MIN as i128 || secs > i64::MAX as i128 {
            return None;
        }

        Some(Self {
            secs: secs as i64,
            nanos,
        })
    }

    /// Computes the signed duration elapsed since an earlier (or later)
    /// timestamp.
    ///
    /// # Panics
    ///
    /// Panics if the duration cannot be represented. See
    /// [`TaiTime::checked_duration_since`] for a panic-free version.
    ///
    /// # Examples
    ///
    /// ```
    /// use leap_time::{Duration, MonotonicTime};
    ///
    /// let timestamp_earlier = MonotonicTime::new(1_234_567_879, 987_654_321);
    /// let timestamp_later = MonotonicTime::new(1_234_567_900, 123_456_789);
    /// assert_eq!(
    ///     timestamp_later.duration_since(timestamp_earlier),
    ///     Duration::new(20, 135_802_468)
    /// );
    /// assert_eq!(
    ///     timestamp_earlier.duration_since(timestamp_later),
    ///     Duration::new(-20, -135_802_468)
    /// );
    /// ```
    pub const fn duration_since(self, earlier: Self) -> Duration {
        if let Some(duration) = self.checked_duration_since(earlier) {
            return duration;
        }

        panic!("overflow when computing the duration between timestamps");
    }

    /// Computes the signed duration elapsed since another timestamp.
    ///
    /// Returns `None` if the duration cannot be represented.
    pub const fn checked_duration_since(self, earlier: Self) -> Option<Duration> {
        let secs = self.secs as i128 - earlier.secs as i128;
        let nanos = self.nanos as i128 - earlier.nanos as i128;

        Duration::checked_from_nanos_i128(secs * NANOS_PER_SEC as i128 + nanos)
    }
}

impl<const EPOCH_REF: i64> Add<Duration> for TaiTime<EPOCH_REF> {
    type Output = Self;

    /// Adds a duration to a timestamp.
    ///
    /// # Panics
    ///
    /// This function panics if the resulting timestamp cannot be
    /// represented. See [`TaiTime::checked_add`] for a panic-free
    /// version.
    fn add(self, other: Duration) -> Self {
        self.checked_add(other)
            .expect("overflow when adding duration to timestamp")
    }
}

impl<const EPOCH_REF: i64> Sub<Duration> for TaiTime<EPOCH_REF> {
    type Output = Self;

    /// Subtracts a duration from a timestamp.
    ///
    /// # Panics
    ///
    /// This function panics if the resulting timestamp cannot be
    /// represented. See [`TaiTime::checked_sub`] for a panic-free
    /// version.
    fn sub(self, other: Duration) -> Self {
        self.checked_sub(other)
            .expect("overflow when subtracting duration from timestamp")
    }
}

impl<const EPOCH_REF: i64> AddAssign<Duration> for TaiTime<EPOCH_REF> {
    /// Increments the timestamp by a duration.
    ///
    /// # Panics
    ///
    /// This function panics if the resulting timestamp cannot be represented.
    fn add_assign(&mut self, other: Duration) {
        *self = *self + other;
    }
}

impl<const EPOCH_REF: i64> SubAssign<Duration> for TaiTime<EPOCH_REF> {
    /// Decrements the timestamp by a duration.
    ///
    /// # Panics
    ///
    /// This function panics if the resulting timestamp cannot be represented.
    fn sub_assign(&mut self, other: Duration) {
        *self = *self - other;
    }
}

impl<const EPOCH_REF: i64> fmt::Display for TaiTime<EPOCH_REF> {
    /// Formats the timestamp as a TAI calendar date-time, e.g.
    /// `1972-01-01 00:00:10.5`.
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs_from_year_0 = self.secs as i128
            + EPOCH_REF as i128
            + UNIX_EPOCH_FROM_YEAR_0 as i128 * SECS_PER_DAY as i128;
        let days = secs_from_year_0.div_euclid(SECS_PER_DAY as i128) as i64;
        let sec_of_day = secs_from_year_0.rem_euclid(SECS_PER_DAY as i128) as i64;

        date_time::write_tai_date_time(fmt, days, sec_of_day, self.nanos)
    }
}

impl<const EPOCH_REF: i64> FromStr for TaiTime<EPOCH_REF> {
    type Err = ParseDateTimeError;

    /// Parses an RFC3339-like TAI date-time with signed years, such as
    /// `2001-02-03 04:05:06.789` or `-0044-03-15T12:00:00`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month, day, hour, min, sec, nano) = date_time::parse_tai_date_time(s)?;

        Self::try_from_date_time(year, month, day, hour, min, sec, nano)
            .map_err(ParseDateTimeError::RangeError)
    }
}
