//! Leap-second-aware UTC instants.

use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};
use core::str::FromStr;

use crate::date_time;
use crate::{
    DateTimeError, Duration, ParseDateTimeError, RangeError, TaiTime, UtcRules, NANOS_PER_DAY,
};

/// A nanosecond-precision instant on the UTC time scale, including leap
/// seconds.
///
/// An instant is represented as a Modified Julian Day (the number of days
/// since 1858-11-17) and a nanosecond of day. A day normally lasts 86 400
/// seconds, but a leap day, a day at the end of which a positive leap second
/// was inserted, lasts 86 401 seconds. The nanosecond of day of the leap
/// second of a leap day is thus at least 86 400×10⁹, and the instant is
/// written with 60 as the second field, e.g. `1972-12-31T23:59:60Z`.
///
/// Representable instants range from `0000-01-01T00:00:00Z` to
/// `9999-12-31T23:59:59.999999999Z`.
///
/// The length of a day is defined by a [`LeapSecondTable`](crate::LeapSecondTable).
/// All methods of `UtcInstant` which depend on the length of a day use the
/// [builtin](crate::LeapSecondTable::builtin) table; see [`UtcRules`] to use
/// another table.
///
/// Instants are ordered chronologically. Their text representation is the
/// ISO 8601 format `YYYY-MM-DDThh:mm:ss[.fffffffff]Z`, where the fractional
/// part is omitted if zero and otherwise written with 3, 6 or 9 digits. Any
/// fraction of 1 to 9 digits is accepted when parsing.
///
/// # Examples
///
/// ```
/// use leap_time::{Duration, UtcInstant};
///
/// let t: UtcInstant = "1972-12-31T23:59:59.5Z".parse().unwrap();
/// assert_eq!(t.day(), 41_682);
///
/// let t = t + Duration::new(1, 0);
/// assert!(t.is_leap_second());
/// assert_eq!(t.to_string(), "1972-12-31T23:59:60.500Z");
///
/// let t = t + Duration::new(1, 0);
/// assert_eq!(t.to_string(), "1973-01-01T00:00:00.500Z");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UtcInstant {
    /// Modified Julian Day.
    ///
    /// Declared before `nano_of_day` so that the derived ordering is
    /// lexicographical on `(day, nano_of_day)`.
    day: i64,
    nano_of_day: i64,
}

impl UtcInstant {
    /// The Modified Julian Day of 0000-01-01.
    pub const MIN_DAY: i64 = -678_941;

    /// The Modified Julian Day of 9999-12-31.
    pub const MAX_DAY: i64 = 2_973_483;

    /// The earliest representable instant, `0000-01-01T00:00:00Z`.
    pub const MIN: Self = Self {
        day: Self::MIN_DAY,
        nano_of_day: 0,
    };

    /// The latest representable instant, `9999-12-31T23:59:59.999999999Z`.
    pub const MAX: Self = Self {
        day: Self::MAX_DAY,
        nano_of_day: NANOS_PER_DAY - 1,
    };

    /// Creates an instant without validation.
    pub(crate) const fn new_unchecked(day: i64, nano_of_day: i64) -> Self {
        Self { day, nano_of_day }
    }

    /// Creates an instant from a Modified Julian Day and a nanosecond of day.
    ///
    /// Returns an error if the nanosecond of day is negative or not less than
    /// the length of the day, or if the day is outside the representable
    /// range.
    ///
    /// # Examples
    ///
    /// ```
    /// use leap_time::UtcInstant;
    ///
    /// // 1972-12-31 is a leap day.
    /// assert!(UtcInstant::of_day(41_682, 86_400_999_999_999).is_ok());
    /// assert!(UtcInstant::of_day(41_682, 86_401_000_000_000).is_err());
    /// assert!(UtcInstant::of_day(41_681, 86_400_000_000_000).is_err());
    /// ```
    pub fn of_day(day: i64, nano_of_day: i64) -> Result<Self, RangeError> {
        UtcRules::builtin().of_day(day, nano_of_day)
    }

    /// Creates an instant from the components of a UTC date-time.
    ///
    /// The second field may be 60 at 23:59 on a leap day.
    ///
    /// # Examples
    ///
    /// ```
    /// use leap_time::{DateTimeError, UtcInstant};
    ///
    /// let t = UtcInstant::from_date_time(2016, 12, 31, 23, 59, 60, 0).unwrap();
    /// assert_eq!(t.to_string(), "2016-12-31T23:59:60Z");
    ///
    /// assert_eq!(
    ///     UtcInstant::from_date_time(2017, 12, 31, 23, 59, 60, 0),
    ///     Err(DateTimeError::NotALeapDay(58_118))
    /// );
    /// ```
    pub fn from_date_time(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        min: u8,
        sec: u8,
        nano: u32,
    ) -> Result<Self, DateTimeError> {
        UtcRules::builtin().from_date_time(year, month, day, hour, min, sec, nano)
    }

    /// Creates an instant from a TAI timestamp.
    ///
    /// Returns an error if the instant is outside the representable range.
    ///
    /// # Examples
    ///
    /// ```
    /// use leap_time::{MonotonicTime, UtcInstant};
    ///
    /// // 2017-01-01 00:00:36.5 TAI falls within the leap second ending 2016.
    /// let t = UtcInstant::from_tai_time(MonotonicTime::new(1_483_228_836, 500_000_000));
    /// assert_eq!(t.unwrap().to_string(), "2016-12-31T23:59:60.500Z");
    /// ```
    pub fn from_tai_time<const EPOCH_REF: i64>(
        timestamp: TaiTime<EPOCH_REF>,
    ) -> Result<Self, RangeError> {
        UtcRules::builtin().to_utc(timestamp)
    }

    /// Returns the TAI timestamp of this instant.
    ///
    /// Returns an error if the timestamp cannot be represented with the
    /// requested epoch.
    pub fn to_tai_time<const EPOCH_REF: i64>(&self) -> Result<TaiTime<EPOCH_REF>, RangeError> {
        UtcRules::builtin().to_tai(*self)
    }

    /// Returns the Modified Julian Day.
    pub const fn day(&self) -> i64 {
        self.day
    }

    /// Returns the number of nanoseconds elapsed since the start of the day.
    pub const fn nano_of_day(&self) -> i64 {
        self.nano_of_day
    }

    /// Returns `true` if this instant lies within a leap second.
    pub const fn is_leap_second(&self) -> bool {
        self.nano_of_day >= NANOS_PER_DAY
    }

    /// Returns a copy of this instant moved to another day.
    ///
    /// Returns an error if the nanosecond of day does not fit in the new day.
    pub fn with_day(&self, day: i64) -> Result<Self, RangeError> {
        UtcRules::builtin().with_day(*self, day)
    }

    /// Returns a copy of this instant with another nanosecond of day.
    pub fn with_nano_of_day(&self, nano_of_day: i64) -> Result<Self, RangeError> {
        UtcRules::builtin().with_nano_of_day(*self, nano_of_day)
    }

    /// Adds a signed duration, accounting for leap seconds.
    ///
    /// Returns [`RangeError::Overflow`] if the result is outside the
    /// representable range.
    ///
    /// # Examples
    ///
    /// ```
    /// use leap_time::{Duration, UtcInstant};
    ///
    /// let t: UtcInstant = "2016-12-31T12:00:00Z".parse().unwrap();
    /// let t = t.checked_add(Duration::new(86_400, 0)).unwrap();
    /// assert_eq!(t.to_string(), "2017-01-01T11:59:59Z");
    /// assert!(UtcInstant::MAX.checked_add(Duration::new(0, 1)).is_err());
    /// ```
    pub fn checked_add(self, duration: Duration) -> Result<Self, RangeError> {
        UtcRules::builtin().checked_add(self, duration)
    }

    /// Subtracts a signed duration, accounting for leap seconds.
    ///
    /// Returns [`RangeError::Overflow`] if the result is outside the
    /// representable range.
    pub fn checked_sub(self, duration: Duration) -> Result<Self, RangeError> {
        UtcRules::builtin().checked_sub(self, duration)
    }

    /// Returns the number of elapsed SI seconds since an earlier instant,
    /// which is negative if `earlier` is in the future.
    ///
    /// # Examples
    ///
    /// ```
    /// use leap_time::{Duration, UtcInstant};
    ///
    /// let t0: UtcInstant = "2016-12-31T23:59:59Z".parse().unwrap();
    /// let t1: UtcInstant = "2017-01-01T00:00:00Z".parse().unwrap();
    /// assert_eq!(t1.duration_since(t0), Duration::new(2, 0));
    /// ```
    pub fn duration_since(self, earlier: Self) -> Duration {
        UtcRules::builtin().duration_between(earlier, self)
    }

    /// Creates an instant from a `chrono::DateTime`.
    ///
    /// A leap second, represented by `chrono` with a nanosecond field of at
    /// least one second at the end of 23:59:59, is only accepted on a leap
    /// day.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::DateTime;
    /// use leap_time::UtcInstant;
    ///
    /// let date_time = DateTime::parse_from_rfc3339("2016-12-31T23:59:60.25Z").unwrap();
    /// let t = UtcInstant::from_chrono_date_time(&date_time).unwrap();
    /// assert_eq!(t.to_string(), "2016-12-31T23:59:60.250Z");
    /// ```
    #[cfg(feature = "chrono")]
    pub fn from_chrono_date_time<Tz: chrono::TimeZone>(
        date_time: &chrono::DateTime<Tz>,
    ) -> Result<Self, RangeError> {
        use chrono::{Datelike, Timelike};

        let date_time = date_time.naive_utc();
        let day = i64::from(date_time.date().num_days_from_ce()) - CE_DAY_1_FROM_MJD_EPOCH;
        let secs = i64::from(date_time.time().num_seconds_from_midnight());
        let nanos = i64::from(date_time.time().nanosecond());
        let nano_of_day = secs * crate::NANOS_PER_SEC as i64 + nanos;

        // `chrono` allows a leap second at the end of any minute.
        if nanos >= crate::NANOS_PER_SEC as i64 && secs != crate::SECS_PER_DAY - 1 {
            return Err(RangeError::NanoOfDay { day, nano_of_day });
        }

        Self::of_day(day, nano_of_day)
    }

    /// Returns a `chrono::DateTime` for this instant.
    ///
    /// A leap second is represented by `chrono` as 23:59:59 with a nanosecond
    /// field of at least one second.
    ///
    /// Returns an error if the date is outside the range supported by
    /// `chrono`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{NaiveDate, Timelike};
    /// use leap_time::UtcInstant;
    ///
    /// let t: UtcInstant = "2016-12-31T23:59:60.25Z".parse().unwrap();
    /// let date_time = t.to_chrono_date_time().unwrap();
    /// assert_eq!(
    ///     date_time.date_naive(),
    ///     NaiveDate::from_ymd_opt(2016, 12, 31).unwrap()
    /// );
    /// assert_eq!(date_time.second(), 59);
    /// assert_eq!(date_time.nanosecond(), 1_250_000_000);
    /// ```
    #[cfg(feature = "chrono")]
    pub fn to_chrono_date_time(&self) -> Result<chrono::DateTime<chrono::Utc>, RangeError> {
        let days_from_ce = i32::try_from(self.day + CE_DAY_1_FROM_MJD_EPOCH)
            .map_err(|_| RangeError::Overflow)?;
        let date =
            chrono::NaiveDate::from_num_days_from_ce_opt(days_from_ce).ok_or(RangeError::Overflow)?;

        let nanos_per_sec = crate::NANOS_PER_SEC as i64;
        let (secs, nanos) = if self.is_leap_second() {
            (
                crate::SECS_PER_DAY - 1,
                self.nano_of_day - NANOS_PER_DAY + nanos_per_sec,
            )
        } else {
            (
                self.nano_of_day / nanos_per_sec,
                self.nano_of_day % nanos_per_sec,
            )
        };
        let time = chrono::NaiveTime::from_num_seconds_from_midnight_opt(secs as u32, nanos as u32)
            .ok_or(RangeError::Overflow)?;

        Ok(chrono::DateTime::from_naive_utc_and_offset(
            chrono::NaiveDateTime::new(date, time),
            chrono::Utc,
        ))
    }
}

/// Day number of 0001-01-01 in `chrono`'s count of days from the common era,
/// i.e. 1, expressed relative to the Modified Julian Day epoch.
#[cfg(feature = "chrono")]
const CE_DAY_1_FROM_MJD_EPOCH: i64 = 678_576;

impl Add<Duration> for UtcInstant {
    type Output = Self;

    /// Adds a duration to an instant.
    ///
    /// # Panics
    ///
    /// This function panics if the resulting instant cannot be
    /// represented. See [`UtcInstant::checked_add`] for a panic-free version.
    fn add(self, other: Duration) -> Self {
        self.checked_add(other)
            .expect("overflow when adding duration to UTC instant")
    }
}

impl Sub<Duration> for UtcInstant {
    type Output = Self;

    /// Subtracts a duration from an instant.
    ///
    /// # Panics
    ///
    /// This function panics if the resulting instant cannot be
    /// represented. See [`UtcInstant::checked_sub`] for a panic-free version.
    fn sub(self, other: Duration) -> Self {
        self.checked_sub(other)
            .expect("overflow when subtracting duration from UTC instant")
    }
}

impl AddAssign<Duration> for UtcInstant {
    /// Increments the instant by a duration.
    ///
    /// # Panics
    ///
    /// This function panics if the resulting instant cannot be represented.
    fn add_assign(&mut self, other: Duration) {
        *self = *self + other;
    }
}

impl SubAssign<Duration> for UtcInstant {
    /// Decrements the instant by a duration.
    ///
    /// # Panics
    ///
    /// This function panics if the resulting instant cannot be represented.
    fn sub_assign(&mut self, other: Duration) {
        *self = *self - other;
    }
}

impl fmt::Display for UtcInstant {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        date_time::write_utc_date_time(fmt, self.day, self.nano_of_day)
    }
}

impl FromStr for UtcInstant {
    type Err = ParseDateTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UtcRules::builtin().parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for UtcInstant {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for UtcInstant {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de;

        struct UtcInstantVisitor;

        impl<'de> de::Visitor<'de> for UtcInstantVisitor {
            type Value = UtcInstant;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an ISO 8601 UTC date-time string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<UtcInstant, E> {
                value.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(UtcInstantVisitor)
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for UtcInstant {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let table = crate::LeapSecondTable::builtin();

        // Leap days are rare, so pick one half of the time.
        let day = if bool::arbitrary(g) {
            g.choose(&table.entries()[1..])
                .map_or(0, |entry| entry.day - 1)
        } else {
            i64::arbitrary(g).rem_euclid(Self::MAX_DAY - Self::MIN_DAY + 1) + Self::MIN_DAY
        };
        // Instants near the start and the end of a day get their share.
        let nano_of_day = match u8::arbitrary(g) % 4 {
            0 => i64::from(u32::arbitrary(g)),
            1 => table.day_length_nanos(day) - 1 - i64::from(u32::arbitrary(g)),
            _ => i64::arbitrary(g).rem_euclid(table.day_length_nanos(day)),
        };

        Self::new_unchecked(day, nano_of_day)
    }
}
