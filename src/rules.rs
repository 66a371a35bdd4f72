//! Conversion and arithmetic rules of the UTC time scale.

use crate::date_time;
use crate::{
    DateTimeError, Duration, LeapSecondTable, ParseDateTimeError, RangeError, Tai1958Time,
    TaiTime, UtcInstant, NANOS_PER_DAY, NANOS_PER_SEC, SECS_PER_DAY,
};

/// Modified Julian Day of 1958-01-01, the epoch of [`Tai1958Time`].
const TAI_1958_EPOCH_MJD: i64 = 36_204;

/// The rules of the UTC time scale, as defined by a [`LeapSecondTable`].
///
/// `UtcRules` is a cheap, copyable handle over a borrowed table which
/// provides all operations whose outcome depends on the length of UTC days:
/// validation of [`UtcInstant`]s, duration arithmetic and conversion to and
/// from the TAI scale. The inherent methods of [`UtcInstant`] delegate to
/// [`UtcRules::builtin`].
///
/// # Examples
///
/// ```
/// use leap_time::{Duration, LeapSecondTable, UtcRules};
///
/// // A hypothetical leap second at the end of 2030-06-30 (MJD 62_682).
/// let table = LeapSecondTable::builtin().with_leap_day(62_682).unwrap();
/// let rules = UtcRules::new(&table);
///
/// let t = rules.parse("2030-06-30T23:59:59.5Z").unwrap();
/// let t = rules.checked_add(t, Duration::new(1, 0)).unwrap();
/// assert_eq!(t.to_string(), "2030-06-30T23:59:60.500Z");
///
/// // The builtin rules know nothing about this leap second.
/// assert!(UtcRules::builtin().parse("2030-06-30T23:59:60Z").is_err());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UtcRules<'a> {
    table: &'a LeapSecondTable,
}

impl<'a> UtcRules<'a> {
    /// Creates rules based on the provided leap second table.
    pub const fn new(table: &'a LeapSecondTable) -> Self {
        Self { table }
    }

    /// Returns the table of these rules.
    pub const fn table(&self) -> &'a LeapSecondTable {
        self.table
    }

    /// Creates an instant from a Modified Julian Day and a nanosecond of day.
    ///
    /// Returns an error if the day is outside the representable range, or if
    /// the nanosecond of day is negative or not less than the length of the
    /// day.
    pub fn of_day(&self, day: i64, nano_of_day: i64) -> Result<UtcInstant, RangeError> {
        if !(UtcInstant::MIN_DAY..=UtcInstant::MAX_DAY).contains(&day) {
            return Err(RangeError::Day(day));
        }
        if nano_of_day < 0 || nano_of_day >= self.table.day_length_nanos(day) {
            return Err(RangeError::NanoOfDay { day, nano_of_day });
        }

        Ok(UtcInstant::new_unchecked(day, nano_of_day))
    }

    /// Creates an instant from the components of a UTC date-time.
    ///
    /// The second field may be 60 at 23:59 on a leap day.
    #[allow(clippy::too_many_arguments)]
    pub fn from_date_time(
        &self,
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        min: u8,
        sec: u8,
        nano: u32,
    ) -> Result<UtcInstant, DateTimeError> {
        if !(0..=9999).contains(&year) {
            return Err(DateTimeError::OutOfRange);
        }
        if !(1..=12).contains(&month) {
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
        if sec > 60 || (sec == 60 && (hour != 23 || min != 59)) {
            return Err(DateTimeError::InvalidSecond(sec));
        }
        if nano >= NANOS_PER_SEC {
            return Err(DateTimeError::InvalidNanosecond(nano));
        }

        let mjd = date_time::date_to_mjd(year as i64, month, day);
        if sec == 60 && !self.table.is_leap_day(mjd) {
            return Err(DateTimeError::NotALeapDay(mjd));
        }
        let sec_of_day = i64::from(hour) * 3600 + i64::from(min) * 60 + i64::from(sec);

        Ok(UtcInstant::new_unchecked(
            mjd,
            sec_of_day * NANOS_PER_SEC as i64 + i64::from(nano),
        ))
    }

    /// Parses an ISO 8601 UTC date-time such as `1972-12-31T23:59:60.5Z`.
    ///
    /// See [`UtcInstant`] for the accepted format.
    pub fn parse(&self, s: &str) -> Result<UtcInstant, ParseDateTimeError> {
        let (year, month, day, hour, min, sec, nano) = date_time::parse_utc_date_time(s)?;

        self.from_date_time(year, month, day, hour, min, sec, nano)
            .map_err(ParseDateTimeError::RangeError)
    }

    /// Returns a copy of the instant moved to another day, with the same
    /// nanosecond of day.
    ///
    /// Returns an error if the nanosecond of day does not fit in the new day,
    /// which is the case when moving a leap second to an ordinary day.
    pub fn with_day(&self, instant: UtcInstant, day: i64) -> Result<UtcInstant, RangeError> {
        self.of_day(day, instant.nano_of_day())
    }

    /// Returns a copy of the instant with another nanosecond of day.
    pub fn with_nano_of_day(
        &self,
        instant: UtcInstant,
        nano_of_day: i64,
    ) -> Result<UtcInstant, RangeError> {
        self.of_day(instant.day(), nano_of_day)
    }

    /// Adds a signed duration to an instant.
    ///
    /// The duration is a number of elapsed SI seconds: crossing the end of a
    /// leap day consumes 86 401 seconds rather than 86 400.
    ///
    /// Returns [`RangeError::Overflow`] if the result is outside the
    /// representable range.
    pub fn checked_add(
        &self,
        instant: UtcInstant,
        duration: Duration,
    ) -> Result<UtcInstant, RangeError> {
        let (mut day, mut nanos) = (
            instant.day(),
            i128::from(instant.nano_of_day()) + duration.as_nanos(),
        );
        let nanos_per_day = i128::from(NANOS_PER_DAY);
        let nanos_per_leap_day = nanos_per_day + i128::from(NANOS_PER_SEC);

        // Carry whole days forward. Runs of ordinary days are skipped in bulk,
        // leap days are stepped over one at a time.
        while nanos >= i128::from(self.table.day_length_nanos(day)) {
            let ordinary_days = self
                .table
                .next_leap_day(day)
                .map_or(i128::MAX, |leap_day| i128::from(leap_day - day));
            if ordinary_days > 0 {
                let days = (nanos / nanos_per_day).min(ordinary_days);
                nanos -= days * nanos_per_day;
                day = checked_day(i128::from(day) + days)?;
            } else {
                trace!("carrying over the leap second of day {}", day);
                nanos -= nanos_per_leap_day;
                day = checked_day(i128::from(day) + 1)?;
            }
        }

        // Borrow whole days backward.
        while nanos < 0 {
            let prev_day = checked_day(i128::from(day) - 1)?;
            let ordinary_days = self
                .table
                .previous_leap_day(prev_day)
                .map_or(i128::MAX, |leap_day| i128::from(prev_day - leap_day));
            if ordinary_days > 0 {
                let days = ((nanos_per_day - 1 - nanos) / nanos_per_day).min(ordinary_days);
                nanos += days * nanos_per_day;
                day = checked_day(i128::from(day) - days)?;
            } else {
                trace!("borrowing the leap second of day {}", prev_day);
                nanos += nanos_per_leap_day;
                day = prev_day;
            }
        }

        // The loops above leave `nanos` within the length of `day`.
        self.of_day(day, nanos as i64)
    }

    /// Subtracts a signed duration from an instant.
    ///
    /// Returns [`RangeError::Overflow`] if the result is outside the
    /// representable range.
    pub fn checked_sub(
        &self,
        instant: UtcInstant,
        duration: Duration,
    ) -> Result<UtcInstant, RangeError> {
        let duration = duration.checked_neg().ok_or(RangeError::Overflow)?;

        self.checked_add(instant, duration)
    }

    /// Returns the number of elapsed SI seconds from `earlier` to `later`,
    /// which is negative if `earlier` is in the future of `later`.
    pub fn duration_between(&self, earlier: UtcInstant, later: UtcInstant) -> Duration {
        // Instants span less than 4 million days, so the number of seconds
        // always fits in an `i64`.
        let nanos = self.tai_1958_nanos(later) - self.tai_1958_nanos(earlier);

        Duration::new(
            nanos.div_euclid(i128::from(NANOS_PER_SEC)) as i64,
            nanos.rem_euclid(i128::from(NANOS_PER_SEC)) as i64,
        )
    }

    /// Converts a UTC instant to a TAI timestamp.
    ///
    /// The leap second of a leap day is mapped to its own TAI second, so the
    /// conversion is injective and preserves ordering.
    ///
    /// Returns an error if the timestamp cannot be represented with the
    /// requested epoch.
    ///
    /// # Examples
    ///
    /// ```
    /// use leap_time::{TaiInstant, UtcInstant, UtcRules};
    ///
    /// let rules = UtcRules::builtin();
    ///
    /// // 1972-01-01T00:00:00Z is 1972-01-01 00:00:10 TAI.
    /// let t: TaiInstant = rules.to_tai(UtcInstant::of_day(41_317, 0).unwrap()).unwrap();
    /// assert_eq!(t.to_string(), "1972-01-01 00:00:10");
    /// ```
    pub fn to_tai<const EPOCH_REF: i64>(
        &self,
        instant: UtcInstant,
    ) -> Result<TaiTime<EPOCH_REF>, RangeError> {
        let nano_of_day = instant.nano_of_day();
        let secs = self.day_start(instant.day()) + i128::from(nano_of_day / NANOS_PER_SEC as i64);
        let secs = i64::try_from(secs).map_err(|_| RangeError::Overflow)?;
        let nanos = (nano_of_day % NANOS_PER_SEC as i64) as u32;

        Tai1958Time::new(secs, nanos).to_tai_time()
    }

    /// Converts a TAI timestamp to a UTC instant.
    ///
    /// A timestamp falling within a leap second is mapped to the last second
    /// of the leap day, with a nanosecond of day of at least 86 400 seconds.
    ///
    /// Returns an error if the instant is outside the representable range of
    /// [`UtcInstant`].
    pub fn to_utc<const EPOCH_REF: i64>(
        &self,
        timestamp: TaiTime<EPOCH_REF>,
    ) -> Result<UtcInstant, RangeError> {
        // A timestamp which cannot be re-epoched is out of range anyway.
        let timestamp: Tai1958Time = timestamp.to_tai_time()?;
        let secs = i128::from(timestamp.as_secs());

        // First estimate, assuming that the offset at the date is the offset
        // at the same day number on the TAI scale.
        let estimate = timestamp.as_secs().div_euclid(SECS_PER_DAY) + TAI_1958_EPOCH_MJD;
        let offset = self.table.offset_before(estimate);
        let day = (secs - i128::from(offset)).div_euclid(i128::from(SECS_PER_DAY))
            + i128::from(TAI_1958_EPOCH_MJD);
        let mut day = checked_day(day)?;

        // Correct the estimate so that the instant lies within the day.
        while secs < self.day_start(day) {
            trace!("moving TAI estimate back from day {}", day);
            day = checked_day(i128::from(day) - 1)?;
        }
        while day < UtcInstant::MAX_DAY && secs >= self.day_start(day + 1) {
            trace!("moving TAI estimate forward from day {}", day);
            day += 1;
        }

        let sec_of_day = secs - self.day_start(day);
        let nano_of_day = sec_of_day * i128::from(NANOS_PER_SEC)
            + i128::from(timestamp.subsec_nanos());
        if nano_of_day >= i128::from(self.table.day_length_nanos(day)) {
            return Err(RangeError::Overflow);
        }

        self.of_day(day, nano_of_day as i64)
    }

    /// Returns the number of TAI seconds since the 1958 epoch at the start of a
    /// representable day.
    fn day_start(&self, day: i64) -> i128 {
        i128::from(day - TAI_1958_EPOCH_MJD) * i128::from(SECS_PER_DAY)
            + i128::from(self.table.offset_before(day))
    }

    /// Returns the number of TAI nanoseconds since the 1958 epoch.
    fn tai_1958_nanos(&self, instant: UtcInstant) -> i128 {
        self.day_start(instant.day()) * i128::from(NANOS_PER_SEC)
            + i128::from(instant.nano_of_day())
    }
}

impl UtcRules<'static> {
    /// Returns the rules based on the builtin leap second table.
    pub fn builtin() -> Self {
        Self::new(LeapSecondTable::builtin())
    }
}

impl Default for UtcRules<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Checks that a day is within the representable range.
fn checked_day(day: i128) -> Result<i64, RangeError> {
    if day < i128::from(UtcInstant::MIN_DAY) || day > i128::from(UtcInstant::MAX_DAY) {
        return Err(RangeError::Overflow);
    }

    Ok(day as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{LeapSecondEntry, MonotonicTime, TaiInstant};

    fn utc(day: i64, nano_of_day: i64) -> UtcInstant {
        UtcRules::builtin().of_day(day, nano_of_day).unwrap()
    }

    #[test]
    fn of_day() {
        let rules = UtcRules::builtin();

        assert!(rules.of_day(41_682, 86_400_999_999_999).is_ok());
        assert_eq!(
            rules.of_day(41_682, 86_401_000_000_000),
            Err(RangeError::NanoOfDay {
                day: 41_682,
                nano_of_day: 86_401_000_000_000
            })
        );
        assert_eq!(
            rules.of_day(41_681, NANOS_PER_DAY),
            Err(RangeError::NanoOfDay {
                day: 41_681,
                nano_of_day: NANOS_PER_DAY
            })
        );
        assert_eq!(
            rules.of_day(0, -1),
            Err(RangeError::NanoOfDay {
                day: 0,
                nano_of_day: -1
            })
        );
        assert_eq!(
            rules.of_day(UtcInstant::MAX_DAY + 1, 0),
            Err(RangeError::Day(UtcInstant::MAX_DAY + 1))
        );
        assert_eq!(
            rules.of_day(UtcInstant::MIN_DAY - 1, 0),
            Err(RangeError::Day(UtcInstant::MIN_DAY - 1))
        );
    }

    #[test]
    fn with_day() {
        let rules = UtcRules::builtin();
        let leap_second = utc(41_682, 86_400_000_000_000);

        assert_eq!(
            rules.with_day(leap_second, 41_681),
            Err(RangeError::NanoOfDay {
                day: 41_681,
                nano_of_day: 86_400_000_000_000
            })
        );
        assert_eq!(
            rules.with_day(leap_second, 41_683),
            Err(RangeError::NanoOfDay {
                day: 41_683,
                nano_of_day: 86_400_000_000_000
            })
        );
        // 1972-06-30 is also a leap day.
        assert_eq!(
            rules.with_day(leap_second, 41_498),
            Ok(utc(41_498, 86_400_000_000_000))
        );
        assert_eq!(
            rules.with_nano_of_day(leap_second, 0),
            Ok(utc(41_682, 0))
        );
    }

    #[test]
    fn from_date_time() {
        let rules = UtcRules::builtin();

        assert_eq!(
            rules.from_date_time(1972, 12, 31, 23, 59, 60, 0),
            Ok(utc(41_682, 86_400_000_000_000))
        );
        assert_eq!(
            rules.from_date_time(2017, 12, 31, 23, 59, 60, 0),
            Err(DateTimeError::NotALeapDay(58_118))
        );
        assert_eq!(
            rules.from_date_time(1972, 12, 31, 23, 58, 60, 0),
            Err(DateTimeError::InvalidSecond(60))
        );
        assert_eq!(
            rules.from_date_time(1972, 13, 1, 0, 0, 0, 0),
            Err(DateTimeError::InvalidMonth(13))
        );
        assert_eq!(
            rules.from_date_time(1973, 2, 29, 0, 0, 0, 0),
            Err(DateTimeError::InvalidDayOfMonth(29))
        );
        assert_eq!(
            rules.from_date_time(1972, 1, 1, 24, 0, 0, 0),
            Err(DateTimeError::InvalidHour(24))
        );
        assert_eq!(
            rules.from_date_time(1972, 1, 1, 0, 0, 0, NANOS_PER_SEC),
            Err(DateTimeError::InvalidNanosecond(NANOS_PER_SEC))
        );
        assert_eq!(
            rules.from_date_time(10_000, 1, 1, 0, 0, 0, 0),
            Err(DateTimeError::OutOfRange)
        );
    }

    #[test]
    fn add_within_ordinary_days() {
        let rules = UtcRules::builtin();

        assert_eq!(
            rules.checked_add(utc(0, 0), Duration::new(0, 1)),
            Ok(utc(0, 1))
        );
        assert_eq!(
            rules.checked_add(utc(0, 0), Duration::new(0, -1)),
            Ok(utc(-1, NANOS_PER_DAY - 1))
        );
        assert_eq!(
            rules.checked_add(utc(0, 0), Duration::new(86_400, 1)),
            Ok(utc(1, 1))
        );
        assert_eq!(
            rules.checked_sub(utc(1, 0), Duration::new(86_400, 0)),
            Ok(utc(0, 0))
        );
    }

    #[test]
    fn add_across_leap_second() {
        let rules = UtcRules::builtin();
        let before = rules.parse("1972-12-31T23:59:59Z").unwrap();
        let leap_second = rules.parse("1972-12-31T23:59:60Z").unwrap();
        let after = rules.parse("1973-01-01T00:00:00Z").unwrap();

        assert_eq!(rules.checked_add(before, Duration::new(1, 0)), Ok(leap_second));
        assert_eq!(rules.checked_add(before, Duration::new(2, 0)), Ok(after));
        assert_eq!(rules.checked_sub(after, Duration::new(1, 0)), Ok(leap_second));
        assert_eq!(rules.checked_sub(after, Duration::new(2, 0)), Ok(before));

        // A whole day starting at midnight before a leap second ends one
        // second before the next midnight.
        assert_eq!(
            rules.checked_add(utc(41_682, 0), Duration::new(86_400, 0)),
            Ok(leap_second)
        );
        assert_eq!(
            rules.checked_sub(utc(41_683, 0), Duration::new(86_401, 0)),
            Ok(utc(41_682, 0))
        );
    }

    #[test]
    fn add_across_many_leap_seconds() {
        let rules = UtcRules::builtin();
        // 1972-01-01 to 2017-01-01, with 27 leap seconds in between.
        let start = utc(41_317, 0);
        let end = utc(57_754, 0);
        let elapsed = Duration::new(16_437 * 86_400 + 27, 0);

        assert_eq!(rules.checked_add(start, elapsed), Ok(end));
        assert_eq!(rules.checked_sub(end, elapsed), Ok(start));
        assert_eq!(rules.duration_between(start, end), elapsed);
        assert_eq!(rules.duration_between(end, start), -elapsed);

        let start = utc(30_000, 123_456_789);
        let d = Duration::new(1_000_000_000, 987_654_321);
        let end = rules.checked_add(start, d).unwrap();
        assert_eq!(rules.checked_sub(end, d), Ok(start));
        assert_eq!(rules.duration_between(start, end), d);
    }

    #[test]
    fn add_overflow() {
        let rules = UtcRules::builtin();

        assert_eq!(
            rules.checked_add(UtcInstant::MAX, Duration::new(0, 1)),
            Err(RangeError::Overflow)
        );
        assert_eq!(
            rules.checked_sub(UtcInstant::MIN, Duration::new(0, 1)),
            Err(RangeError::Overflow)
        );
        assert_eq!(
            rules.checked_add(UtcInstant::MIN, Duration::MAX),
            Err(RangeError::Overflow)
        );
        assert_eq!(
            rules.checked_sub(UtcInstant::MAX, Duration::MIN),
            Err(RangeError::Overflow)
        );
        assert_eq!(
            rules.checked_add(UtcInstant::MAX, Duration::MIN),
            Err(RangeError::Overflow)
        );
    }

    #[test]
    fn tai_conversion() {
        let rules = UtcRules::builtin();

        let leap_second = utc(41_682, 86_400_500_000_000);
        let tai: TaiInstant = rules.to_tai(leap_second).unwrap();
        assert_eq!(tai, TaiInstant::new(473_385_611, 500_000_000));
        assert_eq!(rules.to_utc(tai), Ok(leap_second));

        let tai: TaiInstant = rules.to_tai(utc(41_683, 0)).unwrap();
        assert_eq!(tai, TaiInstant::new(473_385_612, 0));
        assert_eq!(rules.to_utc(tai), Ok(utc(41_683, 0)));

        let tai: TaiInstant = rules.to_tai(utc(41_682, 86_399_999_999_999)).unwrap();
        assert_eq!(tai, TaiInstant::new(473_385_610, 999_999_999));

        // Days before the table use the first offset.
        let tai: TaiInstant = rules.to_tai(utc(0, 0)).unwrap();
        assert_eq!(tai, TaiInstant::new(-36_204 * 86_400 + 10, 0));
        assert_eq!(rules.to_utc(tai), Ok(utc(0, 0)));

        // 2020-01-01T00:00:00Z, with an offset of 37 s.
        let tai: MonotonicTime = rules.to_tai(utc(58_849, 0)).unwrap();
        assert_eq!(tai, MonotonicTime::new(1_577_836_837, 0));
        assert_eq!(rules.to_utc(tai), Ok(utc(58_849, 0)));
    }

    #[test]
    fn tai_conversion_out_of_range() {
        let rules = UtcRules::builtin();

        assert_eq!(rules.to_utc(TaiInstant::MAX), Err(RangeError::Overflow));
        assert_eq!(rules.to_utc(TaiInstant::MIN), Err(RangeError::Overflow));
        assert_eq!(rules.to_utc(MonotonicTime::MAX), Err(RangeError::Overflow));

        let end: TaiInstant = rules.to_tai(UtcInstant::MAX).unwrap();
        assert_eq!(rules.to_utc(end), Ok(UtcInstant::MAX));
        assert_eq!(
            rules.to_utc(end + Duration::new(0, 1)),
            Err(RangeError::Overflow)
        );
        let start: TaiInstant = rules.to_tai(UtcInstant::MIN).unwrap();
        assert_eq!(rules.to_utc(start), Ok(UtcInstant::MIN));
        assert_eq!(
            rules.to_utc(start - Duration::new(0, 1)),
            Err(RangeError::Overflow)
        );
    }

    #[test]
    fn custom_table() {
        let table = LeapSecondTable::new(alloc::vec![
            LeapSecondEntry::new(100, 5),
            LeapSecondEntry::new(200, 6),
        ])
        .unwrap();
        let rules = UtcRules::new(&table);

        assert!(rules.of_day(199, 86_400_000_000_000).is_ok());
        assert!(UtcRules::builtin().of_day(199, 86_400_000_000_000).is_err());

        let t = rules
            .checked_add(rules.of_day(199, 0).unwrap(), Duration::new(86_401, 0))
            .unwrap();
        assert_eq!(t, rules.of_day(200, 0).unwrap());

        let tai: TaiInstant = rules.to_tai(t).unwrap();
        assert_eq!(tai, TaiInstant::new((200 - 36_204) * 86_400 + 6, 0));
        assert_eq!(rules.to_utc(tai), Ok(t));
        assert_eq!(
            rules.to_utc(tai - Duration::new(1, 0)),
            Ok(rules.of_day(199, 86_400_000_000_000).unwrap())
        );
    }

    #[test]
    fn tai_conversion_with_extreme_offset() {
        let table =
            LeapSecondTable::new(alloc::vec![LeapSecondEntry::new(0, i64::MAX)]).unwrap();
        let rules = UtcRules::new(&table);

        assert_eq!(
            rules.to_tai::<0>(rules.of_day(40_000, 0).unwrap()),
            Err(RangeError::Overflow)
        );
        assert_eq!(
            rules.to_tai::<{ -378_691_200 }>(UtcInstant::MAX),
            Err(RangeError::Overflow)
        );

        // With this offset, the first second of MJD 36 204 is the last
        // representable TAI second.
        let end: TaiInstant = rules
            .to_tai(rules.of_day(36_204, 999_999_999).unwrap())
            .unwrap();
        assert_eq!(end, TaiInstant::MAX);
        assert_eq!(
            rules.to_utc(TaiInstant::MAX),
            Ok(rules.of_day(36_204, 999_999_999).unwrap())
        );
        assert_eq!(rules.to_utc(TaiInstant::MIN), Err(RangeError::Overflow));
    }
}
