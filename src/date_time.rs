//! Date-time processing.

use core::fmt;

use super::ParseDateTimeError;

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const DAYS_IN_MONTH_LEAP: [u8; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const DOY_AT_MONTH: [i32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
const DOY_AT_MONTH_LEAP: [i32; 12] = [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335];

/// Number of days from 0000-01-01 to the Modified Julian Day epoch
/// (1858-11-17).
pub(crate) const MJD_EPOCH_FROM_YEAR_0: i64 = 678_941;

/// Number of days from 0000-01-01 to 1970-01-01.
pub(crate) const UNIX_EPOCH_FROM_YEAR_0: i64 = 719_528;

/// Returns whether the year is a leap year for a 64-bit signed year.
///
/// The argument is the proleptic Gregorian year, with the ISO 8601
/// interpretation of year 0 as year 1 BC. Year 0 does not obey the usual rule
/// and is considered a leap year.
///
/// The whole `i64` value range is supported.
pub(crate) const fn is_leap(year: i64) -> bool {
    (year & 0b11) == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Calculates the number of days in a month.
pub(crate) const fn days_in_month(year: i64, month: u8) -> u8 {
    let month_idx = (month - 1) as usize;

    if is_leap(year) {
        DAYS_IN_MONTH_LEAP[month_idx]
    } else {
        DAYS_IN_MONTH[month_idx]
    }
}

/// Calculates the 0-based day of the year.
pub(crate) const fn day_of_year(year: i64, month: u8, day: u8) -> i32 {
    let month_idx = (month - 1) as usize;
    let table = if is_leap(year) {
        &DOY_AT_MONTH_LEAP
    } else {
        &DOY_AT_MONTH
    };

    (day - 1) as i32 + table[month_idx]
}

/// Calculates the month and the day of the month for a 0-based day of the year.
pub(crate) fn month_and_day_of_month(year: i64, doy: i32) -> (u8, u8) {
    let table = if is_leap(year) {
        &DOY_AT_MONTH_LEAP
    } else {
        &DOY_AT_MONTH
    };

    let idx = table.binary_search(&doy).unwrap_or_else(|e| e - 1);
    let month = idx as u8 + 1;
    let day = (doy - table[idx]) as u8 + 1;

    (month, day)
}

/// Returns the number of elapsed days since the first day of year 0 to the
/// first day of the provided year.
///
/// The argument is the proleptic Gregorian year, with the ISO 8601
/// interpretation of year 0 as year 1 BC.
///
/// The result is negative for negative years.
pub(crate) const fn days_from_year_0(year: i64) -> i64 {
    let offset = (year > 0) as i64;
    let y = year - offset;
    let m4 = y / 4 + offset;
    let m100 = y / 100;
    let m400 = m100 / 4;

    year * 365 + m4 - m100 + m400
}

/// Returns the year and the 0-based day of the year for a number of days
/// elapsed since the first day of year 0.
pub(crate) fn days_to_year_and_doy(days_from_year_0: i64) -> (i64, i32) {
    // Find the nearest 400-year boundary that is before or at the date.
    let n_period = days_from_year_0.div_euclid(146_097);
    let mut day = days_from_year_0.rem_euclid(146_097);

    // -- `day` is now guaranteed to be positive.

    let mut year = 400 * n_period;
    if day < 366 {
        return (year, day as i32);
    }

    // Find the nearest 100-year, 4-year and 1-year boundaries that are before
    // or at the date.
    for (years_in_period, days_in_period, starts_with_non_leap_year) in
        [(100, 36524, 1), (4, 1461, 0), (1, 365, 1)]
    {
        day -= starts_with_non_leap_year;
        let n_period = day / days_in_period;
        year += years_in_period * n_period;
        day -= n_period * days_in_period;
        if day < (366 - starts_with_non_leap_year) {
            return (year, day as i32);
        }
        day += starts_with_non_leap_year;
    }

    unreachable!();
}

/// Returns the proleptic Gregorian year, month and day of the month of a
/// Modified Julian Day.
pub(crate) fn mjd_to_date(mjd: i64) -> (i64, u8, u8) {
    let (year, doy) = days_to_year_and_doy(mjd + MJD_EPOCH_FROM_YEAR_0);
    let (month, day) = month_and_day_of_month(year, doy);

    (year, month, day)
}

/// Returns the Modified Julian Day of a valid proleptic Gregorian date.
pub(crate) const fn date_to_mjd(year: i64, month: u8, day: u8) -> i64 {
    days_from_year_0(year) + day_of_year(year, month, day) as i64 - MJD_EPOCH_FROM_YEAR_0
}

/// Writes the fractional part of a second, if any, with the smallest of 3, 6
/// or 9 digits that represents it exactly.
pub(crate) fn write_fraction(fmt: &mut fmt::Formatter<'_>, nanos: u32) -> fmt::Result {
    if nanos == 0 {
        Ok(())
    } else if nanos % 1_000_000 == 0 {
        write!(fmt, ".{:03}", nanos / 1_000_000)
    } else if nanos % 1_000 == 0 {
        write!(fmt, ".{:06}", nanos / 1_000)
    } else {
        write!(fmt, ".{:09}", nanos)
    }
}

/// Writes a UTC instant as `YYYY-MM-DDThh:mm:ss[.fff[fff[fff]]]Z`.
///
/// A nanosecond of day within the last second of a leap day is written with a
/// `60` second field.
pub(crate) fn write_utc_date_time(
    fmt: &mut fmt::Formatter<'_>,
    mjd: i64,
    nano_of_day: i64,
) -> fmt::Result {
    let (year, month, day) = mjd_to_date(mjd);
    let secs = nano_of_day / crate::NANOS_PER_SEC as i64;
    let nanos = (nano_of_day % crate::NANOS_PER_SEC as i64) as u32;
    let (hour, min, sec) = if secs >= crate::SECS_PER_DAY {
        (23, 59, 60 + secs - crate::SECS_PER_DAY)
    } else {
        (secs / 3600, secs / 60 % 60, secs % 60)
    };

    write!(
        fmt,
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        year, month, day, hour, min, sec
    )?;
    write_fraction(fmt, nanos)?;
    fmt.write_str("Z")
}

/// Writes a TAI date-time as `[-]YYYY-MM-DD hh:mm:ss[.fff[fff[fff]]]`.
pub(crate) fn write_tai_date_time(
    fmt: &mut fmt::Formatter<'_>,
    days_from_year_0: i64,
    sec_of_day: i64,
    nanos: u32,
) -> fmt::Result {
    let (year, doy) = days_to_year_and_doy(days_from_year_0);
    let (month, day) = month_and_day_of_month(year, doy);
    if year < 0 {
        fmt.write_str("-")?;
    }

    write!(
        fmt,
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        year.unsigned_abs(),
        month,
        day,
        sec_of_day / 3600,
        sec_of_day / 60 % 60,
        sec_of_day % 60
    )?;
    write_fraction(fmt, nanos)
}

/// Parses a strict ISO 8601 extended UTC date-time.
///
/// Expected format:
///
/// `YYYY-MM-DD'T'hh:mm:ss[.d[d]...[d]]'Z'`
///
/// with between 1 and 9 fractional digits. Only the syntax is checked: the
/// numerical range of each field is not validated.
#[allow(clippy::type_complexity)]
pub(crate) fn parse_utc_date_time(
    stream: &str,
) -> Result<(i32, u8, u8, u8, u8, u8, u32), ParseDateTimeError> {
    // Pull a run of exactly `width` ASCII digits.
    fn pull_digits(stream: &[u8], width: usize) -> Result<(u32, &[u8]), ParseDateTimeError> {
        let len = stream.iter().take_while(|c| c.is_ascii_digit()).count();
        if len == 0 {
            return Err(if stream.is_empty() {
                ParseDateTimeError::MissingField
            } else {
                ParseDateTimeError::InvalidFieldValue
            });
        }
        if len != width {
            return Err(ParseDateTimeError::InvalidFieldWidth);
        }
        let value = stream[..len]
            .iter()
            .fold(0, |acc, c| acc * 10 + u32::from(c - b'0'));

        Ok((value, &stream[len..]))
    }

    // Pull the expected delimiter.
    fn pull_delimiter(stream: &[u8], delimiter: u8) -> Result<&[u8], ParseDateTimeError> {
        match stream.split_first() {
            Some((&c, stream)) if c == delimiter => Ok(stream),
            Some(_) => Err(ParseDateTimeError::UnexpectedCharacter),
            None => Err(ParseDateTimeError::MissingField),
        }
    }

    if stream.is_empty() {
        return Err(ParseDateTimeError::Empty);
    }
    let stream = stream.as_bytes();

    let (year, stream) = pull_digits(stream, 4)?;
    let stream = pull_delimiter(stream, b'-')?;
    let (month, stream) = pull_digits(stream, 2)?;
    let stream = pull_delimiter(stream, b'-')?;
    let (day, stream) = pull_digits(stream, 2)?;
    let stream = pull_delimiter(stream, b'T')?;
    let (hour, stream) = pull_digits(stream, 2)?;
    let stream = pull_delimiter(stream, b':')?;
    let (min, stream) = pull_digits(stream, 2)?;
    let stream = pull_delimiter(stream, b':')?;
    let (sec, mut stream) = pull_digits(stream, 2)?;

    // Parse the fraction.
    let mut nano = 0u32;
    if let Some((b'.', rest)) = stream.split_first() {
        let digits = rest.iter().take_while(|c| c.is_ascii_digit()).count();
        if digits == 0 {
            return Err(if rest.is_empty() {
                ParseDateTimeError::MissingField
            } else {
                ParseDateTimeError::InvalidFieldValue
            });
        }
        if digits > 9 {
            return Err(ParseDateTimeError::InvalidFieldWidth);
        }
        let mut weight = 100_000_000;
        for c in &rest[..digits] {
            nano += u32::from(c - b'0') * weight;
            weight /= 10;
        }
        stream = &rest[digits..];
    }

    let stream = pull_delimiter(stream, b'Z')?;
    if !stream.is_empty() {
        return Err(ParseDateTimeError::UnexpectedCharacter);
    }

    Ok((
        year as i32,
        month as u8,
        day as u8,
        hour as u8,
        min as u8,
        sec as u8,
        nano,
    ))
}

/// Parses an RFC3339-like TAI date-time with signed years. Since TAI is
/// timezone-independent, time zones and offsets suffixes are invalid.
///
/// Expected format:
///
/// `[±][Y]...[Y]YYYY-MM-DD hh:mm:ss[.d[d]...[d]]`
///
/// or:
///
/// `[±][Y]...[Y]YYYY-MM-DD'T'hh:mm:ss[.d[d]...[d]]`
///
/// where delimiter `T` between date and time may also be a lowercase `t`.
///
/// The year may take any value within `±i32::MAX`.
#[allow(clippy::type_complexity)]
pub(crate) fn parse_tai_date_time(
    stream: &str,
) -> Result<(i32, u8, u8, u8, u8, u8, u32), ParseDateTimeError> {
    // Expect 2 leading digits optionally followed by one of the provided
    // delimiters, and return them as a single `u8`, together with the remaining part
    // of the stream if a delimiter was found.
    fn pull_two_digits<'a, E>(
        stream: &'a str,
        delimiter: &'a [char],
        missing_delimiter_error: E,
    ) -> Result<(u8, Result<&'a str, E>), ParseDateTimeError> {
        let (token, stream) = stream
            .split_once(delimiter)
            .map(|(t, s)| (t, Ok(s)))
            .unwrap_or((stream, Err(missing_delimiter_error)));

        if token.len() != 2 {
            return Err(ParseDateTimeError::InvalidFieldWidth);
        }
        if !token.bytes().all(|c| c.is_ascii_digit()) {
            return Err(ParseDateTimeError::InvalidFieldValue);
        }

        token
            .parse()
            .map_err(|_| ParseDateTimeError::InvalidFieldValue)
            .map(|token| (token, stream))
    }

    if stream.is_empty() {
        return Err(ParseDateTimeError::Empty);
    }

    // Pull the leading sign of the year, if any.
    let (stream, sign) = match stream.chars().next() {
        Some('+') => (&stream[1..], 1),
        Some('-') => (&stream[1..], -1),
        _ => (stream, 1),
    };

    // Pull the year.
    let (year, stream) = stream
        .split_once('-')
        .ok_or(ParseDateTimeError::MissingField)?;
    if year.len() < 4 {
        return Err(ParseDateTimeError::InvalidFieldWidth);
    }
    if !year.bytes().all(|c| c.is_ascii_digit()) {
        return Err(ParseDateTimeError::InvalidFieldValue);
    }
    let year = year
        .parse()
        .map(|year: i32| sign * year)
        .map_err(|_| ParseDateTimeError::InvalidFieldValue)?;

    // Pull month, day, hour, minute and second.
    let (month, stream) = pull_two_digits(stream, &['-'], ParseDateTimeError::MissingField)?;
    let (day, stream) =
        pull_two_digits(stream?, &[' ', 'T', 't'], ParseDateTimeError::MissingField)?;
    let (hour, stream) = pull_two_digits(stream?, &[':'], ParseDateTimeError::MissingField)?;
    let (min, stream) = pull_two_digits(stream?, &[':'], ParseDateTimeError::MissingField)?;
    let (sec, stream) = pull_two_digits(stream?, &['.'], ())?;

    // Parse the fraction.
    let mut nano = 0u32;
    match stream {
        Ok("") => return Err(ParseDateTimeError::MissingField),
        Ok(stream) => {
            let mut weight = 100_000_000;
            for c in stream.chars() {
                // All digits are validated even if their weight is 0.
                let digit = c
                    .to_digit(10)
                    .ok_or(ParseDateTimeError::InvalidFieldValue)?;
                nano += digit * weight;
                weight /= 10;
            }
        }
        Err(_) => {}
    }

    Ok((year, month, day, hour, min, sec, nano))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mjd_calendar() {
        assert_eq!(mjd_to_date(0), (1858, 11, 17));
        assert_eq!(mjd_to_date(-1), (1858, 11, 16));
        assert_eq!(mjd_to_date(40_587), (1970, 1, 1));
        assert_eq!(mjd_to_date(41_682), (1972, 12, 31));
        assert_eq!(mjd_to_date(41_683), (1973, 1, 1));
        assert_eq!(mjd_to_date(51_603), (2000, 2, 29));
        assert_eq!(mjd_to_date(-678_941), (0, 1, 1));
        assert_eq!(mjd_to_date(2_973_483), (9999, 12, 31));

        assert_eq!(date_to_mjd(1858, 11, 17), 0);
        assert_eq!(date_to_mjd(1972, 12, 31), 41_682);
        assert_eq!(date_to_mjd(2000, 3, 1), 51_604);
        assert_eq!(date_to_mjd(0, 1, 1), -678_941);
        assert_eq!(date_to_mjd(9999, 12, 31), 2_973_483);
        assert_eq!(date_to_mjd(1970, 1, 1) + MJD_EPOCH_FROM_YEAR_0, UNIX_EPOCH_FROM_YEAR_0);
    }

    #[test]
    fn calendar_round_trip() {
        for mjd in (-700_000..3_000_000).step_by(997) {
            let (year, month, day) = mjd_to_date(mjd);
            assert!(day <= days_in_month(year, month));
            assert_eq!(date_to_mjd(year, month, day), mjd);
        }
    }

    #[test]
    fn negative_years() {
        assert_eq!(days_from_year_0(-1), -365);
        assert_eq!(days_from_year_0(-4), -1461);
        assert_eq!(days_to_year_and_doy(-1), (-1, 364));
        assert_eq!(days_to_year_and_doy(-365), (-1, 0));
        assert_eq!(days_to_year_and_doy(-366), (-2, 364));
    }

    #[test]
    fn parse_utc_smoke() {
        assert_eq!(
            parse_utc_date_time("1972-12-31T23:59:60Z"),
            Ok((1972, 12, 31, 23, 59, 60, 0))
        );
        assert_eq!(
            parse_utc_date_time("2001-02-03T04:05:06.000999Z"),
            Ok((2001, 2, 3, 4, 5, 6, 999_000))
        );
        assert_eq!(
            parse_utc_date_time("2001-02-03T04:05:06.5Z"),
            Ok((2001, 2, 3, 4, 5, 6, 500_000_000))
        );
        assert_eq!(
            parse_utc_date_time("2001-02-03T04:05:06.123456789Z"),
            Ok((2001, 2, 3, 4, 5, 6, 123_456_789))
        );
    }

    #[test]
    fn parse_utc_invalid() {
        use ParseDateTimeError::*;

        assert_eq!(parse_utc_date_time(""), Err(Empty));
        assert_eq!(parse_utc_date_time("garbage"), Err(InvalidFieldValue));
        assert_eq!(parse_utc_date_time("197-01-01T00:00:00Z"), Err(InvalidFieldWidth));
        assert_eq!(parse_utc_date_time("+1972-01-01T00:00:00Z"), Err(InvalidFieldValue));
        assert_eq!(parse_utc_date_time("1972-01-01 00:00:00Z"), Err(UnexpectedCharacter));
        assert_eq!(parse_utc_date_time("1972-01-01t00:00:00Z"), Err(UnexpectedCharacter));
        assert_eq!(parse_utc_date_time("1972-01-01T00:00:00"), Err(MissingField));
        assert_eq!(parse_utc_date_time("1972-01-01T00:00:00z"), Err(UnexpectedCharacter));
        assert_eq!(parse_utc_date_time("1972-01-01T00:00:00+01:00"), Err(UnexpectedCharacter));
        assert_eq!(parse_utc_date_time("1972-01-01T00:00:00ZZ"), Err(UnexpectedCharacter));
        assert_eq!(parse_utc_date_time("1972-01-01T00:00"), Err(MissingField));
        assert_eq!(parse_utc_date_time("1972-01-01T00:00:00.Z"), Err(InvalidFieldValue));
        assert_eq!(parse_utc_date_time("1972-01-01T00:00:00."), Err(MissingField));
        assert_eq!(
            parse_utc_date_time("1972-01-01T00:00:00.1234567890Z"),
            Err(InvalidFieldWidth)
        );
        assert_eq!(parse_utc_date_time("1972-1-01T00:00:00Z"), Err(InvalidFieldWidth));
        assert_eq!(parse_utc_date_time("1972-01-01T00:00:0éZ"), Err(InvalidFieldWidth));
    }

    #[test]
    fn parse_tai_smoke() {
        assert_eq!(
            parse_tai_date_time("-12345-06-07 08:09:10.123"),
            Ok((-12345, 6, 7, 8, 9, 10, 123_000_000))
        );
        assert_eq!(
            parse_tai_date_time("1958-01-01t00:00:00"),
            Ok((1958, 1, 1, 0, 0, 0, 0))
        );
        assert_eq!(
            parse_tai_date_time("1958-01-01T00:00:00."),
            Err(ParseDateTimeError::MissingField)
        );
        assert_eq!(parse_tai_date_time(""), Err(ParseDateTimeError::Empty));
        assert_eq!(
            parse_tai_date_time("1958-01-01T00:00:+1"),
            Err(ParseDateTimeError::InvalidFieldValue)
        );
    }
}
