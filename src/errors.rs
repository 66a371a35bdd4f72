//! Error types.

use core::fmt;

/// The error type returned when a numeric field of a
/// [`UtcInstant`](crate::UtcInstant) is outside its valid domain, or when
/// arithmetic or a conversion would leave the representable range.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeError {
    /// The nanosecond-of-day is negative, or is not less than the length of
    /// the day in nanoseconds.
    NanoOfDay {
        /// The Modified Julian Day.
        day: i64,
        /// The rejected nanosecond-of-day.
        nano_of_day: i64,
    },
    /// The Modified Julian Day is outside the representable range.
    Day(i64),
    /// Duration arithmetic or a time scale conversion overflowed the
    /// representable range.
    Overflow,
}

impl fmt::Display for RangeError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NanoOfDay { day, nano_of_day } => write!(
                fmt,
                "nanosecond of day '{}' is not valid for modified julian day {}",
                nano_of_day, day
            ),
            Self::Day(day) => write!(
                fmt,
                "modified julian day '{}' is outside the representable range",
                day
            ),
            Self::Overflow => "instant arithmetic overflowed the representable range".fmt(fmt),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RangeError {}

/// The error type returned when date-time components are invalid or correspond
/// to an instant outside the representable range.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DateTimeError {
    /// The month is not between 1 and 12.
    InvalidMonth(u8),
    /// The day of the month is less than 1, or more than the maximum value for
    /// this combination of year and month.
    InvalidDayOfMonth(u8),
    /// The hour field value is not between 0 and 23.
    InvalidHour(u8),
    /// The minute field value is not between 0 and 59.
    InvalidMinute(u8),
    /// The second field value is not between 0 and 59, or is 60 at a time of
    /// day other than 23:59.
    InvalidSecond(u8),
    /// The nanosecond field value is more than 999 999 999.
    InvalidNanosecond(u32),
    /// The second field is 60 but the Modified Julian Day has no leap second.
    NotALeapDay(i64),
    /// This date-time value cannot be represented.
    OutOfRange,
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMonth(month) => write!(fmt, "month numeral '{}' is not valid", month),
            Self::InvalidDayOfMonth(day) => {
                write!(fmt, "day of month '{}' is not valid for this date", day)
            }
            Self::InvalidHour(hour) => write!(fmt, "hour numeral '{}' is not valid", hour),
            Self::InvalidMinute(min) => write!(fmt, "minute numeral '{}' is not valid", min),
            Self::InvalidSecond(sec) => write!(fmt, "second numeral '{}' is not valid", sec),
            Self::InvalidNanosecond(nanosec) => {
                write!(fmt, "nanosecond value '{}' is not valid", nanosec)
            }
            Self::NotALeapDay(day) => write!(
                fmt,
                "second numeral '60' is not valid on modified julian day {}, which has no leap second",
                day
            ),
            Self::OutOfRange => "date-time outside representable range".fmt(fmt),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DateTimeError {}

/// The error type returned when a date-time string is invalid or corresponds to
/// an instant outside the representable range.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseDateTimeError {
    /// The input is empty.
    Empty,
    /// A field value is either not of the expected numeric type or is out of
    /// range for the expected numeric type.
    InvalidFieldValue,
    /// The width of a fixed-width or minimum-width field is invalid.
    InvalidFieldWidth,
    /// A field is missing.
    MissingField,
    /// A delimiter or designator is not the one required by the format, or
    /// there is trailing input.
    UnexpectedCharacter,
    /// One of the field value is out of its expected range, or the
    /// corresponding instant is outside the representable range.
    RangeError(DateTimeError),
}

impl fmt::Display for ParseDateTimeError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => "the date-time string is empty".fmt(fmt),
            Self::InvalidFieldValue => "one of the fields is invalid".fmt(fmt),
            Self::InvalidFieldWidth => "the width of one of the fields is invalid".fmt(fmt),
            Self::MissingField => "a field is missing".fmt(fmt),
            Self::UnexpectedCharacter => "unexpected delimiter or trailing character".fmt(fmt),
            Self::RangeError(err) => err.fmt(fmt),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseDateTimeError {}

impl From<DateTimeError> for ParseDateTimeError {
    fn from(err: DateTimeError) -> Self {
        Self::RangeError(err)
    }
}

/// The error type returned when a list of leap second entries does not
/// describe a valid [`LeapSecondTable`](crate::LeapSecondTable).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LeapSecondTableError {
    /// The table has no entries.
    Empty,
    /// The entry starting on this Modified Julian Day does not follow the
    /// previous entry.
    UnorderedDay(i64),
    /// The offset of the entry starting on this Modified Julian Day is not
    /// exactly one second above the previous offset.
    InvalidOffset(i64),
}

impl fmt::Display for LeapSecondTableError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => "leap second table has no entries".fmt(fmt),
            Self::UnorderedDay(day) => write!(
                fmt,
                "leap second entry for modified julian day {} is out of order",
                day
            ),
            Self::InvalidOffset(day) => write!(
                fmt,
                "leap second entry for modified julian day {} does not add exactly one second",
                day
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LeapSecondTableError {}
