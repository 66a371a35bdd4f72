//! Historical leap second table.

use alloc::borrow::Cow;
use alloc::vec::Vec;

use crate::{LeapSecondTableError, NANOS_PER_DAY, NANOS_PER_SEC};

/// A step of the TAI − UTC offset.
///
/// From the Modified Julian Day `day` onward, TAI is ahead of UTC by `offset`
/// seconds. Except for the first entry of a table, which merely sets the base
/// offset, an entry denotes a positive leap second inserted at the very end of
/// `day - 1`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LeapSecondEntry {
    /// The Modified Julian Day from which the offset applies.
    pub day: i64,
    /// The cumulative TAI − UTC offset in seconds.
    pub offset: i64,
}

impl LeapSecondEntry {
    /// Creates an entry.
    pub const fn new(day: i64, offset: i64) -> Self {
        Self { day, offset }
    }
}

const fn entry(day: i64, offset: i64) -> LeapSecondEntry {
    LeapSecondEntry::new(day, offset)
}

/// TAI − UTC since the inception of integral leap seconds, as published by
/// the IERS in bulletin C.
const IERS_ENTRIES: &[LeapSecondEntry] = &[
    entry(41_317, 10), // 1972-01-01
    entry(41_499, 11), // 1972-07-01
    entry(41_683, 12), // 1973-01-01
    entry(42_048, 13), // 1974-01-01
    entry(42_413, 14), // 1975-01-01
    entry(42_778, 15), // 1976-01-01
    entry(43_144, 16), // 1977-01-01
    entry(43_509, 17), // 1978-01-01
    entry(43_874, 18), // 1979-01-01
    entry(44_239, 19), // 1980-01-01
    entry(44_786, 20), // 1981-07-01
    entry(45_151, 21), // 1982-07-01
    entry(45_516, 22), // 1983-07-01
    entry(46_247, 23), // 1985-07-01
    entry(47_161, 24), // 1988-01-01
    entry(47_892, 25), // 1990-01-01
    entry(48_257, 26), // 1991-01-01
    entry(48_804, 27), // 1992-07-01
    entry(49_169, 28), // 1993-07-01
    entry(49_534, 29), // 1994-07-01
    entry(50_083, 30), // 1996-01-01
    entry(50_630, 31), // 1997-07-01
    entry(51_179, 32), // 1999-01-01
    entry(53_736, 33), // 2006-01-01
    entry(54_832, 34), // 2009-01-01
    entry(56_109, 35), // 2012-07-01
    entry(57_204, 36), // 2015-07-01
    entry(57_754, 37), // 2017-01-01
];

static BUILTIN: LeapSecondTable = LeapSecondTable {
    entries: Cow::Borrowed(IERS_ENTRIES),
};

/// An immutable record of the cumulative TAI − UTC offset by day.
///
/// A table is the sole source of truth regarding the length of UTC days: a
/// day is 86 400 seconds long unless a leap second is inserted at its end, in
/// which case it lasts 86 401 seconds.
///
/// Days preceding the first entry are treated as ordinary days, with the
/// offset of the first entry. No attempt is made to model the pre-1972
/// rubber-second UTC.
///
/// The [builtin](Self::builtin) table is a `static` value and is shared by all
/// threads without synchronization. Alternate tables may be constructed with
/// [`new`](Self::new) or [`with_leap_day`](Self::with_leap_day) and used
/// through [`UtcRules`](crate::UtcRules).
///
/// # Examples
///
/// ```
/// use leap_time::LeapSecondTable;
///
/// let table = LeapSecondTable::builtin();
///
/// // A leap second was inserted at the end of 1972-12-31 (MJD 41682).
/// assert!(table.is_leap_day(41_682));
/// assert_eq!(table.offset_before(41_682), 11);
/// assert_eq!(table.offset_before(41_683), 12);
/// assert_eq!(table.day_length_nanos(41_682), 86_401_000_000_000);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LeapSecondTable {
    entries: Cow<'static, [LeapSecondEntry]>,
}

impl LeapSecondTable {
    /// Returns the table of all leap seconds announced by the IERS up to the
    /// release of this crate.
    pub fn builtin() -> &'static LeapSecondTable {
        &BUILTIN
    }

    /// Creates a table from a list of entries.
    ///
    /// Entries must be sorted by strictly increasing day, and each entry after
    /// the first must raise the offset by exactly one second.
    ///
    /// # Examples
    ///
    /// ```
    /// use leap_time::{LeapSecondEntry, LeapSecondTable, LeapSecondTableError};
    ///
    /// let table = LeapSecondTable::new(vec![
    ///     LeapSecondEntry::new(100, 5),
    ///     LeapSecondEntry::new(200, 6),
    /// ])
    /// .unwrap();
    /// assert!(table.is_leap_day(199));
    ///
    /// assert_eq!(
    ///     LeapSecondTable::new(vec![
    ///         LeapSecondEntry::new(100, 5),
    ///         LeapSecondEntry::new(200, 7),
    ///     ]),
    ///     Err(LeapSecondTableError::InvalidOffset(200))
    /// );
    /// ```
    pub fn new(entries: Vec<LeapSecondEntry>) -> Result<Self, LeapSecondTableError> {
        if entries.is_empty() {
            debug!("rejected empty leap second table");
            return Err(LeapSecondTableError::Empty);
        }
        for pair in entries.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if next.day <= prev.day {
                debug!("leap second entry {:?} follows {:?}", next, prev);
                return Err(LeapSecondTableError::UnorderedDay(next.day));
            }
            if prev.offset.checked_add(1) != Some(next.offset) {
                debug!("leap second entry {:?} follows {:?}", next, prev);
                return Err(LeapSecondTableError::InvalidOffset(next.day));
            }
        }
        trace!("built leap second table with {} entries", entries.len());

        Ok(Self {
            entries: Cow::Owned(entries),
        })
    }

    /// Returns a new table with an additional leap second inserted at the end
    /// of `day`.
    ///
    /// The leap second must be later than all leap seconds of this table.
    ///
    /// # Examples
    ///
    /// ```
    /// use leap_time::LeapSecondTable;
    ///
    /// // A hypothetical leap second at the end of 2030-06-30 (MJD 62_682).
    /// let table = LeapSecondTable::builtin().with_leap_day(62_682).unwrap();
    /// assert!(table.is_leap_day(62_682));
    /// assert_eq!(table.offset_before(62_683), 38);
    /// assert!(!LeapSecondTable::builtin().is_leap_day(62_682));
    /// ```
    pub fn with_leap_day(&self, day: i64) -> Result<Self, LeapSecondTableError> {
        let mut entries = self.entries.to_vec();
        let last = *entries.last().ok_or(LeapSecondTableError::Empty)?;
        let next_day = day
            .checked_add(1)
            .ok_or(LeapSecondTableError::UnorderedDay(day))?;
        let offset = last
            .offset
            .checked_add(1)
            .ok_or(LeapSecondTableError::InvalidOffset(next_day))?;
        entries.push(LeapSecondEntry::new(next_day, offset));

        Self::new(entries)
    }

    /// Returns the entries of the table, sorted by day.
    pub fn entries(&self) -> &[LeapSecondEntry] {
        &self.entries
    }

    /// Returns the TAI − UTC offset in seconds applicable to instants on the
    /// provided Modified Julian Day, excluding a leap second that may be
    /// inserted at the end of this day.
    pub fn offset_before(&self, day: i64) -> i64 {
        let idx = self.entries.partition_point(|e| e.day <= day);

        self.entries[idx.saturating_sub(1)].offset
    }

    /// Returns whether a leap second is inserted at the end of the provided
    /// Modified Julian Day.
    pub fn is_leap_day(&self, day: i64) -> bool {
        match day.checked_add(1) {
            Some(next_day) => matches!(
                self.entries.binary_search_by_key(&next_day, |e| e.day),
                Ok(idx) if idx > 0
            ),
            None => false,
        }
    }

    /// Returns the length in nanoseconds of the provided Modified Julian Day.
    pub fn day_length_nanos(&self, day: i64) -> i64 {
        if self.is_leap_day(day) {
            NANOS_PER_DAY + NANOS_PER_SEC as i64
        } else {
            NANOS_PER_DAY
        }
    }

    /// Returns the earliest leap day that is equal to or later than the
    /// provided Modified Julian Day, if any.
    pub fn next_leap_day(&self, day: i64) -> Option<i64> {
        let idx = self.entries.partition_point(|e| e.day <= day).max(1);

        self.entries.get(idx).map(|e| e.day - 1)
    }

    /// Returns the latest leap day that is equal to or earlier than the
    /// provided Modified Julian Day, if any.
    pub fn previous_leap_day(&self, day: i64) -> Option<i64> {
        let idx = self.entries.partition_point(|e| e.day.saturating_sub(1) <= day);

        if idx >= 2 {
            Some(self.entries[idx - 1].day - 1)
        } else {
            None
        }
    }
}

impl Default for LeapSecondTable {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_is_valid() {
        let table = LeapSecondTable::builtin();

        assert_eq!(
            LeapSecondTable::new(table.entries().to_vec()).as_ref(),
            Ok(table)
        );
    }

    #[test]
    fn offset_before() {
        let table = LeapSecondTable::builtin();

        assert_eq!(table.offset_before(0), 10);
        assert_eq!(table.offset_before(41_316), 10);
        assert_eq!(table.offset_before(41_317), 10);
        assert_eq!(table.offset_before(41_498), 10);
        assert_eq!(table.offset_before(41_499), 11);
        assert_eq!(table.offset_before(57_753), 36);
        assert_eq!(table.offset_before(57_754), 37);
        assert_eq!(table.offset_before(i64::MAX), 37);
        assert_eq!(table.offset_before(i64::MIN), 10);
    }

    #[test]
    fn leap_days() {
        let table = LeapSecondTable::builtin();

        assert!(table.is_leap_day(41_498)); // 1972-06-30
        assert!(table.is_leap_day(41_682)); // 1972-12-31
        assert!(table.is_leap_day(57_753)); // 2016-12-31
        assert!(!table.is_leap_day(41_316)); // 1971-12-31
        assert!(!table.is_leap_day(41_683));
        assert!(!table.is_leap_day(0));
        assert!(!table.is_leap_day(i64::MAX));

        let leap_day_count = (40_000..60_000).filter(|&d| table.is_leap_day(d)).count();
        assert_eq!(leap_day_count, 27);
    }

    #[test]
    fn day_length() {
        let table = LeapSecondTable::builtin();

        assert_eq!(table.day_length_nanos(41_682), 86_401_000_000_000);
        assert_eq!(table.day_length_nanos(41_683), 86_400_000_000_000);
        assert_eq!(table.day_length_nanos(-1), 86_400_000_000_000);
    }

    #[test]
    fn next_and_previous_leap_day() {
        let table = LeapSecondTable::builtin();

        assert_eq!(table.next_leap_day(0), Some(41_498));
        assert_eq!(table.next_leap_day(41_498), Some(41_498));
        assert_eq!(table.next_leap_day(41_499), Some(41_682));
        assert_eq!(table.next_leap_day(57_753), Some(57_753));
        assert_eq!(table.next_leap_day(57_754), None);

        assert_eq!(table.previous_leap_day(0), None);
        assert_eq!(table.previous_leap_day(41_497), None);
        assert_eq!(table.previous_leap_day(41_498), Some(41_498));
        assert_eq!(table.previous_leap_day(41_682), Some(41_682));
        assert_eq!(table.previous_leap_day(41_681), Some(41_498));
        assert_eq!(table.previous_leap_day(100_000), Some(57_753));
    }

    #[test]
    fn invalid_tables() {
        assert_eq!(
            LeapSecondTable::new(Vec::new()),
            Err(LeapSecondTableError::Empty)
        );
        assert_eq!(
            LeapSecondTable::new(alloc::vec![entry(10, 1), entry(10, 2)]),
            Err(LeapSecondTableError::UnorderedDay(10))
        );
        assert_eq!(
            LeapSecondTable::new(alloc::vec![entry(10, 1), entry(20, 1)]),
            Err(LeapSecondTableError::InvalidOffset(20))
        );
        assert_eq!(
            LeapSecondTable::new(alloc::vec![entry(10, 1), entry(20, 0)]),
            Err(LeapSecondTableError::InvalidOffset(20))
        );
        assert_eq!(
            LeapSecondTable::builtin().with_leap_day(50_000),
            Err(LeapSecondTableError::UnorderedDay(50_001))
        );
    }

    #[test]
    fn single_entry_table() {
        let table = LeapSecondTable::new(alloc::vec![entry(0, 0)]).unwrap();

        assert_eq!(table.offset_before(-5), 0);
        assert!(!table.is_leap_day(-1));
        assert_eq!(table.next_leap_day(-10), None);
        assert_eq!(table.previous_leap_day(10), None);
    }
}
