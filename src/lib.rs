//! Nanosecond-precision UTC instants with leap seconds, and TAI timestamps.
//!
//! # Overview
//!
//! Most date-time libraries pretend that every UTC day lasts 86 400 seconds,
//! and either ignore or smear the leap seconds which have been inserted since
//! 1972 to keep UTC in sync with the rotation of the Earth. In systems which
//! must count elapsed SI seconds across such events, like telemetry, GNSS or
//! time distribution, this is not an option.
//!
//! This crate provides two time representations and an exact mapping between
//! them:
//!
//! - [`UtcInstant`], a UTC instant represented as a Modified Julian Day and a
//!   nanosecond of day, where a leap day lasts 86 401 seconds and its leap
//!   second is written `23:59:60`,
//! - [`TaiTime`], a leap-second-free [TAI] timestamp represented as a 64-bit
//!   signed number of seconds and a positive number of nanoseconds relative to
//!   an arbitrary epoch (see [`MonotonicTime`], [`GpsTime`] and
//!   [`TaiInstant`]).
//!
//! Which days are leap days, and the TAI − UTC offset of each day, is defined
//! by a [`LeapSecondTable`]. A builtin table covers all leap seconds announced
//! by the IERS; [`UtcRules`] makes it possible to use another table, e.g. one
//! extended with a newly announced leap second.
//!
//! Arithmetic on [`UtcInstant`] uses the signed [`Duration`] type and counts
//! elapsed SI seconds, so that adding one second to `1972-12-31T23:59:59Z`
//! yields `1972-12-31T23:59:60Z`.
//!
//! [TAI]: https://en.wikipedia.org/wiki/International_Atomic_Time
//!
//!
//! # Design choices and limitations
//!
//! Days before the first entry of a leap second table are considered ordinary
//! days, with the TAI − UTC offset of the first entry. The rubber-second era
//! of UTC before 1972 is not modelled.
//!
//! Only positive leap seconds can be represented.
//!
//!
//! # Features flags
//!
//! ### Support for `no-std`
//!
//! By default, this crate enables the `std` feature to implement
//! `std::error::Error` for error types, but specifying `default-features =
//! false` makes it `no-std`-compatible. The `alloc` crate is always required.
//!
//! ### Support for time-related crates
//!
//! Leap-second-aware conversion methods to and from date-time stamps of the
//! [chrono] crate are available with the `chrono` feature.
//!
//! [chrono]: https://crates.io/crates/chrono
//!
//! ### Serialization
//!
//! Timestamps, durations, leap second entries and error types can be
//! (de)serialized with `serde` by activating the `serde` feature. A
//! [`UtcInstant`] is serialized as its ISO 8601 text representation.
//!
//! ### Logging
//!
//! Activating the `logging` feature emits diagnostic records through the
//! [log](https://crates.io/crates/log) crate.
//!
//!
//! # Examples
//!
//! ```
//! use leap_time::{Duration, MonotonicTime, UtcInstant};
//!
//! // The last leap second to date.
//! let t0: UtcInstant = "2016-12-31T23:59:60Z".parse().unwrap();
//! assert!(t0.is_leap_second());
//!
//! // One second later.
//! let t1 = t0 + Duration::new(1, 0);
//! assert_eq!(t1.to_string(), "2017-01-01T00:00:00Z");
//!
//! // The same instant as a TAI timestamp relative to 1970-01-01 00:00:00 TAI.
//! let tai: MonotonicTime = t1.to_tai_time().unwrap();
//! assert_eq!(tai, MonotonicTime::new(1_483_228_837, 0));
//! assert_eq!(tai.to_string(), "2017-01-01 00:00:37");
//! assert_eq!(UtcInstant::from_tai_time(tai), Ok(t1));
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[macro_use]
mod logging;

mod date_time;
mod duration;
mod errors;
mod leap_seconds;
mod rules;
mod tai_time;
mod utc_instant;

pub use duration::Duration;
pub use errors::{DateTimeError, LeapSecondTableError, ParseDateTimeError, RangeError};
pub use leap_seconds::{LeapSecondEntry, LeapSecondTable};
pub use rules::UtcRules;
pub use tai_time::{GpsTime, MonotonicTime, Tai1958Time, TaiInstant, TaiTime};
pub use utc_instant::UtcInstant;

const NANOS_PER_SEC: u32 = 1_000_000_000;
const SECS_PER_DAY: i64 = 86_400;
const NANOS_PER_DAY: i64 = SECS_PER_DAY * NANOS_PER_SEC as i64;
