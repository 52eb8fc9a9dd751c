//! Date stamps embedded in asset names
//!
//! Dated assets follow the naming convention `<prefix>_<YYMMDD>[.json]`,
//! for example `onews_250413.json` or `news_images_250413`. The six-digit
//! suffix segment is the only age signal the archive keeps for an asset;
//! there is no separately stored creation timestamp. The pruner relies on
//! this convention, so it is an external contract shared with the
//! downstream file server.

use chrono::{Local, NaiveDate};
use std::fmt;

/// A calendar day encoded as a six-digit `YYMMDD` stamp
///
/// The stamp is computed once at process start and threaded through the
/// configuration so that a run straddling midnight names all of its assets
/// consistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateStamp(NaiveDate);

impl DateStamp {
    /// Stamp for the current wall-clock date
    pub fn today() -> Self {
        DateStamp(Local::now().date_naive())
    }

    /// Stamp for an arbitrary calendar day
    pub fn from_date(date: NaiveDate) -> Self {
        DateStamp(date)
    }

    /// The calendar day this stamp encodes
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Parse a raw six-digit `YYMMDD` segment
    ///
    /// Returns `None` unless `raw` is exactly six ASCII digits that decode
    /// to a valid calendar day. Two-digit years map into the 2000s the same
    /// way `%y` does everywhere else.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(raw, "%y%m%d").ok().map(DateStamp)
    }

    /// Whole days between this stamp and `today`
    ///
    /// Negative when the stamp lies in the future.
    pub fn age_days(&self, today: DateStamp) -> i64 {
        (today.0 - self.0).num_days()
    }
}

impl fmt::Display for DateStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%y%m%d"))
    }
}

/// Find the raw stamp segment in an asset name
///
/// Scans for the first `_` that is followed by six ASCII digits and returns
/// those six characters. Whether they decode to a real calendar day is a
/// separate question answered by [`DateStamp::parse`]; the pruner logs the
/// two failure cases differently.
pub fn find_raw_stamp(name: &str) -> Option<&str> {
    let bytes = name.as_bytes();
    let mut from = 0;
    while let Some(pos) = name[from..].find('_') {
        let start = from + pos + 1;
        if bytes.len() >= start + 6 && bytes[start..start + 6].iter().all(u8::is_ascii_digit) {
            return Some(&name[start..start + 6]);
        }
        from = start;
    }
    None
}

/// Convenience wrapper: extract and parse the stamp in one step
pub fn stamp_of(name: &str) -> Option<DateStamp> {
    find_raw_stamp(name).and_then(DateStamp::parse)
}
