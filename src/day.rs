//! Validated daily OHLC record
//!
//! A [`DayRecord`] is built once from typed values and never changes. The
//! hammer flag is evaluated at construction and cached.
//!
//! Equality compares all five price/date fields, while [`DayRecord::cmp_by_date`]
//! orders by date alone. Two records for the same session with different prices
//! are unequal yet compare `Equal` by date, so the date ordering is exposed as a
//! named comparator instead of an `Ord` impl.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::detectors::{hammer_shape, HAMMER_SHADOW_FACTOR};
use crate::{Ohlc, PatternError, Result};

/// Date format used both when parsing input rows and when reporting matches.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// One trading session
#[derive(Debug, Clone, serde::Serialize)]
pub struct DayRecord {
    date: NaiveDate,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    is_hammer: bool,
}

impl DayRecord {
    /// Create a record, rejecting sessions whose high is below their low.
    ///
    /// `high == low` is accepted. Open and close are not checked against the
    /// `[low, high]` range.
    pub fn new(
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> Result<Self> {
        if high < low {
            return Err(PatternError::Validation {
                date,
                reason: "high is below low",
            });
        }

        let mut record = Self {
            date,
            open,
            high,
            low,
            close,
            is_hammer: false,
        };
        record.is_hammer = hammer_shape(&record, HAMMER_SHADOW_FACTOR);
        Ok(record)
    }

    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[inline]
    pub fn open(&self) -> Decimal {
        self.open
    }

    #[inline]
    pub fn high(&self) -> Decimal {
        self.high
    }

    #[inline]
    pub fn low(&self) -> Decimal {
        self.low
    }

    #[inline]
    pub fn close(&self) -> Decimal {
        self.close
    }

    /// Cached result of the hammer predicate with the standard factor of 2
    #[inline]
    pub fn is_hammer(&self) -> bool {
        self.is_hammer
    }

    /// Order two records by session date only.
    #[inline]
    pub fn cmp_by_date(&self, other: &Self) -> Ordering {
        self.date.cmp(&other.date)
    }
}

impl Ohlc for DayRecord {
    fn open(&self) -> Decimal {
        self.open
    }

    fn high(&self) -> Decimal {
        self.high
    }

    fn low(&self) -> Decimal {
        self.low
    }

    fn close(&self) -> Decimal {
        self.close
    }
}

impl PartialEq for DayRecord {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
            && self.open == other.open
            && self.high == other.high
            && self.low == other.low
            && self.close == other.close
    }
}

impl Eq for DayRecord {}

impl Hash for DayRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.date.hash(state);
        self.open.hash(state);
        self.high.hash(state);
        self.low.hash(state);
        self.close.hash(state);
    }
}

impl fmt::Display for DayRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} open={} high={} low={} close={}",
            self.date.format(DATE_FORMAT),
            self.open,
            self.high,
            self.low,
            self.close
        )?;
        if self.is_hammer {
            f.write_str(" (hammer)")?;
        }
        Ok(())
    }
}

impl<'de> serde::Deserialize<'de> for DayRecord {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            date: NaiveDate,
            open: Decimal,
            high: Decimal,
            low: Decimal,
            close: Decimal,
        }

        let raw = Raw::deserialize(d)?;
        DayRecord::new(raw.date, raw.open, raw.high, raw.low, raw.close)
            .map_err(serde::de::Error::custom)
    }
}

/// Stable sort by date; records sharing a date keep their relative order.
pub fn sort_by_date(days: &mut [DayRecord]) {
    days.sort_by(DayRecord::cmp_by_date);
}

/// True when dates never decrease along the slice
pub fn is_sorted_by_date(days: &[DayRecord]) -> bool {
    days.windows(2).all(|w| w[0].date <= w[1].date)
}

/// Binary search a date-sorted slice for a session date.
///
/// Same contract as [`slice::binary_search_by`]: `Ok` holds the index of some
/// record with that date, `Err` the insertion point.
pub fn binary_search_by_date(
    days: &[DayRecord],
    date: NaiveDate,
) -> std::result::Result<usize, usize> {
    days.binary_search_by(|d| d.date.cmp(&date))
}
