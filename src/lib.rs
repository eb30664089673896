//! # stockday
//!
//! Daily stock price records classified against candlestick patterns, using
//! exact decimal arithmetic throughout.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use stockday::prelude::*;
//!
//! let date = NaiveDate::from_ymd_opt(2016, 10, 31).unwrap();
//! let day = DayRecord::new(date, dec!(10.00), dec!(10.00), dec!(2.00), dec!(10.00)).unwrap();
//! assert!(day.is_hammer());
//!
//! // Classifier with every builtin pattern
//! let classifier = ClassifierBuilder::new()
//!     .with_all_defaults()
//!     .build()
//!     .unwrap();
//!
//! let matches = classifier.find_matches("hammer", &[day]).unwrap();
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].to_string(), "hammer: 31/10/2016");
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

pub mod day;
pub mod detectors;
pub mod loader;
pub mod params;

pub use day::{binary_search_by_date, is_sorted_by_date, sort_by_date, DayRecord, DATE_FORMAT};

pub mod prelude {
    pub use crate::{
        // Detectors
        detectors::*,
        // Loader
        loader::{load_from_reader, load_from_str, InvalidRowPolicy, LoadError, LoadOptions, LoadReport},
        // Parameters
        params::{get_factor, ParamMeta, ParameterizedDetector},
        // Parallel
        scan_parallel,
        // Convenience
        find_matches,
        // Engine
        BuiltinDetector,
        Classifier,
        ClassifierBuilder,
        ClassifierConfig,
        // Records
        DayRecord,
        Direction,
        Ohlc,
        OhlcExt,
        // Core trait
        PatternDetector,
        // Errors
        PatternError,
        PatternId,
        PatternMatch,
        Result,
        ScanError,
        ScanResult,
        DATE_FORMAT,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors raised by record construction and pattern classification
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid day {}: {reason}", .date.format(DATE_FORMAT))]
    Validation {
        date: NaiveDate,
        reason: &'static str,
    },

    #[error("Unsupported pattern: {0}")]
    UnsupportedPattern(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: Decimal,
        min: Decimal,
        max: Decimal,
    },
}

// ============================================================
// OHLC TRAITS
// ============================================================

/// Core OHLC price trait
pub trait Ohlc {
    fn open(&self) -> Decimal;
    fn high(&self) -> Decimal;
    fn low(&self) -> Decimal;
    fn close(&self) -> Decimal;
}

/// Extension trait with computed candle geometry
///
/// Lengths saturate at the `Decimal` bounds; the `checked_*` variants return
/// `None` instead, for predicates that must stay exact near the limits.
pub trait OhlcExt: Ohlc {
    /// Box height, `|close - open|`
    #[inline]
    fn body(&self) -> Decimal {
        self.close().saturating_sub(self.open()).abs()
    }

    #[inline]
    fn range(&self) -> Decimal {
        self.high().saturating_sub(self.low())
    }

    #[inline]
    fn checked_body(&self) -> Option<Decimal> {
        self.close().checked_sub(self.open()).map(|d| d.abs())
    }

    #[inline]
    fn checked_upper_shadow(&self) -> Option<Decimal> {
        self.high().checked_sub(self.body_top())
    }

    #[inline]
    fn checked_lower_shadow(&self) -> Option<Decimal> {
        self.body_bottom().checked_sub(self.low())
    }

    #[inline]
    fn body_top(&self) -> Decimal {
        self.open().max(self.close())
    }

    #[inline]
    fn body_bottom(&self) -> Decimal {
        self.open().min(self.close())
    }

    #[inline]
    fn upper_shadow(&self) -> Decimal {
        self.high().saturating_sub(self.body_top())
    }

    #[inline]
    fn lower_shadow(&self) -> Decimal {
        self.body_bottom().saturating_sub(self.low())
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }
}

impl<T: Ohlc + ?Sized> OhlcExt for T {}

// ============================================================
// PATTERN MATCH
// ============================================================

/// Identifier of a pattern, also the name callers select it by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(pub &'static str);

impl PatternId {
    pub const HAMMER: PatternId = PatternId("hammer");
    pub const THREE_WHITE_SOLDIERS: PatternId = PatternId("three_white_soldiers");
    pub const EVENING_STAR: PatternId = PatternId("evening_star");

    /// Returns the string identifier
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Typical direction of the builtin patterns; `None` for unknown ids
    pub fn typical_direction(&self) -> Option<Direction> {
        match self.0 {
            "hammer" | "three_white_soldiers" => Some(Direction::Bullish),
            "evening_star" => Some(Direction::Bearish),
            _ => None,
        }
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl serde::Serialize for PatternId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

/// Direction/bias of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Bullish,
    Neutral,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }
}

/// One window of days satisfying a pattern
///
/// Indices refer to the date-ordered sequence that was scanned. For single-day
/// patterns `start_date == end_date`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PatternMatch {
    pub pattern_id: PatternId,
    pub direction: Direction,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_index: usize,
    pub end_index: usize,
    pub records: Vec<DayRecord>,
}

impl PatternMatch {
    fn from_window(
        pattern_id: PatternId,
        direction: Direction,
        start_index: usize,
        window: &[DayRecord],
    ) -> Option<Self> {
        let first = window.first()?;
        let last = window.last()?;
        Some(Self {
            pattern_id,
            direction,
            start_date: first.date(),
            end_date: last.date(),
            start_index,
            end_index: start_index + window.len() - 1,
            records: window.to_vec(),
        })
    }

    #[inline]
    pub fn is_single_day(&self) -> bool {
        self.start_index == self.end_index
    }
}

impl fmt::Display for PatternMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pattern_id, self.start_date.format(DATE_FORMAT))?;
        if !self.is_single_day() {
            write!(f, " - {}", self.end_date.format(DATE_FORMAT))?;
        }
        Ok(())
    }
}

// ============================================================
// PATTERN DETECTOR TRAIT
// ============================================================

/// Category of pattern by number of bars
///
/// Builtins are single- and three-bar; custom detectors may use any window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternCategory {
    SingleBar,
    TwoBar,
    ThreeBar,
    MultiBar,
}

impl fmt::Display for PatternCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            PatternCategory::SingleBar => "single-bar",
            PatternCategory::TwoBar => "two-bar",
            PatternCategory::ThreeBar => "three-bar",
            PatternCategory::MultiBar => "multi-bar",
        })
    }
}

/// Additional metadata about a pattern
#[derive(Debug, Clone)]
pub struct PatternMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub category: PatternCategory,
    pub direction: Direction,
}

/// Window predicate for one named pattern
///
/// `matches` receives exactly `window_size()` consecutive days, oldest first,
/// and must be a pure function of them.
pub trait PatternDetector: Send + Sync {
    fn id(&self) -> PatternId;
    fn window_size(&self) -> usize;
    fn direction(&self) -> Direction;
    fn matches(&self, window: &[DayRecord]) -> bool;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }

    fn description(&self) -> &'static str {
        ""
    }

    fn metadata(&self) -> PatternMetadata {
        PatternMetadata {
            name: self.id().0,
            description: self.description(),
            category: match self.window_size() {
                1 => PatternCategory::SingleBar,
                2 => PatternCategory::TwoBar,
                3 => PatternCategory::ThreeBar,
                _ => PatternCategory::MultiBar,
            },
            direction: self.direction(),
        }
    }
}

// ============================================================
// BUILTIN DETECTORS - generated via macro
// ============================================================

use detectors::*;

/// Macro to generate BuiltinDetector enum without boilerplate
macro_rules! define_builtin_detectors {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// All builtin detectors - enum dispatch, no vtable
        #[derive(Debug, Clone)]
        pub enum BuiltinDetector {
            $($variant($detector)),*
        }

        impl PatternDetector for BuiltinDetector {
            #[inline]
            fn id(&self) -> PatternId {
                match self {
                    $(Self::$variant(d) => PatternDetector::id(d)),*
                }
            }

            #[inline]
            fn window_size(&self) -> usize {
                match self {
                    $(Self::$variant(d) => PatternDetector::window_size(d)),*
                }
            }

            #[inline]
            fn direction(&self) -> Direction {
                match self {
                    $(Self::$variant(d) => PatternDetector::direction(d)),*
                }
            }

            #[inline]
            fn matches(&self, window: &[DayRecord]) -> bool {
                match self {
                    $(Self::$variant(d) => PatternDetector::matches(d, window)),*
                }
            }

            fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(d) => PatternDetector::validate_config(d)),*
                }
            }

            fn description(&self) -> &'static str {
                match self {
                    $(Self::$variant(d) => PatternDetector::description(d)),*
                }
            }
        }

        impl BuiltinDetector {
            /// Build the builtin detector named `name` from a parameter map.
            pub fn with_params(name: &str, params: &HashMap<&str, Decimal>) -> Result<Self> {
                $(
                    if name == <$detector as crate::params::ParameterizedDetector>::pattern_id().as_str() {
                        let detector =
                            <$detector as crate::params::ParameterizedDetector>::with_params(params)?;
                        return Ok(Self::$variant(detector));
                    }
                )*
                Err(PatternError::UnsupportedPattern(name.to_string()))
            }
        }
    };
}

/// Generate an array of `BuiltinDetector` variants using `Default::default()` for each inner type.
macro_rules! builtin_defaults {
  ($($variant:ident),* $(,)?) => {
    [$(BuiltinDetector::$variant(Default::default())),*]
  };
}

define_builtin_detectors! {
    // Single bar
    Hammer(HammerDetector),

    // Three bar
    ThreeWhiteSoldiers(ThreeWhiteSoldiersDetector),
    EveningStar(EveningStarDetector),
}

// ============================================================
// CLASSIFIER
// ============================================================

/// Classifier configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Sort input by date (stable) before scanning when it is out of order
    pub sort_input: bool,
    /// Evaluate windows on the rayon pool
    pub parallel: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            sort_input: true,
            parallel: false,
        }
    }
}

/// Pattern classifier: named detectors plus the window scan
pub struct Classifier {
    builtin: Vec<BuiltinDetector>,
    custom: Vec<Box<dyn PatternDetector>>,
    config: ClassifierConfig,
}

impl Default for Classifier {
    /// All builtin patterns, default configuration
    fn default() -> Self {
        let builder = ClassifierBuilder::new().with_all_defaults();
        Self {
            builtin: builder.builtin,
            custom: builder.custom,
            config: builder.config,
        }
    }
}

impl Classifier {
    #[inline]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Registered pattern ids, builtin first, in registration order
    pub fn patterns(&self) -> Vec<PatternId> {
        self.detectors().map(|d| d.id()).collect()
    }

    /// Look up the detector registered under `name`
    pub fn detector(&self, name: &str) -> Option<&dyn PatternDetector> {
        self.detectors().find(|d| d.id().as_str() == name)
    }

    /// Every window of `days` satisfying the pattern called `name`, in date order.
    pub fn find_matches(&self, name: &str, days: &[DayRecord]) -> Result<Vec<PatternMatch>> {
        let detector = self
            .detector(name)
            .ok_or_else(|| PatternError::UnsupportedPattern(name.to_string()))?;

        let days = self.ordered(days);
        let matches = self.scan_detector(detector, &days);

        debug!(
            pattern = name,
            days = days.len(),
            matches = matches.len(),
            "pattern scan complete"
        );
        Ok(matches)
    }

    /// Matches for every registered pattern, ordered by the window's last day
    /// and then by registration order.
    pub fn scan_all(&self, days: &[DayRecord]) -> Vec<PatternMatch> {
        let days = self.ordered(days);
        let mut matches: Vec<PatternMatch> = self
            .detectors()
            .flat_map(|d| self.scan_detector(d, &days))
            .collect();
        matches.sort_by_key(|m| m.end_index);

        debug!(days = days.len(), matches = matches.len(), "full scan complete");
        matches
    }

    /// Whether the window of `name` ending at `end_index` matches.
    ///
    /// Indices past the end, or too early to fit a full window, never match.
    pub fn matches_at(&self, name: &str, days: &[DayRecord], end_index: usize) -> Result<bool> {
        let detector = self
            .detector(name)
            .ok_or_else(|| PatternError::UnsupportedPattern(name.to_string()))?;

        let days = self.ordered(days);
        let size = detector.window_size();
        if end_index >= days.len() || end_index + 1 < size {
            return Ok(false);
        }
        Ok(detector.matches(&days[end_index + 1 - size..=end_index]))
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn detectors(&self) -> impl Iterator<Item = &dyn PatternDetector> {
        self.builtin
            .iter()
            .map(|d| d as &dyn PatternDetector)
            .chain(self.custom.iter().map(|d| d.as_ref() as &dyn PatternDetector))
    }

    fn ordered<'a>(&self, days: &'a [DayRecord]) -> Cow<'a, [DayRecord]> {
        if !self.config.sort_input || is_sorted_by_date(days) {
            return Cow::Borrowed(days);
        }
        debug!(days = days.len(), "input out of date order, sorting");
        let mut owned = days.to_vec();
        sort_by_date(&mut owned);
        Cow::Owned(owned)
    }

    fn scan_detector(&self, detector: &dyn PatternDetector, days: &[DayRecord]) -> Vec<PatternMatch> {
        let size = detector.window_size();
        if size == 0 || days.len() < size {
            return Vec::new();
        }

        if self.config.parallel {
            days.par_windows(size)
                .enumerate()
                .filter_map(|(i, window)| evaluate(detector, i, window))
                .collect()
        } else {
            days.windows(size)
                .enumerate()
                .filter_map(|(i, window)| evaluate(detector, i, window))
                .collect()
        }
    }

    fn validate(&self) -> Result<()> {
        let mut seen: Vec<PatternId> = Vec::new();
        for d in self.detectors() {
            d.validate_config()?;
            if d.window_size() == 0 {
                return Err(PatternError::InvalidConfig(format!(
                    "{}: window size must be > 0",
                    d.id()
                )));
            }
            if seen.contains(&d.id()) {
                return Err(PatternError::InvalidConfig(format!(
                    "{}: registered more than once",
                    d.id()
                )));
            }
            seen.push(d.id());
        }
        Ok(())
    }
}

#[inline]
fn evaluate(detector: &dyn PatternDetector, start: usize, window: &[DayRecord]) -> Option<PatternMatch> {
    if !detector.matches(window) {
        return None;
    }
    PatternMatch::from_window(detector.id(), detector.direction(), start, window)
}

/// Scan `days` for `name` with the default classifier.
pub fn find_matches(name: &str, days: &[DayRecord]) -> Result<Vec<PatternMatch>> {
    Classifier::default().find_matches(name, days)
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating Classifier instances
#[derive(Default)]
pub struct ClassifierBuilder {
    builtin: Vec<BuiltinDetector>,
    custom: Vec<Box<dyn PatternDetector>>,
    config: ClassifierConfig,
}

impl ClassifierBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add all builtin patterns with default configurations
    pub fn with_all_defaults(self) -> Self {
        self.with_single_bar_defaults().with_three_bar_defaults()
    }

    /// Add single-bar patterns with defaults
    pub fn with_single_bar_defaults(mut self) -> Self {
        self.builtin.extend(builtin_defaults![Hammer]);
        self
    }

    /// Add three-bar patterns with defaults
    pub fn with_three_bar_defaults(mut self) -> Self {
        self.builtin
            .extend(builtin_defaults![ThreeWhiteSoldiers, EveningStar]);
        self
    }

    /// Add a builtin detector
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, detector: BuiltinDetector) -> Self {
        self.builtin.push(detector);
        self
    }

    /// Add with config validation
    pub fn add_checked(mut self, detector: BuiltinDetector) -> Result<Self> {
        detector.validate_config()?;
        self.builtin.push(detector);
        Ok(self)
    }

    /// Add a custom detector (dynamic dispatch)
    pub fn add_custom<D: PatternDetector + 'static>(mut self, detector: D) -> Self {
        self.custom.push(Box::new(detector));
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable/disable defensive date sorting
    pub fn sort_input(mut self, enable: bool) -> Self {
        self.config.sort_input = enable;
        self
    }

    /// Enable/disable parallel window evaluation
    pub fn parallel(mut self, enable: bool) -> Self {
        self.config.parallel = enable;
        self
    }

    /// Build the classifier, rejecting invalid or duplicate detectors
    pub fn build(self) -> Result<Classifier> {
        let classifier = Classifier {
            builtin: self.builtin,
            custom: self.custom,
            config: self.config,
        };
        classifier.validate()?;
        Ok(classifier)
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of scanning a single instrument
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub matches: Vec<PatternMatch>,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: PatternError,
}

/// Parallel scanning of multiple instruments for one pattern
pub fn scan_parallel<'a, I>(
    classifier: &Classifier,
    name: &str,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    I: IntoParallelIterator<Item = (&'a str, &'a [DayRecord])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, days)| {
            classifier
                .find_matches(name, days)
                .map(|matches| ScanResult {
                    symbol: symbol.to_string(),
                    matches,
                })
                .map_err(|error| ScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
