//! Integration tests for stockday pattern classification.
//!
//! These tests validate the API and core functionality.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stockday::prelude::*;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 11, d).unwrap()
}

fn day(d: u32, o: Decimal, h: Decimal, l: Decimal, c: Decimal) -> DayRecord {
    DayRecord::new(date(d), o, h, l, c).unwrap()
}

/// Quiet days with an upper shadow, never a hammer
fn make_plain(n: u32) -> Vec<DayRecord> {
    (1..=n)
        .map(|d| day(d, dec!(58.25), dec!(58.65), dec!(58.20), dec!(58.35)))
        .collect()
}

// ============================================================
// DAY RECORD
// ============================================================

#[test]
fn test_reference_day_is_not_hammer() {
    let day = DayRecord::new(
        NaiveDate::from_ymd_opt(2016, 10, 31).unwrap(),
        dec!(58.25),
        dec!(58.65),
        dec!(58.20),
        dec!(58.35),
    )
    .unwrap();
    assert!(!day.is_hammer());
}

#[test]
fn test_flat_body_at_high_is_hammer() {
    let day = day(1, dec!(10.00), dec!(10.00), dec!(2.00), dec!(10.00));
    assert!(day.is_hammer());
}

#[test]
fn test_shadow_exactly_twice_body_is_not_hammer() {
    // body 1.00, lower shadow 2.00
    let day = day(1, dec!(9.00), dec!(10.00), dec!(7.00), dec!(10.00));
    assert!(!day.is_hammer());
}

#[test]
fn test_high_below_low_rejected() {
    let err = DayRecord::new(date(7), dec!(1), dec!(1), dec!(2), dec!(1)).unwrap_err();
    assert!(matches!(err, PatternError::Validation { .. }));
    assert!(err.to_string().contains("07/11/2016"));
}

#[test]
fn test_equality_finer_than_date_order() {
    let a = day(1, dec!(1), dec!(2), dec!(1), dec!(2));
    let b = day(1, dec!(1), dec!(3), dec!(1), dec!(2));
    assert_ne!(a, b);
    assert_eq!(a.cmp_by_date(&b), std::cmp::Ordering::Equal);
    assert_eq!(a, a.clone());
}

// ============================================================
// HAMMER SCAN
// ============================================================

#[test]
fn test_single_hammer_in_five_days() {
    let mut days = make_plain(5);
    days[2] = day(3, dec!(10.00), dec!(10.00), dec!(2.00), dec!(10.00));

    let matches = find_matches("hammer", &days).unwrap();
    assert_eq!(matches.len(), 1);

    let m = &matches[0];
    assert_eq!(m.pattern_id, PatternId::HAMMER);
    assert_eq!(m.start_date, date(3));
    assert_eq!(m.end_date, date(3));
    assert_eq!(m.start_index, 2);
    assert_eq!(m.records, vec![days[2].clone()]);
    assert_eq!(m.to_string(), "hammer: 03/11/2016");
}

#[test]
fn test_no_hammer_no_report() {
    let matches = find_matches("hammer", &make_plain(10)).unwrap();
    assert!(matches.is_empty());
}

#[test]
fn test_unknown_pattern() {
    let err = find_matches("nonexistent", &make_plain(3)).unwrap_err();
    assert!(matches!(err, PatternError::UnsupportedPattern(ref name) if name == "nonexistent"));
}

// ============================================================
// WINDOW PATTERNS
// ============================================================

#[test]
fn test_three_white_soldiers_scan() {
    let mut days = make_plain(2);
    days.push(day(3, dec!(10.0), dec!(11.1), dec!(9.9), dec!(11.0)));
    days.push(day(4, dec!(10.5), dec!(12.1), dec!(10.4), dec!(12.0)));
    days.push(day(5, dec!(11.5), dec!(13.2), dec!(11.4), dec!(13.0)));

    let matches = find_matches("three_white_soldiers", &days).unwrap();
    assert_eq!(matches.len(), 1);

    let m = &matches[0];
    assert_eq!(m.direction, Direction::Bullish);
    assert_eq!((m.start_index, m.end_index), (2, 4));
    assert_eq!((m.start_date, m.end_date), (date(3), date(5)));
    assert_eq!(m.records.len(), 3);
    assert_eq!(m.to_string(), "three_white_soldiers: 03/11/2016 - 05/11/2016");
}

#[test]
fn test_evening_star_scan() {
    let mut days = make_plain(1);
    days.push(day(2, dec!(10.0), dec!(12.2), dec!(9.8), dec!(12.0)));
    days.push(day(3, dec!(12.5), dec!(13.0), dec!(12.3), dec!(12.7)));
    days.push(day(4, dec!(12.4), dec!(12.5), dec!(10.2), dec!(10.5)));

    let matches = find_matches("evening_star", &days).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].direction, Direction::Bearish);
    assert_eq!(matches[0].start_date, date(2));
    assert_eq!(matches[0].end_date, date(4));
}

#[test]
fn test_window_longer_than_input() {
    let days = make_plain(2);
    assert!(find_matches("evening_star", &days).unwrap().is_empty());
    assert!(find_matches("three_white_soldiers", &days).unwrap().is_empty());
}

#[test]
fn test_window_scan_sorts_input() {
    let soldiers = vec![
        day(5, dec!(11.5), dec!(13.2), dec!(11.4), dec!(13.0)),
        day(3, dec!(10.0), dec!(11.1), dec!(9.9), dec!(11.0)),
        day(4, dec!(10.5), dec!(12.1), dec!(10.4), dec!(12.0)),
    ];
    let matches = find_matches("three_white_soldiers", &soldiers).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].start_date, date(3));
}

#[test]
fn test_scan_all_reports_each_pattern() {
    let days = vec![
        day(1, dec!(10.0), dec!(11.1), dec!(9.9), dec!(11.0)),
        day(2, dec!(10.5), dec!(12.1), dec!(10.4), dec!(12.0)),
        day(3, dec!(11.5), dec!(13.2), dec!(11.4), dec!(13.0)),
        day(4, dec!(13.0), dec!(13.0), dec!(10.0), dec!(13.0)),
    ];
    let matches = Classifier::default().scan_all(&days);
    let found: Vec<_> = matches.iter().map(|m| m.to_string()).collect();
    assert_eq!(
        found,
        vec![
            "three_white_soldiers: 01/11/2016 - 03/11/2016",
            "hammer: 04/11/2016",
        ]
    );
}

// ============================================================
// EXTENSION
// ============================================================

/// Two consecutive bullish days
struct TwoUpDays;

impl PatternDetector for TwoUpDays {
    fn id(&self) -> PatternId {
        PatternId("two_up_days")
    }

    fn window_size(&self) -> usize {
        2
    }

    fn direction(&self) -> Direction {
        Direction::Bullish
    }

    fn matches(&self, window: &[DayRecord]) -> bool {
        window.len() == 2 && window.iter().all(|d| d.is_bullish())
    }
}

#[test]
fn test_custom_detector_plugs_into_scan() {
    let classifier = ClassifierBuilder::new()
        .with_all_defaults()
        .add_custom(TwoUpDays)
        .build()
        .unwrap();

    let days = vec![
        day(1, dec!(1), dec!(2), dec!(1), dec!(2)),
        day(2, dec!(2), dec!(3), dec!(2), dec!(3)),
        day(3, dec!(3), dec!(3), dec!(2), dec!(2)),
    ];
    let matches = classifier.find_matches("two_up_days", &days).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].end_date, date(2));
    assert!(classifier.patterns().contains(&PatternId("two_up_days")));
}

#[test]
fn test_match_serializes() {
    let days = vec![day(1, dec!(10), dec!(10), dec!(2), dec!(10))];
    let matches = find_matches("hammer", &days).unwrap();
    let json = serde_json::to_value(&matches[0]).unwrap();
    assert_eq!(json["pattern_id"], "hammer");
    assert_eq!(json["start_date"], "2016-11-01");
    assert_eq!(json["records"][0]["is_hammer"], true);
}
