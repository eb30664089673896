//! Common helper functions for candlestick pattern detection
//!
//! Default factors and exact-decimal comparisons shared across detector modules.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{Ohlc, OhlcExt};

// ============================================================
// DEFAULT FACTORS
// ============================================================

/// Hammer: lower shadow must exceed body * HAMMER_SHADOW_FACTOR
pub const HAMMER_SHADOW_FACTOR: Decimal = dec!(2);
/// Three white soldiers: upper shadow <= body * UPPER_SHADOW_FACTOR
pub const UPPER_SHADOW_FACTOR: Decimal = dec!(0.5);
/// Evening star: star body <= first body * STAR_BODY_FACTOR
pub const STAR_BODY_FACTOR: Decimal = dec!(0.5);
/// Evening star: third close must sink below first close - first body * PENETRATION
pub const PENETRATION: Decimal = dec!(0.3);

// ============================================================
// HELPER FUNCTIONS
// ============================================================

/// Hammer shape check.
///
/// Close must be at the high (no upper shadow) and the lower shadow must be
/// strictly longer than `factor` times the body. A lower shadow of exactly
/// `factor * body` does not qualify. `factor` is non-negative.
///
/// Never overflows: a `factor * body` past `Decimal::MAX` is longer than any
/// shadow, and a shadow past the bounds takes the sign of `body_bottom - low`.
#[inline]
pub fn hammer_shape<T: Ohlc + ?Sized>(bar: &T, factor: Decimal) -> bool {
    if bar.high() > bar.close() {
        return false;
    }
    let Some(limit) = scaled_body(bar, factor) else {
        return false;
    };
    match bar.checked_lower_shadow() {
        Some(shadow) => shadow > limit,
        None => bar.body_bottom() > bar.low(),
    }
}

/// `factor * body`, or `None` when it does not fit in a `Decimal`
#[inline]
pub fn scaled_body<T: Ohlc + ?Sized>(bar: &T, factor: Decimal) -> Option<Decimal> {
    bar.checked_body().and_then(|body| body.checked_mul(factor))
}

/// Real body of `next` sits entirely above the real body of `prev`
#[inline]
pub fn body_gaps_up<T: Ohlc + ?Sized>(prev: &T, next: &T) -> bool {
    next.body_bottom() > prev.body_top()
}

/// `next` opens inside `prev`'s bullish body: above its open, at or below its close
#[inline]
pub fn opens_within_bullish_body<T: Ohlc + ?Sized>(prev: &T, next: &T) -> bool {
    next.open() > prev.open() && next.open() <= prev.close()
}

/// Upper shadow no longer than `factor` times the body (`factor >= 0`)
///
/// When both sides overflow the comparison is undecidable and reported false.
#[inline]
pub fn upper_shadow_within<T: Ohlc + ?Sized>(bar: &T, factor: Decimal) -> bool {
    match (bar.checked_upper_shadow(), scaled_body(bar, factor)) {
        (Some(shadow), Some(limit)) => shadow <= limit,
        (Some(_), None) => true,
        (None, _) => bar.high() < bar.body_top(),
    }
}
