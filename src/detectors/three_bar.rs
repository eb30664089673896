//! Three-bar candlestick pattern detectors
//!
//! Patterns: three white soldiers, evening star
//!
//! Windows are ordered oldest first.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::helpers::{self, body_gaps_up, opens_within_bullish_body, upper_shadow_within};
use crate::{
  params::{check_known, get_factor, ParamMeta, ParameterizedDetector},
  DayRecord, Direction, OhlcExt, PatternDetector, PatternId, Result,
};

impl_with_defaults!(ThreeWhiteSoldiersDetector, EveningStarDetector);

// ============================================================
// THREE WHITE SOLDIERS
// ============================================================

/// Three white soldiers: three rising bullish candles, each opening inside
/// the previous body and closing near its high
#[derive(Debug, Clone, Copy)]
pub struct ThreeWhiteSoldiersDetector {
  pub upper_shadow_factor: Decimal,
}

impl Default for ThreeWhiteSoldiersDetector {
  fn default() -> Self {
    Self { upper_shadow_factor: helpers::UPPER_SHADOW_FACTOR }
  }
}

impl PatternDetector for ThreeWhiteSoldiersDetector {
  fn id(&self) -> PatternId {
    PatternId::THREE_WHITE_SOLDIERS
  }

  fn window_size(&self) -> usize {
    3
  }

  fn direction(&self) -> Direction {
    Direction::Bullish
  }

  fn matches(&self, window: &[DayRecord]) -> bool {
    let [first, second, third] = window else {
      return false;
    };

    if !first.is_bullish() || !second.is_bullish() || !third.is_bullish() {
      return false;
    }

    // Ascending closes
    if second.close() <= first.close() || third.close() <= second.close() {
      return false;
    }

    if !opens_within_bullish_body(first, second) || !opens_within_bullish_body(second, third) {
      return false;
    }

    [first, second, third].iter().all(|bar| upper_shadow_within(*bar, self.upper_shadow_factor))
  }

  fn validate_config(&self) -> Result<()> {
    THREE_WHITE_SOLDIERS_PARAMS[0].validate(self.upper_shadow_factor)
  }

  fn description(&self) -> &'static str {
    "Three advancing bullish candles opening within the prior body"
  }
}

// ============================================================
// EVENING STAR
// ============================================================

/// Evening star: long bullish candle, a small-bodied star gapping above it,
/// then a bearish candle closing deep into the first body
#[derive(Debug, Clone, Copy)]
pub struct EveningStarDetector {
  pub star_body_factor: Decimal,
  pub penetration: Decimal,
}

impl Default for EveningStarDetector {
  fn default() -> Self {
    Self { star_body_factor: helpers::STAR_BODY_FACTOR, penetration: helpers::PENETRATION }
  }
}

impl PatternDetector for EveningStarDetector {
  fn id(&self) -> PatternId {
    PatternId::EVENING_STAR
  }

  fn window_size(&self) -> usize {
    3
  }

  fn direction(&self) -> Direction {
    Direction::Bearish
  }

  fn matches(&self, window: &[DayRecord]) -> bool {
    let [first, star, third] = window else {
      return false;
    };

    if !first.is_bullish() || !third.is_bearish() {
      return false;
    }

    // Bodies past the Decimal bounds never form a star
    let (Some(first_body), Some(star_body)) = (first.checked_body(), star.checked_body()) else {
      return false;
    };

    if let Some(limit) = first_body.checked_mul(self.star_body_factor) {
      if star_body > limit {
        return false;
      }
    }
    if !body_gaps_up(first, star) {
      return false;
    }
    if third.checked_body().is_some_and(|body| body <= star_body) {
      return false;
    }

    // A floor below Decimal::MIN cannot be undercut
    first_body
      .checked_mul(self.penetration)
      .and_then(|depth| first.close().checked_sub(depth))
      .is_some_and(|floor| third.close() < floor)
  }

  fn validate_config(&self) -> Result<()> {
    EVENING_STAR_PARAMS[0].validate(self.star_body_factor)?;
    EVENING_STAR_PARAMS[1].validate(self.penetration)
  }

  fn description(&self) -> &'static str {
    "Bullish candle, gapped-up star, bearish candle closing into the first body"
  }
}

// ============================================================
// PARAMETERS
// ============================================================

static THREE_WHITE_SOLDIERS_PARAMS: &[ParamMeta] = &[ParamMeta::factor(
  "upper_shadow_factor",
  helpers::UPPER_SHADOW_FACTOR,
  (dec!(0), dec!(1), dec!(0.1)),
  "Maximum upper shadow as a multiple of each body",
)];

static EVENING_STAR_PARAMS: &[ParamMeta] = &[
  ParamMeta::factor(
    "star_body_factor",
    helpers::STAR_BODY_FACTOR,
    (dec!(0.1), dec!(1), dec!(0.1)),
    "Maximum star body as a multiple of the first body",
  ),
  ParamMeta::factor(
    "penetration",
    helpers::PENETRATION,
    (dec!(0), dec!(1), dec!(0.1)),
    "How far into the first body the third candle must close",
  ),
];

impl ParameterizedDetector for ThreeWhiteSoldiersDetector {
  fn param_meta() -> &'static [ParamMeta] {
    THREE_WHITE_SOLDIERS_PARAMS
  }

  fn with_params(params: &HashMap<&str, Decimal>) -> Result<Self> {
    check_known(params, THREE_WHITE_SOLDIERS_PARAMS)?;
    Ok(Self { upper_shadow_factor: get_factor(params, &THREE_WHITE_SOLDIERS_PARAMS[0])? })
  }

  fn pattern_id() -> PatternId {
    PatternId::THREE_WHITE_SOLDIERS
  }
}

impl ParameterizedDetector for EveningStarDetector {
  fn param_meta() -> &'static [ParamMeta] {
    EVENING_STAR_PARAMS
  }

  fn with_params(params: &HashMap<&str, Decimal>) -> Result<Self> {
    check_known(params, EVENING_STAR_PARAMS)?;
    Ok(Self {
      star_body_factor: get_factor(params, &EVENING_STAR_PARAMS[0])?,
      penetration: get_factor(params, &EVENING_STAR_PARAMS[1])?,
    })
  }

  fn pattern_id() -> PatternId {
    PatternId::EVENING_STAR
  }
}
