//! Single-bar candlestick pattern detectors
//!
//! Patterns: hammer

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::helpers::{self, hammer_shape};
use crate::{
    params::{check_known, get_factor, ParamMeta, ParameterizedDetector},
    DayRecord, Direction, PatternDetector, PatternId, Result,
};

impl_with_defaults!(HammerDetector);

// ============================================================
// HAMMER
// ============================================================

/// Hammer: close at the high, lower shadow more than `shadow_factor` bodies long
#[derive(Debug, Clone, Copy)]
pub struct HammerDetector {
    pub shadow_factor: Decimal,
}

impl Default for HammerDetector {
    fn default() -> Self {
        Self {
            shadow_factor: helpers::HAMMER_SHADOW_FACTOR,
        }
    }
}

impl PatternDetector for HammerDetector {
    fn id(&self) -> PatternId {
        PatternId::HAMMER
    }

    fn window_size(&self) -> usize {
        1
    }

    fn direction(&self) -> Direction {
        Direction::Bullish
    }

    fn matches(&self, window: &[DayRecord]) -> bool {
        let [day] = window else {
            return false;
        };
        // Records cache the default-factor result
        if self.shadow_factor == helpers::HAMMER_SHADOW_FACTOR {
            return day.is_hammer();
        }
        hammer_shape(day, self.shadow_factor)
    }

    fn validate_config(&self) -> Result<()> {
        HAMMER_PARAMS[0].validate(self.shadow_factor)
    }

    fn description(&self) -> &'static str {
        "Close at the high with a long lower shadow"
    }
}

static HAMMER_PARAMS: &[ParamMeta] = &[ParamMeta::factor(
    "shadow_factor",
    helpers::HAMMER_SHADOW_FACTOR,
    (dec!(1), dec!(4), dec!(0.5)),
    "Minimum lower shadow as a multiple of the body (strict)",
)];

impl ParameterizedDetector for HammerDetector {
    fn param_meta() -> &'static [ParamMeta] {
        HAMMER_PARAMS
    }

    fn with_params(params: &HashMap<&str, Decimal>) -> Result<Self> {
        check_known(params, HAMMER_PARAMS)?;
        Ok(Self {
            shadow_factor: get_factor(params, &HAMMER_PARAMS[0])?,
        })
    }

    fn pattern_id() -> PatternId {
        PatternId::HAMMER
    }
}
