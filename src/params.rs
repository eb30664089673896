//! Parameter metadata for pattern detectors
//!
//! This module provides metadata about detector parameters, enabling:
//! - Name-keyed overrides (e.g. from the command line)
//! - Grid generation for parameter sweeps
//! - Range validation of configured factors
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use rust_decimal_macros::dec;
//! use stockday::params::ParameterizedDetector;
//! use stockday::prelude::*;
//!
//! for param in HammerDetector::param_meta() {
//!     println!("{}: default {}", param.name, param.default);
//! }
//!
//! let mut params = HashMap::new();
//! params.insert("shadow_factor", dec!(3));
//! let hammer = HammerDetector::with_params(&params).unwrap();
//! assert_eq!(hammer.shadow_factor, dec!(3));
//! ```

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{PatternError, PatternId, Result};

// ============================================================
// PARAMETER METADATA
// ============================================================

/// Metadata for a single detector factor
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "shadow_factor")
  pub name: &'static str,
  /// Default value
  pub default: Decimal,
  /// Accepted range and sweep step: (min, max, step)
  pub range: (Decimal, Decimal, Decimal),
  /// Human-readable description
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn factor(
    name: &'static str,
    default: Decimal,
    range: (Decimal, Decimal, Decimal),
    description: &'static str,
  ) -> Self {
    Self { name, default, range, description }
  }

  /// Generate all values for grid search, `min..=max` by `step`
  pub fn generate_grid(&self) -> Vec<Decimal> {
    let (min, max, step) = self.range;
    if step <= Decimal::ZERO {
      return vec![min];
    }
    let mut values = Vec::new();
    let mut next = Some(min);
    while let Some(v) = next.filter(|v| *v <= max) {
      values.push(v);
      next = v.checked_add(step);
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: Decimal) -> Result<()> {
    let (min, max, _) = self.range;
    if value < min || value > max {
      return Err(PatternError::OutOfRange { field: self.name, value, min, max });
    }
    Ok(())
  }
}

// ============================================================
// PARAMETERIZED DETECTOR TRAIT
// ============================================================

/// Trait for detectors that support parameterization
pub trait ParameterizedDetector: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a detector with parameters from a map
  ///
  /// Missing parameters use their default values; unknown names are rejected.
  fn with_params(params: &HashMap<&str, Decimal>) -> Result<Self>;

  /// Returns the pattern this detector reports
  fn pattern_id() -> PatternId;
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Read a factor from `params`, falling back to its default, and check its range
pub fn get_factor(params: &HashMap<&str, Decimal>, meta: &ParamMeta) -> Result<Decimal> {
  let value = params.get(meta.name).copied().unwrap_or(meta.default);
  meta.validate(value)?;
  Ok(value)
}

/// Reject parameter names a detector does not declare
pub fn check_known(params: &HashMap<&str, Decimal>, metas: &[ParamMeta]) -> Result<()> {
  for name in params.keys() {
    if !metas.iter().any(|m| m.name == *name) {
      return Err(PatternError::InvalidConfig(format!("unknown parameter: {name}")));
    }
  }
  Ok(())
}

// ============================================================
// TESTS
// ============================================================
