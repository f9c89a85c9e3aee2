//! Engine settings

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Largest precision a `Decimal` can honor
pub const MAX_PRECISION: u32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Significant digits kept when rounding results and compared by
    /// [`Settings::approx_eq`]
    pub working_precision: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            working_precision: 20,
        }
    }
}

impl Settings {
    pub fn with_precision(working_precision: u32) -> Self {
        Self { working_precision }
    }

    /// Precision clamped to what `Decimal` can represent
    pub fn precision(&self) -> u32 {
        self.working_precision.clamp(1, MAX_PRECISION)
    }

    /// Equal within a relative tolerance of `10^-precision`
    pub fn approx_eq(&self, a: Decimal, b: Decimal) -> bool {
        if a == b {
            return true;
        }
        let scale = a.abs().max(b.abs());
        let tolerance = Decimal::new(1, self.precision());
        match a.checked_sub(b).and_then(|diff| diff.abs().checked_div(scale)) {
            Some(relative) => relative <= tolerance,
            None => false,
        }
    }

    /// Round to the working precision
    pub fn round(&self, value: Decimal) -> Decimal {
        value
            .round_sf(self.precision())
            .unwrap_or(value)
            .normalize()
    }
}
