#![forbid(unsafe_code)]

use core::fmt;

use serde::{Deserialize, Serialize};

/// Planning scenario selected on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    #[default]
    Base,
    Optimistic,
    Adverse,
}

impl Scenario {
    /// Multiplier applied to base-case series.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Base => 1.0,
            Self::Optimistic => 1.12,
            Self::Adverse => 0.88,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Base => "Base",
            Self::Optimistic => "Otimista",
            Self::Adverse => "Adverso",
        }
    }

    /// Scale `value`, keeping two decimals.
    #[must_use]
    pub fn scale(self, value: f64) -> f64 {
        round_to(value * self.factor(), 2)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let p = 10f64.powi(decimals);
    (value * p).round() / p
}
