use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// 52 weeks * 5 days * 8 hours * 3600 seconds
pub const WORKING_SECONDS_PER_YEAR: f64 = 52.0 * 5.0 * 8.0 * 3600.0;

/// Cadence the salary figure is quoted in
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum PayPeriod {
    #[default]
    Yearly,
    Monthly,
    #[strum(serialize = "Bi-weekly")]
    Biweekly,
}

impl PayPeriod {
    /// Number of pay periods in a year
    pub fn periods_per_year(self) -> f64 {
        match self {
            PayPeriod::Yearly => 1.0,
            PayPeriod::Monthly => 12.0,
            PayPeriod::Biweekly => 26.0,
        }
    }

    pub fn next(self) -> Self {
        match self {
            PayPeriod::Yearly => PayPeriod::Monthly,
            PayPeriod::Monthly => PayPeriod::Biweekly,
            PayPeriod::Biweekly => PayPeriod::Yearly,
        }
    }
}

/// Converts raw salary text into currency units earned per working second.
///
/// Anything that isn't a finite, non-negative number yields a rate of zero,
/// as does an amount whose annualized value overflows.
pub fn compute_rate(salary_text: &str, period: PayPeriod) -> f64 {
    let trimmed = salary_text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let rate = match trimmed.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => {
            amount * period.periods_per_year() / WORKING_SECONDS_PER_YEAR
        }
        _ => return 0.0,
    };
    if rate.is_finite() {
        rate
    } else {
        0.0
    }
}
