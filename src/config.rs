use std::path::Path;

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};

/// form bounds for loans and offers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LendingConfig {
    pub loan: LoanLimits,
    pub offer: OfferLimits,
}

/// bounds on a loan application's requested terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanLimits {
    pub min_amount: Money,
    pub max_amount: Option<Money>,
    pub min_rate: Rate,
    pub max_rate: Rate,
    pub min_term_months: u32,
    pub max_term_months: u32,
}

/// bounds on lender offers, at creation and on later edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferLimits {
    pub min_amount: Money,
    pub min_rate: Rate,
    pub max_rate: Rate,
    pub min_term_months: u32,
    pub max_term_months: u32,
    /// edits allow shorter terms than creation
    pub min_edit_term_months: u32,
    pub min_expiration_hours: u32,
    pub max_expiration_hours: u32,
    pub default_expiration_hours: u32,
}

impl Default for LoanLimits {
    fn default() -> Self {
        Self {
            min_amount: Money::from_major(1_000),
            max_amount: None,
            min_rate: Rate::ZERO,
            max_rate: Rate::from_percentage(50),
            min_term_months: 12,
            max_term_months: 84,
        }
    }
}

impl Default for OfferLimits {
    fn default() -> Self {
        Self {
            min_amount: Money::from_major(100_000),
            min_rate: Rate::from_percentage(5),
            max_rate: Rate::from_percentage(30),
            min_term_months: 12,
            max_term_months: 84,
            min_edit_term_months: 6,
            min_expiration_hours: 24,
            max_expiration_hours: 720,
            default_expiration_hours: 168,
        }
    }
}

impl LendingConfig {
    /// permissive bounds for back-office tooling: any positive amount, 0-100%, 1-360 months
    pub fn unrestricted() -> Self {
        Self {
            loan: LoanLimits {
                min_amount: Money::from_decimal(dec!(0.01)),
                max_amount: None,
                min_rate: Rate::ZERO,
                max_rate: Rate::from_percentage(100),
                min_term_months: 1,
                max_term_months: 360,
            },
            offer: OfferLimits {
                min_amount: Money::from_decimal(dec!(0.01)),
                min_rate: Rate::ZERO,
                max_rate: Rate::from_percentage(100),
                min_term_months: 1,
                max_term_months: 360,
                min_edit_term_months: 1,
                ..OfferLimits::default()
            },
        }
    }

    /// parse and validate a json config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LendingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// read a json config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), "loaded lending config");
        Ok(config)
    }

    /// check every range is well formed
    pub fn validate(&self) -> Result<()> {
        self.loan.validate()?;
        self.offer.validate()
    }
}

impl LoanLimits {
    pub fn validate(&self) -> Result<()> {
        if !self.min_amount.is_positive() {
            return Err(invalid("loan.min_amount must be positive"));
        }
        if let Some(max) = self.max_amount {
            if max < self.min_amount {
                return Err(invalid("loan.max_amount below loan.min_amount"));
            }
        }
        if self.min_rate.is_negative() || self.max_rate < self.min_rate {
            return Err(invalid("loan rate range is empty or negative"));
        }
        if self.min_term_months == 0 || self.max_term_months < self.min_term_months {
            return Err(invalid("loan term range is empty or starts at zero"));
        }
        Ok(())
    }
}

impl OfferLimits {
    pub fn validate(&self) -> Result<()> {
        if !self.min_amount.is_positive() {
            return Err(invalid("offer.min_amount must be positive"));
        }
        if self.min_rate.is_negative() || self.max_rate < self.min_rate {
            return Err(invalid("offer rate range is empty or negative"));
        }
        if self.min_term_months == 0 || self.max_term_months < self.min_term_months {
            return Err(invalid("offer term range is empty or starts at zero"));
        }
        if self.min_edit_term_months == 0 || self.min_edit_term_months > self.max_term_months {
            return Err(invalid("offer.min_edit_term_months outside term range"));
        }
        if self.max_expiration_hours < self.min_expiration_hours {
            return Err(invalid("offer expiration range is empty"));
        }
        if !(self.min_expiration_hours..=self.max_expiration_hours)
            .contains(&self.default_expiration_hours)
        {
            return Err(invalid("offer.default_expiration_hours outside expiration range"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> LendingError {
    LendingError::InvalidConfiguration {
        message: message.to_string(),
    }
}
