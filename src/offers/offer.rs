use chrono::{DateTime, Duration, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::applications::LoanApplication;
use crate::config::OfferLimits;
use crate::decimal::{percent, Money, Rate};
use crate::errors::{LendingError, Result};
use crate::offers::policy::OfferLifecyclePolicy;
use crate::payments::{LoanTerms, PaymentSchedule};
use crate::types::{LoanApplicationId, OfferId, OfferStatus};

/// lender offer as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanOffer {
    pub id: OfferId,
    pub loan_application_id: LoanApplicationId,
    pub offered_amount: Money,
    #[serde(with = "percent")]
    pub interest_rate: Rate,
    pub loan_term: u32,
    pub monthly_payment: Money,
    pub total_payable: Money,
    pub status: OfferStatus,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoanOffer {
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.offered_amount,
            annual_rate: self.interest_rate,
            term_months: self.loan_term,
        }
    }

    /// recomputed from amount, rate and term rather than trusting the stored figures
    pub fn payment_schedule(&self) -> PaymentSchedule {
        self.terms().payment_schedule()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        OfferLifecyclePolicy::is_expired(self.expires_at, now)
    }

    pub fn effective_status(&self, now: DateTime<Utc>) -> OfferStatus {
        OfferLifecyclePolicy::effective_status(self.status, self.expires_at, now)
    }

    pub fn can_edit(&self, now: DateTime<Utc>) -> bool {
        OfferLifecyclePolicy::can_edit(self.status, self.expires_at, now)
    }

    /// check an edit against the lifecycle and the edit bounds, returning the new preview
    pub fn prepare_update(
        &self,
        update: &OfferUpdate,
        now: DateTime<Utc>,
        limits: &OfferLimits,
    ) -> Result<PaymentSchedule> {
        OfferLifecyclePolicy::ensure_editable(self.status, self.expires_at, now)?;
        update.validate(now, limits)?;
        Ok(update.apply_to(&self.terms()).payment_schedule())
    }

    /// build a status change request, checked against the effective status
    pub fn request_status_change(
        &self,
        target: OfferStatus,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<OfferStatusUpdate> {
        OfferLifecyclePolicy::ensure_transition(self.effective_status(now), target)?;
        Ok(OfferStatusUpdate {
            status: target,
            reason,
        })
    }
}

/// partial edit of an offer's terms
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offered_amount: Option<Money>,
    #[serde(default, with = "percent::option", skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_term: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl OfferUpdate {
    pub fn validate(&self, now: DateTime<Utc>, limits: &OfferLimits) -> Result<()> {
        if let Some(amount) = self.offered_amount {
            if !amount.is_positive() {
                return Err(LendingError::validation(
                    "offeredAmount",
                    "offered amount must be greater than 0",
                ));
            }
        }

        if let Some(rate) = self.interest_rate {
            if rate.is_negative() {
                return Err(LendingError::validation(
                    "interestRate",
                    "interest rate cannot be negative",
                ));
            }
        }

        if let Some(term) = self.loan_term {
            if term < limits.min_edit_term_months || term > limits.max_term_months {
                return Err(LendingError::validation(
                    "loanTerm",
                    format!(
                        "loan term must be between {} and {} months",
                        limits.min_edit_term_months, limits.max_term_months
                    ),
                ));
            }
        }

        if let Some(expires_at) = self.expires_at {
            if expires_at <= now {
                return Err(LendingError::validation(
                    "expiresAt",
                    "expiration date must be in the future",
                ));
            }
        }

        Ok(())
    }

    /// the terms after this edit
    pub fn apply_to(&self, terms: &LoanTerms) -> LoanTerms {
        LoanTerms {
            principal: self.offered_amount.unwrap_or(terms.principal),
            annual_rate: self.interest_rate.unwrap_or(terms.annual_rate),
            term_months: self.loan_term.unwrap_or(terms.term_months),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.offered_amount.is_none()
            && self.interest_rate.is_none()
            && self.loan_term.is_none()
            && self.expires_at.is_none()
    }
}

/// body of a status change request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferStatusUpdate {
    pub status: OfferStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// body of a create-offer request
///
/// Amount and term fall back to the application's requested values when
/// omitted; expiry falls back to the configured default window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferDraft {
    pub loan_application_id: LoanApplicationId,
    #[serde(with = "percent")]
    pub interest_rate: Rate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_term: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offered_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_hours: Option<u32>,
}

impl OfferDraft {
    pub fn new(loan_application_id: LoanApplicationId, interest_rate: Rate) -> Self {
        Self {
            loan_application_id,
            interest_rate,
            loan_term: None,
            offered_amount: None,
            expiration_hours: None,
        }
    }

    pub fn validate(&self, limits: &OfferLimits) -> Result<()> {
        if self.interest_rate < limits.min_rate || self.interest_rate > limits.max_rate {
            return Err(LendingError::RateOutOfRange {
                rate: self.interest_rate,
                min: limits.min_rate,
                max: limits.max_rate,
            });
        }

        if let Some(term) = self.loan_term {
            if !(limits.min_term_months..=limits.max_term_months).contains(&term) {
                return Err(LendingError::validation(
                    "loanTerm",
                    format!(
                        "loan term must be between {} and {} months",
                        limits.min_term_months, limits.max_term_months
                    ),
                ));
            }
        }

        if let Some(amount) = self.offered_amount {
            if amount < limits.min_amount {
                return Err(LendingError::validation(
                    "offeredAmount",
                    format!("offered amount must be at least {}", limits.min_amount),
                ));
            }
        }

        if let Some(hours) = self.expiration_hours {
            if !(limits.min_expiration_hours..=limits.max_expiration_hours).contains(&hours) {
                return Err(LendingError::validation(
                    "expirationHours",
                    format!(
                        "expiration must be between {} and {} hours",
                        limits.min_expiration_hours, limits.max_expiration_hours
                    ),
                ));
            }
        }

        Ok(())
    }

    /// expiry instant for an offer created at `now`
    pub fn expires_at(&self, now: DateTime<Utc>, limits: &OfferLimits) -> Result<DateTime<Utc>> {
        let hours = self.expiration_hours.unwrap_or(limits.default_expiration_hours);
        now.checked_add_signed(Duration::hours(i64::from(hours)))
            .ok_or_else(|| {
                LendingError::validation(
                    "expirationHours",
                    format!("{} hours from {} is past the supported date range", hours, now),
                )
            })
    }

    /// terms the offer will carry once defaults are filled from the application
    pub fn terms_for(&self, application: &LoanApplication) -> LoanTerms {
        LoanTerms {
            principal: self.offered_amount.unwrap_or(application.loan_amount),
            annual_rate: self.interest_rate,
            term_months: self.loan_term.unwrap_or(application.term_months),
        }
    }

    pub fn preview(&self, application: &LoanApplication) -> PaymentSchedule {
        self.terms_for(application).payment_schedule()
    }
}

/// offers still stored as active whose expiry has passed
///
/// These are what the backend's expire-old sweep will rewrite to `Expired`.
pub fn stale_offers<'a>(offers: &'a [LoanOffer], time: &SafeTimeProvider) -> Vec<&'a LoanOffer> {
    let now = time.now();
    offers
        .iter()
        .filter(|offer| offer.status == OfferStatus::Active && offer.is_expired(now))
        .collect()
}
