use chrono::{DateTime, Months, Utc};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};

/// principal, nominal annual rate and term of a fully amortizing loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
}

impl LoanTerms {
    /// validated constructor: principal > 0, rate >= 0, term >= 1
    pub fn new(principal: Money, annual_rate: Rate, term_months: u32) -> Result<Self> {
        if !principal.is_positive() {
            return Err(LendingError::InvalidLoanTerms {
                message: format!("principal must be positive, got {}", principal),
            });
        }
        if annual_rate.is_negative() {
            return Err(LendingError::InvalidLoanTerms {
                message: format!("annual rate must not be negative, got {}", annual_rate),
            });
        }
        if term_months == 0 {
            return Err(LendingError::InvalidLoanTerms {
                message: "term must be at least one month".to_string(),
            });
        }

        Ok(Self {
            principal,
            annual_rate,
            term_months,
        })
    }

    pub fn monthly_payment(&self) -> Money {
        compute_monthly_payment(self.principal, self.annual_rate, self.term_months)
    }

    pub fn payment_schedule(&self) -> PaymentSchedule {
        PaymentSchedule::compute(self.principal, self.annual_rate, self.term_months)
    }
}

/// summary figures for a loan preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSchedule {
    pub monthly_payment: Money,
    pub total_payable: Money,
    pub total_interest: Money,
}

impl PaymentSchedule {
    pub fn compute(principal: Money, annual_rate: Rate, term_months: u32) -> Self {
        let monthly_payment = compute_monthly_payment(principal, annual_rate, term_months);
        let total_payable = compute_total_payable(principal, annual_rate, term_months);

        Self {
            monthly_payment,
            total_payable,
            total_interest: (total_payable - principal).max(Money::ZERO),
        }
    }

    /// round every figure for display
    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            monthly_payment: self.monthly_payment.round_dp(dp),
            total_payable: self.total_payable.round_dp(dp),
            total_interest: self.total_interest.round_dp(dp),
        }
    }
}

/// fixed monthly payment that amortizes `principal` over `term_months`
///
/// Inputs are not validated; callers validate form values first. The
/// monthly periodic rate is `annual_rate / 12`. A zero rate divides the
/// principal evenly. When the formula cannot be represented (decimal
/// overflow on very long terms, or a zero divisor) the result is zero.
pub fn compute_monthly_payment(principal: Money, annual_rate: Rate, term_months: u32) -> Money {
    match exact_monthly_payment(principal, annual_rate, term_months) {
        Some(payment) => Money::from_decimal(payment),
        None => {
            tracing::debug!(
                %principal,
                %annual_rate,
                term_months,
                "monthly payment not representable, reporting zero"
            );
            Money::ZERO
        }
    }
}

/// monthly payment times the number of payments
pub fn compute_total_payable(principal: Money, annual_rate: Rate, term_months: u32) -> Money {
    // multiply the unrounded payment so a zero-rate loan totals the principal exactly
    exact_monthly_payment(principal, annual_rate, term_months)
        .and_then(|payment| payment.checked_mul(Decimal::from(term_months)))
        .map(Money::from_decimal)
        .unwrap_or(Money::ZERO)
}

/// total payable less the principal, never below zero
///
/// Zero for a zero-rate loan, and zero when the payment itself could not be
/// represented.
pub fn compute_total_interest(principal: Money, annual_rate: Rate, term_months: u32) -> Money {
    (compute_total_payable(principal, annual_rate, term_months) - principal).max(Money::ZERO)
}

fn exact_monthly_payment(principal: Money, annual_rate: Rate, term_months: u32) -> Option<Decimal> {
    let p = principal.as_decimal();
    let r = annual_rate.monthly_rate().as_decimal();

    if r.is_zero() {
        return p.checked_div(Decimal::from(term_months));
    }

    // P * r * (1 + r)^n / ((1 + r)^n - 1)
    let compound = (Decimal::ONE + r).checked_powu(u64::from(term_months))?;
    let numerator = p.checked_mul(r)?.checked_mul(compound)?;
    let denominator = compound.checked_sub(Decimal::ONE)?;

    numerator.checked_div(denominator)
}

/// scheduled payment in amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    pub payment_number: u32,
    pub payment_date: DateTime<Utc>,
    pub beginning_balance: Money,
    pub payment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub ending_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// month-by-month repayment table for equal installments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub terms: LoanTerms,
    pub start_date: DateTime<Utc>,
    pub payments: Vec<ScheduledPayment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// generate payment schedule, first payment one month after `start_date`
    pub fn generate(terms: &LoanTerms, start_date: DateTime<Utc>) -> Result<Self> {
        let emi = terms.monthly_payment();
        if emi.is_zero() {
            return Err(LendingError::InvalidLoanTerms {
                message: format!(
                    "no representable payment for {} at {} over {} months",
                    terms.principal, terms.annual_rate, terms.term_months
                ),
            });
        }

        let monthly_rate = terms.annual_rate.monthly_rate().as_decimal();
        let mut payments = Vec::with_capacity(terms.term_months as usize);
        let mut balance = terms.principal;
        let mut cumulative_interest = Money::ZERO;
        let mut cumulative_principal = Money::ZERO;

        for i in 1..=terms.term_months {
            let payment_date = start_date
                .checked_add_months(Months::new(i))
                .ok_or_else(|| LendingError::validation("start_date", "schedule runs past the supported date range"))?;

            let interest_portion = balance * monthly_rate;
            // the final installment clears whatever rounding left behind
            let principal_portion = if i == terms.term_months {
                balance
            } else {
                (emi - interest_portion).min(balance)
            };
            let payment_amount = principal_portion + interest_portion;
            let ending_balance = balance - principal_portion;

            cumulative_interest += interest_portion;
            cumulative_principal += principal_portion;

            payments.push(ScheduledPayment {
                payment_number: i,
                payment_date,
                beginning_balance: balance,
                payment_amount,
                principal_portion,
                interest_portion,
                ending_balance,
                cumulative_interest,
                cumulative_principal,
            });

            balance = ending_balance;
        }

        let total_payment = payments
            .iter()
            .map(|p| p.payment_amount)
            .fold(Money::ZERO, |acc, x| acc + x);

        tracing::trace!(
            principal = %terms.principal,
            term_months = terms.term_months,
            %total_payment,
            "generated amortization schedule"
        );

        Ok(Self {
            terms: *terms,
            start_date,
            payments,
            total_interest: cumulative_interest,
            total_payment,
        })
    }

    /// get payment for specific period (1-based)
    pub fn get_payment(&self, payment_number: u32) -> Option<&ScheduledPayment> {
        let index = payment_number.checked_sub(1)?;
        self.payments.get(index as usize)
    }

    /// remaining balance after the given payment, principal before the first
    pub fn balance_after_payment(&self, payment_number: u32) -> Money {
        self.get_payment(payment_number)
            .map(|p| p.ending_balance)
            .unwrap_or(self.terms.principal)
    }
}
