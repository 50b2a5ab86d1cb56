use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LoanLimits;
use crate::decimal::{percent, Money, Rate};
use crate::errors::{LendingError, Result};
use crate::payments::{LoanTerms, PaymentSchedule};
use crate::types::{
    EmploymentStatus, LoanApplicationId, LoanApplicationStatus, ValuationId, VehicleId,
};

/// loan application as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub id: LoanApplicationId,
    pub vehicle_id: VehicleId,
    pub valuation_id: ValuationId,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: String,
    pub monthly_income: Money,
    pub employment_status: EmploymentStatus,
    pub loan_amount: Money,
    #[serde(with = "percent")]
    pub interest_rate: Rate,
    pub term_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: LoanApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoanApplication {
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.loan_amount,
            annual_rate: self.interest_rate,
            term_months: self.term_months,
        }
    }

    pub fn payment_schedule(&self) -> PaymentSchedule {
        self.terms().payment_schedule()
    }

    /// still waiting on a lender decision
    pub fn is_open(&self) -> bool {
        !self.status.is_final()
    }
}

/// body of a create-application request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplicationCreate {
    pub vehicle_id: VehicleId,
    pub valuation_id: ValuationId,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: String,
    pub monthly_income: Money,
    pub employment_status: EmploymentStatus,
    pub loan_amount: Money,
    #[serde(with = "percent")]
    pub interest_rate: Rate,
    pub term_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl LoanApplicationCreate {
    pub fn loan_details(&self) -> LoanDetails {
        LoanDetails {
            loan_amount: self.loan_amount,
            interest_rate: self.interest_rate,
            term_months: self.term_months,
            notes: self.notes.clone(),
        }
    }

    /// applicant contact fields, income, then the loan details
    pub fn validate(&self, limits: &LoanLimits) -> Result<()> {
        let name_len = self.applicant_name.chars().count();
        if !(2..=100).contains(&name_len) {
            return Err(LendingError::validation(
                "applicantName",
                "applicant name must be between 2 and 100 characters",
            ));
        }
        if !is_valid_email(&self.applicant_email) {
            return Err(LendingError::validation(
                "applicantEmail",
                format!("invalid email address: {}", self.applicant_email),
            ));
        }
        if self.applicant_phone.trim().is_empty() {
            return Err(LendingError::validation(
                "applicantPhone",
                "phone number is required",
            ));
        }
        if !self.monthly_income.is_positive() {
            return Err(LendingError::validation(
                "monthlyIncome",
                "monthly income must be positive",
            ));
        }
        self.loan_details().validate(limits)
    }
}

/// the loan step of an application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanDetails {
    pub loan_amount: Money,
    #[serde(with = "percent")]
    pub interest_rate: Rate,
    pub term_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl LoanDetails {
    pub fn validate(&self, limits: &LoanLimits) -> Result<()> {
        let below_min = self.loan_amount < limits.min_amount;
        match limits.max_amount {
            Some(max) if below_min || self.loan_amount > max => {
                return Err(LendingError::AmountOutOfRange {
                    amount: self.loan_amount,
                    min: limits.min_amount,
                    max,
                });
            }
            None if below_min => {
                return Err(LendingError::validation(
                    "loanAmount",
                    format!("loan amount must be at least {}", limits.min_amount),
                ));
            }
            _ => {}
        }

        if self.interest_rate < limits.min_rate || self.interest_rate > limits.max_rate {
            return Err(LendingError::RateOutOfRange {
                rate: self.interest_rate,
                min: limits.min_rate,
                max: limits.max_rate,
            });
        }

        if !(limits.min_term_months..=limits.max_term_months).contains(&self.term_months) {
            return Err(LendingError::validation(
                "termMonths",
                format!(
                    "term must be between {} and {} months",
                    limits.min_term_months, limits.max_term_months
                ),
            ));
        }

        Ok(())
    }

    /// validated terms for the preview
    pub fn terms(&self, limits: &LoanLimits) -> Result<LoanTerms> {
        self.validate(limits)?;
        LoanTerms::new(self.loan_amount, self.interest_rate, self.term_months)
    }

    pub fn payment_schedule(&self) -> PaymentSchedule {
        PaymentSchedule::compute(self.loan_amount, self.interest_rate, self.term_months)
    }
}

/// `local@domain.tld` with no whitespace and a single `@`
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.contains('@') => domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len()),
        _ => false,
    }
}

/// Nigerian mobile number, optionally prefixed with `+234`, `234` or `0`
///
/// Whitespace is ignored, so `0803 123 4567` passes.
pub fn is_valid_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    ["+234", "234", "0", ""]
        .into_iter()
        .any(|prefix| compact.strip_prefix(prefix).is_some_and(is_subscriber_number))
}

fn is_subscriber_number(digits: &str) -> bool {
    let bytes = digits.as_bytes();
    bytes.len() == 10
        && bytes.iter().all(u8::is_ascii_digit)
        && matches!(bytes[0], b'7'..=b'9')
        && matches!(bytes[1], b'0' | b'1')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const APPLICATION_JSON: &str = r#"{
        "id": "6f1c2e0a-3b5d-4c8e-9f7a-1b2c3d4e5f60",
        "vehicleId": "0a9b8c7d-6e5f-4a3b-8c2d-1e0f9a8b7c6d",
        "valuationId": "11111111-2222-4333-8444-555555555555",
        "applicantName": "Adaeze Okafor",
        "applicantEmail": "adaeze@example.com",
        "applicantPhone": "+2348031234567",
        "monthlyIncome": 850000,
        "employmentStatus": "SELF_EMPLOYED",
        "loanAmount": 4500000,
        "interestRate": 18,
        "termMonths": 48,
        "status": "under_review",
        "createdAt": "2024-03-01T09:30:00Z",
        "updatedAt": "2024-03-02T11:00:00.000Z"
    }"#;

    fn details(amount: i64, rate: u32, term: u32) -> LoanDetails {
        LoanDetails {
            loan_amount: Money::from_major(amount),
            interest_rate: Rate::from_percentage(rate),
            term_months: term,
            notes: None,
        }
    }

    #[test]
    fn test_parse_backend_application() {
        let application: LoanApplication = serde_json::from_str(APPLICATION_JSON).unwrap();

        assert_eq!(application.status, LoanApplicationStatus::UnderReview);
        assert_eq!(application.employment_status, EmploymentStatus::SelfEmployed);
        assert_eq!(application.interest_rate.as_decimal(), dec!(0.18));
        assert!(application.notes.is_none());
        assert!(application.is_open());

        let preview = application.payment_schedule();
        assert!(preview.total_payable > application.loan_amount);
    }

    #[test]
    fn test_loan_details_bounds() {
        let limits = LoanLimits::default();

        assert!(details(5_000, 10, 36).validate(&limits).is_ok());
        assert!(details(1_000, 0, 12).validate(&limits).is_ok());
        assert!(details(5_000, 50, 84).validate(&limits).is_ok());

        assert!(matches!(
            details(999, 10, 36).validate(&limits),
            Err(LendingError::Validation { field: "loanAmount", .. })
        ));
        assert!(matches!(
            details(5_000, 51, 36).validate(&limits),
            Err(LendingError::RateOutOfRange { .. })
        ));
        assert!(matches!(
            details(5_000, 10, 6).validate(&limits),
            Err(LendingError::Validation { field: "termMonths", .. })
        ));
        assert!(details(5_000, 10, 85).validate(&limits).is_err());
    }

    #[test]
    fn test_max_amount_limit() {
        let limits = LoanLimits {
            max_amount: Some(Money::from_major(10_000)),
            ..LoanLimits::default()
        };
        assert!(details(10_000, 10, 24).validate(&limits).is_ok());
        assert!(matches!(
            details(10_001, 10, 24).validate(&limits),
            Err(LendingError::AmountOutOfRange { .. })
        ));
    }

    #[test]
    fn test_uncapped_amount_reports_minimum_only() {
        let err = details(999, 10, 36).validate(&LoanLimits::default()).unwrap_err();
        assert_eq!(err.to_string(), "invalid loanAmount: loan amount must be at least 1000");
    }

    #[test]
    fn test_terms_for_preview() {
        let terms = details(10_000, 6, 36).terms(&LoanLimits::default()).unwrap();
        assert_eq!(terms.monthly_payment().round_dp(2), Money::from_str_exact("304.22").unwrap());
        assert!(details(10, 6, 36).terms(&LoanLimits::default()).is_err());
    }

    #[test]
    fn test_create_requires_income() {
        let mut create = create_request();
        assert!(create.validate(&LoanLimits::default()).is_ok());

        create.monthly_income = Money::ZERO;
        assert!(matches!(
            create.validate(&LoanLimits::default()),
            Err(LendingError::Validation { field: "monthlyIncome", .. })
        ));

        let json = serde_json::to_value(&create).unwrap();
        assert_eq!(json["interestRate"], "18");
        assert!(json.get("notes").is_none());
    }

    fn create_request() -> LoanApplicationCreate {
        let application: LoanApplication = serde_json::from_str(APPLICATION_JSON).unwrap();
        LoanApplicationCreate {
            vehicle_id: application.vehicle_id,
            valuation_id: application.valuation_id,
            applicant_name: application.applicant_name,
            applicant_email: application.applicant_email,
            applicant_phone: application.applicant_phone,
            monthly_income: application.monthly_income,
            employment_status: application.employment_status,
            loan_amount: application.loan_amount,
            interest_rate: application.interest_rate,
            term_months: application.term_months,
            notes: None,
        }
    }

    #[test]
    fn test_create_validates_applicant() {
        let limits = LoanLimits::default();
        assert!(create_request().validate(&limits).is_ok());

        let mut short_name = create_request();
        short_name.applicant_name = "A".to_string();
        assert!(matches!(
            short_name.validate(&limits),
            Err(LendingError::Validation { field: "applicantName", .. })
        ));

        let mut long_name = create_request();
        long_name.applicant_name = "a".repeat(101);
        assert!(long_name.validate(&limits).is_err());

        let mut bad_email = create_request();
        bad_email.applicant_email = "adaeze@example".to_string();
        assert!(matches!(
            bad_email.validate(&limits),
            Err(LendingError::Validation { field: "applicantEmail", .. })
        ));

        let mut no_phone = create_request();
        no_phone.applicant_phone = "  ".to_string();
        assert!(matches!(
            no_phone.validate(&limits),
            Err(LendingError::Validation { field: "applicantPhone", .. })
        ));
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("tunde@example.com"));
        assert!(is_valid_email("a.b@mail.example.ng"));
        assert!(!is_valid_email("tunde@example"));
        assert!(!is_valid_email("tunde@.com"));
        assert!(!is_valid_email("tunde@example."));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("tu nde@example.com"));
        assert!(!is_valid_email("tunde@ex@ample.com"));
    }

    #[test]
    fn test_nigerian_phone_format() {
        assert!(is_valid_phone("08031234567"));
        assert!(is_valid_phone("+2348031234567"));
        assert!(is_valid_phone("2349011234567"));
        assert!(is_valid_phone("0803 123 4567"));
        assert!(is_valid_phone("7081234567"));

        assert!(!is_valid_phone("08231234567"));
        assert!(!is_valid_phone("06031234567"));
        assert!(!is_valid_phone("0803123456"));
        assert!(!is_valid_phone("+1 555 123 4567"));
        assert!(!is_valid_phone(""));
    }
}
