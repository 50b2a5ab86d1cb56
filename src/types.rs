use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::LendingError;

/// unique identifier for a loan offer
pub type OfferId = Uuid;

/// unique identifier for a loan application
pub type LoanApplicationId = Uuid;

/// unique identifier for a registered vehicle
pub type VehicleId = Uuid;

/// unique identifier for a vehicle valuation
pub type ValuationId = Uuid;

/// loan offer status
///
/// `Active` is the only non-terminal state. See
/// [`OfferLifecyclePolicy`](crate::offers::OfferLifecyclePolicy) for the legal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    /// open for the applicant to accept or decline
    Active,
    Accepted,
    Declined,
    /// expiry date passed, or swept by the backend
    Expired,
}

impl OfferStatus {
    pub const ALL: [OfferStatus; 4] = [
        OfferStatus::Active,
        OfferStatus::Accepted,
        OfferStatus::Declined,
        OfferStatus::Expired,
    ];

    /// wire value used by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Active => "active",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Declined => "declined",
            OfferStatus::Expired => "expired",
        }
    }

    /// badge text
    pub fn label(&self) -> &'static str {
        match self {
            OfferStatus::Active => "Active",
            OfferStatus::Accepted => "Accepted",
            OfferStatus::Declined => "Declined",
            OfferStatus::Expired => "Expired",
        }
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferStatus {
    type Err = LendingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(OfferStatus::Active),
            "accepted" => Ok(OfferStatus::Accepted),
            "declined" => Ok(OfferStatus::Declined),
            "expired" => Ok(OfferStatus::Expired),
            other => Err(LendingError::UnknownStatus {
                kind: "offer",
                value: other.to_string(),
            }),
        }
    }
}

/// loan application status
///
/// A separate vocabulary from [`OfferStatus`]: the two never interconvert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    UnderReview,
}

impl LoanApplicationStatus {
    pub const ALL: [LoanApplicationStatus; 5] = [
        LoanApplicationStatus::Pending,
        LoanApplicationStatus::Approved,
        LoanApplicationStatus::Rejected,
        LoanApplicationStatus::Cancelled,
        LoanApplicationStatus::UnderReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanApplicationStatus::Pending => "pending",
            LoanApplicationStatus::Approved => "approved",
            LoanApplicationStatus::Rejected => "rejected",
            LoanApplicationStatus::Cancelled => "cancelled",
            LoanApplicationStatus::UnderReview => "under_review",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanApplicationStatus::Pending => "Pending",
            LoanApplicationStatus::Approved => "Approved",
            LoanApplicationStatus::Rejected => "Rejected",
            LoanApplicationStatus::Cancelled => "Cancelled",
            LoanApplicationStatus::UnderReview => "Under review",
        }
    }

    /// a decision has been made and the application is closed
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            LoanApplicationStatus::Approved
                | LoanApplicationStatus::Rejected
                | LoanApplicationStatus::Cancelled
        )
    }
}

impl fmt::Display for LoanApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanApplicationStatus {
    type Err = LendingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LoanApplicationStatus::Pending),
            "approved" => Ok(LoanApplicationStatus::Approved),
            "rejected" => Ok(LoanApplicationStatus::Rejected),
            "cancelled" => Ok(LoanApplicationStatus::Cancelled),
            "under_review" => Ok(LoanApplicationStatus::UnderReview),
            other => Err(LendingError::UnknownStatus {
                kind: "loan application",
                value: other.to_string(),
            }),
        }
    }
}

/// applicant employment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentStatus {
    #[default]
    Employed,
    SelfEmployed,
    Unemployed,
    Retired,
}

impl EmploymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EmploymentStatus::Employed => "Employed",
            EmploymentStatus::SelfEmployed => "Self employed",
            EmploymentStatus::Unemployed => "Unemployed",
            EmploymentStatus::Retired => "Retired",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_status_wire_format() {
        for status in OfferStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<OfferStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_loan_status_wire_format() {
        let status: LoanApplicationStatus = serde_json::from_str("\"under_review\"").unwrap();
        assert_eq!(status, LoanApplicationStatus::UnderReview);
        assert_eq!(status.label(), "Under review");
        assert_eq!(status.to_string(), "under_review");
    }

    #[test]
    fn test_vocabularies_do_not_cross() {
        // "pending" is a loan word, "active" an offer word
        assert!("pending".parse::<OfferStatus>().is_err());
        assert!("active".parse::<LoanApplicationStatus>().is_err());
        assert!(serde_json::from_str::<OfferStatus>("\"approved\"").is_err());
    }

    #[test]
    fn test_unknown_status_error() {
        let err = "ACTIVE".parse::<OfferStatus>().unwrap_err();
        assert!(matches!(err, LendingError::UnknownStatus { kind: "offer", .. }));
    }

    #[test]
    fn test_employment_status_wire_format() {
        let json = serde_json::to_string(&EmploymentStatus::SelfEmployed).unwrap();
        assert_eq!(json, "\"SELF_EMPLOYED\"");
        assert!(!LoanApplicationStatus::Pending.is_final());
        assert!(LoanApplicationStatus::Cancelled.is_final());
    }
}
