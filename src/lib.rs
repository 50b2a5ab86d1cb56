pub mod applications;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod flow;
pub mod offers;
pub mod payments;
pub mod types;

// re-export key types
pub use applications::{LoanApplication, LoanApplicationCreate, LoanDetails};
pub use config::{LendingConfig, LoanLimits, OfferLimits};
pub use decimal::{Money, Rate};
pub use errors::{LendingError, Result};
pub use flow::{
    ApplicationFlow, EmploymentInfoDraft, LoanDetailsDraft, PartialApplication, PersonalInfoDraft,
};
pub use offers::{
    stale_offers, LoanOffer, OfferDraft, OfferLifecyclePolicy, OfferStatusUpdate, OfferUpdate,
};
pub use payments::{
    compute_monthly_payment, compute_total_interest, compute_total_payable, AmortizationSchedule,
    LoanTerms, PaymentSchedule, ScheduledPayment,
};
pub use types::{
    EmploymentStatus, LoanApplicationId, LoanApplicationStatus, OfferId, OfferStatus, ValuationId,
    VehicleId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
