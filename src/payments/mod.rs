pub mod amortization;

pub use amortization::{
    compute_monthly_payment, compute_total_interest, compute_total_payable, AmortizationSchedule,
    LoanTerms, PaymentSchedule, ScheduledPayment,
};
