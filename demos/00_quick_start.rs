/// quick start - payment preview for a loan
use autocheck_lending::{AmortizationSchedule, LoanTerms, Money, Rate};
use chrono::{TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // a 10,000 loan at 6% over 36 months
    let terms = LoanTerms::new(Money::from_major(10_000), Rate::from_percentage(6), 36)?;

    let preview = terms.payment_schedule().rounded(2);
    println!("monthly payment: {}", preview.monthly_payment);
    println!("total payable:   {}", preview.total_payable);
    println!("total interest:  {}", preview.total_interest);

    // first few rows of the full schedule
    let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
    let schedule = AmortizationSchedule::generate(&terms, start)?;
    for row in schedule.payments.iter().take(3) {
        println!(
            "  #{:<2} {}  interest {:>8}  principal {:>8}  balance {:>9}",
            row.payment_number,
            row.payment_date.format("%Y-%m-%d"),
            row.interest_portion.round_dp(2),
            row.principal_portion.round_dp(2),
            row.ending_balance.round_dp(2),
        );
    }

    Ok(())
}
