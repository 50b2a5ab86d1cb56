/// application flow - multi-step state saved between sessions
use autocheck_lending::{
    ApplicationFlow, EmploymentInfoDraft, EmploymentStatus, LendingConfig, LoanDetailsDraft, Money,
    PersonalInfoDraft, Rate, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LendingConfig::default();
    let path = std::env::temp_dir().join("autocheck-application-flow.json");

    let mut flow = ApplicationFlow::load(&path)?;
    println!("resuming at step {}", flow.current_step);

    // step 1: vehicle and applicant
    flow.select_vehicle(Some(Uuid::new_v4()));
    flow.select_valuation(Some(Uuid::new_v4()));
    flow.set_personal_info(PersonalInfoDraft {
        applicant_name: Some("Chidi Eze".to_string()),
        applicant_email: Some("chidi@example.com".to_string()),
        applicant_phone: Some("08051234567".to_string()),
    });
    flow.mark_step_completed(1);
    flow.set_current_step(2);

    // step 2: income
    flow.set_employment_info(EmploymentInfoDraft {
        monthly_income: Some(Money::from_major(750_000)),
        employment_status: Some(EmploymentStatus::Employed),
    });
    flow.mark_step_completed(2);
    flow.set_current_step(3);
    flow.save(&path)?;

    // step 3: loan, with a live preview as fields arrive
    flow.set_loan_details(LoanDetailsDraft {
        loan_amount: Some(Money::from_major(3_500_000)),
        interest_rate: Some(Rate::from_percentage(18)),
        ..LoanDetailsDraft::default()
    });
    println!("preview before term: {:?}", flow.payment_preview());

    flow.set_loan_details(LoanDetailsDraft {
        term_months: Some(48),
        ..LoanDetailsDraft::default()
    });
    if let Some(preview) = flow.payment_preview() {
        println!("monthly payment: {}", preview.rounded(2).monthly_payment);
    }

    let request = flow.to_create_request()?;
    request.validate(&config.loan)?;
    println!("\n{}", serde_json::to_string_pretty(&request)?);

    flow.clear();
    flow.save(&path)?;

    Ok(())
}
