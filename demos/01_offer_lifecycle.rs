/// offer lifecycle - lazy expiry, edit gating and status changes
use autocheck_lending::{
    stale_offers, LoanOffer, OfferLimits, OfferStatus, OfferUpdate, Rate, SafeTimeProvider,
    TimeSource,
};
use chrono::{Duration, TimeZone, Utc};

const OFFER: &str = r#"{
    "id": "8d3f5a20-1c4b-4e6a-9b7d-2f1e0c9b8a70",
    "loanApplicationId": "6f1c2e0a-3b5d-4c8e-9f7a-1b2c3d4e5f60",
    "offeredAmount": 4000000,
    "interestRate": 15.5,
    "loanTerm": 36,
    "monthlyPayment": 139642.72,
    "totalPayable": 5027138.07,
    "status": "active",
    "expiresAt": "2024-03-08T09:30:00.000Z",
    "acceptedAt": null,
    "createdAt": "2024-03-01T09:30:00.000Z",
    "updatedAt": "2024-03-01T09:30:00.000Z"
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== offer lifecycle ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();
    let limits = OfferLimits::default();

    let offer: LoanOffer = serde_json::from_str(OFFER)?;
    println!("status: {}", offer.effective_status(time.now()).label());

    // lender lowers the rate before the applicant decides
    let update = OfferUpdate {
        interest_rate: Some(Rate::from_percentage(14)),
        ..OfferUpdate::default()
    };
    let preview = offer.prepare_update(&update, time.now(), &limits)?.rounded(2);
    println!("edited preview: {} / month", preview.monthly_payment);

    // a week later the offer is past its expiry but still stored as active
    controller.advance(Duration::days(7));
    println!("\nafter 7 days: {}", offer.effective_status(time.now()).label());
    println!("editable: {}", offer.can_edit(time.now()));

    match offer.request_status_change(OfferStatus::Accepted, None, time.now()) {
        Ok(request) => println!("accept request: {:?}", request),
        Err(e) => println!("accept refused: {}", e),
    }

    let offers = vec![offer];
    println!("offers awaiting the expiry sweep: {}", stale_offers(&offers, &time).len());

    Ok(())
}
