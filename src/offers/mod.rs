pub mod offer;
pub mod policy;

pub use offer::{stale_offers, LoanOffer, OfferDraft, OfferStatusUpdate, OfferUpdate};
pub use policy::OfferLifecyclePolicy;
