use chrono::{DateTime, Utc};

use crate::errors::{LendingError, Result};
use crate::types::OfferStatus;

/// transition and expiry rules for loan offers
///
/// `Active` may move to any status (moving to `Active` again is a no-op
/// re-save). `Accepted`, `Declined` and `Expired` are terminal: nothing
/// leaves them, not even a move to the same status.
///
/// The backend expires offers lazily. An offer stored as `Active` whose
/// `expires_at` has passed is displayed, and gated for edits, as `Expired`
/// until a sweep rewrites it. All checks take `now` from the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfferLifecyclePolicy;

impl OfferLifecyclePolicy {
    /// true once `expires_at` is strictly in the past
    pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        expires_at < now
    }

    pub fn is_terminal(status: OfferStatus) -> bool {
        !matches!(status, OfferStatus::Active)
    }

    pub fn can_transition(current: OfferStatus, target: OfferStatus) -> bool {
        match current {
            OfferStatus::Active => matches!(
                target,
                OfferStatus::Active
                    | OfferStatus::Accepted
                    | OfferStatus::Declined
                    | OfferStatus::Expired
            ),
            OfferStatus::Accepted | OfferStatus::Declined | OfferStatus::Expired => false,
        }
    }

    pub fn ensure_transition(current: OfferStatus, target: OfferStatus) -> Result<()> {
        if Self::can_transition(current, target) {
            Ok(())
        } else {
            tracing::debug!(%current, %target, "rejected offer transition");
            Err(LendingError::InvalidTransition {
                from: current,
                to: target,
            })
        }
    }

    /// status to display and to gate edits with
    pub fn effective_status(
        status: OfferStatus,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> OfferStatus {
        if status == OfferStatus::Active && Self::is_expired(expires_at, now) {
            OfferStatus::Expired
        } else {
            status
        }
    }

    /// terms (amount, rate, term, expiry) are editable only while effectively active
    pub fn can_edit(status: OfferStatus, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        Self::effective_status(status, expires_at, now) == OfferStatus::Active
    }

    pub fn ensure_editable(
        status: OfferStatus,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let effective = Self::effective_status(status, expires_at, now);
        if effective == OfferStatus::Active {
            Ok(())
        } else {
            tracing::debug!(%status, %effective, "offer not editable");
            Err(LendingError::OfferNotEditable { status: effective })
        }
    }
}
