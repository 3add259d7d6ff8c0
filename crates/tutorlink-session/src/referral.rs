//! Referral credit trigger.
//!
//! A one-time side effect gated by a persisted completion flag. The
//! flag claim is a document-level atomic update in the presence store,
//! so concurrent invocations for the same user cannot double-credit.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use tutorlink_core::result::AppResult;
use tutorlink_core::types::id::UserId;
use tutorlink_entity::identity::Identity;
use tutorlink_entity::presence::UserPresenceRecord;
use tutorlink_store::traits::PresenceStore;

/// External collaborator that credits a referrer's account.
#[async_trait]
pub trait ReferralLedger: Send + Sync + std::fmt::Debug + 'static {
    /// Credit the referrer for a referred user's verified sign-up.
    async fn credit_referral(&self, referrer: UserId, referred: UserId) -> AppResult<()>;
}

/// Fires the referral credit at most once per user.
#[derive(Debug, Clone)]
pub struct ReferralCreditTrigger {
    presence: Arc<dyn PresenceStore>,
    ledger: Arc<dyn ReferralLedger>,
}

impl ReferralCreditTrigger {
    /// Create a trigger over the given store and ledger.
    pub fn new(presence: Arc<dyn PresenceStore>, ledger: Arc<dyn ReferralLedger>) -> Self {
        Self { presence, ledger }
    }

    /// Credit the referrer if the user is eligible: email verified, not
    /// yet credited, and a referrer on record.
    ///
    /// The credited-flag claim is the serialization point; only the
    /// claiming caller performs the ledger side effect. Returns whether
    /// this call performed the credit.
    pub async fn credit_if_eligible(
        &self,
        identity: &Identity,
        record: &UserPresenceRecord,
    ) -> bool {
        if !identity.email_verified {
            return false;
        }
        if record.email_verification_credited || record.referred_by.is_none() {
            return false;
        }

        let claimed = match self.presence.claim_referral_credit(identity.uid).await {
            Ok(claimed) => claimed,
            Err(e) => {
                warn!(user_id = %identity.uid, error = %e, "Referral credit claim failed");
                return false;
            }
        };

        // `None` here means another invocation won the claim in the
        // meantime, or the record changed under us.
        let Some(referrer) = claimed else {
            return false;
        };

        match self.ledger.credit_referral(referrer, identity.uid).await {
            Ok(()) => {
                info!(
                    user_id = %identity.uid,
                    referrer = %referrer,
                    "Referral credited"
                );
                true
            }
            Err(e) => {
                error!(
                    user_id = %identity.uid,
                    referrer = %referrer,
                    error = %e,
                    "Referral credit side effect failed after claim; credit is lost"
                );
                false
            }
        }
    }
}
