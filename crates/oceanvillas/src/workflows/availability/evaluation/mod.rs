mod policy;

use std::sync::Arc;

use tracing::{debug, warn};

use super::credentials::Credential;
use super::domain::{AvailabilityVerdict, DateRange, UnitId};
use crate::workflows::hostaway::ProviderGateway;

pub(crate) use policy::decide;

/// Verdict for one unit, plus whether the provider refused the credential
/// used to fetch its calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitEvaluation {
    pub verdict: AvailabilityVerdict,
    pub credential_rejected: bool,
}

/// Decides bookability of one unit from a single calendar call.
///
/// Evaluation runs `Idle -> CalendarFetched -> Normalized -> Decided`; any
/// failure on the way folds straight into an unavailable verdict and is never
/// retried within the same search.
pub struct AvailabilityEvaluator<G: ?Sized> {
    gateway: Arc<G>,
}

impl<G> AvailabilityEvaluator<G>
where
    G: ProviderGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn evaluate(
        &self,
        credential: &Credential,
        unit_id: &UnitId,
        range: &DateRange,
    ) -> UnitEvaluation {
        let days = match self.gateway.calendar(&credential.value, unit_id, range).await {
            Ok(days) => days,
            Err(err) => {
                warn!(unit = %unit_id, error = %err, "calendar unavailable; unit excluded");
                return UnitEvaluation {
                    verdict: AvailabilityVerdict::failed(unit_id.clone(), err.reason_code()),
                    credential_rejected: err.is_unauthorized(),
                };
            }
        };

        let verdict = decide(unit_id.clone(), range, &days);
        debug!(
            unit = %unit_id,
            available = verdict.available,
            nights = verdict.relevant_night_count,
            reasons = ?verdict.reason_codes,
            "unit evaluated"
        );
        UnitEvaluation {
            verdict,
            credential_rejected: false,
        }
    }
}
