use chrono::NaiveDate;
use fitfriend_core::ledger::{ExcuseLog, LedgerRecord, NutrientTotals, ViolationKind};
use fitfriend_core::session::SessionState;

use super::ledger::LedgerManager;
use crate::store::StoreError;

/// Stored when the user declines to give a real excuse.
pub const FALLBACK_EXCUSE: &str = "I am weak and I succumb to temptations easily.";

/// Links an excuse to the day whose violation it explains. That is today,
/// unless the session points at an earlier day with a late-detected workout
/// violation; the pointer is consumed and the workout tag added.
pub async fn attach_excuse(
    ledgers: &LedgerManager<'_>,
    user_id: &str,
    goals: &NutrientTotals,
    session: &mut SessionState,
    mut violations: Vec<ViolationKind>,
    excuse: &str,
) -> Result<NaiveDate, StoreError> {
    let day = match session.pending_violation_day.take() {
        Some(day) => {
            if !violations.contains(&ViolationKind::Workout) {
                violations.push(ViolationKind::Workout);
            }
            day
        }
        None => ledgers.today(),
    };

    let record = LedgerRecord::Excuse(ExcuseLog {
        excuse: excuse.to_string(),
        violations,
    });
    match ledgers.get(user_id, day).await? {
        Some(mut ledger) => {
            ledgers.append(goals, &mut ledger, record).await?;
        }
        None => ledgers.append_detached(user_id, day, record).await?,
    }

    tracing::info!(user_id = %user_id, day = %day, "Excuse recorded");
    Ok(day)
}
