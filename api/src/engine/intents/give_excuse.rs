use fitfriend_core::dialog::{ConfirmationStatus, Directive, InvocationPhase};
use fitfriend_core::ledger::parse_violation_tags;
use fitfriend_core::user::User;

use crate::engine::continuation::Validation;
use crate::engine::excuse::{FALLBACK_EXCUSE, attach_excuse};
use crate::engine::messages;
use crate::engine::{Engine, Turn};
use crate::store::StoreError;

pub async fn handle(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    let Some(mut user) = engine.store.get_user(&turn.user_id).await? else {
        return Ok(turn.onboarding());
    };

    match turn.phase {
        // Declining still counts as an answer: the fallback excuse is stored
        // and any goal waiting on it resumes.
        InvocationPhase::PreCommit if turn.confirmation == ConfirmationStatus::Denied => {
            record(engine, turn, &mut user, FALLBACK_EXCUSE).await
        }
        InvocationPhase::PreCommit => Ok(turn.resolve(Validation::Valid)),
        InvocationPhase::PostCommit => {
            let excuse = turn
                .slots
                .get("Excuse")
                .unwrap_or(FALLBACK_EXCUSE)
                .to_string();
            record(engine, turn, &mut user, &excuse).await
        }
    }
}

async fn record(
    engine: &Engine<'_>,
    turn: &mut Turn,
    user: &mut User,
    excuse: &str,
) -> Result<Directive, StoreError> {
    let ledgers = engine.ledgers();
    let rollover = ledgers.ensure_today(user).await?;
    if rollover.owes_excuse() && turn.session.pending_violation_day.is_none() {
        tracing::info!(
            user_id = %user.user_id,
            previous_day = ?rollover.previous_day,
            "Rollover during an excuse; workout violation flagged without a prompt"
        );
    }

    let violations = parse_violation_tags(turn.slots.get("Violation").unwrap_or_default());
    attach_excuse(
        &ledgers,
        &user.user_id,
        &user.goals,
        &mut turn.session,
        violations,
        excuse,
    )
    .await?;

    Ok(turn.finish(messages::EXCUSE_RECORDED))
}
