use fitfriend_core::dialog::{ConfirmationStatus, Directive, InvocationPhase, Slots};
use fitfriend_core::ledger::{LedgerRecord, RunLog};

use super::{owed_excuse, parse, pre_commit_rollover, uncommitted};
use crate::engine::continuation::Validation;
use crate::engine::messages;
use crate::engine::{Engine, Turn};
use crate::store::StoreError;

const DISTANCE: &str = "How far did you run?";
const DURATION: &str = "How long did you run for?";
const INCLINE: &str = "What incline were you running at?";

pub async fn handle(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    if turn.phase == InvocationPhase::PreCommit && turn.confirmation == ConfirmationStatus::Denied {
        return Ok(turn.cancel());
    }
    let Some(mut user) = engine.store.get_user(&turn.user_id).await? else {
        return Ok(turn.onboarding());
    };

    match turn.phase {
        InvocationPhase::PreCommit => {
            if let Some(prompt) = pre_commit_rollover(engine, turn, &mut user).await? {
                return Ok(prompt);
            }
            let validation = check(&turn.slots);
            Ok(turn.resolve(validation))
        }
        InvocationPhase::PostCommit => {
            let rollover = engine.ledgers().ensure_today(&mut user).await?;
            let run = match read_run(&turn.slots) {
                Ok(run) => run,
                Err(invalid) => return Ok(uncommitted(turn, &rollover, invalid)),
            };

            let excuse_prompt = owed_excuse(turn, &rollover, false);
            let mut ledger = rollover.ledger;
            engine
                .ledgers()
                .append(&user.goals, &mut ledger, LedgerRecord::Run(run))
                .await?;

            if let Some(prompt) = excuse_prompt {
                return Ok(prompt);
            }
            Ok(turn.finish(format!(
                "Good job!! {}",
                messages::workout_progress(&ledger.exercises_remaining)
            )))
        }
    }
}

fn check(slots: &Slots) -> Validation {
    if slots
        .get("Distance")
        .is_some_and(|raw| parse::positive_number(raw).is_none())
    {
        return Validation::invalid("Distance", DISTANCE);
    }
    if slots
        .get("Incline")
        .is_some_and(|raw| parse::non_negative_number(raw).is_none())
    {
        return Validation::invalid("Incline", INCLINE);
    }
    Validation::Valid
}

fn read_run(slots: &Slots) -> Result<RunLog, Validation> {
    if let invalid @ Validation::Invalid { .. } = check(slots) {
        return Err(invalid);
    }
    let distance = slots
        .get("Distance")
        .and_then(parse::positive_number)
        .ok_or_else(|| Validation::invalid("Distance", DISTANCE))?;
    let duration = slots
        .get("Duration")
        .ok_or_else(|| Validation::invalid("Duration", DURATION))?;
    Ok(RunLog {
        distance,
        duration: duration.to_string(),
        incline: slots.get("Incline").and_then(parse::non_negative_number),
    })
}
