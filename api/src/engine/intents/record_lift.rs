use fitfriend_core::catalog::{CatalogKind, canonical_name};
use fitfriend_core::dialog::{ConfirmationStatus, Directive, InvocationPhase, Slots};
use fitfriend_core::ledger::{LedgerRecord, LiftLog};

use super::{owed_excuse, parse, pre_commit_rollover, uncommitted};
use crate::engine::continuation::Validation;
use crate::engine::messages;
use crate::engine::{Engine, Turn};
use crate::store::StoreError;

const WEIGHT: &str = "How much weight did you lift?";
const REPS: &str = "How many reps did you do?";
const SETS: &str = "How many sets did you do?";

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
            let validation = match check_exercise(engine, turn).await? {
                Validation::Valid => check_numbers(&turn.slots),
                missing => missing,
            };
            Ok(turn.resolve(validation))
        }
        InvocationPhase::PostCommit => {
            let rollover = engine.ledgers().ensure_today(&mut user).await?;

            let lift = match read_lift(&turn.slots) {
                Ok(lift) => lift,
                Err(invalid) => return Ok(uncommitted(turn, &rollover, invalid)),
            };
            let validation = check_exercise(engine, turn).await?;
            if validation != Validation::Valid {
                return Ok(uncommitted(turn, &rollover, validation));
            }

            let excuse_prompt = owed_excuse(turn, &rollover, false);
            let mut ledger = rollover.ledger;
            engine
                .ledgers()
                .append(&user.goals, &mut ledger, LedgerRecord::Lift(lift))
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

async fn check_exercise(engine: &Engine<'_>, turn: &Turn) -> Result<Validation, StoreError> {
    let Some(name) = turn.slots.get("Exercise").map(canonical_name) else {
        return Ok(Validation::Valid);
    };
    if engine
        .catalog()
        .exists(CatalogKind::Exercise, &name, &turn.user_id)
        .await?
    {
        Ok(Validation::Valid)
    } else {
        Ok(Validation::MissingEntry {
            kind: CatalogKind::Exercise,
            name,
        })
    }
}

fn check_numbers(slots: &Slots) -> Validation {
    if slots
        .get("Weight")
        .is_some_and(|raw| parse::positive_number(raw).is_none())
    {
        return Validation::invalid("Weight", WEIGHT);
    }
    for (slot, question) in [("Reps", REPS), ("Sets", SETS)] {
        if slots
            .get(slot)
            .is_some_and(|raw| parse::positive_count(raw).is_none())
        {
            return Validation::invalid(slot, question);
        }
    }
    Validation::Valid
}

fn read_lift(slots: &Slots) -> Result<LiftLog, Validation> {
    let exercise = slots
        .get("Exercise")
        .map(canonical_name)
        .ok_or_else(|| Validation::invalid("Exercise", "Which exercise did you do?"))?;
    let weight = slots
        .get("Weight")
        .and_then(parse::positive_number)
        .ok_or_else(|| Validation::invalid("Weight", WEIGHT))?;
    let reps = slots
        .get("Reps")
        .and_then(parse::positive_count)
        .ok_or_else(|| Validation::invalid("Reps", REPS))?;
    let sets = slots
        .get("Sets")
        .and_then(parse::positive_count)
        .ok_or_else(|| Validation::invalid("Sets", SETS))?;
    Ok(LiftLog {
        exercise,
        weight,
        reps,
        sets,
    })
}
