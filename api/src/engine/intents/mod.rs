//! One module per intent. Each exposes `handle`, which splits on the
//! invocation phase.

mod create_exercise;
mod create_food;
mod create_workout;
mod get_day_information;
mod get_how_to_exercise;
mod give_excuse;
mod help;
mod personalize;
mod record_lift;
mod record_meal;
mod record_run;
mod set_own_goal;

use fitfriend_core::dialog::{Directive, IntentName};
use fitfriend_core::user::User;

use super::continuation::Validation;
use super::ledger::Rollover;
use super::{Engine, Turn};
use crate::store::StoreError;

pub async fn dispatch(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    match turn.intent {
        IntentName::Personalize => personalize::handle(engine, turn).await,
        IntentName::SetOwnGoal => set_own_goal::handle(engine, turn).await,
        IntentName::CreateWorkout => create_workout::handle(engine, turn).await,
        IntentName::CreateExercise => create_exercise::handle(engine, turn).await,
        IntentName::CreateFood => create_food::handle(engine, turn).await,
        IntentName::RecordWeightlift => record_lift::handle(engine, turn).await,
        IntentName::RecordRun => record_run::handle(engine, turn).await,
        IntentName::RecordMeal => record_meal::handle(engine, turn).await,
        IntentName::GiveExcuse => give_excuse::handle(engine, turn).await,
        IntentName::GetDayInformation => get_day_information::handle(engine, turn).await,
        IntentName::GetHowToExercise => get_how_to_exercise::handle(engine, turn).await,
        IntentName::Help => help::handle(engine, turn).await,
    }
}

/// Gate every logging intent passes before validation: the day's ledger must
/// exist, and a rollover that left exercises unfinished asks for an excuse
/// first, queueing the current goal.
pub(super) async fn pre_commit_rollover(
    engine: &Engine<'_>,
    turn: &mut Turn,
    user: &mut User,
) -> Result<Option<Directive>, StoreError> {
    let rollover = engine.ledgers().ensure_today(user).await?;
    Ok(owed_excuse(turn, &rollover, true))
}

/// Excuse prompt for a rollover that owes one, if any.
pub(super) fn owed_excuse(
    turn: &mut Turn,
    rollover: &Rollover,
    interrupt: bool,
) -> Option<Directive> {
    match rollover.previous_day {
        Some(day) if rollover.owes_excuse() => {
            Some(turn.request_workout_excuse(day, &rollover.owed, interrupt))
        }
        _ => None,
    }
}

/// A post-commit turn that can't be written yet. When this turn's rollover
/// owes an excuse it is asked for first, with the goal queued behind it.
pub(super) fn uncommitted(
    turn: &mut Turn,
    rollover: &Rollover,
    validation: Validation,
) -> Directive {
    match owed_excuse(turn, rollover, true) {
        Some(prompt) => prompt,
        None => turn.resolve(validation),
    }
}

/// Slot value parsers. Each returns `None` for anything unusable.
pub(super) mod parse {
    pub fn positive_number(raw: &str) -> Option<f64> {
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value > 0.0)
    }

    pub fn non_negative_number(raw: &str) -> Option<f64> {
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
    }

    pub fn positive_count(raw: &str) -> Option<u32> {
        raw.trim().parse::<u32>().ok().filter(|value| *value > 0)
    }

    pub fn non_negative_integer(raw: &str) -> Option<i64> {
        raw.trim().parse::<i64>().ok().filter(|value| *value >= 0)
    }

}
