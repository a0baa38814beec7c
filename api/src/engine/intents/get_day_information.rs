use chrono::NaiveDate;
use fitfriend_core::dialog::{Directive, InvocationPhase};
use fitfriend_core::ledger::{DailyLedger, LedgerEntry, LedgerRecord};
use fitfriend_core::user::User;

use crate::engine::continuation::Validation;
use crate::engine::messages;
use crate::engine::{Engine, Turn};
use crate::store::StoreError;

pub async fn handle(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    let Some(user) = engine.store.get_user(&turn.user_id).await? else {
        return Ok(turn.onboarding());
    };

    let ledger = match turn.slots.get("Day") {
        Some(raw) => match parse_day(raw) {
            Some(day) => engine.ledgers().get(&user.user_id, day).await?,
            None => None,
        },
        None if turn.phase == InvocationPhase::PreCommit => {
            return Ok(turn.resolve(Validation::Valid));
        }
        None => None,
    };
    let Some(ledger) = ledger else {
        return Ok(turn.resolve(Validation::invalid("Day", messages::NO_SUCH_DAY)));
    };

    match turn.phase {
        InvocationPhase::PreCommit => Ok(turn.resolve(Validation::Valid)),
        InvocationPhase::PostCommit => {
            let entries = engine.ledgers().entries(&user.user_id, ledger.day).await?;
            Ok(turn.finish(day_summary(&user, &ledger, &entries)))
        }
    }
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn day_summary(user: &User, ledger: &DailyLedger, entries: &[LedgerEntry]) -> String {
    let unit = user.unit_system.weight_unit();
    let mut activity = Vec::new();
    let mut meals = Vec::new();
    for entry in entries {
        match &entry.record {
            LedgerRecord::Lift(lift) => activity.push(format!(
                "{} at {}{unit} for {} reps and {} sets",
                lift.exercise, lift.weight, lift.reps, lift.sets
            )),
            LedgerRecord::Run(run) => activity.push(format!(
                "a run of {} in {}",
                run.distance, run.duration
            )),
            LedgerRecord::Food(food) => meals.push(format!(
                "{} {} of {}",
                food.measurement,
                food.unit.as_str(),
                food.food_name
            )),
            LedgerRecord::Excuse(_) => {}
        }
    }

    if activity.is_empty() && meals.is_empty() {
        return messages::NOTHING_YET.to_string();
    }
    let mut parts = Vec::new();
    if !activity.is_empty() {
        parts.push(format!("You did {}.", messages::join_list(&activity)));
    }
    if !meals.is_empty() {
        parts.push(format!("You ate {}.", messages::join_list(&meals)));
    }
    parts.push(format!(
        "You had {} calories left.",
        ledger.nutrition_remaining.calorie
    ));
    parts.join(" ")
}
