use fitfriend_core::dialog::{ConfirmationStatus, Directive, InvocationPhase, Slots};
use fitfriend_core::targets::{BodyMetrics, FitnessGoal, Gender};
use fitfriend_core::user::{UnitSystem, User, WeeklySchedule};

use super::parse;
use crate::engine::continuation::Validation;
use crate::engine::{Engine, Turn};
use crate::store::StoreError;

const GENDER: &str = "Sorry, I can only take male or female at this time.";
const SYSTEM: &str = "Sorry, please choose between the imperial system and the metric system.";
const GOAL: &str = "Sorry, please choose between gain mass, lose weight, and maintain weight.";

pub async fn handle(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    match turn.phase {
        InvocationPhase::PreCommit => {
            if turn.confirmation == ConfirmationStatus::Denied {
                return Ok(turn.cancel());
            }
            let validation = validate(&turn.slots);
            Ok(turn.resolve(validation))
        }
        InvocationPhase::PostCommit => fulfill(engine, turn).await,
    }
}

fn validate(slots: &Slots) -> Validation {
    if slots.get("Gender").is_some_and(|raw| Gender::parse(raw).is_none()) {
        return Validation::invalid("Gender", GENDER);
    }
    if slots
        .get("MeasurementSystem")
        .is_some_and(|raw| UnitSystem::parse(raw).is_none())
    {
        return Validation::invalid("MeasurementSystem", SYSTEM);
    }
    if slots.get("Goal").is_some_and(|raw| FitnessGoal::parse(raw).is_none()) {
        return Validation::invalid("Goal", GOAL);
    }
    for (slot, noun) in [("Age", "age"), ("Height", "height"), ("Weight", "weight")] {
        if slots
            .get(slot)
            .is_some_and(|raw| parse::positive_number(raw).is_none())
        {
            return Validation::invalid(
                slot,
                format!("Sorry, please give your {noun} as a positive number."),
            );
        }
    }
    Validation::Valid
}

/// Reads every slot, naming the first one that is missing or unusable.
fn read_metrics(slots: &Slots) -> Result<(String, BodyMetrics), Validation> {
    let name = slots
        .get("Name")
        .ok_or_else(|| Validation::invalid("Name", "What's your name?"))?;
    let gender = slots
        .get("Gender")
        .and_then(Gender::parse)
        .ok_or_else(|| Validation::invalid("Gender", GENDER))?;
    let unit_system = slots
        .get("MeasurementSystem")
        .and_then(UnitSystem::parse)
        .ok_or_else(|| Validation::invalid("MeasurementSystem", SYSTEM))?;
    let goal = slots
        .get("Goal")
        .and_then(FitnessGoal::parse)
        .ok_or_else(|| Validation::invalid("Goal", GOAL))?;
    let number = |slot: &'static str| {
        slots
            .get(slot)
            .and_then(parse::positive_number)
            .ok_or_else(|| {
                Validation::invalid(
                    slot,
                    format!(
                        "Sorry, please give your {} as a positive number.",
                        slot.to_lowercase()
                    ),
                )
            })
    };

    Ok((
        name.to_string(),
        BodyMetrics {
            gender,
            age: number("Age")?,
            height: number("Height")?,
            weight: number("Weight")?,
            unit_system,
            goal,
        },
    ))
}

async fn fulfill(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    let (name, metrics) = match read_metrics(&turn.slots) {
        Ok(read) => read,
        Err(validation) => return Ok(turn.resolve(validation)),
    };
    let goals = metrics.default_goals();

    let existing = engine.store.get_user(&turn.user_id).await?;
    let (schedule, last_ledger_day) = match existing {
        Some(user) => (user.schedule, user.last_ledger_day),
        None => (WeeklySchedule::default(), None),
    };
    let user = User {
        user_id: turn.user_id.clone(),
        name,
        unit_system: metrics.unit_system,
        goals,
        metrics: Some(metrics),
        schedule,
        last_ledger_day,
    };
    engine.store.put_user(&user).await?;
    tracing::info!(user_id = %user.user_id, calorie_goal = goals.calorie, "User personalized");

    Ok(turn.finish(format!(
        "Nice to meet you, {}! Your target calorie goal is {} with little exercise, \
         your protein goal is {}g, your carbohydrate goal is {}g, and your fat goal is {}g. \
         If you want to set your own goals, just type 'I would like to set my own goals'. \
         If you ever need help with any commands, just enter \"help\"",
        user.name, goals.calorie, goals.protein, goals.carbohydrate, goals.fat
    )))
}
