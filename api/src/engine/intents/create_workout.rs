use std::sync::LazyLock;

use fitfriend_core::catalog::{CatalogKind, canonical_name};
use fitfriend_core::dialog::{ConfirmationStatus, Directive, InvocationPhase, Slots};
use fitfriend_core::ledger::{RUN_EXERCISE, is_rest};
use fitfriend_core::user::{WeeklySchedule, weekday_name};
use regex::Regex;

use crate::engine::continuation::Validation;
use crate::engine::messages;
use crate::engine::{Engine, Turn};
use crate::store::StoreError;

static LIST_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*(?:,|\band\b)\s*").expect("valid separator regex"));

/// Splits a spoken exercise list ("squat, bench press and run") into
/// canonical names.
fn exercise_list(raw: &str) -> Vec<String> {
    LIST_SEPARATOR
        .split(raw)
        .map(canonical_name)
        .filter(|name| !name.is_empty())
        .collect()
}

fn schedule_from(slots: &Slots) -> WeeklySchedule {
    let mut schedule = WeeklySchedule::default();
    for weekday in WeeklySchedule::WEEKDAYS {
        if let Some(raw) = slots.get(weekday_name(weekday)) {
            schedule.set_weekday(weekday, exercise_list(raw));
        }
    }
    schedule
}

pub async fn handle(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    let Some(mut user) = engine.store.get_user(&turn.user_id).await? else {
        return Ok(turn.onboarding());
    };

    match turn.phase {
        InvocationPhase::PreCommit => {
            if turn.confirmation == ConfirmationStatus::Denied {
                return Ok(turn.cancel());
            }
            let validation = first_unknown_exercise(engine, turn).await?;
            Ok(turn.resolve(validation))
        }
        InvocationPhase::PostCommit => {
            if let Validation::MissingEntry { kind, name } =
                first_unknown_exercise(engine, turn).await?
            {
                return Ok(turn.request_missing_entry(kind, &name));
            }
            user.schedule = schedule_from(&turn.slots);
            engine.store.put_user(&user).await?;
            tracing::info!(user_id = %user.user_id, "Workout schedule replaced");
            Ok(turn.finish(messages::SCHEDULE_UPDATED))
        }
    }
}

/// Scans weekdays Monday to Sunday, each list front to back, and stops at the
/// first exercise neither catalog knows. Each created exercise brings the
/// goal back here, which finds the next one.
async fn first_unknown_exercise(
    engine: &Engine<'_>,
    turn: &Turn,
) -> Result<Validation, StoreError> {
    let catalog = engine.catalog();
    let schedule = schedule_from(&turn.slots);
    for weekday in WeeklySchedule::WEEKDAYS {
        for name in schedule.for_weekday(weekday) {
            if is_rest(name) || name == RUN_EXERCISE {
                continue;
            }
            if !catalog.exists(CatalogKind::Exercise, name, &turn.user_id).await? {
                return Ok(Validation::MissingEntry {
                    kind: CatalogKind::Exercise,
                    name: name.clone(),
                });
            }
        }
    }
    Ok(Validation::Valid)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::engine::testing::*;
    use crate::store::Store;
    use fitfriend_core::dialog::IntentName;

    #[test]
    fn lists_split_on_commas_and_and() {
        assert_eq!(
            exercise_list("Squat, Bench Press and run"),
            vec!["squat", "bench press", "run"]
        );
        assert_eq!(exercise_list("rest"), vec!["rest"]);
        assert_eq!(exercise_list("  "), Vec::<String>::new());
    }

    fn workout() -> serde_json::Value {
        json!({
            "Monday": "squat and zercher squat",
            "Tuesday": "rest",
            "Wednesday": "pistol squat, run",
            "Thursday": null,
            "Friday": null,
            "Saturday": null,
            "Sunday": null,
        })
    }

    fn confirmed_name(directive: &Directive) -> Option<(IntentName, String)> {
        match directive {
            Directive::Confirm {
                intent_name, slots, ..
            } => Some((*intent_name, slots.get("Exercise").unwrap_or_default().to_string())),
            _ => None,
        }
    }

    #[tokio::test]
    async fn unknown_exercises_are_created_one_at_a_time_in_scan_order() {
        let mut harness = Harness::with_user().await;

        let first = harness.dialog("CreateWorkout", "None", workout()).await;
        assert_eq!(
            confirmed_name(&first),
            Some((IntentName::CreateExercise, "zercher squat".to_string()))
        );
        assert_eq!(harness.pending(), 1);

        let resumed = harness
            .fulfill("CreateExercise", json!({"Exercise": "zercher squat", "MuscleGroup": "legs"}))
            .await;
        assert!(matches!(
            resumed,
            Directive::Confirm { intent_name: IntentName::CreateWorkout, .. }
        ));
        assert_eq!(harness.pending(), 0);

        let second = harness.dialog("CreateWorkout", "Confirmed", workout()).await;
        assert_eq!(
            confirmed_name(&second),
            Some((IntentName::CreateExercise, "pistol squat".to_string()))
        );
        harness
            .fulfill("CreateExercise", json!({"Exercise": "pistol squat", "MuscleGroup": "legs"}))
            .await;

        let ready = harness.dialog("CreateWorkout", "Confirmed", workout()).await;
        assert!(matches!(ready, Directive::Delegate { .. }));

        let done = harness.fulfill("CreateWorkout", workout()).await;
        assert_eq!(done, Directive::fulfilled(messages::SCHEDULE_UPDATED));
        let user = harness.store.get_user(USER).await.unwrap().unwrap();
        assert_eq!(user.schedule.monday, vec!["squat", "zercher squat"]);
        assert_eq!(user.schedule.wednesday, vec!["pistol squat", "run"]);
        assert!(user.schedule.thursday.is_empty());
    }
}
