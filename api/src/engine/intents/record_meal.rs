use fitfriend_core::catalog::{CatalogKind, FoodDetails, MeasurementUnit, canonical_name};
use fitfriend_core::dialog::{ConfirmationStatus, Directive, IntentName, InvocationPhase, Slots};
use fitfriend_core::ledger::{
    DailyLedger, FoodLog, LedgerRecord, NutrientTotals, find_violations, format_violation_tags,
};
use fitfriend_core::session::MealEstimate;

use super::{owed_excuse, parse, uncommitted};
use crate::engine::continuation::Validation;
use crate::engine::messages;
use crate::engine::{Engine, Turn};
use crate::store::StoreError;

const MEASUREMENT: &str = "How much did you eat?";

/// A meal's slots once they all parse.
struct Portion {
    food_name: String,
    amount: f64,
    unit: MeasurementUnit,
}

pub async fn handle(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    if turn.phase == InvocationPhase::PreCommit && turn.confirmation == ConfirmationStatus::Denied {
        return Ok(turn.cancel());
    }
    let Some(mut user) = engine.store.get_user(&turn.user_id).await? else {
        return Ok(turn.onboarding());
    };
    let rollover = engine.ledgers().ensure_today(&mut user).await?;

    match turn.phase {
        InvocationPhase::PreCommit => {
            if let Some(prompt) = owed_excuse(turn, &rollover, true) {
                return Ok(prompt);
            }
            turn.session.meal_estimate = None;

            let food = match turn.slots.get("FoodName").map(canonical_name) {
                Some(name) => {
                    let entry = engine
                        .catalog()
                        .lookup(CatalogKind::Food, &name, &turn.user_id)
                        .await?;
                    match entry.as_ref().and_then(|entry| entry.as_food()) {
                        Some(food) => Some(food.clone()),
                        None => {
                            return Ok(turn.resolve(Validation::MissingEntry {
                                kind: CatalogKind::Food,
                                name,
                            }));
                        }
                    }
                }
                None => None,
            };

            if let Some(unit) = turn.slots.get("MeasurementType").map(MeasurementUnit::parse) {
                match unit {
                    Some(unit) => turn.slots.set("MeasurementType", Some(unit.as_str())),
                    None => {
                        return Ok(turn.resolve(Validation::invalid(
                            "MeasurementType",
                            messages::MEASUREMENT_TYPE,
                        )));
                    }
                }
            }
            if turn
                .slots
                .get("Measurement")
                .is_some_and(|raw| parse::positive_number(raw).is_none())
            {
                return Ok(turn.resolve(Validation::invalid("Measurement", MEASUREMENT)));
            }

            if let (Some(food), Ok(portion)) = (food, read_portion(&turn.slots)) {
                turn.session.meal_estimate =
                    Some(estimate(&user.goals, &rollover.ledger, &food, &portion));
            }
            Ok(turn.resolve(Validation::Valid))
        }
        InvocationPhase::PostCommit => {
            let portion = match read_portion(&turn.slots) {
                Ok(portion) => portion,
                Err(invalid) => return Ok(uncommitted(turn, &rollover, invalid)),
            };
            let entry = engine
                .catalog()
                .lookup(CatalogKind::Food, &portion.food_name, &turn.user_id)
                .await?;
            let Some(food) = entry.as_ref().and_then(|entry| entry.as_food()) else {
                let missing = Validation::MissingEntry {
                    kind: CatalogKind::Food,
                    name: portion.food_name,
                };
                return Ok(uncommitted(turn, &rollover, missing));
            };

            let nutrition = food.nutrition_for(portion.amount, portion.unit);
            let excuse_prompt = owed_excuse(turn, &rollover, false);
            let mut ledger = rollover.ledger;
            let outcome = engine
                .ledgers()
                .append(
                    &user.goals,
                    &mut ledger,
                    LedgerRecord::Food(FoodLog {
                        food_name: portion.food_name,
                        measurement: portion.amount,
                        unit: portion.unit,
                        nutrition,
                        remaining_after: NutrientTotals::default(),
                    }),
                )
                .await?;
            turn.session.meal_estimate = None;
            tracing::debug!(
                user_id = %turn.user_id,
                calorie_remaining = outcome.remaining.calorie,
                "Meal recorded"
            );

            if outcome.new_violations.is_empty() {
                return Ok(excuse_prompt.unwrap_or_else(|| turn.finish(messages::MEAL_RECORDED)));
            }
            let tags = format_violation_tags(&outcome.new_violations);
            let slots = Slots::from_pairs([("Excuse", None), ("Violation", Some(tags.as_str()))]);
            match (excuse_prompt, rollover.previous_day) {
                // Yesterday's workout comes first; today's overspend waits behind it.
                (Some(prompt), Some(day)) => {
                    turn.queue_excuse(day, slots);
                    Ok(prompt)
                }
                _ => Ok(Directive::confirm(
                    IntentName::GiveExcuse,
                    slots,
                    messages::nutrient_excuse(&outcome.new_violations),
                )),
            }
        }
    }
}

fn read_portion(slots: &Slots) -> Result<Portion, Validation> {
    let food_name = slots
        .get("FoodName")
        .map(canonical_name)
        .ok_or_else(|| Validation::invalid("FoodName", "What did you eat?"))?;
    let amount = slots
        .get("Measurement")
        .and_then(parse::positive_number)
        .ok_or_else(|| Validation::invalid("Measurement", MEASUREMENT))?;
    let unit = slots
        .get("MeasurementType")
        .and_then(MeasurementUnit::parse)
        .ok_or_else(|| Validation::invalid("MeasurementType", messages::MEASUREMENT_TYPE))?;
    Ok(Portion {
        food_name,
        amount,
        unit,
    })
}

/// What committing the meal would do to today's budget.
fn estimate(
    goals: &NutrientTotals,
    ledger: &DailyLedger,
    food: &FoodDetails,
    portion: &Portion,
) -> MealEstimate {
    let food_nutrition = food.nutrition_for(portion.amount, portion.unit);
    let remaining = ledger.nutrition_remaining.minus(&food_nutrition);
    let new_violations: Vec<_> = find_violations(goals, &remaining)
        .into_iter()
        .filter(|violation| !ledger.violations.contains(violation))
        .collect();
    MealEstimate {
        food_nutrition,
        remaining,
        warning: messages::violation_warning(&new_violations),
    }
}

#[cfg(test)]
mod tests {
    use fitfriend_core::catalog::CatalogEntry;
    use fitfriend_core::ledger::ViolationKind;
    use serde_json::json;

    use super::*;
    use crate::engine::testing::*;
    use crate::store::Store;

    async fn with_pizza() -> Harness {
        let harness = Harness::with_user().await;
        harness
            .store
            .put_catalog_entry(&CatalogEntry::food(
                USER,
                "pizza",
                FoodDetails {
                    serving_grams: 100.0,
                    calorie: 800.0,
                    protein: 30.0,
                    carbohydrate: 90.0,
                    fat: 35.0,
                },
            ))
            .await
            .unwrap();
        harness
    }

    fn meal(servings: &str) -> serde_json::Value {
        json!({"FoodName": "Pizza", "Measurement": servings, "MeasurementType": "serving"})
    }

    #[tokio::test]
    async fn estimate_is_cached_for_the_confirmation_prompt() {
        let mut harness = with_pizza().await;
        let response = harness
            .turn("RecordMeal", "pre_commit", "None", meal("3"))
            .await
            .unwrap();

        match &response.directive {
            Directive::Delegate { slots } => {
                assert_eq!(slots.get("MeasurementType"), Some("servings"));
            }
            other => panic!("expected delegate, got {other:?}"),
        }
        let estimate = response.session_state.meal_estimate.unwrap();
        assert_eq!(estimate.food_nutrition.calorie, 2400);
        assert_eq!(estimate.remaining.calorie, -400);
        assert!(estimate.warning.unwrap().contains("calorie"));
    }

    #[tokio::test]
    async fn unknown_unit_is_re_prompted() {
        let mut harness = with_pizza().await;
        let directive = harness
            .dialog(
                "RecordMeal",
                "None",
                json!({"FoodName": "pizza", "Measurement": "1", "MeasurementType": "slices"}),
            )
            .await;
        match directive {
            Directive::RePrompt {
                slot_to_elicit,
                message,
                ..
            } => {
                assert_eq!(slot_to_elicit, "MeasurementType");
                assert_eq!(message, messages::MEASUREMENT_TYPE);
            }
            other => panic!("expected re-prompt, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_food_asks_to_create_it() {
        let mut harness = Harness::with_user().await;
        let directive = harness.dialog("RecordMeal", "None", meal("1")).await;
        match directive {
            Directive::Confirm {
                intent_name,
                slots,
                message,
            } => {
                assert_eq!(intent_name, IntentName::CreateFood);
                assert_eq!(slots.get("FoodName"), Some("pizza"));
                assert_eq!(
                    message,
                    "pizza is not recognized as one of your foods. Would you like to add it?"
                );
            }
            other => panic!("expected confirm, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn meal_within_budget_is_yummy() {
        let mut harness = with_pizza().await;
        let directive = harness.fulfill("RecordMeal", meal("1")).await;
        assert_eq!(directive, Directive::fulfilled(messages::MEAL_RECORDED));
        let ledger = harness.ledger(monday()).await.unwrap();
        assert_eq!(ledger.nutrition_remaining.calorie, 1200);
    }

    #[tokio::test]
    async fn only_newly_flagged_violations_ask_for_an_excuse() {
        let mut harness = with_pizza().await;
        let directive = harness.fulfill("RecordMeal", meal("3")).await;
        match &directive {
            Directive::Confirm {
                intent_name, slots, ..
            } => {
                assert_eq!(*intent_name, IntentName::GiveExcuse);
                assert_eq!(slots.get("Violation"), Some("calorie fat"));
            }
            other => panic!("expected excuse confirm, got {other:?}"),
        }
        let ledger = harness.ledger(monday()).await.unwrap();
        assert_eq!(ledger.violations, vec![ViolationKind::Calorie, ViolationKind::Fat]);

        // Calorie and fat are already flagged; protein and carbohydrate are new.
        let again = harness.fulfill("RecordMeal", meal("1")).await;
        match &again {
            Directive::Confirm { slots, .. } => {
                assert_eq!(slots.get("Violation"), Some("protein carbohydrate"));
            }
            other => panic!("expected excuse confirm, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn enormous_portions_saturate_the_budget() {
        let mut harness = with_pizza().await;
        match harness.fulfill("RecordMeal", meal("1e300")).await {
            Directive::Confirm { slots, .. } => {
                assert_eq!(slots.get("Violation"), Some("calorie protein carbohydrate fat"));
            }
            other => panic!("expected excuse confirm, got {other:?}"),
        }

        let again = harness.fulfill("RecordMeal", meal("1e300")).await;
        assert_eq!(again, Directive::fulfilled(messages::MEAL_RECORDED));
        let ledger = harness.ledger(monday()).await.unwrap();
        assert_eq!(ledger.nutrition_remaining.calorie, i64::MIN);
    }

    #[tokio::test]
    async fn overspend_excuse_follows_the_owed_workout_excuse() {
        let mut harness = with_pizza().await;
        harness.dialog("RecordMeal", "None", json!({"FoodName": null})).await;

        harness.clock.advance(chrono::Duration::days(1));
        let tuesday = monday().succ_opt().unwrap();
        match harness.fulfill("RecordMeal", meal("3")).await {
            Directive::Confirm {
                intent_name,
                slots,
                message,
            } => {
                assert_eq!(intent_name, IntentName::GiveExcuse);
                assert_eq!(slots.get("Violation"), Some("workout"));
                assert!(message.contains("squat and run"));
            }
            other => panic!("expected workout excuse confirm, got {other:?}"),
        }
        assert_eq!(harness.pending(), 1);

        let next = harness
            .fulfill("GiveExcuse", json!({"Excuse": "slept in", "Violation": "workout"}))
            .await;
        match &next {
            Directive::Confirm {
                intent_name,
                slots,
                message,
            } => {
                assert_eq!(*intent_name, IntentName::GiveExcuse);
                assert_eq!(slots.get("Violation"), Some("calorie fat"));
                assert!(message.starts_with(messages::EXCUSE_RECORDED));
            }
            other => panic!("expected overspend excuse confirm, got {other:?}"),
        }
        assert_eq!(harness.pending(), 0);

        let done = harness
            .fulfill("GiveExcuse", json!({"Excuse": "birthday", "Violation": "calorie fat"}))
            .await;
        assert_eq!(done, Directive::fulfilled(messages::EXCUSE_RECORDED));

        let monday_entries = harness.store.entries_for_day(USER, monday()).await.unwrap();
        assert_eq!(monday_entries.len(), 1);
        let tuesday_entries = harness.store.entries_for_day(USER, tuesday).await.unwrap();
        assert_eq!(tuesday_entries.len(), 2);
        let ledger = harness.ledger(tuesday).await.unwrap();
        assert_eq!(ledger.violations, vec![ViolationKind::Calorie, ViolationKind::Fat]);
    }
}
