use fitfriend_core::catalog::{CatalogEntry, CatalogKind, FoodDetails, canonical_name};
use fitfriend_core::dialog::{ConfirmationStatus, Directive, IntentName, InvocationPhase, Slots};
use fitfriend_core::session::ResumeReason;

use super::parse;
use crate::engine::continuation::{Validation, creation_slots};
use crate::engine::messages;
use crate::engine::{Engine, Turn};
use crate::store::StoreError;

/// Per-serving slots in elicitation order, with the question for each.
const NUTRITION_SLOTS: [(&str, &str); 5] = [
    ("Serving", "How many grams in one serving?"),
    ("Calorie", "How many calories in one serving?"),
    ("Protein", "How many grams of protein in one serving?"),
    ("Carbohydrate", "How many grams of carbohydrates in one serving?"),
    ("Fat", "How many grams of fat in one serving?"),
];

pub async fn handle(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    match turn.phase {
        InvocationPhase::PreCommit => pre_commit(engine, turn).await,
        InvocationPhase::PostCommit => fulfill(engine, turn).await,
    }
}

fn awaited_name(turn: &Turn) -> Option<String> {
    match &turn.session.peek()?.reason {
        ResumeReason::MissingCatalogEntry {
            kind: CatalogKind::Food,
            name,
        } => Some(name.clone()),
        _ => None,
    }
}

fn parse_slot(slot: &str, raw: &str) -> Option<f64> {
    if slot == "Serving" {
        parse::positive_number(raw)
    } else {
        parse::non_negative_number(raw)
    }
}

/// First filled slot with an unusable value, or with `elicit_missing` the
/// first empty one.
fn check_nutrition(slots: &Slots, elicit_missing: bool) -> Validation {
    for (slot, question) in NUTRITION_SLOTS {
        match slots.get(slot) {
            Some(raw) if parse_slot(slot, raw).is_none() => {
                return Validation::invalid(slot, format!("Sorry, I need a number. {question}"));
            }
            None if elicit_missing => return Validation::invalid(slot, question),
            _ => {}
        }
    }
    Validation::Valid
}

async fn pre_commit(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    if turn.confirmation == ConfirmationStatus::Denied {
        return Ok(turn.cancel());
    }

    if turn.confirmation == ConfirmationStatus::None {
        if let Some(name) = awaited_name(turn) {
            return Ok(Directive::confirm(
                IntentName::CreateFood,
                creation_slots(CatalogKind::Food, &name),
                messages::not_recognized(CatalogKind::Food, &name),
            ));
        }
    }

    let Some(name) = turn.slots.get("FoodName").map(canonical_name) else {
        return Ok(turn.resolve(Validation::Valid));
    };

    let confirmed = turn.confirmation == ConfirmationStatus::Confirmed;
    if confirmed
        && engine
            .catalog()
            .exists(CatalogKind::Food, &name, &turn.user_id)
            .await?
    {
        return Ok(turn.finish(messages::catalog_exists(CatalogKind::Food, &name)));
    }

    let validation = check_nutrition(&turn.slots, confirmed);
    Ok(turn.resolve(validation))
}

async fn fulfill(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    let Some(name) = turn.slots.get("FoodName").map(canonical_name) else {
        return Ok(turn.resolve(Validation::invalid("FoodName", "What's the name of the food?")));
    };
    if let invalid @ Validation::Invalid { .. } = check_nutrition(&turn.slots, true) {
        return Ok(turn.resolve(invalid));
    }

    if engine
        .catalog()
        .exists(CatalogKind::Food, &name, &turn.user_id)
        .await?
    {
        return Ok(turn.finish(messages::catalog_exists(CatalogKind::Food, &name)));
    }

    let value = |slot: &str| {
        turn.slots
            .get(slot)
            .and_then(|raw| parse_slot(slot, raw))
            .unwrap_or_default()
    };
    let details = FoodDetails {
        serving_grams: value("Serving"),
        calorie: value("Calorie"),
        protein: value("Protein"),
        carbohydrate: value("Carbohydrate"),
        fat: value("Fat"),
    };
    let entry = CatalogEntry::food(&turn.user_id, &name, details);
    if !engine.store.put_catalog_entry(&entry).await? {
        // A concurrent turn created it first.
        return Ok(turn.finish(messages::catalog_exists(CatalogKind::Food, &entry.name)));
    }
    tracing::info!(user_id = %turn.user_id, food = %entry.name, "Food created");

    Ok(turn.finish(messages::catalog_added(CatalogKind::Food, &entry.name)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::engine::testing::*;
    use crate::store::Store;

    #[tokio::test]
    async fn confirmed_creation_elicits_missing_values_in_order() {
        let mut harness = Harness::with_user().await;
        let directive = harness
            .dialog(
                "CreateFood",
                "Confirmed",
                json!({"FoodName": "oats", "Serving": "40", "Calorie": null, "Protein": "5"}),
            )
            .await;
        match directive {
            Directive::RePrompt {
                slot_to_elicit,
                message,
                ..
            } => {
                assert_eq!(slot_to_elicit, "Calorie");
                assert_eq!(message, "How many calories in one serving?");
            }
            other => panic!("expected re-prompt, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_numeric_value_is_re_prompted() {
        let mut harness = Harness::with_user().await;
        match harness
            .dialog("CreateFood", "None", json!({"FoodName": "oats", "Protein": "lots"}))
            .await
        {
            Directive::RePrompt { slot_to_elicit, .. } => assert_eq!(slot_to_elicit, "Protein"),
            other => panic!("expected re-prompt, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fulfillment_stores_per_serving_values() {
        let mut harness = Harness::with_user().await;
        let directive = harness
            .fulfill(
                "CreateFood",
                json!({
                    "FoodName": "Oats",
                    "Serving": "40",
                    "Calorie": "150",
                    "Protein": "5",
                    "Carbohydrate": "27",
                    "Fat": "3",
                }),
            )
            .await;
        assert_eq!(message(&directive), "Got it! oats has been added to your foods.");

        let entry = harness
            .store
            .get_catalog_entry(CatalogKind::Food, USER, "oats")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.as_food().unwrap().calorie, 150.0);
    }

    #[tokio::test]
    async fn losing_a_creation_race_keeps_the_first_entry() {
        let mut harness = Harness::with_user().await;
        let first = CatalogEntry::food(
            USER,
            "oats",
            FoodDetails {
                serving_grams: 40.0,
                calorie: 150.0,
                protein: 5.0,
                carbohydrate: 27.0,
                fat: 3.0,
            },
        );
        assert!(harness.store.put_catalog_entry(&first).await.unwrap());
        harness.hide_catalog_reads();

        let directive = harness
            .fulfill(
                "CreateFood",
                json!({
                    "FoodName": "oats",
                    "Serving": "100",
                    "Calorie": "380",
                    "Protein": "13",
                    "Carbohydrate": "68",
                    "Fat": "7",
                }),
            )
            .await;
        assert_eq!(
            directive,
            Directive::fulfilled(messages::catalog_exists(CatalogKind::Food, "oats"))
        );
        let stored = harness
            .store
            .get_catalog_entry(CatalogKind::Food, USER, "oats")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.as_food().unwrap().calorie, 150.0);
    }
}
