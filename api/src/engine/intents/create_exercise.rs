use fitfriend_core::catalog::{
    CatalogEntry, CatalogKind, ExerciseDetails, MuscleGroup, canonical_name,
};
use fitfriend_core::dialog::{ConfirmationStatus, Directive, IntentName, InvocationPhase};
use fitfriend_core::session::ResumeReason;

use crate::engine::continuation::{Validation, creation_slots};
use crate::engine::messages;
use crate::engine::{Engine, Turn};
use crate::store::StoreError;

const MUSCLE_GROUP: &str =
    "Sorry, the muscle group has to be one of shoulder, arms, back, legs, chest, or core.";

pub async fn handle(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    match turn.phase {
        InvocationPhase::PreCommit => pre_commit(engine, turn).await,
        InvocationPhase::PostCommit => fulfill(engine, turn).await,
    }
}

/// Name of the exercise a queued goal is waiting on, if any.
fn awaited_name(turn: &Turn) -> Option<String> {
    match &turn.session.peek()?.reason {
        ResumeReason::MissingCatalogEntry {
            kind: CatalogKind::Exercise,
            name,
        } => Some(name.clone()),
        _ => None,
    }
}

async fn pre_commit(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    if turn.confirmation == ConfirmationStatus::Denied {
        return Ok(turn.cancel());
    }

    if turn.confirmation == ConfirmationStatus::None {
        if let Some(name) = awaited_name(turn) {
            return Ok(Directive::confirm(
                IntentName::CreateExercise,
                creation_slots(CatalogKind::Exercise, &name),
                messages::not_recognized(CatalogKind::Exercise, &name),
            ));
        }
    }

    let Some(name) = turn.slots.get("Exercise").map(canonical_name) else {
        return Ok(turn.resolve(Validation::Valid));
    };

    if turn.confirmation == ConfirmationStatus::Confirmed
        && engine
            .catalog()
            .exists(CatalogKind::Exercise, &name, &turn.user_id)
            .await?
    {
        return Ok(turn.finish(messages::catalog_exists(CatalogKind::Exercise, &name)));
    }

    let validation = if turn
        .slots
        .get("MuscleGroup")
        .is_some_and(|raw| raw.parse::<MuscleGroup>().is_err())
    {
        Validation::invalid("MuscleGroup", MUSCLE_GROUP)
    } else {
        Validation::Valid
    };
    Ok(turn.resolve(validation))
}

async fn fulfill(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    let Some(name) = turn.slots.get("Exercise").map(canonical_name) else {
        return Ok(turn.resolve(Validation::invalid(
            "Exercise",
            "What's the name of the exercise?",
        )));
    };
    let Some(muscle_group) = turn
        .slots
        .get("MuscleGroup")
        .and_then(|raw| raw.parse::<MuscleGroup>().ok())
    else {
        return Ok(turn.resolve(Validation::invalid("MuscleGroup", MUSCLE_GROUP)));
    };

    if engine
        .catalog()
        .exists(CatalogKind::Exercise, &name, &turn.user_id)
        .await?
    {
        return Ok(turn.finish(messages::catalog_exists(CatalogKind::Exercise, &name)));
    }

    let entry = CatalogEntry::exercise(
        &turn.user_id,
        &name,
        ExerciseDetails {
            muscle_group,
            how_to: None,
        },
    );
    if !engine.store.put_catalog_entry(&entry).await? {
        // A concurrent turn created it first.
        return Ok(turn.finish(messages::catalog_exists(CatalogKind::Exercise, &entry.name)));
    }
    tracing::info!(user_id = %turn.user_id, exercise = %entry.name, "Exercise created");

    Ok(turn.finish(messages::catalog_added(CatalogKind::Exercise, &entry.name)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::engine::testing::*;
    use crate::store::Store;

    #[tokio::test]
    async fn creates_a_private_exercise() {
        let mut harness = Harness::with_user().await;
        let directive = harness
            .fulfill("CreateExercise", json!({"Exercise": "Zercher Squat", "MuscleGroup": "legs"}))
            .await;
        assert_eq!(
            directive,
            Directive::fulfilled("Got it! zercher squat has been added to your exercises.")
        );
        let stored = harness
            .store
            .get_catalog_entry(CatalogKind::Exercise, USER, "zercher squat")
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn unknown_muscle_group_is_re_prompted() {
        let mut harness = Harness::with_user().await;
        match harness
            .dialog(
                "CreateExercise",
                "None",
                json!({"Exercise": "zercher squat", "MuscleGroup": "toes"}),
            )
            .await
        {
            Directive::RePrompt { slot_to_elicit, .. } => assert_eq!(slot_to_elicit, "MuscleGroup"),
            other => panic!("expected re-prompt, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn confirmed_existing_exercise_is_not_rewritten() {
        let mut harness = Harness::with_user().await;
        let directive = harness
            .dialog(
                "CreateExercise",
                "Confirmed",
                json!({"Exercise": "Squat", "MuscleGroup": null}),
            )
            .await;
        assert_eq!(
            directive,
            Directive::fulfilled(messages::catalog_exists(CatalogKind::Exercise, "squat"))
        );
        assert!(
            harness
                .store
                .get_catalog_entry(CatalogKind::Exercise, USER, "squat")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn losing_a_creation_race_keeps_the_first_entry() {
        let mut harness = Harness::with_user().await;
        let first = CatalogEntry::exercise(
            USER,
            "zercher squat",
            ExerciseDetails {
                muscle_group: MuscleGroup::Arms,
                how_to: None,
            },
        );
        assert!(harness.store.put_catalog_entry(&first).await.unwrap());
        harness.hide_catalog_reads();

        let directive = harness
            .fulfill("CreateExercise", json!({"Exercise": "zercher squat", "MuscleGroup": "legs"}))
            .await;
        assert_eq!(
            directive,
            Directive::fulfilled(messages::catalog_exists(CatalogKind::Exercise, "zercher squat"))
        );
        let stored = harness
            .store
            .get_catalog_entry(CatalogKind::Exercise, USER, "zercher squat")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.as_exercise().unwrap().muscle_group, MuscleGroup::Arms);
    }
}
