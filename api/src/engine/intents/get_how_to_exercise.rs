use fitfriend_core::catalog::{CatalogKind, canonical_name};
use fitfriend_core::dialog::{Directive, InvocationPhase};

use crate::engine::continuation::Validation;
use crate::engine::messages;
use crate::engine::{Engine, Turn};
use crate::store::StoreError;

pub async fn handle(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    let Some(name) = turn.slots.get("Exercise").map(canonical_name) else {
        return Ok(match turn.phase {
            InvocationPhase::PreCommit => turn.resolve(Validation::Valid),
            InvocationPhase::PostCommit => turn.resolve(Validation::invalid(
                "Exercise",
                "Which exercise would you like to learn?",
            )),
        });
    };

    let entry = engine
        .catalog()
        .lookup(CatalogKind::Exercise, &name, &turn.user_id)
        .await?;
    let Some(exercise) = entry.as_ref().and_then(|entry| entry.as_exercise()) else {
        return Ok(turn.resolve(Validation::invalid(
            "Exercise",
            format!("Sorry, I don't know {name}. Which exercise would you like to learn?"),
        )));
    };

    match turn.phase {
        InvocationPhase::PreCommit => Ok(turn.resolve(Validation::Valid)),
        InvocationPhase::PostCommit => Ok(turn.finish(match &exercise.how_to {
            Some(reference) => messages::how_to(&name, reference),
            None => format!("Sorry, I don't have a guide for {name} yet."),
        })),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::engine::testing::*;

    #[tokio::test]
    async fn universal_exercise_has_a_video() {
        let mut harness = Harness::new().await;
        let directive = harness
            .fulfill("GetHowToExercise", json!({"Exercise": "Bench Press"}))
            .await;
        assert_eq!(
            directive,
            Directive::fulfilled(
                "Here's how to do bench press: https://www.youtube.com/watch?v=gRVjAtPip0Y"
            )
        );
    }

    #[tokio::test]
    async fn unknown_exercise_is_re_prompted() {
        let mut harness = Harness::new().await;
        let directive = harness
            .dialog("GetHowToExercise", "None", json!({"Exercise": "moonwalk"}))
            .await;
        assert!(matches!(directive, Directive::RePrompt { .. }));
    }
}
