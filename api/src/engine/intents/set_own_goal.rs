use fitfriend_core::dialog::{ConfirmationStatus, Directive, InvocationPhase, Slots};
use fitfriend_core::ledger::NutrientTotals;

use super::parse;
use crate::engine::continuation::Validation;
use crate::engine::{Engine, Turn};
use crate::store::StoreError;

const GOAL_SLOTS: [(&str, &str); 4] = [
    ("CalorieGoal", "calorie"),
    ("ProteinGoal", "protein"),
    ("CarbohydrateGoal", "carbohydrate"),
    ("FatGoal", "fat"),
];

pub async fn handle(engine: &Engine<'_>, turn: &mut Turn) -> Result<Directive, StoreError> {
    let Some(mut user) = engine.store.get_user(&turn.user_id).await? else {
        return Ok(turn.onboarding());
    };

    match turn.phase {
        InvocationPhase::PreCommit => {
            if turn.confirmation == ConfirmationStatus::Denied {
                return Ok(turn.cancel());
            }
            let validation = match read_goals(&turn.slots, false) {
                Ok(_) => Validation::Valid,
                Err(invalid) => invalid,
            };
            Ok(turn.resolve(validation))
        }
        InvocationPhase::PostCommit => {
            let goals = match read_goals(&turn.slots, true) {
                Ok(goals) => goals,
                Err(invalid) => return Ok(turn.resolve(invalid)),
            };
            user.goals = goals;
            engine.store.put_user(&user).await?;
            tracing::info!(user_id = %user.user_id, "Nutrition goals replaced");

            Ok(turn.finish(format!(
                "Okay, your calorie goal has been set to {}, your protein goal has been set to {}, \
                 your carbohydrate goal has been set to {}, and your fat goal has been set to {}",
                goals.calorie, goals.protein, goals.carbohydrate, goals.fat
            )))
        }
    }
}

/// Parses the four goal slots. Unless `require_all`, empty slots read as zero
/// and are left for the platform to elicit.
fn read_goals(slots: &Slots, require_all: bool) -> Result<NutrientTotals, Validation> {
    let mut values = [0_i64; 4];
    for (value, (slot, noun)) in values.iter_mut().zip(GOAL_SLOTS) {
        match slots.get(slot) {
            Some(raw) => {
                *value = parse::non_negative_integer(raw).ok_or_else(|| {
                    Validation::invalid(
                        slot,
                        format!("Sorry, your {noun} goal needs to be a whole number."),
                    )
                })?;
            }
            None if require_all => {
                return Err(Validation::invalid(
                    slot,
                    format!("What should your daily {noun} goal be?"),
                ));
            }
            None => {}
        }
    }
    let [calorie, protein, carbohydrate, fat] = values;
    Ok(NutrientTotals {
        calorie,
        protein,
        carbohydrate,
        fat,
    })
}
