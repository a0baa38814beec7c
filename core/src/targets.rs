//! Standing nutrient targets derived from body metrics (Mifflin-St Jeor).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ledger::NutrientTotals;
use crate::user::UnitSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    GainMass,
    LoseWeight,
    MaintainWeight,
}

impl FitnessGoal {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "gain mass" => Some(Self::GainMass),
            "lose weight" => Some(Self::LoseWeight),
            "maintain weight" => Some(Self::MaintainWeight),
            _ => None,
        }
    }
}

/// Height and weight are in the user's unit system: inches/pounds or
/// centimetres/kilograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BodyMetrics {
    pub gender: Gender,
    pub age: f64,
    pub height: f64,
    pub weight: f64,
    pub unit_system: UnitSystem,
    pub goal: FitnessGoal,
}

/// Percent of calories per macro and kcal per gram.
const PROTEIN_SPLIT: (i64, i64) = (30, 4);
const CARBOHYDRATE_SPLIT: (i64, i64) = (40, 4);
const FAT_SPLIT: (i64, i64) = (30, 9);

fn grams_for(calorie: i64, (percent, kcal_per_gram): (i64, i64)) -> i64 {
    calorie.saturating_mul(percent) / (100 * kcal_per_gram)
}

impl BodyMetrics {
    fn resting_metabolic_rate(&self) -> i64 {
        let (weight_kg, height_cm) = match self.unit_system {
            UnitSystem::Imperial => (self.weight / 2.2, self.height * 2.54),
            UnitSystem::Metric => (self.weight, self.height),
        };
        let offset = match self.gender {
            Gender::Male => 5.0,
            Gender::Female => -161.0,
        };
        (10.0 * weight_kg + 6.25 * height_cm - 5.0 * self.age + offset) as i64
    }

    pub fn calorie_target(&self) -> i64 {
        let rmr = self.resting_metabolic_rate();
        match self.goal {
            FitnessGoal::GainMass => (rmr.saturating_mul(6) / 5).saturating_add(300),
            FitnessGoal::LoseWeight => rmr.saturating_mul(24) / 25,
            FitnessGoal::MaintainWeight => rmr.saturating_mul(6) / 5,
        }
    }

    /// Calorie target plus a 30/40/30 protein/carbohydrate/fat split.
    pub fn default_goals(&self) -> NutrientTotals {
        let calorie = self.calorie_target();
        NutrientTotals {
            calorie,
            protein: grams_for(calorie, PROTEIN_SPLIT),
            carbohydrate: grams_for(calorie, CARBOHYDRATE_SPLIT),
            fat: grams_for(calorie, FAT_SPLIT),
        }
    }
}
