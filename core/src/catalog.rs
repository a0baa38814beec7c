use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ledger::NutrientTotals;

/// Owner key of the shared catalog every user can see.
pub const UNIVERSAL_OWNER: &str = "universal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Exercise,
    Food,
}

impl CatalogKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exercise => "exercise",
            Self::Food => "food",
        }
    }

    /// Plural noun used in prompts ("your exercises", "your foods").
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Exercise => "exercises",
            Self::Food => "foods",
        }
    }
}

/// Lookup and storage form of a catalog name: trimmed, lower-cased, inner
/// whitespace collapsed. Creation and lookup both go through this.
pub fn canonical_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Arms,
    Back,
    Chest,
    Core,
    Shoulder,
    Legs,
}

impl FromStr for MuscleGroup {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "arms" => Ok(Self::Arms),
            "back" => Ok(Self::Back),
            "chest" => Ok(Self::Chest),
            "core" => Ok(Self::Core),
            "shoulder" => Ok(Self::Shoulder),
            "legs" => Ok(Self::Legs),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExerciseDetails {
    pub muscle_group: MuscleGroup,
    /// Link to an instructional video; only the universal catalog has these.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how_to: Option<String>,
}

/// Per-serving nutrition of a food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FoodDetails {
    pub serving_grams: f64,
    pub calorie: f64,
    pub protein: f64,
    pub carbohydrate: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementUnit {
    Grams,
    Servings,
}

impl MeasurementUnit {
    /// Condenses the spoken unit ("g", "gram", "serving", ...) to a unit.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "grams" | "gram" | "g" => Some(Self::Grams),
            "servings" | "serving" => Some(Self::Servings),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grams => "grams",
            Self::Servings => "servings",
        }
    }
}

impl FoodDetails {
    /// Nutrition consumed for `amount` of `unit`, truncated to whole units.
    /// Float-to-int casts saturate, so absurd amounts clamp at the range ends.
    pub fn nutrition_for(&self, amount: f64, unit: MeasurementUnit) -> NutrientTotals {
        let servings = match unit {
            MeasurementUnit::Servings => amount,
            MeasurementUnit::Grams if self.serving_grams > 0.0 => amount / self.serving_grams,
            MeasurementUnit::Grams => 0.0,
        };
        NutrientTotals {
            calorie: (servings * self.calorie) as i64,
            protein: (servings * self.protein) as i64,
            carbohydrate: (servings * self.carbohydrate) as i64,
            fat: (servings * self.fat) as i64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogDetails {
    Exercise(ExerciseDetails),
    Food(FoodDetails),
}

/// A catalog record keyed by (owner, kind, canonical name). Immutable once
/// written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogEntry {
    pub owner: String,
    pub name: String,
    pub details: CatalogDetails,
}

impl CatalogEntry {
    pub fn exercise(owner: &str, name: &str, details: ExerciseDetails) -> Self {
        Self {
            owner: owner.to_string(),
            name: canonical_name(name),
            details: CatalogDetails::Exercise(details),
        }
    }

    pub fn food(owner: &str, name: &str, details: FoodDetails) -> Self {
        Self {
            owner: owner.to_string(),
            name: canonical_name(name),
            details: CatalogDetails::Food(details),
        }
    }

    pub fn kind(&self) -> CatalogKind {
        match self.details {
            CatalogDetails::Exercise(_) => CatalogKind::Exercise,
            CatalogDetails::Food(_) => CatalogKind::Food,
        }
    }

    pub fn as_food(&self) -> Option<&FoodDetails> {
        match &self.details {
            CatalogDetails::Food(food) => Some(food),
            CatalogDetails::Exercise(_) => None,
        }
    }

    pub fn as_exercise(&self) -> Option<&ExerciseDetails> {
        match &self.details {
            CatalogDetails::Exercise(exercise) => Some(exercise),
            CatalogDetails::Food(_) => None,
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const UNIVERSAL_EXERCISES: &[(&str, MuscleGroup, &str)] = &[
    ("overhead press", MuscleGroup::Shoulder, "https://www.youtube.com/watch?v=F3QY5vMz_6I"),
    ("fly", MuscleGroup::Chest, "https://www.youtube.com/watch?v=eozdVDA78K0"),
    ("bent over row", MuscleGroup::Back, "https://www.youtube.com/watch?v=9efgcAjQe7E"),
    ("shoulder press", MuscleGroup::Shoulder, "https://www.youtube.com/watch?v=qEwKCR5JCog"),
    ("squat", MuscleGroup::Legs, "https://www.youtube.com/watch?v=Dy28eq2PjcM"),
    ("pull up", MuscleGroup::Back, "https://www.youtube.com/watch?v=Ir8IrbYcM8w"),
    ("deadlift", MuscleGroup::Back, "https://www.youtube.com/watch?v=-4qRntuXBSc"),
    ("skull crusher", MuscleGroup::Arms, "https://www.youtube.com/watch?v=d_KZxkY_0cM"),
    ("leg press", MuscleGroup::Legs, "https://www.youtube.com/watch?v=W1SD96lrudY"),
    ("bench press", MuscleGroup::Chest, "https://www.youtube.com/watch?v=gRVjAtPip0Y"),
    ("step up", MuscleGroup::Legs, "https://www.youtube.com/watch?v=dQqApCGd5Ss"),
    ("biceps curl", MuscleGroup::Arms, "https://www.youtube.com/watch?v=ykJmrZ5v0Oo"),
    ("triceps extension", MuscleGroup::Arms, "https://www.youtube.com/watch?v=YbX7Wd8jQ-Q"),
];

/// Standard lifts seeded into the universal catalog at start-up.
pub fn universal_exercises() -> Vec<CatalogEntry> {
    UNIVERSAL_EXERCISES
        .iter()
        .map(|(name, muscle_group, how_to)| {
            CatalogEntry::exercise(
                UNIVERSAL_OWNER,
                name,
                ExerciseDetails {
                    muscle_group: *muscle_group,
                    how_to: Some((*how_to).to_string()),
                },
            )
        })
        .collect()
}
