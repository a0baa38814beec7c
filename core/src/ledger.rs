use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::catalog::{MeasurementUnit, canonical_name};
use crate::user::User;

/// Schedule entry meaning "nothing owed today". Never counts as unfinished.
pub const REST_DAY: &str = "rest";

/// Exercise name a logged run completes. Needs no catalog entry.
pub const RUN_EXERCISE: &str = "run";

pub fn is_rest(name: &str) -> bool {
    canonical_name(name) == REST_DAY
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Calorie,
    Protein,
    Carbohydrate,
    Fat,
}

impl Nutrient {
    pub const ALL: [Nutrient; 4] = [
        Nutrient::Calorie,
        Nutrient::Protein,
        Nutrient::Carbohydrate,
        Nutrient::Fat,
    ];
}

/// Four signed counters. Used for goals, consumed nutrition and the
/// remaining budget alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NutrientTotals {
    pub calorie: i64,
    pub protein: i64,
    pub carbohydrate: i64,
    pub fat: i64,
}

impl NutrientTotals {
    pub fn get(&self, nutrient: Nutrient) -> i64 {
        match nutrient {
            Nutrient::Calorie => self.calorie,
            Nutrient::Protein => self.protein,
            Nutrient::Carbohydrate => self.carbohydrate,
            Nutrient::Fat => self.fat,
        }
    }

    /// Saturates instead of overflowing on absurd portions.
    pub fn minus(&self, other: &NutrientTotals) -> NutrientTotals {
        NutrientTotals {
            calorie: self.calorie.saturating_sub(other.calorie),
            protein: self.protein.saturating_sub(other.protein),
            carbohydrate: self.carbohydrate.saturating_sub(other.carbohydrate),
            fat: self.fat.saturating_sub(other.fat),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Calorie,
    Protein,
    Carbohydrate,
    Fat,
    Workout,
}

impl ViolationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calorie => "calorie",
            Self::Protein => "protein",
            Self::Carbohydrate => "carbohydrate",
            Self::Fat => "fat",
            Self::Workout => "workout",
        }
    }

    pub const fn from_nutrient(nutrient: Nutrient) -> Self {
        match nutrient {
            Nutrient::Calorie => Self::Calorie,
            Nutrient::Protein => Self::Protein,
            Nutrient::Carbohydrate => Self::Carbohydrate,
            Nutrient::Fat => Self::Fat,
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViolationKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "calorie" | "calories" => Ok(Self::Calorie),
            "protein" => Ok(Self::Protein),
            "carbohydrate" | "carbohydrates" | "carbs" => Ok(Self::Carbohydrate),
            "fat" => Ok(Self::Fat),
            "workout" => Ok(Self::Workout),
            _ => Err(()),
        }
    }
}

/// Reads violation tags out of free text such as the `Violation` slot
/// ("calorie protein", "workout"). Unknown words are skipped, duplicates
/// collapse, order of first appearance is kept.
pub fn parse_violation_tags(raw: &str) -> Vec<ViolationKind> {
    let mut tags = Vec::new();
    for word in raw.split(|c: char| c.is_whitespace() || c == ',') {
        if let Ok(kind) = word.parse::<ViolationKind>() {
            if !tags.contains(&kind) {
                tags.push(kind);
            }
        }
    }
    tags
}

pub fn format_violation_tags(tags: &[ViolationKind]) -> String {
    tags.iter()
        .map(|tag| tag.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdRule {
    /// Any overspend is a violation.
    BelowZero,
    /// Overspend is tolerated up to this percentage of the goal.
    OverageTolerance { percent: i64 },
}

impl ThresholdRule {
    pub fn is_violated(self, remaining: i64, goal: i64) -> bool {
        match self {
            Self::BelowZero => remaining < 0,
            Self::OverageTolerance { percent } => {
                remaining < (goal.saturating_mul(percent) / 100).saturating_neg()
            }
        }
    }
}

pub const NUTRIENT_THRESHOLDS: [(Nutrient, ThresholdRule); 4] = [
    (Nutrient::Calorie, ThresholdRule::BelowZero),
    (Nutrient::Protein, ThresholdRule::OverageTolerance { percent: 10 }),
    (Nutrient::Carbohydrate, ThresholdRule::OverageTolerance { percent: 10 }),
    (Nutrient::Fat, ThresholdRule::OverageTolerance { percent: 10 }),
];

/// Nutrient violations implied by a remaining-budget snapshot, in table order.
pub fn find_violations(goals: &NutrientTotals, remaining: &NutrientTotals) -> Vec<ViolationKind> {
    NUTRIENT_THRESHOLDS
        .iter()
        .filter(|(nutrient, rule)| rule.is_violated(remaining.get(*nutrient), goals.get(*nutrient)))
        .map(|(nutrient, _)| ViolationKind::from_nutrient(*nutrient))
        .collect()
}

/// Exercises left unfinished on a ledger, with rest-day markers dropped.
pub fn owed_exercises(exercises_remaining: &[String]) -> Vec<String> {
    exercises_remaining
        .iter()
        .filter(|name| !is_rest(name))
        .cloned()
        .collect()
}

/// Remaining-budget snapshot for one user on one calendar day. Logged
/// activity lives in [`LedgerEntry`] records keyed by the same pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyLedger {
    pub user_id: String,
    pub day: NaiveDate,
    pub nutrition_remaining: NutrientTotals,
    pub exercises_remaining: Vec<String>,
    #[serde(default)]
    pub violations: Vec<ViolationKind>,
}

impl DailyLedger {
    /// Fresh ledger from the user's standing goals and that weekday's schedule.
    pub fn materialize(user: &User, day: NaiveDate) -> Self {
        Self {
            user_id: user.user_id.clone(),
            day,
            nutrition_remaining: user.goals,
            exercises_remaining: user.schedule.for_weekday(day.weekday()).to_vec(),
            violations: Vec::new(),
        }
    }

    /// Subtracts consumed nutrition and returns the new remaining snapshot.
    pub fn consume(&mut self, nutrition: &NutrientTotals) -> NutrientTotals {
        self.nutrition_remaining = self.nutrition_remaining.minus(nutrition);
        self.nutrition_remaining
    }

    /// Removes the first matching exercise. Returns false when it was not owed.
    pub fn complete_exercise(&mut self, name: &str) -> bool {
        let wanted = canonical_name(name);
        match self
            .exercises_remaining
            .iter()
            .position(|owed| canonical_name(owed) == wanted)
        {
            Some(index) => {
                self.exercises_remaining.remove(index);
                true
            }
            None => false,
        }
    }

    /// Adds violations not yet present and returns only the newly added ones.
    pub fn flag(&mut self, kinds: &[ViolationKind]) -> Vec<ViolationKind> {
        let mut added = Vec::new();
        for kind in kinds {
            if !self.violations.contains(kind) {
                self.violations.push(*kind);
                added.push(*kind);
            }
        }
        added
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FoodLog {
    pub food_name: String,
    pub measurement: f64,
    pub unit: MeasurementUnit,
    pub nutrition: NutrientTotals,
    pub remaining_after: NutrientTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LiftLog {
    pub exercise: String,
    pub weight: f64,
    pub reps: u32,
    pub sets: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RunLog {
    pub distance: f64,
    /// Duration as reported by the platform (e.g. "PT30M").
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incline: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExcuseLog {
    pub excuse: String,
    pub violations: Vec<ViolationKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerRecord {
    Food(FoodLog),
    Lift(LiftLog),
    Run(RunLog),
    Excuse(ExcuseLog),
}

impl LedgerRecord {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Food(_) => "food",
            Self::Lift(_) => "lift",
            Self::Run(_) => "run",
            Self::Excuse(_) => "excuse",
        }
    }
}

/// Append-only log record for a (user, day), keyed by when it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: String,
    pub day: NaiveDate,
    pub recorded_at: DateTime<Utc>,
    pub record: LedgerRecord,
}

impl LedgerEntry {
    pub fn new(
        user_id: &str,
        day: NaiveDate,
        recorded_at: DateTime<Utc>,
        record: LedgerRecord,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            day,
            recorded_at,
            record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goals() -> NutrientTotals {
        NutrientTotals {
            calorie: 2000,
            protein: 100,
            carbohydrate: 250,
            fat: 70,
        }
    }

    fn ledger(exercises: &[&str]) -> DailyLedger {
        DailyLedger {
            user_id: "u1".to_string(),
            day: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            nutrition_remaining: goals(),
            exercises_remaining: exercises.iter().map(|s| s.to_string()).collect(),
            violations: Vec::new(),
        }
    }

    #[test]
    fn calorie_overspend_of_one_is_a_violation() {
        let remaining = NutrientTotals {
            calorie: -1,
            ..goals()
        };
        assert_eq!(find_violations(&goals(), &remaining), vec![ViolationKind::Calorie]);
    }

    #[test]
    fn macro_overspend_within_ten_percent_is_tolerated() {
        let nine_over = NutrientTotals {
            protein: -9,
            ..goals()
        };
        assert!(find_violations(&goals(), &nine_over).is_empty());

        let ten_over = NutrientTotals {
            protein: -10,
            ..goals()
        };
        assert!(find_violations(&goals(), &ten_over).is_empty());

        let eleven_over = NutrientTotals {
            protein: -11,
            ..goals()
        };
        assert_eq!(find_violations(&goals(), &eleven_over), vec![ViolationKind::Protein]);
    }

    #[test]
    fn violations_are_reported_in_table_order() {
        let remaining = NutrientTotals {
            calorie: -300,
            protein: 10,
            carbohydrate: -40,
            fat: -8,
        };
        assert_eq!(
            find_violations(&goals(), &remaining),
            vec![ViolationKind::Calorie, ViolationKind::Carbohydrate, ViolationKind::Fat]
        );
    }

    #[test]
    fn flag_only_returns_new_violations() {
        let mut day = ledger(&[]);
        assert_eq!(day.flag(&[ViolationKind::Calorie]), vec![ViolationKind::Calorie]);
        assert_eq!(
            day.flag(&[ViolationKind::Calorie, ViolationKind::Fat]),
            vec![ViolationKind::Fat]
        );
        assert_eq!(day.violations, vec![ViolationKind::Calorie, ViolationKind::Fat]);
    }

    #[test]
    fn complete_exercise_removes_first_match_only() {
        let mut day = ledger(&["squat", "run", "squat"]);
        assert!(day.complete_exercise("Squat"));
        assert_eq!(day.exercises_remaining, vec!["run".to_string(), "squat".to_string()]);
        assert!(!day.complete_exercise("deadlift"));
        assert_eq!(day.exercises_remaining.len(), 2);
    }

    #[test]
    fn consume_goes_negative_without_clamping() {
        let mut day = ledger(&[]);
        let after = day.consume(&NutrientTotals {
            calorie: 2100,
            protein: 20,
            carbohydrate: 0,
            fat: 5,
        });
        assert_eq!(after.calorie, -100);
        assert_eq!(after.protein, 80);
        assert_eq!(day.nutrition_remaining, after);
    }

    #[test]
    fn huge_portions_saturate_instead_of_overflowing() {
        let mut day = ledger(&[]);
        let huge = NutrientTotals {
            calorie: i64::MAX,
            protein: i64::MAX,
            carbohydrate: i64::MAX,
            fat: i64::MAX,
        };
        day.consume(&huge);
        let after = day.consume(&huge);
        assert_eq!(after.calorie, i64::MIN);
        assert_eq!(
            find_violations(&goals(), &after),
            vec![
                ViolationKind::Calorie,
                ViolationKind::Protein,
                ViolationKind::Carbohydrate,
                ViolationKind::Fat,
            ]
        );
    }

    #[test]
    fn huge_goals_do_not_overflow_the_tolerance() {
        let rule = ThresholdRule::OverageTolerance { percent: 10 };
        assert!(!rule.is_violated(-1, i64::MAX));
        assert!(rule.is_violated(i64::MIN, i64::MAX));
    }

    #[test]
    fn rest_days_are_never_owed() {
        assert!(owed_exercises(&["rest".to_string()]).is_empty());
        assert_eq!(
            owed_exercises(&["squat".to_string(), "run".to_string()]),
            vec!["squat".to_string(), "run".to_string()]
        );
    }

    #[test]
    fn violation_tags_parse_from_slot_text() {
        assert_eq!(
            parse_violation_tags("calorie protein calorie nonsense"),
            vec![ViolationKind::Calorie, ViolationKind::Protein]
        );
        assert_eq!(parse_violation_tags("workout"), vec![ViolationKind::Workout]);
        assert_eq!(
            format_violation_tags(&[ViolationKind::Calorie, ViolationKind::Fat]),
            "calorie fat"
        );
    }
}
