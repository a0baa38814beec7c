use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ledger::NutrientTotals;
use crate::targets::BodyMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    Imperial,
    Metric,
}

impl UnitSystem {
    /// Accepts the spoken form ("imperial system") as well as the bare word.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "imperial system" | "imperial" => Some(Self::Imperial),
            "metric system" | "metric" => Some(Self::Metric),
            _ => None,
        }
    }

    pub const fn weight_unit(self) -> &'static str {
        match self {
            Self::Imperial => "lbs",
            Self::Metric => "kgs",
        }
    }
}

/// Ordered exercise names per weekday. A day may hold the single entry
/// `rest`; an empty day owes nothing either.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WeeklySchedule {
    #[serde(default)]
    pub monday: Vec<String>,
    #[serde(default)]
    pub tuesday: Vec<String>,
    #[serde(default)]
    pub wednesday: Vec<String>,
    #[serde(default)]
    pub thursday: Vec<String>,
    #[serde(default)]
    pub friday: Vec<String>,
    #[serde(default)]
    pub saturday: Vec<String>,
    #[serde(default)]
    pub sunday: Vec<String>,
}

impl WeeklySchedule {
    pub const WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn for_weekday(&self, weekday: Weekday) -> &[String] {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn set_weekday(&mut self, weekday: Weekday, exercises: Vec<String>) {
        let slot = match weekday {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        };
        *slot = exercises;
    }
}

/// Capitalized weekday name, which is also the platform's slot name for it.
pub const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Standing attributes of a user. Created by onboarding, never deleted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub unit_system: UnitSystem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<BodyMetrics>,
    pub goals: NutrientTotals,
    #[serde(default)]
    pub schedule: WeeklySchedule,
    /// Most recent day a ledger was materialized for; read on rollover to
    /// find the previous ledger without scanning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ledger_day: Option<NaiveDate>,
}
