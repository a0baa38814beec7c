use chrono::NaiveDate;
use fitfriend_core::ledger::{
    DailyLedger, LedgerEntry, LedgerRecord, NutrientTotals, RUN_EXERCISE, ViolationKind,
    find_violations, format_violation_tags, owed_exercises,
};
use fitfriend_core::user::User;

use crate::clock::Calendar;
use crate::store::{Store, StoreError};

/// Result of making sure today's ledger exists.
#[derive(Debug)]
pub struct Rollover {
    pub ledger: DailyLedger,
    /// True only for the call that created today's ledger.
    pub rolled_over: bool,
    pub previous_day: Option<NaiveDate>,
    /// Exercises left unfinished on `previous_day`, rest markers excluded.
    /// Only populated when `rolled_over` is true.
    pub owed: Vec<String>,
}

impl Rollover {
    pub fn owes_excuse(&self) -> bool {
        self.rolled_over && !self.owed.is_empty()
    }
}

#[derive(Debug)]
pub struct AppendOutcome {
    pub remaining: NutrientTotals,
    pub new_violations: Vec<ViolationKind>,
}

pub struct LedgerManager<'a> {
    store: &'a dyn Store,
    calendar: &'a Calendar,
}

impl<'a> LedgerManager<'a> {
    pub fn new(store: &'a dyn Store, calendar: &'a Calendar) -> Self {
        Self { store, calendar }
    }

    pub fn today(&self) -> NaiveDate {
        self.calendar.today()
    }

    pub async fn get(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Option<DailyLedger>, StoreError> {
        self.store.get_ledger(user_id, day).await
    }

    /// Returns today's ledger, materializing it on the first call of the day.
    /// The previous ledger is found through `user.last_ledger_day`; when it
    /// still owes exercises it is flagged with a workout violation.
    pub async fn ensure_today(&self, user: &mut User) -> Result<Rollover, StoreError> {
        let today = self.today();
        if let Some(ledger) = self.store.get_ledger(&user.user_id, today).await? {
            return Ok(Rollover {
                ledger,
                rolled_over: false,
                previous_day: None,
                owed: Vec::new(),
            });
        }

        let fresh = DailyLedger::materialize(user, today);
        if !self.store.create_ledger(&fresh).await? {
            // Another turn for this user created it first.
            let ledger = self
                .store
                .get_ledger(&user.user_id, today)
                .await?
                .ok_or_else(|| {
                    StoreError::Unavailable(format!(
                        "ledger for {} on {today} missing after conflicting insert",
                        user.user_id
                    ))
                })?;
            return Ok(Rollover {
                ledger,
                rolled_over: false,
                previous_day: None,
                owed: Vec::new(),
            });
        }

        let previous_day = user.last_ledger_day.filter(|day| *day < today);
        let mut owed = Vec::new();
        if let Some(day) = previous_day {
            if let Some(mut previous) = self.store.get_ledger(&user.user_id, day).await? {
                owed = owed_exercises(&previous.exercises_remaining);
                if !owed.is_empty() && !previous.flag(&[ViolationKind::Workout]).is_empty() {
                    self.store.put_ledger(&previous).await?;
                }
            }
        }

        user.last_ledger_day = Some(today);
        self.store.put_user(user).await?;

        tracing::info!(
            user_id = %user.user_id,
            day = %today,
            previous_day = ?previous_day,
            owed = owed.len(),
            "Materialized daily ledger"
        );

        Ok(Rollover {
            ledger: fresh,
            rolled_over: true,
            previous_day,
            owed,
        })
    }

    /// Applies `record` to `ledger`, then writes the log entry followed by the
    /// updated snapshot.
    pub async fn append(
        &self,
        goals: &NutrientTotals,
        ledger: &mut DailyLedger,
        mut record: LedgerRecord,
    ) -> Result<AppendOutcome, StoreError> {
        let mut new_violations = Vec::new();
        match &mut record {
            LedgerRecord::Food(food) => {
                let remaining = ledger.consume(&food.nutrition);
                food.remaining_after = remaining;
                new_violations = ledger.flag(&find_violations(goals, &remaining));
            }
            LedgerRecord::Lift(lift) => {
                ledger.complete_exercise(&lift.exercise);
            }
            LedgerRecord::Run(_) => {
                ledger.complete_exercise(RUN_EXERCISE);
            }
            LedgerRecord::Excuse(excuse) => {
                ledger.flag(&excuse.violations);
            }
        }

        if !new_violations.is_empty() {
            tracing::info!(
                user_id = %ledger.user_id,
                day = %ledger.day,
                violations = %format_violation_tags(&new_violations),
                "Flagged nutrient violations"
            );
        }

        let entry = LedgerEntry::new(&ledger.user_id, ledger.day, self.calendar.now(), record);
        self.store.append_entry(&entry).await?;
        self.store.put_ledger(ledger).await?;

        Ok(AppendOutcome {
            remaining: ledger.nutrition_remaining,
            new_violations,
        })
    }

    /// Writes a log entry for a day that has no ledger snapshot.
    pub async fn append_detached(
        &self,
        user_id: &str,
        day: NaiveDate,
        record: LedgerRecord,
    ) -> Result<(), StoreError> {
        let entry = LedgerEntry::new(user_id, day, self.calendar.now(), record);
        self.store.append_entry(&entry).await
    }

    pub async fn entries(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        self.store.entries_for_day(user_id, day).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use fitfriend_core::catalog::MeasurementUnit;
    use fitfriend_core::ledger::{FoodLog, LiftLog};
    use fitfriend_core::user::{UnitSystem, WeeklySchedule};

    use super::*;
    use crate::clock::testing::FixedClock;
    use crate::store::MemoryStore;

    // Monday 2024-03-04, noon in New York.
    fn monday_noon() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 17, 0, 0).unwrap()
    }

    fn user() -> User {
        let mut schedule = WeeklySchedule::default();
        schedule.monday = vec!["squat".to_string(), "run".to_string()];
        schedule.tuesday = vec!["rest".to_string()];
        User {
            user_id: "u1".to_string(),
            name: "Sam".to_string(),
            unit_system: UnitSystem::Metric,
            metrics: None,
            goals: NutrientTotals {
                calorie: 2000,
                protein: 100,
                carbohydrate: 250,
                fat: 70,
            },
            schedule,
            last_ledger_day: None,
        }
    }

    fn fixture() -> (MemoryStore, Arc<FixedClock>, Calendar) {
        let clock = Arc::new(FixedClock::at(monday_noon()));
        let calendar = Calendar::new(chrono_tz::America::New_York, clock.clone());
        (MemoryStore::new(), clock, calendar)
    }

    #[tokio::test]
    async fn ensure_today_is_a_no_op_on_second_call() {
        let (store, _clock, calendar) = fixture();
        let ledgers = LedgerManager::new(&store, &calendar);
        let mut user = user();

        let first = ledgers.ensure_today(&mut user).await.unwrap();
        assert!(first.rolled_over);
        assert_eq!(first.ledger.exercises_remaining, vec!["squat", "run"]);
        assert_eq!(first.ledger.nutrition_remaining, user.goals);

        let second = ledgers.ensure_today(&mut user).await.unwrap();
        assert!(!second.rolled_over);
        assert!(!second.owes_excuse());
        assert_eq!(second.ledger, first.ledger);
    }

    #[tokio::test]
    async fn rollover_reports_unfinished_exercises_once() {
        let (store, clock, calendar) = fixture();
        let ledgers = LedgerManager::new(&store, &calendar);
        let mut user = user();
        ledgers.ensure_today(&mut user).await.unwrap();

        clock.advance(Duration::days(1));
        let rollover = ledgers.ensure_today(&mut user).await.unwrap();
        assert!(rollover.owes_excuse());
        assert_eq!(rollover.owed, vec!["squat", "run"]);
        assert_eq!(rollover.previous_day, NaiveDate::from_ymd_opt(2024, 3, 4));
        assert_eq!(rollover.ledger.exercises_remaining, vec!["rest"]);

        let monday = store
            .get_ledger("u1", NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(monday.violations, vec![ViolationKind::Workout]);

        let again = ledgers.ensure_today(&mut user).await.unwrap();
        assert!(!again.owes_excuse());
    }

    #[tokio::test]
    async fn rest_day_owes_nothing_on_rollover() {
        let (store, clock, calendar) = fixture();
        let ledgers = LedgerManager::new(&store, &calendar);
        let mut user = user();

        clock.advance(Duration::days(1));
        ledgers.ensure_today(&mut user).await.unwrap();
        clock.advance(Duration::days(1));
        let wednesday = ledgers.ensure_today(&mut user).await.unwrap();
        assert!(wednesday.rolled_over);
        assert!(wednesday.owed.is_empty());
        assert!(!wednesday.owes_excuse());
    }

    #[tokio::test]
    async fn food_append_flags_only_new_violations() {
        let (store, _clock, calendar) = fixture();
        let ledgers = LedgerManager::new(&store, &calendar);
        let mut user = user();
        let mut ledger = ledgers.ensure_today(&mut user).await.unwrap().ledger;

        let meal = |calorie: i64| {
            LedgerRecord::Food(FoodLog {
                food_name: "pizza".to_string(),
                measurement: 1.0,
                unit: MeasurementUnit::Servings,
                nutrition: NutrientTotals {
                    calorie,
                    ..NutrientTotals::default()
                },
                remaining_after: NutrientTotals::default(),
            })
        };

        let first = ledgers.append(&user.goals, &mut ledger, meal(2001)).await.unwrap();
        assert_eq!(first.remaining.calorie, -1);
        assert_eq!(first.new_violations, vec![ViolationKind::Calorie]);

        let second = ledgers.append(&user.goals, &mut ledger, meal(10)).await.unwrap();
        assert!(second.new_violations.is_empty());

        let stored = store.get_ledger("u1", ledger.day).await.unwrap().unwrap();
        assert_eq!(stored.nutrition_remaining.calorie, -11);
        let entries = store.entries_for_day("u1", ledger.day).await.unwrap();
        assert_eq!(entries.len(), 2);
        match &entries[0].record {
            LedgerRecord::Food(food) => assert_eq!(food.remaining_after.calorie, -1),
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[tokio::test]
    async fn lift_append_removes_the_exercise() {
        let (store, _clock, calendar) = fixture();
        let ledgers = LedgerManager::new(&store, &calendar);
        let mut user = user();
        let mut ledger = ledgers.ensure_today(&mut user).await.unwrap().ledger;

        ledgers
            .append(
                &user.goals,
                &mut ledger,
                LedgerRecord::Lift(LiftLog {
                    exercise: "Squat".to_string(),
                    weight: 100.0,
                    reps: 5,
                    sets: 5,
                }),
            )
            .await
            .unwrap();
        assert_eq!(ledger.exercises_remaining, vec!["run"]);
        let stored = store.get_ledger("u1", ledger.day).await.unwrap().unwrap();
        assert_eq!(stored.exercises_remaining, vec!["run"]);
    }
}
