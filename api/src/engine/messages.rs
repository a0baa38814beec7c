//! User-facing copy. Kept in one place so handlers read as control flow.

use fitfriend_core::catalog::CatalogKind;
use fitfriend_core::dialog::IntentName;
use fitfriend_core::ledger::{ViolationKind, is_rest, owed_exercises};

pub const ONBOARDING: &str = "Glad to see you're so eager! Say 'hey fitfriend' to get started!";
pub const CANCELLED: &str = "It's all good in the hood!";
pub const EXCUSE_RECORDED: &str = "Try not to do it again!";
pub const MEAL_RECORDED: &str = "Sounds yummy! :)";
pub const SCHEDULE_UPDATED: &str = "Okay, your workout schedule has been updated!";
pub const NO_SUCH_DAY: &str = "I don't have any records for that day. Try some other day";
pub const MEASUREMENT_TYPE: &str = "Sorry, was that in servings or grams?";
pub const NOTHING_YET: &str = "Nothing yet!";

pub const HELP: &str = "\
    If you want to record an exercise, say 'I did #EXERCISE for #WEIGHT weight #REPS \
    reps and #SETS sets.' If you want to record a run, say 'I ran #DISTANCE in \
    #DURATION.' (incline is optional). If you want to record a meal, say 'I ate #NUM \
    #GRAMS OR SERVINGS of #FOOD.' If you want to remember what you did on a certain \
    day, say 'tell me about #DAY.' If you want to learn an exercise, say 'How do I \
    do #EXERCISE?' If you want to set your own nutrition goals, say 'I would like to \
    set my own nutrition goals.' If you want to set your own workout, say 'I would \
    like to set my own workout.'";

/// "a", "a and b", "a, b, and c".
pub fn join_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

pub fn not_recognized(kind: CatalogKind, name: &str) -> String {
    format!(
        "{name} is not recognized as one of your {}. Would you like to add it?",
        kind.plural()
    )
}

pub fn catalog_added(kind: CatalogKind, name: &str) -> String {
    format!("Got it! {name} has been added to your {}.", kind.plural())
}

pub fn catalog_exists(kind: CatalogKind, name: &str) -> String {
    format!("{name} is already one of your {}.", kind.plural())
}

/// Follow-up question when a suspended goal is handed back to the user.
pub fn resume_prompt(intent: IntentName) -> &'static str {
    match intent {
        IntentName::RecordWeightlift => "Would you like to finish inputting your lift?",
        IntentName::RecordRun => "Would you like to finish inputting your run?",
        IntentName::RecordMeal => "Would you like to finish inputting your meal?",
        IntentName::CreateWorkout => "Would you like to finish inputting your workout?",
        IntentName::GiveExcuse => "Do you also have an excuse for going over your limits today?",
        _ => "Would you like to pick up where we left off?",
    }
}

pub fn owed_workout(owed: &[String]) -> String {
    format!(
        "Do you have a valid excuse for why you didn't finish your workout yesterday? \
         You had {} left.",
        join_list(owed)
    )
}

/// Warning shown before a meal is committed; empty when nothing would be violated.
pub fn violation_warning(violations: &[ViolationKind]) -> Option<String> {
    let phrases: Vec<String> = violations
        .iter()
        .map(|violation| match violation {
            ViolationKind::Calorie | ViolationKind::Workout => format!("your {violation} limit"),
            _ => format!("10% of your {violation} limit"),
        })
        .collect();
    if phrases.is_empty() {
        return None;
    }
    Some(format!("You're going over {}!", join_list(&phrases)))
}

pub fn nutrient_excuse(violations: &[ViolationKind]) -> String {
    let warning = violation_warning(violations).unwrap_or_default();
    format!("{warning} Do you have a valid excuse for why you went over your limits?")
}

/// Progress line after an exercise is logged, from today's remaining list.
pub fn workout_progress(exercises_remaining: &[String]) -> String {
    let owed = owed_exercises(exercises_remaining);
    if !owed.is_empty() {
        return format!("You still have to do {} today.", join_list(&owed));
    }
    if exercises_remaining.iter().any(|name| is_rest(name)) {
        "Today's a rest day, but I'm so happy to see you working out nonetheless!".to_string()
    } else {
        "Congratulations! You finished all your required workouts for today :)".to_string()
    }
}

pub fn how_to(exercise: &str, reference: &str) -> String {
    format!("Here's how to do {exercise}: {reference}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn lists_read_naturally() {
        assert_eq!(join_list(&names(&["squat"])), "squat");
        assert_eq!(join_list(&names(&["squat", "run"])), "squat and run");
        assert_eq!(
            join_list(&names(&["squat", "run", "deadlift"])),
            "squat, run, and deadlift"
        );
    }

    #[test]
    fn progress_distinguishes_rest_day_from_done() {
        assert_eq!(
            workout_progress(&names(&["squat", "run"])),
            "You still have to do squat and run today."
        );
        assert!(workout_progress(&names(&["rest"])).starts_with("Today's a rest day"));
        assert!(workout_progress(&[]).starts_with("Congratulations!"));
    }

    #[test]
    fn warnings_name_each_violation() {
        assert_eq!(violation_warning(&[]), None);
        assert_eq!(
            violation_warning(&[ViolationKind::Calorie, ViolationKind::Fat]).unwrap(),
            "You're going over your calorie limit and 10% of your fat limit!"
        );
    }
}
