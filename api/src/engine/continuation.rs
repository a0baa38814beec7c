//! Continuation controller: suspends a goal behind the dependency it is
//! missing and resumes it once that dependency has been committed.

use chrono::NaiveDate;
use fitfriend_core::catalog::CatalogKind;
use fitfriend_core::dialog::{Directive, IntentName, Slots};
use fitfriend_core::session::{Continuation, ResumeReason};

use super::Turn;
use super::messages;

/// Outcome of checking a turn's slots before anything is written.
#[derive(Debug, PartialEq)]
pub enum Validation {
    Valid,
    /// A slot holds a value that can't be used; ask for it again.
    Invalid { slot: &'static str, message: String },
    /// A slot names a catalog entry that doesn't exist yet.
    MissingEntry { kind: CatalogKind, name: String },
}

impl Validation {
    pub fn invalid(slot: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            slot,
            message: message.into(),
        }
    }
}

pub const fn creation_intent(kind: CatalogKind) -> IntentName {
    match kind {
        CatalogKind::Exercise => IntentName::CreateExercise,
        CatalogKind::Food => IntentName::CreateFood,
    }
}

/// Slots the creation goal for `kind` starts from, with the name filled in.
pub fn creation_slots(kind: CatalogKind, name: &str) -> Slots {
    match kind {
        CatalogKind::Exercise => {
            Slots::from_pairs([("Exercise", Some(name)), ("MuscleGroup", None)])
        }
        CatalogKind::Food => Slots::from_pairs([
            ("FoodName", Some(name)),
            ("Serving", None),
            ("Calorie", None),
            ("Protein", None),
            ("Carbohydrate", None),
            ("Fat", None),
        ]),
    }
}

impl Turn {
    /// Queues the current goal with its slots as they are now. Re-suspending
    /// the same goal for the same reason replaces the queued copy.
    pub fn suspend(&mut self, reason: ResumeReason) {
        let continuation = Continuation {
            resume: self.intent,
            slots: self.slots.clone(),
            reason,
        };
        if self.session.peek().is_some_and(|top| {
            top.resume == continuation.resume && top.reason == continuation.reason
        }) {
            self.session.pop();
        }
        tracing::info!(
            user_id = %self.user_id,
            resume = %continuation.resume,
            awaiting = %continuation.reason.awaiting(),
            "Suspending goal"
        );
        self.session.push(continuation);
    }

    /// Suspends the current goal and asks to create the missing entry.
    pub fn request_missing_entry(&mut self, kind: CatalogKind, name: &str) -> Directive {
        self.suspend(ResumeReason::MissingCatalogEntry {
            kind,
            name: name.to_string(),
        });
        Directive::confirm(
            creation_intent(kind),
            creation_slots(kind, name),
            messages::not_recognized(kind, name),
        )
    }

    /// Asks for an excuse for exercises left unfinished on `day`. With
    /// `interrupt`, the current goal is queued to resume afterwards.
    pub fn request_workout_excuse(
        &mut self,
        day: NaiveDate,
        owed: &[String],
        interrupt: bool,
    ) -> Directive {
        self.session.pending_violation_day = Some(day);
        if interrupt {
            self.suspend(ResumeReason::ExcuseOwed { day });
        }
        Directive::confirm(
            IntentName::GiveExcuse,
            Slots::from_pairs([("Excuse", None), ("Violation", Some("workout"))]),
            messages::owed_workout(owed),
        )
    }

    /// Queues an excuse request behind the one for `day` being asked now.
    pub fn queue_excuse(&mut self, day: NaiveDate, slots: Slots) {
        tracing::info!(user_id = %self.user_id, owed_day = %day, "Queueing excuse request");
        self.session.push(Continuation {
            resume: IntentName::GiveExcuse,
            slots,
            reason: ResumeReason::ExcuseOwed { day },
        });
    }

    /// User declined: every pending goal goes with it and the goal ends unfulfilled.
    pub fn cancel(&mut self) -> Directive {
        self.session.discard_continuations();
        self.session.meal_estimate = None;
        Directive::failed(messages::CANCELLED)
    }

    pub fn onboarding(&mut self) -> Directive {
        self.session.discard_continuations();
        Directive::fulfilled(messages::ONBOARDING)
    }

    /// Ends a committed goal. The most recent queued goal, if any, is removed
    /// from the session and offered again with its cached slots.
    pub fn finish(&mut self, message: impl Into<String>) -> Directive {
        let message = message.into();
        match self.session.pop() {
            Some(continuation) => {
                tracing::info!(
                    user_id = %self.user_id,
                    resume = %continuation.resume,
                    "Resuming suspended goal"
                );
                let prompt = messages::resume_prompt(continuation.resume);
                Directive::confirm(
                    continuation.resume,
                    continuation.slots,
                    format!("{message} {prompt}"),
                )
            }
            None => Directive::fulfilled(message),
        }
    }

    /// Maps a pre-commit validation to the directive for this turn.
    pub fn resolve(&mut self, validation: Validation) -> Directive {
        match validation {
            Validation::Valid => Directive::delegate(self.slots.clone()),
            Validation::Invalid { slot, message } => {
                self.slots.clear(slot);
                Directive::re_prompt(self.intent, self.slots.clone(), slot, message)
            }
            Validation::MissingEntry { kind, name } => self.request_missing_entry(kind, &name),
        }
    }
}
