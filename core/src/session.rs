//! Session state carried across the turns of one conversation.
//!
//! The platform echoes this back verbatim on the next turn. It holds the
//! continuation stack (goals interrupted to satisfy a dependency), the day a
//! late-detected workout violation belongs to, and the meal estimate shown
//! in the platform's confirmation prompt.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::CatalogKind;
use crate::dialog::{IntentName, Slots};
use crate::ledger::NutrientTotals;

pub const SESSION_STATE_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SessionRestoreError {
    #[error("session state is not valid: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("session state version {found} is not supported")]
    UnsupportedVersion { found: u32 },
}

/// Why a goal was suspended, which also determines the child goal it waits on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResumeReason {
    /// A referenced exercise or food does not exist yet.
    MissingCatalogEntry { kind: CatalogKind, name: String },
    /// A day rollover found unfinished exercises that need an excuse first.
    ExcuseOwed { day: NaiveDate },
}

impl ResumeReason {
    pub fn awaiting(&self) -> IntentName {
        match self {
            Self::MissingCatalogEntry {
                kind: CatalogKind::Exercise,
                ..
            } => IntentName::CreateExercise,
            Self::MissingCatalogEntry {
                kind: CatalogKind::Food,
                ..
            } => IntentName::CreateFood,
            Self::ExcuseOwed { .. } => IntentName::GiveExcuse,
        }
    }
}

/// A suspended goal with the slots it had when it was interrupted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Continuation {
    pub resume: IntentName,
    pub slots: Slots,
    pub reason: ResumeReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MealEstimate {
    pub food_nutrition: NutrientTotals,
    pub remaining: NutrientTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionState {
    #[serde(default = "current_version")]
    pub version: u32,
    /// Suspended goals, most recent last.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub continuations: Vec<Continuation>,
    /// Earlier day an in-progress excuse refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_violation_day: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_estimate: Option<MealEstimate>,
}

fn current_version() -> u32 {
    SESSION_STATE_VERSION
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            version: SESSION_STATE_VERSION,
            continuations: Vec::new(),
            pending_violation_day: None,
            meal_estimate: None,
        }
    }
}

impl SessionState {
    /// Rebuilds the state the platform carried over. `None` and `null` are
    /// the first turn of a conversation.
    pub fn restore(carried: Option<serde_json::Value>) -> Result<Self, SessionRestoreError> {
        let Some(value) = carried.filter(|value| !value.is_null()) else {
            return Ok(Self::default());
        };
        let state: SessionState = serde_json::from_value(value)?;
        if state.version != SESSION_STATE_VERSION {
            return Err(SessionRestoreError::UnsupportedVersion {
                found: state.version,
            });
        }
        Ok(state)
    }

    pub fn push(&mut self, continuation: Continuation) {
        self.continuations.push(continuation);
    }

    /// Removes and returns the most recent continuation.
    pub fn pop(&mut self) -> Option<Continuation> {
        self.continuations.pop()
    }

    pub fn peek(&self) -> Option<&Continuation> {
        self.continuations.last()
    }

    /// True when the top continuation is waiting on `intent` to complete.
    pub fn is_awaiting(&self, intent: IntentName) -> bool {
        self.peek()
            .is_some_and(|continuation| continuation.reason.awaiting() == intent)
    }

    pub fn discard_continuations(&mut self) {
        self.continuations.clear();
        self.pending_violation_day = None;
    }
}
