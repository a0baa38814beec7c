//! Wire types exchanged with the dialog platform, one request/response per turn.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::session::SessionState;

#[derive(Debug, thiserror::Error)]
#[error("intent '{0}' is not handled by this service")]
pub struct UnknownIntent(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum IntentName {
    Personalize,
    SetOwnGoal,
    CreateWorkout,
    CreateExercise,
    CreateFood,
    RecordWeightlift,
    RecordRun,
    RecordMeal,
    GiveExcuse,
    GetDayInformation,
    GetHowToExercise,
    Help,
}

impl IntentName {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Personalize => "Personalize",
            Self::SetOwnGoal => "SetOwnGoal",
            Self::CreateWorkout => "CreateWorkout",
            Self::CreateExercise => "CreateExercise",
            Self::CreateFood => "CreateFood",
            Self::RecordWeightlift => "RecordWeightlift",
            Self::RecordRun => "RecordRun",
            Self::RecordMeal => "RecordMeal",
            Self::GiveExcuse => "GiveExcuse",
            Self::GetDayInformation => "GetDayInformation",
            Self::GetHowToExercise => "GetHowToExercise",
            Self::Help => "Help",
        }
    }
}

impl fmt::Display for IntentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentName {
    type Err = UnknownIntent;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let intent = match value {
            "Personalize" => Self::Personalize,
            "SetOwnGoal" => Self::SetOwnGoal,
            "CreateWorkout" => Self::CreateWorkout,
            "CreateExercise" => Self::CreateExercise,
            "CreateFood" => Self::CreateFood,
            "RecordWeightlift" => Self::RecordWeightlift,
            "RecordRun" => Self::RecordRun,
            "RecordMeal" => Self::RecordMeal,
            "GiveExcuse" => Self::GiveExcuse,
            "GetDayInformation" => Self::GetDayInformation,
            "GetHowToExercise" => Self::GetHowToExercise,
            "Help" => Self::Help,
            other => return Err(UnknownIntent(other.to_string())),
        };
        Ok(intent)
    }
}

/// Whether the platform is still collecting slots or has decided to fulfill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvocationPhase {
    #[serde(alias = "DialogCodeHook")]
    PreCommit,
    #[serde(alias = "FulfillmentCodeHook")]
    PostCommit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ConfirmationStatus {
    #[default]
    None,
    Confirmed,
    Denied,
}

/// Slot name to value. Absent and null values are both "not filled".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Slots(pub BTreeMap<String, Option<String>>);

impl Slots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a slot set where every listed name is present, filled or not.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Option<&'a str>)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.map(str::to_string)))
                .collect(),
        )
    }

    /// Trimmed, non-empty value of a slot.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(|value| value.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn is_filled(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn set(&mut self, name: &str, value: Option<&str>) {
        self.0.insert(name.to_string(), value.map(str::to_string));
    }

    pub fn clear(&mut self, name: &str) {
        self.0.insert(name.to_string(), None);
    }

    pub fn all_empty(&self) -> bool {
        self.0.keys().all(|name| !self.is_filled(name))
    }
}

/// One inbound turn from the dialog platform.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TurnRequest {
    pub user_id: String,
    /// Recognized intent name; unknown names fail the turn.
    pub intent: String,
    #[serde(default)]
    pub slots: Slots,
    #[serde(default)]
    pub confirmation_status: ConfirmationStatus,
    pub invocation_phase: InvocationPhase,
    /// Session state returned by the previous turn, verbatim. Absent on the
    /// first turn of a conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_state: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FulfillmentState {
    Fulfilled,
    Failed,
}

/// What the platform should do next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    /// Ask again for one slot, keeping the others.
    RePrompt {
        intent_name: IntentName,
        slots: Slots,
        slot_to_elicit: String,
        message: String,
    },
    /// Ask the user to confirm or deny a goal with the given slots.
    Confirm {
        intent_name: IntentName,
        slots: Slots,
        message: String,
    },
    /// Hand slot collection back to the platform.
    Delegate { slots: Slots },
    /// End the turn.
    Terminal {
        fulfillment_state: FulfillmentState,
        message: String,
    },
}

impl Directive {
    pub fn re_prompt(
        intent_name: IntentName,
        slots: Slots,
        slot_to_elicit: &str,
        message: impl Into<String>,
    ) -> Self {
        Self::RePrompt {
            intent_name,
            slots,
            slot_to_elicit: slot_to_elicit.to_string(),
            message: message.into(),
        }
    }

    pub fn confirm(intent_name: IntentName, slots: Slots, message: impl Into<String>) -> Self {
        Self::Confirm {
            intent_name,
            slots,
            message: message.into(),
        }
    }

    pub fn delegate(slots: Slots) -> Self {
        Self::Delegate { slots }
    }

    pub fn fulfilled(message: impl Into<String>) -> Self {
        Self::Terminal {
            fulfillment_state: FulfillmentState::Fulfilled,
            message: message.into(),
        }
    }

    /// Ends the turn without the goal having been carried out.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Terminal {
            fulfillment_state: FulfillmentState::Failed,
            message: message.into(),
        }
    }
}

/// Outbound reply: the directive plus the session state to carry forward.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TurnResponse {
    pub session_state: SessionState,
    pub directive: Directive,
}
