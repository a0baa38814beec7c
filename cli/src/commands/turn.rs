use clap::{Args, ValueEnum};
use fitfriend_core::dialog::{
    ConfirmationStatus, Directive, InvocationPhase, Slots, TurnRequest, TurnResponse,
};

use crate::util::{
    api_request, clear_session, exit_error, load_session, print_response, save_session,
    session_path,
};

#[derive(Args)]
pub struct TurnArgs {
    /// Intent name (e.g. RecordWeightlift, CreateExercise, GiveExcuse)
    #[arg(long)]
    pub intent: String,

    /// Slot values (repeatable: Name=value; `Name=` sends an empty slot)
    #[arg(long, short = 's')]
    pub slot: Vec<String>,

    /// Whether the platform is still collecting slots or fulfilling
    #[arg(long, value_enum, default_value = "pre-commit")]
    pub phase: Phase,

    /// The user's answer to the last confirmation prompt
    #[arg(long, value_enum, default_value = "none")]
    pub confirmation: Confirmation,

    /// Ignore the carried session state for this turn
    #[arg(long)]
    pub fresh: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Phase {
    PreCommit,
    PostCommit,
}

impl From<Phase> for InvocationPhase {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::PreCommit => InvocationPhase::PreCommit,
            Phase::PostCommit => InvocationPhase::PostCommit,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Confirmation {
    None,
    Confirmed,
    Denied,
}

impl From<Confirmation> for ConfirmationStatus {
    fn from(confirmation: Confirmation) -> Self {
        match confirmation {
            Confirmation::None => ConfirmationStatus::None,
            Confirmation::Confirmed => ConfirmationStatus::Confirmed,
            Confirmation::Denied => ConfirmationStatus::Denied,
        }
    }
}

pub async fn run(api_url: &str, user_id: &str, args: TurnArgs) -> i32 {
    let slots = match parse_slots(&args.slot) {
        Ok(slots) => slots,
        Err(e) => exit_error(&e, Some("Format: Name=value, e.g. --slot Exercise=squat")),
    };

    let path = session_path(user_id);
    let session_state = if args.fresh {
        None
    } else {
        match load_session(&path) {
            Ok(state) => state,
            Err(e) => exit_error(&e, Some("Run `fitfriend session reset` to start over")),
        }
    };

    let request = TurnRequest {
        user_id: user_id.to_string(),
        intent: args.intent,
        slots,
        confirmation_status: args.confirmation.into(),
        invocation_phase: args.phase.into(),
        session_state,
    };
    let body = match serde_json::to_value(&request) {
        Ok(body) => body,
        Err(e) => exit_error(&format!("Failed to encode turn: {e}"), None),
    };

    let (code, resp_body) =
        match api_request(api_url, reqwest::Method::POST, "/v1/dialog/turn", Some(body)).await {
            Ok(result) => result,
            Err(code) => return code,
        };

    if code == 0 {
        match serde_json::from_value::<TurnResponse>(resp_body.clone()) {
            Ok(response) => {
                if let Err(e) = carry_forward(&path, &response) {
                    exit_error(&e, None);
                }
            }
            Err(e) => exit_error(
                &format!("Unexpected turn response: {e}"),
                Some("Check that FITFRIEND_API_URL points at a FitFriend API"),
            ),
        }
    }

    print_response(code, &resp_body);
    code
}

/// Keeps the returned state for the next turn. A terminal directive with
/// nothing suspended ends the conversation, so the stored state goes away.
fn carry_forward(path: &std::path::Path, response: &TurnResponse) -> Result<(), String> {
    let finished = matches!(response.directive, Directive::Terminal { .. })
        && response.session_state.continuations.is_empty()
        && response.session_state.pending_violation_day.is_none();
    if finished {
        clear_session(path).map(|_| ())
    } else {
        save_session(path, &response.session_state)
    }
}

fn parse_slots(raw: &[String]) -> Result<Slots, String> {
    let mut slots = Slots::new();
    for pair in raw {
        let Some((name, value)) = pair.split_once('=') else {
            return Err(format!("Invalid slot: '{pair}'"));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("Invalid slot: '{pair}' has no name"));
        }
        let value = value.trim();
        slots.set(name, (!value.is_empty()).then_some(value));
    }
    Ok(slots)
}
