//! Turn handling: restores the session, routes the intent to its handler
//! and hands back the directive with the updated session.

pub mod catalog;
pub mod continuation;
pub mod excuse;
pub mod intents;
pub mod ledger;
pub mod messages;

use fitfriend_core::dialog::{
    ConfirmationStatus, InvocationPhase, IntentName, Slots, TurnRequest, TurnResponse,
};
use fitfriend_core::session::SessionState;

use crate::clock::Calendar;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::Store;

use self::catalog::CatalogValidator;
use self::ledger::LedgerManager;

/// One decoded turn. Handlers mutate `slots` and `session` in place.
#[derive(Debug)]
pub struct Turn {
    pub user_id: String,
    pub intent: IntentName,
    pub slots: Slots,
    pub confirmation: ConfirmationStatus,
    pub phase: InvocationPhase,
    pub session: SessionState,
}

/// Collaborators a handler may use during a turn.
pub struct Engine<'a> {
    pub store: &'a dyn Store,
    pub calendar: &'a Calendar,
}

impl<'a> Engine<'a> {
    pub fn new(store: &'a dyn Store, calendar: &'a Calendar) -> Self {
        Self { store, calendar }
    }

    pub fn catalog(&self) -> CatalogValidator<'a> {
        CatalogValidator::new(self.store)
    }

    pub fn ledgers(&self) -> LedgerManager<'a> {
        LedgerManager::new(self.store, self.calendar)
    }
}

pub async fn handle_turn(state: &AppState, request: TurnRequest) -> Result<TurnResponse, AppError> {
    let intent: IntentName = request
        .intent
        .parse()
        .map_err(|err: fitfriend_core::dialog::UnknownIntent| AppError::UnhandledIntent(err.0))?;

    let session = SessionState::restore(request.session_state).unwrap_or_else(|err| {
        tracing::warn!(user_id = %request.user_id, error = %err, "Discarding session state");
        SessionState::default()
    });

    let mut turn = Turn {
        user_id: request.user_id,
        intent,
        slots: request.slots,
        confirmation: request.confirmation_status,
        phase: request.invocation_phase,
        session,
    };

    tracing::debug!(
        user_id = %turn.user_id,
        intent = %turn.intent,
        phase = ?turn.phase,
        confirmation = ?turn.confirmation,
        pending = turn.session.continuations.len(),
        "Dialog turn"
    );

    let engine = Engine::new(state.store.as_ref(), &state.calendar);
    let directive = intents::dispatch(&engine, &mut turn).await?;

    Ok(TurnResponse {
        session_state: turn.session,
        directive,
    })
}
