use fitfriend_core::dialog::Directive;

use crate::engine::messages;
use crate::engine::{Engine, Turn};
use crate::store::StoreError;

pub async fn handle(_engine: &Engine<'_>, _turn: &mut Turn) -> Result<Directive, StoreError> {
    Ok(Directive::fulfilled(messages::HELP))
}
