use clap::Subcommand;
use serde_json::json;

use crate::util::{clear_session, exit_error, load_session, print_response, session_path};

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Print the session state the next turn will carry
    Show,
    /// Forget the carried session state and start a new conversation
    Reset,
}

pub fn run(user_id: &str, command: SessionCommands) -> i32 {
    let path = session_path(user_id);
    let body = match command {
        SessionCommands::Show => match load_session(&path) {
            Ok(state) => json!({
                "user_id": user_id,
                "path": path.display().to_string(),
                "session_state": state,
            }),
            Err(e) => exit_error(&e, Some("Run `fitfriend session reset` to start over")),
        },
        SessionCommands::Reset => match clear_session(&path) {
            Ok(cleared) => json!({
                "user_id": user_id,
                "cleared": cleared,
            }),
            Err(e) => exit_error(&e, None),
        },
    };
    print_response(0, &body);
    0
}
