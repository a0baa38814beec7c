mod commands;
mod util;

use clap::{Parser, Subcommand};

use commands::session::SessionCommands;
use commands::turn::TurnArgs;
use util::exit_error;

#[derive(Parser)]
#[command(
    name = "fitfriend",
    version,
    about = "FitFriend CLI: send dialog turns to the API the way the voice platform does"
)]
struct Cli {
    /// API base URL
    #[arg(long, env = "FITFRIEND_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Caller identity sent with every turn
    #[arg(long, env = "FITFRIEND_USER_ID")]
    user_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Send one turn and carry the returned session state forward
    Turn(TurnArgs),
    /// Inspect or clear the carried session state
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Health => commands::health::run(&cli.api_url).await,
        Commands::Turn(args) => {
            let user_id = require_user(cli.user_id);
            commands::turn::run(&cli.api_url, &user_id, args).await
        }
        Commands::Session { command } => {
            let user_id = require_user(cli.user_id);
            commands::session::run(&user_id, command)
        }
    };

    std::process::exit(code);
}

fn require_user(user_id: Option<String>) -> String {
    user_id.unwrap_or_else(|| {
        exit_error(
            "user_id is required for dialog turns",
            Some("Set --user-id or FITFRIEND_USER_ID env var"),
        )
    })
}
