use std::path::{Path, PathBuf};

use fitfriend_core::session::SessionState;
use serde_json::json;

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}

pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", serde_json::to_string_pretty(&err).unwrap());
    std::process::exit(4);
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fitfriend")
}

/// Where the session state for `user_id` is carried between invocations.
pub fn session_path(user_id: &str) -> PathBuf {
    session_path_in(&config_dir(), user_id)
}

fn session_path_in(dir: &Path, user_id: &str) -> PathBuf {
    let stem: String = user_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    dir.join("sessions").join(format!("{stem}.json"))
}

/// The stored session state as the API returned it, or `None` before the
/// first turn.
pub fn load_session(path: &Path) -> Result<Option<serde_json::Value>, String> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(format!("Failed to read '{}': {e}", path.display())),
    };
    serde_json::from_str(&data)
        .map(Some)
        .map_err(|e| format!("Invalid session state in '{}': {e}", path.display()))
}

pub fn save_session(path: &Path, state: &SessionState) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create '{}': {e}", parent.display()))?;
    }
    let data = serde_json::to_string_pretty(state).map_err(|e| e.to_string())?;
    std::fs::write(path, data).map_err(|e| format!("Failed to write '{}': {e}", path.display()))
}

/// Returns whether there was anything to clear.
pub fn clear_session(path: &Path) -> Result<bool, String> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(format!("Failed to remove '{}': {e}", path.display())),
    }
}

/// Sends one request and returns the exit code for its status with the
/// parsed body. Connection and URL failures are printed here and come back
/// as `Err(code)`.
///
/// Exit codes: 0=success (2xx), 1=client error (4xx), 2=server error (5xx),
///             3=connection error, 4=usage error
pub async fn api_request(
    api_url: &str,
    method: reqwest::Method,
    path: &str,
    body: Option<serde_json::Value>,
) -> Result<(i32, serde_json::Value), i32> {
    let url = match reqwest::Url::parse(&format!("{api_url}{path}")) {
        Ok(u) => u,
        Err(e) => {
            let err = json!({
                "error": "cli_error",
                "message": format!("Invalid URL: {api_url}{path}: {e}")
            });
            eprintln!("{}", serde_json::to_string_pretty(&err).unwrap());
            return Err(4);
        }
    };

    let mut req = client().request(method, url);
    if let Some(b) = body {
        req = req.json(&b);
    }

    let resp = match req.send().await {
        Ok(r) => r,
        Err(e) => {
            let err = json!({
                "error": "connection_error",
                "message": format!("{e}"),
                "docs_hint": "Is the API server running? Check FITFRIEND_API_URL."
            });
            eprintln!("{}", serde_json::to_string_pretty(&err).unwrap());
            return Err(3);
        }
    };

    let exit_code = match resp.status().as_u16() {
        200..=299 => 0,
        400..=499 => 1,
        _ => 2,
    };

    let resp_body: serde_json::Value = match resp.json().await {
        Ok(v) => v,
        Err(e) => json!({"raw_error": format!("Failed to parse response as JSON: {e}")}),
    };

    Ok((exit_code, resp_body))
}

/// Successful bodies go to stdout, everything else to stderr.
pub fn print_response(exit_code: i32, body: &serde_json::Value) {
    let formatted = serde_json::to_string_pretty(body).unwrap();
    if exit_code == 0 {
        println!("{formatted}");
    } else {
        eprintln!("{formatted}");
    }
}
