use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const TOKEN_KEY: &str = "SCREEPS_TOKEN";

/// `.env` next to the install directory: `<exe dir>/../.env`.
///
/// For a binary run out of `target/debug` this is `target/.env`. Falls back
/// to `.env` in the working directory if the executable path cannot be
/// resolved.
pub fn default_env_file() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(Path::parent).map(|root| root.join(".env")))
        .unwrap_or_else(|| PathBuf::from(".env"))
}

/// Token from `env_file`, then from the environment. Empty when neither has one.
pub fn load_token(env_file: &Path) -> String {
    load_token_with(env_file, |key| env::var(key).ok())
}

/// [`load_token`] with the environment lookup supplied by the caller.
pub fn load_token_with(env_file: &Path, env_lookup: impl Fn(&str) -> Option<String>) -> String {
    if let Some(token) = read_token_file(env_file) {
        tracing::debug!(path = %env_file.display(), "token loaded from env file");
        return token;
    }
    env_lookup(TOKEN_KEY).map(|value| value.trim().to_string()).unwrap_or_default()
}

fn read_token_file(env_file: &Path) -> Option<String> {
    let contents = fs::read_to_string(env_file).ok()?;
    let prefix = format!("{}=", TOKEN_KEY);
    contents
        .lines()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .map(|value| value.trim().to_string())
}
