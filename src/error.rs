use thiserror::Error;

/// Failures that stop a report before it is rendered.
///
/// Endpoint failures are not listed here: they travel inside the fetched
/// payload as `{"error": ...}` and the report renders around them.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("SCREEPS_TOKEN is not set (looked in {env_file} and the environment)")]
    MissingToken { env_file: String },

    #[error("unable to resolve a room from the user overview{}", shard_hint(.shard))]
    NoRoom { shard: Option<String> },

    #[error("failed to initialize http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

fn shard_hint(shard: &Option<String>) -> String {
    match shard {
        Some(shard) => format!(" on {}", shard),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, StateError>;
