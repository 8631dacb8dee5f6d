pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod logging;
pub mod memory;
pub mod objects;
pub mod report;
pub mod rooms;
pub mod snapshot;
pub mod values;

pub use config::ReportOptions;
pub use error::{Result, StateError};
pub use http::{ScreepsApi, ScreepsClient};
pub use snapshot::GameSnapshot;

/// Load the token, fetch the account state and render the report.
///
/// Fails only on a missing token, an unbuildable HTTP client, or when no
/// room can be resolved; endpoint failures show up inside the report.
pub async fn run(options: &ReportOptions) -> Result<String> {
    let token = credentials::load_token(&options.env_file);
    if token.trim().is_empty() {
        return Err(StateError::MissingToken {
            env_file: options.env_file.display().to_string(),
        });
    }

    let client = ScreepsClient::new(&options.api_url, &token, options.timeout)?;
    let snapshot = snapshot::collect(&client, options).await?;
    Ok(report::render(&snapshot, options, chrono::Local::now()))
}
