use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use screeps_game_state_lib::config::{
    ReportOptions, CONTROLLER_LEVEL_THRESHOLDS, DEFAULT_CODE_LINES, DEFAULT_CREEPS_PER_ROLE,
};
use screeps_game_state_lib::credentials::default_env_file;
use screeps_game_state_lib::http::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use screeps_game_state_lib::logging::init_subscriber;

#[derive(Parser)]
#[command(name = "screeps-game-state")]
#[command(about = "Print a Markdown snapshot of your Screeps account")]
#[command(version)]
pub struct Args {
    /// API base URL
    #[arg(long, env = "SCREEPS_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// File holding a SCREEPS_TOKEN=<token> line [default: <exe dir>/../.env,
    /// which is target/.env under cargo run]
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Report on this room instead of the first owned one
    #[arg(long)]
    pub room: Option<String>,

    /// Only consider rooms on this shard
    #[arg(long)]
    pub shard: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Creeps listed per role before collapsing the rest
    #[arg(long, default_value_t = DEFAULT_CREEPS_PER_ROLE)]
    pub creeps_per_role: usize,

    /// Lines of main shown in the code preview
    #[arg(long, default_value_t = DEFAULT_CODE_LINES)]
    pub code_lines: usize,

    /// Skip the four adjacent room lookups
    #[arg(long)]
    pub no_scout: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<Args> for ReportOptions {
    fn from(args: Args) -> Self {
        ReportOptions {
            api_url: args.api_url,
            env_file: args.env_file.unwrap_or_else(default_env_file),
            room: args.room,
            shard: args.shard,
            timeout: Duration::from_secs(args.timeout_secs),
            creeps_per_role: args.creeps_per_role,
            code_lines: args.code_lines,
            scout: !args.no_scout,
            level_thresholds: CONTROLLER_LEVEL_THRESHOLDS.to_vec(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_subscriber(args.verbose);
    let options = ReportOptions::from(args);

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let report = runtime.block_on(screeps_game_state_lib::run(&options))?;
    print!("{}", report);

    Ok(())
}
