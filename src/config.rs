use std::path::PathBuf;
use std::time::Duration;

use crate::credentials::default_env_file;
use crate::http::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};

pub const DEFAULT_CREEPS_PER_ROLE: usize = 3;
pub const DEFAULT_CODE_LINES: usize = 15;
pub const DEFAULT_CPU_LIMIT: f64 = 20.0;

/// Controller progress needed to leave each level, from the game engine.
/// Level 8 is the cap and has no entry.
pub const CONTROLLER_LEVEL_THRESHOLDS: [(u32, f64); 7] = [
    (1, 200.0),
    (2, 45_000.0),
    (3, 135_000.0),
    (4, 405_000.0),
    (5, 1_215_000.0),
    (6, 3_645_000.0),
    (7, 10_935_000.0),
];

/// Matched in order against creep names; the first hit is the role.
pub const ROLE_VOCABULARY: [&str; 5] = ["harvester", "upgrader", "builder", "carrier", "defender"];

pub const FALLBACK_ROLE: &str = "other";

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub api_url: String,
    pub env_file: PathBuf,
    pub room: Option<String>,
    pub shard: Option<String>,
    pub timeout: Duration,
    pub creeps_per_role: usize,
    pub code_lines: usize,
    pub scout: bool,
    pub level_thresholds: Vec<(u32, f64)>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            api_url: DEFAULT_API_URL.to_string(),
            env_file: default_env_file(),
            room: None,
            shard: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            creeps_per_role: DEFAULT_CREEPS_PER_ROLE,
            code_lines: DEFAULT_CODE_LINES,
            scout: true,
            level_thresholds: CONTROLLER_LEVEL_THRESHOLDS.to_vec(),
        }
    }
}

impl ReportOptions {
    /// Progress required to reach the next level, if the table knows it.
    pub fn progress_required(&self, level: u32) -> Option<f64> {
        self.level_thresholds
            .iter()
            .find(|(threshold_level, _)| *threshold_level == level)
            .map(|(_, required)| *required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_lookup() {
        let options = ReportOptions::default();
        assert_eq!(options.progress_required(2), Some(45_000.0));
        assert_eq!(options.progress_required(7), Some(10_935_000.0));
        assert_eq!(options.progress_required(8), None);
        assert_eq!(options.progress_required(0), None);
    }

    #[test]
    fn thresholds_are_replaceable() {
        let options = ReportOptions { level_thresholds: vec![(2, 1.0)], ..Default::default() };
        assert_eq!(options.progress_required(2), Some(1.0));
        assert_eq!(options.progress_required(1), None);
    }
}
