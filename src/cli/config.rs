use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::artifacts::store::ArtifactConfig;
use crate::browser::session::BrowserConfig;
use crate::run::coordinator::EngineConfig;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "element-discovery",
    version,
    about = "Discover interactive elements on a page and run step-based tests against it"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Path to config file (default: element-discovery.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a page, wait for it to settle and list its interactive elements
    Discover {
        /// Page to discover
        #[arg(long)]
        url: String,

        /// Write the discovery JSON here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Execute the tests of a run record (YAML or JSON)
    Run {
        /// Path to the run record
        #[arg(long)]
        record: String,

        /// Output format: console, junit, json
        #[arg(long, default_value = "console")]
        format: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Screenshot directory (overrides the config file)
        #[arg(long)]
        artifacts: Option<String>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `element-discovery.yaml`
///
/// The engine's `scan`, `readiness` and `execution` sections (and
/// `navigation_timeout_ms`) sit at the top level next to `browser` and
/// `artifacts`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(flatten)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub artifacts: ArtifactConfig,
}

pub const DEFAULT_CONFIG_FILE: &str = "element-discovery.yaml";

/// Top-level keys the config file understands.
pub const CONFIG_KEYS: &[&str] = &[
    "browser",
    "scan",
    "readiness",
    "execution",
    "navigation_timeout_ms",
    "artifacts",
];

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(config_path) {
        Ok(content) => parse_config(&content).unwrap_or_else(|e| {
            warn!(path = %config_path, error = %e, "ignoring malformed config file");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    if value.is_null() {
        return Ok(AppConfig::default());
    }
    for key in unknown_keys(&value) {
        warn!(key = %key, "ignoring unknown config section");
    }
    serde_yaml::from_value(value)
}

/// Top-level keys outside [`CONFIG_KEYS`].
pub fn unknown_keys(value: &serde_yaml::Value) -> Vec<String> {
    let Some(map) = value.as_mapping() else {
        return Vec::new();
    };
    map.keys()
        .filter_map(|k| k.as_str())
        .filter(|k| !CONFIG_KEYS.contains(k))
        .map(str::to_string)
        .collect()
}
