use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::poll::{catalog, VoteOption, VotePolicy};

/// Vibecheck demo server
#[derive(Parser, Serialize, Deserialize, Clone, Debug)]
#[command(name = "vibecheck-server", version, about = "LAN live-reload and vibe-poll demo server")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "VIBECHECK_PORT", default_value = "3000")]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "VIBECHECK_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Path to TOML config file
    #[arg(long, default_value = "./vibecheck.toml")]
    pub config: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long, env = "VIBECHECK_JSON_LOGS")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    pub generate_config: bool,

    /// HTML page to serve and watch for changes
    #[arg(long, env = "VIBECHECK_PAGE", default_value = "./index.html")]
    pub page: String,

    /// Vote policy: "replace", "immutable", or "reject-bad"
    #[arg(long, env = "VIBECHECK_POLICY", default_value = "reject-bad")]
    pub policy: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "0.0.0.0".to_string(),
            config: "./vibecheck.toml".to_string(),
            json_logs: false,
            generate_config: false,
            page: "./index.html".to_string(),
            policy: "reject-bad".to_string(),
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (VIBECHECK_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        let cli = Config::parse();
        let config_path = cli.config.clone();

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("VIBECHECK_"))
            .merge(Serialized::defaults(cli))
            .extract()
    }

    /// Resolve the configured policy name to a `VotePolicy`.
    pub fn vote_policy(&self) -> Result<VotePolicy, String> {
        match self.policy.as_str() {
            "replace" => Ok(VotePolicy::Replace),
            "immutable" => Ok(VotePolicy::Immutable),
            "reject-bad" => Ok(VotePolicy::RejectOption {
                option: VoteOption::Bad,
                catalog: catalog::default_catalog(),
            }),
            other => Err(format!(
                "unknown vote policy {:?} (expected \"replace\", \"immutable\", or \"reject-bad\")",
                other
            )),
        }
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# Vibecheck Server Configuration
# Place this file at ./vibecheck.toml or specify with --config <path>
# All settings can be overridden via environment variables (VIBECHECK_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 3000)
# port = 3000

# Bind address (default: 0.0.0.0 — all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# HTML page to serve at / and watch for live reload.
# Sibling files next to it are served as static assets.
# page = "./index.html"

# Vote policy (default: reject-bad)
#   replace    — voters may change their vote; tally carries a running total
#   immutable  — first vote wins; later attempts are ignored
#   reject-bad — "bad" votes are refused with a decorative error;
#                "good" votes behave like replace
# policy = "reject-bad"
"#
    .to_string()
}
