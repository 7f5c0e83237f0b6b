//! Configuration file structures for the waf bot.
//!
//! Configuration is a YAML file merged with `WAF_`-prefixed environment
//! variables, so secrets and deploy-specific values can stay out of the
//! file. Every section has defaults; an empty file is a valid
//! configuration.
//!
//! # Configuration File Format
//!
//! ```yaml
//! commands:
//!   # Command prefix, trailing space included
//!   prefix: "waf "
//!   # Longest command-name candidate, in tokens
//!   max_name_depth: 2
//!
//! database:
//!   # SQLite file name inside the data directory; ":memory:" works too
//!   file: "waf.db"
//!
//! claims:
//!   radius: 200
//!   per_user_per_dimension: 1
//!   allow_intersecting: false
//!
//! sweeper:
//!   interval_seconds: 5
//!   overdue_threshold_seconds: 5
//!
//! sessions:
//!   timeout_seconds: 360
//! ```
//!
//! # Environment Variable Overrides
//!
//! Nested keys use a double underscore:
//!
//! ```bash
//! export WAF_COMMANDS__PREFIX="hk "
//! export WAF_DATABASE__FILE=":memory:"
//! ```

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::Deserialize;

use crate::claims::ClaimRules;

/// Root configuration structure for the waf bot.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Command prefix and resolution settings
    pub commands: Commands,
    /// Database location
    pub database: DatabaseConfig,
    /// Claim rule overrides
    pub claims: Claims,
    /// Overdue-task sweep cadence
    pub sweeper: Sweeper,
    /// Interactive session defaults
    pub sessions: Sessions,
}

impl Config {
    /// Loads the YAML file at `path`, merged with `WAF_` environment
    /// overrides. The file may be absent; defaults fill every gap.
    pub fn load(path: &str) -> Result<Config, figment::Error> {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("WAF_").split("__"))
            .extract()
    }
}

/// Command resolution settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Commands {
    /// Message prefix that addresses the bot, trailing space included.
    pub prefix: String,
    /// Longest command-name candidate the resolver tries, in tokens.
    pub max_name_depth: usize,
}

impl Default for Commands {
    fn default() -> Self {
        Commands {
            prefix: "waf ".to_string(),
            max_name_depth: 2,
        }
    }
}

/// Database location.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file name, resolved inside the data directory unless it is
    /// `":memory:"` or an absolute path.
    pub file: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            file: "waf.db".to_string(),
        }
    }
}

/// Claim rule overrides; see [`ClaimRules`] for the semantics.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Claims {
    pub radius: i64,
    pub per_user_per_dimension: i64,
    pub allow_intersecting: bool,
}

impl Default for Claims {
    fn default() -> Self {
        let rules = ClaimRules::default();
        Claims {
            radius: rules.radius,
            per_user_per_dimension: rules.per_user_per_dimension,
            allow_intersecting: rules.allow_intersecting,
        }
    }
}

impl From<&Claims> for ClaimRules {
    fn from(claims: &Claims) -> Self {
        ClaimRules {
            radius: claims.radius,
            per_user_per_dimension: claims.per_user_per_dimension,
            allow_intersecting: claims.allow_intersecting,
        }
    }
}

/// Overdue-task sweep cadence.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sweeper {
    /// Seconds between sweep ticks.
    pub interval_seconds: u64,
    /// How far past due a task must be before it is swept, in seconds.
    pub overdue_threshold_seconds: i64,
}

impl Default for Sweeper {
    fn default() -> Self {
        Sweeper {
            interval_seconds: 5,
            overdue_threshold_seconds: 5,
        }
    }
}

/// Interactive session defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Sessions {
    /// Seconds a session stays alive without interaction.
    pub timeout_seconds: u64,
}

impl Default for Sessions {
    fn default() -> Self {
        Sessions {
            timeout_seconds: 360,
        }
    }
}
