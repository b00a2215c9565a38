//! Run specification types for the Outrigger supervisor
//!
//! A [`RunSpec`] describes one supervisor invocation: a pre-exec command
//! (with an optional health check gating readiness) and a main command.
//! A run is executed exactly once and ends on the first of: main command
//! exit, health-gate exhaustion, launch failure, or cancellation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while building run specifications
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SpecError {
    /// A command token sequence was empty
    #[error("command must have at least one token")]
    EmptyCommand,
}

/// An external command: the executable and its arguments
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSpec {
    /// Executable name or path, resolved by the OS at launch time
    pub program: String,

    /// Command-line arguments
    #[serde(default)]
    pub args: Vec<String>,
}

impl ProcessSpec {
    /// Create a spec from an executable and its arguments
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build a spec from an ordered token sequence, the first token being
    /// the executable. Fails if the sequence is empty.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, SpecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = tokens.into_iter().map(Into::into);
        let program = tokens.next().ok_or(SpecError::EmptyCommand)?;
        Ok(Self {
            program,
            args: tokens.collect(),
        })
    }
}

/// Kind of reachability check used to gate the main command
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum HealthCheckKind {
    /// HTTP GET against localhost, healthy below status 300
    Http,
    /// TCP connect against localhost
    Tcp,
    /// A kind this build does not recognize. Carried so the supervisor can
    /// reject it when the probe is built rather than at parse time.
    Other(String),
}

impl From<&str> for HealthCheckKind {
    fn from(value: &str) -> Self {
        match value {
            "http" => Self::Http,
            "tcp" => Self::Tcp,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for HealthCheckKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for HealthCheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Tcp => f.write_str("tcp"),
            Self::Other(kind) => f.write_str(kind),
        }
    }
}

/// Health check configuration for a pre-exec command
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckSpec {
    /// Kind of reachability check to perform
    pub kind: HealthCheckKind,

    /// Port the check targets on localhost
    pub port: u16,

    /// Request path, used by http checks only
    #[serde(default = "default_health_path")]
    pub path: String,

    /// Probe attempts before the gate gives up
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Seconds between consecutive probe attempts
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Timeout for each probe in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl HealthCheckSpec {
    /// Get the inter-attempt interval as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Get the per-probe timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_health_path() -> String {
    "/".to_string()
}

const fn default_retries() -> u32 {
    5
}

const fn default_interval_secs() -> u64 {
    1
}

const fn default_timeout_secs() -> u64 {
    10
}

/// The auxiliary command started before the main command
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreExecSpec {
    /// Command to run
    #[serde(flatten)]
    pub process: ProcessSpec,

    /// Health check that must pass before the main command starts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheckSpec>,
}

/// Complete specification for one supervisor run
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunSpec {
    /// Auxiliary command started first
    pub pre_exec: PreExecSpec,

    /// Foreground command the run exists to execute
    pub main: ProcessSpec,
}
