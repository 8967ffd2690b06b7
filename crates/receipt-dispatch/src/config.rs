//! Run configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. Environment variables (`RECEIPT_DISPATCH_EMAIL`, `RECEIPT_DISPATCH_PASSWORD`,
//!    `RECEIPT_DISPATCH_BASE_URL`)
//! 2. The TOML file given with `--config` or `RECEIPT_DISPATCH_CONFIG`
//! 3. Built-in defaults
//!
//! ```toml
//! [api]
//! base_url = "https://api.cailun.com.br"
//!
//! [routing]
//! system_root_id = 3073
//! target_subfolder = "RECIBOS"
//!
//! [roster]
//! path = "//fs/rh/rel_funcionarios.xlsx"
//!
//! [[shares]]
//! path = "//fs/rh/FERIAS/RECIBOS DE FERIAS/MATRIZ"
//! flow = "vacation"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use routing::RoutingConfig;
use serde::{Deserialize, Serialize};

use crate::flow::FlowKind;

const DEFAULT_BASE_URL: &str = "https://api.cailun.com.br";
const DEFAULT_ISSUER: &str = "cailun";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_DEADLINE_DAYS: i64 = 7;
/// Accepted range for `signing.deadline_days`.
pub const DEADLINE_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=365;
const DEFAULT_REMINDER_DAYS: u32 = 2;

const ENV_CONFIG_PATH: &str = "RECEIPT_DISPATCH_CONFIG";
const ENV_EMAIL: &str = "RECEIPT_DISPATCH_EMAIL";
const ENV_PASSWORD: &str = "RECEIPT_DISPATCH_PASSWORD";
const ENV_BASE_URL: &str = "RECEIPT_DISPATCH_BASE_URL";

/// Document service endpoint and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Sent as `issuer` in the login body.
    pub issuer: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Per-request timeout for every call to the service.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            issuer: DEFAULT_ISSUER.to_string(),
            email: String::new(),
            password: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Workbook with NOME, TELEFONE, CPF and EMAIL columns.
    pub path: PathBuf,
}

/// A network share holding scanned documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    pub path: PathBuf,
    /// Remote sector name; derived from the directory name when absent.
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub flow: FlowKind,
}

/// Fixed first signatory of the vacation flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorConfig {
    pub name: String,
    pub tax_id: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Days from submission until the signature deadline.
    pub deadline_days: i64,
    pub reminder_days: u32,
    pub director: Option<DirectorConfig>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            deadline_days: DEFAULT_DEADLINE_DAYS,
            reminder_days: DEFAULT_REMINDER_DAYS,
            director: None,
        }
    }
}

/// Top-level configuration for one dispatch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub api: ApiConfig,
    pub routing: RoutingConfig,
    pub roster: RosterConfig,
    pub shares: Vec<ShareConfig>,
    /// Prefixes removed from a share's directory name to get its sector.
    pub sector_prefixes: Vec<String>,
    pub signing: SigningConfig,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            routing: RoutingConfig::default(),
            roster: RosterConfig::default(),
            shares: Vec::new(),
            sector_prefixes: vec!["FOLHA ".to_string(), "DISK - ".to_string()],
            signing: SigningConfig::default(),
        }
    }
}

impl DispatchConfig {
    /// Load from `path` (or `RECEIPT_DISPATCH_CONFIG`), then apply env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(email) = lookup(ENV_EMAIL) {
            self.api.email = email;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.api.password = password;
        }
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.api.base_url = url;
        }
    }

    /// Check what a run for `flow` needs before any remote call is made.
    pub fn validate(&self, flow: FlowKind) -> Result<()> {
        if self.api.email.is_empty() || self.api.password.is_empty() {
            anyhow::bail!("Credentials missing: set {ENV_EMAIL} and {ENV_PASSWORD}");
        }
        if self.routing.system_root_id.0 <= 0 {
            anyhow::bail!("routing.system_root_id must be a positive folder id");
        }
        if self.roster.path.as_os_str().is_empty() {
            anyhow::bail!("roster.path is not set");
        }
        if !DEADLINE_DAYS_RANGE.contains(&self.signing.deadline_days) {
            anyhow::bail!(
                "signing.deadline_days must be between {} and {}, got {}",
                DEADLINE_DAYS_RANGE.start(),
                DEADLINE_DAYS_RANGE.end(),
                self.signing.deadline_days
            );
        }
        if flow == FlowKind::Vacation && self.signing.director.is_none() {
            anyhow::bail!("The vacation flow needs a [signing.director] section");
        }
        if !self.shares.iter().any(|s| s.flow == flow) {
            anyhow::bail!("No shares configured for the {flow} flow");
        }
        Ok(())
    }

    pub fn shares_for(&self, flow: FlowKind) -> impl Iterator<Item = &ShareConfig> {
        self.shares.iter().filter(move |s| s.flow == flow)
    }
}
