//! Liveness probes. One probe answers a single question about a single
//! target: is it alive right now, and if not, what did the failure look like.

pub mod database;
pub mod http;
pub mod process;

use std::time::Duration;

use async_trait::async_trait;

/// Result of one liveness check.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub alive: bool,
    /// Failure description, carried into the alert text when present.
    pub detail: Option<String>,
}

impl ProbeOutcome {
    pub fn up() -> Self {
        Self {
            alive: true,
            detail: None,
        }
    }

    pub fn down(detail: impl Into<String>) -> Self {
        Self {
            alive: false,
            detail: Some(detail.into()),
        }
    }
}

/// Probe target for one entity, resolved from its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeKind {
    Http { url: String },
    Process { path: String },
    Database { driver: String, dsn: String },
}

impl ProbeKind {
    /// Short name for log fields.
    pub fn label(&self) -> &'static str {
        match self {
            ProbeKind::Http { .. } => "http",
            ProbeKind::Process { .. } => "process",
            ProbeKind::Database { .. } => "database",
        }
    }
}

/// Executes liveness checks. The production implementation dispatches on the
/// probe kind; tests substitute scripted implementations.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: &ProbeKind, timeout: Duration) -> ProbeOutcome;
}

/// Production prober. Holds a shared HTTP client so connection pools are
/// reused across checks of the same endpoint.
pub struct ProbeRunner {
    http_client: reqwest::Client,
}

impl ProbeRunner {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }
}

impl Default for ProbeRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prober for ProbeRunner {
    async fn probe(&self, target: &ProbeKind, timeout: Duration) -> ProbeOutcome {
        match target {
            ProbeKind::Http { url } => http::check(&self.http_client, url, timeout).await,
            ProbeKind::Process { path } => process::check(path),
            ProbeKind::Database { driver, dsn } => database::check(driver, dsn, timeout).await,
        }
    }
}
