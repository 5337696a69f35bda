//! Logo URL reachability probing.

use std::time::Duration;

use crate::error::{LintError, Result};

/// Default probe timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Answers whether a logo URL can be fetched.
///
/// Only the pass/fail contract matters to validation; an `Err` becomes a
/// warning on the template and never stops the run.
pub trait LogoProbe: Send + Sync {
    fn check(&self, url: &str) -> Result<()>;
}

/// Blocking HTTP probe
pub struct HttpLogoProbe {
    client: reqwest::blocking::Client,
}

impl HttpLogoProbe {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout.max(Duration::from_millis(1)))
            .user_agent(user_agent)
            .build()
            .map_err(|err| LintError::Config(format!("logo probe http client: {err}")))?;
        Ok(Self { client })
    }
}

impl LogoProbe for HttpLogoProbe {
    fn check(&self, url: &str) -> Result<()> {
        tracing::debug!(url, "checking logo url");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| LintError::Probe(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LintError::Probe(format!("unexpected http status {status}")));
        }
        Ok(())
    }
}

/// User agent sent with logo requests unless configured otherwise
#[must_use]
pub fn default_user_agent() -> String {
    format!("dc-template-linter/{}", env!("CARGO_PKG_VERSION"))
}
