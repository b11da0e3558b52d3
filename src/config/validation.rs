//! Config validation so bad flags fail fast instead of surfacing mid-session.

use super::AppConfig;
use anyhow::{bail, Result};

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            bail!("--endpoint must not be empty");
        }
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            bail!("--endpoint must be an http(s) URL, got {endpoint:?}");
        }
        if self.lang.trim().is_empty() {
            bail!("--lang must not be empty");
        }
        if self.quick_options.iter().any(|opt| opt.trim().is_empty()) {
            bail!("--quick-option values must not be empty");
        }
        Ok(())
    }
}
