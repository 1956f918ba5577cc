//! Environment-derived configuration for the simrun client.
//!
//! Per the "global singleton configuration" design note: environment
//! variables are read once, at construction time, and captured into a plain
//! struct that is then threaded through every constructor that needs it.
//! Tests build a `ClientConfig` directly instead of mutating the process
//! environment.
//!

use std::env;
use std::path::{Path, PathBuf};

/// Name of the environment variable overriding the cache directory root.
pub const ENV_CACHE_DIR: &str = "EPX_CACHE_DIR";
/// Name of the environment variable holding the auth-token-refresher hub URL.
pub const ENV_HUB_URL: &str = "EPX_HUB_URL";
/// Name of the environment variable holding the bearer token for the
/// refresher.
pub const ENV_JPY_TOKEN: &str = "JPY_API_TOKEN";
/// Name of the environment variable holding an offline bearer token, used
/// instead of the refresher when present.
pub const ENV_OFFLINE_TOKEN: &str = "FRED_CLOUD_RUNNER_TOKEN";

/// Default cache directory name under the user's home, used when
/// [`ENV_CACHE_DIR`] is unset.
const DEFAULT_CACHE_DIRNAME: &str = ".epx_client";

/// Resolved configuration for a client session.
///
/// Construct with [`ClientConfig::from_env`] in normal use; tests that need
/// a throwaway cache directory should use [`ClientConfig::new`] directly.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    cache_dir: PathBuf,
    hub_url: Option<String>,
    jpy_token: Option<String>,
    offline_token: Option<String>,
}

impl ClientConfig {
    /// Build a configuration explicitly, bypassing the environment.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            hub_url: None,
            jpy_token: None,
            offline_token: None,
        }
    }

    /// Resolve configuration from the process environment.
    ///
    /// `EPX_CACHE_DIR` overrides the cache directory; otherwise it defaults
    /// to `~/.epx_client`.
    pub fn from_env() -> Self {
        let cache_dir = env::var_os(ENV_CACHE_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_cache_dir);

        Self {
            cache_dir,
            hub_url: env::var(ENV_HUB_URL).ok(),
            jpy_token: env::var(ENV_JPY_TOKEN).ok(),
            offline_token: env::var(ENV_OFFLINE_TOKEN).ok(),
        }
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_hub_url(mut self, url: impl Into<String>) -> Self {
        self.hub_url = Some(url.into());
        self
    }

    pub fn with_jpy_token(mut self, token: impl Into<String>) -> Self {
        self.jpy_token = Some(token.into());
        self
    }

    pub fn with_offline_token(mut self, token: impl Into<String>) -> Self {
        self.offline_token = Some(token.into());
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn hub_url(&self) -> Option<&str> {
        self.hub_url.as_deref()
    }

    pub fn jpy_token(&self) -> Option<&str> {
        self.jpy_token.as_deref()
    }

    pub fn offline_token(&self) -> Option<&str> {
        self.offline_token.as_deref()
    }

    /// Directory under which per-run cache entries are stored.
    pub fn runs_cache_dir(&self) -> PathBuf {
        crate::makepath!(&self.cache_dir, "runs")
    }

    /// Directory under which per-job cache entries are stored.
    pub fn jobs_cache_dir(&self) -> PathBuf {
        crate::makepath!(&self.cache_dir, "jobs")
    }
}

fn default_cache_dir() -> PathBuf {
    let home = home::home_dir().unwrap_or_else(|| PathBuf::from("."));
    crate::makepath!(home, DEFAULT_CACHE_DIRNAME)
}

/// Escape an absolute output directory path into the path segment used to
/// key its cache entry: the leading path separator is stripped so the
/// result can be joined safely under `<cache_dir>/runs/`.
///
/// E.g. `/home/epx/my-model/results/run-0` becomes
/// `home/epx/my-model/results/run-0`.
pub fn escape_output_dir(output_dir: &Path) -> PathBuf {
    let s = output_dir.to_string_lossy();
    let stripped = s.strip_prefix(std::path::MAIN_SEPARATOR).unwrap_or(&s);
    PathBuf::from(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cache_dir_is_dotdir_under_home() {
        let cfg = ClientConfig::new("/tmp/whatever");
        assert_eq!(cfg.cache_dir(), Path::new("/tmp/whatever"));
    }

    #[test]
    fn escape_strips_leading_separator() {
        let p = Path::new("/home/epx/my-model/results/run-0");
        assert_eq!(
            escape_output_dir(p),
            PathBuf::from("home/epx/my-model/results/run-0")
        );
    }

    #[test]
    fn runs_and_jobs_cache_dirs_are_subdirs() {
        let cfg = ClientConfig::new("/tmp/cache");
        assert_eq!(cfg.runs_cache_dir(), PathBuf::from("/tmp/cache/runs"));
        assert_eq!(cfg.jobs_cache_dir(), PathBuf::from("/tmp/cache/jobs"));
    }
}
