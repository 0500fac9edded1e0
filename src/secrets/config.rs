use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable that overrides `secrets.repo_path`.
pub const REPO_PATH_ENV: &str = "PUBLIC_GIT_REPO_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct SecretsConfig {
    /// Git working directory that receives the secret logs.
    #[serde(default)]
    pub repo_path: PathBuf,
    /// Remote to push to; `git push` picks the upstream when unset.
    #[serde(default)]
    pub remote: Option<String>,
    #[serde(default = "default_fast_tick")]
    pub fast_tick_sec: u64,
    #[serde(default = "default_slow_tick")]
    pub slow_tick_sec: u64,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    #[serde(default = "default_max_query_bytes")]
    pub max_query_bytes: usize,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_fast_tick() -> u64 {
    7
}

fn default_slow_tick() -> u64 {
    5 * 60
}

fn default_max_file_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_max_query_bytes() -> usize {
    4 * 1024
}

fn default_max_body_bytes() -> usize {
    8 * 1024
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::new(),
            remote: None,
            fast_tick_sec: default_fast_tick(),
            slow_tick_sec: default_slow_tick(),
            max_file_bytes: default_max_file_bytes(),
            max_query_bytes: default_max_query_bytes(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}
