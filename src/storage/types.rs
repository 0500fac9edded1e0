use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Visibility class a text paste is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

/// Logical key-value namespace. `Files` maps a paste id to the blob filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Public,
    Private,
    Files,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Namespace::Public, Namespace::Private, Namespace::Files];
    pub const TEXT: [Namespace; 2] = [Namespace::Public, Namespace::Private];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Public => "publicPastes",
            Namespace::Private => "privatePastes",
            Namespace::Files => "filePastes",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Visibility> for Namespace {
    fn from(visibility: Visibility) -> Self {
        match visibility {
            Visibility::Public => Namespace::Public,
            Visibility::Private => Namespace::Private,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Redb,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: BackendKind,
    pub data_dir: PathBuf,
    pub files_dir: PathBuf,
    #[serde(default = "default_max_text_bytes")]
    pub max_text_bytes: usize,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
    #[serde(default = "default_public_clear")]
    pub public_clear_interval_sec: u64,
    #[serde(default = "default_private_clear")]
    pub private_clear_interval_sec: u64,
}

fn default_max_text_bytes() -> usize {
    1024 * 1024
}

fn default_max_file_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_public_clear() -> u64 {
    60 * 60 * 24 * 3
}

fn default_private_clear() -> u64 {
    60 * 60 * 24 * 7
}

impl StorageConfig {
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("pastes.redb")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Redb,
            data_dir: PathBuf::from("data"),
            files_dir: PathBuf::from("data/files"),
            max_text_bytes: default_max_text_bytes(),
            max_file_bytes: default_max_file_bytes(),
            public_clear_interval_sec: default_public_clear(),
            private_clear_interval_sec: default_private_clear(),
        }
    }
}
