//! Typed errors for the fallible subsystems. The binary boundary wraps
//! these in `anyhow` and reports them as non-fatal notifications.

use std::path::PathBuf;

use thiserror::Error;

/// A sub-action that could not start. Already-started actions are never
/// rolled back.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("project directory does not exist: {path}")]
    MissingProjectDir { path: PathBuf },

    #[error("command '{command}' not found; make sure it is installed and on PATH")]
    CommandNotFound { command: String },

    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("no supported terminal found on this system")]
    NoTerminalAvailable,

    #[error("failed to open {url}: {source}")]
    OpenUrl {
        url: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("permission denied writing startup registration at {path}")]
    PermissionDenied { path: PathBuf },

    #[error("failed to update startup registration at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StartupError {
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            StartupError::PermissionDenied { path }
        } else {
            StartupError::Io { path, source }
        }
    }
}

#[derive(Debug, Error)]
pub enum ShortcutError {
    #[error("{what} is not supported on this platform")]
    Unsupported { what: &'static str },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not locate the running executable: {source}")]
    NoExecutable { source: std::io::Error },

    #[error(transparent)]
    Startup {
        #[from]
        source: StartupError,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize config: {source}")]
    Serialize { source: serde_yaml::Error },

    #[error("a project named '{name}' already exists")]
    DuplicateProject { name: String },

    #[error("no project named '{name}'")]
    UnknownProject { name: String },

    #[error("unknown setting '{key}' (known settings: terminal, show_on_startup)")]
    UnknownSetting { key: String },

    #[error("invalid value '{value}' for setting '{key}'")]
    InvalidSetting { key: String, value: String },
}
